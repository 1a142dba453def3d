use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// pending -> qualified -> claimed（claimed 仅一次）
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum ReferralStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "qualified")]
    Qualified,
    #[sea_orm(string_value = "claimed")]
    Claimed,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "referrals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub referrer_user_id: i64,
    #[sea_orm(unique)]
    pub referred_user_id: i64,
    pub status: ReferralStatus,
    /// 推荐人已领取的奖励金额，领取前为 0
    pub referrer_discount_amount: i64,
    pub qualified_at: Option<DateTime<Utc>>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
