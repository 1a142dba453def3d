use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 钱包流水（只追加）。reference 唯一，作为幂等键。
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "wallet_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub amount: i64,
    pub balance_after: i64,
    #[sea_orm(unique)]
    pub reference: String,
    pub gateway: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
