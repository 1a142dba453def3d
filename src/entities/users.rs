use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 用户档案：抽奖状态与积分
/// - has_used_new_user_spin: 新用户专属抽奖是否已使用
/// - last_spin_at: 最近一次被接受的抽奖时间（单调递增）
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub loyalty_points: i64,
    pub has_used_new_user_spin: bool,
    pub last_spin_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
