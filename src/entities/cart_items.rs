use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 购物车行。is_prize 行单价为 0，永远不与同商品的付费行合并。
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "cart_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: i64,
    pub is_prize: bool,
    pub prize_reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
