use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 奖品类型，value 的含义随类型变化:
/// - wallet_cash: 入账金额
/// - voucher_percent: 折扣百分比
/// - free_delivery: 免运费券面值
/// - loyalty_points: 积分数
/// - item: 不使用 value，依赖 linked_product_id
/// - none: 谢谢参与
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
#[serde(rename_all = "snake_case")]
pub enum PrizeType {
    #[sea_orm(string_value = "wallet_cash")]
    WalletCash,
    #[sea_orm(string_value = "voucher_percent")]
    VoucherPercent,
    #[sea_orm(string_value = "free_delivery")]
    FreeDelivery,
    #[sea_orm(string_value = "loyalty_points")]
    LoyaltyPoints,
    #[sea_orm(string_value = "item")]
    Item,
    #[sea_orm(string_value = "none")]
    None,
}

impl std::fmt::Display for PrizeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrizeType::WalletCash => write!(f, "wallet_cash"),
            PrizeType::VoucherPercent => write!(f, "voucher_percent"),
            PrizeType::FreeDelivery => write!(f, "free_delivery"),
            PrizeType::LoyaltyPoints => write!(f, "loyalty_points"),
            PrizeType::Item => write!(f, "item"),
            PrizeType::None => write!(f, "none"),
        }
    }
}

/// 转盘奖品配置（后台维护，可选字段由奖池加载时补默认值）
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "spin_prizes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub label: String,
    pub sub_label: Option<String>,
    pub prize_type: PrizeType,
    pub value: Option<i64>,
    /// 0..=1
    pub probability: Option<f64>,
    pub linked_product_id: Option<i64>,
    pub new_user_only: Option<bool>,
    pub is_active: bool,
    pub slug: Option<String>,
    pub color: Option<String>,
    pub text_color: Option<String>,
    pub sort_order: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
