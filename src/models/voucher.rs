use crate::entities::{DiscountType, voucher_entity as vouchers};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct VoucherQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// 只返回仍在有效期内的券
    pub active_only: Option<bool>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VoucherResponse {
    pub id: i64,
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub max_uses: i32,
    pub used_count: i32,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub redeemable: bool,
    pub created_at: DateTime<Utc>,
}

impl VoucherResponse {
    pub fn from_model(m: vouchers::Model, now: DateTime<Utc>) -> Self {
        let redeemable = m.is_redeemable_at(now);
        Self {
            id: m.id,
            code: m.code,
            discount_type: m.discount_type,
            discount_value: m.discount_value,
            max_uses: m.max_uses,
            used_count: m.used_count,
            valid_from: m.valid_from,
            valid_to: m.valid_to,
            redeemable,
            created_at: m.created_at,
        }
    }
}
