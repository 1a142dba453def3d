//! Pre-payment deal resolution. Pure: the deals configuration and the weekday
//! are inputs, so the same cart always prices the same way.

use crate::config::DealsConfig;
use crate::models::CartLine;
use crate::services::rewards_service::percent_of;
use chrono::Weekday;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DealKind {
    FamilyFeast,
    FlashSale,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DiscountBreakdown {
    pub family_feast: i64,
    pub flash_sale: i64,
    /// max(family_feast, flash_sale); deals never stack
    pub discount: i64,
    pub applied: Option<DealKind>,
}

pub fn is_fresh_produce(config: &DealsConfig, line: &CartLine) -> bool {
    ["fruit", "vegetable"].iter().any(|k| line.classified_as(k))
        || config
            .fresh_produce_keywords
            .iter()
            .any(|k| line.name_contains(k))
}

pub fn calculate_discount(
    config: &DealsConfig,
    subtotal: i64,
    items: &[CartLine],
    weekday: Weekday,
) -> DiscountBreakdown {
    let family_feast = if subtotal >= config.family_feast_threshold {
        percent_of(subtotal, config.family_feast_percent)
    } else {
        0
    };

    let flash_sale = if config.flash_sale_days.contains(&weekday) {
        items
            .iter()
            .filter(|line| is_fresh_produce(config, line))
            .map(|line| percent_of(line.line_total, config.flash_sale_percent))
            .sum()
    } else {
        0
    };

    // 相等时按家庭套餐计
    let (discount, applied) = match (family_feast, flash_sale) {
        (0, 0) => (0, None),
        (f, s) if s > f => (s, Some(DealKind::FlashSale)),
        (f, _) => (f, Some(DealKind::FamilyFeast)),
    };

    DiscountBreakdown {
        family_feast,
        flash_sale,
        discount,
        applied,
    }
}
