use crate::entities::{cart_item_entity as cart_items, order_item_entity as order_items};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use utoipa::ToSchema;

static TEN_KG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b10\s*kg\b").expect("static regex"));

/// A priced cart or order line as the reward and discount rules see it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub product_name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// 行总价（单价 × 数量）
    pub line_total: i64,
}

impl CartLine {
    pub fn new(product_name: &str, line_total: i64) -> Self {
        Self {
            product_name: product_name.to_string(),
            line_total,
            ..Default::default()
        }
    }

    pub fn name_contains(&self, keyword: &str) -> bool {
        self.product_name
            .to_lowercase()
            .contains(&keyword.to_lowercase())
    }

    /// 类目或任一标签包含关键字
    pub fn classified_as(&self, keyword: &str) -> bool {
        let keyword = keyword.to_lowercase();
        self.category
            .iter()
            .chain(self.tags.iter())
            .any(|v| v.to_lowercase().contains(&keyword))
    }

    pub fn is_ten_kg(&self) -> bool {
        TEN_KG.is_match(&self.product_name)
    }
}

impl From<&order_items::Model> for CartLine {
    fn from(item: &order_items::Model) -> Self {
        Self {
            product_name: item.product_name.clone(),
            category: item.category.clone(),
            tags: item.tag_list(),
            line_total: item.line_total(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartItemResponse {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: i64,
    pub is_prize: bool,
    pub created_at: DateTime<Utc>,
}

impl From<cart_items::Model> for CartItemResponse {
    fn from(m: cart_items::Model) -> Self {
        Self {
            id: m.id,
            product_id: m.product_id,
            quantity: m.quantity,
            unit_price: m.unit_price,
            is_prize: m.is_prize,
            created_at: m.created_at,
        }
    }
}
