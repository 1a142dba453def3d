use crate::models::CartLine;
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DiscountPreviewRequest {
    pub subtotal: i64,
    #[serde(default)]
    pub items: Vec<CartLine>,
}
