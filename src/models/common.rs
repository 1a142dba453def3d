use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// `error` body of every failed response: `{"success": false, "error": {...}}`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    /// 仅冷却期错误携带
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_hours: Option<i64>,
}
