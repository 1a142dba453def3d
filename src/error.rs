use crate::models::ApiError;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use sea_orm::DbErr;
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// 对外只暴露的通用履约失败信息，具体原因仅记录日志
pub const FULFILLMENT_FAILED_MESSAGE: &str = "Failed to process prize";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Spin cooldown active, retry after {retry_after_hours}h")]
    CooldownActive { retry_after_hours: i64 },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Fulfillment failure: {0}")]
    FulfillmentFailure(String),

    #[error("System error: {0}")]
    SystemError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),
}

impl AppError {
    /// 资格查询阶段的存储错误统一视为系统错误（此时尚未写入任何状态，可安全重试）
    pub fn system(err: impl std::fmt::Display) -> Self {
        AppError::SystemError(err.to_string())
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Unauthenticated(_) | AppError::JwtError(_) => "UNAUTHENTICATED",
            AppError::CooldownActive { .. } => "COOLDOWN_ACTIVE",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::FulfillmentFailure(_) => "FULFILLMENT_FAILED",
            AppError::SystemError(_) => "SYSTEM_ERROR",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::ExternalApiError(_) | AppError::ReqwestError(_) => "EXTERNAL_API_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated(_) | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::CooldownActive { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ExternalApiError(_) | AppError::ReqwestError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Unauthenticated(msg) => {
                log::warn!("Authentication error: {msg}");
                msg.clone()
            }
            AppError::JwtError(err) => {
                log::warn!("Invalid token: {err}");
                "Invalid access token".to_string()
            }
            AppError::CooldownActive { retry_after_hours } => {
                format!("You can spin again in {retry_after_hours} hour(s)")
            }
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                msg.clone()
            }
            AppError::NotFound(msg) => msg.clone(),
            AppError::FulfillmentFailure(_) => FULFILLMENT_FAILED_MESSAGE.to_string(),
            AppError::SystemError(cause) => {
                log::error!("System error: {cause}");
                "System error, please try again".to_string()
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                "Database error".to_string()
            }
            AppError::ExternalApiError(msg) => {
                log::error!("External API error: {msg}");
                msg.clone()
            }
            _ => {
                log::error!("Internal error: {self}");
                "Internal server error".to_string()
            }
        };

        let retry_after_hours = match self {
            AppError::CooldownActive { retry_after_hours } => Some(*retry_after_hours),
            _ => None,
        };

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": ApiError {
                code: self.code().to_string(),
                message,
                retry_after_hours,
            },
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn cooldown_response_carries_retry_hint() {
        let resp = AppError::CooldownActive {
            retry_after_hours: 7,
        }
        .error_response();
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"]["code"], "COOLDOWN_ACTIVE");
        assert_eq!(value["error"]["retry_after_hours"], 7);
    }

    #[actix_web::test]
    async fn fulfillment_failure_hides_cause() {
        let resp = AppError::FulfillmentFailure("wallet row locked".into()).error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains(FULFILLMENT_FAILED_MESSAGE));
        assert!(!text.contains("wallet row locked"));
    }
}
