use crate::config::DealsConfig;
use crate::error::AppError;
use crate::models::*;
use crate::services::calculate_discount;
use actix_web::{HttpResponse, ResponseError, Result, web};
use chrono::Utc;
use serde_json::json;

#[utoipa::path(
    post,
    path = "/api/v1/discounts/preview",
    tag = "discounts",
    request_body = DiscountPreviewRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Best applicable deal", body = DiscountBreakdown),
        (status = 400, description = "Invalid cart")
    )
)]
/// 结算前优惠预览：家庭套餐与限时抢购取较大者，不叠加
pub async fn preview_discount(
    deals: web::Data<DealsConfig>,
    body: web::Json<DiscountPreviewRequest>,
) -> Result<HttpResponse> {
    let request = body.into_inner();
    if request.subtotal < 0 || request.items.iter().any(|i| i.line_total < 0) {
        return Ok(AppError::ValidationError("Amounts must not be negative".to_string())
            .error_response());
    }

    let weekday = deals.store_weekday(Utc::now());
    let breakdown = calculate_discount(&deals, request.subtotal, &request.items, weekday);
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": breakdown })))
}

pub fn discount_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/discounts/preview", web::post().to(preview_discount));
}
