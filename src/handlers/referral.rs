use crate::middlewares::current_user_id;
use crate::models::*;
use crate::services::ReferralService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use chrono::Utc;
use serde_json::json;

#[utoipa::path(
    post,
    path = "/api/v1/referrals",
    tag = "referrals",
    request_body = CreateReferralRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Referral recorded for the caller", body = ReferralResponse),
        (status = 400, description = "Self referral or already referred"),
        (status = 404, description = "Referrer not found")
    )
)]
/// 注册时归属推荐人（调用者为被推荐人）
pub async fn create_referral(
    service: web::Data<ReferralService>,
    req: HttpRequest,
    body: web::Json<CreateReferralRequest>,
) -> Result<HttpResponse> {
    let user_id = match current_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match service.attribute(body.referrer_user_id, user_id).await {
        Ok(referral) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": ReferralResponse::from(referral),
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/referrals/qualify",
    tag = "referrals",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Whether a pending referral moved to qualified", body = QualifyReferralResponse),
        (status = 401, description = "Unauthenticated")
    )
)]
pub async fn qualify_referral(
    service: web::Data<ReferralService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = match current_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match service.qualify(user_id, Utc::now()).await {
        Ok(qualified) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": QualifyReferralResponse { qualified },
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn referral_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/referrals")
            .route("", web::post().to(create_referral))
            .route("/qualify", web::post().to(qualify_referral)),
    );
}
