use crate::middlewares::current_user_id;
use crate::models::*;
use crate::services::SpinService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/v1/spin/prizes",
    tag = "spin",
    responses(
        (status = 200, description = "Active wheel in configured order", body = [SpinPrizeResponse])
    )
)]
/// 转盘展示列表（顺序为配置顺序，与抽中概率无关）
pub async fn get_prizes(service: web::Data<SpinService>) -> Result<HttpResponse> {
    match service.list_prizes().await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/spin/status",
    tag = "spin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Eligibility preview", body = SpinStatusResponse),
        (status = 401, description = "Unauthenticated")
    )
)]
pub async fn get_status(service: web::Data<SpinService>, req: HttpRequest) -> Result<HttpResponse> {
    let user_id = match current_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match service.spin_status(user_id).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/spin",
    tag = "spin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Prize won", body = SpinResponse),
        (status = 401, description = "Unauthenticated"),
        (status = 429, description = "Cooldown active, body carries retry_after_hours"),
        (status = 500, description = "Failed to process prize")
    )
)]
/// 抽奖一次
pub async fn spin(service: web::Data<SpinService>, req: HttpRequest) -> Result<HttpResponse> {
    let user_id = match current_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match service.request_spin(user_id).await {
        Ok(result) => Ok(HttpResponse::Ok().json(result)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/spin/records",
    tag = "spin",
    params(SpinRecordQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Spin history, newest first", body = PaginatedResponse<SpinRecordResponse>),
        (status = 401, description = "Unauthenticated")
    )
)]
pub async fn get_records(
    service: web::Data<SpinService>,
    req: HttpRequest,
    query: web::Query<SpinRecordQuery>,
) -> Result<HttpResponse> {
    let user_id = match current_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match service.list_records(user_id, &query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn spin_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/spin", web::post().to(spin)).service(
        web::scope("/spin")
            .route("/prizes", web::get().to(get_prizes))
            .route("/status", web::get().to(get_status))
            .route("/records", web::get().to(get_records)),
    );
}
