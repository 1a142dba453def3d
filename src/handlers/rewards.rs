use crate::middlewares::current_user_id;
use crate::models::*;
use crate::services::RewardsService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/rewards",
    tag = "rewards",
    params(("id" = i64, Path, description = "Order id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Rewards attributed to the order", body = OrderRewardsResponse),
        (status = 400, description = "Order is not paid"),
        (status = 401, description = "Unauthenticated"),
        (status = 404, description = "Order not found")
    )
)]
/// 处理订单奖励（返现 / 免运费券 / 积分 / 推荐奖励），可重复调用
pub async fn process_order_rewards(
    service: web::Data<RewardsService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = match current_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match service.process_order(user_id, path.into_inner()).await {
        Ok(rewards) => Ok(HttpResponse::Ok().json(OrderRewardsResponse {
            success: true,
            rewards,
        })),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn rewards_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/orders/{id}/rewards", web::post().to(process_order_rewards));
}
