use crate::middlewares::current_user_id;
use crate::models::*;
use crate::services::{CartService, LedgerService, VoucherService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/v1/wallet",
    tag = "wallet",
    params(WalletTransactionQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Balance and ledger entries", body = WalletOverviewResponse),
        (status = 401, description = "Unauthenticated")
    )
)]
pub async fn get_wallet(
    service: web::Data<LedgerService>,
    req: HttpRequest,
    query: web::Query<WalletTransactionQuery>,
) -> Result<HttpResponse> {
    let user_id = match current_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    let wallet = match service.get_wallet(user_id).await {
        Ok(w) => w,
        Err(e) => return Ok(e.error_response()),
    };
    match service.list_transactions(user_id, &query.into_inner()).await {
        Ok(transactions) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": WalletOverviewResponse { wallet, transactions },
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/vouchers",
    tag = "wallet",
    params(VoucherQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's vouchers", body = PaginatedResponse<VoucherResponse>),
        (status = 401, description = "Unauthenticated")
    )
)]
pub async fn get_vouchers(
    service: web::Data<VoucherService>,
    req: HttpRequest,
    query: web::Query<VoucherQuery>,
) -> Result<HttpResponse> {
    let user_id = match current_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match service.list_for_user(user_id, &query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/cart",
    tag = "wallet",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Cart lines, prize lines included", body = [CartItemResponse]),
        (status = 401, description = "Unauthenticated")
    )
)]
pub async fn get_cart(service: web::Data<CartService>, req: HttpRequest) -> Result<HttpResponse> {
    let user_id = match current_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match service.list_cart(user_id).await {
        Ok(lines) => {
            let data: Vec<CartItemResponse> = lines.into_iter().map(Into::into).collect();
            Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

pub fn wallet_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/wallet", web::get().to(get_wallet))
        .route("/vouchers", web::get().to(get_vouchers))
        .route("/cart", web::get().to(get_cart));
}
