use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{DiscountType, PrizeType, ReferralStatus, SpinRecordStatus};
use crate::handlers;
use crate::models::*;
use crate::services::prize_pool::PrizeDisplay;
use crate::services::{DealKind, DiscountBreakdown, SpinClass};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::spin::get_prizes,
        handlers::spin::get_status,
        handlers::spin::spin,
        handlers::spin::get_records,
        handlers::rewards::process_order_rewards,
        handlers::discount::preview_discount,
        handlers::wallet::get_wallet,
        handlers::wallet::get_vouchers,
        handlers::wallet::get_cart,
        handlers::referral::create_referral,
        handlers::referral::qualify_referral,
    ),
    components(
        schemas(
            ApiError,
            PrizeType,
            PrizeDisplay,
            SpinClass,
            SpinPrizeResponse,
            SpinStatusResponse,
            SpinResponse,
            WonPrize,
            WonPrizeData,
            SpinRecordStatus,
            SpinRecordResponse,
            CartLine,
            CartItemResponse,
            OrderRewards,
            OrderRewardsResponse,
            FreeDeliveryBonus,
            DiscountPreviewRequest,
            DiscountBreakdown,
            DealKind,
            WalletResponse,
            WalletTransactionResponse,
            WalletOverviewResponse,
            DiscountType,
            VoucherResponse,
            ReferralStatus,
            CreateReferralRequest,
            ReferralResponse,
            QualifyReferralResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "spin", description = "Spin-the-wheel promotion"),
        (name = "rewards", description = "Post-purchase rewards"),
        (name = "discounts", description = "Pre-payment deals"),
        (name = "wallet", description = "Wallet, vouchers and cart"),
        (name = "referrals", description = "Referral attribution"),
    ),
    info(
        title = "Rewards Backend API",
        version = "1.0.0",
        description = "Promotional rewards engine REST API"
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
