pub mod discount;
pub mod referral;
pub mod rewards;
pub mod spin;
pub mod wallet;

pub use discount::discount_config;
pub use referral::referral_config;
pub use rewards::rewards_config;
pub use spin::spin_config;
pub use wallet::wallet_config;

use actix_web::web;

/// All `/api/v1` routes.
pub fn api_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(spin_config)
            .configure(rewards_config)
            .configure(discount_config)
            .configure(wallet_config)
            .configure(referral_config),
    );
}
