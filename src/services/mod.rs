pub mod cart_service;
pub mod discount_calculator;
pub mod eligibility;
pub mod fulfillment_service;
pub mod ledger_service;
pub mod loyalty_service;
pub mod prize_pool;
pub mod referral_service;
pub mod rewards_service;
pub mod spin_service;
pub mod voucher_service;
pub mod weighted_selector;

pub use cart_service::CartService;
pub use discount_calculator::{DealKind, DiscountBreakdown, calculate_discount};
pub use eligibility::{Eligibility, EligibilityService, SpinClass};
pub use fulfillment_service::FulfillmentService;
pub use ledger_service::{CreditOutcome, CreditRequest, LedgerService};
pub use loyalty_service::{AwardOutcome, LoyaltyService};
pub use prize_pool::{PrizePool, PrizePoolService};
pub use referral_service::ReferralService;
pub use rewards_service::RewardsService;
pub use spin_service::SpinService;
pub use voucher_service::{IssueVoucher, VoucherService};
pub use weighted_selector::{SelectedPrize, select_prize};

use crate::config::Config;
use crate::external::Notifier;
use actix_web::web;
use sea_orm::DatabaseConnection;

/// Wires every service from one pool and config.
#[derive(Clone)]
pub struct AppServices {
    pub spin: SpinService,
    pub rewards: RewardsService,
    pub ledger: LedgerService,
    pub vouchers: VoucherService,
    pub cart: CartService,
    pub referrals: ReferralService,
    pub deals: crate::config::DealsConfig,
}

impl AppServices {
    pub fn new(pool: DatabaseConnection, config: &Config) -> Self {
        let notifier = Notifier::new(config.notifications.clone());
        let ledger = LedgerService::new(pool.clone());
        let vouchers = VoucherService::new(pool.clone());
        let loyalty = LoyaltyService::new(pool.clone());
        let cart = CartService::new(pool.clone());
        let referrals = ReferralService::new(pool.clone());

        let fulfillment = FulfillmentService::new(
            ledger.clone(),
            vouchers.clone(),
            loyalty.clone(),
            cart.clone(),
            notifier.clone(),
            config.spin.voucher_validity_days,
        );
        let spin = SpinService::new(
            pool.clone(),
            EligibilityService::new(pool.clone(), config.spin.cooldown_hours),
            PrizePoolService::new(pool.clone()),
            fulfillment,
            config.spin.new_user_fallback_percent,
        );
        let rewards = RewardsService::new(
            pool,
            config.rewards.clone(),
            ledger.clone(),
            vouchers.clone(),
            loyalty,
            referrals.clone(),
            notifier,
        );

        Self {
            spin,
            rewards,
            ledger,
            vouchers,
            cart,
            referrals,
            deals: config.deals.clone(),
        }
    }

    pub fn configure_data(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.spin.clone()))
            .app_data(web::Data::new(self.rewards.clone()))
            .app_data(web::Data::new(self.ledger.clone()))
            .app_data(web::Data::new(self.vouchers.clone()))
            .app_data(web::Data::new(self.cart.clone()))
            .app_data(web::Data::new(self.referrals.clone()))
            .app_data(web::Data::new(self.deals.clone()));
    }
}
