use crate::config::RewardsConfig;
use crate::entities::{DiscountType, order_entity as orders, order_item_entity as order_items};
use crate::error::{AppError, AppResult};
use crate::external::{Notification, NotificationChannel, Notifier};
use crate::models::{CartLine, FreeDeliveryBonus, OrderRewards};
use crate::services::eligibility::settled_order_count;
use crate::services::fulfillment_service::format_naira;
use crate::services::ledger_service::{CreditOutcome, CreditRequest, LedgerService};
use crate::services::loyalty_service::{AwardOutcome, LoyaltyService};
use crate::services::referral_service::ReferralService;
use crate::services::voucher_service::{IssueVoucher, VoucherService};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

/// `amount × percent / 100`, floored.
pub fn percent_of(amount: i64, percent: i64) -> i64 {
    amount.max(0) * percent / 100
}

/// Flat bonuses for qualifying cart combinations. Both may apply.
pub fn cart_bonus(config: &RewardsConfig, items: &[CartLine]) -> i64 {
    let has_chicken = items.iter().any(|i| i.name_contains("chicken"));
    if !has_chicken {
        return 0;
    }
    let has_rice_10kg = items
        .iter()
        .any(|i| i.name_contains("rice") && i.is_ten_kg());
    let has_beef = items.iter().any(|i| i.name_contains("beef"));

    let mut bonus = 0;
    if has_rice_10kg {
        bonus += config.rice_chicken_bonus;
    }
    if has_beef {
        bonus += config.beef_chicken_bonus;
    }
    bonus
}

pub fn cashback_for(config: &RewardsConfig, amount_paid: i64, items: &[CartLine]) -> i64 {
    if amount_paid < config.cashback_threshold {
        return 0;
    }
    percent_of(amount_paid, config.cashback_percent) + cart_bonus(config, items)
}

/// Highest tier reached, never the sum of crossed tiers.
pub fn loyalty_points_for(config: &RewardsConfig, amount_paid: i64) -> i64 {
    config
        .loyalty_tiers
        .iter()
        .filter(|(threshold, _)| amount_paid >= *threshold)
        .map(|(_, points)| *points)
        .max()
        .unwrap_or(0)
}

#[derive(Clone)]
pub struct RewardsService {
    pool: DatabaseConnection,
    config: RewardsConfig,
    ledger: LedgerService,
    vouchers: VoucherService,
    loyalty: LoyaltyService,
    referrals: ReferralService,
    notifier: Notifier,
}

impl RewardsService {
    pub fn new(
        pool: DatabaseConnection,
        config: RewardsConfig,
        ledger: LedgerService,
        vouchers: VoucherService,
        loyalty: LoyaltyService,
        referrals: ReferralService,
        notifier: Notifier,
    ) -> Self {
        Self {
            pool,
            config,
            ledger,
            vouchers,
            loyalty,
            referrals,
            notifier,
        }
    }

    /// 订单奖励入口：订单须属于调用者且已支付/已完成
    pub async fn process_order(&self, user_id: i64, order_id: i64) -> AppResult<OrderRewards> {
        let order = orders::Entity::find_by_id(order_id)
            .one(&self.pool)
            .await?
            .filter(|o| o.user_id == user_id)
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

        if !order.status.is_settled() {
            return Err(AppError::ValidationError(
                "Rewards are only available for paid orders".to_string(),
            ));
        }

        let items: Vec<CartLine> = order_items::Entity::find()
            .filter(order_items::Column::OrderId.eq(order.id))
            .order_by_asc(order_items::Column::Id)
            .all(&self.pool)
            .await?
            .iter()
            .map(CartLine::from)
            .collect();

        self.process_order_rewards(user_id, order.id, order.amount_paid, &items)
            .await
    }

    /// 四条规则相互独立，可同时命中；每条都以订单号作为幂等键
    pub async fn process_order_rewards(
        &self,
        user_id: i64,
        order_id: i64,
        amount_paid: i64,
        items: &[CartLine],
    ) -> AppResult<OrderRewards> {
        let now = Utc::now();
        let mut rewards = OrderRewards::default();

        let cashback = cashback_for(&self.config, amount_paid, items);
        if cashback > 0 {
            let outcome = self
                .ledger
                .credit(CreditRequest {
                    user_id,
                    amount: cashback,
                    reference: format!("CASHBACK-{order_id}"),
                    gateway: "cashback".to_string(),
                    description: Some(format!("Cashback on order #{order_id}")),
                })
                .await?;
            if let CreditOutcome::Credited { .. } = outcome {
                self.notify(
                    user_id,
                    "Cashback credited",
                    format!("{} cashback from order #{order_id} is in your wallet.", format_naira(cashback)),
                );
            }
            rewards.cashback = cashback;
        }

        if amount_paid >= self.config.free_delivery_threshold {
            let issued = self
                .vouchers
                .issue(IssueVoucher {
                    owner_user_id: user_id,
                    discount_type: DiscountType::Fixed,
                    discount_value: self.config.free_delivery_value,
                    validity_days: self.config.free_delivery_validity_days,
                    max_uses: 1,
                    reference: Some(format!("FREEDEL-{order_id}")),
                    code_prefix: "FREEDEL",
                })
                .await?;
            if issued.newly_issued {
                self.notify(
                    user_id,
                    "Free delivery on your next order",
                    format!("Use code {} on your next order.", issued.voucher.code),
                );
            }
            rewards.free_delivery_bonus = Some(FreeDeliveryBonus {
                code: issued.voucher.code,
                value: issued.voucher.discount_value,
                valid_to: issued.voucher.valid_to,
            });
        }

        let points = loyalty_points_for(&self.config, amount_paid);
        if points > 0 {
            let outcome = self
                .loyalty
                .award(
                    user_id,
                    points,
                    &format!("POINTS-{order_id}"),
                    Some(format!("Order #{order_id}")),
                )
                .await?;
            if let AwardOutcome::Awarded { total_points } = outcome {
                self.notify(
                    user_id,
                    "Loyalty points earned",
                    format!("You earned {points} point(s). Balance: {total_points}."),
                );
            }
            rewards.points_awarded = points;
        }

        rewards.referral_bonus = self.referral_bonus(user_id, amount_paid, now).await?;

        log::info!(
            "Order #{order_id} rewards for user {user_id}: cashback {}, free delivery {}, points {}, referral {}",
            rewards.cashback,
            rewards.free_delivery_bonus.is_some(),
            rewards.points_awarded,
            rewards.referral_bonus
        );
        Ok(rewards)
    }

    /// 仅首单触发。先入账再领取：入账以 REF-BONUS-{id} 幂等，
    /// 领取为条件更新，两者都保证推荐奖励只发一次
    async fn referral_bonus(&self, referred_user_id: i64, amount_paid: i64, now: DateTime<Utc>) -> AppResult<i64> {
        let order_count = settled_order_count(&self.pool, referred_user_id).await?;
        if order_count != 1 {
            return Ok(0);
        }

        self.referrals.qualify(referred_user_id, now).await?;
        let Some(referral) = self.referrals.find_qualified(referred_user_id).await? else {
            return Ok(0);
        };

        let bonus = percent_of(amount_paid, self.config.referral_bonus_percent);
        if bonus <= 0 {
            return Ok(0);
        }

        self.ledger
            .credit(CreditRequest {
                user_id: referral.referrer_user_id,
                amount: bonus,
                reference: format!("REF-BONUS-{}", referral.id),
                gateway: "referral".to_string(),
                description: Some("Referral bonus".to_string()),
            })
            .await?;

        // 并发重跑时只有领取成功的一方报告奖励
        if !self.referrals.claim(referral.id, bonus, now).await? {
            log::info!("Referral {} already claimed, bonus not reported", referral.id);
            return Ok(0);
        }

        self.notify(
            referral.referrer_user_id,
            "Referral bonus",
            format!("Your friend placed their first order. {} is in your wallet.", format_naira(bonus)),
        );
        Ok(bonus)
    }

    fn notify(&self, user_id: i64, title: &str, body: String) {
        for channel in [NotificationChannel::Push, NotificationChannel::Email] {
            self.notifier
                .notify_best_effort(Notification::to_user(user_id, channel, title, body.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RewardsConfig {
        RewardsConfig::default()
    }

    #[test]
    fn cashback_includes_rice_and_chicken_bonus() {
        let items = vec![
            CartLine::new("Premium Rice 10kg", 60_000),
            CartLine::new("Whole Chicken", 40_000),
        ];
        assert_eq!(cashback_for(&config(), 100_000, &items), 12_000);
    }

    #[test]
    fn both_flat_bonuses_stack() {
        let items = vec![
            CartLine::new("Rice 10 kg", 30_000),
            CartLine::new("Chicken Thighs", 10_000),
            CartLine::new("Beef Cubes", 10_000),
        ];
        assert_eq!(cart_bonus(&config(), &items), 3_000);
        assert_eq!(cashback_for(&config(), 50_000, &items), 8_000);
    }

    #[test]
    fn bonus_needs_chicken_and_threshold() {
        let items = vec![CartLine::new("Rice 10kg", 30_000), CartLine::new("Beef", 5_000)];
        assert_eq!(cart_bonus(&config(), &items), 0);

        let chicken = vec![CartLine::new("Rice 10kg", 1), CartLine::new("Chicken", 1)];
        assert_eq!(cashback_for(&config(), 24_999, &chicken), 0);
        assert_eq!(cashback_for(&config(), 25_000, &[]), 2_500);
    }

    #[test]
    fn loyalty_awards_highest_tier_only() {
        let c = config();
        assert_eq!(loyalty_points_for(&c, 199_999), 0);
        assert_eq!(loyalty_points_for(&c, 200_000), 1);
        assert_eq!(loyalty_points_for(&c, 750_000), 2);
        assert_eq!(loyalty_points_for(&c, 2_000_000), 3);
    }

    #[test]
    fn percentages_are_floored() {
        assert_eq!(percent_of(25_005, 10), 2_500);
        assert_eq!(percent_of(9, 10), 0);
        assert_eq!(percent_of(-100, 10), 0);
    }
}
