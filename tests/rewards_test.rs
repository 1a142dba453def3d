//! Post-purchase rewards and referral bonus.

mod common;

use common::*;
use rewards_backend::AppError;
use rewards_backend::entities::{OrderStatus, ReferralStatus};
use rewards_backend::models::WalletTransactionQuery;

const RICE_AND_CHICKEN: &[(&str, i32, i64)] =
    &[("Premium Rice 10kg", 1, 60_000), ("Whole Chicken", 2, 20_000)];

mod order_rewards {
    use super::*;

    #[tokio::test]
    async fn cashback_free_delivery_and_points_stack() {
        let (db, services) = app_services().await;
        let user_id = seed_user(&db, "buyer@example.com").await;
        let order_id = seed_order(&db, user_id, 100_000, OrderStatus::Paid, RICE_AND_CHICKEN).await;

        let rewards = services.rewards.process_order(user_id, order_id).await.unwrap();
        assert_eq!(rewards.cashback, 12_000);
        assert_eq!(rewards.points_awarded, 0);
        assert_eq!(rewards.referral_bonus, 0);
        let bonus = rewards.free_delivery_bonus.expect("free delivery voucher");
        assert_eq!(bonus.value, 2_500);
        assert!(bonus.code.starts_with("FREEDEL"));

        let wallet = services.ledger.get_wallet(user_id).await.unwrap();
        assert_eq!(wallet.balance, 12_000);
        assert_eq!(load_user(&db, user_id).await.loyalty_points, 0);
    }

    #[tokio::test]
    async fn reprocessing_an_order_pays_nothing_twice() {
        let (db, services) = app_services().await;
        let user_id = seed_user(&db, "twice@example.com").await;
        let order_id = seed_order(&db, user_id, 250_000, OrderStatus::Completed, RICE_AND_CHICKEN).await;

        let first = services.rewards.process_order(user_id, order_id).await.unwrap();
        let second = services.rewards.process_order(user_id, order_id).await.unwrap();
        assert_eq!(first.cashback, second.cashback);
        assert_eq!(
            first.free_delivery_bonus.map(|b| b.code),
            second.free_delivery_bonus.map(|b| b.code)
        );

        let wallet = services.ledger.get_wallet(user_id).await.unwrap();
        assert_eq!(wallet.balance, first.cashback);
        assert_eq!(load_user(&db, user_id).await.loyalty_points, 1);
    }

    #[tokio::test]
    async fn small_orders_earn_nothing() {
        let (db, services) = app_services().await;
        let user_id = seed_user(&db, "small@example.com").await;
        let order_id = seed_order(&db, user_id, 5_000, OrderStatus::Paid, &[("Salt", 1, 5_000)]).await;

        let rewards = services.rewards.process_order(user_id, order_id).await.unwrap();
        assert_eq!(rewards, Default::default());
    }

    #[tokio::test]
    async fn rejects_foreign_and_unpaid_orders() {
        let (db, services) = app_services().await;
        let owner = seed_user(&db, "owner@example.com").await;
        let other = seed_user(&db, "other@example.com").await;
        let paid = seed_order(&db, owner, 30_000, OrderStatus::Paid, &[("Rice", 1, 30_000)]).await;
        let pending = seed_order(&db, owner, 30_000, OrderStatus::Pending, &[("Rice", 1, 30_000)]).await;

        let err = services.rewards.process_order(other, paid).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = services.rewards.process_order(owner, pending).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}

mod referral {
    use super::*;

    #[tokio::test]
    async fn bonus_fires_once_on_first_order() {
        let (db, services) = app_services().await;
        let referrer = seed_user(&db, "referrer@example.com").await;
        let referred = seed_user(&db, "friend@example.com").await;
        services.referrals.attribute(referrer, referred).await.unwrap();

        let first = seed_order(&db, referred, 30_000, OrderStatus::Paid, &[("Beans", 1, 30_000)]).await;
        let rewards = services.rewards.process_order(referred, first).await.unwrap();
        assert_eq!(rewards.referral_bonus, 3_000);

        let referral = services.referrals.find_for_referred(referred).await.unwrap().unwrap();
        assert_eq!(referral.status, ReferralStatus::Claimed);
        assert_eq!(referral.referrer_discount_amount, 3_000);
        assert!(referral.claimed_at.is_some());

        // 重跑首单与第二单都不再发放
        let rerun = services.rewards.process_order(referred, first).await.unwrap();
        assert_eq!(rerun.referral_bonus, 0);
        let second = seed_order(&db, referred, 40_000, OrderStatus::Paid, &[("Beans", 1, 40_000)]).await;
        let rewards = services.rewards.process_order(referred, second).await.unwrap();
        assert_eq!(rewards.referral_bonus, 0);

        let wallet = services.ledger.get_wallet(referrer).await.unwrap();
        assert_eq!(wallet.balance, 3_000);
        let txns = services
            .ledger
            .list_transactions(referrer, &WalletTransactionQuery { page: None, per_page: None })
            .await
            .unwrap();
        assert_eq!(txns.total, 1);
        assert_eq!(txns.data[0].gateway, "referral");
    }

    #[tokio::test]
    async fn concurrent_runs_report_the_bonus_once() {
        let (db, services) = app_services().await;
        let referrer = seed_user(&db, "host@example.com").await;
        let referred = seed_user(&db, "guest@example.com").await;
        services.referrals.attribute(referrer, referred).await.unwrap();
        let order = seed_order(&db, referred, 30_000, OrderStatus::Paid, &[("Beans", 1, 30_000)]).await;

        let (a, b) = tokio::join!(
            services.rewards.process_order(referred, order),
            services.rewards.process_order(referred, order)
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        let mut reported = [a.referral_bonus, b.referral_bonus];
        reported.sort();
        assert_eq!(reported, [0, 3_000]);

        let wallet = services.ledger.get_wallet(referrer).await.unwrap();
        assert_eq!(wallet.balance, 3_000);
        let referral = services.referrals.find_for_referred(referred).await.unwrap().unwrap();
        assert_eq!(referral.status, ReferralStatus::Claimed);
    }

    #[tokio::test]
    async fn attribution_rules() {
        let (db, services) = app_services().await;
        let a = seed_user(&db, "a@example.com").await;
        let b = seed_user(&db, "b@example.com").await;
        let c = seed_user(&db, "c@example.com").await;

        let err = services.referrals.attribute(a, a).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let err = services.referrals.attribute(9_999, b).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let referral = services.referrals.attribute(a, b).await.unwrap();
        assert_eq!(referral.status, ReferralStatus::Pending);

        let err = services.referrals.attribute(c, b).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
