//! Wallet ledger, voucher issuance and cart lines.

mod common;

use common::*;
use rewards_backend::AppError;
use rewards_backend::entities::DiscountType;
use rewards_backend::models::{VoucherQuery, WalletTransactionQuery};
use rewards_backend::services::{CreditOutcome, CreditRequest, IssueVoucher};

fn credit(user_id: i64, amount: i64, reference: &str) -> CreditRequest {
    CreditRequest {
        user_id,
        amount,
        reference: reference.to_string(),
        gateway: "test".to_string(),
        description: None,
    }
}

mod ledger {
    use super::*;

    #[tokio::test]
    async fn duplicate_reference_credits_once() {
        let (db, services) = app_services().await;
        let user_id = seed_user(&db, "ledger@example.com").await;

        let first = services.ledger.credit(credit(user_id, 1_500, "CASHBACK-1")).await.unwrap();
        assert_eq!(first, CreditOutcome::Credited { balance: 1_500 });

        let second = services.ledger.credit(credit(user_id, 1_500, "CASHBACK-1")).await.unwrap();
        assert_eq!(second, CreditOutcome::Duplicate);

        let wallet = services.ledger.get_wallet(user_id).await.unwrap();
        assert_eq!(wallet.balance, 1_500);

        let txns = services
            .ledger
            .list_transactions(user_id, &WalletTransactionQuery { page: None, per_page: None })
            .await
            .unwrap();
        assert_eq!(txns.total, 1);
        assert_eq!(txns.data[0].balance_after, 1_500);
    }

    #[tokio::test]
    async fn distinct_references_accumulate() {
        let (db, services) = app_services().await;
        let user_id = seed_user(&db, "acc@example.com").await;

        services.ledger.credit(credit(user_id, 500, "A")).await.unwrap();
        let outcome = services.ledger.credit(credit(user_id, 700, "B")).await.unwrap();
        assert_eq!(outcome, CreditOutcome::Credited { balance: 1_200 });
    }

    #[tokio::test]
    async fn rejects_non_positive_amounts_and_blank_references() {
        let (db, services) = app_services().await;
        let user_id = seed_user(&db, "bad@example.com").await;

        let err = services.ledger.credit(credit(user_id, 0, "ZERO")).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        let err = services.ledger.credit(credit(user_id, 10, "  ")).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let wallet = services.ledger.get_wallet(user_id).await.unwrap();
        assert_eq!(wallet.balance, 0);
    }
}

mod vouchers {
    use super::*;

    fn free_delivery(user_id: i64, reference: Option<&str>) -> IssueVoucher {
        IssueVoucher {
            owner_user_id: user_id,
            discount_type: DiscountType::Fixed,
            discount_value: 2_500,
            validity_days: 14,
            max_uses: 1,
            reference: reference.map(str::to_string),
            code_prefix: "FREEDEL",
        }
    }

    #[tokio::test]
    async fn same_reference_returns_existing_voucher() {
        let (db, services) = app_services().await;
        let user_id = seed_user(&db, "voucher@example.com").await;

        let first = services
            .vouchers
            .issue(free_delivery(user_id, Some("FREEDEL-7")))
            .await
            .unwrap();
        assert!(first.newly_issued);
        assert!(first.voucher.code.starts_with("FREEDEL"));

        let second = services
            .vouchers
            .issue(free_delivery(user_id, Some("FREEDEL-7")))
            .await
            .unwrap();
        assert!(!second.newly_issued);
        assert_eq!(second.voucher.code, first.voucher.code);

        let listed = services
            .vouchers
            .list_for_user(
                user_id,
                &VoucherQuery { page: None, per_page: None, active_only: Some(true) },
            )
            .await
            .unwrap();
        assert_eq!(listed.total, 1);
        assert!(listed.data[0].redeemable);
    }

    #[tokio::test]
    async fn unreferenced_vouchers_get_unique_codes() {
        let (db, services) = app_services().await;
        let user_id = seed_user(&db, "codes@example.com").await;

        let a = services.vouchers.issue(free_delivery(user_id, None)).await.unwrap();
        let b = services.vouchers.issue(free_delivery(user_id, None)).await.unwrap();
        assert_ne!(a.voucher.code, b.voucher.code);
    }
}

mod cart {
    use super::*;
    use chrono::Utc;
    use rewards_backend::entities::cart_item_entity as cart_items;
    use sea_orm::{ActiveModelTrait, Set};

    #[tokio::test]
    async fn prize_line_never_merges_with_paid_line() {
        let (db, services) = app_services().await;
        let user_id = seed_user(&db, "cart@example.com").await;

        cart_items::ActiveModel {
            user_id: Set(user_id),
            product_id: Set(42),
            quantity: Set(2),
            unit_price: Set(3_000),
            is_prize: Set(false),
            prize_reference: Set(None),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let prize = services.cart.add_prize_item(user_id, 42, "SPIN-1").await.unwrap();
        assert!(prize.is_prize);
        assert_eq!(prize.unit_price, 0);
        assert_eq!(prize.quantity, 1);

        // 同一 reference 重复加入不会产生第二行
        let again = services.cart.add_prize_item(user_id, 42, "SPIN-1").await.unwrap();
        assert_eq!(again.id, prize.id);

        let lines = services.cart.list_cart(user_id).await.unwrap();
        assert_eq!(lines.len(), 2);
        let paid = lines.iter().find(|l| !l.is_prize).unwrap();
        assert_eq!((paid.quantity, paid.unit_price), (2, 3_000));
        assert_eq!(lines.iter().filter(|l| l.is_prize).count(), 1);
    }
}
