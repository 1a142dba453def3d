//! Routes a validated prize to the subsystem that delivers it.
//!
//! Every branch is keyed by the spin reference, so replaying a fulfillment
//! for the same spin never pays out twice.

use crate::entities::DiscountType;
use crate::error::AppResult;
use crate::external::{Notification, NotificationChannel, Notifier};
use crate::services::cart_service::CartService;
use crate::services::ledger_service::{CreditRequest, LedgerService};
use crate::services::loyalty_service::LoyaltyService;
use crate::services::prize_pool::PrizeReward;
use crate::services::voucher_service::{IssueVoucher, VoucherService};
use crate::services::weighted_selector::SelectedPrize;
use serde_json::json;

pub const SPIN_GATEWAY: &str = "spin_wheel";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fulfillment {
    pub message: String,
    pub voucher_code: Option<String>,
}

impl Fulfillment {
    fn message(message: String) -> Self {
        Self {
            message,
            voucher_code: None,
        }
    }
}

#[derive(Clone)]
pub struct FulfillmentService {
    ledger: LedgerService,
    vouchers: VoucherService,
    loyalty: LoyaltyService,
    cart: CartService,
    notifier: Notifier,
    voucher_validity_days: i64,
}

impl FulfillmentService {
    pub fn new(
        ledger: LedgerService,
        vouchers: VoucherService,
        loyalty: LoyaltyService,
        cart: CartService,
        notifier: Notifier,
        voucher_validity_days: i64,
    ) -> Self {
        Self {
            ledger,
            vouchers,
            loyalty,
            cart,
            notifier,
            voucher_validity_days,
        }
    }

    pub async fn fulfill(
        &self,
        user_id: i64,
        selected: &SelectedPrize,
        spin_ref: &str,
    ) -> AppResult<Fulfillment> {
        let label = &selected.prize.label;

        match selected.reward {
            PrizeReward::NoWin => Ok(Fulfillment::message(
                "No win this time. Try again tomorrow!".to_string(),
            )),

            PrizeReward::WalletCash { amount } => {
                if amount > 0 {
                    self.ledger
                        .credit(CreditRequest {
                            user_id,
                            amount,
                            reference: spin_ref.to_string(),
                            gateway: SPIN_GATEWAY.to_string(),
                            description: Some(format!("Spin prize: {label}")),
                        })
                        .await?;
                }
                Ok(Fulfillment::message(format!(
                    "You won {}! It has been added to your wallet.",
                    format_naira(amount)
                )))
            }

            PrizeReward::VoucherPercent { percent } => {
                let code = self
                    .issue_voucher(user_id, DiscountType::Percentage, percent, spin_ref)
                    .await?;
                self.announce_voucher(user_id, label, &code);
                Ok(Fulfillment {
                    message: format!("You won {percent}% off your next order! Use code {code}."),
                    voucher_code: Some(code),
                })
            }

            PrizeReward::FreeDelivery { amount } => {
                let code = self
                    .issue_voucher(user_id, DiscountType::Fixed, amount, spin_ref)
                    .await?;
                self.announce_voucher(user_id, label, &code);
                Ok(Fulfillment {
                    message: format!("You won free delivery! Use code {code} at checkout."),
                    voucher_code: Some(code),
                })
            }

            PrizeReward::LoyaltyPoints { points } => {
                if points > 0 {
                    self.loyalty
                        .award(user_id, points, spin_ref, Some(format!("Spin prize: {label}")))
                        .await?;
                }
                Ok(Fulfillment::message(format!(
                    "You won {points} loyalty points!"
                )))
            }

            PrizeReward::Item { product_id } => {
                self.cart.add_prize_item(user_id, product_id, spin_ref).await?;
                self.notifier.notify_best_effort(
                    Notification::to_user(
                        user_id,
                        NotificationChannel::Ops,
                        "Physical prize won",
                        format!("User {user_id} won {label} (product {product_id})"),
                    )
                    .with_metadata(json!({
                        "product_id": product_id,
                        "reference": spin_ref,
                    })),
                );
                Ok(Fulfillment::message(format!(
                    "You won {label}! It has been added to your cart for free."
                )))
            }
        }
    }

    async fn issue_voucher(
        &self,
        user_id: i64,
        discount_type: DiscountType,
        value: i64,
        spin_ref: &str,
    ) -> AppResult<String> {
        let issued = self
            .vouchers
            .issue(IssueVoucher {
                owner_user_id: user_id,
                discount_type,
                discount_value: value,
                validity_days: self.voucher_validity_days,
                max_uses: 1,
                reference: Some(spin_ref.to_string()),
                code_prefix: "SPIN",
            })
            .await?;
        Ok(issued.voucher.code)
    }

    fn announce_voucher(&self, user_id: i64, label: &str, code: &str) {
        let body = format!(
            "Congratulations! You won {label}. Use code {code} within {} days.",
            self.voucher_validity_days
        );
        for channel in [NotificationChannel::Email, NotificationChannel::InApp] {
            self.notifier.notify_best_effort(
                Notification::to_user(user_id, channel, "You won a voucher", body.clone())
                    .with_metadata(json!({ "code": code })),
            );
        }
    }
}

/// `2500` -> `₦2,500`
pub fn format_naira(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}₦{grouped}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naira_amounts_are_grouped() {
        assert_eq!(format_naira(0), "₦0");
        assert_eq!(format_naira(500), "₦500");
        assert_eq!(format_naira(2_500), "₦2,500");
        assert_eq!(format_naira(1_000_000), "₦1,000,000");
        assert_eq!(format_naira(-12_000), "-₦12,000");
    }
}
