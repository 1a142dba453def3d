use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FreeDeliveryBonus {
    pub code: String,
    pub value: i64,
    pub valid_to: DateTime<Utc>,
}

/// Rewards attributed to one order. Re-running an order reports the same
/// amounts; the ledger guarantees they are only paid once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderRewards {
    pub cashback: i64,
    pub free_delivery_bonus: Option<FreeDeliveryBonus>,
    pub points_awarded: i64,
    pub referral_bonus: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderRewardsResponse {
    pub success: bool,
    pub rewards: OrderRewards,
}
