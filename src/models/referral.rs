use crate::entities::{ReferralStatus, referral_entity as referrals};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReferralRequest {
    /// 推荐码即推荐人的用户 ID
    pub referrer_user_id: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReferralResponse {
    pub id: i64,
    pub referrer_user_id: i64,
    pub referred_user_id: i64,
    pub status: ReferralStatus,
    pub referrer_discount_amount: i64,
    pub qualified_at: Option<DateTime<Utc>>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<referrals::Model> for ReferralResponse {
    fn from(m: referrals::Model) -> Self {
        Self {
            id: m.id,
            referrer_user_id: m.referrer_user_id,
            referred_user_id: m.referred_user_id,
            status: m.status,
            referrer_discount_amount: m.referrer_discount_amount,
            qualified_at: m.qualified_at,
            claimed_at: m.claimed_at,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QualifyReferralResponse {
    pub qualified: bool,
}
