use crate::entities::wallet_transaction_entity as wallet_txns;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WalletResponse {
    pub user_id: i64,
    /// 余额（最小货币单位）
    pub balance: i64,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct WalletTransactionQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WalletTransactionResponse {
    pub id: i64,
    pub amount: i64,
    pub balance_after: i64,
    /// 幂等键，如 SPIN-…、CASHBACK-{order_id}、REF-BONUS-{referral_id}
    pub reference: String,
    pub gateway: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<wallet_txns::Model> for WalletTransactionResponse {
    fn from(m: wallet_txns::Model) -> Self {
        Self {
            id: m.id,
            amount: m.amount,
            balance_after: m.balance_after,
            reference: m.reference,
            gateway: m.gateway,
            description: m.description,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WalletOverviewResponse {
    pub wallet: WalletResponse,
    #[schema(inline)]
    pub transactions: crate::models::PaginatedResponse<WalletTransactionResponse>,
}
