use crate::entities::{PrizeType, SpinRecordStatus, spin_record_entity as spin_records};
use crate::models::PaginatedResponse;
use crate::services::eligibility::SpinClass;
use crate::services::prize_pool::{Prize, PrizeDisplay};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// 转盘展示项（不含概率）
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SpinPrizeResponse {
    pub id: i64,
    pub label: String,
    pub sub_label: String,
    #[serde(rename = "type")]
    pub prize_type: PrizeType,
    pub value: i64,
    pub new_user_only: bool,
    pub display: PrizeDisplay,
}

impl From<&Prize> for SpinPrizeResponse {
    fn from(p: &Prize) -> Self {
        Self {
            id: p.id,
            label: p.label.clone(),
            sub_label: p.sub_label.clone(),
            prize_type: p.prize_type,
            value: p.value,
            new_user_only: p.new_user_only,
            display: p.display.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SpinStatusResponse {
    pub can_spin: bool,
    /// 可抽时的资格分类
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spin_class: Option<SpinClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_hours: Option<i64>,
    pub last_spin_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct WonPrizeData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WonPrize {
    /// 0 表示系统合成的奖品
    pub id: i64,
    pub label: String,
    #[serde(rename = "type")]
    pub prize_type: PrizeType,
    pub value: i64,
    pub data: WonPrizeData,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SpinResponse {
    pub success: bool,
    pub message: String,
    pub prize: WonPrize,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct SpinRecordQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SpinRecordResponse {
    pub id: i64,
    pub prize_id: Option<i64>,
    pub prize_label: String,
    pub prize_type: PrizeType,
    pub value: i64,
    pub reference: String,
    pub voucher_code: Option<String>,
    pub status: SpinRecordStatus,
    pub created_at: DateTime<Utc>,
}

impl From<spin_records::Model> for SpinRecordResponse {
    fn from(m: spin_records::Model) -> Self {
        Self {
            id: m.id,
            prize_id: m.prize_id,
            prize_label: m.prize_label,
            prize_type: m.prize_type,
            value: m.value,
            reference: m.reference,
            voucher_code: m.voucher_code,
            status: m.status,
            created_at: m.created_at,
        }
    }
}

pub type SpinRecordPageResponse = PaginatedResponse<SpinRecordResponse>;
