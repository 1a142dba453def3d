use crate::entities::{SpinRecordStatus, spin_record_entity as spin_records};
use crate::error::{AppError, AppResult};
use crate::models::{
    PaginatedResponse, PaginationParams, SpinPrizeResponse, SpinRecordPageResponse,
    SpinRecordQuery, SpinResponse, SpinStatusResponse, WonPrize, WonPrizeData,
};
use crate::services::eligibility::{Eligibility, EligibilityService, SpinClass};
use crate::services::fulfillment_service::{Fulfillment, FulfillmentService};
use crate::services::prize_pool::PrizePoolService;
use crate::services::weighted_selector::{SelectedPrize, select_prize};
use crate::utils::generate_spin_reference;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

#[derive(Clone)]
pub struct SpinService {
    pool: DatabaseConnection,
    eligibility: EligibilityService,
    prize_pool: PrizePoolService,
    fulfillment: FulfillmentService,
    new_user_fallback_percent: i64,
}

impl SpinService {
    pub fn new(
        pool: DatabaseConnection,
        eligibility: EligibilityService,
        prize_pool: PrizePoolService,
        fulfillment: FulfillmentService,
        new_user_fallback_percent: i64,
    ) -> Self {
        Self {
            pool,
            eligibility,
            prize_pool,
            fulfillment,
            new_user_fallback_percent,
        }
    }

    pub async fn request_spin(&self, user_id: i64) -> AppResult<SpinResponse> {
        self.request_spin_at(user_id, Utc::now()).await
    }

    /// 抽奖流程:
    /// 1. 资格判定（冷却期优先，适用于所有分类）
    /// 2. 条件更新占用本次抽奖（冷却戳 / 新用户标记），并发请求只有一个成功
    /// 3. 按分类抽取并校验奖品
    /// 4. 履约；失败时占用不回滚，记录失败的抽奖记录
    pub async fn request_spin_at(&self, user_id: i64, now: DateTime<Utc>) -> AppResult<SpinResponse> {
        let (_, eligibility) = self.eligibility.evaluate_user(user_id, now).await?;
        let class = match eligibility {
            Eligibility::Blocked { retry_after_hours } => {
                log::info!("Spin rejected for user {user_id}: cooldown {retry_after_hours}h");
                return Err(AppError::CooldownActive { retry_after_hours });
            }
            Eligibility::Eligible(class) => class,
        };

        let prizes = self.prize_pool.load().await.map_err(AppError::system)?;
        let class = self.claim(user_id, class, now).await?;

        let selected = {
            let mut rng = rand::thread_rng();
            select_prize(class, &prizes, &mut rng, self.new_user_fallback_percent)
        };
        let spin_ref = generate_spin_reference(user_id);

        match self.fulfillment.fulfill(user_id, &selected, &spin_ref).await {
            Ok(fulfillment) => {
                self.record(user_id, &selected, &spin_ref, &fulfillment, SpinRecordStatus::Fulfilled, now)
                    .await;
                log::info!(
                    "User {user_id} ({class:?}) won {} [{}] ref {spin_ref}",
                    selected.prize.label,
                    selected.prize.prize_type
                );
                Ok(SpinResponse {
                    success: true,
                    message: fulfillment.message,
                    prize: WonPrize {
                        id: selected.prize.id,
                        label: selected.prize.label,
                        prize_type: selected.prize.prize_type,
                        value: selected.prize.value,
                        data: WonPrizeData {
                            code: fulfillment.voucher_code,
                        },
                    },
                })
            }
            Err(e) => {
                log::error!(
                    "Failed to fulfill {} [{}] for user {user_id} ref {spin_ref}: {e}",
                    selected.prize.label,
                    selected.prize.prize_type
                );
                let failed = Fulfillment {
                    message: String::new(),
                    voucher_code: None,
                };
                self.record(user_id, &selected, &spin_ref, &failed, SpinRecordStatus::Failed, now)
                    .await;
                Err(AppError::FulfillmentFailure(e.to_string()))
            }
        }
    }

    /// 条件更新失败说明有并发请求先占用；重新判定后最多再试一次
    async fn claim(&self, user_id: i64, mut class: SpinClass, now: DateTime<Utc>) -> AppResult<SpinClass> {
        for _ in 0..2 {
            if self
                .eligibility
                .claim(user_id, class, now)
                .await
                .map_err(AppError::system)?
            {
                return Ok(class);
            }
            log::warn!("Spin claim for user {user_id} ({class:?}) lost to a concurrent request");

            match self.eligibility.evaluate_user(user_id, now).await?.1 {
                Eligibility::Blocked { retry_after_hours } => {
                    return Err(AppError::CooldownActive { retry_after_hours });
                }
                Eligibility::Eligible(next) => class = next,
            }
        }

        let retry_after_hours = self
            .eligibility
            .current_retry_after(user_id, now)
            .await
            .map_err(AppError::system)?;
        Err(AppError::CooldownActive { retry_after_hours })
    }

    /// 记录写入失败不影响已确定的结果
    async fn record(
        &self,
        user_id: i64,
        selected: &SelectedPrize,
        spin_ref: &str,
        fulfillment: &Fulfillment,
        status: SpinRecordStatus,
        now: DateTime<Utc>,
    ) {
        let result = spin_records::ActiveModel {
            user_id: Set(user_id),
            prize_id: Set(Some(selected.prize.id).filter(|id| *id > 0)),
            prize_label: Set(selected.prize.label.clone()),
            prize_type: Set(selected.prize.prize_type),
            value: Set(selected.prize.value),
            reference: Set(spin_ref.to_string()),
            voucher_code: Set(fulfillment.voucher_code.clone()),
            status: Set(status),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await;

        if let Err(e) = result {
            log::error!("Failed to write spin record {spin_ref} for user {user_id}: {e}");
        }
    }

    pub async fn spin_status(&self, user_id: i64) -> AppResult<SpinStatusResponse> {
        let (profile, eligibility) = self.eligibility.evaluate_user(user_id, Utc::now()).await?;
        Ok(match eligibility {
            Eligibility::Blocked { retry_after_hours } => SpinStatusResponse {
                can_spin: false,
                spin_class: None,
                retry_after_hours: Some(retry_after_hours),
                last_spin_at: profile.last_spin_at,
            },
            Eligibility::Eligible(class) => SpinStatusResponse {
                can_spin: true,
                spin_class: Some(class),
                retry_after_hours: None,
                last_spin_at: profile.last_spin_at,
            },
        })
    }

    pub async fn list_prizes(&self) -> AppResult<Vec<SpinPrizeResponse>> {
        let pool = self.prize_pool.load().await?;
        Ok(pool.prizes().iter().map(SpinPrizeResponse::from).collect())
    }

    pub async fn list_records(
        &self,
        user_id: i64,
        query: &SpinRecordQuery,
    ) -> AppResult<SpinRecordPageResponse> {
        let params = PaginationParams::new(query.page, query.per_page);

        let base_query =
            spin_records::Entity::find().filter(spin_records::Column::UserId.eq(user_id));
        let total = base_query.clone().count(&self.pool).await? as i64;

        let items = base_query
            .order_by(spin_records::Column::CreatedAt, Order::Desc)
            .order_by(spin_records::Column::Id, Order::Desc)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(PaginatedResponse::new(
            items,
            params.get_page(),
            params.get_limit(),
            total,
        ))
    }
}
