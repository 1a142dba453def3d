use crate::entities::{OrderStatus, order_entity as orders, user_entity as users};
use crate::error::{AppError, AppResult};
use chrono::{DateTime, Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter,
};
use serde::Serialize;
use utoipa::ToSchema;

/// Which sub-pool and side effects a spin gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SpinClass {
    NewUser,
    /// Zero orders but the welcome spin is already spent.
    ReturningZeroOrders,
    Regular,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Blocked { retry_after_hours: i64 },
    Eligible(SpinClass),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpinProfile {
    pub user_id: i64,
    pub has_used_new_user_spin: bool,
    pub last_spin_at: Option<DateTime<Utc>>,
}

impl From<users::Model> for SpinProfile {
    fn from(m: users::Model) -> Self {
        Self {
            user_id: m.id,
            has_used_new_user_spin: m.has_used_new_user_spin,
            last_spin_at: m.last_spin_at,
        }
    }
}

/// Whole hours until the cooldown ends, or `None` when it already has.
/// Always within `1..=cooldown_hours` when `Some`.
pub fn retry_after_hours(
    last_spin_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    cooldown: Duration,
) -> Option<i64> {
    let last = last_spin_at?;
    // 时钟回拨时按刚抽过处理
    let elapsed = (now - last).max(Duration::zero());
    if elapsed >= cooldown {
        return None;
    }
    let remaining_ms = (cooldown - elapsed).num_milliseconds();
    let hours = (remaining_ms + 3_600_000 - 1) / 3_600_000;
    Some(hours.clamp(1, cooldown.num_hours().max(1)))
}

/// Cooldown first, so it applies to every class.
pub fn evaluate(
    profile: &SpinProfile,
    order_count: u64,
    now: DateTime<Utc>,
    cooldown: Duration,
) -> Eligibility {
    if let Some(retry_after_hours) = retry_after_hours(profile.last_spin_at, now, cooldown) {
        return Eligibility::Blocked { retry_after_hours };
    }

    let is_new_user = order_count == 0;
    if is_new_user && profile.has_used_new_user_spin {
        return Eligibility::Eligible(SpinClass::ReturningZeroOrders);
    }
    if is_new_user {
        return Eligibility::Eligible(SpinClass::NewUser);
    }
    Eligibility::Eligible(SpinClass::Regular)
}

/// Orders that count towards a user's history: paid or completed.
pub async fn settled_order_count<C: ConnectionTrait>(db: &C, user_id: i64) -> Result<u64, DbErr> {
    orders::Entity::find()
        .filter(orders::Column::UserId.eq(user_id))
        .filter(orders::Column::Status.is_in([OrderStatus::Paid, OrderStatus::Completed]))
        .count(db)
        .await
}

#[derive(Clone)]
pub struct EligibilityService {
    pool: DatabaseConnection,
    cooldown: Duration,
}

impl EligibilityService {
    pub fn new(pool: DatabaseConnection, cooldown_hours: i64) -> Self {
        Self {
            pool,
            cooldown: Duration::hours(cooldown_hours),
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Read-only: profile + settled order count. Storage failures here are
    /// `SystemError`s raised before anything has been written.
    pub async fn evaluate_user(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<(SpinProfile, Eligibility)> {
        let profile = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await
            .map_err(AppError::system)?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        let profile = SpinProfile::from(profile);
        let order_count = self.order_count(user_id).await.map_err(AppError::system)?;

        let eligibility = evaluate(&profile, order_count, now, self.cooldown);
        Ok((profile, eligibility))
    }

    pub async fn order_count(&self, user_id: i64) -> Result<u64, DbErr> {
        settled_order_count(&self.pool, user_id).await
    }

    /// Stamps `last_spin_at` (and the welcome flag for new users) with a single
    /// guarded UPDATE. Returns `false` when a concurrent request got there
    /// first; in that case nothing was written.
    pub async fn claim(&self, user_id: i64, class: SpinClass, now: DateTime<Utc>) -> AppResult<bool> {
        let cutoff = now - self.cooldown;

        let mut update = users::Entity::update_many()
            .col_expr(users::Column::LastSpinAt, Expr::value(now))
            .col_expr(users::Column::UpdatedAt, Expr::value(now))
            .filter(users::Column::Id.eq(user_id))
            .filter(
                Condition::any()
                    .add(users::Column::LastSpinAt.is_null())
                    .add(users::Column::LastSpinAt.lte(cutoff)),
            );

        if class == SpinClass::NewUser {
            update = update
                .col_expr(users::Column::HasUsedNewUserSpin, Expr::value(true))
                .filter(users::Column::HasUsedNewUserSpin.eq(false));
        }

        let result = update.exec(&self.pool).await?;
        Ok(result.rows_affected == 1)
    }

    /// Fresh cooldown hint after a lost claim.
    pub async fn current_retry_after(&self, user_id: i64, now: DateTime<Utc>) -> AppResult<i64> {
        let last_spin_at = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .and_then(|u| u.last_spin_at);
        Ok(retry_after_hours(last_spin_at, now, self.cooldown)
            .unwrap_or_else(|| self.cooldown.num_hours().max(1)))
    }
}
