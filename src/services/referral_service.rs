use crate::entities::{ReferralStatus, referral_entity as referrals, user_entity as users};
use crate::error::{AppError, AppResult};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set, SqlErr,
};

#[derive(Clone)]
pub struct ReferralService {
    pool: DatabaseConnection,
}

impl ReferralService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 注册时归属推荐关系，每个被推荐用户仅一条
    pub async fn attribute(&self, referrer_user_id: i64, referred_user_id: i64) -> AppResult<referrals::Model> {
        if referrer_user_id == referred_user_id {
            return Err(AppError::ValidationError(
                "You cannot refer yourself".to_string(),
            ));
        }

        let referrer = users::Entity::find_by_id(referrer_user_id)
            .one(&self.pool)
            .await?;
        if referrer.is_none() {
            return Err(AppError::NotFound("Referrer not found".to_string()));
        }

        if self.find_for_referred(referred_user_id).await?.is_some() {
            return Err(AppError::ValidationError(
                "A referral is already recorded for this user".to_string(),
            ));
        }

        let referral = referrals::ActiveModel {
            referrer_user_id: Set(referrer_user_id),
            referred_user_id: Set(referred_user_id),
            status: Set(ReferralStatus::Pending),
            referrer_discount_amount: Set(0),
            qualified_at: Set(None),
            claimed_at: Set(None),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .map_err(|e| match e.sql_err() {
            // 唯一索引兜底并发重复归属
            Some(SqlErr::UniqueConstraintViolation(_)) => AppError::ValidationError(
                "A referral is already recorded for this user".to_string(),
            ),
            _ => AppError::DatabaseError(e),
        })?;

        log::info!("Referral {referrer_user_id} -> {referred_user_id} recorded");
        Ok(referral)
    }

    pub async fn find_for_referred(&self, referred_user_id: i64) -> Result<Option<referrals::Model>, DbErr> {
        referrals::Entity::find()
            .filter(referrals::Column::ReferredUserId.eq(referred_user_id))
            .one(&self.pool)
            .await
    }

    /// pending -> qualified. Returns whether a row moved.
    pub async fn qualify(&self, referred_user_id: i64, now: DateTime<Utc>) -> AppResult<bool> {
        let result = referrals::Entity::update_many()
            .col_expr(referrals::Column::Status, Expr::value(ReferralStatus::Qualified))
            .col_expr(referrals::Column::QualifiedAt, Expr::value(now))
            .filter(referrals::Column::ReferredUserId.eq(referred_user_id))
            .filter(referrals::Column::Status.eq(ReferralStatus::Pending))
            .exec(&self.pool)
            .await?;
        Ok(result.rows_affected == 1)
    }

    pub async fn find_qualified(&self, referred_user_id: i64) -> Result<Option<referrals::Model>, DbErr> {
        referrals::Entity::find()
            .filter(referrals::Column::ReferredUserId.eq(referred_user_id))
            .filter(referrals::Column::Status.eq(ReferralStatus::Qualified))
            .filter(referrals::Column::ClaimedAt.is_null())
            .one(&self.pool)
            .await
    }

    /// qualified -> claimed, exactly once. `false` means another run already
    /// claimed the row.
    pub async fn claim(&self, referral_id: i64, bonus: i64, now: DateTime<Utc>) -> AppResult<bool> {
        let result = referrals::Entity::update_many()
            .col_expr(referrals::Column::Status, Expr::value(ReferralStatus::Claimed))
            .col_expr(referrals::Column::ClaimedAt, Expr::value(now))
            .col_expr(referrals::Column::ReferrerDiscountAmount, Expr::value(bonus))
            .filter(referrals::Column::Id.eq(referral_id))
            .filter(referrals::Column::Status.eq(ReferralStatus::Qualified))
            .filter(referrals::Column::ClaimedAt.is_null())
            .exec(&self.pool)
            .await?;

        let claimed = result.rows_affected == 1;
        if claimed {
            log::info!("Referral {referral_id} claimed with bonus {bonus}");
        }
        Ok(claimed)
    }
}
