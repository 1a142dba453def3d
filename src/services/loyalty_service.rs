use crate::entities::{loyalty_point_event_entity as point_events, user_entity as users};
use crate::error::{AppError, AppResult};
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwardOutcome {
    Awarded { total_points: i64 },
    Duplicate,
}

#[derive(Clone)]
pub struct LoyaltyService {
    pool: DatabaseConnection,
}

impl LoyaltyService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 积分发放：事件表 reference 唯一，先写事件再原子累加用户积分
    pub async fn award(
        &self,
        user_id: i64,
        points: i64,
        reference: &str,
        description: Option<String>,
    ) -> AppResult<AwardOutcome> {
        if points <= 0 {
            return Err(AppError::ValidationError(
                "Points to award must be positive".to_string(),
            ));
        }

        let now = Utc::now();
        let txn = self.pool.begin().await?;

        let inserted = point_events::Entity::insert(point_events::ActiveModel {
            user_id: Set(user_id),
            points: Set(points),
            reference: Set(reference.to_string()),
            description: Set(description),
            created_at: Set(now),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::column(point_events::Column::Reference)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

        if inserted == 0 {
            txn.rollback().await?;
            log::info!("Loyalty points {reference} already awarded, skipping");
            return Ok(AwardOutcome::Duplicate);
        }

        let updated = users::Entity::update_many()
            .col_expr(
                users::Column::LoyaltyPoints,
                Expr::col(users::Column::LoyaltyPoints).add(points),
            )
            .col_expr(users::Column::UpdatedAt, Expr::value(now))
            .filter(users::Column::Id.eq(user_id))
            .exec(&txn)
            .await?;

        if updated.rows_affected == 0 {
            txn.rollback().await?;
            return Err(AppError::NotFound(format!("User {user_id} not found")));
        }

        let total_points = users::Entity::find_by_id(user_id)
            .one(&txn)
            .await?
            .map(|u| u.loyalty_points)
            .unwrap_or(points);

        txn.commit().await?;

        log::info!("Awarded {points} loyalty points to user {user_id} ({reference})");
        Ok(AwardOutcome::Awarded { total_points })
    }
}
