use crate::entities::{wallet_entity as wallets, wallet_transaction_entity as wallet_txns};
use crate::error::{AppError, AppResult};
use crate::models::{
    PaginatedResponse, PaginationParams, WalletResponse, WalletTransactionQuery,
    WalletTransactionResponse,
};
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// A positive credit keyed by a caller-chosen idempotency reference.
#[derive(Debug, Clone)]
pub struct CreditRequest {
    pub user_id: i64,
    pub amount: i64,
    pub reference: String,
    pub gateway: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditOutcome {
    Credited { balance: i64 },
    /// The reference was already booked; nothing changed.
    Duplicate,
}

#[derive(Clone)]
pub struct LedgerService {
    pool: DatabaseConnection,
}

impl LedgerService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 入账：余额原子自增 + 追加流水，同一事务内完成。
    /// 流水 reference 唯一，重复调用返回 Duplicate 且不改变余额。
    pub async fn credit(&self, request: CreditRequest) -> AppResult<CreditOutcome> {
        if request.amount <= 0 {
            return Err(AppError::ValidationError(
                "Credit amount must be positive".to_string(),
            ));
        }
        if request.reference.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Credit reference is required".to_string(),
            ));
        }

        if self.reference_exists(&request.reference).await? {
            log::info!(
                "Wallet credit {} already booked, skipping",
                request.reference
            );
            return Ok(CreditOutcome::Duplicate);
        }

        let now = Utc::now();
        let txn = self.pool.begin().await?;

        ensure_wallet(&txn, request.user_id).await?;

        wallets::Entity::update_many()
            .col_expr(
                wallets::Column::Balance,
                Expr::col(wallets::Column::Balance).add(request.amount),
            )
            .col_expr(wallets::Column::UpdatedAt, Expr::value(now))
            .filter(wallets::Column::UserId.eq(request.user_id))
            .exec(&txn)
            .await?;

        let balance = wallets::Entity::find()
            .filter(wallets::Column::UserId.eq(request.user_id))
            .one(&txn)
            .await?
            .map(|w| w.balance)
            .ok_or_else(|| DbErr::RecordNotFound("wallet".to_string()))?;

        let inserted = wallet_txns::Entity::insert(wallet_txns::ActiveModel {
            user_id: Set(request.user_id),
            amount: Set(request.amount),
            balance_after: Set(balance),
            reference: Set(request.reference.clone()),
            gateway: Set(request.gateway.clone()),
            description: Set(request.description.clone()),
            created_at: Set(now),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::column(wallet_txns::Column::Reference)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

        if inserted == 0 {
            // 并发请求先写入了同一 reference
            txn.rollback().await?;
            log::info!(
                "Wallet credit {} lost race to a concurrent booking",
                request.reference
            );
            return Ok(CreditOutcome::Duplicate);
        }

        txn.commit().await?;

        log::info!(
            "Credited {} to wallet of user {} via {} ({}), balance {}",
            request.amount,
            request.user_id,
            request.gateway,
            request.reference,
            balance
        );
        Ok(CreditOutcome::Credited { balance })
    }

    pub async fn reference_exists(&self, reference: &str) -> Result<bool, DbErr> {
        let count = wallet_txns::Entity::find()
            .filter(wallet_txns::Column::Reference.eq(reference))
            .count(&self.pool)
            .await?;
        Ok(count > 0)
    }

    /// 无钱包记录时视为余额 0
    pub async fn get_wallet(&self, user_id: i64) -> AppResult<WalletResponse> {
        let wallet = wallets::Entity::find()
            .filter(wallets::Column::UserId.eq(user_id))
            .one(&self.pool)
            .await?;
        Ok(WalletResponse {
            user_id,
            balance: wallet.as_ref().map(|w| w.balance).unwrap_or(0),
            updated_at: wallet.map(|w| w.updated_at),
        })
    }

    pub async fn list_transactions(
        &self,
        user_id: i64,
        query: &WalletTransactionQuery,
    ) -> AppResult<PaginatedResponse<WalletTransactionResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let base_query =
            wallet_txns::Entity::find().filter(wallet_txns::Column::UserId.eq(user_id));
        let total = base_query.clone().count(&self.pool).await? as i64;

        let items = base_query
            .order_by(wallet_txns::Column::CreatedAt, Order::Desc)
            .order_by(wallet_txns::Column::Id, Order::Desc)
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

async fn ensure_wallet<C: ConnectionTrait>(conn: &C, user_id: i64) -> Result<(), DbErr> {
    wallets::Entity::insert(wallets::ActiveModel {
        user_id: Set(user_id),
        balance: Set(0),
        updated_at: Set(Utc::now()),
        ..Default::default()
    })
    .on_conflict(
        OnConflict::column(wallets::Column::UserId)
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(conn)
    .await?;
    Ok(())
}
