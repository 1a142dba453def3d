use crate::entities::cart_item_entity as cart_items;
use crate::error::AppResult;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};

#[derive(Clone)]
pub struct CartService {
    pool: DatabaseConnection,
}

impl CartService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 奖品行：单价 0、数量 1，以 prize_reference 去重，从不与付费行合并
    pub async fn add_prize_item(
        &self,
        user_id: i64,
        product_id: i64,
        prize_reference: &str,
    ) -> AppResult<cart_items::Model> {
        cart_items::Entity::insert(cart_items::ActiveModel {
            user_id: Set(user_id),
            product_id: Set(product_id),
            quantity: Set(1),
            unit_price: Set(0),
            is_prize: Set(true),
            prize_reference: Set(Some(prize_reference.to_string())),
            created_at: Set(Utc::now()),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::column(cart_items::Column::PrizeReference)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&self.pool)
        .await?;

        let line = cart_items::Entity::find()
            .filter(cart_items::Column::PrizeReference.eq(prize_reference))
            .one(&self.pool)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("cart prize {prize_reference}")))?;

        log::info!(
            "Added prize item {} to cart of user {} ({})",
            product_id,
            user_id,
            prize_reference
        );
        Ok(line)
    }

    pub async fn list_cart(&self, user_id: i64) -> AppResult<Vec<cart_items::Model>> {
        Ok(cart_items::Entity::find()
            .filter(cart_items::Column::UserId.eq(user_id))
            .order_by_asc(cart_items::Column::Id)
            .all(&self.pool)
            .await?)
    }
}
