//! Shared fixtures for database-backed tests.
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use migration::{Migrator, MigratorTrait};
use rewards_backend::config::{
    Config, DatabaseConfig, DealsConfig, JwtConfig, NotificationConfig, RewardsConfig,
    ServerConfig, SpinConfig,
};
use rewards_backend::entities::{
    OrderStatus, PrizeType, order_entity as orders, order_item_entity as order_items,
    spin_prize_entity as spin_prizes, user_entity as users,
};
use rewards_backend::services::AppServices;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, Set};

pub const JWT_SECRET: &str = "test-secret";

/// In-memory SQLite with the schema and default wheel applied. A single
/// connection keeps every query on the same in-memory database.
pub async fn test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".into(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: JWT_SECRET.into(),
        },
        notifications: NotificationConfig::default(),
        spin: SpinConfig::default(),
        rewards: RewardsConfig::default(),
        deals: DealsConfig::default(),
    }
}

pub async fn app_services() -> (DatabaseConnection, AppServices) {
    let db = test_db().await;
    let services = AppServices::new(db.clone(), &test_config());
    (db, services)
}

pub async fn seed_user(db: &DatabaseConnection, email: &str) -> i64 {
    let now = Utc::now();
    users::ActiveModel {
        email: Set(email.to_string()),
        display_name: Set(email.split('@').next().unwrap_or(email).to_string()),
        loyalty_points: Set(0),
        has_used_new_user_spin: Set(false),
        last_spin_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

pub async fn set_spin_state(
    db: &DatabaseConnection,
    user_id: i64,
    has_used_new_user_spin: bool,
    last_spin_at: Option<DateTime<Utc>>,
) {
    users::ActiveModel {
        id: Set(user_id),
        has_used_new_user_spin: Set(has_used_new_user_spin),
        last_spin_at: Set(last_spin_at),
        ..Default::default()
    }
    .update(db)
    .await
    .unwrap();
}

pub async fn load_user(db: &DatabaseConnection, user_id: i64) -> users::Model {
    users::Entity::find_by_id(user_id)
        .one(db)
        .await
        .unwrap()
        .unwrap()
}

/// Inserts an order with `(name, quantity, unit_price)` lines.
pub async fn seed_order(
    db: &DatabaseConnection,
    user_id: i64,
    amount_paid: i64,
    status: OrderStatus,
    lines: &[(&str, i32, i64)],
) -> i64 {
    let order = orders::ActiveModel {
        user_id: Set(user_id),
        amount_paid: Set(amount_paid),
        status: Set(status),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();

    for (idx, (name, quantity, unit_price)) in lines.iter().enumerate() {
        order_items::ActiveModel {
            order_id: Set(order.id),
            product_id: Set(idx as i64 + 100),
            product_name: Set(name.to_string()),
            category: Set(None),
            tags: Set(None),
            quantity: Set(*quantity),
            unit_price: Set(*unit_price),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();
    }
    order.id
}

/// Replaces the seeded wheel with the given prizes.
pub async fn replace_prizes(db: &DatabaseConnection, prizes: Vec<spin_prizes::ActiveModel>) {
    spin_prizes::Entity::delete_many().exec(db).await.unwrap();
    for prize in prizes {
        prize.insert(db).await.unwrap();
    }
}

pub fn prize(
    label: &str,
    prize_type: PrizeType,
    value: i64,
    probability: f64,
    new_user_only: bool,
) -> spin_prizes::ActiveModel {
    spin_prizes::ActiveModel {
        label: Set(label.to_string()),
        sub_label: Set(None),
        prize_type: Set(prize_type),
        value: Set(Some(value)),
        probability: Set(Some(probability)),
        linked_product_id: Set(None),
        new_user_only: Set(Some(new_user_only)),
        is_active: Set(true),
        slug: Set(None),
        color: Set(None),
        text_color: Set(None),
        sort_order: Set(0),
        ..Default::default()
    }
}
