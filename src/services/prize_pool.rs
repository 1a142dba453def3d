//! Prize pool loading and normalization.
//!
//! Admin-edited prize rows arrive with many optional columns. Everything is
//! defaulted here so the selector only ever sees a fully populated [`Prize`];
//! the type-specific payload is exposed as the closed [`PrizeReward`] variant.

use crate::entities::{PrizeType, spin_prize_entity as prizes};
use crate::error::AppResult;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

const DEFAULT_COLORS: [&str; 6] = [
    "#E4572E", "#F3A712", "#29335C", "#669BBC", "#A8C686", "#8E7DBE",
];
const DEFAULT_TEXT_COLOR: &str = "#FFFFFF";

/// Display-only attributes. Never consulted by selection.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PrizeDisplay {
    pub slug: String,
    pub color: String,
    pub text_color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prize {
    /// 0 for prizes synthesized by the engine (not in the config table)
    pub id: i64,
    pub label: String,
    pub sub_label: String,
    pub prize_type: PrizeType,
    pub value: i64,
    pub probability: f64,
    pub linked_product_id: Option<i64>,
    pub new_user_only: bool,
    pub display: PrizeDisplay,
}

/// What a prize actually delivers once validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrizeReward {
    NoWin,
    WalletCash { amount: i64 },
    VoucherPercent { percent: i64 },
    FreeDelivery { amount: i64 },
    LoyaltyPoints { points: i64 },
    Item { product_id: i64 },
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("prize {prize_id} ({label}) is an item prize without a linked product")]
pub struct InvalidPrizeConfiguration {
    pub prize_id: i64,
    pub label: String,
}

impl Prize {
    pub fn reward(&self) -> Result<PrizeReward, InvalidPrizeConfiguration> {
        Ok(match self.prize_type {
            PrizeType::None => PrizeReward::NoWin,
            PrizeType::WalletCash => PrizeReward::WalletCash { amount: self.value },
            PrizeType::VoucherPercent => PrizeReward::VoucherPercent {
                percent: self.value,
            },
            PrizeType::FreeDelivery => PrizeReward::FreeDelivery { amount: self.value },
            PrizeType::LoyaltyPoints => PrizeReward::LoyaltyPoints { points: self.value },
            PrizeType::Item => match self.linked_product_id {
                Some(product_id) => PrizeReward::Item { product_id },
                None => {
                    return Err(InvalidPrizeConfiguration {
                        prize_id: self.id,
                        label: self.label.clone(),
                    });
                }
            },
        })
    }

    /// Engine-provided "no win" used when the pool has no `None` prize.
    pub fn no_win() -> Self {
        Self::synthesized("Better luck next time", PrizeType::None, 0)
    }

    /// Guaranteed new-customer prize when no `new_user_only` prize is configured.
    pub fn new_user_fallback(percent: i64) -> Self {
        let mut prize = Self::synthesized(
            &format!("{percent}% Off Welcome Voucher"),
            PrizeType::VoucherPercent,
            percent,
        );
        prize.new_user_only = true;
        prize
    }

    fn synthesized(label: &str, prize_type: PrizeType, value: i64) -> Self {
        Self {
            id: 0,
            label: label.to_string(),
            sub_label: String::new(),
            prize_type,
            value,
            probability: 0.0,
            linked_product_id: None,
            new_user_only: false,
            display: PrizeDisplay {
                slug: slugify(label),
                color: DEFAULT_COLORS[0].to_string(),
                text_color: DEFAULT_TEXT_COLOR.to_string(),
            },
        }
    }
}

/// Normalized, ordered list of active prizes.
#[derive(Debug, Clone, Default)]
pub struct PrizePool {
    prizes: Vec<Prize>,
}

impl PrizePool {
    pub fn new(prizes: Vec<Prize>) -> Self {
        Self { prizes }
    }

    /// Builds the pool from config rows, dropping inactive ones and applying
    /// defaults. Row order is preserved.
    pub fn from_rows(rows: Vec<prizes::Model>) -> Self {
        let prizes = rows
            .into_iter()
            .filter(|row| row.is_active)
            .enumerate()
            .map(|(idx, row)| normalize(row, idx))
            .collect();
        Self { prizes }
    }

    pub fn prizes(&self) -> &[Prize] {
        &self.prizes
    }

    pub fn first_no_win(&self) -> Option<&Prize> {
        self.prizes.iter().find(|p| p.prize_type == PrizeType::None)
    }

    pub fn new_user_prizes(&self) -> Vec<&Prize> {
        self.prizes.iter().filter(|p| p.new_user_only).collect()
    }

    pub fn regular_prizes(&self) -> Vec<&Prize> {
        self.prizes.iter().filter(|p| !p.new_user_only).collect()
    }
}

fn normalize(row: prizes::Model, idx: usize) -> Prize {
    let label = match row.label.trim() {
        "" => format!("Prize #{}", row.id),
        trimmed => trimmed.to_string(),
    };

    let probability = match row.probability {
        Some(p) if p.is_finite() => p.clamp(0.0, 1.0),
        _ => 0.0,
    };

    let mut value = row.value.unwrap_or(0).max(0);
    if row.prize_type == PrizeType::VoucherPercent {
        value = value.min(100);
    }

    let slug = row
        .slug
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| slugify(&label));

    Prize {
        id: row.id,
        sub_label: row.sub_label.unwrap_or_default(),
        prize_type: row.prize_type,
        value,
        probability,
        linked_product_id: row.linked_product_id.filter(|id| *id > 0),
        new_user_only: row.new_user_only.unwrap_or(false),
        display: PrizeDisplay {
            slug,
            color: row
                .color
                .unwrap_or_else(|| DEFAULT_COLORS[idx % DEFAULT_COLORS.len()].to_string()),
            text_color: row
                .text_color
                .unwrap_or_else(|| DEFAULT_TEXT_COLOR.to_string()),
        },
        label,
    }
}

fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

#[derive(Clone)]
pub struct PrizePoolService {
    pool: DatabaseConnection,
}

impl PrizePoolService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn load(&self) -> AppResult<PrizePool> {
        let rows = prizes::Entity::find()
            .filter(prizes::Column::IsActive.eq(true))
            .order_by_asc(prizes::Column::SortOrder)
            .order_by_asc(prizes::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(PrizePool::from_rows(rows))
    }
}
