use crate::services::eligibility::SpinClass;
use crate::services::prize_pool::{Prize, PrizePool, PrizeReward};
use rand::Rng;
use rand::seq::SliceRandom;

/// Outcome of a draw after structural validation. `reward` is what
/// fulfillment acts on; an item without a product can never appear here.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedPrize {
    pub prize: Prize,
    pub reward: PrizeReward,
    /// The drawn prize was misconfigured and replaced by a no-win.
    pub repaired: bool,
}

pub fn select_prize<R: Rng + ?Sized>(
    class: SpinClass,
    pool: &PrizePool,
    rng: &mut R,
    new_user_fallback_percent: i64,
) -> SelectedPrize {
    let drawn = match class {
        SpinClass::ReturningZeroOrders => no_win_from(pool),
        SpinClass::NewUser => pool
            .new_user_prizes()
            .choose(rng)
            .map(|p| (*p).clone())
            .unwrap_or_else(|| Prize::new_user_fallback(new_user_fallback_percent)),
        SpinClass::Regular => {
            let candidates = pool.regular_prizes();
            let r: f64 = rng.gen_range(0.0..1.0);
            pick_weighted(&candidates, r)
                .cloned()
                .unwrap_or_else(|| no_win_from(pool))
        }
    };
    validate(drawn, pool)
}

/// Walks `candidates` accumulating probability and returns the first prize
/// whose running total reaches `r`. If rounding leaves `r` above the final
/// total, the last weighted prize is returned rather than dropping the draw.
pub fn pick_weighted<'a>(candidates: &[&'a Prize], r: f64) -> Option<&'a Prize> {
    let mut cumulative = 0.0;
    let mut last_weighted = None;
    for prize in candidates.iter().copied() {
        if prize.probability <= 0.0 {
            continue;
        }
        cumulative += prize.probability;
        last_weighted = Some(prize);
        if cumulative >= r {
            return Some(prize);
        }
    }
    last_weighted.or_else(|| candidates.last().copied())
}

fn no_win_from(pool: &PrizePool) -> Prize {
    pool.first_no_win().cloned().unwrap_or_else(Prize::no_win)
}

fn validate(prize: Prize, pool: &PrizePool) -> SelectedPrize {
    match prize.reward() {
        Ok(reward) => SelectedPrize {
            prize,
            reward,
            repaired: false,
        },
        Err(err) => {
            log::warn!("Invalid prize configuration, substituting no-win: {err}");
            SelectedPrize {
                prize: no_win_from(pool),
                reward: PrizeReward::NoWin,
                repaired: true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::PrizeType;
    use crate::services::prize_pool::PrizeDisplay;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    fn prize(id: i64, prize_type: PrizeType, probability: f64, new_user_only: bool) -> Prize {
        Prize {
            id,
            label: format!("p{id}"),
            sub_label: String::new(),
            prize_type,
            value: 100,
            probability,
            linked_product_id: (prize_type == PrizeType::Item).then_some(55),
            new_user_only,
            display: PrizeDisplay {
                slug: format!("p{id}"),
                color: "#000000".into(),
                text_color: "#FFFFFF".into(),
            },
        }
    }

    fn regular_pool() -> PrizePool {
        PrizePool::new(vec![
            prize(1, PrizeType::WalletCash, 0.15, false),
            prize(2, PrizeType::VoucherPercent, 0.25, false),
            prize(3, PrizeType::FreeDelivery, 0.20, false),
            prize(4, PrizeType::Item, 0.05, false),
            prize(5, PrizeType::None, 0.25, false),
            prize(6, PrizeType::LoyaltyPoints, 0.10, false),
            prize(7, PrizeType::WalletCash, 0.0, true),
            prize(8, PrizeType::VoucherPercent, 0.0, true),
        ])
    }

    #[test]
    fn regular_frequencies_converge_to_configured_odds() {
        let pool = regular_pool();
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let draws = 100_000;
        let mut counts: HashMap<i64, u32> = HashMap::new();
        for _ in 0..draws {
            let selected = select_prize(SpinClass::Regular, &pool, &mut rng, 10);
            *counts.entry(selected.prize.id).or_default() += 1;
        }

        for p in pool.regular_prizes() {
            let freq = f64::from(counts.get(&p.id).copied().unwrap_or(0)) / f64::from(draws);
            assert!(
                (freq - p.probability).abs() <= 0.01,
                "prize {} drawn at {freq}, configured {}",
                p.id,
                p.probability
            );
        }
        assert!(!counts.contains_key(&7));
        assert!(!counts.contains_key(&8));
    }

    #[test]
    fn new_user_draws_only_welcome_prizes() {
        let pool = regular_pool();
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = HashMap::new();
        for _ in 0..5_000 {
            let selected = select_prize(SpinClass::NewUser, &pool, &mut rng, 10);
            assert!(selected.prize.new_user_only);
            *seen.entry(selected.prize.id).or_insert(0u32) += 1;
        }
        // 均匀抽取，两种都应出现
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn new_user_without_welcome_prizes_gets_fallback_voucher() {
        let pool = PrizePool::new(vec![prize(1, PrizeType::WalletCash, 1.0, false)]);
        let mut rng = StdRng::seed_from_u64(1);
        let selected = select_prize(SpinClass::NewUser, &pool, &mut rng, 10);
        assert_eq!(selected.reward, PrizeReward::VoucherPercent { percent: 10 });
        assert_eq!(selected.prize.id, 0);
    }

    #[test]
    fn returning_zero_orders_always_gets_first_no_win() {
        let mut pool_prizes = regular_pool().prizes().to_vec();
        pool_prizes.push(prize(9, PrizeType::None, 0.0, false));
        let pool = PrizePool::new(pool_prizes);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let selected = select_prize(SpinClass::ReturningZeroOrders, &pool, &mut rng, 10);
            assert_eq!(selected.prize.id, 5);
            assert_eq!(selected.reward, PrizeReward::NoWin);
        }
    }

    #[test]
    fn returning_zero_orders_without_configured_no_win_gets_synthesized_one() {
        let pool = PrizePool::new(vec![prize(1, PrizeType::WalletCash, 1.0, false)]);
        let mut rng = StdRng::seed_from_u64(7);
        let selected = select_prize(SpinClass::ReturningZeroOrders, &pool, &mut rng, 10);
        assert_eq!(selected.prize.prize_type, PrizeType::None);
        assert_eq!(selected.reward, PrizeReward::NoWin);
    }

    #[test]
    fn rounding_gap_falls_back_to_last_weighted_prize() {
        let a = prize(1, PrizeType::WalletCash, 0.3, false);
        let b = prize(2, PrizeType::LoyaltyPoints, 0.3, false);
        let zero = prize(3, PrizeType::None, 0.0, false);
        let candidates = vec![&a, &b, &zero];
        assert_eq!(pick_weighted(&candidates, 0.95).map(|p| p.id), Some(2));
        assert_eq!(pick_weighted(&candidates, 0.0).map(|p| p.id), Some(1));
        assert_eq!(pick_weighted(&candidates, 0.3).map(|p| p.id), Some(1));
        assert_eq!(pick_weighted(&candidates, 0.31).map(|p| p.id), Some(2));
        assert!(pick_weighted(&[], 0.5).is_none());
    }

    #[test]
    fn item_without_product_is_replaced_by_no_win() {
        let mut broken = prize(1, PrizeType::Item, 1.0, false);
        broken.linked_product_id = None;
        let pool = PrizePool::new(vec![broken, prize(2, PrizeType::None, 0.0, false)]);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let selected = select_prize(SpinClass::Regular, &pool, &mut rng, 10);
            assert!(selected.repaired);
            assert_eq!(selected.prize.id, 2);
            assert_eq!(selected.reward, PrizeReward::NoWin);
            assert_ne!(selected.prize.prize_type, PrizeType::Item);
        }
    }

    #[test]
    fn broken_welcome_item_is_also_repaired() {
        let mut broken = prize(1, PrizeType::Item, 0.0, true);
        broken.linked_product_id = None;
        let pool = PrizePool::new(vec![broken]);
        let mut rng = StdRng::seed_from_u64(3);
        let selected = select_prize(SpinClass::NewUser, &pool, &mut rng, 10);
        assert!(selected.repaired);
        assert_eq!(selected.prize.prize_type, PrizeType::None);
    }
}
