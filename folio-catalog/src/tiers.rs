/// Anything priced by quantity bracket.
///
/// A bracket is closed on both ends; an absent `max_quantity` leaves it open upwards.
pub trait QuantityTier {
    fn min_quantity(&self) -> i32;
    fn max_quantity(&self) -> Option<i32>;

    fn contains(&self, quantity: i32) -> bool {
        self.min_quantity() <= quantity && self.max_quantity().map_or(true, |max| quantity <= max)
    }
}

/// First tier (in declaration order) whose bracket contains `quantity`.
pub fn select_tier<T: QuantityTier>(tiers: &[T], quantity: i32) -> Option<&T> {
    tiers.iter().find(|tier| tier.contains(quantity))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bracket(i32, Option<i32>);

    impl QuantityTier for Bracket {
        fn min_quantity(&self) -> i32 {
            self.0
        }
        fn max_quantity(&self) -> Option<i32> {
            self.1
        }
    }

    #[test]
    fn test_boundaries_select_expected_tier() {
        let tiers = vec![Bracket(10, Some(49)), Bracket(50, None)];

        assert!(select_tier(&tiers, 9).is_none());
        assert_eq!(select_tier(&tiers, 10).map(|t| t.0), Some(10));
        assert_eq!(select_tier(&tiers, 49).map(|t| t.0), Some(10));
        assert_eq!(select_tier(&tiers, 50).map(|t| t.0), Some(50));
        assert_eq!(select_tier(&tiers, 10_000).map(|t| t.0), Some(50));
    }

    #[test]
    fn test_first_declared_tier_wins_on_overlap() {
        let tiers = vec![Bracket(1, Some(100)), Bracket(5, Some(10))];
        assert_eq!(select_tier(&tiers, 7).map(|t| t.0), Some(1));
    }
}
