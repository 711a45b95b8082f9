//! 0/1 knapsack oracle.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Item rejected by the knapsack page's validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    /// Zero or negative weight
    #[error("Weight must be > 0")]
    NonPositiveWeight,
    /// Negative value
    #[error("Value must be >= 0")]
    NegativeValue,
}

/// A validated knapsack item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Display name
    pub name: String,
    /// Weight, always > 0
    pub weight: usize,
    /// Value
    pub value: u64,
}

impl Item {
    /// Validate raw form input. Weight is checked before value.
    ///
    /// # Errors
    ///
    /// Returns the [`ItemError`] whose message the page shows in its alert.
    pub fn new(name: impl Into<String>, weight: i64, value: i64) -> Result<Self, ItemError> {
        let weight = usize::try_from(weight)
            .ok()
            .filter(|w| *w > 0)
            .ok_or(ItemError::NonPositiveWeight)?;
        let value = u64::try_from(value).map_err(|_| ItemError::NegativeValue)?;
        Ok(Self {
            name: name.into(),
            weight,
            value,
        })
    }
}

/// Optimal selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnapsackSolution {
    /// Best total value
    pub best_value: u64,
    /// Weight of the chosen items
    pub total_weight: usize,
    /// Indices of chosen items, ascending
    pub chosen: Vec<usize>,
}

/// Solve 0/1 knapsack by dynamic programming over `items` and `capacity`
#[must_use]
pub fn solve_knapsack(items: &[Item], capacity: usize) -> KnapsackSolution {
    let n = items.len();
    // table[i][w]: best value using the first i items within weight w
    let mut table = vec![vec![0u64; capacity + 1]; n + 1];
    for (i, item) in items.iter().enumerate() {
        for w in 0..=capacity {
            let skip = table[i][w];
            table[i + 1][w] = if item.weight <= w {
                skip.max(table[i][w - item.weight] + item.value)
            } else {
                skip
            };
        }
    }

    let mut chosen = Vec::new();
    let mut w = capacity;
    for i in (0..n).rev() {
        if table[i + 1][w] != table[i][w] {
            chosen.push(i);
            w -= items[i].weight;
        }
    }
    chosen.reverse();

    KnapsackSolution {
        best_value: table[n][capacity],
        total_weight: chosen.iter().map(|&i| items[i].weight).sum(),
        chosen,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn item(name: &str, weight: i64, value: i64) -> Item {
        Item::new(name, weight, value).unwrap()
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            Item::new("x", 0, 5).unwrap_err().to_string(),
            "Weight must be > 0"
        );
        assert_eq!(Item::new("x", -3, 5), Err(ItemError::NonPositiveWeight));
        assert_eq!(
            Item::new("x", 2, -1).unwrap_err().to_string(),
            "Value must be >= 0"
        );
        assert_eq!(Item::new("x", 0, -1), Err(ItemError::NonPositiveWeight));
        assert!(Item::new("free", 1, 0).is_ok());
    }

    #[test]
    fn test_classic_instance() {
        let items = vec![
            item("a", 1, 1),
            item("b", 3, 4),
            item("c", 4, 5),
            item("d", 5, 7),
        ];
        let solution = solve_knapsack(&items, 7);
        assert_eq!(solution.best_value, 9);
        assert_eq!(solution.chosen, vec![1, 2]);
        assert_eq!(solution.total_weight, 7);
    }

    #[test]
    fn test_nothing_fits() {
        let solution = solve_knapsack(&[item("big", 10, 100)], 3);
        assert_eq!(solution.best_value, 0);
        assert!(solution.chosen.is_empty());
    }

    proptest! {
        #[test]
        fn prop_matches_brute_force(
            raw in prop::collection::vec((1i64..8, 0i64..20), 0..8),
            capacity in 0usize..20,
        ) {
            let items: Vec<Item> = raw.iter().map(|&(w, v)| item("i", w, v)).collect();
            let solution = solve_knapsack(&items, capacity);
            let mut best = 0;
            for mask in 0u32..(1 << items.len()) {
                let (w, v) = items.iter().enumerate()
                    .filter(|(i, _)| mask & (1 << i) != 0)
                    .fold((0, 0), |(w, v), (_, it)| (w + it.weight, v + it.value));
                if w <= capacity {
                    best = best.max(v);
                }
            }
            prop_assert_eq!(solution.best_value, best);
            prop_assert!(solution.total_weight <= capacity);
            let chosen_value: u64 = solution.chosen.iter().map(|&i| items[i].value).sum();
            prop_assert_eq!(chosen_value, best);
        }
    }
}
