//! Sorting oracles: bubble sort and counting sort.

use serde::{Deserialize, Serialize};

use super::{Order, Stepper};

/// One visible step of a sorting animation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SortAction {
    /// Two positions are compared
    Compare {
        /// Left index
        i: usize,
        /// Right index
        j: usize,
    },
    /// Two positions are swapped
    Swap {
        /// Left index
        i: usize,
        /// Right index
        j: usize,
    },
    /// A position holds its final value
    MarkSorted {
        /// Index
        index: usize,
    },
    /// Counting phase: `value` seen at input `index`
    Count {
        /// Input index
        index: usize,
        /// Value counted
        value: usize,
    },
    /// Prefix-sum phase over the count array
    Accumulate {
        /// Count array index
        index: usize,
        /// Running total
        total: usize,
    },
    /// Placement phase: `value` written to output `position`
    Place {
        /// Value placed
        value: usize,
        /// Output position
        position: usize,
    },
}

// =============================================================================
// BUBBLE SORT
// =============================================================================

/// Bubble sort as a state machine.
///
/// Each pass compares adjacent pairs, swapping out-of-order ones, then marks
/// the last unsorted position as sorted. Equal values are never swapped.
#[derive(Debug, Clone)]
pub struct BubbleSortStepper<T> {
    values: Vec<T>,
    order: Order,
    pass: usize,
    j: usize,
    pending_swap: bool,
    comparisons: usize,
    swaps: usize,
    done: bool,
}

impl<T: PartialOrd> BubbleSortStepper<T> {
    /// Start sorting `values`
    #[must_use]
    pub fn new(values: Vec<T>, order: Order) -> Self {
        let done = values.is_empty();
        Self {
            values,
            order,
            pass: 0,
            j: 0,
            pending_swap: false,
            comparisons: 0,
            swaps: 0,
            done,
        }
    }

    /// Current arrangement
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Comparisons made so far
    #[must_use]
    pub const fn comparisons(&self) -> usize {
        self.comparisons
    }

    /// Swaps made so far
    #[must_use]
    pub const fn swaps(&self) -> usize {
        self.swaps
    }

    /// Final arrangement
    #[must_use]
    pub fn into_values(self) -> Vec<T> {
        self.values
    }
}

impl<T: PartialOrd> Stepper for BubbleSortStepper<T> {
    type Action = SortAction;

    const NAME: &'static str = "bubble sort";

    fn step(&mut self) -> Option<SortAction> {
        if self.done {
            return None;
        }
        if self.pending_swap {
            let j = self.j;
            self.pending_swap = false;
            self.values.swap(j, j + 1);
            self.swaps += 1;
            self.j += 1;
            return Some(SortAction::Swap { i: j, j: j + 1 });
        }
        let n = self.values.len();
        if self.pass + 1 >= n {
            self.done = true;
            return Some(SortAction::MarkSorted { index: 0 });
        }
        let limit = n - 1 - self.pass;
        if self.j < limit {
            let j = self.j;
            self.comparisons += 1;
            if self.order.in_order(&self.values[j], &self.values[j + 1]) {
                self.j += 1;
            } else {
                self.pending_swap = true;
            }
            return Some(SortAction::Compare { i: j, j: j + 1 });
        }
        self.pass += 1;
        self.j = 0;
        Some(SortAction::MarkSorted { index: limit })
    }

    fn is_done(&self) -> bool {
        self.done
    }
}

/// Sort `values` the way the bubble sort page does
#[must_use]
pub fn bubble_sort<T: PartialOrd>(values: Vec<T>, order: Order) -> Vec<T> {
    let mut stepper = BubbleSortStepper::new(values, order);
    while stepper.step().is_some() {}
    stepper.into_values()
}

// =============================================================================
// COUNTING SORT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Count,
    Accumulate,
    Place,
    Done,
}

/// Counting sort as a state machine over non-negative integers.
///
/// Phases: count each input value, prefix-sum the count array, then place
/// inputs from last to first (stable).
#[derive(Debug, Clone)]
pub struct CountingSortStepper {
    input: Vec<usize>,
    counts: Vec<usize>,
    output: Vec<Option<usize>>,
    phase: Phase,
    cursor: usize,
}

impl CountingSortStepper {
    /// Start sorting `input`
    #[must_use]
    pub fn new(input: Vec<usize>) -> Self {
        let max = input.iter().copied().max();
        let phase = if max.is_some() { Phase::Count } else { Phase::Done };
        Self {
            counts: vec![0; max.map_or(0, |m| m + 1)],
            output: vec![None; input.len()],
            input,
            phase,
            cursor: 0,
        }
    }

    /// Count array as currently shown (raw counts, then prefix sums)
    #[must_use]
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Output array, `None` where nothing has been placed yet
    #[must_use]
    pub fn output(&self) -> &[Option<usize>] {
        &self.output
    }

    /// Sorted output once finished
    #[must_use]
    pub fn sorted(&self) -> Option<Vec<usize>> {
        self.output.iter().copied().collect()
    }
}

impl Stepper for CountingSortStepper {
    type Action = SortAction;

    const NAME: &'static str = "counting sort";

    fn step(&mut self) -> Option<SortAction> {
        match self.phase {
            Phase::Done => None,
            Phase::Count => {
                let index = self.cursor;
                let value = self.input[index];
                self.counts[value] += 1;
                self.cursor += 1;
                if self.cursor == self.input.len() {
                    self.phase = Phase::Accumulate;
                    self.cursor = 1;
                }
                Some(SortAction::Count { index, value })
            }
            Phase::Accumulate => {
                if self.cursor >= self.counts.len() {
                    self.phase = Phase::Place;
                    self.cursor = self.input.len();
                    return self.step();
                }
                let index = self.cursor;
                self.counts[index] += self.counts[index - 1];
                self.cursor += 1;
                Some(SortAction::Accumulate {
                    index,
                    total: self.counts[index],
                })
            }
            Phase::Place => {
                self.cursor -= 1;
                let value = self.input[self.cursor];
                self.counts[value] -= 1;
                let position = self.counts[value];
                self.output[position] = Some(value);
                if self.cursor == 0 {
                    self.phase = Phase::Done;
                }
                Some(SortAction::Place { value, position })
            }
        }
    }

    fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }
}

/// Counting sort; returns the sorted values and the raw count array
#[must_use]
pub fn counting_sort(input: &[usize]) -> (Vec<usize>, Vec<usize>) {
    let len = input.iter().copied().max().map_or(0, |m| m + 1);
    let mut counts = vec![0; len];
    for &v in input {
        counts[v] += 1;
    }
    let sorted = counts
        .iter()
        .enumerate()
        .flat_map(|(v, &n)| std::iter::repeat(v).take(n))
        .collect();
    (sorted, counts)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod bubble_tests {
        use super::*;

        #[test]
        fn test_two_elements_swap() {
            let mut s = BubbleSortStepper::new(vec![2, 1], Order::Ascending);
            let actions = s.run_to_end(10).unwrap();
            assert_eq!(
                actions,
                vec![
                    SortAction::Compare { i: 0, j: 1 },
                    SortAction::Swap { i: 0, j: 1 },
                    SortAction::MarkSorted { index: 1 },
                    SortAction::MarkSorted { index: 0 },
                ]
            );
            assert_eq!(s.values(), &[1, 2]);
            assert_eq!(s.swaps(), 1);
        }

        #[test]
        fn test_comparisons_are_triangular() {
            let mut s = BubbleSortStepper::new(vec![1, 2, 3, 4, 5], Order::Ascending);
            s.run_to_end(100).unwrap();
            assert_eq!(s.comparisons(), 10);
            assert_eq!(s.swaps(), 0);
            assert!(s.is_done());
        }

        #[test]
        fn test_descending() {
            assert_eq!(
                bubble_sort(vec![3, 9, 1, 9], Order::Descending),
                vec![9, 9, 3, 1]
            );
        }

        #[test]
        fn test_empty_and_single() {
            let mut empty = BubbleSortStepper::<u32>::new(vec![], Order::Ascending);
            assert_eq!(empty.step(), None);
            let mut one = BubbleSortStepper::new(vec![7], Order::Ascending);
            assert_eq!(one.step(), Some(SortAction::MarkSorted { index: 0 }));
            assert_eq!(one.step(), None);
        }
    }

    mod counting_tests {
        use super::*;

        #[test]
        fn test_counting_sort_example() {
            let (sorted, counts) = counting_sort(&[2, 1, 2]);
            assert_eq!(sorted, vec![1, 2, 2]);
            assert_eq!(counts, vec![0, 1, 2]);
        }

        #[test]
        fn test_first_step_counts() {
            let mut s = CountingSortStepper::new(vec![2, 1, 2]);
            assert_eq!(s.step(), Some(SortAction::Count { index: 0, value: 2 }));
            assert_eq!(s.counts(), &[0, 0, 1]);
        }

        #[test]
        fn test_phases_in_order() {
            let mut s = CountingSortStepper::new(vec![2, 1, 2]);
            let actions = s.run_to_end(100).unwrap();
            assert_eq!(actions.len(), 3 + 2 + 3);
            assert!(matches!(actions[3], SortAction::Accumulate { index: 1, total: 1 }));
            assert!(matches!(actions[4], SortAction::Accumulate { index: 2, total: 3 }));
            assert_eq!(s.sorted(), Some(vec![1, 2, 2]));
        }

        #[test]
        fn test_empty_input() {
            let mut s = CountingSortStepper::new(vec![]);
            assert!(s.is_done());
            assert_eq!(s.step(), None);
            assert_eq!(s.sorted(), Some(vec![]));
        }
    }

    proptest! {
        #[test]
        fn prop_bubble_matches_std_sort(values in prop::collection::vec(0u32..100, 0..40)) {
            let mut expected = values.clone();
            expected.sort_unstable();
            prop_assert_eq!(bubble_sort(values, Order::Ascending), expected);
        }

        #[test]
        fn prop_bubble_descending_is_reverse(values in prop::collection::vec(0u32..100, 0..40)) {
            let mut expected = values.clone();
            expected.sort_unstable_by(|a, b| b.cmp(a));
            prop_assert_eq!(bubble_sort(values, Order::Descending), expected);
        }

        #[test]
        fn prop_counting_stepper_matches_direct(values in prop::collection::vec(0usize..20, 0..30)) {
            let mut s = CountingSortStepper::new(values.clone());
            s.run_to_end(1_000).unwrap();
            let (direct, counts) = counting_sort(&values);
            prop_assert_eq!(s.sorted(), Some(direct));
            prop_assert_eq!(counts.iter().sum::<usize>(), values.len());
        }
    }
}
