//! Page objects for the algorithm demo pages.
//!
//! Each page object borrows the scenario's [`PageSession`](crate::PageSession)
//! and owns only its [`LocatorMap`](crate::LocatorMap).

mod bfs;
mod bubble_sort;
mod counting_sort;
mod knapsack;
mod priority_queue;

pub use bfs::BfsPage;
pub use bubble_sort::BubbleSortPage;
pub use counting_sort::CountingSortPage;
pub use knapsack::KnapsackPage;
pub use priority_queue::PriorityQueuePage;

/// Split a comma separated list shown on a page, dropping blanks
pub(crate) fn split_list(text: &str) -> Vec<String> {
    text.split([',', '→'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Whether a status line announces `word` as a whole word, not negated
///
/// "BFS complete" reports `complete`; "Search incomplete", "Not complete" and
/// "not yet complete" do not.
pub(crate) fn status_reports(status: &str, word: &str) -> bool {
    let status = status.to_lowercase();
    let tokens: Vec<&str> = status
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|t| !t.is_empty())
        .collect();
    tokens.iter().enumerate().any(|(i, token)| {
        let negated = tokens[..i]
            .iter()
            .rev()
            .find(|t| **t != "yet")
            .is_some_and(|t| matches!(*t, "not" | "never" | "isn't"));
        *token == word && !negated
    })
}
