//! Scenario catalog for the algorithm demo pages.
//!
//! Every scenario works with any [`PageDriver`]: the CLI runs them against
//! Chromium, the integration tests against scripted pages.

mod bfs;
mod bubble_sort;
mod counting_sort;
mod knapsack;
mod priority_queue;

use crate::driver::PageDriver;
use crate::scenario::{matches_filter, ScenarioList};

/// Every catalog scenario, grouped by page
#[must_use]
pub fn catalog<D: PageDriver + 'static>() -> ScenarioList<D> {
    let mut all: ScenarioList<D> = Vec::new();
    all.extend(bubble_sort::scenarios());
    all.extend(counting_sort::scenarios());
    all.extend(priority_queue::scenarios());
    all.extend(knapsack::scenarios());
    all.extend(bfs::scenarios());
    all
}

/// Catalog scenarios selected by `filter` (substring of name or tag)
#[must_use]
pub fn select<D: PageDriver + 'static>(filter: Option<&str>) -> ScenarioList<D> {
    catalog::<D>()
        .into_iter()
        .filter(|s| matches_filter(s.as_ref(), filter))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedPage;
    use std::collections::HashSet;

    #[test]
    fn test_names_unique_and_namespaced() {
        let all = catalog::<ScriptedPage>();
        let names: HashSet<&str> = all.iter().map(|s| s.name()).collect();
        assert_eq!(names.len(), all.len());
        for s in &all {
            let (page, _) = s.name().split_once('/').unwrap_or_default();
            assert!(s.tags().contains(&page), "{} lacks tag {page}", s.name());
        }
    }

    #[test]
    fn test_select_by_substring() {
        assert_eq!(select::<ScriptedPage>(Some("knapsack")).len(), 3);
        assert!(select::<ScriptedPage>(Some("no-such-page")).is_empty());
        assert_eq!(
            select::<ScriptedPage>(None).len(),
            catalog::<ScriptedPage>().len()
        );
    }
}
