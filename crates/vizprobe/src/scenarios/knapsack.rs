use async_trait::async_trait;

use crate::assertion::Assertion;
use crate::dialog::DialogPolicy;
use crate::driver::PageDriver;
use crate::oracle::{solve_knapsack, Item};
use crate::pages::KnapsackPage;
use crate::result::{ProbeError, ProbeResult};
use crate::scenario::{Scenario, ScenarioContext, ScenarioList};

const TAGS: &[&str] = &["knapsack", "dynamic-programming"];

pub(super) fn scenarios<D: PageDriver + 'static>() -> ScenarioList<D> {
    vec![
        Box::new(RejectsItem {
            name: "knapsack/zero-weight-rejected",
            weight: 0,
            value: 10,
        }),
        Box::new(RejectsItem {
            name: "knapsack/negative-value-rejected",
            weight: 3,
            value: -1,
        }),
        Box::new(SolvesLikeOracle),
    ]
}

/// Invalid input raises the validation alert and adds no row
struct RejectsItem {
    name: &'static str,
    weight: i64,
    value: i64,
}

#[async_trait]
impl<D: PageDriver + 'static> Scenario<D> for RejectsItem {
    fn name(&self) -> &str {
        self.name
    }

    fn tags(&self) -> &[&'static str] {
        TAGS
    }

    fn dialog_policy(&self) -> DialogPolicy {
        DialogPolicy::accept_all()
    }

    async fn run(&self, ctx: &mut ScenarioContext<D>) -> ProbeResult<()> {
        let expected = match Item::new("bad", self.weight, self.value) {
            Err(err) => err.to_string(),
            Ok(_) => return Err(ProbeError::assertion("oracle accepted the item")),
        };
        let page = KnapsackPage::new(ctx.page());
        page.open().await?;
        let before = page.row_count().await?;
        page.submit_item("bad", self.weight, self.value).await?;

        let collector = ctx.collector();
        let needle = expected.as_str();
        ctx.page()
            .wait_until(&format!("alert {needle:?}"), move || async move {
                Ok(collector
                    .snapshot()
                    .dialog_messages()
                    .iter()
                    .any(|m| m.contains(needle)))
            })
            .await?;
        Assertion::equals(&before, &page.row_count().await?)
            .context("item rows")
            .into_result()
    }
}

/// Solving shows the oracle's best value and chosen items
struct SolvesLikeOracle;

#[async_trait]
impl<D: PageDriver + 'static> Scenario<D> for SolvesLikeOracle {
    fn name(&self) -> &str {
        "knapsack/solves-like-oracle"
    }

    fn tags(&self) -> &[&'static str] {
        TAGS
    }

    async fn run(&self, ctx: &mut ScenarioContext<D>) -> ProbeResult<()> {
        let raw = [("map", 1, 15), ("compass", 3, 10), ("water", 4, 30), ("tent", 5, 25)];
        let capacity = 8;
        let items: Vec<Item> = raw
            .iter()
            .map(|&(n, w, v)| Item::new(n, w, v))
            .collect::<Result<_, _>>()
            .map_err(|e| ProbeError::assertion(format!("fixture item rejected: {e}")))?;
        let solution = solve_knapsack(&items, capacity);

        let page = KnapsackPage::new(ctx.page());
        page.open().await?;
        for &(name, weight, value) in &raw {
            page.add_item(name, weight, value).await?;
        }
        page.set_capacity(capacity).await?;
        let best = page.solve().await?;
        Assertion::equals(&solution.best_value, &best)
            .context("best value")
            .into_result()?;

        let expected: Vec<&str> = solution.chosen.iter().map(|&i| raw[i].0).collect();
        let selected = page.selected_items().await?;
        Assertion::equals(&expected, &selected.iter().map(String::as_str).collect())
            .context("selected items")
            .into_result()
    }
}
