use async_trait::async_trait;

use crate::assertion::Assertion;
use crate::driver::PageDriver;
use crate::oracle::counting_sort;
use crate::pages::CountingSortPage;
use crate::result::ProbeResult;
use crate::scenario::{Scenario, ScenarioContext, ScenarioList};

const TAGS: &[&str] = &["counting-sort", "sorting"];

pub(super) fn scenarios<D: PageDriver + 'static>() -> ScenarioList<D> {
    vec![Box::new(FirstStepCounts), Box::new(SortsLikeOracle)]
}

/// "2,1,2" then one step logs a counting action and draws the count array
struct FirstStepCounts;

#[async_trait]
impl<D: PageDriver + 'static> Scenario<D> for FirstStepCounts {
    fn name(&self) -> &str {
        "counting-sort/first-step-counts"
    }

    fn tags(&self) -> &[&'static str] {
        TAGS
    }

    async fn run(&self, ctx: &mut ScenarioContext<D>) -> ProbeResult<()> {
        let page = CountingSortPage::new(ctx.page());
        page.open().await?;
        page.load_text("2,1,2").await?;
        page.step().await?;
        let log = page.wait_for_log().await?;
        Assertion::is_true(
            log.iter().any(|e| e.to_lowercase().contains("count")),
            &format!("no log entry mentions counting: {log:?}"),
        )
        .into_result()?;
        let bars = page.count_bar_count().await?;
        Assertion::is_true(bars >= 3, &format!("expected at least 3 count bars, saw {bars}"))
            .into_result()
    }
}

/// Stepping to the end fills the output with the oracle's result
struct SortsLikeOracle;

#[async_trait]
impl<D: PageDriver + 'static> Scenario<D> for SortsLikeOracle {
    fn name(&self) -> &str {
        "counting-sort/sorts-like-oracle"
    }

    fn tags(&self) -> &[&'static str] {
        TAGS
    }

    async fn run(&self, ctx: &mut ScenarioContext<D>) -> ProbeResult<()> {
        let input = [3, 1, 4, 1, 5, 2, 0, 4];
        let (expected, counts) = counting_sort(&input);
        let mut budget = ctx.budget(Scenario::<D>::name(self));
        let page = CountingSortPage::new(ctx.page());
        page.open().await?;
        page.load(&input).await?;
        page.step().await?;
        Assertion::has_length(&page.counts().await?, counts.len())
            .context("count array")
            .into_result()?;

        page.step_to_end(&mut budget).await?;
        let output: Vec<Option<usize>> = page.output().await?;
        let expected: Vec<Option<usize>> = expected.into_iter().map(Some).collect();
        Assertion::equals(&expected, &output)
            .context("output array")
            .into_result()
    }
}
