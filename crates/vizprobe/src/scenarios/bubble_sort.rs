use async_trait::async_trait;

use crate::assertion::Assertion;
use crate::driver::PageDriver;
use crate::oracle::{BubbleSortStepper, Order, Stepper};
use crate::pages::BubbleSortPage;
use crate::result::ProbeResult;
use crate::scenario::{Scenario, ScenarioContext, ScenarioList};

const TAGS: &[&str] = &["bubble-sort", "sorting"];
const DEFAULT_SIZE: usize = 28;

pub(super) fn scenarios<D: PageDriver + 'static>() -> ScenarioList<D> {
    vec![
        Box::new(DefaultSize),
        Box::new(RandomizeChangesValues),
        Box::new(ReadsAreIdempotent),
        Box::new(StepsToSorted(Order::Ascending)),
        Box::new(StepsToSorted(Order::Descending)),
    ]
}

/// Size control reads 28 and 28 bars are drawn
struct DefaultSize;

#[async_trait]
impl<D: PageDriver + 'static> Scenario<D> for DefaultSize {
    fn name(&self) -> &str {
        "bubble-sort/default-size"
    }

    fn tags(&self) -> &[&'static str] {
        TAGS
    }

    async fn run(&self, ctx: &mut ScenarioContext<D>) -> ProbeResult<()> {
        let page = BubbleSortPage::new(ctx.page());
        page.open().await?;
        Assertion::equals(&DEFAULT_SIZE, &page.size().await?)
            .context("size control")
            .into_result()?;
        Assertion::equals(&DEFAULT_SIZE, &page.bar_count().await?)
            .context("bar count")
            .into_result()
    }
}

/// Two randomizations differ in content but not in cardinality
struct RandomizeChangesValues;

#[async_trait]
impl<D: PageDriver + 'static> Scenario<D> for RandomizeChangesValues {
    fn name(&self) -> &str {
        "bubble-sort/randomize-changes-values"
    }

    fn tags(&self) -> &[&'static str] {
        TAGS
    }

    async fn run(&self, ctx: &mut ScenarioContext<D>) -> ProbeResult<()> {
        let page = BubbleSortPage::new(ctx.page());
        page.open().await?;
        let size = page.size().await?;
        let first = page.randomize().await?;
        let second = page.randomize().await?;
        Assertion::differs(&first, &second)
            .context("randomize")
            .into_result()?;
        Assertion::has_length(&first, size).into_result()?;
        Assertion::has_length(&second, size).into_result()
    }
}

/// Reading the chart twice yields the same values
struct ReadsAreIdempotent;

#[async_trait]
impl<D: PageDriver + 'static> Scenario<D> for ReadsAreIdempotent {
    fn name(&self) -> &str {
        "bubble-sort/reads-are-idempotent"
    }

    fn tags(&self) -> &[&'static str] {
        TAGS
    }

    async fn run(&self, ctx: &mut ScenarioContext<D>) -> ProbeResult<()> {
        let page = BubbleSortPage::new(ctx.page());
        page.open().await?;
        let values = page.bar_values().await?;
        Assertion::equals(&values, &page.bar_values().await?).into_result()?;
        let status = page.status().await?;
        Assertion::equals(&status, &page.status().await?).into_result()?;
        Assertion::equals(&page.size().await?, &page.size().await?).into_result()
    }
}

/// Stepping to the end leaves the bars sorted with the oracle's swap count
struct StepsToSorted(Order);

#[async_trait]
impl<D: PageDriver + 'static> Scenario<D> for StepsToSorted {
    fn name(&self) -> &str {
        match self.0 {
            Order::Ascending => "bubble-sort/steps-to-sorted-ascending",
            Order::Descending => "bubble-sort/steps-to-sorted-descending",
        }
    }

    fn tags(&self) -> &[&'static str] {
        TAGS
    }

    async fn run(&self, ctx: &mut ScenarioContext<D>) -> ProbeResult<()> {
        let mut budget = ctx.budget(Scenario::<D>::name(self));
        let page = BubbleSortPage::new(ctx.page());
        page.open().await?;
        page.set_size(8).await?;
        page.set_order(self.0).await?;
        let initial = page.randomize().await?;

        let mut oracle = BubbleSortStepper::new(initial, self.0);
        oracle.run_to_end(ctx.config().max_step_iterations)?;

        let steps = page.step_to_end(&mut budget).await?;
        tracing::debug!(steps, "bubble sort finished");
        let values = page.bar_values().await?;
        Assertion::is_sorted(&values, self.0).into_result()?;
        Assertion::equals(oracle.values(), &values[..])
            .context("final bars")
            .into_result()?;
        Assertion::equals(&oracle.swaps(), &page.swaps().await?)
            .context("swap counter")
            .into_result()
    }
}
