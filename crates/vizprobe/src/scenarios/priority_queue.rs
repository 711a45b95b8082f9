use async_trait::async_trait;

use crate::assertion::Assertion;
use crate::driver::PageDriver;
use crate::oracle::MaxPriorityQueue;
use crate::pages::PriorityQueuePage;
use crate::result::ProbeResult;
use crate::scenario::{Scenario, ScenarioContext, ScenarioList};

const TAGS: &[&str] = &["priority-queue", "data-structures"];

pub(super) fn scenarios<D: PageDriver + 'static>() -> ScenarioList<D> {
    vec![Box::new(RendersByPriority), Box::new(DequeueRemovesHighest)]
}

/// Enqueue every `(label, priority)` on both the page and the oracle
async fn enqueue_all<D: PageDriver>(
    page: &PriorityQueuePage<'_, D>,
    oracle: &mut MaxPriorityQueue<String>,
    items: &[(&str, i64)],
) -> ProbeResult<()> {
    for &(label, priority) in items {
        page.enqueue(label, priority).await?;
        oracle.enqueue(label.to_string(), priority);
    }
    Ok(())
}

/// Priorities 9, 5, 2 render as [9, 5, 2]
struct RendersByPriority;

#[async_trait]
impl<D: PageDriver + 'static> Scenario<D> for RendersByPriority {
    fn name(&self) -> &str {
        "priority-queue/renders-by-priority"
    }

    fn tags(&self) -> &[&'static str] {
        TAGS
    }

    async fn run(&self, ctx: &mut ScenarioContext<D>) -> ProbeResult<()> {
        let page = PriorityQueuePage::new(ctx.page());
        page.open().await?;
        let mut oracle = MaxPriorityQueue::new();
        enqueue_all(&page, &mut oracle, &[("high", 9), ("mid", 5), ("low", 2)]).await?;
        let rendered = page.priorities().await?;
        Assertion::equals(&vec![9, 5, 2], &rendered).into_result()?;
        Assertion::equals(&oracle.priorities(), &rendered)
            .context("oracle order")
            .into_result()
    }
}

/// Out-of-order inserts render sorted; dequeue removes the head
struct DequeueRemovesHighest;

#[async_trait]
impl<D: PageDriver + 'static> Scenario<D> for DequeueRemovesHighest {
    fn name(&self) -> &str {
        "priority-queue/dequeue-removes-highest"
    }

    fn tags(&self) -> &[&'static str] {
        TAGS
    }

    async fn run(&self, ctx: &mut ScenarioContext<D>) -> ProbeResult<()> {
        let page = PriorityQueuePage::new(ctx.page());
        page.open().await?;
        let mut oracle = MaxPriorityQueue::new();
        enqueue_all(&page, &mut oracle, &[("low", 2), ("high", 9), ("mid", 5)]).await?;
        Assertion::equals(&oracle.priorities(), &page.priorities().await?)
            .context("after enqueue")
            .into_result()?;

        let message = page.dequeue().await?;
        let removed = oracle.dequeue().map(|(label, _)| label).unwrap_or_default();
        Assertion::contains_ignore_case(&message, &removed)
            .context("dequeue message")
            .into_result()?;
        Assertion::equals(&oracle.priorities(), &page.priorities().await?)
            .context("after dequeue")
            .into_result()
    }
}
