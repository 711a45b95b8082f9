use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::assertion::Assertion;
use crate::driver::PageDriver;
use crate::oracle::bfs_order;
use crate::pages::BfsPage;
use crate::result::{ProbeError, ProbeResult};
use crate::scenario::{Scenario, ScenarioContext, ScenarioList};

const TAGS: &[&str] = &["bfs", "graphs"];

pub(super) fn scenarios<D: PageDriver + 'static>() -> ScenarioList<D> {
    vec![Box::new(VisitOrderMatchesOracle)]
}

/// Visit order from the first node matches a local BFS over `window.graph`
struct VisitOrderMatchesOracle;

#[async_trait]
impl<D: PageDriver + 'static> Scenario<D> for VisitOrderMatchesOracle {
    fn name(&self) -> &str {
        "bfs/visit-order-matches-oracle"
    }

    fn tags(&self) -> &[&'static str] {
        TAGS
    }

    async fn run(&self, ctx: &mut ScenarioContext<D>) -> ProbeResult<()> {
        let mut budget = ctx.budget(Scenario::<D>::name(self));
        let page = BfsPage::new(ctx.page());
        page.open().await?;
        let graph = page.graph().await?;
        let start = graph
            .nodes()
            .next()
            .map(String::from)
            .ok_or_else(|| ProbeError::assertion("window.graph has no nodes"))?;
        let expected = bfs_order(&graph, &start);

        page.select_start(&start).await?;
        page.start().await?;
        page.step_to_end(&mut budget).await?;

        Assertion::equals(&expected, &page.visit_order().await?)
            .context("visit order")
            .into_result()?;
        let drawn: BTreeSet<String> = page.visited_nodes().await?.into_iter().collect();
        let reached: BTreeSet<String> = expected.into_iter().collect();
        Assertion::equals(&reached, &drawn)
            .context("nodes drawn visited")
            .into_result()?;
        Assertion::is_true(page.is_visited(&start).await?, "start node not drawn visited")
            .into_result()
    }
}
