//! Breadth-first search graph demo.

use crate::driver::PageDriver;
use crate::locator::{Locator, LocatorMap, Selector};
use crate::oracle::Graph;
use crate::page_object::PageObject;
use crate::result::ProbeResult;
use crate::session::PageSession;
use crate::wait::{step_until, StepBudget};

use super::{split_list, status_reports};

/// Graph drawing with a start-node select and BFS controls
#[derive(Debug)]
pub struct BfsPage<'a, D> {
    session: &'a PageSession<D>,
    locators: LocatorMap,
}

impl<D: PageDriver> PageObject for BfsPage<'_, D> {
    fn name(&self) -> &str {
        "bfs"
    }

    fn path(&self) -> &str {
        "/bfs.html"
    }

    fn locators(&self) -> &LocatorMap {
        &self.locators
    }
}

impl<'a, D: PageDriver> BfsPage<'a, D> {
    /// Page object over `session`
    #[must_use]
    pub fn new(session: &'a PageSession<D>) -> Self {
        let locators = LocatorMap::new()
            .with_css("ready", "#bfsStart")
            .with_css("start_node", "#startNode")
            .with_css("start", "#bfsStart")
            .with_css("step", "#bfsStep")
            .with_css("visit_order", "#visitOrder")
            .with_css("status", "#status")
            .with("nodes", Locator::new(".node").with_strict(false));
        Self { session, locators }
    }

    /// Navigate and wait for the controls
    ///
    /// # Errors
    ///
    /// Navigation or locator errors.
    pub async fn open(&self) -> ProbeResult<()> {
        self.session.open(self).await
    }

    /// Adjacency lists behind the drawing.
    ///
    /// The page renders edges only as SVG lines, so this reads `window.graph`.
    ///
    /// # Errors
    ///
    /// `Evaluation` if the global is missing or malformed.
    pub async fn graph(&self) -> ProbeResult<Graph> {
        self.session.evaluate("window.graph").await
    }

    /// Choose the start node
    ///
    /// # Errors
    ///
    /// `LocatorNotFound`.
    pub async fn select_start(&self, node: &str) -> ProbeResult<()> {
        self.session
            .select_option(self.locator("start_node")?, node)
            .await
    }

    /// Begin the search
    ///
    /// # Errors
    ///
    /// `LocatorNotFound`.
    pub async fn start(&self) -> ProbeResult<()> {
        self.session.click(self.locator("start")?).await
    }

    /// Advance by one visit
    ///
    /// # Errors
    ///
    /// `LocatorNotFound`.
    pub async fn step(&self) -> ProbeResult<()> {
        self.session.click(self.locator("step")?).await
    }

    /// Visit order as listed on the page
    ///
    /// # Errors
    ///
    /// `LocatorNotFound`.
    pub async fn visit_order(&self) -> ProbeResult<Vec<String>> {
        Ok(split_list(&self.session.text(self.locator("visit_order")?).await?))
    }

    /// Whether the node with `id` is drawn as visited
    ///
    /// # Errors
    ///
    /// `LocatorNotFound` for an unknown node.
    pub async fn is_visited(&self, id: &str) -> ProbeResult<bool> {
        let node = Locator::from_selector(Selector::css(format!(".node[data-id=\"{id}\"]")));
        self.session.has_class(&node, "visited").await
    }

    /// Ids of nodes drawn as visited, in document order
    ///
    /// # Errors
    ///
    /// Driver errors.
    pub async fn visited_nodes(&self) -> ProbeResult<Vec<String>> {
        Ok(self
            .session
            .locate_all(self.locator("nodes")?)
            .await?
            .into_iter()
            .filter(|n| n.has_class("visited"))
            .filter_map(|n| n.attribute("data-id").map(String::from))
            .collect())
    }

    /// Status line
    ///
    /// # Errors
    ///
    /// `LocatorNotFound`.
    pub async fn status(&self) -> ProbeResult<String> {
        self.session.text(self.locator("status")?).await
    }

    /// Whether the status reports a finished search
    ///
    /// # Errors
    ///
    /// `LocatorNotFound`.
    pub async fn is_complete(&self) -> ProbeResult<bool> {
        Ok(status_reports(&self.status().await?, "complete"))
    }

    /// Step until the search completes; returns the steps taken
    ///
    /// # Errors
    ///
    /// `IterationCapExceeded` or `Timeout` from `budget`.
    pub async fn step_to_end(&self, budget: &mut StepBudget) -> ProbeResult<usize> {
        step_until(budget, move || self.step(), move || self.is_complete()).await
    }
}
