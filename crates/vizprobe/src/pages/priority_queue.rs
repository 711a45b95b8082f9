//! Priority queue playground.

use crate::driver::PageDriver;
use crate::locator::{Locator, LocatorMap};
use crate::page_object::PageObject;
use crate::result::{ProbeError, ProbeResult};
use crate::session::PageSession;

/// Enqueue/dequeue form over a rendered max priority queue
#[derive(Debug)]
pub struct PriorityQueuePage<'a, D> {
    session: &'a PageSession<D>,
    locators: LocatorMap,
}

impl<D: PageDriver> PageObject for PriorityQueuePage<'_, D> {
    fn name(&self) -> &str {
        "priority-queue"
    }

    fn path(&self) -> &str {
        "/priority_queue.html"
    }

    fn locators(&self) -> &LocatorMap {
        &self.locators
    }
}

impl<'a, D: PageDriver> PriorityQueuePage<'a, D> {
    /// Page object over `session`
    #[must_use]
    pub fn new(session: &'a PageSession<D>) -> Self {
        let locators = LocatorMap::new()
            .with_css("ready", "#enqueue")
            .with_css("item", "#itemInput")
            .with_css("priority", "#priorityInput")
            .with_css("enqueue", "#enqueue")
            .with_css("dequeue", "#dequeue")
            .with_css("message", "#message")
            .with("items", Locator::new("#queue .pq-item").with_strict(false));
        Self { session, locators }
    }

    /// Navigate and wait for the form
    ///
    /// # Errors
    ///
    /// Navigation or locator errors.
    pub async fn open(&self) -> ProbeResult<()> {
        self.session.open(self).await
    }

    /// Enqueue `item` and wait for it to render
    ///
    /// # Errors
    ///
    /// `LocatorNotFound` or `Timeout`.
    pub async fn enqueue(&self, item: &str, priority: i64) -> ProbeResult<()> {
        let before = self.item_count().await?;
        self.session.fill(self.locator("item")?, item).await?;
        self.session
            .fill(self.locator("priority")?, &priority.to_string())
            .await?;
        self.session.click(self.locator("enqueue")?).await?;
        self.session
            .wait_for_count(self.locator("items")?, before + 1)
            .await
    }

    /// Dequeue the head and wait for it to disappear; returns the message shown
    ///
    /// # Errors
    ///
    /// `LocatorNotFound` or `Timeout`.
    pub async fn dequeue(&self) -> ProbeResult<String> {
        let before = self.item_count().await?;
        self.session.click(self.locator("dequeue")?).await?;
        self.session
            .wait_for_count(self.locator("items")?, before.saturating_sub(1))
            .await?;
        self.message().await
    }

    /// Number of rendered items
    ///
    /// # Errors
    ///
    /// Driver errors.
    pub async fn item_count(&self) -> ProbeResult<usize> {
        self.session.count(self.locator("items")?).await
    }

    /// Rendered priorities, head first
    ///
    /// # Errors
    ///
    /// `Parse` if an item lacks a numeric `data-priority`.
    pub async fn priorities(&self) -> ProbeResult<Vec<i64>> {
        let items = self.session.locate_all(self.locator("items")?).await?;
        items
            .iter()
            .map(|el| {
                let raw = el.attribute("data-priority").unwrap_or_default();
                raw.trim()
                    .parse()
                    .map_err(|_| ProbeError::parse("data-priority", raw, "i64"))
            })
            .collect()
    }

    /// Rendered item labels, head first
    ///
    /// # Errors
    ///
    /// Driver errors.
    pub async fn labels(&self) -> ProbeResult<Vec<String>> {
        self.session.texts(self.locator("items")?).await
    }

    /// Status message
    ///
    /// # Errors
    ///
    /// `LocatorNotFound`.
    pub async fn message(&self) -> ProbeResult<String> {
        self.session.text(self.locator("message")?).await
    }
}
