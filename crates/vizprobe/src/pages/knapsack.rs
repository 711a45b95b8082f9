//! 0/1 knapsack solver.

use crate::driver::PageDriver;
use crate::element::extract_numbers;
use crate::locator::{Locator, LocatorMap};
use crate::page_object::PageObject;
use crate::result::{ProbeError, ProbeResult};
use crate::session::PageSession;

/// Item form, item table, capacity, and a solve button
#[derive(Debug)]
pub struct KnapsackPage<'a, D> {
    session: &'a PageSession<D>,
    locators: LocatorMap,
}

impl<D: PageDriver> PageObject for KnapsackPage<'_, D> {
    fn name(&self) -> &str {
        "knapsack"
    }

    fn path(&self) -> &str {
        "/knapsack.html"
    }

    fn locators(&self) -> &LocatorMap {
        &self.locators
    }
}

impl<'a, D: PageDriver> KnapsackPage<'a, D> {
    /// Page object over `session`
    #[must_use]
    pub fn new(session: &'a PageSession<D>) -> Self {
        let locators = LocatorMap::new()
            .with_css("ready", "#addItem")
            .with_css("name", "#itemName")
            .with_css("weight", "#itemWeight")
            .with_css("value", "#itemValue")
            .with_css("add", "#addItem")
            .with_css("capacity", "#capacity")
            .with_css("solve", "#solve")
            .with_css("result", "#result")
            .with("rows", Locator::new("#items tbody tr").with_strict(false))
            .with("selected", Locator::new("#selected li").with_strict(false));
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

    /// Fill the item form and press Add, without waiting for a new row.
    ///
    /// Rejected input raises an alert instead of adding a row.
    ///
    /// # Errors
    ///
    /// `LocatorNotFound`.
    pub async fn submit_item(&self, name: &str, weight: i64, value: i64) -> ProbeResult<()> {
        self.session.fill(self.locator("name")?, name).await?;
        self.session
            .fill(self.locator("weight")?, &weight.to_string())
            .await?;
        self.session
            .fill(self.locator("value")?, &value.to_string())
            .await?;
        self.session.click(self.locator("add")?).await
    }

    /// Add a valid item and wait for its row
    ///
    /// # Errors
    ///
    /// `LocatorNotFound` or `Timeout`.
    pub async fn add_item(&self, name: &str, weight: i64, value: i64) -> ProbeResult<()> {
        let before = self.row_count().await?;
        self.submit_item(name, weight, value).await?;
        self.session
            .wait_for_count(self.locator("rows")?, before + 1)
            .await
    }

    /// Rows in the item table
    ///
    /// # Errors
    ///
    /// Driver errors.
    pub async fn row_count(&self) -> ProbeResult<usize> {
        self.session.count(self.locator("rows")?).await
    }

    /// Set the knapsack capacity
    ///
    /// # Errors
    ///
    /// `LocatorNotFound`.
    pub async fn set_capacity(&self, capacity: usize) -> ProbeResult<()> {
        self.session
            .fill(self.locator("capacity")?, &capacity.to_string())
            .await
    }

    /// Solve and return the best value shown.
    ///
    /// Waits for the result line to change from what it read before the
    /// click, so a placeholder such as "Best value: 0" is never returned.
    ///
    /// # Errors
    ///
    /// `Timeout` if no new result appears, `Parse` if it has no number.
    pub async fn solve(&self) -> ProbeResult<u64> {
        let session = self.session;
        let result = self.locator("result")?;
        let before = session.text(result).await?;
        session.click(self.locator("solve")?).await?;

        let before = before.as_str();
        session
            .wait_until("the knapsack result to update", move || async move {
                let now = session.text(result).await?;
                Ok(now != before && now.to_lowercase().contains("value"))
            })
            .await?;
        let text = session.text(result).await?;
        extract_numbers(&text)?
            .into_iter()
            .next()
            .ok_or_else(|| ProbeError::parse("knapsack result", &text, "a number"))
    }

    /// Names of the chosen items
    ///
    /// # Errors
    ///
    /// Driver errors.
    pub async fn selected_items(&self) -> ProbeResult<Vec<String>> {
        self.session.texts(self.locator("selected")?).await
    }
}
