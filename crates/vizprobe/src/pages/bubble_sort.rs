//! Bubble sort visualizer.

use crate::driver::PageDriver;
use crate::locator::{Locator, LocatorMap};
use crate::oracle::Order;
use crate::page_object::PageObject;
use crate::result::ProbeResult;
use crate::session::PageSession;
use crate::wait::{step_until, StepBudget};

/// Bar chart of values with size, order, randomize, and step controls
#[derive(Debug)]
pub struct BubbleSortPage<'a, D> {
    session: &'a PageSession<D>,
    locators: LocatorMap,
}

impl<D: PageDriver> PageObject for BubbleSortPage<'_, D> {
    fn name(&self) -> &str {
        "bubble-sort"
    }

    fn path(&self) -> &str {
        "/bubble_sort.html"
    }

    fn locators(&self) -> &LocatorMap {
        &self.locators
    }
}

impl<'a, D: PageDriver> BubbleSortPage<'a, D> {
    /// Page object over `session`
    #[must_use]
    pub fn new(session: &'a PageSession<D>) -> Self {
        let locators = LocatorMap::new()
            .with_css("ready", "#size")
            .with_css("size", "#size")
            .with("bars", Locator::new(".bar").with_strict(false))
            .with_css("randomize", "#randomize")
            .with_css("step", "#step")
            .with_css("reset", "#reset")
            .with_css("order", "#order")
            .with_css("status", "#status")
            .with_css("comparisons", "#comparisons")
            .with_css("swaps", "#swaps");
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

    /// Value of the size control
    ///
    /// # Errors
    ///
    /// `LocatorNotFound` or `Parse`.
    pub async fn size(&self) -> ProbeResult<usize> {
        self.session.parse(self.locator("size")?).await
    }

    /// Change the array size and wait for the chart to re-render
    ///
    /// # Errors
    ///
    /// `LocatorNotFound` or `Timeout`.
    pub async fn set_size(&self, n: usize) -> ProbeResult<()> {
        self.session.fill(self.locator("size")?, &n.to_string()).await?;
        self.session.wait_for_count(self.locator("bars")?, n).await
    }

    /// Number of rendered bars
    ///
    /// # Errors
    ///
    /// Driver errors.
    pub async fn bar_count(&self) -> ProbeResult<usize> {
        self.session.count(self.locator("bars")?).await
    }

    /// Bar values, left to right
    ///
    /// # Errors
    ///
    /// `Parse` if a bar label is not a number.
    pub async fn bar_values(&self) -> ProbeResult<Vec<u32>> {
        self.session.numbers(self.locator("bars")?).await
    }

    /// Bar heights in px, left to right
    ///
    /// # Errors
    ///
    /// `Parse` if a bar has no pixel height.
    pub async fn bar_heights(&self) -> ProbeResult<Vec<f64>> {
        let bars = self.session.locate_all(self.locator("bars")?).await?;
        bars.iter().map(|b| b.style_px("height")).collect()
    }

    /// Generate a new random array; returns the new values
    ///
    /// # Errors
    ///
    /// `LocatorNotFound` or `Parse`.
    pub async fn randomize(&self) -> ProbeResult<Vec<u32>> {
        self.session.click(self.locator("randomize")?).await?;
        self.bar_values().await
    }

    /// Choose the sort direction
    ///
    /// # Errors
    ///
    /// `LocatorNotFound`.
    pub async fn set_order(&self, order: Order) -> ProbeResult<()> {
        self.session
            .select_option(self.locator("order")?, order.as_str())
            .await
    }

    /// Advance the animation by one action
    ///
    /// # Errors
    ///
    /// `LocatorNotFound`.
    pub async fn step(&self) -> ProbeResult<()> {
        self.session.click(self.locator("step")?).await
    }

    /// Reset to the unsorted array
    ///
    /// # Errors
    ///
    /// `LocatorNotFound`.
    pub async fn reset(&self) -> ProbeResult<()> {
        self.session.click(self.locator("reset")?).await
    }

    /// Status line
    ///
    /// # Errors
    ///
    /// `LocatorNotFound`.
    pub async fn status(&self) -> ProbeResult<String> {
        self.session.text(self.locator("status")?).await
    }

    /// Comparison counter
    ///
    /// # Errors
    ///
    /// `LocatorNotFound` or `Parse`.
    pub async fn comparisons(&self) -> ProbeResult<usize> {
        self.session.first_number(self.locator("comparisons")?).await
    }

    /// Swap counter
    ///
    /// # Errors
    ///
    /// `LocatorNotFound` or `Parse`.
    pub async fn swaps(&self) -> ProbeResult<usize> {
        self.session.first_number(self.locator("swaps")?).await
    }

    /// Whether every bar is marked sorted
    ///
    /// # Errors
    ///
    /// Driver errors.
    pub async fn all_marked_sorted(&self) -> ProbeResult<bool> {
        let bars = self.session.locate_all(self.locator("bars")?).await?;
        Ok(!bars.is_empty() && bars.iter().all(|b| b.has_class("sorted")))
    }

    /// Step until every bar is marked sorted; returns the number of steps
    ///
    /// # Errors
    ///
    /// `IterationCapExceeded` or `Timeout` from `budget`.
    pub async fn step_to_end(&self, budget: &mut StepBudget) -> ProbeResult<usize> {
        step_until(budget, move || self.step(), move || self.all_marked_sorted()).await
    }
}
