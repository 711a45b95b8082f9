//! Counting sort visualizer.

use crate::driver::PageDriver;
use crate::locator::{Locator, LocatorMap};
use crate::page_object::PageObject;
use crate::result::{ProbeError, ProbeResult};
use crate::session::PageSession;
use crate::wait::{step_until, StepBudget};

use super::status_reports;

/// Input array, count array, output array, and a step log
#[derive(Debug)]
pub struct CountingSortPage<'a, D> {
    session: &'a PageSession<D>,
    locators: LocatorMap,
}

impl<D: PageDriver> PageObject for CountingSortPage<'_, D> {
    fn name(&self) -> &str {
        "counting-sort"
    }

    fn path(&self) -> &str {
        "/counting_sort.html"
    }

    fn locators(&self) -> &LocatorMap {
        &self.locators
    }
}

impl<'a, D: PageDriver> CountingSortPage<'a, D> {
    /// Page object over `session`
    #[must_use]
    pub fn new(session: &'a PageSession<D>) -> Self {
        let locators = LocatorMap::new()
            .with_css("ready", "#arrayInput")
            .with_css("input", "#arrayInput")
            .with_css("load", "#load")
            .with_css("step", "#step")
            .with_css("status", "#status")
            .with("log", Locator::new("#log .log-entry").with_strict(false))
            .with("counts", Locator::new("#countArray .count-bar").with_strict(false))
            .with("output", Locator::new("#outputArray .cell").with_strict(false));
        Self { session, locators }
    }

    /// Navigate and wait for the input
    ///
    /// # Errors
    ///
    /// Navigation or locator errors.
    pub async fn open(&self) -> ProbeResult<()> {
        self.session.open(self).await
    }

    /// Type `values` into the array input and load them
    ///
    /// # Errors
    ///
    /// `LocatorNotFound`.
    pub async fn load(&self, values: &[usize]) -> ProbeResult<()> {
        let text = values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.load_text(&text).await
    }

    /// Type raw text into the array input and load it
    ///
    /// # Errors
    ///
    /// `LocatorNotFound`.
    pub async fn load_text(&self, text: &str) -> ProbeResult<()> {
        self.session.fill(self.locator("input")?, text).await?;
        self.session.click(self.locator("load")?).await
    }

    /// Advance by one action
    ///
    /// # Errors
    ///
    /// `LocatorNotFound`.
    pub async fn step(&self) -> ProbeResult<()> {
        self.session.click(self.locator("step")?).await
    }

    /// Step log, oldest first
    ///
    /// # Errors
    ///
    /// Driver errors.
    pub async fn log_entries(&self) -> ProbeResult<Vec<String>> {
        self.session.texts(self.locator("log")?).await
    }

    /// Wait until a log entry appears; returns the entries
    ///
    /// # Errors
    ///
    /// `Timeout` if the log stays empty.
    pub async fn wait_for_log(&self) -> ProbeResult<Vec<String>> {
        let log = self.locator("log")?;
        self.session
            .wait_until("a counting sort log entry", move || async move {
                self.session.exists(log).await
            })
            .await?;
        self.log_entries().await
    }

    /// Count array bars
    ///
    /// # Errors
    ///
    /// `Parse` if a bar is not a number.
    pub async fn counts(&self) -> ProbeResult<Vec<usize>> {
        self.session.numbers(self.locator("counts")?).await
    }

    /// Number of count array bars
    ///
    /// # Errors
    ///
    /// Driver errors.
    pub async fn count_bar_count(&self) -> ProbeResult<usize> {
        self.session.count(self.locator("counts")?).await
    }

    /// Output cells; `None` for cells not yet written
    ///
    /// # Errors
    ///
    /// `Parse` if a written cell is not a number.
    pub async fn output(&self) -> ProbeResult<Vec<Option<usize>>> {
        self.session
            .texts(self.locator("output")?)
            .await?
            .iter()
            .map(|t| {
                if t.is_empty() {
                    Ok(None)
                } else {
                    t.parse().map(Some).map_err(|_| {
                        ProbeError::parse("counting sort output cell", t, "usize")
                    })
                }
            })
            .collect()
    }

    /// Status line
    ///
    /// # Errors
    ///
    /// `LocatorNotFound`.
    pub async fn status(&self) -> ProbeResult<String> {
        self.session.text(self.locator("status")?).await
    }

    /// Whether the status reports a finished sort and every output cell is
    /// written
    ///
    /// # Errors
    ///
    /// `LocatorNotFound`, or `Parse` for a non-numeric output cell.
    pub async fn is_sorted(&self) -> ProbeResult<bool> {
        if !status_reports(&self.status().await?, "sorted") {
            return Ok(false);
        }
        let output = self.output().await?;
        Ok(!output.is_empty() && output.iter().all(Option::is_some))
    }

    /// Step until the status reports a finished sort; returns the steps taken
    ///
    /// # Errors
    ///
    /// `IterationCapExceeded` or `Timeout` from `budget`.
    pub async fn step_to_end(&self, budget: &mut StepBudget) -> ProbeResult<usize> {
        step_until(budget, move || self.step(), move || self.is_sorted()).await
    }
}
