//! Page Object Model support.
//!
//! A page object is a thin façade over one demo page: it owns a
//! [`LocatorMap`] and borrows a [`PageSession`](crate::PageSession) for the
//! duration of a scenario. Action methods perform one user-visible
//! interaction; read methods only parse what the DOM shows.
//!
//! ```ignore
//! pub struct CounterPage<'a, D: PageDriver> {
//!     session: &'a PageSession<D>,
//!     locators: LocatorMap,
//! }
//!
//! impl<D: PageDriver> PageObject for CounterPage<'_, D> {
//!     fn name(&self) -> &str { "counter" }
//!     fn path(&self) -> &str { "/counter.html" }
//!     fn locators(&self) -> &LocatorMap { &self.locators }
//! }
//!
//! impl<D: PageDriver> CounterPage<'_, D> {
//!     pub async fn increment(&self) -> ProbeResult<u32> {
//!         self.session.click(self.locators.get("inc")?).await?;
//!         self.session.parse(self.locators.get("count")?).await
//!     }
//! }
//! ```

use crate::locator::{Locator, LocatorMap};
use crate::result::ProbeResult;

/// Name of the locator a page waits for after navigation, unless overridden
pub const READY_LOCATOR: &str = "ready";

/// A page (or component) under test
pub trait PageObject {
    /// Stable name, used for path overrides and logs
    fn name(&self) -> &str;

    /// Default path below the base URL
    fn path(&self) -> &str;

    /// Named locators
    fn locators(&self) -> &LocatorMap;

    /// Element whose presence means the page finished loading.
    ///
    /// Defaults to the locator named [`READY_LOCATOR`], falling back to `body`.
    fn ready_locator(&self) -> Locator {
        self.locators()
            .get(READY_LOCATOR)
            .cloned()
            .unwrap_or_else(|_| Locator::new("body"))
    }

    /// Look up a locator by name
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Config`](crate::ProbeError::Config) for an unknown name.
    fn locator(&self, name: &str) -> ProbeResult<&Locator> {
        self.locators().get(name)
    }
}
