//! PageDriver - the automation seam.
//!
//! Everything above this trait (sessions, page objects, scenarios) is
//! driver-agnostic. Two implementations ship with the crate:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  PageDriver (async trait, one instance per page)              │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────────┐        ┌──────────────────────┐    │
//! │  │  ChromiumPage        │        │  ScriptedPage        │    │
//! │  │  (feature "browser") │        │  (in-process DOM)    │    │
//! │  │  CDP via chromiumoxide│       │  harness self-tests  │    │
//! │  └──────────────────────┘        └──────────────────────┘    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Action methods resolve the selector to its first match and return
//! `Ok(false)` when nothing matched, leaving auto-wait and strictness to
//! [`PageSession`](crate::PageSession).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::collector::EventCollector;
use crate::element::ElementSnapshot;
use crate::locator::Selector;
use crate::result::ProbeResult;

/// One page under automation
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate and wait for the load event
    async fn goto(&self, url: &str) -> ProbeResult<()>;

    /// Route console, page error and dialog events into `collector`.
    ///
    /// Called once per page before the first navigation.
    async fn attach_collector(&self, collector: EventCollector) -> ProbeResult<()>;

    /// Evaluate a JavaScript expression and return its JSON value
    async fn evaluate(&self, script: &str) -> ProbeResult<serde_json::Value>;

    /// Snapshot every element matching `selector`, in document order
    async fn inspect_all(&self, selector: &Selector) -> ProbeResult<Vec<ElementSnapshot>>;

    /// Snapshot the first match
    async fn inspect(&self, selector: &Selector) -> ProbeResult<Option<ElementSnapshot>> {
        Ok(self.inspect_all(selector).await?.into_iter().next())
    }

    /// Number of matches
    async fn count(&self, selector: &Selector) -> ProbeResult<usize> {
        Ok(self.inspect_all(selector).await?.len())
    }

    /// Click the first match
    async fn click(&self, selector: &Selector) -> ProbeResult<bool>;

    /// Replace the first match's value and fire `input`/`change`
    async fn fill(&self, selector: &Selector, value: &str) -> ProbeResult<bool>;

    /// Press a key (e.g. "Enter") with the first match focused
    async fn press(&self, selector: &Selector, key: &str) -> ProbeResult<bool>;

    /// Choose an option of the first matching `<select>` by value
    async fn select_option(&self, selector: &Selector, value: &str) -> ProbeResult<bool>;

    /// PNG screenshot of the viewport
    async fn screenshot(&self) -> ProbeResult<Vec<u8>>;

    /// Current URL
    async fn current_url(&self) -> ProbeResult<String>;

    /// Close the page
    async fn close(&self) -> ProbeResult<()>;
}

/// Produces one fresh, isolated page per scenario
#[async_trait]
pub trait DriverFactory: Send + Sync {
    /// Page driver type
    type Driver: PageDriver + 'static;

    /// Open a new page
    async fn new_page(&self) -> ProbeResult<Self::Driver>;

    /// Name used in logs and reports
    fn name(&self) -> &str;
}

/// A driver call, as recorded by drivers that keep a history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum DriverCall {
    /// goto
    Goto {
        /// Target URL
        url: String,
    },
    /// click
    Click {
        /// Selector description
        selector: String,
    },
    /// fill
    Fill {
        /// Selector description
        selector: String,
        /// Value written
        value: String,
    },
    /// press
    Press {
        /// Selector description
        selector: String,
        /// Key name
        key: String,
    },
    /// select_option
    Select {
        /// Selector description
        selector: String,
        /// Option value
        value: String,
    },
    /// evaluate
    Evaluate {
        /// Script text
        script: String,
    },
}
