//! Locator abstraction for element selection.
//!
//! Locators are strict and auto-wait: a [`Locator`] describes *which*
//! element a page object means, and the [`PageSession`](crate::PageSession)
//! polls for it before acting.
//!
//! # Design Philosophy
//!
//! - **Auto-Waiting**: resolution polls until the element is present
//! - **Strict Selection**: actions fail if several elements match
//! - **Named Maps**: page objects declare their locators once in a [`LocatorMap`]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::result::{ProbeError, ProbeResult};
use crate::wait::DEFAULT_POLL_INTERVAL_MS;

/// Default timeout for auto-waiting (5 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;


/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Selector {
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// XPath selector
    XPath(String),
    /// Innermost element whose text contains the value
    Text(String),
    /// Test ID selector (data-testid attribute)
    TestId(String),
    /// CSS selector filtered by contained text
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
    /// The n-th (zero-based) match of another selector
    Nth {
        /// Underlying selector
        inner: Box<Selector>,
        /// Index into the matches
        index: usize,
    },
}

/// Quote a string as a JavaScript literal.
fn js_str(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a test ID selector
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Narrow to the n-th match
    #[must_use]
    pub fn nth(self, index: usize) -> Self {
        Self::Nth {
            inner: Box::new(self),
            index,
        }
    }

    /// JavaScript expression evaluating to an array of all matching elements
    #[must_use]
    pub fn to_query_all(&self) -> String {
        match self {
            Self::Css(s) => format!("Array.from(document.querySelectorAll({}))", js_str(s)),
            Self::XPath(s) => format!(
                "(() => {{ const r = document.evaluate({}, document, null, \
                 XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); \
                 return Array.from({{ length: r.snapshotLength }}, (_, i) => r.snapshotItem(i)); }})()",
                js_str(s)
            ),
            Self::Text(t) => format!(
                "Array.from(document.querySelectorAll('body *')).filter(el => \
                 el.textContent.includes({t}) && \
                 !Array.from(el.children).some(c => c.textContent.includes({t})))",
                t = js_str(t)
            ),
            Self::TestId(id) => format!(
                "Array.from(document.querySelectorAll('[data-testid=' + JSON.stringify({}) + ']'))",
                js_str(id)
            ),
            Self::CssWithText { css, text } => format!(
                "Array.from(document.querySelectorAll({})).filter(el => el.textContent.includes({}))",
                js_str(css),
                js_str(text)
            ),
            Self::Nth { inner, index } => {
                format!("[({})[{index}]].filter(Boolean)", inner.to_query_all())
            }
        }
    }

    /// JavaScript expression evaluating to the first match or `null`
    #[must_use]
    pub fn to_query(&self) -> String {
        format!("(({})[0] ?? null)", self.to_query_all())
    }

    /// JavaScript expression evaluating to the number of matches
    #[must_use]
    pub fn to_count_query(&self) -> String {
        format!("({}).length", self.to_query_all())
    }

    /// Whether this selector already pins a single match
    #[must_use]
    pub const fn is_indexed(&self) -> bool {
        matches!(self, Self::Nth { .. })
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={s}"),
            Self::XPath(s) => write!(f, "xpath={s}"),
            Self::Text(t) => write!(f, "text={t:?}"),
            Self::TestId(id) => write!(f, "testid={id}"),
            Self::CssWithText { css, text } => write!(f, "css={css} >> text={text:?}"),
            Self::Nth { inner, index } => write!(f, "{inner} >> nth={index}"),
        }
    }
}

/// Locator options for customizing behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorOptions {
    /// Timeout for auto-waiting
    pub timeout: Duration,
    /// Polling interval for auto-waiting
    pub poll_interval: Duration,
    /// Whether to require strict single-element match for actions
    pub strict: bool,
}

impl Default for LocatorOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            strict: true,
        }
    }
}

/// A locator for finding elements: a selector plus auto-wait options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    selector: Selector,
    options: LocatorOptions,
}

impl Locator {
    /// Create a new locator with a CSS selector
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::Css(selector.into()))
    }

    /// Create a locator from a selector
    #[must_use]
    pub fn from_selector(selector: Selector) -> Self {
        Self {
            selector,
            options: LocatorOptions::default(),
        }
    }

    /// Filter by text content. Only CSS locators can be narrowed this way.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Config`] for non-CSS selectors.
    pub fn with_text(self, text: impl Into<String>) -> ProbeResult<Self> {
        match self.selector {
            Selector::Css(css) => Ok(Self {
                selector: Selector::CssWithText {
                    css,
                    text: text.into(),
                },
                options: self.options,
            }),
            other => Err(ProbeError::Config {
                message: format!("cannot filter {other} by text"),
            }),
        }
    }

    /// Narrow to the n-th match; indexed locators are never ambiguous
    #[must_use]
    pub fn nth(self, index: usize) -> Self {
        Self {
            selector: self.selector.nth(index),
            options: self.options,
        }
    }

    /// Set a custom timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Set a custom polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.options.poll_interval = interval;
        self
    }

    /// Disable strict mode (allow multiple matches)
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.options.strict = strict;
        self
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Get the options
    #[must_use]
    pub const fn options(&self) -> &LocatorOptions {
        &self.options
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.selector.fmt(f)
    }
}

/// Named locators owned by one page object.
#[derive(Debug, Clone, Default)]
pub struct LocatorMap {
    entries: BTreeMap<String, Locator>,
}

impl LocatorMap {
    /// Create an empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named locator
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, locator: Locator) -> Self {
        self.entries.insert(name.into(), locator);
        self
    }

    /// Add a named CSS locator
    #[must_use]
    pub fn with_css(self, name: impl Into<String>, css: impl Into<String>) -> Self {
        self.with(name, Locator::new(css))
    }

    /// Look up a locator by name
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Config`] when no locator has that name.
    pub fn get(&self, name: &str) -> ProbeResult<&Locator> {
        self.entries.get(name).ok_or_else(|| ProbeError::Config {
            message: format!("no locator named {name:?}"),
        })
    }

    /// Names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of locators
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod selector_tests {
        use super::*;

        #[test]
        fn test_css_query_quotes_selector() {
            let q = Selector::css("#size").to_query_all();
            assert_eq!(q, "Array.from(document.querySelectorAll(\"#size\"))");
        }

        #[test]
        fn test_quotes_are_escaped() {
            let q = Selector::text("say \"hi\"").to_query_all();
            assert!(q.contains("\"say \\\"hi\\\"\""));
        }

        #[test]
        fn test_first_and_count_wrap_all() {
            let sel = Selector::css(".bar");
            assert!(sel.to_query().ends_with("[0] ?? null)"));
            assert!(sel.to_count_query().ends_with(".length"));
        }

        #[test]
        fn test_nth_wraps_inner() {
            let sel = Selector::css(".bar").nth(3);
            assert!(sel.to_query_all().contains(")[3]].filter(Boolean)"));
            assert!(sel.is_indexed());
            assert_eq!(sel.to_string(), "css=.bar >> nth=3");
        }

        #[test]
        fn test_xpath_uses_snapshot() {
            let q = Selector::xpath("//button").to_query_all();
            assert!(q.contains("ORDERED_NODE_SNAPSHOT_TYPE"));
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let loc = Locator::new("#start");
            assert_eq!(loc.options().timeout, Duration::from_millis(5000));
            assert_eq!(loc.options().poll_interval, Duration::from_millis(50));
            assert!(loc.options().strict);
        }

        #[test]
        fn test_auto_wait_polls_like_condition_waits() {
            let loc = Locator::new("#start");
            assert_eq!(
                loc.options().poll_interval,
                crate::wait::WaitOptions::default().poll_interval()
            );
        }

        #[test]
        fn test_with_text_on_css() {
            let loc = Locator::new("button").with_text("Start").unwrap();
            assert_eq!(
                loc.selector(),
                &Selector::CssWithText {
                    css: "button".into(),
                    text: "Start".into()
                }
            );
        }

        #[test]
        fn test_with_text_rejects_non_css() {
            let err = Locator::from_selector(Selector::test_id("go"))
                .with_text("x")
                .unwrap_err();
            assert!(matches!(err, ProbeError::Config { .. }));
        }

        #[test]
        fn test_builders_chain() {
            let loc = Locator::new(".bar")
                .with_strict(false)
                .with_timeout(Duration::from_millis(100))
                .nth(2);
            assert!(!loc.options().strict);
            assert_eq!(loc.options().timeout, Duration::from_millis(100));
            assert!(loc.selector().is_indexed());
        }
    }

    mod map_tests {
        use super::*;

        #[test]
        fn test_lookup() {
            let map = LocatorMap::new()
                .with_css("size", "#size")
                .with_css("bars", ".bar");
            assert_eq!(map.len(), 2);
            assert_eq!(map.get("size").unwrap().to_string(), "css=#size");
            assert_eq!(map.names().collect::<Vec<_>>(), vec!["bars", "size"]);
        }

        #[test]
        fn test_missing_name() {
            let map = LocatorMap::new();
            assert!(map.is_empty());
            assert!(matches!(
                map.get("nope"),
                Err(ProbeError::Config { .. })
            ));
        }
    }
}
