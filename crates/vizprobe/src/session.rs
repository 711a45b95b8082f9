//! Page session: auto-waiting, strict actions and typed reads over a driver.

use serde::de::DeserializeOwned;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::config::HarnessConfig;
use crate::driver::PageDriver;
use crate::element::{extract_numbers, ElementSnapshot};
use crate::locator::{Locator, DEFAULT_TIMEOUT_MS};
use crate::page_object::PageObject;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{poll_until, wait_until, WaitOptions};

/// One page under automation plus the harness settings that govern it.
///
/// Every method takes `&self`; calls are issued in the order the scenario
/// awaits them.
#[derive(Debug)]
pub struct PageSession<D> {
    driver: D,
    config: Arc<HarnessConfig>,
}

impl<D: PageDriver> PageSession<D> {
    /// Wrap a driver
    #[must_use]
    pub fn new(driver: D, config: Arc<HarnessConfig>) -> Self {
        Self { driver, config }
    }

    /// Underlying driver
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Harness configuration
    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Release the driver
    pub fn into_driver(self) -> D {
        self.driver
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    /// Navigate to `page` (honoring path overrides) and wait until it is ready
    ///
    /// # Errors
    ///
    /// Navigation errors, or [`ProbeError::LocatorNotFound`] if the ready
    /// locator never appears.
    pub async fn open<P: PageObject + ?Sized>(&self, page: &P) -> ProbeResult<()> {
        let path = self.config.page_path(page.name(), page.path()).to_string();
        self.goto(&path).await?;
        self.locate(&page.ready_locator()).await?;
        tracing::info!(page = page.name(), path, "page ready");
        Ok(())
    }

    /// Navigate to a path below the base URL, or to an absolute URL
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Navigation`] if the page cannot be loaded.
    pub async fn goto(&self, path_or_url: &str) -> ProbeResult<()> {
        let url = if path_or_url.contains("://") {
            path_or_url.to_string()
        } else {
            self.config.url_for(path_or_url)
        };
        self.driver.goto(&url).await
    }

    // =========================================================================
    // RESOLUTION
    // =========================================================================

    fn auto_wait(&self, locator: &Locator) -> WaitOptions {
        let opts = locator.options();
        let timeout = if opts.timeout == Duration::from_millis(DEFAULT_TIMEOUT_MS) {
            self.config.timeouts.action()
        } else {
            opts.timeout
        };
        WaitOptions::new()
            .with_timeout(timeout.as_millis() as u64)
            .with_poll_interval(opts.poll_interval.as_millis().max(1) as u64)
    }

    /// Wait until `locator` matches at least one element; returns the match count
    async fn resolve(&self, locator: &Locator) -> ProbeResult<usize> {
        let options = self.auto_wait(locator);
        let driver = &self.driver;
        let selector = locator.selector();
        let waited_for = locator.to_string();
        poll_until(&waited_for, options, move || async move {
            driver
                .count(selector)
                .await
                .map(|n| (n > 0).then_some(n))
        })
        .await
        .map(|r| r.value)
        .map_err(|e| match e {
            ProbeError::Timeout { ms, .. } => ProbeError::LocatorNotFound {
                selector: waited_for.clone(),
                waited_ms: ms,
            },
            other => other,
        })
    }

    /// Snapshot of the first match, waiting for it to appear
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::LocatorNotFound`] if nothing matches in time.
    pub async fn locate(&self, locator: &Locator) -> ProbeResult<ElementSnapshot> {
        self.resolve(locator).await?;
        self.driver
            .inspect(locator.selector())
            .await?
            .ok_or_else(|| ProbeError::LocatorNotFound {
                selector: locator.to_string(),
                waited_ms: 0,
            })
    }

    /// Snapshots of every current match, without waiting
    ///
    /// # Errors
    ///
    /// Driver errors only; no match yields an empty vector.
    pub async fn locate_all(&self, locator: &Locator) -> ProbeResult<Vec<ElementSnapshot>> {
        self.driver.inspect_all(locator.selector()).await
    }

    /// Current number of matches, without waiting
    ///
    /// # Errors
    ///
    /// Driver errors only.
    pub async fn count(&self, locator: &Locator) -> ProbeResult<usize> {
        self.driver.count(locator.selector()).await
    }

    /// Whether `locator` currently matches anything
    ///
    /// # Errors
    ///
    /// Driver errors only.
    pub async fn exists(&self, locator: &Locator) -> ProbeResult<bool> {
        Ok(self.count(locator).await? > 0)
    }

    async fn actionable(&self, locator: &Locator) -> ProbeResult<()> {
        let count = self.resolve(locator).await?;
        if count > 1 && locator.options().strict && !locator.selector().is_indexed() {
            return Err(ProbeError::StrictModeViolation {
                selector: locator.to_string(),
                count,
            });
        }
        Ok(())
    }

    fn vanished(locator: &Locator) -> ProbeError {
        ProbeError::LocatorNotFound {
            selector: locator.to_string(),
            waited_ms: 0,
        }
    }

    // =========================================================================
    // ACTIONS
    // =========================================================================

    /// Click
    ///
    /// # Errors
    ///
    /// [`ProbeError::LocatorNotFound`] or [`ProbeError::StrictModeViolation`].
    pub async fn click(&self, locator: &Locator) -> ProbeResult<()> {
        self.actionable(locator).await?;
        if self.driver.click(locator.selector()).await? {
            Ok(())
        } else {
            Err(Self::vanished(locator))
        }
    }

    /// Replace an input's value
    ///
    /// # Errors
    ///
    /// As [`PageSession::click`].
    pub async fn fill(&self, locator: &Locator, value: &str) -> ProbeResult<()> {
        self.actionable(locator).await?;
        if self.driver.fill(locator.selector(), value).await? {
            Ok(())
        } else {
            Err(Self::vanished(locator))
        }
    }

    /// Press a key on an element
    ///
    /// # Errors
    ///
    /// As [`PageSession::click`].
    pub async fn press(&self, locator: &Locator, key: &str) -> ProbeResult<()> {
        self.actionable(locator).await?;
        if self.driver.press(locator.selector(), key).await? {
            Ok(())
        } else {
            Err(Self::vanished(locator))
        }
    }

    /// Choose a `<select>` option by value
    ///
    /// # Errors
    ///
    /// As [`PageSession::click`].
    pub async fn select_option(&self, locator: &Locator, value: &str) -> ProbeResult<()> {
        self.actionable(locator).await?;
        if self.driver.select_option(locator.selector(), value).await? {
            Ok(())
        } else {
            Err(Self::vanished(locator))
        }
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Trimmed visible text of the first match
    ///
    /// # Errors
    ///
    /// [`ProbeError::LocatorNotFound`].
    pub async fn text(&self, locator: &Locator) -> ProbeResult<String> {
        Ok(self.locate(locator).await?.text.trim().to_string())
    }

    /// Visible text of every match
    ///
    /// # Errors
    ///
    /// Driver errors only.
    pub async fn texts(&self, locator: &Locator) -> ProbeResult<Vec<String>> {
        Ok(self
            .locate_all(locator)
            .await?
            .into_iter()
            .map(|e| e.text.trim().to_string())
            .collect())
    }

    /// Form value of the first match (text for non-form elements)
    ///
    /// # Errors
    ///
    /// [`ProbeError::LocatorNotFound`].
    pub async fn input_value(&self, locator: &Locator) -> ProbeResult<String> {
        Ok(self.locate(locator).await?.value_or_text().to_string())
    }

    /// Parse the first match's value (or text) as `T`
    ///
    /// # Errors
    ///
    /// [`ProbeError::LocatorNotFound`] or [`ProbeError::Parse`].
    pub async fn parse<T: FromStr>(&self, locator: &Locator) -> ProbeResult<T> {
        let el = self.locate(locator).await?;
        parse_snapshot(locator, &el)
    }

    /// First number embedded in the first match's text
    ///
    /// # Errors
    ///
    /// [`ProbeError::LocatorNotFound`] or [`ProbeError::Parse`].
    pub async fn first_number<T: FromStr>(&self, locator: &Locator) -> ProbeResult<T> {
        self.locate(locator).await?.first_number()
    }

    /// Every number embedded in the first match's text
    ///
    /// # Errors
    ///
    /// [`ProbeError::LocatorNotFound`] or [`ProbeError::Parse`].
    pub async fn embedded_numbers<T: FromStr>(&self, locator: &Locator) -> ProbeResult<Vec<T>> {
        extract_numbers(&self.locate(locator).await?.text)
    }

    /// Parse each match's value (or text) as `T`, in document order
    ///
    /// # Errors
    ///
    /// [`ProbeError::Parse`] on the first unparseable element.
    pub async fn numbers<T: FromStr>(&self, locator: &Locator) -> ProbeResult<Vec<T>> {
        self.locate_all(locator)
            .await?
            .iter()
            .map(|el| parse_snapshot(locator, el))
            .collect()
    }

    /// Whether the first match has `class`
    ///
    /// # Errors
    ///
    /// [`ProbeError::LocatorNotFound`].
    pub async fn has_class(&self, locator: &Locator, class: &str) -> ProbeResult<bool> {
        Ok(self.locate(locator).await?.has_class(class))
    }

    /// Attribute of the first match
    ///
    /// # Errors
    ///
    /// [`ProbeError::LocatorNotFound`].
    pub async fn attribute(&self, locator: &Locator, name: &str) -> ProbeResult<Option<String>> {
        Ok(self.locate(locator).await?.attribute(name).map(String::from))
    }

    /// Inline style length of the first match, in px
    ///
    /// # Errors
    ///
    /// [`ProbeError::LocatorNotFound`] or [`ProbeError::Parse`].
    pub async fn style_px(&self, locator: &Locator, property: &str) -> ProbeResult<f64> {
        self.locate(locator).await?.style_px(property)
    }

    /// Evaluate a page expression; for state the UI does not expose
    ///
    /// # Errors
    ///
    /// [`ProbeError::Evaluation`] if the script fails or returns another shape.
    pub async fn evaluate<T: DeserializeOwned>(&self, script: &str) -> ProbeResult<T> {
        let value = self.driver.evaluate(script).await?;
        serde_json::from_value(value)
            .map_err(|e| ProbeError::evaluation(format!("{script}: unexpected result: {e}")))
    }

    /// PNG screenshot
    ///
    /// # Errors
    ///
    /// Driver errors.
    pub async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
        self.driver.screenshot().await
    }

    // =========================================================================
    // WAITS
    // =========================================================================

    /// Poll `condition` with the configured wait budget
    ///
    /// # Errors
    ///
    /// [`ProbeError::Timeout`] or the condition's own error.
    pub async fn wait_until<F, Fut>(&self, waited_for: &str, condition: F) -> ProbeResult<Duration>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ProbeResult<bool>>,
    {
        wait_until(waited_for, self.config.timeouts.wait_options(), condition).await
    }

    /// Wait until `locator` matches exactly `expected` elements
    ///
    /// # Errors
    ///
    /// [`ProbeError::Timeout`].
    pub async fn wait_for_count(&self, locator: &Locator, expected: usize) -> ProbeResult<()> {
        let driver = &self.driver;
        let selector = locator.selector();
        self.wait_until(&format!("{locator} to match {expected}"), move || async move {
            driver.count(selector).await.map(|n| n == expected)
        })
        .await
        .map(|_| ())
    }

    /// Wait until the first match's text contains `needle` (case-insensitive)
    ///
    /// # Errors
    ///
    /// [`ProbeError::Timeout`].
    pub async fn wait_for_text(&self, locator: &Locator, needle: &str) -> ProbeResult<String> {
        let driver = &self.driver;
        let selector = locator.selector();
        let lowered = needle.to_lowercase();
        let lowered = lowered.as_str();
        let found = poll_until(
            &format!("{locator} to contain {needle:?}"),
            self.config.timeouts.wait_options(),
            move || async move {
                driver.inspect(selector).await.map(|el| {
                    el.map(|el| el.text)
                        .filter(|t| t.to_lowercase().contains(lowered))
                })
            },
        )
        .await?;
        Ok(found.value)
    }
}

fn parse_snapshot<T: FromStr>(locator: &Locator, el: &ElementSnapshot) -> ProbeResult<T> {
    let raw = el.value_or_text().trim();
    raw.parse()
        .map_err(|_| ProbeError::parse(&locator.to_string(), raw, std::any::type_name::<T>()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::locator::LocatorMap;
    use crate::scripted::{PageBlueprint, ScriptedPage};
    use crate::ElementSnapshot as El;

    fn config() -> Arc<HarnessConfig> {
        let mut config = HarnessConfig::default();
        config.timeouts.action_ms = 60;
        config.timeouts.wait_ms = 60;
        config.timeouts.poll_interval_ms = 5;
        Arc::new(config)
    }

    fn list_page() -> PageBlueprint {
        PageBlueprint::builder("/list.html")
            .element("#title", El::new("h1").with_text("Numbers"))
            .element("#size", El::new("input").with_value("3"))
            .element("#bad", El::new("span").with_text("n/a"))
            .element("li", El::new("li").with_text("10"))
            .element("li", El::new("li").with_text("20").with_class("hot"))
            .element("#add", El::new("button"))
            .on_click("#add", |dom| {
                let mut items: Vec<El> = dom.elements("li").into_iter().cloned().collect();
                items.push(El::new("li").with_text("30"));
                dom.set_elements("li", items);
            })
            .build()
    }

    async fn session() -> PageSession<ScriptedPage> {
        let session = PageSession::new(ScriptedPage::new(list_page()), config());
        session.goto("/list.html").await.unwrap();
        session
    }

    struct ListPage {
        locators: LocatorMap,
    }

    impl PageObject for ListPage {
        fn name(&self) -> &str {
            "list"
        }
        fn path(&self) -> &str {
            "/list.html"
        }
        fn locators(&self) -> &LocatorMap {
            &self.locators
        }
    }

    mod resolution_tests {
        use super::*;

        #[tokio::test]
        async fn test_open_waits_for_ready() {
            let session = PageSession::new(ScriptedPage::new(list_page()), config());
            let page = ListPage {
                locators: LocatorMap::new().with_css("ready", "#title"),
            };
            session.open(&page).await.unwrap();
            assert_eq!(
                session.driver().current_url().await.unwrap(),
                "http://127.0.0.1:8080/list.html"
            );
        }

        #[tokio::test]
        async fn test_open_honors_path_override() {
            let mut config = (*config()).clone();
            config.pages.insert("list".into(), "/elsewhere.html".into());
            let session = PageSession::new(ScriptedPage::new(list_page()), Arc::new(config));
            let page = ListPage {
                locators: LocatorMap::new(),
            };
            let err = session.open(&page).await.unwrap_err();
            assert!(matches!(err, ProbeError::Navigation { .. }));
        }

        #[tokio::test]
        async fn test_missing_element_is_locator_not_found() {
            let s = session().await;
            let err = s.text(&Locator::new("#nope")).await.unwrap_err();
            match err {
                ProbeError::LocatorNotFound { selector, waited_ms } => {
                    assert_eq!(selector, "css=#nope");
                    assert_eq!(waited_ms, 60);
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_strict_action_on_many() {
            let s = session().await;
            let err = s.click(&Locator::new("li")).await.unwrap_err();
            assert!(matches!(
                err,
                ProbeError::StrictModeViolation { count: 2, .. }
            ));
            s.click(&Locator::new("li").nth(1)).await.unwrap();
            s.click(&Locator::new("li").with_strict(false)).await.unwrap();
        }
    }

    mod read_tests {
        use super::*;

        #[tokio::test]
        async fn test_typed_reads() {
            let s = session().await;
            assert_eq!(s.text(&Locator::new("#title")).await.unwrap(), "Numbers");
            assert_eq!(s.parse::<u32>(&Locator::new("#size")).await.unwrap(), 3);
            assert_eq!(
                s.numbers::<u32>(&Locator::new("li")).await.unwrap(),
                vec![10, 20]
            );
            assert!(s
                .has_class(&Locator::new("li").nth(1), "hot")
                .await
                .unwrap());
            assert_eq!(s.count(&Locator::new("li")).await.unwrap(), 2);
        }

        #[tokio::test]
        async fn test_unparseable_is_parse_error() {
            let s = session().await;
            let err = s.parse::<u32>(&Locator::new("#bad")).await.unwrap_err();
            assert!(matches!(err, ProbeError::Parse { .. }));
        }

        #[tokio::test]
        async fn test_reads_are_idempotent() {
            let s = session().await;
            let first = s.texts(&Locator::new("li")).await.unwrap();
            let second = s.texts(&Locator::new("li")).await.unwrap();
            assert_eq!(first, second);
        }
    }

    mod wait_tests {
        use super::*;

        #[tokio::test]
        async fn test_wait_for_count_after_action() {
            let s = session().await;
            s.click(&Locator::new("#add")).await.unwrap();
            s.wait_for_count(&Locator::new("li"), 3).await.unwrap();
        }

        #[tokio::test]
        async fn test_wait_for_count_times_out() {
            let s = session().await;
            let err = s
                .wait_for_count(&Locator::new("li"), 9)
                .await
                .unwrap_err();
            assert!(matches!(err, ProbeError::Timeout { .. }));
        }

        #[tokio::test]
        async fn test_wait_for_text_case_insensitive() {
            let s = session().await;
            let text = s
                .wait_for_text(&Locator::new("#title"), "numb")
                .await
                .unwrap();
            assert_eq!(text, "Numbers");
        }
    }
}
