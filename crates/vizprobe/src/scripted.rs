//! In-process scripted pages.
//!
//! A [`PageBlueprint`] describes a fake page: a flat list of elements keyed
//! by the selectors page objects use, plus handlers that run when the
//! harness clicks, fills, presses keys, changes a select, or observes the
//! page. Handlers mutate a [`DomState`] and can log to the console, throw,
//! and open dialogs, all routed through the attached [`EventCollector`].
//!
//! Selector matching is literal: `Selector::Css(".bar")` matches elements
//! registered under the key `".bar"`. XPath is not supported.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::collector::{ConsoleLevel, EventCollector};
use crate::dialog::DialogType;
use crate::driver::{DriverCall, DriverFactory, PageDriver};
use crate::element::ElementSnapshot;
use crate::locator::Selector;
use crate::result::{ProbeError, ProbeResult};

/// Handler run against the page state
pub type Handler = Arc<dyn Fn(&mut DomState) + Send + Sync>;

/// Key handler; receives the key name
pub type KeyHandler = Arc<dyn Fn(&mut DomState, &str) + Send + Sync>;

/// Evaluation handler; returns the script's value
pub type EvalHandler = Arc<dyn Fn(&mut DomState) -> serde_json::Value + Send + Sync>;

// 1x1 transparent PNG
const BLANK_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

/// One fake element: the selector keys it answers to plus its snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct FakeElement {
    keys: Vec<String>,
    snapshot: ElementSnapshot,
}

impl FakeElement {
    fn matches_key(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }
}

// =============================================================================
// DOM STATE
// =============================================================================

/// Mutable state of one loaded scripted page
pub struct DomState {
    url: String,
    elements: Vec<FakeElement>,
    globals: serde_json::Map<String, serde_json::Value>,
    collector: Option<EventCollector>,
}

impl fmt::Debug for DomState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomState")
            .field("url", &self.url)
            .field("elements", &self.elements.len())
            .field("globals", &self.globals.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl DomState {
    fn blank(collector: Option<EventCollector>) -> Self {
        Self {
            url: "about:blank".into(),
            elements: Vec::new(),
            globals: serde_json::Map::new(),
            collector,
        }
    }

    /// Current URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    fn resolve(&self, selector: &Selector) -> ProbeResult<Vec<usize>> {
        let matches = match selector {
            Selector::Css(key) => self.indices(|e| e.matches_key(key)),
            Selector::TestId(id) => {
                self.indices(|e| e.snapshot.attribute("data-testid") == Some(id.as_str()))
            }
            Selector::Text(text) => self.indices(|e| e.snapshot.text.contains(text.as_str())),
            Selector::CssWithText { css, text } => {
                self.indices(|e| e.matches_key(css) && e.snapshot.text.contains(text.as_str()))
            }
            Selector::Nth { inner, index } => {
                self.resolve(inner)?.get(*index).copied().into_iter().collect()
            }
            Selector::XPath(expr) => {
                return Err(ProbeError::driver(format!(
                    "scripted pages do not support xpath ({expr})"
                )))
            }
        };
        Ok(matches)
    }

    fn indices(&self, pred: impl Fn(&FakeElement) -> bool) -> Vec<usize> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| pred(e))
            .map(|(i, _)| i)
            .collect()
    }

    /// First element registered under `key`
    #[must_use]
    pub fn element(&self, key: &str) -> Option<&ElementSnapshot> {
        self.elements
            .iter()
            .find(|e| e.matches_key(key))
            .map(|e| &e.snapshot)
    }

    /// Mutable first element registered under `key`
    pub fn element_mut(&mut self, key: &str) -> Option<&mut ElementSnapshot> {
        self.elements
            .iter_mut()
            .find(|e| e.matches_key(key))
            .map(|e| &mut e.snapshot)
    }

    /// All elements registered under `key`
    #[must_use]
    pub fn elements(&self, key: &str) -> Vec<&ElementSnapshot> {
        self.elements
            .iter()
            .filter(|e| e.matches_key(key))
            .map(|e| &e.snapshot)
            .collect()
    }

    /// Value of a form control (or its text when it has no value)
    #[must_use]
    pub fn value(&self, key: &str) -> String {
        self.element(key)
            .map(|e| e.value_or_text().to_string())
            .unwrap_or_default()
    }

    /// Set the text of the first element under `key`
    pub fn set_text(&mut self, key: &str, text: impl Into<String>) {
        if let Some(el) = self.element_mut(key) {
            el.text = text.into();
        }
    }

    /// Set the value of the first element under `key`
    pub fn set_value(&mut self, key: &str, value: impl Into<String>) {
        if let Some(el) = self.element_mut(key) {
            el.value = Some(value.into());
        }
    }

    /// Add an element answering to `keys` at the end of the document
    pub fn push_element(&mut self, keys: &[&str], snapshot: ElementSnapshot) {
        self.elements.push(FakeElement {
            keys: keys.iter().map(|k| (*k).to_string()).collect(),
            snapshot,
        });
    }

    /// Replace every element under `key` with `snapshots`, keeping document position
    pub fn set_elements(&mut self, key: &str, snapshots: Vec<ElementSnapshot>) {
        let at = self
            .elements
            .iter()
            .position(|e| e.matches_key(key))
            .unwrap_or(self.elements.len());
        self.elements.retain(|e| !e.matches_key(key));
        let fresh = snapshots.into_iter().map(|snapshot| FakeElement {
            keys: vec![key.to_string()],
            snapshot,
        });
        let at = at.min(self.elements.len());
        self.elements.splice(at..at, fresh);
    }

    /// Read a page global
    #[must_use]
    pub fn global<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.globals
            .get(name)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Write a page global
    pub fn set_global<T: Serialize>(&mut self, name: &str, value: T) {
        if let Ok(v) = serde_json::to_value(value) {
            self.globals.insert(name.to_string(), v);
        }
    }

    /// `console.<level>(text)`
    pub fn console(&self, level: ConsoleLevel, text: impl Into<String>) {
        if let Some(c) = &self.collector {
            c.record_console(level, text);
        }
    }

    /// Uncaught exception escaping a handler
    pub fn throw(&self, message: impl Into<String>) {
        if let Some(c) = &self.collector {
            c.record_page_error(message, Some("at scripted handler".into()));
        }
    }

    /// `alert(message)`
    pub fn alert(&self, message: impl Into<String>) {
        if let Some(c) = &self.collector {
            c.handle_dialog(DialogType::Alert, message, None);
        }
    }

    /// `confirm(message)`; unanswered dialogs are dismissed
    #[must_use]
    pub fn confirm(&self, message: impl Into<String>) -> bool {
        self.collector.as_ref().is_some_and(|c| {
            c.handle_dialog(DialogType::Confirm, message, None)
                .accepts()
        })
    }

    /// `prompt(message, default)`; `None` when dismissed
    #[must_use]
    pub fn prompt(&self, message: impl Into<String>, default: Option<&str>) -> Option<String> {
        let c = self.collector.as_ref()?;
        c.handle_dialog(DialogType::Prompt, message, default.map(String::from))
            .prompt_result(default)
    }
}

// =============================================================================
// BLUEPRINT
// =============================================================================

/// Immutable description of a scripted page
#[derive(Clone, Default)]
pub struct PageBlueprint {
    path: String,
    elements: Vec<FakeElement>,
    globals: serde_json::Map<String, serde_json::Value>,
    on_load: Vec<Handler>,
    on_tick: Vec<Handler>,
    on_click: HashMap<String, Handler>,
    on_fill: HashMap<String, Handler>,
    on_change: HashMap<String, Handler>,
    on_key: HashMap<String, KeyHandler>,
    on_eval: HashMap<String, EvalHandler>,
}

impl fmt::Debug for PageBlueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageBlueprint")
            .field("path", &self.path)
            .field("elements", &self.elements.len())
            .field("click_handlers", &self.on_click.len())
            .finish()
    }
}

impl PageBlueprint {
    /// Start a blueprint served at `path`
    #[must_use]
    pub fn builder(path: impl Into<String>) -> ScriptedPageBuilder {
        ScriptedPageBuilder {
            blueprint: Self {
                path: path.into(),
                ..Self::default()
            },
        }
    }

    /// Path this page is served at
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    fn instantiate(&self, url: &str, collector: Option<EventCollector>) -> DomState {
        let mut dom = DomState::blank(collector);
        dom.url = url.to_string();
        dom.elements = self.elements.clone();
        dom.globals = self.globals.clone();
        for handler in &self.on_load {
            handler(&mut dom);
        }
        dom
    }

    fn handler_for<'a, H>(
        table: &'a HashMap<String, H>,
        element: &FakeElement,
    ) -> Option<&'a H> {
        element.keys.iter().find_map(|k| table.get(k))
    }
}

/// Builder for [`PageBlueprint`]
#[derive(Debug)]
pub struct ScriptedPageBuilder {
    blueprint: PageBlueprint,
}

impl ScriptedPageBuilder {
    /// Add an element answering to one selector key
    #[must_use]
    pub fn element(self, key: &str, snapshot: ElementSnapshot) -> Self {
        self.element_keyed(&[key], snapshot)
    }

    /// Add an element answering to several selector keys
    #[must_use]
    pub fn element_keyed(mut self, keys: &[&str], snapshot: ElementSnapshot) -> Self {
        self.blueprint.elements.push(FakeElement {
            keys: keys.iter().map(|k| (*k).to_string()).collect(),
            snapshot,
        });
        self
    }

    /// Initial page global
    #[must_use]
    pub fn global<T: Serialize>(mut self, name: &str, value: T) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.blueprint.globals.insert(name.to_string(), v);
        }
        self
    }

    /// Run on every load
    #[must_use]
    pub fn on_load(mut self, handler: impl Fn(&mut DomState) + Send + Sync + 'static) -> Self {
        self.blueprint.on_load.push(Arc::new(handler));
        self
    }

    /// Run each time the harness observes the page (timer emulation)
    #[must_use]
    pub fn on_tick(mut self, handler: impl Fn(&mut DomState) + Send + Sync + 'static) -> Self {
        self.blueprint.on_tick.push(Arc::new(handler));
        self
    }

    /// Click handler for elements under `key`
    #[must_use]
    pub fn on_click(
        mut self,
        key: &str,
        handler: impl Fn(&mut DomState) + Send + Sync + 'static,
    ) -> Self {
        self.blueprint.on_click.insert(key.to_string(), Arc::new(handler));
        self
    }

    /// Input handler for elements under `key`; the new value is already set
    #[must_use]
    pub fn on_fill(
        mut self,
        key: &str,
        handler: impl Fn(&mut DomState) + Send + Sync + 'static,
    ) -> Self {
        self.blueprint.on_fill.insert(key.to_string(), Arc::new(handler));
        self
    }

    /// Change handler for selects under `key`; the new value is already set
    #[must_use]
    pub fn on_change(
        mut self,
        key: &str,
        handler: impl Fn(&mut DomState) + Send + Sync + 'static,
    ) -> Self {
        self.blueprint.on_change.insert(key.to_string(), Arc::new(handler));
        self
    }

    /// Keydown handler for elements under `key`
    #[must_use]
    pub fn on_key(
        mut self,
        key: &str,
        handler: impl Fn(&mut DomState, &str) + Send + Sync + 'static,
    ) -> Self {
        self.blueprint.on_key.insert(key.to_string(), Arc::new(handler));
        self
    }

    /// Answer `evaluate(script)` for an exact script text
    #[must_use]
    pub fn on_eval(
        mut self,
        script: &str,
        handler: impl Fn(&mut DomState) -> serde_json::Value + Send + Sync + 'static,
    ) -> Self {
        self.blueprint.on_eval.insert(script.to_string(), Arc::new(handler));
        self
    }

    /// Finish the blueprint
    #[must_use]
    pub fn build(self) -> PageBlueprint {
        self.blueprint
    }
}

// =============================================================================
// DRIVER
// =============================================================================

struct PageInner {
    loaded: Option<Arc<PageBlueprint>>,
    dom: DomState,
    history: Vec<DriverCall>,
    closed: bool,
}

/// [`PageDriver`] over scripted blueprints
pub struct ScriptedPage {
    routes: Arc<Vec<Arc<PageBlueprint>>>,
    collector: Mutex<Option<EventCollector>>,
    inner: Mutex<PageInner>,
}

impl fmt::Debug for ScriptedPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedPage")
            .field("routes", &self.routes.len())
            .finish()
    }
}

/// Strip scheme, host, query and fragment from `url`.
fn url_path(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, r)| r);
    let path = rest.find('/').map_or("/", |i| &rest[i..]);
    path.split(['?', '#']).next().unwrap_or(path)
}

impl ScriptedPage {
    /// A page that can load only `blueprint`
    #[must_use]
    pub fn new(blueprint: PageBlueprint) -> Self {
        Self::with_routes(Arc::new(vec![Arc::new(blueprint)]))
    }

    fn with_routes(routes: Arc<Vec<Arc<PageBlueprint>>>) -> Self {
        Self {
            routes,
            collector: Mutex::new(None),
            inner: Mutex::new(PageInner {
                loaded: None,
                dom: DomState::blank(None),
                history: Vec::new(),
                closed: false,
            }),
        }
    }

    fn lock(&self) -> ProbeResult<MutexGuard<'_, PageInner>> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| ProbeError::driver("scripted page lock poisoned"))?;
        if inner.closed {
            return Err(ProbeError::driver("page is closed"));
        }
        Ok(inner)
    }

    /// Calls made so far, in issuance order
    #[must_use]
    pub fn history(&self) -> Vec<DriverCall> {
        self.inner
            .lock()
            .map(|i| i.history.clone())
            .unwrap_or_default()
    }

    /// Read the current DOM state
    ///
    /// # Errors
    ///
    /// Fails if the page was closed.
    pub fn with_dom<R>(&self, read: impl FnOnce(&DomState) -> R) -> ProbeResult<R> {
        let inner = self.lock()?;
        Ok(read(&inner.dom))
    }

    fn tick(inner: &mut PageInner) {
        if let Some(bp) = inner.loaded.clone() {
            for handler in &bp.on_tick {
                handler(&mut inner.dom);
            }
        }
    }

    fn act<F>(&self, selector: &Selector, call: DriverCall, apply: F) -> ProbeResult<bool>
    where
        F: FnOnce(&PageBlueprint, &mut DomState, usize),
    {
        let mut inner = self.lock()?;
        inner.history.push(call);
        let Some(bp) = inner.loaded.clone() else {
            return Ok(false);
        };
        let Some(&index) = inner.dom.resolve(selector)?.first() else {
            return Ok(false);
        };
        if !inner.dom.elements[index].snapshot.disabled {
            apply(&bp, &mut inner.dom, index);
        }
        Ok(true)
    }
}

#[async_trait]
impl PageDriver for ScriptedPage {
    async fn goto(&self, url: &str) -> ProbeResult<()> {
        let collector = self
            .collector
            .lock()
            .map_err(|_| ProbeError::driver("scripted page lock poisoned"))?
            .clone();
        let mut inner = self.lock()?;
        inner.history.push(DriverCall::Goto {
            url: url.to_string(),
        });
        let path = url_path(url);
        let bp = self
            .routes
            .iter()
            .find(|bp| bp.path == path)
            .cloned()
            .ok_or_else(|| ProbeError::Navigation {
                url: url.to_string(),
                message: "404 Not Found".into(),
            })?;
        tracing::debug!(url, "scripted navigation");
        inner.dom = bp.instantiate(url, collector);
        inner.loaded = Some(bp);
        Ok(())
    }

    async fn attach_collector(&self, collector: EventCollector) -> ProbeResult<()> {
        let mut slot = self
            .collector
            .lock()
            .map_err(|_| ProbeError::driver("scripted page lock poisoned"))?;
        *slot = Some(collector.clone());
        drop(slot);
        self.lock()?.dom.collector = Some(collector);
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> ProbeResult<serde_json::Value> {
        let mut inner = self.lock()?;
        inner.history.push(DriverCall::Evaluate {
            script: script.to_string(),
        });
        Self::tick(&mut inner);
        let handler = inner
            .loaded
            .as_ref()
            .and_then(|bp| bp.on_eval.get(script).cloned());
        if let Some(handler) = handler {
            return Ok(handler(&mut inner.dom));
        }
        let name = script.trim().trim_start_matches("window.");
        inner
            .dom
            .globals
            .get(name)
            .cloned()
            .ok_or_else(|| ProbeError::evaluation(format!("ReferenceError: {name} is not defined")))
    }

    async fn inspect_all(&self, selector: &Selector) -> ProbeResult<Vec<ElementSnapshot>> {
        let mut inner = self.lock()?;
        Self::tick(&mut inner);
        let indices = inner.dom.resolve(selector)?;
        Ok(indices
            .into_iter()
            .map(|i| inner.dom.elements[i].snapshot.clone())
            .collect())
    }

    async fn click(&self, selector: &Selector) -> ProbeResult<bool> {
        let call = DriverCall::Click {
            selector: selector.to_string(),
        };
        self.act(selector, call, |bp, dom, index| {
            if let Some(h) = PageBlueprint::handler_for(&bp.on_click, &dom.elements[index]) {
                h(dom);
            }
        })
    }

    async fn fill(&self, selector: &Selector, value: &str) -> ProbeResult<bool> {
        let call = DriverCall::Fill {
            selector: selector.to_string(),
            value: value.to_string(),
        };
        self.act(selector, call, |bp, dom, index| {
            dom.elements[index].snapshot.value = Some(value.to_string());
            if let Some(h) = PageBlueprint::handler_for(&bp.on_fill, &dom.elements[index]) {
                h(dom);
            }
        })
    }

    async fn press(&self, selector: &Selector, key: &str) -> ProbeResult<bool> {
        let call = DriverCall::Press {
            selector: selector.to_string(),
            key: key.to_string(),
        };
        self.act(selector, call, |bp, dom, index| {
            if let Some(h) = PageBlueprint::handler_for(&bp.on_key, &dom.elements[index]) {
                h(dom, key);
            }
        })
    }

    async fn select_option(&self, selector: &Selector, value: &str) -> ProbeResult<bool> {
        let call = DriverCall::Select {
            selector: selector.to_string(),
            value: value.to_string(),
        };
        self.act(selector, call, |bp, dom, index| {
            dom.elements[index].snapshot.value = Some(value.to_string());
            if let Some(h) = PageBlueprint::handler_for(&bp.on_change, &dom.elements[index]) {
                h(dom);
            }
        })
    }

    async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
        Ok(BLANK_PNG.to_vec())
    }

    async fn current_url(&self) -> ProbeResult<String> {
        Ok(self.lock()?.dom.url.clone())
    }

    async fn close(&self) -> ProbeResult<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| ProbeError::driver("scripted page lock poisoned"))?;
        inner.closed = true;
        Ok(())
    }
}

/// [`DriverFactory`] serving a set of scripted pages by path
#[derive(Debug, Clone, Default)]
pub struct ScriptedSite {
    routes: Arc<Vec<Arc<PageBlueprint>>>,
}

impl ScriptedSite {
    /// Empty site
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `blueprint` at its path
    #[must_use]
    pub fn with_page(self, blueprint: PageBlueprint) -> Self {
        let mut routes: Vec<_> = self.routes.iter().cloned().collect();
        routes.push(Arc::new(blueprint));
        Self {
            routes: Arc::new(routes),
        }
    }

    /// Served paths
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|bp| bp.path())
    }
}

#[async_trait]
impl DriverFactory for ScriptedSite {
    type Driver = ScriptedPage;

    async fn new_page(&self) -> ProbeResult<ScriptedPage> {
        Ok(ScriptedPage::with_routes(self.routes.clone()))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::dialog::DialogPolicy;

    fn counter_page() -> PageBlueprint {
        PageBlueprint::builder("/counter.html")
            .element("#count", ElementSnapshot::new("span").with_text("0"))
            .element("#inc", ElementSnapshot::new("button").with_text("+1"))
            .element(
                "#off",
                ElementSnapshot::new("button").with_disabled(true),
            )
            .element("#name", ElementSnapshot::new("input").with_value(""))
            .global("count", 0)
            .on_click("#inc", |dom| {
                let n = dom.global::<u32>("count").unwrap_or(0) + 1;
                dom.set_global("count", n);
                dom.set_text("#count", n.to_string());
            })
            .on_click("#off", |dom| dom.throw("disabled button fired"))
            .on_fill("#name", |dom| {
                if dom.value("#name").is_empty() {
                    dom.alert("Name required");
                }
            })
            .build()
    }

    mod routing_tests {
        use super::*;

        #[test]
        fn test_url_path() {
            assert_eq!(url_path("http://127.0.0.1:8080/a/b.html?x=1"), "/a/b.html");
            assert_eq!(url_path("http://host"), "/");
            assert_eq!(url_path("/local.html#top"), "/local.html");
        }

        #[tokio::test]
        async fn test_unknown_path_is_404() {
            let page = ScriptedPage::new(counter_page());
            let err = page.goto("http://127.0.0.1:8080/missing.html").await.unwrap_err();
            assert!(matches!(err, ProbeError::Navigation { .. }));
        }

        #[tokio::test]
        async fn test_site_routes_by_path() {
            let site = ScriptedSite::new()
                .with_page(counter_page())
                .with_page(PageBlueprint::builder("/other.html").build());
            assert_eq!(site.paths().count(), 2);
            let page = site.new_page().await.unwrap();
            page.goto("http://x/other.html").await.unwrap();
            assert_eq!(page.current_url().await.unwrap(), "http://x/other.html");
            assert_eq!(page.count(&Selector::css("#count")).await.unwrap(), 0);
        }
    }

    mod interaction_tests {
        use super::*;

        #[tokio::test]
        async fn test_click_runs_handler() {
            let page = ScriptedPage::new(counter_page());
            page.goto("http://x/counter.html").await.unwrap();
            assert!(page.click(&Selector::css("#inc")).await.unwrap());
            assert!(page.click(&Selector::css("#inc")).await.unwrap());
            let el = page.inspect(&Selector::css("#count")).await.unwrap().unwrap();
            assert_eq!(el.text, "2");
            assert_eq!(page.evaluate("window.count").await.unwrap(), 2);
        }

        #[tokio::test]
        async fn test_missing_element_returns_false() {
            let page = ScriptedPage::new(counter_page());
            page.goto("http://x/counter.html").await.unwrap();
            assert!(!page.click(&Selector::css("#nope")).await.unwrap());
        }

        #[tokio::test]
        async fn test_disabled_element_swallows_click() {
            let page = ScriptedPage::new(counter_page());
            let collector = EventCollector::new();
            page.attach_collector(collector.clone()).await.unwrap();
            collector.attach(DialogPolicy::default());
            page.goto("http://x/counter.html").await.unwrap();
            assert!(page.click(&Selector::css("#off")).await.unwrap());
            assert!(collector.detach().page_errors.is_empty());
        }

        #[tokio::test]
        async fn test_fill_sets_value_and_can_alert() {
            let page = ScriptedPage::new(counter_page());
            let collector = EventCollector::new();
            page.attach_collector(collector.clone()).await.unwrap();
            collector.attach(DialogPolicy::accept_all());
            page.goto("http://x/counter.html").await.unwrap();
            page.fill(&Selector::css("#name"), "").await.unwrap();
            page.fill(&Selector::css("#name"), "Ada").await.unwrap();
            let log = collector.detach();
            assert_eq!(log.dialog_messages(), vec!["Name required"]);
            let name = page.inspect(&Selector::css("#name")).await.unwrap().unwrap();
            assert_eq!(name.value.as_deref(), Some("Ada"));
        }

        #[tokio::test]
        async fn test_history_in_issuance_order() {
            let page = ScriptedPage::new(counter_page());
            page.goto("http://x/counter.html").await.unwrap();
            page.click(&Selector::css("#inc")).await.unwrap();
            page.press(&Selector::css("#name"), "Enter").await.unwrap();
            let history = page.history();
            assert!(matches!(history[0], DriverCall::Goto { .. }));
            assert!(matches!(history[1], DriverCall::Click { .. }));
            assert!(matches!(history[2], DriverCall::Press { .. }));
        }

        #[tokio::test]
        async fn test_screenshot_is_png_and_not_recorded() {
            let page = ScriptedPage::new(counter_page());
            page.goto("http://x/counter.html").await.unwrap();
            let png = page.screenshot().await.unwrap();
            assert!(png.starts_with(b"\x89PNG"));
            assert_eq!(page.history().len(), 1);
        }

        #[tokio::test]
        async fn test_unknown_global_is_reference_error() {
            let page = ScriptedPage::new(counter_page());
            page.goto("http://x/counter.html").await.unwrap();
            let err = page.evaluate("window.nothing").await.unwrap_err();
            assert!(err.to_string().contains("ReferenceError"));
        }

        #[tokio::test]
        async fn test_closed_page_rejects_calls() {
            let page = ScriptedPage::new(counter_page());
            page.close().await.unwrap();
            assert!(page.goto("http://x/counter.html").await.is_err());
        }
    }

    mod dom_tests {
        use super::*;

        #[test]
        fn test_set_elements_keeps_position() {
            let mut dom = DomState::blank(None);
            dom.push_element(&["#a"], ElementSnapshot::new("div"));
            dom.push_element(&[".bar"], ElementSnapshot::new("div").with_text("1"));
            dom.push_element(&["#z"], ElementSnapshot::new("div"));
            dom.set_elements(
                ".bar",
                vec![
                    ElementSnapshot::new("div").with_text("5"),
                    ElementSnapshot::new("div").with_text("6"),
                ],
            );
            assert_eq!(dom.elements(".bar").len(), 2);
            assert!(dom.elements[1].matches_key(".bar"));
            assert!(dom.elements[3].matches_key("#z"));
        }

        #[test]
        fn test_resolve_variants() {
            let mut dom = DomState::blank(None);
            dom.push_element(
                &["button"],
                ElementSnapshot::new("button")
                    .with_text("Start")
                    .with_attribute("data-testid", "go"),
            );
            dom.push_element(&["button"], ElementSnapshot::new("button").with_text("Stop"));
            assert_eq!(dom.resolve(&Selector::css("button")).unwrap(), vec![0, 1]);
            assert_eq!(dom.resolve(&Selector::test_id("go")).unwrap(), vec![0]);
            assert_eq!(dom.resolve(&Selector::text("Stop")).unwrap(), vec![1]);
            assert_eq!(
                dom.resolve(&Selector::css("button").nth(1)).unwrap(),
                vec![1]
            );
            assert!(dom.resolve(&Selector::css("button").nth(5)).unwrap().is_empty());
            assert!(dom.resolve(&Selector::xpath("//b")).is_err());
        }

        #[test]
        fn test_dialogs_without_collector_are_dismissed() {
            let dom = DomState::blank(None);
            assert!(!dom.confirm("sure?"));
            assert_eq!(dom.prompt("n?", Some("1")), None);
        }
    }
}
