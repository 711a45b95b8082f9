//! Browser control over the Chrome `DevTools` Protocol.
//!
//! With the `browser` feature, [`ChromiumBrowser`] launches Chromium through
//! chromiumoxide and hands out one [`ChromiumPage`] per scenario. Each page
//! subscribes to `Runtime.consoleAPICalled`, `Runtime.exceptionThrown` and
//! `Page.javascriptDialogOpening` before its first navigation, so nothing the
//! page emits during load is missed.

use serde::{Deserialize, Serialize};

/// Browser configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Per-call CDP round-trip timeout in milliseconds
    pub call_timeout_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 800,
            chromium_path: None,
            sandbox: true,
            call_timeout_ms: 15_000,
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
#[allow(
    clippy::significant_drop_tightening,
    clippy::missing_errors_doc,
    clippy::items_after_statements
)]
mod cdp {
    use super::BrowserConfig;
    use crate::collector::{ConsoleLevel, EventCollector};
    use crate::dialog::DialogType;
    use crate::driver::{DriverFactory, PageDriver};
    use crate::element::{ElementSnapshot, SNAPSHOT_JS};
    use crate::locator::Selector;
    use crate::result::{ProbeError, ProbeResult};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::page::{
        CaptureScreenshotFormat, CaptureScreenshotParams, DialogType as CdpDialogType,
        EventJavascriptDialogOpening, HandleJavaScriptDialogParams,
    };
    use chromiumoxide::cdp::js_protocol::runtime::{
        ConsoleApiCalledType, EventConsoleApiCalled, EventExceptionThrown, RemoteObject,
    };
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use std::future::Future;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;
    use tokio::sync::Mutex;
    use tokio::task::JoinHandle;

    /// Chromium instance with a real CDP connection
    #[derive(Debug)]
    pub struct ChromiumBrowser {
        config: BrowserConfig,
        inner: Mutex<CdpBrowser>,
        handle: JoinHandle<()>,
    }

    impl ChromiumBrowser {
        /// Launch a new browser instance
        ///
        /// # Errors
        ///
        /// Returns [`ProbeError::BrowserLaunch`] if Chromium cannot be started
        pub async fn launch(config: BrowserConfig) -> ProbeResult<Self> {
            let mut builder = CdpConfig::builder()
                .window_size(config.viewport_width, config.viewport_height);

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder
                .build()
                .map_err(|message| ProbeError::BrowserLaunch { message })?;

            let (browser, mut handler) =
                CdpBrowser::launch(cdp_config)
                    .await
                    .map_err(|e| ProbeError::BrowserLaunch {
                        message: e.to_string(),
                    })?;

            let handle = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            tracing::info!(headless = config.headless, "chromium launched");
            Ok(Self {
                config,
                inner: Mutex::new(browser),
                handle,
            })
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Close the browser
        pub async fn close(self) -> ProbeResult<()> {
            let mut browser = self.inner.lock().await;
            browser.close().await.map_err(ProbeError::driver)?;
            let _ = browser.wait().await;
            self.handle.abort();
            Ok(())
        }
    }

    #[async_trait]
    impl DriverFactory for ChromiumBrowser {
        type Driver = ChromiumPage;

        async fn new_page(&self) -> ProbeResult<ChromiumPage> {
            let browser = self.inner.lock().await;
            let page = browser
                .new_page("about:blank")
                .await
                .map_err(ProbeError::driver)?;
            Ok(ChromiumPage {
                page,
                call_timeout: Duration::from_millis(self.config.call_timeout_ms),
                listeners: StdMutex::new(Vec::new()),
            })
        }

        fn name(&self) -> &str {
            "chromium"
        }
    }

    /// A browser tab driven over CDP
    #[derive(Debug)]
    pub struct ChromiumPage {
        page: CdpPage,
        call_timeout: Duration,
        listeners: StdMutex<Vec<JoinHandle<()>>>,
    }

    fn remote_text(obj: &RemoteObject) -> String {
        match (&obj.value, &obj.description) {
            (Some(serde_json::Value::String(s)), _) => s.clone(),
            (Some(v), _) => v.to_string(),
            (None, Some(d)) => d.clone(),
            (None, None) => String::new(),
        }
    }

    fn console_level(kind: &ConsoleApiCalledType) -> ConsoleLevel {
        match kind {
            ConsoleApiCalledType::Error | ConsoleApiCalledType::Assert => ConsoleLevel::Error,
            ConsoleApiCalledType::Warning => ConsoleLevel::Warn,
            ConsoleApiCalledType::Info => ConsoleLevel::Info,
            ConsoleApiCalledType::Debug => ConsoleLevel::Debug,
            _ => ConsoleLevel::Log,
        }
    }

    fn dialog_type(kind: &CdpDialogType) -> DialogType {
        match kind {
            CdpDialogType::Alert => DialogType::Alert,
            CdpDialogType::Confirm => DialogType::Confirm,
            CdpDialogType::Prompt => DialogType::Prompt,
            CdpDialogType::Beforeunload => DialogType::BeforeUnload,
        }
    }

    impl ChromiumPage {
        async fn bounded<T, F, E>(&self, what: &str, fut: F) -> ProbeResult<T>
        where
            F: Future<Output = Result<T, E>>,
            E: std::fmt::Display,
        {
            match tokio::time::timeout(self.call_timeout, fut).await {
                Ok(result) => result.map_err(ProbeError::driver),
                Err(_) => Err(ProbeError::Timeout {
                    waited_for: what.to_string(),
                    ms: self.call_timeout.as_millis() as u64,
                }),
            }
        }

        async fn eval_value(&self, script: &str) -> ProbeResult<serde_json::Value> {
            let result = self
                .bounded("script evaluation", self.page.evaluate(script))
                .await
                .map_err(|e| match e {
                    ProbeError::Driver { message } => ProbeError::Evaluation { message },
                    other => other,
                })?;
            Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
        }

        async fn act(&self, selector: &Selector, body: &str) -> ProbeResult<bool> {
            let script = format!(
                "(() => {{ const el = {}; if (!el) return false; \
                 el.scrollIntoView({{ block: 'center' }}); {body} return true; }})()",
                selector.to_query()
            );
            match self.eval_value(&script).await? {
                serde_json::Value::Bool(found) => Ok(found),
                other => Err(ProbeError::evaluation(format!(
                    "action script returned {other}"
                ))),
            }
        }

        fn track(&self, handle: JoinHandle<()>) {
            if let Ok(mut listeners) = self.listeners.lock() {
                listeners.push(handle);
            }
        }
    }

    impl Drop for ChromiumPage {
        fn drop(&mut self) {
            if let Ok(listeners) = self.listeners.lock() {
                for handle in listeners.iter() {
                    handle.abort();
                }
            }
        }
    }

    fn js_str(s: &str) -> String {
        serde_json::Value::String(s.to_string()).to_string()
    }

    #[async_trait]
    impl PageDriver for ChromiumPage {
        async fn goto(&self, url: &str) -> ProbeResult<()> {
            tracing::debug!(url, "navigating");
            self.bounded("navigation", self.page.goto(url))
                .await
                .map_err(|e| ProbeError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn attach_collector(&self, collector: EventCollector) -> ProbeResult<()> {
            let mut console = self
                .page
                .event_listener::<EventConsoleApiCalled>()
                .await
                .map_err(ProbeError::driver)?;
            let mut exceptions = self
                .page
                .event_listener::<EventExceptionThrown>()
                .await
                .map_err(ProbeError::driver)?;
            let mut dialogs = self
                .page
                .event_listener::<EventJavascriptDialogOpening>()
                .await
                .map_err(ProbeError::driver)?;

            let sink = collector.clone();
            self.track(tokio::spawn(async move {
                while let Some(event) = console.next().await {
                    let text = event
                        .args
                        .iter()
                        .map(remote_text)
                        .collect::<Vec<_>>()
                        .join(" ");
                    let level = console_level(&event.r#type);
                    sink.record_console(level, text);
                }
            }));

            let sink = collector.clone();
            self.track(tokio::spawn(async move {
                while let Some(event) = exceptions.next().await {
                    let details = &event.exception_details;
                    let description = details
                        .exception
                        .as_ref()
                        .and_then(|e| e.description.clone());
                    let message = description
                        .as_deref()
                        .and_then(|d| d.lines().next())
                        .map_or_else(|| details.text.clone(), str::to_string);
                    sink.record_page_error(message, description);
                }
            }));

            // Answering uses a page clone so it works while an evaluate is blocked on the dialog.
            let page = self.page.clone();
            self.track(tokio::spawn(async move {
                while let Some(event) = dialogs.next().await {
                    let response = collector.handle_dialog(
                        dialog_type(&event.r#type),
                        event.message.clone(),
                        event.default_prompt.clone(),
                    );
                    let mut params = HandleJavaScriptDialogParams::new(response.accepts());
                    params.prompt_text = response.prompt_text().map(String::from);
                    if let Err(e) = page.execute(params).await {
                        tracing::warn!("failed to answer dialog: {e}");
                    }
                }
            }));
            Ok(())
        }

        async fn evaluate(&self, script: &str) -> ProbeResult<serde_json::Value> {
            self.eval_value(script).await
        }

        async fn inspect_all(&self, selector: &Selector) -> ProbeResult<Vec<ElementSnapshot>> {
            let script = format!("({}).map({SNAPSHOT_JS})", selector.to_query_all());
            let value = self.eval_value(&script).await?;
            Ok(serde_json::from_value(value)?)
        }

        async fn inspect(&self, selector: &Selector) -> ProbeResult<Option<ElementSnapshot>> {
            let script = format!(
                "(() => {{ const el = {}; return el ? ({SNAPSHOT_JS})(el) : null; }})()",
                selector.to_query()
            );
            let value = self.eval_value(&script).await?;
            Ok(serde_json::from_value(value)?)
        }

        async fn count(&self, selector: &Selector) -> ProbeResult<usize> {
            let value = self.eval_value(&selector.to_count_query()).await?;
            value
                .as_u64()
                .map(|n| n as usize)
                .ok_or_else(|| ProbeError::evaluation(format!("count returned {value}")))
        }

        async fn click(&self, selector: &Selector) -> ProbeResult<bool> {
            tracing::debug!(%selector, "click");
            self.act(selector, "el.click();").await
        }

        async fn fill(&self, selector: &Selector, value: &str) -> ProbeResult<bool> {
            tracing::debug!(%selector, value, "fill");
            let body = format!(
                "el.focus(); \
                 const proto = Object.getPrototypeOf(el); \
                 const setter = Object.getOwnPropertyDescriptor(proto, 'value')?.set; \
                 if (setter) {{ setter.call(el, {v}); }} else {{ el.value = {v}; }} \
                 el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                 el.dispatchEvent(new Event('change', {{ bubbles: true }}));",
                v = js_str(value)
            );
            self.act(selector, &body).await
        }

        async fn press(&self, selector: &Selector, key: &str) -> ProbeResult<bool> {
            tracing::debug!(%selector, key, "press");
            let body = format!(
                "el.focus(); \
                 for (const type of ['keydown', 'keypress', 'keyup']) {{ \
                   el.dispatchEvent(new KeyboardEvent(type, {{ key: {k}, bubbles: true, cancelable: true }})); \
                 }}",
                k = js_str(key)
            );
            self.act(selector, &body).await
        }

        async fn select_option(&self, selector: &Selector, value: &str) -> ProbeResult<bool> {
            tracing::debug!(%selector, value, "select");
            let body = format!(
                "el.value = {}; \
                 el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                 el.dispatchEvent(new Event('change', {{ bubbles: true }}));",
                js_str(value)
            );
            self.act(selector, &body).await
        }

        async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
            let params = CaptureScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .build();
            let shot = self.bounded("screenshot", self.page.execute(params)).await?;

            use base64::Engine;
            base64::engine::general_purpose::STANDARD
                .decode(&shot.data)
                .map_err(ProbeError::driver)
        }

        async fn current_url(&self) -> ProbeResult<String> {
            let url = self.bounded("url", self.page.url()).await?;
            Ok(url.unwrap_or_else(|| "about:blank".to_string()))
        }

        async fn close(&self) -> ProbeResult<()> {
            self.bounded("close", self.page.clone().close()).await
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::{ChromiumBrowser, ChromiumPage};

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BrowserConfig::default();
        assert!(config.headless);
        assert!(config.sandbox);
        assert_eq!(config.chromium_path, None);
        assert_eq!(config.call_timeout_ms, 15_000);
    }

    #[test]
    fn test_builders() {
        let config = BrowserConfig::default()
            .with_headless(false)
            .with_viewport(800, 600)
            .with_chromium_path("/usr/bin/chromium")
            .with_no_sandbox();
        assert!(!config.headless);
        assert!(!config.sandbox);
        assert_eq!((config.viewport_width, config.viewport_height), (800, 600));
        assert_eq!(config.chromium_path.as_deref(), Some("/usr/bin/chromium"));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: BrowserConfig = serde_yaml_ng::from_str("headless: false\n").unwrap();
        assert!(!config.headless);
        assert_eq!(config.viewport_width, 1280);
    }
}
