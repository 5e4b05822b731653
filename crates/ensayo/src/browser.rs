//! Browser control for real page runs.
//!
//! With the `browser` feature, [`ChromiumBrowser`] launches Chromium through
//! the Chrome `DevTools` Protocol (chromiumoxide) and hands out
//! [`ChromiumDriver`] pages implementing [`PageDriver`](crate::PageDriver).
//! [`BrowserConfig`] is always available so callers can build it regardless
//! of the feature set.
//!
//! Element lookups auto-wait: `locate` and `locate_all` poll until something
//! matches or `locate_timeout` elapses, and `click` waits for the document to
//! finish loading in case the click navigated.

use crate::driver::Viewport;
use crate::result::EnsayoResult;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::Instant;

/// Default auto-wait for element lookups (2 seconds)
pub const DEFAULT_LOCATE_TIMEOUT_MS: u64 = 2_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Browser configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Show the browser window
    pub headed: bool,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<PathBuf>,
    /// Initial viewport
    pub viewport: Viewport,
    /// How long lookups keep polling for a match
    pub locate_timeout: Duration,
    /// Delay between polls
    pub poll_interval: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headed: false,
            sandbox: true,
            chromium_path: None,
            viewport: Viewport::default(),
            locate_timeout: Duration::from_millis(DEFAULT_LOCATE_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Show or hide the browser window
    #[must_use]
    pub const fn with_headed(mut self, headed: bool) -> Self {
        self.headed = headed;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set the lookup auto-wait
    #[must_use]
    pub const fn with_locate_timeout(mut self, timeout: Duration) -> Self {
        self.locate_timeout = timeout;
        self
    }

    /// Set the polling interval (zero is raised to 1ms)
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }
}

/// Poll `probe` until `done` accepts its value or `timeout` elapses.
///
/// Returns the last value seen. A probe error ends the wait at once: a
/// failing connection is not the same as "not there yet".
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
pub(crate) async fn poll_until<T, F, Fut>(
    timeout: Duration,
    interval: Duration,
    mut probe: F,
    done: impl Fn(&T) -> bool,
) -> EnsayoResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = EnsayoResult<T>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        let value = probe().await?;
        if done(&value) || Instant::now() >= deadline {
            return Ok(value);
        }
        tokio::time::sleep(interval).await;
    }
}

#[cfg(feature = "browser")]
mod cdp {
    use super::{poll_until, BrowserConfig};
    use crate::driver::{DriverFactory, ElementHandle, PageDriver, Viewport};
    use crate::result::{EnsayoError, EnsayoResult};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
    use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
    use chromiumoxide::element::Element;
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    fn cdp_error(e: impl std::fmt::Display) -> EnsayoError {
        EnsayoError::driver(e.to_string())
    }

    /// Chromium process with a live CDP connection
    #[derive(Debug)]
    pub struct ChromiumBrowser {
        config: BrowserConfig,
        inner: Mutex<CdpBrowser>,
        handle: tokio::task::JoinHandle<()>,
    }

    impl ChromiumBrowser {
        /// Launch a new browser instance
        ///
        /// # Errors
        ///
        /// Returns error if browser cannot be launched
        pub async fn launch(config: BrowserConfig) -> EnsayoResult<Self> {
            let mut builder = CdpConfig::builder().window_size(
                config.viewport.width,
                config.viewport.height,
            );

            if config.headed {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder.build().map_err(EnsayoError::driver)?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(cdp_error)?;

            let handle = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            tracing::info!(headed = config.headed, "launched chromium");
            Ok(Self {
                config,
                inner: Mutex::new(browser),
                handle,
            })
        }

        /// Open a fresh page
        ///
        /// # Errors
        ///
        /// Returns error if page cannot be created
        pub async fn new_driver(&self) -> EnsayoResult<ChromiumDriver> {
            let browser = self.inner.lock().await;
            let page = browser.new_page("about:blank").await.map_err(cdp_error)?;
            let mut driver = ChromiumDriver {
                page,
                locate_timeout: self.config.locate_timeout,
                poll_interval: self.config.poll_interval,
            };
            driver.set_viewport(self.config.viewport).await?;
            Ok(driver)
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Close the browser
        ///
        /// # Errors
        ///
        /// Returns error if the browser does not shut down cleanly
        pub async fn close(self) -> EnsayoResult<()> {
            let mut browser = self.inner.lock().await;
            let _ = browser.close().await.map_err(cdp_error)?;
            self.handle.abort();
            Ok(())
        }
    }

    /// One browser page
    #[derive(Debug)]
    pub struct ChromiumDriver {
        page: CdpPage,
        locate_timeout: Duration,
        poll_interval: Duration,
    }

    impl ChromiumDriver {
        async fn resolve(&self, handle: &ElementHandle) -> EnsayoResult<Element> {
            let mut elements = self
                .page
                .find_elements(handle.selector.as_str())
                .await
                .map_err(cdp_error)?;
            if handle.index < elements.len() {
                Ok(elements.swap_remove(handle.index))
            } else {
                Err(EnsayoError::LocatorNotFound {
                    selector: handle.to_string(),
                })
            }
        }

        /// Matches for `selector` right now. No match is `Ok(0)`; an error
        /// means the page or connection failed.
        async fn count(&self, selector: &str) -> EnsayoResult<usize> {
            let elements = self.page.find_elements(selector).await.map_err(cdp_error)?;
            Ok(elements.len())
        }

        async fn count_within(&self, selector: &str, timeout: Duration) -> EnsayoResult<usize> {
            poll_until(timeout, self.poll_interval, || self.count(selector), |n| *n > 0).await
        }

        async fn ready_state(&self) -> EnsayoResult<String> {
            self.page
                .evaluate("document.readyState")
                .await
                .map_err(cdp_error)?
                .into_value::<String>()
                .map_err(cdp_error)
        }

        async fn wait_for_load(&self) -> EnsayoResult<()> {
            let state = poll_until(
                self.locate_timeout,
                self.poll_interval,
                || self.ready_state(),
                |s| s == "complete",
            )
            .await?;
            if state != "complete" {
                tracing::debug!(%state, "document still loading after click");
            }
            Ok(())
        }

        async fn bool_property(&self, handle: &ElementHandle, name: &str) -> EnsayoResult<bool> {
            let element = self.resolve(handle).await?;
            let value = element.property(name).await.map_err(cdp_error)?;
            Ok(matches!(value, Some(serde_json::Value::Bool(true))))
        }
    }

    #[async_trait]
    impl PageDriver for ChromiumDriver {
        async fn navigate(&mut self, url: &str) -> EnsayoResult<()> {
            let _ = self
                .page
                .goto(url)
                .await
                .map_err(|e| EnsayoError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn set_viewport(&mut self, viewport: Viewport) -> EnsayoResult<()> {
            let params = SetDeviceMetricsOverrideParams::new(
                i64::from(viewport.width),
                i64::from(viewport.height),
                1.0,
                false,
            );
            let _ = self.page.execute(params).await.map_err(cdp_error)?;
            Ok(())
        }

        async fn locate(&mut self, selector: &str) -> EnsayoResult<Option<ElementHandle>> {
            let found = self.count_within(selector, self.locate_timeout).await?;
            Ok((found > 0).then(|| ElementHandle::new(selector, 0)))
        }

        async fn locate_all(&mut self, selector: &str) -> EnsayoResult<Vec<ElementHandle>> {
            let found = self.count_within(selector, self.locate_timeout).await?;
            Ok((0..found).map(|i| ElementHandle::new(selector, i)).collect())
        }

        async fn type_text(&mut self, element: &ElementHandle, text: &str) -> EnsayoResult<()> {
            if text.is_empty() {
                return Err(EnsayoError::unsupported(format!(
                    "cannot type an empty string into {element}"
                )));
            }
            let target = self.resolve(element).await?;
            let _ = target
                .click()
                .await
                .map_err(cdp_error)?
                .type_str(text)
                .await
                .map_err(cdp_error)?;
            Ok(())
        }

        async fn click(&mut self, element: &ElementHandle) -> EnsayoResult<()> {
            let target = self.resolve(element).await?;
            let _ = target.click().await.map_err(cdp_error)?;
            self.wait_for_load().await
        }

        async fn text(&mut self, element: &ElementHandle) -> EnsayoResult<String> {
            let target = self.resolve(element).await?;
            Ok(target.inner_text().await.map_err(cdp_error)?.unwrap_or_default())
        }

        async fn attribute(
            &mut self,
            element: &ElementHandle,
            name: &str,
        ) -> EnsayoResult<Option<String>> {
            let target = self.resolve(element).await?;
            target.attribute(name).await.map_err(cdp_error)
        }

        async fn is_enabled(&mut self, element: &ElementHandle) -> EnsayoResult<bool> {
            Ok(!self.bool_property(element, "disabled").await?)
        }

        async fn is_checked(&mut self, element: &ElementHandle) -> EnsayoResult<bool> {
            self.bool_property(element, "checked").await
        }

        async fn wait_for(
            &mut self,
            selector: &str,
            timeout: Duration,
        ) -> EnsayoResult<ElementHandle> {
            if self.count_within(selector, timeout).await? > 0 {
                Ok(ElementHandle::new(selector, 0))
            } else {
                Err(EnsayoError::ActionTimeout {
                    step: format!("wait for {selector}"),
                    ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                })
            }
        }

        async fn screenshot(&mut self, element: &ElementHandle) -> EnsayoResult<Vec<u8>> {
            let target = self.resolve(element).await?;
            target
                .screenshot(CaptureScreenshotFormat::Png)
                .await
                .map_err(|e| EnsayoError::Snapshot {
                    name: element.to_string(),
                    message: e.to_string(),
                })
        }

        async fn close(&mut self) -> EnsayoResult<()> {
            self.page.clone().close().await.map_err(cdp_error)
        }
    }

    /// Page factory over a shared browser, one page per scenario
    #[derive(Debug, Clone)]
    pub struct ChromiumFactory {
        browser: Arc<ChromiumBrowser>,
    }

    impl ChromiumFactory {
        /// Wrap a launched browser
        #[must_use]
        pub const fn new(browser: Arc<ChromiumBrowser>) -> Self {
            Self { browser }
        }
    }

    #[async_trait]
    impl DriverFactory for ChromiumFactory {
        type Driver = ChromiumDriver;

        async fn create(&self) -> EnsayoResult<ChromiumDriver> {
            self.browser.new_driver().await
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::{ChromiumBrowser, ChromiumDriver, ChromiumFactory};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_config_default() {
        let config = BrowserConfig::default();
        assert!(!config.headed);
        assert!(config.sandbox);
        assert!(config.chromium_path.is_none());
    }

    #[test]
    fn test_browser_config_builder() {
        let config = BrowserConfig::default()
            .with_viewport(Viewport::new(1800, 1000))
            .with_headed(true)
            .with_chromium_path("/usr/bin/chromium")
            .with_no_sandbox();
        assert_eq!(config.viewport, Viewport::new(1800, 1000));
        assert!(config.headed);
        assert!(!config.sandbox);
        assert_eq!(
            config.chromium_path.as_deref(),
            Some(std::path::Path::new("/usr/bin/chromium"))
        );
    }

    #[test]
    fn test_browser_config_waits() {
        let config = BrowserConfig::default();
        assert_eq!(config.locate_timeout, Duration::from_millis(2_000));
        assert_eq!(config.poll_interval, Duration::from_millis(50));

        let config = config
            .with_locate_timeout(Duration::from_millis(500))
            .with_poll_interval(Duration::ZERO);
        assert_eq!(config.locate_timeout, Duration::from_millis(500));
        assert_eq!(config.poll_interval, Duration::from_millis(1));
    }

    mod poll_tests {
        use super::*;
        use crate::result::EnsayoError;
        use std::sync::atomic::{AtomicUsize, Ordering};

        const INTERVAL: Duration = Duration::from_millis(5);

        #[tokio::test]
        async fn test_waits_for_late_element() {
            let polls = AtomicUsize::new(0);
            let found = poll_until(
                Duration::from_secs(2),
                INTERVAL,
                || async {
                    let n = polls.fetch_add(1, Ordering::SeqCst);
                    Ok(usize::from(n >= 3))
                },
                |n| *n > 0,
            )
            .await
            .unwrap();
            assert_eq!(found, 1);
            assert_eq!(polls.load(Ordering::SeqCst), 4);
        }

        #[tokio::test]
        async fn test_gives_up_after_timeout() {
            let polls = AtomicUsize::new(0);
            let found = poll_until(
                Duration::from_millis(30),
                INTERVAL,
                || async {
                    polls.fetch_add(1, Ordering::SeqCst);
                    Ok(0_usize)
                },
                |n| *n > 0,
            )
            .await
            .unwrap();
            assert_eq!(found, 0);
            assert!(polls.load(Ordering::SeqCst) > 1);
        }

        #[tokio::test]
        async fn test_probe_error_stops_wait() {
            let polls = AtomicUsize::new(0);
            let result: EnsayoResult<usize> = poll_until(
                Duration::from_secs(2),
                INTERVAL,
                || async {
                    polls.fetch_add(1, Ordering::SeqCst);
                    Err(EnsayoError::driver("connection closed"))
                },
                |n| *n > 0,
            )
            .await;
            assert!(matches!(result, Err(EnsayoError::Driver { .. })));
            assert_eq!(polls.load(Ordering::SeqCst), 1);
        }

        #[tokio::test]
        async fn test_zero_timeout_probes_once() {
            let polls = AtomicUsize::new(0);
            let state = poll_until(
                Duration::ZERO,
                INTERVAL,
                || async {
                    polls.fetch_add(1, Ordering::SeqCst);
                    Ok("loading".to_string())
                },
                |s| s == "complete",
            )
            .await
            .unwrap();
            assert_eq!(state, "loading");
            assert_eq!(polls.load(Ordering::SeqCst), 1);
        }
    }
}
