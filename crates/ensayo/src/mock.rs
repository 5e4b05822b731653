//! In-memory page capability for unit testing.
//!
//! [`MockDriver`] implements [`PageDriver`] over a tiny DOM model: elements
//! are keyed by their literal selector string (no CSS parsing), and clicks
//! can trigger scripted reactions that mutate the DOM. Each `navigate` builds
//! a fresh page from the driver's page factory, which models a page reset.

use crate::driver::{ElementHandle, PageDriver, Viewport};
use crate::result::{EnsayoError, EnsayoResult};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

/// Reaction run when an element is clicked
pub type ClickReaction = Arc<dyn Fn(&mut MockDom) + Send + Sync>;

/// Builds the page served for a URL
pub type PageFactory = Arc<dyn Fn(&str) -> MockPage + Send + Sync>;

/// A single mock element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    /// Rendered text
    pub text: String,
    /// Attributes
    pub attributes: BTreeMap<String, String>,
    /// Enabled state
    pub enabled: bool,
    /// Checked state
    pub checked: bool,
    /// Typed value
    pub value: String,
    /// PNG bytes returned by `screenshot`
    pub screenshot: Vec<u8>,
}

impl Default for MockElement {
    fn default() -> Self {
        Self {
            text: String::new(),
            attributes: BTreeMap::new(),
            enabled: true,
            checked: false,
            value: String::new(),
            screenshot: Vec::new(),
        }
    }
}

impl MockElement {
    /// Create an element with text
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Mark as disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Set checked state
    #[must_use]
    pub const fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    /// Set screenshot bytes
    #[must_use]
    pub fn with_screenshot(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.screenshot = bytes.into();
        self
    }
}

/// Elements of a mock page, keyed by selector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockDom {
    elements: BTreeMap<String, Vec<MockElement>>,
}

impl MockDom {
    /// Whether any element matches `selector`
    #[must_use]
    pub fn contains(&self, selector: &str) -> bool {
        self.elements.get(selector).is_some_and(|v| !v.is_empty())
    }

    /// All elements matching `selector`
    #[must_use]
    pub fn all(&self, selector: &str) -> &[MockElement] {
        self.elements.get(selector).map_or(&[], Vec::as_slice)
    }

    /// The `index`-th match for `selector`
    #[must_use]
    pub fn get(&self, selector: &str, index: usize) -> Option<&MockElement> {
        self.elements.get(selector).and_then(|v| v.get(index))
    }

    /// Mutable access to the `index`-th match for `selector`
    pub fn get_mut(&mut self, selector: &str, index: usize) -> Option<&mut MockElement> {
        self.elements.get_mut(selector).and_then(|v| v.get_mut(index))
    }

    /// Typed value of the first match (empty when absent)
    #[must_use]
    pub fn value(&self, selector: &str) -> &str {
        self.get(selector, 0).map_or("", |e| e.value.as_str())
    }

    /// Replace all matches for `selector` with one element
    pub fn insert(&mut self, selector: impl Into<String>, element: MockElement) {
        let _ = self.elements.insert(selector.into(), vec![element]);
    }

    /// Replace all matches for `selector`
    pub fn set_all(&mut self, selector: impl Into<String>, elements: Vec<MockElement>) {
        let _ = self.elements.insert(selector.into(), elements);
    }

    /// Remove every match for `selector`
    pub fn remove(&mut self, selector: &str) {
        let _ = self.elements.remove(selector);
    }
}

/// A mock page: DOM plus click reactions
#[derive(Clone, Default)]
pub struct MockPage {
    dom: MockDom,
    reactions: HashMap<String, ClickReaction>,
}

impl std::fmt::Debug for MockPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockPage")
            .field("dom", &self.dom)
            .field("reactions", &self.reactions.len())
            .finish()
    }
}

impl MockPage {
    /// Create an empty page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text-only element
    #[must_use]
    pub fn element(self, selector: impl Into<String>, text: impl Into<String>) -> Self {
        self.with(selector, MockElement::new(text))
    }

    /// Add a fully specified element
    #[must_use]
    pub fn with(mut self, selector: impl Into<String>, element: MockElement) -> Self {
        self.dom.insert(selector, element);
        self
    }

    /// Add several matches for one selector
    #[must_use]
    pub fn elements(mut self, selector: impl Into<String>, elements: Vec<MockElement>) -> Self {
        self.dom.set_all(selector, elements);
        self
    }

    /// Script a reaction to clicks on `selector`
    #[must_use]
    pub fn on_click<F>(mut self, selector: impl Into<String>, reaction: F) -> Self
    where
        F: Fn(&mut MockDom) + Send + Sync + 'static,
    {
        let _ = self.reactions.insert(selector.into(), Arc::new(reaction));
        self
    }

    /// Page DOM
    #[must_use]
    pub const fn dom(&self) -> &MockDom {
        &self.dom
    }
}

/// Mock driver for unit testing
pub struct MockDriver {
    factory: PageFactory,
    page: MockPage,
    current_url: String,
    viewport: Viewport,
    latency: Duration,
    call_history: Vec<String>,
}

impl std::fmt::Debug for MockDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockDriver")
            .field("current_url", &self.current_url)
            .field("viewport", &self.viewport)
            .field("page", &self.page)
            .field("call_history", &self.call_history)
            .finish()
    }
}

impl MockDriver {
    /// Create a driver that builds a page per navigated URL
    #[must_use]
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&str) -> MockPage + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(factory),
            page: MockPage::default(),
            current_url: String::new(),
            viewport: Viewport::default(),
            latency: Duration::ZERO,
            call_history: Vec::new(),
        }
    }

    /// Create a driver serving the same page for every URL
    #[must_use]
    pub fn with_page(page: MockPage) -> Self {
        let template = page.clone();
        let mut driver = Self::new(move |_| template.clone());
        driver.page = page;
        driver
    }

    /// Delay every navigate/click by `latency`
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.call_history
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.call_history.iter().any(|c| c.starts_with(method))
    }

    /// Current URL
    #[must_use]
    pub fn current_url(&self) -> &str {
        &self.current_url
    }

    /// Current viewport
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Current page DOM
    #[must_use]
    pub const fn dom(&self) -> &MockDom {
        &self.page.dom
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn element(&self, handle: &ElementHandle) -> EnsayoResult<&MockElement> {
        self.page
            .dom
            .get(&handle.selector, handle.index)
            .ok_or_else(|| EnsayoError::LocatorNotFound {
                selector: handle.to_string(),
            })
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn navigate(&mut self, url: &str) -> EnsayoResult<()> {
        self.delay().await;
        self.call_history.push(format!("navigate:{url}"));
        self.page = (self.factory)(url);
        self.current_url = url.to_string();
        Ok(())
    }

    async fn set_viewport(&mut self, viewport: Viewport) -> EnsayoResult<()> {
        self.call_history
            .push(format!("set_viewport:{}x{}", viewport.width, viewport.height));
        self.viewport = viewport;
        Ok(())
    }

    async fn locate(&mut self, selector: &str) -> EnsayoResult<Option<ElementHandle>> {
        Ok(self
            .page
            .dom
            .contains(selector)
            .then(|| ElementHandle::new(selector, 0)))
    }

    async fn locate_all(&mut self, selector: &str) -> EnsayoResult<Vec<ElementHandle>> {
        Ok((0..self.page.dom.all(selector).len())
            .map(|i| ElementHandle::new(selector, i))
            .collect())
    }

    async fn type_text(&mut self, element: &ElementHandle, text: &str) -> EnsayoResult<()> {
        if text.is_empty() {
            return Err(EnsayoError::unsupported(format!(
                "cannot type an empty string into {element}"
            )));
        }
        self.call_history.push(format!("type:{element}:{text}"));
        let target = self
            .page
            .dom
            .get_mut(&element.selector, element.index)
            .ok_or_else(|| EnsayoError::LocatorNotFound {
                selector: element.to_string(),
            })?;
        target.value.push_str(text);
        Ok(())
    }

    async fn click(&mut self, element: &ElementHandle) -> EnsayoResult<()> {
        self.delay().await;
        if !self.element(element)?.enabled {
            return Err(EnsayoError::driver(format!("{element} is disabled")));
        }
        self.call_history.push(format!("click:{element}"));
        if let Some(reaction) = self.page.reactions.get(&element.selector).cloned() {
            reaction(&mut self.page.dom);
        }
        Ok(())
    }

    async fn text(&mut self, element: &ElementHandle) -> EnsayoResult<String> {
        Ok(self.element(element)?.text.clone())
    }

    async fn attribute(
        &mut self,
        element: &ElementHandle,
        name: &str,
    ) -> EnsayoResult<Option<String>> {
        Ok(self.element(element)?.attributes.get(name).cloned())
    }

    async fn is_enabled(&mut self, element: &ElementHandle) -> EnsayoResult<bool> {
        Ok(self.element(element)?.enabled)
    }

    async fn is_checked(&mut self, element: &ElementHandle) -> EnsayoResult<bool> {
        Ok(self.element(element)?.checked)
    }

    async fn wait_for(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> EnsayoResult<ElementHandle> {
        if self.page.dom.contains(selector) {
            Ok(ElementHandle::new(selector, 0))
        } else {
            Err(EnsayoError::ActionTimeout {
                step: format!("wait for {selector}"),
                ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            })
        }
    }

    async fn screenshot(&mut self, element: &ElementHandle) -> EnsayoResult<Vec<u8>> {
        self.call_history.push(format!("screenshot:{element}"));
        Ok(self.element(element)?.screenshot.clone())
    }

    async fn close(&mut self) -> EnsayoResult<()> {
        self.call_history.push("close".to_string());
        Ok(())
    }
}
