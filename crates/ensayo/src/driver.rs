//! PageDriver - Abstract Browser Automation Capability
//!
//! The runner never touches a browser directly. Everything it needs from the
//! page goes through [`PageDriver`], so a CDP-backed driver, a remote
//! automation bridge, or the in-memory [`MockDriver`](crate::MockDriver) are
//! interchangeable.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  ScenarioRunner                                              │
//! │      │  navigate / locate / type / click / text / snapshot   │
//! │      ▼                                                       │
//! │  PageDriver (trait)                                          │
//! │      ├── ChromiumDriver   (feature = "browser")              │
//! │      └── MockDriver       (in-memory page for tests)         │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use crate::result::EnsayoResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Handle to one element matched by a selector.
///
/// Handles are cheap descriptors; drivers resolve them again on use, so a
/// handle taken before a re-render still addresses "the n-th match".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Selector the element was located with
    pub selector: String,
    /// Position among the selector's matches
    pub index: usize,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(selector: impl Into<String>, index: usize) -> Self {
        Self {
            selector: selector.into(),
            index,
        }
    }
}

impl std::fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.index == 0 {
            write!(f, "{}", self.selector)
        } else {
            write!(f, "{}[{}]", self.selector, self.index)
        }
    }
}

/// Viewport dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
}

impl Viewport {
    /// Create a new viewport
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

/// Browser-automation capability used by the runner.
///
/// Implementations own retry and auto-wait behaviour; the runner calls each
/// method once and bounds it with its own step timeout.
#[async_trait]
pub trait PageDriver: Send {
    /// Navigate to URL, replacing the current page state
    async fn navigate(&mut self, url: &str) -> EnsayoResult<()>;

    /// Resize the viewport
    async fn set_viewport(&mut self, viewport: Viewport) -> EnsayoResult<()>;

    /// First element matching `selector`, if any
    async fn locate(&mut self, selector: &str) -> EnsayoResult<Option<ElementHandle>>;

    /// All elements matching `selector`, in document order
    async fn locate_all(&mut self, selector: &str) -> EnsayoResult<Vec<ElementHandle>>;

    /// Type text into element
    async fn type_text(&mut self, element: &ElementHandle, text: &str) -> EnsayoResult<()>;

    /// Click element
    async fn click(&mut self, element: &ElementHandle) -> EnsayoResult<()>;

    /// Rendered text of element
    async fn text(&mut self, element: &ElementHandle) -> EnsayoResult<String>;

    /// Attribute value of element (`None` when absent)
    async fn attribute(
        &mut self,
        element: &ElementHandle,
        name: &str,
    ) -> EnsayoResult<Option<String>>;

    /// Whether element is enabled
    async fn is_enabled(&mut self, element: &ElementHandle) -> EnsayoResult<bool>;

    /// Whether element is checked
    async fn is_checked(&mut self, element: &ElementHandle) -> EnsayoResult<bool>;

    /// Wait until `selector` matches, up to `timeout`
    async fn wait_for(&mut self, selector: &str, timeout: Duration)
        -> EnsayoResult<ElementHandle>;

    /// PNG bytes of element
    async fn screenshot(&mut self, element: &ElementHandle) -> EnsayoResult<Vec<u8>>;

    /// Release browser resources
    async fn close(&mut self) -> EnsayoResult<()> {
        Ok(())
    }
}

#[async_trait]
impl<D: PageDriver + ?Sized> PageDriver for Box<D> {
    async fn navigate(&mut self, url: &str) -> EnsayoResult<()> {
        (**self).navigate(url).await
    }

    async fn set_viewport(&mut self, viewport: Viewport) -> EnsayoResult<()> {
        (**self).set_viewport(viewport).await
    }

    async fn locate(&mut self, selector: &str) -> EnsayoResult<Option<ElementHandle>> {
        (**self).locate(selector).await
    }

    async fn locate_all(&mut self, selector: &str) -> EnsayoResult<Vec<ElementHandle>> {
        (**self).locate_all(selector).await
    }

    async fn type_text(&mut self, element: &ElementHandle, text: &str) -> EnsayoResult<()> {
        (**self).type_text(element, text).await
    }

    async fn click(&mut self, element: &ElementHandle) -> EnsayoResult<()> {
        (**self).click(element).await
    }

    async fn text(&mut self, element: &ElementHandle) -> EnsayoResult<String> {
        (**self).text(element).await
    }

    async fn attribute(
        &mut self,
        element: &ElementHandle,
        name: &str,
    ) -> EnsayoResult<Option<String>> {
        (**self).attribute(element, name).await
    }

    async fn is_enabled(&mut self, element: &ElementHandle) -> EnsayoResult<bool> {
        (**self).is_enabled(element).await
    }

    async fn is_checked(&mut self, element: &ElementHandle) -> EnsayoResult<bool> {
        (**self).is_checked(element).await
    }

    async fn wait_for(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> EnsayoResult<ElementHandle> {
        (**self).wait_for(selector, timeout).await
    }

    async fn screenshot(&mut self, element: &ElementHandle) -> EnsayoResult<Vec<u8>> {
        (**self).screenshot(element).await
    }

    async fn close(&mut self) -> EnsayoResult<()> {
        (**self).close().await
    }
}

/// Source of isolated page contexts for parallel runs
#[async_trait]
pub trait DriverFactory: Sync {
    /// Driver type produced
    type Driver: PageDriver;

    /// Create a fresh, isolated driver
    async fn create(&self) -> EnsayoResult<Self::Driver>;
}

/// [`DriverFactory`] backed by a plain constructor function
#[derive(Debug, Clone)]
pub struct FnDriverFactory<F> {
    make: F,
}

impl<F> FnDriverFactory<F> {
    /// Wrap a constructor
    #[must_use]
    pub const fn new(make: F) -> Self {
        Self { make }
    }
}

#[async_trait]
impl<D, F> DriverFactory for FnDriverFactory<F>
where
    D: PageDriver + 'static,
    F: Fn() -> D + Send + Sync,
{
    type Driver = D;

    async fn create(&self) -> EnsayoResult<D> {
        Ok((self.make)())
    }
}
