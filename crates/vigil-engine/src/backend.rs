use async_trait::async_trait;
use std::time::{Duration, Instant};
pub use vigil_common::BackendError;
use vigil_common::ElementMetadata;

/// Interval between element lookups while waiting for a state.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct NavigationResult {
    pub url: String,
    pub title: String,
    pub status: u16,
}

/// State an element must reach before a wait succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementState {
    /// Present in the DOM, visible or not. Used by discovery.
    Attached,
    /// Present and rendered with a non-empty box. Used at test time.
    Visible,
}

impl ElementState {
    pub fn is_satisfied_by(&self, meta: &ElementMetadata) -> bool {
        match self {
            ElementState::Attached => true,
            ElementState::Visible => meta.visible,
        }
    }
}

/// The browser capability every driver implements.
///
/// One instance drives one page and is used by one flow at a time; callers
/// hold it by `&mut` for the length of a discovery run or a test.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Launch the backend (start browser, connect to a driver, etc.)
    async fn launch(&mut self) -> Result<(), BackendError>;

    /// Close the backend and cleanup resources.
    async fn close(&mut self) -> Result<(), BackendError>;

    /// Check if the backend is ready to accept commands.
    async fn is_ready(&self) -> bool;

    /// Navigate to a specific URL.
    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError>;

    /// Look the selector up once, without waiting.
    ///
    /// `Ok(None)` means nothing matched right now. Malformed selectors are
    /// reported as `BackendError::SelectorInvalid`.
    async fn find_element(
        &mut self,
        selector: &str,
    ) -> Result<Option<ElementMetadata>, BackendError>;

    /// Replace the value of the matched input.
    async fn fill(&mut self, selector: &str, value: &str) -> Result<(), BackendError>;

    async fn click(&mut self, selector: &str) -> Result<(), BackendError>;

    /// Visible text of the matched element.
    async fn text_content(&mut self, selector: &str) -> Result<String, BackendError>;

    /// Current value of the matched form control.
    async fn input_value(&mut self, selector: &str) -> Result<String, BackendError>;

    /// Capture a screenshot of the current viewport.
    async fn screenshot(&mut self) -> Result<Vec<u8>, BackendError>;

    /// Wait until the selector matches an element in `state`, or `timeout`
    /// elapses.
    ///
    /// Returns `Ok(None)` on timeout. The default polls `find_element`.
    async fn query_element(
        &mut self,
        selector: &str,
        state: ElementState,
        timeout: Duration,
    ) -> Result<Option<ElementMetadata>, BackendError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(meta) = self.find_element(selector).await?
                && state.is_satisfied_by(&meta)
            {
                return Ok(Some(meta));
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
        }
    }
}
