//! Seam between the scraping logic and the browser engine.
//!
//! Everything above this module talks to a [`BrowserPage`]; the engine
//! behind it (a WebDriver session in production, a scripted fake in tests)
//! is an external collaborator constructed through a [`PageFactory`].

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ScrapeError;

/// Result of a navigation: the landed URL and, when the engine can report
/// it, the HTTP status of the document response.
#[derive(Debug, Clone)]
pub struct NavOutcome {
    pub status: Option<u16>,
    pub final_url: String,
}

/// One live browser page/tab.
#[async_trait]
pub trait BrowserPage: Send + Sync {
    async fn navigate(&mut self, url: &str) -> Result<NavOutcome, ScrapeError>;

    /// Wait up to `timeout` for any element matching `selector`.
    /// `Ok(false)` means the wait elapsed without a match.
    async fn wait_for_any(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, ScrapeError>;

    /// Collect `attr` from every element matching `selector`, in document
    /// order; elements without the attribute are skipped.
    async fn attr_all(&mut self, selector: &str, attr: &str) -> Result<Vec<String>, ScrapeError>;

    /// Text content of the first element matching `selector`, if any.
    async fn text_first(&mut self, selector: &str) -> Result<Option<String>, ScrapeError>;

    /// Click the first element matching `selector`; `Ok(false)` when no
    /// element matched.
    async fn click_first(&mut self, selector: &str) -> Result<bool, ScrapeError>;

    async fn scroll_to_bottom(&mut self) -> Result<(), ScrapeError>;

    /// Tear the session down. Best-effort; errors are swallowed.
    async fn close(self: Box<Self>);
}

/// Opens fresh pages, optionally routed through a proxy endpoint.
#[async_trait]
pub trait PageFactory: Send + Sync {
    async fn open(&self, proxy: Option<&str>) -> Result<Box<dyn BrowserPage>, ScrapeError>;
}
