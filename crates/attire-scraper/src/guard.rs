//! Failure-aware navigation over an owned browser session.

use std::sync::Arc;
use std::time::Duration;

use crate::browser::{BrowserPage, PageFactory};
use crate::delay::DelayPolicy;
use crate::proxy::ProxyPool;
use crate::retry::Backoff;

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

#[derive(Debug, Clone)]
pub struct GuardConfig {
    pub max_attempts: u32,
    /// Base for the linear backoff between failed attempts.
    pub backoff_base: Duration,
    /// Selector union that marks a catalog or product page as usable.
    pub ready_selectors: String,
    pub ready_timeout: Duration,
    pub consent_selectors: Vec<String>,
    pub rate_limit_pause: Duration,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(2),
            ready_selectors: concat!(
                "[data-component=\"PriceCallout\"], ",
                "[data-testid=\"productCard\"], ",
                "[data-component=\"PaginationLabel\"], ",
                "#catalog-grid, #content"
            )
            .to_string(),
            ready_timeout: Duration::from_secs(40),
            consent_selectors: vec![
                "#onetrust-accept-btn-handler".to_string(),
                "button[data-testid=\"cookie-accept\"]".to_string(),
            ],
            rate_limit_pause: Duration::from_secs(60),
        }
    }
}

/// Owns the live browser page and absorbs navigation failures.
///
/// `goto` reports plain success/failure; a failed URL is the caller's cue
/// to move on, never to abort the run. A proxy switch discards the whole
/// session and opens a fresh one through the factory.
pub struct NavigationGuard {
    page: Box<dyn BrowserPage>,
    factory: Arc<dyn PageFactory>,
    proxies: ProxyPool,
    delay: DelayPolicy,
    config: GuardConfig,
    active_proxy: Option<String>,
}

impl NavigationGuard {
    /// Open the initial (proxy-less) session.
    ///
    /// # Errors
    ///
    /// Returns an error when the factory cannot produce a session at all.
    pub async fn start(
        factory: Arc<dyn PageFactory>,
        proxies: ProxyPool,
        delay: DelayPolicy,
        config: GuardConfig,
    ) -> Result<Self, crate::error::ScrapeError> {
        let page = factory.open(None).await?;
        Ok(Self {
            page,
            factory,
            proxies,
            delay,
            config,
            active_proxy: None,
        })
    }

    /// The live page, for DOM queries after a successful `goto`.
    pub fn page_mut(&mut self) -> &mut dyn BrowserPage {
        self.page.as_mut()
    }

    /// Navigate with recovery. Returns `false` once the URL is judged not
    /// worth further attempts; the session stays usable either way.
    ///
    /// Rate-limit responses pause for the configured window and retry
    /// without consuming an attempt; only real navigation and readiness
    /// failures count against the attempt budget.
    pub async fn goto(&mut self, url: &str, apply_delay: bool) -> bool {
        let mut failures = 0u32;
        let mut switch_attempted = false;

        while failures < self.config.max_attempts {
            if apply_delay {
                self.delay.pause().await;
            }

            let outcome = match self.page.navigate(url).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::warn!(url, error = %err, "navigation failed");
                    failures += 1;
                    self.backoff(failures).await;
                    continue;
                }
            };

            if outcome.status == Some(429) {
                tracing::warn!(url, "rate limited; pausing");
                tokio::time::sleep(self.config.rate_limit_pause).await;
                if !switch_attempted {
                    switch_attempted = true;
                    self.switch_proxy().await;
                }
                // rate limiting never consumes an attempt
                continue;
            }

            if let Some(status) = outcome.status {
                if status >= 400 {
                    if !switch_attempted {
                        switch_attempted = true;
                        if self.switch_proxy().await {
                            continue;
                        }
                    }
                    tracing::warn!(status, url, "navigation rejected with error status");
                    return false;
                }
            }

            if is_unexpected_redirect(url, &outcome.final_url) {
                tracing::warn!(
                    requested = url,
                    landed = %outcome.final_url,
                    "unexpected redirect; giving up on url"
                );
                return false;
            }

            match self
                .page
                .wait_for_any(&self.config.ready_selectors, self.config.ready_timeout)
                .await
            {
                Ok(true) => {}
                Ok(false) | Err(_) => {
                    tracing::warn!(url, "page content not ready");
                    failures += 1;
                    self.backoff(failures).await;
                    continue;
                }
            }

            if failures == 0 {
                self.dismiss_consent().await;
            }
            return true;
        }

        tracing::warn!(url, failures, "giving up after repeated navigation failures");
        false
    }

    async fn backoff(&self, failures: u32) {
        if failures < self.config.max_attempts {
            let wait = Backoff::Linear(self.config.backoff_base).delay(failures - 1);
            if !wait.is_zero() {
                tokio::time::sleep(wait).await;
            }
        }
    }

    /// Best-effort dismissal of cookie/consent overlays.
    async fn dismiss_consent(&mut self) {
        let selectors = self.config.consent_selectors.clone();
        for selector in &selectors {
            let _ = self.page.click_first(selector).await;
        }
    }

    /// Blacklist the active proxy, open a fresh session through the next
    /// one, and discard the old session. `false` when no switch happened.
    async fn switch_proxy(&mut self) -> bool {
        if let Some(old) = self.active_proxy.take() {
            self.proxies.mark_failed(&old);
        }

        let Some(endpoint) = self.proxies.next_proxy() else {
            tracing::warn!("no proxies available for a switch");
            return false;
        };

        match self.factory.open(Some(&endpoint)).await {
            Ok(fresh) => {
                let old = std::mem::replace(&mut self.page, fresh);
                old.close().await;
                tracing::info!(proxy = %endpoint, "replaced browser session via proxy");
                self.active_proxy = Some(endpoint);
                true
            }
            Err(err) => {
                tracing::warn!(proxy = %endpoint, error = %err, "could not open session via proxy");
                self.proxies.mark_failed(&endpoint);
                false
            }
        }
    }
}

/// A page-parameterized request that lands on a different document is a
/// silent redirect to some fallback page, not the content we asked for.
fn is_unexpected_redirect(requested: &str, landed: &str) -> bool {
    if !requested.contains("page=") {
        return false;
    }
    let requested_base = requested.split('?').next().unwrap_or(requested);
    let landed_base = landed.split('?').next().unwrap_or(landed);
    requested_base != landed_base || !landed.contains("page=")
}
