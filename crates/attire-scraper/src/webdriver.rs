//! WebDriver-backed implementation of the browser seam.
//!
//! WebDriver does not expose the HTTP status of the document response, so
//! navigations report `status: None`; status-driven recovery only engages
//! for engines that can report one.

use std::time::Duration;

use async_trait::async_trait;
use fantoccini::wd::Capabilities;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;

use crate::browser::{BrowserPage, NavOutcome, PageFactory};
use crate::error::ScrapeError;

const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight);";

fn session_err(err: impl std::fmt::Display) -> ScrapeError {
    ScrapeError::Session(err.to_string())
}

pub struct WebDriverPage {
    client: Client,
}

#[async_trait]
impl BrowserPage for WebDriverPage {
    async fn navigate(&mut self, url: &str) -> Result<NavOutcome, ScrapeError> {
        self.client.goto(url).await.map_err(session_err)?;
        let final_url = self.client.current_url().await.map_err(session_err)?;
        Ok(NavOutcome {
            status: None,
            final_url: final_url.to_string(),
        })
    }

    async fn wait_for_any(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, ScrapeError> {
        let found = self
            .client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await;
        Ok(found.is_ok())
    }

    async fn attr_all(&mut self, selector: &str, attr: &str) -> Result<Vec<String>, ScrapeError> {
        let elements = self
            .client
            .find_all(Locator::Css(selector))
            .await
            .map_err(session_err)?;

        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
            if let Some(value) = element.attr(attr).await.map_err(session_err)? {
                values.push(value);
            }
        }
        Ok(values)
    }

    async fn text_first(&mut self, selector: &str) -> Result<Option<String>, ScrapeError> {
        match self.client.find(Locator::Css(selector)).await {
            Ok(element) => Ok(element.text().await.ok()),
            Err(_) => Ok(None),
        }
    }

    async fn click_first(&mut self, selector: &str) -> Result<bool, ScrapeError> {
        match self.client.find(Locator::Css(selector)).await {
            Ok(element) => Ok(element.click().await.is_ok()),
            Err(_) => Ok(false),
        }
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), ScrapeError> {
        self.client
            .execute(SCROLL_TO_BOTTOM, vec![])
            .await
            .map_err(session_err)?;
        Ok(())
    }

    async fn close(self: Box<Self>) {
        if let Err(err) = self.client.close().await {
            tracing::debug!(error = %err, "browser session close failed");
        }
    }
}

/// Opens headless Chrome sessions against a WebDriver endpoint.
pub struct WebDriverFactory {
    webdriver_url: String,
    user_agent: String,
}

impl WebDriverFactory {
    #[must_use]
    pub fn new(webdriver_url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            user_agent: user_agent.into(),
        }
    }

    fn capabilities(&self, proxy: Option<&str>) -> Capabilities {
        let mut caps = Capabilities::new();
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({
                "args": [
                    "--headless=new",
                    "--no-sandbox",
                    "--disable-dev-shm-usage",
                    "--disable-blink-features=AutomationControlled",
                    format!("--user-agent={}", self.user_agent),
                ],
            }),
        );
        if let Some(endpoint) = proxy {
            caps.insert(
                "proxy".to_string(),
                json!({
                    "proxyType": "manual",
                    "httpProxy": endpoint,
                    "sslProxy": endpoint,
                }),
            );
        }
        caps
    }
}

#[async_trait]
impl PageFactory for WebDriverFactory {
    async fn open(&self, proxy: Option<&str>) -> Result<Box<dyn BrowserPage>, ScrapeError> {
        let client = ClientBuilder::rustls()
            .map_err(session_err)?
            .capabilities(self.capabilities(proxy))
            .connect(&self.webdriver_url)
            .await
            .map_err(session_err)?;

        tracing::debug!(proxy = proxy.unwrap_or("none"), "opened browser session");
        Ok(Box::new(WebDriverPage { client }))
    }
}
