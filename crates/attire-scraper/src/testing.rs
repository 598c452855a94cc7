//! Scripted browser fakes shared by the guard/catalog/extractor tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::browser::{BrowserPage, NavOutcome, PageFactory};
use crate::error::ScrapeError;

/// One scripted navigation outcome, consumed per `navigate` call.
#[derive(Debug, Clone, Default)]
pub(crate) struct NavStep {
    pub status: Option<u16>,
    pub final_url: Option<String>,
    pub ready: bool,
    /// Selectors that report "absent" to waits and text lookups.
    pub missing: Vec<String>,
    pub texts: HashMap<String, String>,
    pub attrs: HashMap<String, Vec<String>>,
}

impl NavStep {
    pub fn ok() -> Self {
        Self {
            status: Some(200),
            ready: true,
            ..Self::default()
        }
    }

    pub fn with_status(status: u16) -> Self {
        Self {
            status: Some(status),
            ..Self::ok()
        }
    }

    pub fn redirected_to(landed: &str) -> Self {
        Self {
            final_url: Some(landed.to_string()),
            ..Self::ok()
        }
    }

    pub fn not_ready() -> Self {
        Self {
            ready: false,
            ..Self::ok()
        }
    }

    pub fn missing(mut self, selector: &str) -> Self {
        self.missing.push(selector.to_string());
        self
    }

    pub fn text(mut self, selector: &str, value: &str) -> Self {
        self.texts.insert(selector.to_string(), value.to_string());
        self
    }

    pub fn attrs(mut self, selector: &str, values: &[&str]) -> Self {
        self.attrs.insert(
            selector.to_string(),
            values.iter().map(ToString::to_string).collect(),
        );
        self
    }
}

/// Shared state driving every page a [`ScriptedFactory`] opens, so a
/// session replaced mid-call continues the same scripted sequence.
pub(crate) struct Script {
    steps: Mutex<VecDeque<NavStep>>,
    log: Mutex<Vec<String>>,
    opens: AtomicU32,
    /// Budget of proxied opens that fail before a session is produced.
    open_failures: AtomicU32,
    scroll_rounds: Mutex<VecDeque<Vec<String>>>,
    scroll_selector: String,
}

impl Script {
    pub fn new(steps: Vec<NavStep>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            log: Mutex::new(Vec::new()),
            opens: AtomicU32::new(0),
            open_failures: AtomicU32::new(0),
            scroll_rounds: Mutex::new(VecDeque::new()),
            scroll_selector: String::new(),
        })
    }

    /// Script where each scroll step reveals one more batch of links under
    /// `selector`.
    pub fn with_scroll(steps: Vec<NavStep>, selector: &str, rounds: Vec<Vec<&str>>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            log: Mutex::new(Vec::new()),
            opens: AtomicU32::new(0),
            open_failures: AtomicU32::new(0),
            scroll_rounds: Mutex::new(
                rounds
                    .into_iter()
                    .map(|batch| batch.into_iter().map(ToString::to_string).collect())
                    .collect(),
            ),
            scroll_selector: selector.to_string(),
        })
    }

    /// Make the next `n` proxied opens fail before a session is produced.
    pub fn fail_opens(&self, n: u32) {
        self.open_failures.store(n, Ordering::SeqCst);
    }

    pub fn record(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.log()
            .into_iter()
            .filter_map(|entry| entry.strip_prefix("goto:").map(ToString::to_string))
            .collect()
    }

    pub fn opens(&self) -> u32 {
        self.opens.load(Ordering::SeqCst)
    }
}

pub(crate) struct ScriptedPage {
    script: Arc<Script>,
    current: NavStep,
    scrolled: Vec<String>,
}

#[async_trait]
impl BrowserPage for ScriptedPage {
    async fn navigate(&mut self, url: &str) -> Result<NavOutcome, ScrapeError> {
        self.script.record(format!("goto:{url}"));
        let step = self
            .script
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(NavStep::ok);
        let outcome = NavOutcome {
            status: step.status,
            final_url: step.final_url.clone().unwrap_or_else(|| url.to_string()),
        };
        self.current = step;
        Ok(outcome)
    }

    async fn wait_for_any(
        &mut self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<bool, ScrapeError> {
        if self.current.missing.iter().any(|m| m == selector) {
            return Ok(false);
        }
        Ok(self.current.ready)
    }

    async fn attr_all(&mut self, selector: &str, _attr: &str) -> Result<Vec<String>, ScrapeError> {
        let mut values = self
            .current
            .attrs
            .get(selector)
            .cloned()
            .unwrap_or_default();
        if selector == self.script.scroll_selector {
            values.extend(self.scrolled.iter().cloned());
        }
        Ok(values)
    }

    async fn text_first(&mut self, selector: &str) -> Result<Option<String>, ScrapeError> {
        if self.current.missing.iter().any(|m| m == selector) {
            return Ok(None);
        }
        Ok(self.current.texts.get(selector).cloned())
    }

    async fn click_first(&mut self, selector: &str) -> Result<bool, ScrapeError> {
        self.script.record(format!("click:{selector}"));
        Ok(true)
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), ScrapeError> {
        self.script.record("scroll".to_string());
        if let Some(batch) = self.script.scroll_rounds.lock().unwrap().pop_front() {
            self.scrolled.extend(batch);
        }
        Ok(())
    }

    async fn close(self: Box<Self>) {
        self.script.record("close".to_string());
    }
}

pub(crate) struct ScriptedFactory {
    script: Arc<Script>,
}

impl ScriptedFactory {
    pub fn new(script: Arc<Script>) -> Arc<Self> {
        Arc::new(Self { script })
    }
}

#[async_trait]
impl PageFactory for ScriptedFactory {
    async fn open(&self, proxy: Option<&str>) -> Result<Box<dyn BrowserPage>, ScrapeError> {
        self.script.opens.fetch_add(1, Ordering::SeqCst);
        self.script
            .record(format!("open:{}", proxy.unwrap_or("direct")));
        if proxy.is_some()
            && self
                .script
                .open_failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        {
            return Err(ScrapeError::Session("scripted open failure".to_string()));
        }
        Ok(Box::new(ScriptedPage {
            script: Arc::clone(&self.script),
            current: NavStep::ok(),
            scrolled: Vec::new(),
        }))
    }
}
