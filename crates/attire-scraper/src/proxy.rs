use std::collections::HashSet;
use std::path::Path;

/// Round-robin proxy rotation with a blacklist.
///
/// The pool only hands out endpoints; building a session against one is
/// the caller's job. When every proxy has been blacklisted the pool fails
/// open: the blacklist is cleared and rotation restarts from the front.
#[derive(Debug, Default)]
pub struct ProxyPool {
    proxies: Vec<String>,
    cursor: usize,
    failed: HashSet<String>,
}

impl ProxyPool {
    #[must_use]
    pub fn new(proxies: Vec<String>) -> Self {
        Self {
            proxies,
            cursor: 0,
            failed: HashSet::new(),
        }
    }

    /// Load endpoints from a text file, one per line; blank lines and `#`
    /// comments are skipped.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file cannot be read.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let proxies = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(ToString::to_string)
            .collect();
        Ok(Self::new(proxies))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    /// Next non-blacklisted endpoint in rotation, or `None` when the pool
    /// is empty.
    pub fn next_proxy(&mut self) -> Option<String> {
        if self.proxies.is_empty() {
            return None;
        }

        for _ in 0..self.proxies.len() {
            let candidate = self.proxies[self.cursor].clone();
            self.cursor = (self.cursor + 1) % self.proxies.len();
            if !self.failed.contains(&candidate) {
                return Some(candidate);
            }
        }

        tracing::warn!("all proxies blacklisted; clearing blacklist");
        self.failed.clear();
        self.cursor = 1 % self.proxies.len();
        Some(self.proxies[0].clone())
    }

    /// Blacklist an endpoint without removing it from the rotation order.
    pub fn mark_failed(&mut self, proxy: &str) {
        if self.proxies.iter().any(|p| p == proxy) {
            self.failed.insert(proxy.to_string());
        }
    }
}
