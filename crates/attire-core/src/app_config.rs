use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub catalog_path: PathBuf,
    pub data_dir: PathBuf,
    pub store_url: String,
    pub webdriver_url: String,
    pub proxies_path: Option<PathBuf>,
    pub country: String,
    pub lang: String,
    pub currency: String,
    /// Storefront root, e.g. `https://www.zara.com`; the API base is
    /// `<root>/<country>/<lang>`.
    pub retail_site_root: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub page_ready_timeout_secs: u64,
    pub request_delay_min_secs: f64,
    pub request_delay_max_secs: f64,
    pub rate_limit_pause_secs: u64,
    pub nav_max_attempts: u32,
    pub nav_backoff_base_secs: u64,
    pub api_max_attempts: u32,
    pub api_retry_delay_secs: u64,
    /// `None` means no cap on products collected per category.
    pub items_per_category: Option<usize>,
    pub max_empty_pages: u32,
    pub max_stagnant_scrolls: u32,
}

impl AppConfig {
    /// Country/language-scoped base URL for the retail storefront API.
    #[must_use]
    pub fn api_base_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.retail_site_root.trim_end_matches('/'),
            self.country,
            self.lang
        )
    }
}
