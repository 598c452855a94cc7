use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value fails to parse.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a value fails to parse.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<f64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("ATTIRE_ENV", "development"));
    let log_level = or_default("ATTIRE_LOG_LEVEL", "info");
    let catalog_path = PathBuf::from(or_default("ATTIRE_CATALOG_PATH", "./config/catalog.yaml"));
    let data_dir = PathBuf::from(or_default("ATTIRE_DATA_DIR", "./data"));
    let store_url = or_default("ATTIRE_STORE_URL", "sqlite:data/attire.db");
    let webdriver_url = or_default("ATTIRE_WEBDRIVER_URL", "http://localhost:4444");
    let proxies_path = lookup("ATTIRE_PROXIES_PATH").ok().map(PathBuf::from);

    let country = or_default("ATTIRE_COUNTRY", "us");
    let lang = or_default("ATTIRE_LANG", "en");
    let currency = or_default("ATTIRE_CURRENCY", "USD");
    let retail_site_root = or_default("ATTIRE_RETAIL_SITE_ROOT", "https://www.zara.com");

    let user_agent = or_default(
        "ATTIRE_USER_AGENT",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    );

    let request_timeout_secs = parse_u64("ATTIRE_REQUEST_TIMEOUT_SECS", "30")?;
    let page_ready_timeout_secs = parse_u64("ATTIRE_PAGE_READY_TIMEOUT_SECS", "40")?;
    let request_delay_min_secs = parse_f64("ATTIRE_REQUEST_DELAY_MIN_SECS", "1.0")?;
    let request_delay_max_secs = parse_f64("ATTIRE_REQUEST_DELAY_MAX_SECS", "2.0")?;
    let rate_limit_pause_secs = parse_u64("ATTIRE_RATE_LIMIT_PAUSE_SECS", "60")?;
    let nav_max_attempts = parse_u32("ATTIRE_NAV_MAX_ATTEMPTS", "3")?;
    let nav_backoff_base_secs = parse_u64("ATTIRE_NAV_BACKOFF_BASE_SECS", "2")?;
    let api_max_attempts = parse_u32("ATTIRE_API_MAX_ATTEMPTS", "3")?;
    let api_retry_delay_secs = parse_u64("ATTIRE_API_RETRY_DELAY_SECS", "5")?;
    let items_per_category = parse_items_limit(&or_default("ATTIRE_ITEMS_PER_CATEGORY", "50"))?;
    let max_empty_pages = parse_u32("ATTIRE_MAX_EMPTY_PAGES", "5")?;
    let max_stagnant_scrolls = parse_u32("ATTIRE_MAX_STAGNANT_SCROLLS", "5")?;

    if request_delay_max_secs < request_delay_min_secs {
        return Err(ConfigError::InvalidEnvVar {
            var: "ATTIRE_REQUEST_DELAY_MAX_SECS".to_string(),
            reason: format!(
                "must be >= ATTIRE_REQUEST_DELAY_MIN_SECS ({request_delay_min_secs})"
            ),
        });
    }

    Ok(AppConfig {
        env,
        log_level,
        catalog_path,
        data_dir,
        store_url,
        webdriver_url,
        proxies_path,
        country,
        lang,
        currency,
        retail_site_root,
        user_agent,
        request_timeout_secs,
        page_ready_timeout_secs,
        request_delay_min_secs,
        request_delay_max_secs,
        rate_limit_pause_secs,
        nav_max_attempts,
        nav_backoff_base_secs,
        api_max_attempts,
        api_retry_delay_secs,
        items_per_category,
        max_empty_pages,
        max_stagnant_scrolls,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

/// Parse the per-category items cap. `none` or `unlimited` lifts the cap.
fn parse_items_limit(raw: &str) -> Result<Option<usize>, ConfigError> {
    match raw {
        "none" | "unlimited" => Ok(None),
        _ => raw
            .parse::<usize>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: "ATTIRE_ITEMS_PER_CATEGORY".to_string(),
                reason: e.to_string(),
            }),
    }
}
