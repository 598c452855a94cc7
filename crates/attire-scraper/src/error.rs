use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to deserialize {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("browser session error: {0}")]
    Session(String),

    #[error("could not resolve category id for '{slug}'")]
    CategoryUnresolved { slug: String },

    #[error("invalid category URL '{url}': {reason}")]
    InvalidCategoryUrl { url: String, reason: String },
}
