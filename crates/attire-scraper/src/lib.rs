pub mod api;
pub mod browser;
pub mod catalog;
pub mod delay;
pub mod error;
pub mod extract;
pub mod guard;
pub mod proxy;
pub mod retry;
pub mod types;
pub mod webdriver;

#[cfg(test)]
pub(crate) mod testing;

pub use api::RetailApiClient;
pub use browser::{BrowserPage, NavOutcome, PageFactory};
pub use delay::DelayPolicy;
pub use error::ScrapeError;
pub use guard::{GuardConfig, NavigationGuard};
pub use proxy::ProxyPool;
