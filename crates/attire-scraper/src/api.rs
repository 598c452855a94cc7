//! HTTP client for the retail chain's storefront JSON API.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::ScrapeError;
use crate::retry::{self, Backoff};
use crate::types::{CategoriesResponse, CategoryProductsResponse, RawProduct};

/// Client for the category-resolution and product-listing endpoints.
///
/// Handles rate limiting (429) and non-2xx responses as typed errors and
/// retries transient failures with a fixed delay through the shared retry
/// engine.
pub struct RetailApiClient {
    client: Client,
    /// Country/language-scoped site base, e.g. `https://shop.example/us/en`.
    base_url: String,
    referer: String,
    max_attempts: u32,
    retry_delay: Duration,
    items_limit: Option<usize>,
}

impl RetailApiClient {
    /// Creates a client with configured timeout, `User-Agent`, and retry
    /// policy. `items_limit` caps the products returned per category;
    /// `None` means no cap.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: impl Into<String>,
        timeout_secs: u64,
        user_agent: &str,
        max_attempts: u32,
        retry_delay_secs: u64,
        items_limit: Option<usize>,
    ) -> Result<Self, ScrapeError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            referer: origin_of(&base_url),
            base_url,
            max_attempts,
            retry_delay: Duration::from_secs(retry_delay_secs),
            items_limit,
        })
    }

    /// Resolve a category's numeric id from its SEO id.
    ///
    /// # Errors
    ///
    /// - [`ScrapeError::CategoryUnresolved`] — the API returned no
    ///   categories for the id (not retried; terminal for the category).
    /// - [`ScrapeError::RateLimited`] / [`ScrapeError::Http`] /
    ///   [`ScrapeError::UnexpectedStatus`] — after retries are exhausted.
    pub async fn resolve_category(&self, seo_id: &str) -> Result<u64, ScrapeError> {
        let url = format!("{}/categories", self.base_url);

        let response: CategoriesResponse = retry::run(
            self.max_attempts,
            Backoff::Fixed(self.retry_delay),
            retry::transient_http,
            || {
                let url = url.clone();
                async move {
                    self.get_json(&url, &[("categorySeoId", seo_id), ("ajax", "true")], "category lookup")
                        .await
                }
            },
        )
        .await?;

        response
            .categories
            .first()
            .map(|category| category.id)
            .ok_or_else(|| ScrapeError::CategoryUnresolved {
                slug: seo_id.to_string(),
            })
    }

    /// Fetch a category's products: flattened out of the nested listing
    /// groups, with marketing components dropped and the per-category cap
    /// applied.
    ///
    /// # Errors
    ///
    /// Propagates the same transient errors as [`Self::resolve_category`]
    /// once retries are exhausted.
    pub async fn fetch_category_products(
        &self,
        category_id: u64,
    ) -> Result<Vec<RawProduct>, ScrapeError> {
        let url = format!("{}/category/{category_id}/products", self.base_url);

        let listing: CategoryProductsResponse = retry::run(
            self.max_attempts,
            Backoff::Fixed(self.retry_delay),
            retry::transient_http,
            || {
                let url = url.clone();
                async move { self.get_json(&url, &[("ajax", "true")], "category products").await }
            },
        )
        .await?;

        let mut products = flatten_components(listing);
        let total = products.len();
        if let Some(limit) = self.items_limit {
            products.truncate(limit);
        }
        tracing::info!(
            category_id,
            total,
            kept = products.len(),
            "fetched category products"
        );
        Ok(products)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        context: &str,
    ) -> Result<T, ScrapeError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .header(reqwest::header::ACCEPT, "application/json, text/plain, */*")
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(reqwest::header::REFERER, &self.referer)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(ScrapeError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            return Err(ScrapeError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<T>(&body).map_err(|e| ScrapeError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }
}

/// Pull every commercial component out of the nested listing groups,
/// skipping marketing/spot placements. Components without a `type` are
/// plain products.
fn flatten_components(listing: CategoryProductsResponse) -> Vec<RawProduct> {
    let mut products = Vec::new();
    for group in listing.product_groups {
        let elements = if group.elements.is_empty() {
            group.products
        } else {
            group.elements
        };
        for element in elements {
            for component in element.commercial_components {
                if is_marketing(&component) {
                    continue;
                }
                products.push(component);
            }
        }
    }
    products
}

fn is_marketing(component: &RawProduct) -> bool {
    matches!(component.kind.as_deref(), Some("Marketing" | "Spot"))
}

/// The SEO id embedded in a configured category URL: either a `v1` query
/// parameter or the numeric tail of a `…-l<ID>.html` path segment.
///
/// # Errors
///
/// Returns [`ScrapeError::InvalidCategoryUrl`] when neither form is found.
pub fn parse_seo_id(category_url: &str) -> Result<String, ScrapeError> {
    if let Some(after) = category_url.split("v1=").nth(1) {
        let id = after.split('&').next().unwrap_or(after);
        if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(id.to_string());
        }
    }

    let path = category_url.split('?').next().unwrap_or(category_url);
    let stem = path
        .rsplit('/')
        .next()
        .unwrap_or(path)
        .trim_end_matches(".html");
    if let Some(pos) = stem.rfind("-l") {
        let id = &stem[pos + 2..];
        if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(id.to_string());
        }
    }

    Err(ScrapeError::InvalidCategoryUrl {
        url: category_url.to_string(),
        reason: "no '-l<ID>.html' segment or 'v1' parameter".to_string(),
    })
}

/// Scheme + host part of a URL, used as the Referer for API calls.
fn origin_of(url: &str) -> String {
    if let Some(scheme_end) = url.find("://") {
        let rest = &url[scheme_end + 3..];
        if let Some(path_start) = rest.find('/') {
            return format!("{}/", &url[..scheme_end + 3 + path_start]);
        }
    }
    format!("{}/", url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_seo_id_from_listing_path() {
        assert_eq!(
            parse_seo_id("https://shop.example/us/en/man-jackets-l640.html").unwrap(),
            "640"
        );
        assert_eq!(
            parse_seo_id("https://shop.example/us/en/woman-dresses-l1066.html?page=2").unwrap(),
            "1066"
        );
    }

    #[test]
    fn parse_seo_id_from_v1_parameter() {
        assert_eq!(
            parse_seo_id("https://shop.example/us/en/coat-p123.html?v1=555&page=2").unwrap(),
            "555"
        );
    }

    #[test]
    fn parse_seo_id_rejects_unmarked_url() {
        let result = parse_seo_id("https://shop.example/us/en/about.html");
        assert!(matches!(result, Err(ScrapeError::InvalidCategoryUrl { .. })));
    }

    #[test]
    fn origin_of_strips_path() {
        assert_eq!(origin_of("https://shop.example/us/en"), "https://shop.example/");
        assert_eq!(origin_of("https://shop.example"), "https://shop.example/");
    }

    #[test]
    fn marketing_components_detected() {
        let component = RawProduct {
            id: None,
            kind: Some("Marketing".to_string()),
            name: None,
            price: None,
            reference: None,
            description: None,
            seo: None,
            detail: None,
        };
        assert!(is_marketing(&component));

        let untyped = RawProduct {
            kind: None,
            ..component
        };
        assert!(!is_marketing(&untyped));
    }
}
