//! Retail driver: category resolution and product listing through the
//! storefront API, with resume/test/adults-only modes.

use async_trait::async_trait;
use attire_core::catalog::filter_adult;
use attire_core::{AppConfig, CatalogFile, CategorySpec, ProductRecord};
use attire_scraper::api::parse_seo_id;
use attire_scraper::extract::extract_api_product;
use attire_scraper::types::RawProduct;
use attire_scraper::{DelayPolicy, RetailApiClient};

use super::{collect_categories, CategorySource, Sinks};

const TEST_CATEGORY_COUNT: usize = 3;

#[derive(Debug, Clone, Copy)]
pub(crate) struct RunMode {
    pub resume: bool,
    pub test: bool,
    pub adults_only: bool,
}

pub(crate) async fn run(
    config: &AppConfig,
    catalog: &CatalogFile,
    gender: &str,
    mode: RunMode,
) -> anyhow::Result<()> {
    let section = catalog
        .retail
        .for_gender(gender)
        .ok_or_else(|| anyhow::anyhow!("no retail catalog for gender '{gender}'"))?;

    let mut categories = section.resolve(gender);
    if mode.adults_only {
        let before = categories.len();
        categories = filter_adult(categories, &catalog.child_category_markers);
        tracing::info!(kept = categories.len(), dropped = before - categories.len(), "adults-only filter applied");
    }
    if mode.test {
        categories.truncate(TEST_CATEGORY_COUNT);
        tracing::info!(count = categories.len(), "test mode: truncated category list");
    }
    if categories.is_empty() {
        anyhow::bail!("no categories to process");
    }

    let sinks = Sinks::open(config, "retail", gender, true).await?;

    let (start_index, categories, accumulated) = if mode.resume {
        match sinks.checkpoint.load()? {
            Some(checkpoint) if !checkpoint.categories.is_empty() => {
                tracing::info!(
                    index = checkpoint.current_index,
                    products = checkpoint.products.len(),
                    "resuming from checkpoint"
                );
                (
                    checkpoint.current_index,
                    checkpoint.categories,
                    checkpoint.products,
                )
            }
            _ => {
                tracing::info!("no usable checkpoint; starting fresh");
                (0, categories, Vec::new())
            }
        }
    } else {
        (0, categories, Vec::new())
    };

    if start_index >= categories.len() {
        tracing::info!("checkpoint already covers every category");
        return Ok(());
    }

    let base_url = config.api_base_url();
    let client = RetailApiClient::new(
        base_url.clone(),
        config.request_timeout_secs,
        &config.user_agent,
        config.api_max_attempts,
        config.api_retry_delay_secs,
        config.items_per_category,
    )?;

    let mut source = RetailSource {
        client,
        base_url,
        currency: config.currency.clone(),
        delay: DelayPolicy::new(config.request_delay_min_secs, config.request_delay_max_secs),
    };

    let pause = DelayPolicy::new(2.0, 4.0);
    collect_categories(
        &mut source,
        &categories,
        start_index,
        accumulated,
        &sinks,
        &pause,
    )
    .await?;
    Ok(())
}

struct RetailSource {
    client: RetailApiClient,
    base_url: String,
    currency: String,
    delay: DelayPolicy,
}

#[async_trait]
impl CategorySource for RetailSource {
    async fn fetch(&mut self, category: &CategorySpec) -> anyhow::Result<Vec<ProductRecord>> {
        let seo_id = parse_seo_id(&category.url)?;
        let category_id = self.client.resolve_category(&seo_id).await?;
        let raws = self.client.fetch_category_products(category_id).await?;
        Ok(extract_with_pacing(&raws, &self.delay, &self.base_url, &self.currency, category).await)
    }
}

/// Map raw components to records, pausing between items but never before
/// the first one.
async fn extract_with_pacing(
    raws: &[RawProduct],
    delay: &DelayPolicy,
    base_url: &str,
    currency: &str,
    category: &CategorySpec,
) -> Vec<ProductRecord> {
    let mut records = Vec::new();
    for (index, raw) in raws.iter().enumerate() {
        if index > 0 {
            delay.pause().await;
        }
        if let Some(record) =
            extract_api_product(raw, base_url, currency, &category.name, &category.gender)
        {
            records.push(record);
        } else {
            tracing::warn!(category = %category.name, "skipping component; no canonical url");
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use attire_scraper::types::SeoInfo;

    use super::*;

    fn raw(id: i64) -> RawProduct {
        RawProduct {
            id: Some(id),
            kind: Some("Product".to_string()),
            name: Some(format!("Product {id}")),
            price: Some(9990),
            reference: None,
            description: None,
            seo: Some(SeoInfo {
                keyword: Some(format!("product-{id}")),
                seo_product_id: Some(id.to_string()),
                discern_product_id: Some(id),
            }),
            detail: None,
        }
    }

    fn category() -> CategorySpec {
        CategorySpec {
            url: "https://shop.example/us/en/man-jackets-l640.html".to_string(),
            name: "man-jackets".to_string(),
            gender: "male".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn delay_applied_between_products_not_before_first() {
        let raws = vec![raw(1), raw(2), raw(3)];
        let started = tokio::time::Instant::now();

        let records = extract_with_pacing(
            &raws,
            &DelayPolicy::new(1.0, 1.0),
            "https://shop.example/us/en",
            "USD",
            &category(),
        )
        .await;

        assert_eq!(records.len(), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn single_product_is_not_delayed() {
        let started = tokio::time::Instant::now();

        let records = extract_with_pacing(
            &[raw(1)],
            &DelayPolicy::new(1.0, 1.0),
            "https://shop.example/us/en",
            "USD",
            &category(),
        )
        .await;

        assert_eq!(records.len(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
