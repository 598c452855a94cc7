//! Marketplace driver: WebDriver sessions behind the navigation guard,
//! link harvesting per category, then per-product page extraction.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use attire_core::{AppConfig, CatalogFile, CategorySpec, ProductRecord};
use attire_scraper::catalog::{collect_paged_links, collect_scroll_links, PaginationRules};
use attire_scraper::extract::{extract_rendered_products, ProductSelectors};
use attire_scraper::webdriver::WebDriverFactory;
use attire_scraper::{DelayPolicy, GuardConfig, NavigationGuard, PageFactory, ProxyPool};

use super::{collect_categories, CategorySource, Sinks};

pub(crate) async fn run(
    config: &AppConfig,
    catalog: &CatalogFile,
    gender: &str,
    infinite_scroll: bool,
) -> anyhow::Result<()> {
    let section = catalog
        .marketplace
        .for_gender(gender)
        .ok_or_else(|| anyhow::anyhow!("no marketplace catalog for gender '{gender}'"))?;
    let categories = section.resolve(gender);
    if categories.is_empty() {
        anyhow::bail!("no categories to process");
    }

    let sinks = Sinks::open(config, "marketplace", gender, false).await?;

    let factory: Arc<dyn PageFactory> = Arc::new(WebDriverFactory::new(
        &config.webdriver_url,
        &config.user_agent,
    ));
    let guard = NavigationGuard::start(
        factory,
        load_proxies(config),
        DelayPolicy::new(config.request_delay_min_secs, config.request_delay_max_secs),
        guard_config(config),
    )
    .await?;

    let mut source = MarketplaceSource {
        guard,
        rules: PaginationRules {
            max_empty_pages: config.max_empty_pages,
            max_stagnant_scrolls: config.max_stagnant_scrolls,
            items_limit: config.items_per_category,
            scroll_pause: Duration::from_secs(catalog.page_loading_time),
            ..PaginationRules::default()
        },
        selectors: ProductSelectors::default(),
        infinite_scroll,
    };

    let pause = DelayPolicy::new(2.0, 4.0);
    collect_categories(&mut source, &categories, 0, Vec::new(), &sinks, &pause).await?;
    Ok(())
}

struct MarketplaceSource {
    guard: NavigationGuard,
    rules: PaginationRules,
    selectors: ProductSelectors,
    infinite_scroll: bool,
}

#[async_trait]
impl CategorySource for MarketplaceSource {
    async fn fetch(&mut self, category: &CategorySpec) -> anyhow::Result<Vec<ProductRecord>> {
        let links = if self.infinite_scroll {
            collect_scroll_links(&mut self.guard, &category.url, &self.rules).await
        } else {
            collect_paged_links(&mut self.guard, &category.url, &self.rules).await
        };
        if links.is_empty() {
            return Ok(Vec::new());
        }

        Ok(extract_rendered_products(
            &mut self.guard,
            &links,
            &self.selectors,
            &category.name,
            &category.gender,
        )
        .await)
    }
}

fn guard_config(config: &AppConfig) -> GuardConfig {
    GuardConfig {
        max_attempts: config.nav_max_attempts,
        backoff_base: Duration::from_secs(config.nav_backoff_base_secs),
        ready_timeout: Duration::from_secs(config.page_ready_timeout_secs),
        rate_limit_pause: Duration::from_secs(config.rate_limit_pause_secs),
        ..GuardConfig::default()
    }
}

fn load_proxies(config: &AppConfig) -> ProxyPool {
    let Some(path) = &config.proxies_path else {
        return ProxyPool::default();
    };
    match ProxyPool::from_file(path) {
        Ok(pool) => pool,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "could not load proxies; proceeding without");
            ProxyPool::default()
        }
    }
}
