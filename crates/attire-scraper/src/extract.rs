//! Turning a loaded product page or a raw API component into a
//! [`ProductRecord`].

use std::time::Duration;

use attire_core::{Availability, Price, ProductRecord};

use crate::browser::BrowserPage;
use crate::guard::NavigationGuard;
use crate::types::RawProduct;

/// Width substituted into `{width}` image-template placeholders.
const IMAGE_WIDTH: &str = "1920";

/// How long to wait for a product page's root container.
const ROOT_WAIT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ProductSelectors {
    /// Root content container; its absence means the page is not a
    /// product page at all and no record is emitted.
    pub root: String,
    pub images: String,
    /// Tried in order; the first non-empty text wins.
    pub price: Vec<String>,
    pub description: String,
}

impl Default for ProductSelectors {
    fn default() -> Self {
        Self {
            root: "#content".to_string(),
            images: "[data-component=\"Img\"]".to_string(),
            price: vec![
                "[data-component=\"PriceLarge\"]".to_string(),
                "[data-component=\"PriceFinal\"]".to_string(),
                "[data-component=\"PriceOriginal\"]".to_string(),
                "[data-component=\"PriceWithSchema\"]".to_string(),
                "[itemprop=\"price\"]".to_string(),
            ],
            description: "[data-component=\"Body\"][data-testid=\"product-short-description\"]"
                .to_string(),
        }
    }
}

/// Extract one record from an already-navigated product page.
///
/// Field extraction is independent: a missing image set, price, or
/// description leaves that field absent but still emits the record. Only
/// a missing root container skips the product entirely.
pub async fn extract_rendered_product(
    page: &mut dyn BrowserPage,
    url: &str,
    selectors: &ProductSelectors,
    category: &str,
    gender: &str,
) -> Option<ProductRecord> {
    match page.wait_for_any(&selectors.root, ROOT_WAIT).await {
        Ok(true) => {}
        Ok(false) | Err(_) => {
            tracing::warn!(url, "product page structure missing; skipping");
            return None;
        }
    }

    let images = page
        .attr_all(&selectors.images, "src")
        .await
        .unwrap_or_default();

    let mut price = None;
    for selector in &selectors.price {
        if let Ok(Some(text)) = page.text_first(selector).await {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                price = Some(Price::Text(trimmed.to_string()));
                break;
            }
        }
    }
    if price.is_none() {
        tracing::debug!(url, "no price found on product page");
    }

    let description = match page.text_first(&selectors.description).await {
        Ok(found) => found,
        Err(_) => None,
    };

    Some(ProductRecord {
        url: url.to_string(),
        name: None,
        images,
        price,
        description,
        color: None,
        color_reference: None,
        article: None,
        currency: None,
        availability: Availability::Unknown,
        category: category.to_string(),
        gender: gender.to_string(),
    })
}

/// Visit each product link through the guard and extract what survives.
/// Failed navigations and skipped pages cost only their own record.
pub async fn extract_rendered_products(
    guard: &mut NavigationGuard,
    links: &[String],
    selectors: &ProductSelectors,
    category: &str,
    gender: &str,
) -> Vec<ProductRecord> {
    let mut records = Vec::new();
    for link in links {
        if !guard.goto(link, true).await {
            tracing::warn!(url = %link, "skipping product; navigation failed");
            continue;
        }
        if let Some(record) =
            extract_rendered_product(guard.page_mut(), link, selectors, category, gender).await
        {
            records.push(record);
        }
    }
    records
}

/// Map one raw API component onto a record.
///
/// The canonical URL needs the SEO block; without it the product cannot
/// be addressed (and `url` is the dedup key), so the component yields no
/// record. The first color variant supplies color, price, availability,
/// and images.
#[must_use]
pub fn extract_api_product(
    raw: &RawProduct,
    base_url: &str,
    currency: &str,
    category: &str,
    gender: &str,
) -> Option<ProductRecord> {
    let seo = raw.seo.as_ref()?;
    let keyword = seo.keyword.as_deref().filter(|k| !k.is_empty())?;
    let seo_product_id = seo.seo_product_id.as_deref().filter(|id| !id.is_empty())?;
    let link_id = seo.discern_product_id.or(raw.id)?;
    let url = format!("{base_url}/{keyword}-p{seo_product_id}.html?v1={link_id}");

    let first_color = raw.detail.as_ref().and_then(|d| d.colors.first());

    let price = first_color
        .and_then(|c| c.price)
        .or(raw.price)
        .map(|minor| Price::Amount(minor as f64 / 100.0));

    let availability = Availability::from_api(first_color.and_then(|c| c.availability.as_deref()));

    let images = first_color
        .map(|c| {
            c.xmedia
                .iter()
                .filter_map(|media| media.url.as_deref())
                .map(|template| template.replace("{width}", IMAGE_WIDTH))
                .collect()
        })
        .unwrap_or_default();

    let article = raw
        .detail
        .as_ref()
        .and_then(|d| d.display_reference.clone())
        .or_else(|| raw.reference.clone());

    Some(ProductRecord {
        url,
        name: raw.name.clone(),
        images,
        price,
        description: raw.description.clone(),
        color: first_color.and_then(|c| c.name.clone()),
        color_reference: first_color.and_then(|c| c.reference.clone()),
        article,
        currency: Some(currency.to_string()),
        availability,
        category: category.to_string(),
        gender: gender.to_string(),
    })
}
