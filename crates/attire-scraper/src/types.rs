//! Response shapes for the retail storefront API.
//!
//! Only the fields the extractor consumes are modeled; everything is
//! `#[serde(default)]`-tolerant because the live API freely omits keys
//! per component type.

use serde::Deserialize;

/// `GET {base}/categories?categorySeoId={id}&ajax=true`
#[derive(Debug, Clone, Deserialize)]
pub struct CategoriesResponse {
    #[serde(default)]
    pub categories: Vec<CategorySummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategorySummary {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
}

/// `GET {base}/category/{id}/products?ajax=true`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryProductsResponse {
    #[serde(default)]
    pub product_groups: Vec<ProductGroup>,
}

/// One listing block. Depending on the layout the components hang off
/// `elements` or directly off `products`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductGroup {
    #[serde(default)]
    pub elements: Vec<GroupElement>,
    #[serde(default)]
    pub products: Vec<GroupElement>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupElement {
    #[serde(default)]
    pub commercial_components: Vec<RawProduct>,
}

/// One commercial component as delivered by the listing endpoint.
/// Marketing banners share this shape with real products and are told
/// apart by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProduct {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Minor currency units.
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub seo: Option<SeoInfo>,
    #[serde(default)]
    pub detail: Option<ProductDetail>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoInfo {
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub seo_product_id: Option<String>,
    #[serde(default)]
    pub discern_product_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(default)]
    pub display_reference: Option<String>,
    #[serde(default)]
    pub colors: Vec<ColorVariant>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorVariant {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    /// Minor currency units; overrides the component-level price.
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub availability: Option<String>,
    #[serde(default)]
    pub xmedia: Vec<MediaAsset>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAsset {
    /// URL template, typically carrying a `{width}` placeholder.
    #[serde(default)]
    pub url: Option<String>,
}
