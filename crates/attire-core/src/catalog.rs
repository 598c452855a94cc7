use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A single category resolved to a concrete listing URL.
///
/// Static per run; snapshotted into the progress checkpoint so a resumed
/// run walks exactly the same list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySpec {
    pub url: String,
    pub name: String,
    pub gender: String,
}

/// Category list for one gender section of a site: a URL template with a
/// `{category}` placeholder plus the slugs to substitute into it.
#[derive(Debug, Clone, Deserialize)]
pub struct GenderCatalog {
    pub url: String,
    pub categories: Vec<String>,
}

impl GenderCatalog {
    /// Expand the template into concrete category specs, preserving order.
    #[must_use]
    pub fn resolve(&self, gender: &str) -> Vec<CategorySpec> {
        self.categories
            .iter()
            .map(|slug| CategorySpec {
                url: self.url.replace("{category}", slug),
                name: display_name(slug),
                gender: gender.to_string(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteCatalog {
    pub male: GenderCatalog,
    pub female: GenderCatalog,
}

impl SiteCatalog {
    #[must_use]
    pub fn for_gender(&self, gender: &str) -> Option<&GenderCatalog> {
        match gender {
            "male" => Some(&self.male),
            "female" => Some(&self.female),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogFile {
    /// Settle time after a scroll step, in seconds.
    pub page_loading_time: u64,
    pub marketplace: SiteCatalog,
    pub retail: SiteCatalog,
    #[serde(default = "default_child_markers")]
    pub child_category_markers: Vec<String>,
}

fn default_child_markers() -> Vec<String> {
    vec!["kids".to_string(), "anniversary".to_string()]
}

/// Load and validate the category catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<CatalogFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let catalog: CatalogFile = serde_yaml::from_str(&content).map_err(ConfigError::CatalogParse)?;

    validate_catalog(&catalog)?;

    Ok(catalog)
}

fn validate_catalog(catalog: &CatalogFile) -> Result<(), ConfigError> {
    for (site, sections) in [("marketplace", &catalog.marketplace), ("retail", &catalog.retail)] {
        for (gender, section) in [("male", &sections.male), ("female", &sections.female)] {
            if !section.url.contains("{category}") {
                return Err(ConfigError::Validation(format!(
                    "{site}/{gender}: url template is missing the {{category}} placeholder"
                )));
            }

            if section.categories.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{site}/{gender}: category list must be non-empty"
                )));
            }

            let mut seen = HashSet::new();
            for slug in &section.categories {
                if slug.trim().is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "{site}/{gender}: category slug must be non-empty"
                    )));
                }
                if !seen.insert(slug.as_str()) {
                    return Err(ConfigError::Validation(format!(
                        "{site}/{gender}: duplicate category slug '{slug}'"
                    )));
                }
            }
        }
    }

    Ok(())
}

/// Drop categories whose name contains any of the given markers
/// (case-insensitive). Used to keep a run to adult assortments.
#[must_use]
pub fn filter_adult(categories: Vec<CategorySpec>, markers: &[String]) -> Vec<CategorySpec> {
    categories
        .into_iter()
        .filter(|category| {
            let name = category.name.to_lowercase();
            !markers.iter().any(|marker| name.contains(&marker.to_lowercase()))
        })
        .collect()
}

/// Human-facing category name: the slug with a trailing numeric listing-id
/// segment (`-l<digits>`) stripped when present.
fn display_name(slug: &str) -> String {
    if let Some(pos) = slug.rfind("-l") {
        let tail = &slug[pos + 2..];
        if !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) {
            return slug[..pos].to_string();
        }
    }
    slug.to_string()
}
