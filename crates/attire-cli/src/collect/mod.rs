//! Collection orchestration shared by both site drivers.
//!
//! Per-category failures are logged and skipped rather than propagated so
//! a single bad category does not abort the full run; a progress
//! checkpoint is written after every category, success or failure.

pub(crate) mod marketplace;
pub(crate) mod retail;

use std::path::PathBuf;

use async_trait::async_trait;
use attire_core::{AppConfig, Availability, CategorySpec, ProductRecord, ProgressCheckpoint};
use attire_scraper::DelayPolicy;
use attire_store::file_store::category_path;
use attire_store::{CheckpointFile, DocumentStore, JsonLinesStore};

/// Produces one category's records; the site drivers implement this over
/// the browser pipeline and the storefront API respectively.
#[async_trait]
pub(crate) trait CategorySource {
    async fn fetch(&mut self, category: &CategorySpec) -> anyhow::Result<Vec<ProductRecord>>;
}

/// Every place a run's records land.
pub(crate) struct Sinks {
    documents: DocumentStore,
    file: JsonLinesStore,
    pub(crate) checkpoint: CheckpointFile,
    collection: String,
    site: String,
    /// When set, each category's records also land in their own file here.
    category_dir: Option<PathBuf>,
}

impl Sinks {
    pub(crate) async fn open(
        config: &AppConfig,
        site: &str,
        gender: &str,
        per_category_files: bool,
    ) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;

        Ok(Self {
            documents: DocumentStore::open(&config.store_url).await?,
            file: JsonLinesStore::new(
                config
                    .data_dir
                    .join(format!("{site}_{gender}_products.jsonl")),
            ),
            checkpoint: CheckpointFile::new(
                config
                    .data_dir
                    .join(format!("{site}_{gender}_progress.json")),
            ),
            collection: format!("{site}_{gender}"),
            site: site.to_string(),
            category_dir: per_category_files.then(|| config.data_dir.clone()),
        })
    }
}

/// Walk the category list from `start_index`, fetching, persisting, and
/// checkpointing per category. Returns the full accumulated record set
/// (prior products included when resuming).
pub(crate) async fn collect_categories(
    source: &mut dyn CategorySource,
    categories: &[CategorySpec],
    start_index: usize,
    mut accumulated: Vec<ProductRecord>,
    sinks: &Sinks,
    pause: &DelayPolicy,
) -> anyhow::Result<Vec<ProductRecord>> {
    let mut succeeded = 0usize;
    let mut failed = 0usize;

    for (index, category) in categories.iter().enumerate().skip(start_index) {
        tracing::info!(
            position = index + 1,
            total = categories.len(),
            category = %category.name,
            "processing category"
        );

        match source.fetch(category).await {
            Ok(records) if records.is_empty() => {
                tracing::warn!(category = %category.name, "no products collected");
                failed += 1;
            }
            Ok(records) => {
                persist(sinks, category, &records).await;
                succeeded += 1;
                accumulated.extend(records);
            }
            Err(err) => {
                tracing::error!(
                    category = %category.name,
                    error = %format!("{err:#}"),
                    "category failed; continuing"
                );
                failed += 1;
            }
        }

        let snapshot =
            ProgressCheckpoint::new(index + 1, categories.to_vec(), accumulated.clone());
        if let Err(err) = sinks.checkpoint.save(&snapshot) {
            tracing::warn!(error = %err, "failed to write progress checkpoint");
        }

        if index + 1 < categories.len() {
            pause.pause().await;
        }
    }

    summarize(&accumulated, succeeded, failed);
    Ok(accumulated)
}

/// Persistence failures are reported but never abort the category.
async fn persist(sinks: &Sinks, category: &CategorySpec, records: &[ProductRecord]) {
    if let Err(err) = sinks.file.append(records) {
        tracing::error!(error = %err, "failed to append records to product file");
    }

    if let Some(dir) = &sinks.category_dir {
        let per_category = JsonLinesStore::new(category_path(dir, &sinks.site, &category.name));
        if let Err(err) = per_category.append(records) {
            tracing::warn!(error = %err, "failed to write per-category file");
        }
    }

    let mut inserted = 0usize;
    let mut duplicates = 0usize;
    for record in records {
        match sinks.documents.insert_if_absent(&sinks.collection, record).await {
            Ok(true) => inserted += 1,
            Ok(false) => duplicates += 1,
            Err(err) => {
                tracing::warn!(url = %record.url, error = %err, "document insert failed");
            }
        }
    }

    tracing::info!(
        category = %category.name,
        inserted,
        duplicates,
        "persisted category records"
    );
}

fn summarize(records: &[ProductRecord], succeeded: usize, failed: usize) {
    let mut available = 0usize;
    let mut coming_soon = 0usize;
    let mut out_of_stock = 0usize;
    let mut unknown = 0usize;
    for record in records {
        match record.availability {
            Availability::Available => available += 1,
            Availability::ComingSoon => coming_soon += 1,
            Availability::OutOfStock => out_of_stock += 1,
            Availability::Unknown => unknown += 1,
        }
    }

    tracing::info!(
        succeeded,
        failed,
        total_products = records.len(),
        available,
        coming_soon,
        out_of_stock,
        unknown,
        "run finished"
    );
}
