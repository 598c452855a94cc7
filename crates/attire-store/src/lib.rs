use thiserror::Error;

pub mod checkpoint;
pub mod doc_store;
pub mod file_store;

pub use checkpoint::CheckpointFile;
pub use doc_store::DocumentStore;
pub use file_store::JsonLinesStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}
