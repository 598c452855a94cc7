//! SQLite-backed document store with `url` uniqueness per collection.

use std::str::FromStr;

use attire_core::ProductRecord;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use crate::StoreError;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS products (
        collection  TEXT NOT NULL,
        url         TEXT NOT NULL,
        record      TEXT NOT NULL,
        inserted_at TEXT NOT NULL DEFAULT (datetime('now'))
    )";

const URL_INDEX: &str = "
    CREATE UNIQUE INDEX IF NOT EXISTS products_collection_url
    ON products (collection, url)";

pub struct DocumentStore {
    pool: SqlitePool,
}

impl DocumentStore {
    /// Open (creating if missing) the store at the given SQLite URL and
    /// ensure the schema and the unique `(collection, url)` index exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on connection or DDL failure.
    pub async fn open(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        // single writer; the collection loop is strictly sequential
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::query(SCHEMA).execute(&pool).await?;
        sqlx::query(URL_INDEX).execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Insert a record unless its `url` is already present in the
    /// collection. Returns `true` when inserted, `false` on a duplicate.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Encode`] if the record cannot be serialized
    /// and [`StoreError::Database`] for any non-duplicate database error.
    pub async fn insert_if_absent(
        &self,
        collection: &str,
        record: &ProductRecord,
    ) -> Result<bool, StoreError> {
        let payload = serde_json::to_string(record)?;

        let result = sqlx::query("INSERT INTO products (collection, url, record) VALUES (?1, ?2, ?3)")
            .bind(collection)
            .bind(&record.url)
            .bind(payload)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                tracing::info!(collection, url = %record.url, "duplicate url; record already stored");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Number of records stored in a collection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on query failure.
    pub async fn count(&self, collection: &str) -> Result<i64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM products WHERE collection = ?1")
            .bind(collection)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }
}
