//! PostgreSQL document store
//!
//! Documents are kept as JSONB. Range queries fetch the documents that carry
//! the requested field and filter them with [`in_range`], so timestamps are
//! read the same way as in every other store.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use shared::RecordSource;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{in_range, DocumentStore, StoredDocument};
use crate::config::StoreConfig;
use crate::error::InspectionResult;

#[derive(Clone)]
pub struct PgDocumentStore {
    db: PgPool,
}

impl PgDocumentStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a connection pool from configuration
    pub async fn connect(url: &str, config: &StoreConfig) -> InspectionResult<Self> {
        let db = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(url)
            .await?;

        tracing::info!("Database connection established");
        Ok(Self::new(db))
    }

    /// Apply pending migrations
    pub async fn migrate(&self) -> InspectionResult<()> {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .map_err(|e| crate::error::InspectionError::Store(e.to_string()))?;
        tracing::info!("Migrations completed");
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn query_range(
        &self,
        user_id: &str,
        source: RecordSource,
        field: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> InspectionResult<Vec<StoredDocument>> {
        // SQL narrows by key presence only; the range is checked per row
        let rows = sqlx::query(
            r#"
            SELECT id, data
            FROM inspection_documents
            WHERE user_id = $1
              AND collection = $2
              AND data ? $3
            "#,
        )
        .bind(user_id)
        .bind(source.collection())
        .bind(field)
        .fetch_all(&self.db)
        .await?;

        let mut documents = Vec::new();
        for row in rows {
            let id: Uuid = row.try_get("id")?;
            let Value::Object(data) = row.try_get::<Value, _>("data")? else {
                tracing::warn!(%source, %id, "Skipping non-object document");
                continue;
            };
            if in_range(&data, field, start, end) {
                documents.push(StoredDocument {
                    id: id.to_string(),
                    data,
                });
            }
        }
        Ok(documents)
    }

    async fn append(
        &self,
        user_id: &str,
        source: RecordSource,
        document: Map<String, Value>,
    ) -> InspectionResult<String> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO inspection_documents (id, user_id, collection, data)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(source.collection())
        .bind(Value::Object(document))
        .execute(&self.db)
        .await?;

        Ok(id.to_string())
    }
}
