//! Per-user document storage
//!
//! Each user owns one collection per [`RecordSource`]. The core only needs
//! two operations: a closed range query on a named timestamp field, and
//! append.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use shared::{parse_timestamp, RecordSource};

use crate::config::StoreConfig;
use crate::error::InspectionResult;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgDocumentStore;

/// A stored document and its store-assigned id
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub data: Map<String, Value>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Documents whose `field` lies within `[start, end]`.
    ///
    /// Documents missing the field are not returned.
    async fn query_range(
        &self,
        user_id: &str,
        source: RecordSource,
        field: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> InspectionResult<Vec<StoredDocument>>;

    /// Append a document and return its new id
    async fn append(
        &self,
        user_id: &str,
        source: RecordSource,
        document: Map<String, Value>,
    ) -> InspectionResult<String>;
}

/// Whether `data[field]` reads as a timestamp within `[start, end]`.
///
/// Unreadable values never match, so one bad document cannot fail a query.
pub fn in_range(
    data: &Map<String, Value>,
    field: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> bool {
    data.get(field)
        .and_then(parse_timestamp)
        .is_some_and(|at| start <= at && at <= end)
}

/// Open the store named by the configuration
pub async fn connect(config: &StoreConfig) -> InspectionResult<std::sync::Arc<dyn DocumentStore>> {
    match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to document database...");
            let store = PgDocumentStore::connect(url, config).await?;
            store.migrate().await?;
            Ok(std::sync::Arc::new(store))
        }
        None => {
            tracing::info!("No database configured, using in-memory store");
            Ok(std::sync::Arc::new(InMemoryStore::new()))
        }
    }
}
