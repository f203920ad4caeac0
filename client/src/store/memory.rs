//! In-memory document store for tests and offline use

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use shared::RecordSource;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{in_range, DocumentStore, StoredDocument};
use crate::error::InspectionResult;

type CollectionKey = (String, RecordSource);

#[derive(Clone, Default)]
pub struct InMemoryStore {
    collections: Arc<RwLock<HashMap<CollectionKey, Vec<StoredDocument>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document under a caller-chosen id
    pub async fn insert(
        &self,
        user_id: &str,
        source: RecordSource,
        id: impl Into<String>,
        data: Map<String, Value>,
    ) {
        let mut collections = self.collections.write().await;
        collections
            .entry((user_id.to_string(), source))
            .or_default()
            .push(StoredDocument {
                id: id.into(),
                data,
            });
    }

    /// Number of documents in one user's collection
    pub async fn count(&self, user_id: &str, source: RecordSource) -> usize {
        let collections = self.collections.read().await;
        collections
            .get(&(user_id.to_string(), source))
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn query_range(
        &self,
        user_id: &str,
        source: RecordSource,
        field: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> InspectionResult<Vec<StoredDocument>> {
        let collections = self.collections.read().await;
        let Some(documents) = collections.get(&(user_id.to_string(), source)) else {
            return Ok(Vec::new());
        };

        Ok(documents
            .iter()
            .filter(|doc| in_range(&doc.data, field, start, end))
            .cloned()
            .collect())
    }

    async fn append(
        &self,
        user_id: &str,
        source: RecordSource,
        document: Map<String, Value>,
    ) -> InspectionResult<String> {
        let id = Uuid::new_v4().to_string();
        self.insert(user_id, source, id.clone(), document).await;
        Ok(id)
    }
}
