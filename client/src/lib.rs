//! Bean Inspection Client
//!
//! Submits bean images and symptom questionnaires to the remote prediction
//! service, saves accepted results per user, and assembles the daily report
//! list shown in the app.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod external;
pub mod services;
pub mod store;
pub mod telemetry;

pub use config::ClientConfig;
pub use error::{ErrorNotice, InspectionError, InspectionResult};
pub use external::PredictionClient;
pub use services::{InspectionService, ReportAggregator, ReportFeed, ReportListState};
pub use store::{DocumentStore, InMemoryStore, PgDocumentStore};

/// Services shared across screens
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ClientConfig>,
    pub inspections: InspectionService,
    pub reports: Arc<ReportFeed>,
}

impl AppState {
    /// Wire up services from configuration
    pub async fn from_config(config: ClientConfig) -> InspectionResult<Self> {
        tracing::info!("Starting bean inspection client");
        tracing::info!("Environment: {}", config.environment);

        let store = store::connect(&config.store).await?;
        let client = PredictionClient::from_config(&config.prediction)?;
        let aggregator = ReportAggregator::new(store.clone(), config.reports.offset())
            .with_query_timeout(config.store.query_timeout());

        Ok(Self {
            inspections: InspectionService::new(client, store),
            reports: Arc::new(ReportFeed::new(aggregator)),
            config: Arc::new(config),
        })
    }
}
