//! Daily report aggregation
//!
//! Merges the two per-user collections for one calendar day into a single
//! newest-first list of canonical reports.

use std::sync::Arc;
use std::time::Duration;

use chrono::{FixedOffset, NaiveDate};
use serde::Serialize;
use shared::{CanonicalReport, DayWindow, RawRecord, RecordSource, UserContext};

use crate::error::{InspectionError, InspectionResult};
use crate::store::{DocumentStore, StoredDocument};

const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(15);

/// Report aggregation service
#[derive(Clone)]
pub struct ReportAggregator {
    store: Arc<dyn DocumentStore>,
    offset: FixedOffset,
    query_timeout: Duration,
}

/// One row of a CSV export
#[derive(Debug, Serialize)]
struct ReportCsvRow<'a> {
    id: &'a str,
    source: &'a str,
    label: &'a str,
    date: String,
    created_at: String,
    coffee_type: Option<&'a str>,
    quality_score: Option<f64>,
    quality_mode: Option<&'a str>,
}

impl ReportAggregator {
    /// `offset` decides which instants belong to which calendar day
    pub fn new(store: Arc<dyn DocumentStore>, offset: FixedOffset) -> Self {
        Self {
            store,
            offset,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    pub fn with_query_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    /// Fetch every report the user saved on `date`.
    ///
    /// Both collections are queried concurrently and the call fails if
    /// either query fails. Individual records without a usable timestamp
    /// are skipped.
    pub async fn fetch_reports_for_date(
        &self,
        user: Option<&UserContext>,
        date: NaiveDate,
    ) -> InspectionResult<Vec<CanonicalReport>> {
        let user = user
            .filter(|u| u.is_authenticated())
            .ok_or(InspectionError::Unauthenticated)?;

        let window = DayWindow::for_date(date, self.offset);
        tracing::debug!(
            uid = %user.uid,
            %date,
            start = %window.start,
            end = %window.end,
            "Fetching reports"
        );

        let (predictions, image_predictions) = tokio::join!(
            self.query(&user.uid, RecordSource::Predictions, &window),
            self.query(&user.uid, RecordSource::PredictionsWithImage, &window),
        );

        let mut reports = Vec::new();
        for (source, documents) in [
            (RecordSource::Predictions, predictions?),
            (RecordSource::PredictionsWithImage, image_predictions?),
        ] {
            reports.extend(
                documents
                    .into_iter()
                    .filter_map(|doc| self.to_report(source, doc, &window)),
            );
        }

        reports.sort_by(CanonicalReport::newest_first);
        tracing::debug!(count = reports.len(), %date, "Reports loaded");
        Ok(reports)
    }

    async fn query(
        &self,
        uid: &str,
        source: RecordSource,
        window: &DayWindow,
    ) -> InspectionResult<Vec<StoredDocument>> {
        let query = self.store.query_range(
            uid,
            source,
            source.timestamp_field(),
            window.start,
            window.end,
        );

        tokio::time::timeout(self.query_timeout, query)
            .await
            .map_err(|_| {
                InspectionError::Timeout(format!(
                    "{} query exceeded {}s",
                    source,
                    self.query_timeout.as_secs()
                ))
            })?
    }

    fn to_report(
        &self,
        source: RecordSource,
        doc: StoredDocument,
        window: &DayWindow,
    ) -> Option<CanonicalReport> {
        let id = doc.id.clone();
        let record = match RawRecord::from_document(source, doc.id, doc.data) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(%source, %id, "Skipping malformed record: {}", e);
                return None;
            }
        };

        let Some(report) = CanonicalReport::from_record(record, self.offset) else {
            tracing::warn!(%source, %id, "Skipping record without {}", source.timestamp_field());
            return None;
        };

        if !window.contains(report.created_at) {
            tracing::warn!(%source, %id, "Store returned a record outside the requested day");
            return None;
        }
        Some(report)
    }
}

/// Export reports as CSV
pub fn export_reports_csv(reports: &[CanonicalReport]) -> InspectionResult<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for report in reports {
        let row = ReportCsvRow {
            id: &report.id,
            source: report.source.collection(),
            label: &report.label,
            date: report.date.format("%Y-%m-%d").to_string(),
            created_at: report.created_at.to_rfc3339(),
            coffee_type: report.display.coffee_type.as_deref(),
            quality_score: report.display.quality_score,
            quality_mode: report.display.quality_mode.as_deref(),
        };
        wtr.serialize(row).map_err(|e| {
            InspectionError::Internal(anyhow::anyhow!("CSV serialization error: {}", e))
        })?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| InspectionError::Internal(anyhow::anyhow!("CSV writer error: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| InspectionError::Internal(anyhow::anyhow!("UTF-8 conversion error: {}", e)))
}
