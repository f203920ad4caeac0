//! Report list state for the date picker
//!
//! Every date selection starts a new generation. A fetch that finishes
//! after a newer one started is discarded, so a slow response for an old
//! date never replaces the list for the date currently selected.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use serde::Serialize;
use shared::{CanonicalReport, UserContext};
use tokio::sync::RwLock;

use crate::error::ErrorNotice;
use crate::services::reports::ReportAggregator;

/// What the report screen renders
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportListState {
    pub selected_date: Option<NaiveDate>,
    pub reports: Vec<CanonicalReport>,
    pub loading: bool,
    pub error: Option<ErrorNotice>,
}

pub struct ReportFeed {
    aggregator: ReportAggregator,
    generation: AtomicU64,
    state: RwLock<ReportListState>,
}

impl ReportFeed {
    pub fn new(aggregator: ReportAggregator) -> Self {
        Self {
            aggregator,
            generation: AtomicU64::new(0),
            state: RwLock::new(ReportListState::default()),
        }
    }

    /// Current state snapshot
    pub async fn state(&self) -> ReportListState {
        self.state.read().await.clone()
    }

    /// Select a date and load its reports.
    ///
    /// Returns the state after this call; if a newer selection started in
    /// the meantime, that selection's state is returned unchanged.
    pub async fn select_date(&self, user: Option<&UserContext>, date: NaiveDate) -> ReportListState {
        // Generation order and reset order must agree, so both happen
        // under the same write lock.
        let generation = {
            let mut state = self.state.write().await;
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = ReportListState {
                selected_date: Some(date),
                reports: Vec::new(),
                loading: true,
                error: None,
            };
            generation
        };

        let outcome = self.aggregator.fetch_reports_for_date(user, date).await;

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(%date, generation, "Discarding stale report results");
            return state.clone();
        }

        state.loading = false;
        match outcome {
            Ok(reports) => state.reports = reports,
            Err(err) => {
                state.reports.clear();
                state.error = Some(err.report());
            }
        }
        state.clone()
    }
}
