//! Canonical, UI-ready reports

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::record::{RawRecord, RecordSource};
use crate::normalize::normalize;

/// Display fields derived from inconsistent optional record fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedDisplayFields {
    pub coffee_type: Option<String>,
    /// Quality on a 0-100 scale, one decimal place
    pub quality_score: Option<f64>,
    pub quality_mode: Option<String>,
}

/// A record of either kind, normalized for one screen render
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalReport {
    pub id: String,
    pub source: RecordSource,
    pub label: String,
    /// Calendar day of `created_at` in the viewer's offset
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub display: NormalizedDisplayFields,
    /// Original record, kept for detail views
    pub record: RawRecord,
}

impl CanonicalReport {
    /// Build a report from a raw record.
    ///
    /// Returns `None` when the record lacks its collection's timestamp.
    pub fn from_record(record: RawRecord, offset: FixedOffset) -> Option<Self> {
        let created_at = record.timestamp()?;
        Some(Self {
            id: record.id().to_string(),
            source: record.source(),
            label: record.label(),
            date: created_at.with_timezone(&offset).date_naive(),
            created_at,
            display: normalize(&record),
            record,
        })
    }

    /// Ordering for report lists: most recent first, then id, then source
    pub fn newest_first(a: &Self, b: &Self) -> Ordering {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
            .then_with(|| a.source.cmp(&b.source))
    }

    /// Stable key for list rendering and advice selection
    pub fn key(&self) -> String {
        format!("{}:{}", self.source, self.id)
    }

    /// Flat JSON object: the original document fields with the canonical
    /// fields laid over them
    pub fn to_detail_json(&self) -> Value {
        let mut doc: Map<String, Value> = self.record.to_document();
        doc.insert("id".into(), Value::String(self.id.clone()));
        doc.insert("source".into(), Value::String(self.source.to_string()));
        doc.insert("label".into(), Value::String(self.label.clone()));
        doc.insert(
            "date".into(),
            Value::String(self.date.format("%Y-%m-%d").to_string()),
        );
        doc.insert(
            "createdAt".into(),
            Value::String(self.created_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        if let Ok(display) = serde_json::to_value(&self.display) {
            doc.insert("display".into(), display);
        }
        Value::Object(doc)
    }
}
