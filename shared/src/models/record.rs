//! Persisted prediction records
//!
//! Each user owns two independently-shaped collections:
//! - `predictions`: symptom-form disease predictions, keyed by `createdAt`
//! - `predictions_with_image`: image classifications, keyed by `timestamp`
//!
//! The two shapes are kept as separate variants of [`RawRecord`]; fields are
//! never merged across them.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Which collection a record came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    /// Form-based disease predictions
    Predictions,
    /// Image-based predictions
    PredictionsWithImage,
}

impl RecordSource {
    /// Collection name under the user's document tree
    pub fn collection(&self) -> &'static str {
        match self {
            RecordSource::Predictions => "predictions",
            RecordSource::PredictionsWithImage => "predictions_with_image",
        }
    }

    /// Name of the field this collection is range-queried on.
    ///
    /// The two collections deliberately use different names.
    pub fn timestamp_field(&self) -> &'static str {
        match self {
            RecordSource::Predictions => "createdAt",
            RecordSource::PredictionsWithImage => "timestamp",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "predictions" => Some(RecordSource::Predictions),
            "predictions_with_image" => Some(RecordSource::PredictionsWithImage),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecordSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.collection())
    }
}

/// A number that the prediction service sometimes sends as text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    /// Coerce to a finite number; unparseable text yields `None`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Numeric::Number(n) => Some(*n).filter(|n| n.is_finite()),
            Numeric::Text(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }
}

impl From<f64> for Numeric {
    fn from(value: f64) -> Self {
        Numeric::Number(value)
    }
}

/// One model output: a predicted class and its probability
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionField {
    #[serde(default, deserialize_with = "lenient_text")]
    pub prediction: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub probability: Option<Numeric>,
}

/// Read a stored timestamp.
///
/// Accepts RFC 3339 text, `{seconds, nanoseconds}` objects as exported by
/// document stores, and integer epoch milliseconds.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        Value::Object(map) => {
            let seconds = map
                .get("seconds")
                .or_else(|| map.get("_seconds"))?
                .as_i64()?;
            let nanos = map
                .get("nanoseconds")
                .or_else(|| map.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            Utc.timestamp_opt(seconds, u32::try_from(nanos).ok()?).single()
        }
        _ => None,
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_timestamp))
}

/// Text shown for a stored value; numbers are rendered, other types dropped
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// Display fields never fail a record: a wrong-typed value reads as absent.

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_text))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

/// Disease prediction saved from the symptom form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Store-assigned identifier (not part of the document body)
    #[serde(skip)]
    pub id: String,
    #[serde(
        rename = "createdAt",
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(
        rename = "defect_Name",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub defect_name: Option<PredictionField>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub cause_condition: Option<PredictionField>,
    #[serde(
        rename = "bean_Quality",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub bean_quality: Option<PredictionField>,
    /// Any other document fields, kept for detail views
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Image classification saved from the capture screen
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImagePredictionRecord {
    #[serde(skip)]
    pub id: String,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub predicted_class: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool", skip_serializing_if = "Option::is_none")]
    pub is_coffee_bean: Option<bool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub is_coffee_bean_confidence: Option<Numeric>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub bean_type_confidence: Option<Numeric>,
    #[serde(
        rename = "imageUri",
        alias = "imageUrl",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_uri: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A raw stored record of either kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawRecord {
    Prediction(PredictionRecord),
    ImagePrediction(ImagePredictionRecord),
}

impl RawRecord {
    /// Decode a stored document body for the given collection
    pub fn from_document(
        source: RecordSource,
        id: impl Into<String>,
        data: Map<String, Value>,
    ) -> Result<Self, serde_json::Error> {
        let id = id.into();
        let body = Value::Object(data);
        Ok(match source {
            RecordSource::Predictions => {
                let mut record: PredictionRecord = serde_json::from_value(body)?;
                record.id = id;
                RawRecord::Prediction(record)
            }
            RecordSource::PredictionsWithImage => {
                let mut record: ImagePredictionRecord = serde_json::from_value(body)?;
                record.id = id;
                RawRecord::ImagePrediction(record)
            }
        })
    }

    pub fn source(&self) -> RecordSource {
        match self {
            RawRecord::Prediction(_) => RecordSource::Predictions,
            RawRecord::ImagePrediction(_) => RecordSource::PredictionsWithImage,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            RawRecord::Prediction(r) => &r.id,
            RawRecord::ImagePrediction(r) => &r.id,
        }
    }

    /// The authoritative timestamp for this record's collection
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            RawRecord::Prediction(r) => r.created_at,
            RawRecord::ImagePrediction(r) => r.timestamp,
        }
    }

    /// Look up an untyped document field
    pub fn field(&self, name: &str) -> Option<&Value> {
        let extra = match self {
            RawRecord::Prediction(r) => &r.extra,
            RawRecord::ImagePrediction(r) => &r.extra,
        };
        extra.get(name).filter(|v| !v.is_null())
    }

    pub fn category(&self) -> Option<String> {
        match self {
            RawRecord::Prediction(r) => r.category.clone(),
            RawRecord::ImagePrediction(_) => self.field("category").and_then(value_text),
        }
    }

    pub fn predicted_class(&self) -> Option<String> {
        match self {
            RawRecord::Prediction(_) => self.field("predicted_class").and_then(value_text),
            RawRecord::ImagePrediction(r) => r.predicted_class.clone(),
        }
    }

    /// Display label: category, then predicted class, then "Unknown"
    pub fn label(&self) -> String {
        [self.category(), self.predicted_class()]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
            .unwrap_or_else(|| crate::UNKNOWN.to_string())
    }

    /// Document body as it would be stored
    pub fn to_document(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}
