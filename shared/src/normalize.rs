//! Display-field normalization for stored records
//!
//! Records written by different app versions name the same concept
//! differently. Candidates are tried in a fixed order; the first non-null
//! value wins. Nothing here fails: malformed values degrade to `None`.

use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

use crate::models::{NormalizedDisplayFields, RawRecord};

/// Candidate fields for the coffee type, in priority order
pub const COFFEE_TYPE_FIELDS: [&str; 5] = ["coffeeType", "beanType", "bean", "variety", "species"];

/// Candidate fields for the quality score, in priority order
pub const SCORE_FIELDS: [&str; 3] = ["qualityScore", "score", "confidence"];

/// Stored grade fields that override the derived mode
pub const MODE_FIELDS: [&str; 3] = ["qualityMode", "quality_label", "grade"];

pub const MODE_GOOD: &str = "Green (Good)";
pub const MODE_FAIR: &str = "Yellow (Fair)";
pub const MODE_LOW: &str = "Red (Low)";

/// Normalize a record's display fields. Never mutates the record.
pub fn normalize(record: &RawRecord) -> NormalizedDisplayFields {
    let coffee_type = first_present(record, &COFFEE_TYPE_FIELDS).and_then(display_text);
    let quality_score = resolve_score(record);
    let quality_mode = first_present(record, &MODE_FIELDS)
        .and_then(display_text)
        .or_else(|| quality_score.map(|s| derive_quality_mode(s).to_string()));

    NormalizedDisplayFields {
        coffee_type,
        quality_score,
        quality_mode,
    }
}

/// Scale a raw score onto 0-100 and round to one decimal place.
///
/// Values `<= 1` are fractions and are multiplied by 100 in `f64` first.
/// Rounding then applies to the exact binary value of that product, with
/// exact halves going away from zero. This matches `toFixed(1)` in the web
/// client: `0.6665` scales to `66.64999...` and reads `66.6`, while `12.25`
/// is an exact half and reads `12.3`.
pub fn scale_score(raw: f64) -> Option<f64> {
    if !raw.is_finite() {
        return None;
    }
    let value = if raw <= 1.0 { raw * 100.0 } else { raw };
    let scaled = match Decimal::from_f64_retain(value) {
        Some(exact) => {
            let rounded = exact.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
            rounded.mantissa() as f64 / 10f64.powi(rounded.scale() as i32)
        }
        // Outside Decimal's range
        None => (value * 10.0).round() / 10.0,
    };
    Some(scaled)
}

/// Three-tier grade for a 0-100 score
pub fn derive_quality_mode(score: f64) -> &'static str {
    if score >= 80.0 {
        MODE_GOOD
    } else if score >= 60.0 {
        MODE_FAIR
    } else {
        MODE_LOW
    }
}

/// Percentage text for a raw confidence, e.g. `0.875` -> `"87.5%"`
pub fn format_percent(raw: f64) -> Option<String> {
    scale_score(raw).map(|score| format!("{:.1}%", score))
}

/// Coerce a JSON value to a finite number.
///
/// Text is parsed after trimming; booleans, empty text and anything
/// unparseable yield `None`.
pub fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn first_present<'a>(record: &'a RawRecord, fields: &[&str]) -> Option<&'a Value> {
    fields.iter().find_map(|name| record.field(name))
}

fn display_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn resolve_score(record: &RawRecord) -> Option<f64> {
    // Once a generic candidate is present it decides the outcome, even if
    // it fails to parse.
    let raw = match first_present(record, &SCORE_FIELDS) {
        Some(value) => value_to_f64(value),
        None => model_score(record),
    }?;
    scale_score(raw)
}

/// Score reported by the model itself for each record kind
fn model_score(record: &RawRecord) -> Option<f64> {
    match record {
        RawRecord::Prediction(r) => r.bean_quality.as_ref()?.probability.as_ref()?.as_f64(),
        RawRecord::ImagePrediction(r) => r.bean_type_confidence.as_ref()?.as_f64(),
    }
}
