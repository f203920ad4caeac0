//! WebAssembly module for bean inspection
//!
//! Exposes the pure parts of the inspection client to the front end:
//! - Record normalization for the report list
//! - Advice resolution for the report detail view
//! - Quality score scaling and grading
//! - Symptom form validation
//!
//! Every function takes and returns JSON strings.

use chrono::FixedOffset;
use serde_json::{json, Map, Value};
use shared::{advice, normalize, CanonicalReport, RawRecord, RecordSource, SymptomReportInput};
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;

/// Normalize a stored document into a report, with the day taken in UTC
#[wasm_bindgen]
pub fn normalize_record(source: &str, id: &str, document_json: &str) -> Result<String, JsValue> {
    normalize_record_with_offset(source, id, document_json, 0)
}

/// Normalize a stored document into a report.
///
/// `utc_offset_minutes` places the record on the viewer's calendar day.
#[wasm_bindgen]
pub fn normalize_record_with_offset(
    source: &str,
    id: &str,
    document_json: &str,
    utc_offset_minutes: i32,
) -> Result<String, JsValue> {
    let offset = offset_from_minutes(utc_offset_minutes).map_err(js_error)?;
    let report = report_from_json(source, id, document_json, offset).map_err(js_error)?;
    to_json(&report).map_err(js_error)
}

/// Resolve the detail branch and advice text for a stored document
#[wasm_bindgen]
pub fn resolve_advice(source: &str, id: &str, document_json: &str) -> Result<String, JsValue> {
    let offset = offset_from_minutes(0).map_err(js_error)?;
    let report = report_from_json(source, id, document_json, offset).map_err(js_error)?;
    to_json(&advice::resolve(&report)).map_err(js_error)
}

/// Grade label for a 0-100 quality score
#[wasm_bindgen]
pub fn quality_mode_for_score(score: f64) -> String {
    normalize::derive_quality_mode(score).to_string()
}

/// Scale a raw score onto 0-100 with one decimal; `NaN` when not finite
#[wasm_bindgen]
pub fn scale_quality_score(raw: f64) -> f64 {
    normalize::scale_score(raw).unwrap_or(f64::NAN)
}

/// Validate the symptom form.
///
/// Returns the request body JSON, or throws `{"field", "message"}` for the
/// first problem in form order.
#[wasm_bindgen]
pub fn validate_symptom_form(form_json: &str) -> Result<String, JsValue> {
    check_symptom_form(form_json).map_err(|e| JsValue::from_str(&e))
}

fn report_from_json(
    source: &str,
    id: &str,
    document_json: &str,
    offset: FixedOffset,
) -> Result<CanonicalReport, String> {
    let source = RecordSource::parse(source).ok_or_else(|| format!("Unknown source: {}", source))?;
    let data: Map<String, Value> = serde_json::from_str(document_json)
        .map_err(|e| format!("Invalid document JSON: {}", e))?;
    let record = RawRecord::from_document(source, id, data)
        .map_err(|e| format!("Malformed {} record: {}", source, e))?;

    CanonicalReport::from_record(record, offset).ok_or_else(|| {
        warn(&format!("Record {} has no {}", id, source.timestamp_field()));
        format!("Record has no {}", source.timestamp_field())
    })
}

fn check_symptom_form(form_json: &str) -> Result<String, String> {
    let input: SymptomReportInput = serde_json::from_str(form_json).map_err(|e| {
        json!({"field": Value::Null, "message": format!("Invalid form JSON: {}", e)}).to_string()
    })?;
    let report = shared::validate_symptom_form(&input)
        .map_err(|e| json!({"field": e.field, "message": e.message}).to_string())?;
    to_json(&report)
}

fn offset_from_minutes(minutes: i32) -> Result<FixedOffset, String> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| format!("UTC offset out of range: {} minutes", minutes))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| e.to_string())
}

fn js_error(message: String) -> JsValue {
    JsValue::from_str(&message)
}

#[cfg(target_arch = "wasm32")]
fn warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

#[cfg(not(target_arch = "wasm32"))]
fn warn(_message: &str) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_from_image_document() {
        let doc = r#"{"timestamp":"2025-07-10T23:30:00Z","predicted_class":"Arabica","bean_type_confidence":0.9}"#;
        let report = report_from_json("predictions_with_image", "img-1", doc, FixedOffset::east_opt(0).unwrap()).unwrap();
        assert_eq!(report.label, "Arabica");
        assert_eq!(report.display.quality_score, Some(90.0));

        // Half an hour later in India it is the next day
        let ist = offset_from_minutes(330).unwrap();
        let report = report_from_json("predictions_with_image", "img-1", doc, ist).unwrap();
        assert_eq!(report.date.to_string(), "2025-07-11");
    }

    #[test]
    fn test_offset_out_of_range_is_an_error() {
        assert!(offset_from_minutes(i32::MAX).is_err());
        assert!(offset_from_minutes(i32::MIN).is_err());
        assert!(offset_from_minutes(i32::MAX / 30).is_err());
        assert!(offset_from_minutes(24 * 60).is_err());
        assert_eq!(offset_from_minutes(-300).unwrap().local_minus_utc(), -300 * 60);
    }

    #[test]
    fn test_report_without_timestamp_is_rejected() {
        let err = report_from_json("predictions", "p-1", r#"{"category":"disease"}"#, FixedOffset::east_opt(0).unwrap())
            .unwrap_err();
        assert_eq!(err, "Record has no createdAt");
    }

    #[test]
    fn test_unknown_source_is_rejected() {
        let err = report_from_json("cuppings", "c-1", "{}", FixedOffset::east_opt(0).unwrap()).unwrap_err();
        assert!(err.starts_with("Unknown source"));
    }

    #[test]
    fn test_quality_mode_for_score() {
        assert_eq!(quality_mode_for_score(85.0), "Green (Good)");
        assert_eq!(quality_mode_for_score(60.0), "Yellow (Fair)");
        assert_eq!(quality_mode_for_score(12.5), "Red (Low)");
    }

    #[test]
    fn test_scale_quality_score() {
        assert_eq!(scale_quality_score(0.875), 87.5);
        assert_eq!(scale_quality_score(42.0), 42.0);
        assert!(scale_quality_score(f64::INFINITY).is_nan());
    }

    #[test]
    fn test_check_symptom_form() {
        let ok = check_symptom_form(
            r#"{"symptoms":4,"category":2,"region":1,"dehydration_duration":0,"caught_rain_or_mist":1}"#,
        )
        .unwrap();
        let body: Value = serde_json::from_str(&ok).unwrap();
        assert_eq!(body["symptoms_lable"], 4);
        assert_eq!(body["caught_Rain/Mist"], 1);

        let err = check_symptom_form(r#"{"symptoms":4}"#).unwrap_err();
        let err: Value = serde_json::from_str(&err).unwrap();
        assert_eq!(err["field"], "category");
    }
}
