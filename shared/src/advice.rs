//! Advice selection for the report detail page

use serde::Serialize;

use crate::models::{CanonicalReport, Numeric, PredictionField, RawRecord, RecordSource};
use crate::normalize::format_percent;
use crate::UNKNOWN;

/// Control methods shown alongside a report
pub const ADVICE_POOL: [&str; 5] = [
    "Dry beans on raised beds to 10-12% moisture and turn them often to stop mold from forming.",
    "Remove and destroy infected cherries and beans so the problem does not spread to healthy lots.",
    "Store beans in clean, ventilated jute bags kept off the floor and away from rain and mist.",
    "Pulp and ferment within the recommended window, then wash thoroughly to avoid sour defects.",
    "Hand-sort beans before roasting to remove black, broken and insect-damaged beans.",
];

/// Which detail layout applies to a report
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdviceBranch {
    Disease,
    Image,
    Fallback,
}

/// Branch-specific detail fields; absent values are rendered as "Unknown"
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "branch", rename_all = "snake_case")]
pub enum AdviceDetails {
    #[serde(rename_all = "camelCase")]
    Disease {
        defect_name: String,
        defect_probability: String,
        cause_condition: String,
        bean_quality: String,
    },
    #[serde(rename_all = "camelCase")]
    Image {
        predicted_class: String,
        /// "Yes", "No" or "Unknown"
        is_coffee_bean: String,
        is_coffee_bean_confidence: String,
        bean_type_confidence: String,
        image_uri: String,
    },
    #[serde(rename_all = "camelCase")]
    Fallback {
        label: String,
        coffee_type: String,
        quality_score: String,
        quality_mode: String,
    },
}

/// Serializes flat: `{branch, adviceText, ...detail fields}`
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdviceResolution {
    #[serde(skip)]
    pub branch: AdviceBranch,
    pub advice_text: &'static str,
    #[serde(flatten)]
    pub details: AdviceDetails,
}

/// Resolve the detail branch and advice text for a report.
///
/// The advice text depends only on the report's source and id, so
/// re-resolving the same report always gives the same text.
pub fn resolve(report: &CanonicalReport) -> AdviceResolution {
    let branch = select_branch(report);
    let details = match (branch, &report.record) {
        (AdviceBranch::Disease, RawRecord::Prediction(record)) => AdviceDetails::Disease {
            defect_name: prediction_text(record.defect_name.as_ref()),
            defect_probability: probability_text(record.defect_name.as_ref()),
            cause_condition: prediction_text(record.cause_condition.as_ref()),
            bean_quality: prediction_text(record.bean_quality.as_ref()),
        },
        (AdviceBranch::Image, RawRecord::ImagePrediction(record)) => AdviceDetails::Image {
            predicted_class: or_unknown(record.predicted_class.clone()),
            is_coffee_bean: match record.is_coffee_bean {
                Some(true) => "Yes".to_string(),
                Some(false) => "No".to_string(),
                None => UNKNOWN.to_string(),
            },
            is_coffee_bean_confidence: percent_text(record.is_coffee_bean_confidence.as_ref()),
            bean_type_confidence: percent_text(record.bean_type_confidence.as_ref()),
            image_uri: or_unknown(record.image_uri.clone()),
        },
        _ => AdviceDetails::Fallback {
            label: report.label.clone(),
            coffee_type: or_unknown(report.display.coffee_type.clone()),
            quality_score: report
                .display
                .quality_score
                .map(|s| format!("{:.1}%", s))
                .unwrap_or_else(|| UNKNOWN.to_string()),
            quality_mode: or_unknown(report.display.quality_mode.clone()),
        },
    };

    AdviceResolution {
        branch,
        advice_text: select_advice(&report.key()),
        details,
    }
}

/// Disease iff a form record labelled "disease"; image iff an image record
pub fn select_branch(report: &CanonicalReport) -> AdviceBranch {
    match report.source {
        RecordSource::Predictions if report.label.to_lowercase() == "disease" => {
            AdviceBranch::Disease
        }
        RecordSource::PredictionsWithImage => AdviceBranch::Image,
        _ => AdviceBranch::Fallback,
    }
}

/// Pick an advice string by FNV-1a hash of a stable key
pub fn select_advice(key: &str) -> &'static str {
    let index = fnv1a_64(key.as_bytes()) % ADVICE_POOL.len() as u64;
    ADVICE_POOL[index as usize]
}

/// 64-bit FNV-1a
pub fn fnv1a_64(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    bytes.iter().fold(OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(PRIME)
    })
}

fn or_unknown(value: Option<String>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn prediction_text(field: Option<&PredictionField>) -> String {
    or_unknown(field.and_then(|f| f.prediction.clone()))
}

fn probability_text(field: Option<&PredictionField>) -> String {
    percent_text(field.and_then(|f| f.probability.as_ref()))
}

fn percent_text(value: Option<&Numeric>) -> String {
    value
        .and_then(Numeric::as_f64)
        .and_then(format_percent)
        .unwrap_or_else(|| UNKNOWN.to_string())
}
