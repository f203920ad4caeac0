//! Symptom form validation

use thiserror::Error;
use validator::Validate;

use crate::models::{SymptomReport, SymptomReportInput};

/// A problem with the symptom form, reported inline next to the field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct SymptomFormError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Fields in the order the form presents them, with the prompt shown when
/// the field is missing
const FORM_FIELDS: [(&str, &str); 5] = [
    ("symptoms", "Please select a symptom."),
    ("category", "Please select a category."),
    ("region", "Please select a region."),
    ("dehydration_duration", "Please select dehydration duration."),
    ("caught_rain_or_mist", "Please select whether beans caught rain or mist."),
];

/// Check the form and produce the request body.
///
/// Reports the first problem in form order.
pub fn validate_symptom_form(input: &SymptomReportInput) -> Result<SymptomReport, SymptomFormError> {
    if let Err(errors) = input.validate() {
        let field_errors = errors.field_errors();
        for (field, prompt) in FORM_FIELDS {
            let Some(problems) = field_errors.get(field) else {
                continue;
            };
            let missing = problems.iter().any(|e| e.code == "required");
            return Err(SymptomFormError {
                field,
                message: if missing { prompt } else { "Selected option is not recognized." },
            });
        }
    }

    match (
        input.symptoms,
        input.category,
        input.region,
        input.dehydration_duration,
        input.caught_rain_or_mist,
    ) {
        (Some(symptoms), Some(category), Some(region), Some(dehydration_duration), Some(caught_rain_or_mist)) => {
            Ok(SymptomReport {
                symptoms,
                category,
                region,
                dehydration_duration,
                caught_rain_or_mist,
            })
        }
        // validate() already rejected any missing field
        _ => Err(SymptomFormError {
            field: FORM_FIELDS[0].0,
            message: FORM_FIELDS[0].1,
        }),
    }
}
