//! Symptom questionnaire submitted to `/predict_disease`

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request body for the disease model. Every field is an integer code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymptomReport {
    // The model was trained with this spelling
    #[serde(rename = "symptoms_lable")]
    pub symptoms: i32,
    pub category: i32,
    pub region: i32,
    #[serde(rename = "dehydration_Duration")]
    pub dehydration_duration: i32,
    #[serde(rename = "caught_Rain/Mist")]
    pub caught_rain_or_mist: i32,
}

/// Form state before submission; fields are `None` until selected
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SymptomReportInput {
    #[validate(required, range(min = 0, max = 23))]
    pub symptoms: Option<i32>,
    #[validate(required, range(min = 0, max = 3))]
    pub category: Option<i32>,
    #[validate(required, range(min = 0, max = 5))]
    pub region: Option<i32>,
    #[validate(required, range(min = 0, max = 3))]
    pub dehydration_duration: Option<i32>,
    #[validate(required, range(min = 0, max = 1))]
    pub caught_rain_or_mist: Option<i32>,
}

/// A selectable answer and the code sent to the model
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct SelectOption {
    pub label: &'static str,
    pub code: i32,
}

const fn opt(label: &'static str, code: i32) -> SelectOption {
    SelectOption { label, code }
}

pub const SYMPTOM_OPTIONS: &[SelectOption] = &[
    opt("Resoaked appearance, Peeling parchment, Visible moisture bubbles", 0),
    opt("Musty smell, Wrinkled shell, Heavy moisture feel", 1),
    opt("Damp odor, Loss of firmness, Internal discoloration", 2),
    opt("Rubbery texture, Color unevenness, Soft and damp interior", 3),
    opt("Sticky to touch, Darkened patches, Swollen appearance", 4),
    opt("Rotten fruit odor, Soft mass texture, Color fading at tips", 5),
    opt("Acidic aroma, Wrinkled outer surface, Uneven color", 6),
    opt("Vinegar-like smell, Sticky mucilage remnants, Brownish surface tint", 7),
    opt("Sour or fermented odor, Soft outer layer, Discoloration near center cut", 8),
    opt("Fruity sourness, Slimy feel, Translucent center", 9),
    opt("Jagged breaks, Open seams, Lightweight texture", 10),
    opt("Hairline fractures, Indentations, Flaky edges", 11),
    opt("Splitting down middle, Irregular bean halves, Rough texture", 12),
    opt("Long surface cracks, Exposed inner cotyledon, Dry feel", 13),
    opt("Angular cracks, Visible stress lines, Brittle edges", 14),
    opt("Deep black shade, Shriveled appearance, Dry cracking sound", 15),
    opt("Chalky black tone, Dense bean body, Ash-like odor", 16),
    opt("Uniform black surface, Tough to break, Scorched taste", 17),
    opt("Oily outer coat, Carbonized tips, Dull finish", 18),
    opt("Greenish specks, Powdery surface, Earthy odor", 19),
    opt("Black mold patches, Softening surface, Mildewy aroma", 20),
    opt("Blue mold spots, Sticky to touch, Stale or moldy smell", 21),
    opt("Spore clusters, Sticky appearance, Unpleasant smell", 22),
    opt("White or gray fuzzy growth, Musty smell, Slimy texture", 23),
];

pub const CATEGORY_OPTIONS: &[SelectOption] = &[
    opt("Environmental", 0),
    opt("Fermentation", 1),
    opt("Fungal", 2),
    opt("Physical", 3),
];

pub const REGION_OPTIONS: &[SelectOption] = &[
    opt("Badulla", 0),
    opt("Hill Country", 1),
    opt("Kandy", 2),
    opt("Matale", 3),
    opt("Nuwara Eliya", 4),
    opt("Uva", 5),
];

/// Codes are not in duration order; they match the model's encoding
pub const DEHYDRATION_OPTIONS: &[SelectOption] = &[
    opt("0-4 days", 0),
    opt("4-7 days", 2),
    opt("7-10 days", 3),
    opt("More than 10 days", 1),
];

pub const RAIN_OPTIONS: &[SelectOption] = &[opt("Yes", 1), opt("No", 0)];

/// Label for a code, if the code is known
pub fn option_label(options: &[SelectOption], code: i32) -> Option<&'static str> {
    options.iter().find(|o| o.code == code).map(|o| o.label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_uses_model_field_names() {
        let report = SymptomReport {
            symptoms: 7,
            category: 1,
            region: 4,
            dehydration_duration: 2,
            caught_rain_or_mist: 1,
        };
        assert_eq!(
            serde_json::to_value(report).unwrap(),
            json!({
                "symptoms_lable": 7,
                "category": 1,
                "region": 4,
                "dehydration_Duration": 2,
                "caught_Rain/Mist": 1
            })
        );
    }

    #[test]
    fn test_option_labels() {
        assert_eq!(option_label(REGION_OPTIONS, 4), Some("Nuwara Eliya"));
        assert_eq!(option_label(DEHYDRATION_OPTIONS, 1), Some("More than 10 days"));
        assert_eq!(option_label(CATEGORY_OPTIONS, 9), None);
        assert_eq!(SYMPTOM_OPTIONS.len(), 24);
    }
}
