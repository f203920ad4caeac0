//! Prediction service payloads

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::record::{ImagePredictionRecord, Numeric, PredictionField, PredictionRecord};

/// Default category stored with symptom-form predictions
pub const DISEASE_CATEGORY: &str = "disease";

/// Response body from either prediction endpoint, exactly as received
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionResult(pub Value);

/// Typed view of a `/predict_disease` response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiseasePrediction {
    pub defect_name: Option<PredictionField>,
    pub cause_condition: Option<PredictionField>,
    pub bean_quality: Option<PredictionField>,
}

/// Typed view of a `/predict_image` response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImagePrediction {
    pub predicted_class: Option<String>,
    pub is_coffee_bean: Option<bool>,
    pub is_coffee_bean_confidence: Option<Numeric>,
    pub bean_type_confidence: Option<Numeric>,
}

const IMAGE_FIELDS: [&str; 4] = [
    "predicted_class",
    "is_coffee_bean",
    "is_coffee_bean_confidence",
    "bean_type_confidence",
];

impl PredictionResult {
    /// Read a field, treating wrong types as absent
    fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.0
            .get(key)
            .filter(|v| !v.is_null())
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn disease(&self) -> DiseasePrediction {
        DiseasePrediction {
            defect_name: self.get("defect_Name"),
            cause_condition: self.get("cause_condition"),
            bean_quality: self.get("bean_Quality"),
        }
    }

    pub fn image(&self) -> ImagePrediction {
        ImagePrediction {
            predicted_class: self.get("predicted_class"),
            is_coffee_bean: self.get("is_coffee_bean"),
            is_coffee_bean_confidence: self.get("is_coffee_bean_confidence"),
            bean_type_confidence: self.get("bean_type_confidence"),
        }
    }

    /// Response fields other than the typed image fields
    fn image_extras(&self) -> Map<String, Value> {
        match &self.0 {
            Value::Object(map) => map
                .iter()
                .filter(|(k, _)| !IMAGE_FIELDS.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            _ => Map::new(),
        }
    }
}

impl PredictionRecord {
    /// Record written when the user saves a symptom-form prediction
    pub fn from_disease_prediction(
        result: &PredictionResult,
        category: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let prediction = result.disease();
        Self {
            id: String::new(),
            created_at: Some(created_at),
            category: Some(category.unwrap_or(DISEASE_CATEGORY).to_string()),
            defect_name: prediction.defect_name,
            cause_condition: prediction.cause_condition,
            bean_quality: prediction.bean_quality,
            extra: Map::new(),
        }
    }
}

impl ImagePredictionRecord {
    /// Record written when the user saves an image prediction
    pub fn from_image_prediction(
        result: &PredictionResult,
        image_uri: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let prediction = result.image();
        let mut extra = result.image_extras();
        // These keys are owned by the record itself
        for key in ["timestamp", "imageUri", "imageUrl"] {
            extra.remove(key);
        }
        Self {
            id: String::new(),
            timestamp: Some(timestamp),
            predicted_class: prediction.predicted_class,
            is_coffee_bean: prediction.is_coffee_bean,
            is_coffee_bean_confidence: prediction.is_coffee_bean_confidence,
            bean_type_confidence: prediction.bean_type_confidence,
            image_uri: image_uri.map(str::to_string),
            extra,
        }
    }
}
