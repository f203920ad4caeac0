//! Inspection submission and the "Save" action

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use shared::{
    validate_symptom_form, ImagePredictionRecord, PredictionRecord, PredictionResult,
    RecordSource, SymptomReportInput, UserContext,
};

use crate::error::{InspectionError, InspectionResult};
use crate::external::PredictionClient;
use crate::store::DocumentStore;

/// Submits inspections and persists accepted results
#[derive(Clone)]
pub struct InspectionService {
    client: PredictionClient,
    store: Arc<dyn DocumentStore>,
}

impl InspectionService {
    pub fn new(client: PredictionClient, store: Arc<dyn DocumentStore>) -> Self {
        Self { client, store }
    }

    /// Validate the symptom form and request a disease prediction.
    ///
    /// No request is made when a field is missing.
    pub async fn submit_symptom_form(
        &self,
        input: &SymptomReportInput,
    ) -> InspectionResult<PredictionResult> {
        let report = validate_symptom_form(input)?;
        self.client.submit_symptom_report(&report).await
    }

    pub async fn submit_image(&self, image_path: impl AsRef<Path>) -> InspectionResult<PredictionResult> {
        self.client.submit_image(image_path).await
    }

    /// Save a disease prediction the user accepted
    pub async fn save_disease_prediction(
        &self,
        user: Option<&UserContext>,
        result: &PredictionResult,
        category: Option<&str>,
    ) -> InspectionResult<String> {
        let user = require_user(user)?;
        let record = PredictionRecord::from_disease_prediction(result, category, Utc::now());
        self.append(user, RecordSource::Predictions, to_document(&record)?)
            .await
    }

    /// Save an image prediction the user accepted
    pub async fn save_image_prediction(
        &self,
        user: Option<&UserContext>,
        result: &PredictionResult,
        image_uri: Option<&str>,
    ) -> InspectionResult<String> {
        let user = require_user(user)?;
        let record = ImagePredictionRecord::from_image_prediction(result, image_uri, Utc::now());
        self.append(user, RecordSource::PredictionsWithImage, to_document(&record)?)
            .await
    }

    async fn append(
        &self,
        user: &UserContext,
        source: RecordSource,
        document: Map<String, Value>,
    ) -> InspectionResult<String> {
        let id = self.store.append(&user.uid, source, document).await?;
        tracing::info!(uid = %user.uid, %source, %id, "Prediction saved");
        Ok(id)
    }
}

fn require_user(user: Option<&UserContext>) -> InspectionResult<&UserContext> {
    user.filter(|u| u.is_authenticated())
        .ok_or(InspectionError::Unauthenticated)
}

fn to_document<T: serde::Serialize>(record: &T) -> InspectionResult<Map<String, Value>> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(InspectionError::Internal(anyhow::anyhow!(
            "record did not serialize to an object"
        ))),
        Err(e) => Err(InspectionError::Internal(e.into())),
    }
}
