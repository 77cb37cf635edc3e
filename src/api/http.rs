use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::types::{
    AllergyCheckRequest, AllergyCheckResponse, ConditionAnalysisRequest, ListBody,
    PrescriptionPayload, SavedPrescription, SuggestionRequest, SuggestionResponse,
};
use super::{ApiError, ClinicApi};
use crate::config::ClientConfig;
use crate::models::{Drug, DrugId, Patient, PatientId, Prescription, PrescriptionId, Suggestion};

/// `reqwest`-backed clinic API client.
pub struct HttpClinicApi {
    base_url: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpClinicApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Http(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn from_env() -> Result<Self, ApiError> {
        Self::new(&ClientConfig::from_env())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn transport_error(&self, e: reqwest::Error) -> ApiError {
        if e.is_connect() {
            ApiError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            ApiError::Timeout(self.timeout_secs)
        } else {
            ApiError::Http(e.to_string())
        }
    }

    /// Send, map non-2xx to `ApiError::Server`, decode the JSON body.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_response(status.as_u16(), &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let body: ListBody<T> = self.send(self.client.get(self.url(path))).await?;
        Ok(body.into_vec())
    }
}

#[async_trait]
impl ClinicApi for HttpClinicApi {
    async fn fetch_suggestions(
        &self,
        req: &SuggestionRequest,
    ) -> Result<Vec<Suggestion>, ApiError> {
        let body: SuggestionResponse = self
            .send(self.client.post(self.url("ai-suggestions/enhanced/")).json(req))
            .await?;
        Ok(body.suggestions)
    }

    async fn analyze_condition(&self, condition: &str) -> Result<serde_json::Value, ApiError> {
        self.send(
            self.client
                .post(self.url("ai-suggestions/analyze-condition/"))
                .json(&ConditionAnalysisRequest { condition }),
        )
        .await
    }

    async fn list_patients(&self) -> Result<Vec<Patient>, ApiError> {
        self.get_list("patients/").await
    }

    async fn list_drugs(&self) -> Result<Vec<Drug>, ApiError> {
        self.get_list("drugs/").await
    }

    async fn list_prescriptions(&self) -> Result<Vec<Prescription>, ApiError> {
        self.get_list("prescriptions/").await
    }

    async fn create_prescription(
        &self,
        payload: &PrescriptionPayload,
    ) -> Result<SavedPrescription, ApiError> {
        self.send(self.client.post(self.url("prescriptions/")).json(payload))
            .await
    }

    async fn update_prescription(
        &self,
        id: PrescriptionId,
        payload: &PrescriptionPayload,
    ) -> Result<SavedPrescription, ApiError> {
        self.send(
            self.client
                .put(self.url(&format!("prescriptions/{id}/")))
                .json(payload),
        )
        .await
    }

    async fn check_allergy(
        &self,
        patient: PatientId,
        drug: DrugId,
    ) -> Result<AllergyCheckResponse, ApiError> {
        self.send(
            self.client
                .post(self.url("medications/check-allergy-only/"))
                .json(&AllergyCheckRequest {
                    patient_id: patient,
                    new_medication_id: drug,
                }),
        )
        .await
    }
}
