//! In-memory `ClinicApi` for controller tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::types::{
    AllergyCheckResponse, AllergyCheckStatus, PrescriptionPayload, SavedPrescription,
    SuggestionRequest,
};
use super::{ApiError, ClinicApi};
use crate::models::{Drug, DrugId, Patient, PatientId, Prescription, PrescriptionId, Suggestion};

/// Canned responses plus a record of every call.
///
/// Suggestions are keyed by the request's `condition`; unknown terms get an
/// empty list. `delays` lets a test make one term answer slower than another.
pub struct MockClinicApi {
    pub suggestions: Mutex<HashMap<String, Result<Vec<Suggestion>, ApiError>>>,
    pub delays: Mutex<HashMap<String, Duration>>,
    pub analysis: Mutex<Result<serde_json::Value, ApiError>>,
    pub patients: Mutex<Result<Vec<Patient>, ApiError>>,
    pub drugs: Mutex<Result<Vec<Drug>, ApiError>>,
    pub prescriptions: Mutex<Result<Vec<Prescription>, ApiError>>,
    pub save_result: Mutex<Result<SavedPrescription, ApiError>>,
    pub allergy_check: Mutex<Result<AllergyCheckResponse, ApiError>>,

    pub suggestion_calls: Mutex<Vec<SuggestionRequest>>,
    pub analysis_calls: Mutex<Vec<String>>,
    pub list_calls: Mutex<u32>,
    pub created: Mutex<Vec<PrescriptionPayload>>,
    pub updated: Mutex<Vec<(PrescriptionId, PrescriptionPayload)>>,
}

impl Default for MockClinicApi {
    fn default() -> Self {
        Self {
            suggestions: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
            analysis: Mutex::new(Ok(serde_json::json!({"analysis": {"severity": "moderate"}}))),
            patients: Mutex::new(Ok(Vec::new())),
            drugs: Mutex::new(Ok(Vec::new())),
            prescriptions: Mutex::new(Ok(Vec::new())),
            save_result: Mutex::new(Ok(SavedPrescription::default())),
            allergy_check: Mutex::new(Ok(AllergyCheckResponse {
                status: AllergyCheckStatus::Ok,
                warnings: Vec::new(),
            })),
            suggestion_calls: Mutex::new(Vec::new()),
            analysis_calls: Mutex::new(Vec::new()),
            list_calls: Mutex::new(0),
            created: Mutex::new(Vec::new()),
            updated: Mutex::new(Vec::new()),
        }
    }
}

impl MockClinicApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_suggestions(self, term: &str, result: Result<Vec<Suggestion>, ApiError>) -> Self {
        self.suggestions
            .lock()
            .unwrap()
            .insert(term.to_string(), result);
        self
    }

    pub fn with_delay(self, term: &str, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(term.to_string(), delay);
        self
    }

    pub fn with_prescriptions(self, items: Vec<Prescription>) -> Self {
        *self.prescriptions.lock().unwrap() = Ok(items);
        self
    }

    pub fn with_patients(self, items: Vec<Patient>) -> Self {
        *self.patients.lock().unwrap() = Ok(items);
        self
    }

    pub fn with_drugs(self, items: Vec<Drug>) -> Self {
        *self.drugs.lock().unwrap() = Ok(items);
        self
    }

    pub fn with_save_result(self, result: Result<SavedPrescription, ApiError>) -> Self {
        *self.save_result.lock().unwrap() = result;
        self
    }

    pub fn suggestion_terms(&self) -> Vec<String> {
        self.suggestion_calls
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.condition.clone())
            .collect()
    }
}

#[async_trait]
impl ClinicApi for MockClinicApi {
    async fn fetch_suggestions(
        &self,
        req: &SuggestionRequest,
    ) -> Result<Vec<Suggestion>, ApiError> {
        self.suggestion_calls.lock().unwrap().push(req.clone());
        let delay = self.delays.lock().unwrap().get(&req.condition).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.suggestions
            .lock()
            .unwrap()
            .get(&req.condition)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn analyze_condition(&self, condition: &str) -> Result<serde_json::Value, ApiError> {
        self.analysis_calls
            .lock()
            .unwrap()
            .push(condition.to_string());
        self.analysis.lock().unwrap().clone()
    }

    async fn list_patients(&self) -> Result<Vec<Patient>, ApiError> {
        self.patients.lock().unwrap().clone()
    }

    async fn list_drugs(&self) -> Result<Vec<Drug>, ApiError> {
        self.drugs.lock().unwrap().clone()
    }

    async fn list_prescriptions(&self) -> Result<Vec<Prescription>, ApiError> {
        *self.list_calls.lock().unwrap() += 1;
        self.prescriptions.lock().unwrap().clone()
    }

    async fn create_prescription(
        &self,
        payload: &PrescriptionPayload,
    ) -> Result<SavedPrescription, ApiError> {
        self.created.lock().unwrap().push(payload.clone());
        self.save_result.lock().unwrap().clone()
    }

    async fn update_prescription(
        &self,
        id: PrescriptionId,
        payload: &PrescriptionPayload,
    ) -> Result<SavedPrescription, ApiError> {
        self.updated.lock().unwrap().push((id, payload.clone()));
        self.save_result.lock().unwrap().clone()
    }

    async fn check_allergy(
        &self,
        _patient: PatientId,
        _drug: DrugId,
    ) -> Result<AllergyCheckResponse, ApiError> {
        self.allergy_check.lock().unwrap().clone()
    }
}
