//! Clinic API boundary.
//!
//! The backend owns drug safety scoring, suggestion ranking, persistence and
//! validation. The desk only talks to it through [`ClinicApi`], so controllers
//! can run against the HTTP client in production and a mock in tests.

pub mod error;
pub mod http;
#[cfg(test)]
pub mod mock;
pub mod types;

pub use error::{ApiError, FieldError};
pub use http::HttpClinicApi;
pub use types::*;

use async_trait::async_trait;

use crate::models::{Drug, DrugId, Patient, PatientId, Prescription, PrescriptionId, Suggestion};

/// Everything the desk needs from the clinic backend.
#[async_trait]
pub trait ClinicApi: Send + Sync {
    /// `POST /ai-suggestions/enhanced/`
    async fn fetch_suggestions(&self, req: &SuggestionRequest)
        -> Result<Vec<Suggestion>, ApiError>;

    /// `POST /ai-suggestions/analyze-condition/`. Shape is not interpreted.
    async fn analyze_condition(&self, condition: &str) -> Result<serde_json::Value, ApiError>;

    async fn list_patients(&self) -> Result<Vec<Patient>, ApiError>;

    async fn list_drugs(&self) -> Result<Vec<Drug>, ApiError>;

    async fn list_prescriptions(&self) -> Result<Vec<Prescription>, ApiError>;

    async fn create_prescription(
        &self,
        payload: &PrescriptionPayload,
    ) -> Result<SavedPrescription, ApiError>;

    async fn update_prescription(
        &self,
        id: PrescriptionId,
        payload: &PrescriptionPayload,
    ) -> Result<SavedPrescription, ApiError>;

    /// `POST /medications/check-allergy-only/`: authoritative allergy check.
    async fn check_allergy(
        &self,
        patient: PatientId,
        drug: DrugId,
    ) -> Result<AllergyCheckResponse, ApiError>;
}
