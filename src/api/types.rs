//! Request and response bodies exchanged with the clinic API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{DrugId, PatientId, PrescriptionId, PrescriptionStatus, Suggestion};

// ═══════════════════════════════════════════
// Suggestions
// ═══════════════════════════════════════════

/// Body of `POST /ai-suggestions/enhanced/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionRequest {
    pub patient_id: PatientId,
    pub condition: String,
    pub excluded_drugs: Vec<DrugId>,
    pub max_suggestions: u32,
    pub use_patient_similarity: bool,
    pub use_dosage_optimization: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SuggestionResponse {
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ConditionAnalysisRequest<'a> {
    pub condition: &'a str,
}

// ═══════════════════════════════════════════
// Lists
// ═══════════════════════════════════════════

/// List endpoints answer with a bare array or a paginated envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListBody<T> {
    Plain(Vec<T>),
    Paged { results: Vec<T> },
}

impl<T> ListBody<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Plain(items) => items,
            Self::Paged { results } => results,
        }
    }
}

// ═══════════════════════════════════════════
// Prescriptions
// ═══════════════════════════════════════════

/// One medication line as sent on create/update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicationPayload {
    pub drug: DrugId,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub quantity: u32,
    pub refills: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

/// Normalized create/update body built from a validated form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrescriptionPayload {
    pub patient: PatientId,
    pub status: PrescriptionStatus,
    pub prescribed_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub medications: Vec<MedicationPayload>,
}

/// The parts of a create/update response the desk uses.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SavedPrescription {
    #[serde(default)]
    pub id: Option<PrescriptionId>,
    /// Server-side allergy verdict; takes precedence over the local check.
    #[serde(default)]
    pub allergy_warning: Option<String>,
}

// ═══════════════════════════════════════════
// Allergy check
// ═══════════════════════════════════════════

#[derive(Debug, Serialize)]
pub(crate) struct AllergyCheckRequest {
    pub patient_id: PatientId,
    pub new_medication_id: DrugId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllergyCheckStatus {
    Ok,
    Conflict,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SafetyWarning {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub severity: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AllergyCheckResponse {
    pub status: AllergyCheckStatus,
    #[serde(default)]
    pub warnings: Vec<SafetyWarning>,
}

impl AllergyCheckResponse {
    pub fn is_conflict(&self) -> bool {
        self.status == AllergyCheckStatus::Conflict
    }

    /// Non-blank warning messages on one line. `None` when clear, and also
    /// for a conflict that came without any message text.
    pub fn summary(&self) -> Option<String> {
        if !self.is_conflict() {
            return None;
        }
        let messages: Vec<&str> = self
            .warnings
            .iter()
            .map(|w| w.message.trim())
            .filter(|m| !m.is_empty())
            .collect();
        (!messages.is_empty()).then(|| messages.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestion_request_wire_shape() {
        let req = SuggestionRequest {
            patient_id: PatientId(1),
            condition: "hypertension".into(),
            excluded_drugs: vec![DrugId(2), DrugId(3)],
            max_suggestions: 5,
            use_patient_similarity: true,
            use_dosage_optimization: false,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["patient_id"], 1);
        assert_eq!(json["excluded_drugs"], serde_json::json!([2, 3]));
        assert_eq!(json["use_dosage_optimization"], false);
    }

    #[test]
    fn list_body_accepts_both_shapes() {
        let plain: ListBody<i64> = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(plain.into_vec(), vec![1, 2]);
        let paged: ListBody<i64> =
            serde_json::from_str(r#"{"count": 2, "next": null, "results": [3, 4]}"#).unwrap();
        assert_eq!(paged.into_vec(), vec![3, 4]);
    }

    #[test]
    fn payload_serializes_dates_and_lowercase_status() {
        let payload = PrescriptionPayload {
            patient: PatientId(3),
            status: PrescriptionStatus::Active,
            prescribed_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            expiry_date: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            medications: vec![MedicationPayload {
                drug: DrugId(12),
                dosage: "500mg".into(),
                frequency: "Twice daily".into(),
                duration: "7 days".into(),
                quantity: 14,
                refills: 0,
                instructions: None,
            }],
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["status"], "active");
        assert_eq!(json["prescribed_date"], "2024-03-15");
        assert_eq!(json["medications"][0]["quantity"], 14);
        assert!(json["medications"][0].get("instructions").is_none());
    }

    #[test]
    fn saved_prescription_ignores_extra_fields() {
        let saved: SavedPrescription = serde_json::from_str(
            r#"{"id": 9, "patient": 3, "allergy_warning": "Patient is allergic to: Penicillin"}"#,
        )
        .unwrap();
        assert_eq!(saved.id, Some(PrescriptionId(9)));
        assert!(saved.allergy_warning.unwrap().contains("Penicillin"));
    }

    #[test]
    fn allergy_check_summary() {
        let resp: AllergyCheckResponse = serde_json::from_str(
            r#"{"status": "conflict", "warnings": [
                {"type": "Allergy", "severity": "High", "message": "Patient is allergic to penicillin."}
            ]}"#,
        )
        .unwrap();
        assert_eq!(resp.warnings[0].kind, "Allergy");
        assert_eq!(
            resp.summary().as_deref(),
            Some("Patient is allergic to penicillin.")
        );

        let ok: AllergyCheckResponse =
            serde_json::from_str(r#"{"status": "ok", "warnings": []}"#).unwrap();
        assert!(ok.summary().is_none());
    }

    #[test]
    fn conflict_without_messages_has_no_summary() {
        let resp: AllergyCheckResponse =
            serde_json::from_str(r#"{"status": "conflict", "warnings": []}"#).unwrap();
        assert!(resp.is_conflict());
        assert_eq!(resp.summary(), None);

        let blank: AllergyCheckResponse = serde_json::from_str(
            r#"{"status": "conflict", "warnings": [{"message": "  "}]}"#,
        )
        .unwrap();
        assert_eq!(blank.summary(), None);
    }
}
