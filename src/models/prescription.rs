use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::PrescriptionStatus;
use super::{DrugId, PatientId, PrescriptionId};

/// One medication line of a stored prescription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionMedication {
    #[serde(default)]
    pub id: Option<i64>,
    pub drug: DrugId,
    #[serde(default)]
    pub drug_name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub refills: u32,
    #[serde(default)]
    pub instructions: Option<String>,
}

/// Stored prescription as listed by `GET /prescriptions/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: PrescriptionId,
    pub patient: PatientId,
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub status: PrescriptionStatus,
    pub prescribed_date: NaiveDate,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub medications: Vec<PrescriptionMedication>,
}

impl Prescription {
    /// The line the edit form works on. Further lines are not editable there.
    pub fn first_medication(&self) -> Option<&PrescriptionMedication> {
        self.medications.first()
    }

    /// Case-insensitive substring match on patient name or any drug name.
    /// `needle` must already be lower-cased.
    pub fn matches(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.patient_name.to_lowercase().contains(needle)
            || self
                .medications
                .iter()
                .any(|m| m.drug_name.to_lowercase().contains(needle))
    }
}
