//! Prescription draft: string-typed fields as edited, validation, and
//! normalization into the create/update payload.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use crate::api::{MedicationPayload, PrescriptionPayload};
use crate::models::{DrugId, PatientId, Prescription, PrescriptionStatus};
use crate::suggestions::MedicationLine;

static DAY_FIRST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})-(\d{2})-(\d{4})$").unwrap());
static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    PatientId,
    DrugId,
    Dosage,
    Frequency,
    Duration,
    Quantity,
    Refills,
    Instructions,
    PrescribedDate,
    ExpiryDate,
    Status,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PatientId => "patient_id",
            Self::DrugId => "drug_id",
            Self::Dosage => "dosage",
            Self::Frequency => "frequency",
            Self::Duration => "duration",
            Self::Quantity => "quantity",
            Self::Refills => "refills",
            Self::Instructions => "instructions",
            Self::PrescribedDate => "prescribed_date",
            Self::ExpiryDate => "expiry_date",
            Self::Status => "status",
        }
    }
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checked in this order; the first empty one is reported.
pub const REQUIRED_FIELDS: [FormField; 10] = [
    FormField::PatientId,
    FormField::DrugId,
    FormField::Dosage,
    FormField::Frequency,
    FormField::Duration,
    FormField::Quantity,
    FormField::Refills,
    FormField::PrescribedDate,
    FormField::ExpiryDate,
    FormField::Status,
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{0} is required")]
    MissingField(FormField),

    #[error("{field} must be a valid date in YYYY-MM-DD format (got '{value}')")]
    InvalidDate { field: FormField, value: String },

    #[error("{field} must be a whole number (got '{value}')")]
    InvalidNumber { field: FormField, value: String },

    #[error("status must be one of active, completed, cancelled, expired (got '{0}')")]
    InvalidStatus(String),

    #[error("No prescription form is open")]
    NoDraft,
}

/// `DD-MM-YYYY` becomes `YYYY-MM-DD`; anything else comes back trimmed and
/// otherwise untouched.
pub fn to_iso_date(input: &str) -> String {
    let input = input.trim();
    match DAY_FIRST.captures(input) {
        Some(caps) => format!("{}-{}-{}", &caps[3], &caps[2], &caps[1]),
        None => input.to_string(),
    }
}

fn parse_date(field: FormField, raw: &str) -> Result<NaiveDate, FormError> {
    let iso = to_iso_date(raw);
    let invalid = || FormError::InvalidDate {
        field,
        value: raw.trim().to_string(),
    };
    if !ISO_DATE.is_match(&iso) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(&iso, "%Y-%m-%d").map_err(|_| invalid())
}

fn parse_number<T: std::str::FromStr>(field: FormField, raw: &str) -> Result<T, FormError> {
    raw.trim().parse().map_err(|_| FormError::InvalidNumber {
        field,
        value: raw.trim().to_string(),
    })
}

// ─── Draft ───────────────────────────────────────────────────────────────────

/// One-line prescription draft as the form holds it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrescriptionFormState {
    pub patient_id: String,
    pub drug_id: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub quantity: String,
    pub refills: String,
    pub instructions: String,
    pub prescribed_date: String,
    pub expiry_date: String,
    pub status: String,
}

impl PrescriptionFormState {
    /// Pre-fill from a stored prescription. Only the first medication line is
    /// carried; a prescription without lines yields empty drug fields.
    pub fn from_prescription(p: &Prescription) -> Self {
        let mut draft = Self {
            patient_id: p.patient.to_string(),
            prescribed_date: p.prescribed_date.to_string(),
            expiry_date: p.expiry_date.map(|d| d.to_string()).unwrap_or_default(),
            status: p.status.as_str().to_string(),
            ..Self::default()
        };
        if let Some(m) = p.first_medication() {
            draft.drug_id = m.drug.to_string();
            draft.dosage = m.dosage.clone();
            draft.frequency = m.frequency.clone();
            draft.duration = m.duration.clone();
            draft.quantity = m.quantity.to_string();
            draft.refills = m.refills.to_string();
            draft.instructions = m.instructions.clone().unwrap_or_default();
        }
        draft
    }

    /// Copy a line produced by the suggestion panel into the drug fields.
    pub fn apply_line(&mut self, line: &MedicationLine) {
        self.drug_id = line.drug_id.to_string();
        self.dosage = line.dosage.clone();
        self.frequency = line.frequency.clone();
        self.duration = line.duration.clone();
        self.quantity = line.quantity.clone();
        self.refills = line.refills.clone();
        self.instructions = line.instructions.clone();
    }

    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::PatientId => &self.patient_id,
            FormField::DrugId => &self.drug_id,
            FormField::Dosage => &self.dosage,
            FormField::Frequency => &self.frequency,
            FormField::Duration => &self.duration,
            FormField::Quantity => &self.quantity,
            FormField::Refills => &self.refills,
            FormField::Instructions => &self.instructions,
            FormField::PrescribedDate => &self.prescribed_date,
            FormField::ExpiryDate => &self.expiry_date,
            FormField::Status => &self.status,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::PatientId => self.patient_id = value,
            FormField::DrugId => self.drug_id = value,
            FormField::Dosage => self.dosage = value,
            FormField::Frequency => self.frequency = value,
            FormField::Duration => self.duration = value,
            FormField::Quantity => self.quantity = value,
            FormField::Refills => self.refills = value,
            FormField::Instructions => self.instructions = value,
            FormField::PrescribedDate => self.prescribed_date = value,
            FormField::ExpiryDate => self.expiry_date = value,
            FormField::Status => self.status = value,
        }
    }

    /// Selected patient, if the field holds a parseable id.
    pub fn patient(&self) -> Option<PatientId> {
        self.patient_id.trim().parse().ok().map(PatientId)
    }

    /// Selected drug, if the field holds a parseable id.
    pub fn drug(&self) -> Option<DrugId> {
        self.drug_id.trim().parse().ok().map(DrugId)
    }

    /// Validate and normalize into the wire payload.
    pub fn to_payload(&self) -> Result<PrescriptionPayload, FormError> {
        if let Some(missing) = REQUIRED_FIELDS
            .iter()
            .find(|f| self.get(**f).trim().is_empty())
        {
            return Err(FormError::MissingField(*missing));
        }

        let prescribed_date = parse_date(FormField::PrescribedDate, &self.prescribed_date)?;
        let expiry_date = parse_date(FormField::ExpiryDate, &self.expiry_date)?;
        let status: PrescriptionStatus = self
            .status
            .trim()
            .to_lowercase()
            .parse()
            .map_err(|_| FormError::InvalidStatus(self.status.trim().to_string()))?;

        let instructions = self.instructions.trim();
        let medication = MedicationPayload {
            drug: DrugId(parse_number(FormField::DrugId, &self.drug_id)?),
            dosage: self.dosage.trim().to_string(),
            frequency: self.frequency.trim().to_string(),
            duration: self.duration.trim().to_string(),
            quantity: parse_number(FormField::Quantity, &self.quantity)?,
            refills: parse_number(FormField::Refills, &self.refills)?,
            instructions: (!instructions.is_empty()).then(|| instructions.to_string()),
        };

        Ok(PrescriptionPayload {
            patient: PatientId(parse_number(FormField::PatientId, &self.patient_id)?),
            status,
            prescribed_date,
            expiry_date,
            medications: vec![medication],
        })
    }
}
