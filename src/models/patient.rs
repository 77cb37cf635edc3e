use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::allergy::{Allergy, AllergyRef};
use super::PatientId;

/// Read-only patient record as cached by the desk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PatientRecord")]
pub struct Patient {
    pub id: PatientId,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub allergies: Vec<Allergy>,
}

impl Patient {
    pub fn new(id: i64, first_name: &str, last_name: &str) -> Self {
        Self {
            id: PatientId(id),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            date_of_birth: None,
            phone: None,
            email: None,
            allergies: Vec::new(),
        }
    }

    pub fn with_allergies(mut self, allergies: Vec<Allergy>) -> Self {
        self.allergies = allergies;
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Wire shape: `allergies` is the plain many-to-many (ids or objects),
/// `detailed_allergies` carries the through-table rows with nested allergy.
#[derive(Deserialize)]
struct PatientRecord {
    id: PatientId,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    allergies: Option<Vec<AllergyRef>>,
    #[serde(default)]
    detailed_allergies: Option<Vec<PatientAllergyRow>>,
}

#[derive(Deserialize)]
struct PatientAllergyRow {
    allergy: Allergy,
}

impl From<PatientRecord> for Patient {
    fn from(rec: PatientRecord) -> Self {
        // Named rows first, then anything only present as a bare relation.
        let mut allergies: Vec<Allergy> = rec
            .detailed_allergies
            .unwrap_or_default()
            .into_iter()
            .map(|row| row.allergy)
            .collect();
        for r in rec.allergies.unwrap_or_default() {
            if !allergies.iter().any(|a| a.id == r.id()) {
                allergies.push(r.into_allergy());
            }
        }

        Self {
            id: rec.id,
            first_name: rec.first_name,
            last_name: rec.last_name,
            date_of_birth: rec.date_of_birth,
            phone: rec.phone,
            email: rec.email,
            allergies,
        }
    }
}
