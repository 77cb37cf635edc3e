//! Turning a suggestion into a prescription line, and the confirmation gate
//! that holds back contraindicated ones.

use serde::{Deserialize, Serialize};

use crate::models::{DrugId, Suggestion};

pub const DEFAULT_DOSAGE: &str = "As directed";
pub const DEFAULT_FREQUENCY: &str = "As directed";
pub const DEFAULT_DURATION: &str = "7 days";
pub const DEFAULT_QUANTITY: &str = "30";
pub const DEFAULT_REFILLS: &str = "0";

/// Draft prescription line, string-typed the way the form edits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationLine {
    pub drug_id: DrugId,
    pub drug_name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub quantity: String,
    pub refills: String,
    pub instructions: String,
}

/// Map suggestion fields onto line defaults.
pub fn to_medication_line(s: &Suggestion) -> MedicationLine {
    let dosage = match (s.recommended_dosage_mg, s.dosage.as_deref()) {
        (Some(mg), _) => format_mg(mg),
        (None, Some(d)) => d.to_string(),
        (None, None) => DEFAULT_DOSAGE.to_string(),
    };

    MedicationLine {
        drug_id: s.id,
        drug_name: s.name.clone(),
        dosage,
        frequency: s
            .frequency
            .clone()
            .unwrap_or_else(|| DEFAULT_FREQUENCY.to_string()),
        duration: s
            .duration
            .clone()
            .unwrap_or_else(|| DEFAULT_DURATION.to_string()),
        quantity: s
            .quantity
            .map(|q| q.to_string())
            .unwrap_or_else(|| DEFAULT_QUANTITY.to_string()),
        refills: s
            .refills
            .map(|r| r.to_string())
            .unwrap_or_else(|| DEFAULT_REFILLS.to_string()),
        instructions: s.reasoning.clone(),
    }
}

fn format_mg(mg: f64) -> String {
    if mg.fract() == 0.0 {
        format!("{}mg", mg as i64)
    } else {
        format!("{mg}mg")
    }
}

/// Two-state gate for contraindicated adds: nothing held, or one suggestion
/// waiting for the prescriber to confirm or cancel.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ConfirmationGate {
    #[default]
    Clear,
    Pending(Suggestion),
}

impl ConfirmationGate {
    /// Hold `s`, replacing anything already pending.
    pub fn hold(&mut self, s: Suggestion) {
        *self = Self::Pending(s);
    }

    /// Release the held suggestion for adding.
    pub fn confirm(&mut self) -> Option<Suggestion> {
        match std::mem::take(self) {
            Self::Pending(s) => Some(s),
            Self::Clear => None,
        }
    }

    /// Drop the held suggestion without adding it.
    pub fn cancel(&mut self) -> Option<Suggestion> {
        self.confirm()
    }

    pub fn pending(&self) -> Option<&Suggestion> {
        match self {
            Self::Pending(s) => Some(s),
            Self::Clear => None,
        }
    }
}
