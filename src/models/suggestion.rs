use serde::{Deserialize, Serialize};

use super::enums::{ContraindicationLevel, SuggestionMethod};
use super::{lenient_string, DrugId};

/// One candidate medication returned by the suggestion service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: DrugId,
    pub name: String,
    #[serde(default)]
    pub generic_name: Option<String>,
    #[serde(default)]
    pub therapeutic_class: Option<String>,
    #[serde(default)]
    pub safety_score: f64,
    #[serde(default)]
    pub method: SuggestionMethod,
    #[serde(default)]
    pub is_contraindicated: bool,
    #[serde(default)]
    pub contraindication_level: ContraindicationLevel,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub recommended_dosage_mg: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dosage: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub frequency: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub duration: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub refills: Option<u32>,
}

impl Suggestion {
    pub fn new(id: i64, name: &str, safety_score: f64) -> Self {
        Self {
            id: DrugId(id),
            name: name.to_string(),
            generic_name: None,
            therapeutic_class: None,
            safety_score,
            method: SuggestionMethod::default(),
            is_contraindicated: false,
            contraindication_level: ContraindicationLevel::None,
            reasoning: String::new(),
            recommended_dosage_mg: None,
            dosage: None,
            frequency: None,
            duration: None,
            quantity: None,
            refills: None,
        }
    }

    /// Adding this suggestion requires an explicit override.
    pub fn needs_confirmation(&self) -> bool {
        self.is_contraindicated || self.contraindication_level == ContraindicationLevel::Severe
    }
}
