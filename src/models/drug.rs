use serde::{Deserialize, Serialize};

use super::allergy::{allergy_list, Allergy};
use super::DrugId;

/// Formulary entry as returned by `GET /drugs/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drug {
    pub id: DrugId,
    pub name: String,
    #[serde(default)]
    pub generic_name: String,
    #[serde(default)]
    pub strength: String,
    #[serde(default)]
    pub form: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub therapeutic_class: Option<String>,
    #[serde(default, deserialize_with = "allergy_list")]
    pub allergy_conflicts: Vec<Allergy>,
}

impl Drug {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id: DrugId(id),
            name: name.to_string(),
            generic_name: String::new(),
            strength: String::new(),
            form: String::new(),
            category: String::new(),
            therapeutic_class: None,
            allergy_conflicts: Vec::new(),
        }
    }

    pub fn with_conflicts(mut self, conflicts: Vec<Allergy>) -> Self {
        self.allergy_conflicts = conflicts;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_backend_shape() {
        let json = r#"{
            "id": 12, "name": "Amoxicillin", "generic_name": "amoxicillin",
            "strength": "500mg", "form": "capsule", "category": "Antibiotic",
            "therapeutic_class": "Penicillins",
            "allergy_conflicts": [{"id": 1, "name": "Penicillin"}],
            "price": "4.20"
        }"#;
        let d: Drug = serde_json::from_str(json).unwrap();
        assert_eq!(d.id, DrugId(12));
        assert_eq!(d.allergy_conflicts, vec![Allergy::new(1, "Penicillin")]);
        assert_eq!(d.strength, "500mg");
        assert_eq!(d.therapeutic_class.as_deref(), Some("Penicillins"));
    }
}
