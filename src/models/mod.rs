//! Reference entities owned by the clinic API, as cached on the client.

pub mod allergy;
pub mod drug;
pub mod enums;
pub mod patient;
pub mod prescription;
pub mod suggestion;

pub use allergy::Allergy;
pub use drug::Drug;
pub use enums::*;
pub use patient::Patient;
pub use prescription::{Prescription, PrescriptionMedication};
pub use suggestion::Suggestion;

use serde::{Deserialize, Deserializer, Serialize};

/// Numeric primary-key newtypes. The backend uses integer ids everywhere.
macro_rules! id_type {
    ($($name:ident),+ $(,)?) => {
        $(
            #[derive(
                Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
            )]
            #[serde(transparent)]
            pub struct $name(pub i64);

            impl std::fmt::Display for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )+
    };
}

id_type!(AllergyId, PatientId, DrugId, PrescriptionId);

/// Accepts a JSON string or number (or null) where the backend is loose about
/// the type, e.g. `"dosage": 500` vs `"dosage": "500mg"`.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "lenient_string")]
        value: Option<String>,
    }

    #[test]
    fn ids_are_transparent_integers() {
        let id: DrugId = serde_json::from_str("42").unwrap();
        assert_eq!(id, DrugId(42));
        assert_eq!(serde_json::to_string(&PatientId(7)).unwrap(), "7");
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn lenient_string_accepts_numbers_and_strings() {
        let p: Probe = serde_json::from_str(r#"{"value": 500}"#).unwrap();
        assert_eq!(p.value.as_deref(), Some("500"));
        let p: Probe = serde_json::from_str(r#"{"value": "10mg"}"#).unwrap();
        assert_eq!(p.value.as_deref(), Some("10mg"));
    }

    #[test]
    fn lenient_string_treats_blank_as_missing() {
        let p: Probe = serde_json::from_str(r#"{"value": ""}"#).unwrap();
        assert!(p.value.is_none());
        let p: Probe = serde_json::from_str(r#"{"value": null}"#).unwrap();
        assert!(p.value.is_none());
        let p: Probe = serde_json::from_str("{}").unwrap();
        assert!(p.value.is_none());
    }
}
