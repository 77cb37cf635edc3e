use serde::{Deserialize, Deserializer, Serialize};

use super::AllergyId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allergy {
    pub id: AllergyId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Allergy {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id: AllergyId(id),
            name: name.to_string(),
            description: None,
        }
    }

    /// Placeholder for a relation the API returned as a bare primary key.
    fn unnamed(id: AllergyId) -> Self {
        Self {
            id,
            name: format!("allergy #{id}"),
            description: None,
        }
    }
}

/// Many-to-many fields come back either as nested objects or as bare ids,
/// depending on the serializer.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum AllergyRef {
    Full(Allergy),
    Id(AllergyId),
}

impl AllergyRef {
    pub(crate) fn id(&self) -> AllergyId {
        match self {
            Self::Full(a) => a.id,
            Self::Id(id) => *id,
        }
    }

    pub(crate) fn into_allergy(self) -> Allergy {
        match self {
            Self::Full(a) => a,
            Self::Id(id) => Allergy::unnamed(id),
        }
    }
}

/// `deserialize_with` helper for allergy lists, null-tolerant.
pub(crate) fn allergy_list<'de, D>(deserializer: D) -> Result<Vec<Allergy>, D::Error>
where
    D: Deserializer<'de>,
{
    let refs = Option::<Vec<AllergyRef>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(refs.into_iter().map(AllergyRef::into_allergy).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "allergy_list")]
        allergies: Vec<Allergy>,
    }

    #[test]
    fn nested_objects_deserialize() {
        let h: Holder = serde_json::from_str(
            r#"{"allergies": [{"id": 1, "name": "Penicillin", "description": null}]}"#,
        )
        .unwrap();
        assert_eq!(h.allergies, vec![Allergy::new(1, "Penicillin")]);
    }

    #[test]
    fn bare_ids_get_placeholder_names() {
        let h: Holder = serde_json::from_str(r#"{"allergies": [3]}"#).unwrap();
        assert_eq!(h.allergies[0].id, AllergyId(3));
        assert_eq!(h.allergies[0].name, "allergy #3");
    }

    #[test]
    fn null_list_is_empty() {
        let h: Holder = serde_json::from_str(r#"{"allergies": null}"#).unwrap();
        assert!(h.allergies.is_empty());
    }
}
