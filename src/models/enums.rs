use serde::{Deserialize, Serialize};

/// A wire string that does not name any variant of the target enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {field} value: '{value}'")]
pub struct InvalidEnum {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Serde uses the same wire strings as `as_str`.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnum;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(SuggestionMethod {
    ContentBased => "content_based",
    Collaborative => "collaborative",
    Semantic => "semantic",
    SafetyOptimized => "safety_optimized",
    Ensemble => "ensemble",
});

/// The backend reports `content_based` when no method is attached.
impl Default for SuggestionMethod {
    fn default() -> Self {
        Self::ContentBased
    }
}

str_enum!(ContraindicationLevel {
    None => "none",
    Mild => "mild",
    Moderate => "moderate",
    Severe => "severe",
});

impl Default for ContraindicationLevel {
    fn default() -> Self {
        Self::None
    }
}

str_enum!(PrescriptionStatus {
    Active => "active",
    Completed => "completed",
    Cancelled => "cancelled",
    Expired => "expired",
});

impl Default for PrescriptionStatus {
    fn default() -> Self {
        Self::Active
    }
}

str_enum!(SortKey {
    SafetyScore => "safety_score",
    Name => "name",
    Method => "method",
});

impl Default for SortKey {
    fn default() -> Self {
        Self::SafetyScore
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn suggestion_method_round_trip() {
        for (variant, s) in [
            (SuggestionMethod::ContentBased, "content_based"),
            (SuggestionMethod::Collaborative, "collaborative"),
            (SuggestionMethod::Semantic, "semantic"),
            (SuggestionMethod::SafetyOptimized, "safety_optimized"),
            (SuggestionMethod::Ensemble, "ensemble"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(SuggestionMethod::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&ContraindicationLevel::Severe).unwrap();
        assert_eq!(json, "\"severe\"");
        let parsed: PrescriptionStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, PrescriptionStatus::Cancelled);
    }

    #[test]
    fn unknown_method_is_rejected() {
        assert!(serde_json::from_str::<SuggestionMethod>("\"basic_keyword\"").is_err());
        let err = SuggestionMethod::from_str("magic").unwrap_err();
        assert_eq!(err.field, "SuggestionMethod");
        assert_eq!(err.value, "magic");
    }

    #[test]
    fn status_is_case_sensitive() {
        assert!(PrescriptionStatus::from_str("Active").is_err());
        assert_eq!(
            PrescriptionStatus::from_str("active").unwrap(),
            PrescriptionStatus::Active
        );
    }

    #[test]
    fn defaults() {
        assert_eq!(SuggestionMethod::default(), SuggestionMethod::ContentBased);
        assert_eq!(ContraindicationLevel::default(), ContraindicationLevel::None);
        assert_eq!(SortKey::default(), SortKey::SafetyScore);
    }
}
