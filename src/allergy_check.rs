//! Advisory allergy cross-check between a patient and a drug.
//!
//! Pure and local: the server repeats the check on create/update and its
//! verdict replaces this one once a submission succeeds.

use std::collections::HashSet;

use crate::models::{AllergyId, Drug, Patient};

/// Warning text when the patient is allergic to something the drug conflicts
/// with, `None` otherwise.
///
/// Both a patient and a drug must be selected and both must carry allergy
/// data. Conflicts are listed in the drug's order, each name once.
pub fn check(patient: Option<&Patient>, drug: Option<&Drug>) -> Option<String> {
    let (patient, drug) = (patient?, drug?);
    if patient.allergies.is_empty() || drug.allergy_conflicts.is_empty() {
        return None;
    }

    let patient_ids: HashSet<AllergyId> = patient.allergies.iter().map(|a| a.id).collect();
    let mut seen = HashSet::new();
    let names: Vec<&str> = drug
        .allergy_conflicts
        .iter()
        .filter(|a| patient_ids.contains(&a.id) && seen.insert(a.id))
        .map(|a| a.name.as_str())
        .collect();

    if names.is_empty() {
        return None;
    }

    tracing::debug!(
        patient_id = %patient.id,
        drug_id = %drug.id,
        conflicts = names.len(),
        "Allergy conflict detected"
    );
    Some(format!("Patient is allergic to: {}", names.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Allergy;

    fn patient(allergies: Vec<Allergy>) -> Patient {
        Patient::new(1, "Ada", "Okafor").with_allergies(allergies)
    }

    fn drug(conflicts: Vec<Allergy>) -> Drug {
        Drug::new(10, "Amoxicillin").with_conflicts(conflicts)
    }

    #[test]
    fn missing_selection_is_silent() {
        let p = patient(vec![Allergy::new(1, "Penicillin")]);
        let d = drug(vec![Allergy::new(1, "Penicillin")]);
        assert!(check(None, Some(&d)).is_none());
        assert!(check(Some(&p), None).is_none());
        assert!(check(None, None).is_none());
    }

    #[test]
    fn empty_relation_lists_are_silent() {
        let p = patient(vec![]);
        let d = drug(vec![Allergy::new(1, "Penicillin")]);
        assert!(check(Some(&p), Some(&d)).is_none());

        let p = patient(vec![Allergy::new(1, "Penicillin")]);
        let d = drug(vec![]);
        assert!(check(Some(&p), Some(&d)).is_none());
    }

    #[test]
    fn disjoint_lists_are_silent() {
        let p = patient(vec![Allergy::new(1, "Penicillin")]);
        let d = drug(vec![Allergy::new(2, "Sulfa")]);
        assert!(check(Some(&p), Some(&d)).is_none());
    }

    #[test]
    fn names_every_conflict() {
        let p = patient(vec![
            Allergy::new(1, "Penicillin"),
            Allergy::new(2, "Sulfa"),
            Allergy::new(3, "Latex"),
        ]);
        let d = drug(vec![
            Allergy::new(2, "Sulfa"),
            Allergy::new(4, "Aspirin"),
            Allergy::new(1, "Penicillin"),
        ]);
        let warning = check(Some(&p), Some(&d)).unwrap();
        assert_eq!(warning, "Patient is allergic to: Sulfa, Penicillin");
        assert!(!warning.contains("Latex"));
        assert!(!warning.contains("Aspirin"));
    }

    #[test]
    fn matches_by_identity_not_name() {
        let p = patient(vec![Allergy::new(1, "penicillin")]);
        let d = drug(vec![Allergy::new(9, "penicillin")]);
        assert!(check(Some(&p), Some(&d)).is_none());
    }

    #[test]
    fn duplicate_conflicts_reported_once() {
        let p = patient(vec![Allergy::new(1, "Penicillin")]);
        let d = drug(vec![Allergy::new(1, "Penicillin"), Allergy::new(1, "Penicillin")]);
        assert_eq!(
            check(Some(&p), Some(&d)).as_deref(),
            Some("Patient is allergic to: Penicillin")
        );
    }
}
