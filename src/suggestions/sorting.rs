//! Client-side ordering and filtering of the suggestion list.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::{SortKey, Suggestion};

/// Optional narrowing of what the panel shows. The default shows everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestionFilter {
    pub hide_contraindicated: bool,
    pub min_safety_score: Option<f64>,
}

impl SuggestionFilter {
    pub fn admits(&self, s: &Suggestion) -> bool {
        if self.hide_contraindicated && s.needs_confirmation() {
            return false;
        }
        match self.min_safety_score {
            Some(min) => s.safety_score >= min,
            None => true,
        }
    }
}

/// Score descending, name ascending (case-insensitive), method ascending by
/// wire name.
pub fn compare(a: &Suggestion, b: &Suggestion, key: SortKey) -> Ordering {
    match key {
        SortKey::SafetyScore => b.safety_score.total_cmp(&a.safety_score),
        SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortKey::Method => a.method.as_str().cmp(b.method.as_str()),
    }
}

/// Filtered copy of `items` in `key` order. `sort_by` is stable, so equal
/// keys keep response order.
pub fn arrange(items: &[Suggestion], key: SortKey, filter: &SuggestionFilter) -> Vec<Suggestion> {
    let mut out: Vec<Suggestion> = items.iter().filter(|s| filter.admits(s)).cloned().collect();
    out.sort_by(|a, b| compare(a, b, key));
    out
}
