//! AI suggestion panel: debounced search, stale-response discard, sorting,
//! and the contraindication confirmation gate.
//!
//! `SuggestionSearchController` is a plain state machine. Every transition
//! takes `now` and nothing in here touches a runtime; `driver` wires it to
//! tokio and a `ClinicApi`.

pub mod add;
pub mod driver;
pub mod sorting;

pub use add::{to_medication_line, ConfirmationGate, MedicationLine};
pub use driver::{spawn_search, SearchEvent, SearchHandle};
pub use sorting::SuggestionFilter;

use std::collections::BTreeSet;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::api::{ApiError, SuggestionRequest};
use crate::config;
use crate::debounce::Debouncer;
use crate::models::{DrugId, PatientId, SortKey, Suggestion};
use crate::notifications::{Notification, NotificationKind, Notifications};

const FETCH_FAILED: &str = "Failed to fetch medication suggestions";

// ─── Public types ────────────────────────────────────────────────────────────

/// Toggles forwarded to the suggestion service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSettings {
    pub use_patient_similarity: bool,
    pub use_dosage_optimization: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            use_patient_similarity: true,
            use_dosage_optimization: true,
        }
    }
}

/// Everything one fetch needs. Built when the debounce fires, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub term: String,
    pub patient_id: PatientId,
    pub excluded_drug_ids: BTreeSet<DrugId>,
    pub max_results: u32,
    pub settings: SearchSettings,
}

impl SearchQuery {
    pub fn to_request(&self) -> SuggestionRequest {
        SuggestionRequest {
            patient_id: self.patient_id,
            condition: self.term.clone(),
            excluded_drugs: self.excluded_drug_ids.iter().copied().collect(),
            max_suggestions: self.max_results,
            use_patient_similarity: self.settings.use_patient_similarity,
            use_dosage_optimization: self.settings.use_dosage_optimization,
        }
    }
}

/// Query context stamped on a fetch. Completions whose ticket is no longer
/// the active one are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    pub generation: u64,
    pub patient_id: PatientId,
    pub term: String,
}

/// A fetch the owner must now perform.
#[derive(Debug, Clone)]
pub struct PendingFetch {
    pub ticket: QueryTicket,
    pub query: SearchQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchPhase {
    /// No usable term or no patient.
    Idle,
    /// Debounce timer armed, waiting for input to settle.
    Typing,
    /// Request in flight.
    Loading,
    Ready,
    /// Request succeeded with zero suggestions.
    Empty,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    Added(MedicationLine),
    /// Held behind the confirmation gate; nothing was added.
    PendingConfirmation,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("No suggestion with id {0} in the current list")]
    UnknownSuggestion(DrugId),
    #[error("No suggestion is waiting for confirmation")]
    NothingPending,
}

/// Read-only snapshot handed to the UI.
#[derive(Debug, Clone, Serialize)]
pub struct SearchView {
    pub term: String,
    pub patient_id: Option<PatientId>,
    pub phase: SearchPhase,
    pub error: Option<String>,
    pub suggestions: Vec<Suggestion>,
    pub sort: SortKey,
    pub analysis: Option<serde_json::Value>,
    pub pending_confirmation: Option<Suggestion>,
    pub just_added: Option<DrugId>,
    pub notifications: Vec<Notification>,
}

/// Receives lines for the prescription being drafted.
pub type AddCallback = Box<dyn FnMut(MedicationLine) + Send>;

// ─── Controller ──────────────────────────────────────────────────────────────

pub struct SuggestionSearchController {
    term: String,
    patient: Option<PatientId>,
    settings: SearchSettings,
    excluded: BTreeSet<DrugId>,
    max_results: u32,
    /// Bumped on every change of term, patient or settings.
    generation: u64,
    debounce: Debouncer,
    phase: SearchPhase,
    error: Option<String>,
    /// Last successful response, in response order.
    response: Vec<Suggestion>,
    visible: Vec<Suggestion>,
    sort: SortKey,
    filter: SuggestionFilter,
    analysis: Option<serde_json::Value>,
    gate: ConfirmationGate,
    just_added: Option<(DrugId, Instant)>,
    notifications: Notifications,
    on_add: AddCallback,
}

impl SuggestionSearchController {
    pub fn new(on_add: AddCallback) -> Self {
        Self {
            term: String::new(),
            patient: None,
            settings: SearchSettings::default(),
            excluded: BTreeSet::new(),
            max_results: config::DEFAULT_MAX_SUGGESTIONS,
            generation: 0,
            debounce: Debouncer::new(config::SEARCH_DEBOUNCE),
            phase: SearchPhase::Idle,
            error: None,
            response: Vec::new(),
            visible: Vec::new(),
            sort: SortKey::default(),
            filter: SuggestionFilter::default(),
            analysis: None,
            gate: ConfirmationGate::default(),
            just_added: None,
            notifications: Notifications::new(config::NOTIFICATION_TTL),
            on_add,
        }
    }

    // ── Input events ──

    pub fn on_search_term_changed(&mut self, term: &str, now: Instant) {
        if term == self.term {
            return;
        }
        self.term = term.to_string();
        self.generation += 1;

        if !self.term_is_searchable() {
            self.debounce.cancel();
            self.clear_results();
            self.drop_unlisted_confirmation();
            self.phase = SearchPhase::Idle;
            return;
        }
        self.rearm(now);
    }

    pub fn on_patient_selected(&mut self, patient: Option<PatientId>, now: Instant) {
        if patient == self.patient {
            return;
        }
        self.patient = patient;
        self.generation += 1;
        self.clear_results();
        if self.gate.cancel().is_some() {
            tracing::debug!("Pending confirmation dropped on patient change");
        }
        self.rearm(now);
    }

    pub fn on_settings_changed(&mut self, settings: SearchSettings, now: Instant) {
        if settings == self.settings {
            return;
        }
        self.settings = settings;
        self.generation += 1;
        self.rearm(now);
    }

    /// Drugs already on the prescription; applies from the next fetch.
    pub fn set_excluded_drugs(&mut self, excluded: BTreeSet<DrugId>) {
        self.excluded = excluded;
    }

    pub fn set_max_results(&mut self, max_results: u32) {
        self.max_results = max_results.max(1);
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
        self.refresh_visible();
    }

    pub fn set_filter(&mut self, filter: SuggestionFilter) {
        self.filter = filter;
        self.refresh_visible();
    }

    /// Unmount: the only cancellation point is the timer.
    pub fn shutdown(&mut self) {
        self.debounce.cancel();
    }

    // ── Time ──

    /// Advance to `now`: expire cosmetic state and, if the quiet period has
    /// elapsed, hand back the fetch to perform.
    pub fn poll(&mut self, now: Instant) -> Option<PendingFetch> {
        self.notifications.expire(now);
        if matches!(self.just_added, Some((_, until)) if now >= until) {
            self.just_added = None;
        }

        if !self.debounce.fire_if_due(now) {
            return None;
        }
        let patient_id = self.patient?;
        let term = self.term.trim().to_string();

        let ticket = QueryTicket {
            generation: self.generation,
            patient_id,
            term: term.clone(),
        };
        let query = SearchQuery {
            term,
            patient_id,
            excluded_drug_ids: self.excluded.clone(),
            max_results: self.max_results,
            settings: self.settings,
        };
        self.phase = SearchPhase::Loading;
        tracing::debug!(
            generation = ticket.generation,
            term = %ticket.term,
            patient_id = %patient_id,
            "Suggestion fetch fired"
        );
        Some(PendingFetch { ticket, query })
    }

    /// Earliest instant at which `poll` has something to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.debounce.deadline(),
            self.just_added.map(|(_, until)| until),
            self.notifications.active().iter().map(|n| n.expires_at).min(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    // ── Completions ──

    pub fn is_current(&self, ticket: &QueryTicket) -> bool {
        ticket.generation == self.generation
            && Some(ticket.patient_id) == self.patient
            && ticket.term == self.term.trim()
    }

    /// Apply a suggestions response. Returns `false` if it was superseded.
    pub fn on_suggestions_loaded(
        &mut self,
        ticket: &QueryTicket,
        result: Result<Vec<Suggestion>, ApiError>,
        now: Instant,
    ) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(
                generation = ticket.generation,
                current = self.generation,
                "Discarding superseded suggestion response"
            );
            return false;
        }

        match result {
            Ok(items) if items.is_empty() => {
                self.response.clear();
                self.visible.clear();
                self.error = None;
                self.phase = SearchPhase::Empty;
            }
            Ok(items) => {
                let count = items.len();
                self.response = items;
                self.refresh_visible();
                self.error = None;
                self.phase = SearchPhase::Ready;
                tracing::info!(count, term = %ticket.term, "Suggestions loaded");
                self.notifications.push(
                    NotificationKind::Success,
                    format!("Found {count} medication suggestions"),
                    now,
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "Suggestion fetch failed");
                let message = e
                    .server_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| FETCH_FAILED.to_string());
                self.response.clear();
                self.visible.clear();
                self.phase = SearchPhase::Failed;
                self.notifications
                    .push(NotificationKind::Error, message.clone(), now);
                self.error = Some(message);
            }
        }
        self.drop_unlisted_confirmation();
        true
    }

    /// Apply a condition-analysis response. Failures are not surfaced.
    pub fn on_analysis_loaded(
        &mut self,
        ticket: &QueryTicket,
        result: Result<serde_json::Value, ApiError>,
    ) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(generation = ticket.generation, "Discarding superseded analysis");
            return false;
        }
        match result {
            Ok(analysis) => self.analysis = Some(analysis),
            Err(e) => {
                tracing::warn!(error = %e, "Condition analysis failed");
                self.analysis = None;
            }
        }
        true
    }

    // ── Adding ──

    pub fn request_add(&mut self, id: DrugId, now: Instant) -> Result<AddOutcome, SearchError> {
        let suggestion = self
            .visible
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(SearchError::UnknownSuggestion(id))?;

        if suggestion.needs_confirmation() {
            tracing::info!(drug = %suggestion.name, "Contraindicated suggestion held for confirmation");
            self.notifications.push(
                NotificationKind::Warning,
                format!(
                    "{} is contraindicated for this patient. Confirm to add it anyway.",
                    suggestion.name
                ),
                now,
            );
            self.gate.hold(suggestion);
            return Ok(AddOutcome::PendingConfirmation);
        }

        Ok(AddOutcome::Added(self.commit_add(&suggestion, now)))
    }

    pub fn confirm_pending(&mut self, now: Instant) -> Result<MedicationLine, SearchError> {
        let suggestion = self.gate.confirm().ok_or(SearchError::NothingPending)?;
        tracing::info!(drug = %suggestion.name, "Contraindication overridden by prescriber");
        Ok(self.commit_add(&suggestion, now))
    }

    pub fn cancel_pending(&mut self) -> Option<Suggestion> {
        self.gate.cancel()
    }

    fn commit_add(&mut self, suggestion: &Suggestion, now: Instant) -> MedicationLine {
        let line = to_medication_line(suggestion);
        (self.on_add)(line.clone());
        self.just_added = Some((suggestion.id, now + config::JUST_ADDED_WINDOW));
        self.notifications.push(
            NotificationKind::Success,
            format!("{} added to prescription", suggestion.name),
            now,
        );
        line
    }

    // ── Accessors ──

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn is_typing(&self) -> bool {
        self.phase == SearchPhase::Typing
    }

    pub fn is_loading(&self) -> bool {
        self.phase == SearchPhase::Loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn patient(&self) -> Option<PatientId> {
        self.patient
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.visible
    }

    pub fn analysis(&self) -> Option<&serde_json::Value> {
        self.analysis.as_ref()
    }

    pub fn pending_confirmation(&self) -> Option<&Suggestion> {
        self.gate.pending()
    }

    pub fn just_added(&self) -> Option<DrugId> {
        self.just_added.map(|(id, _)| id)
    }

    pub fn notifications(&self) -> &[Notification] {
        self.notifications.active()
    }

    pub fn view(&self) -> SearchView {
        SearchView {
            term: self.term.clone(),
            patient_id: self.patient,
            phase: self.phase,
            error: self.error.clone(),
            suggestions: self.visible.clone(),
            sort: self.sort,
            analysis: self.analysis.clone(),
            pending_confirmation: self.gate.pending().cloned(),
            just_added: self.just_added(),
            notifications: self.notifications.active().to_vec(),
        }
    }

    // ── Internals ──

    fn term_is_searchable(&self) -> bool {
        self.term.trim().chars().count() >= config::MIN_SEARCH_TERM_CHARS
    }

    fn rearm(&mut self, now: Instant) {
        if self.term_is_searchable() && self.patient.is_some() {
            self.debounce.schedule(now);
            self.phase = SearchPhase::Typing;
        } else {
            self.debounce.cancel();
            self.phase = SearchPhase::Idle;
        }
    }

    fn clear_results(&mut self) {
        self.response.clear();
        self.visible.clear();
        self.analysis = None;
        self.error = None;
    }

    /// A held suggestion only stays pending while it is still listed.
    fn drop_unlisted_confirmation(&mut self) {
        let Some(held) = self.gate.pending().map(|s| s.id) else {
            return;
        };
        if !self.visible.iter().any(|s| s.id == held) {
            self.gate.cancel();
            tracing::debug!(drug_id = %held, "Pending confirmation dropped with its list");
        }
    }

    fn refresh_visible(&mut self) {
        self.visible = sorting::arrange(&self.response, self.sort, &self.filter);
    }
}
