//! Runs a `SuggestionSearchController` on tokio against a `ClinicApi`.
//!
//! One task owns the controller. UI input arrives as `SearchEvent`s, fetch
//! results come back on an internal channel, and every turn of the loop
//! publishes a fresh `SearchView` on a watch channel.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::{
    PendingFetch, QueryTicket, SearchSettings, SearchView, SuggestionFilter,
    SuggestionSearchController,
};
use crate::api::{ApiError, ClinicApi};
use crate::models::{DrugId, PatientId, SortKey, Suggestion};

/// Input from the panel.
#[derive(Debug, Clone)]
pub enum SearchEvent {
    TermChanged(String),
    PatientSelected(Option<PatientId>),
    SettingsChanged(SearchSettings),
    ExcludedDrugs(BTreeSet<DrugId>),
    MaxResults(u32),
    SortChanged(SortKey),
    FilterChanged(SuggestionFilter),
    AddRequested(DrugId),
    ConfirmPending,
    CancelPending,
    /// Unmount. Pending timers are cancelled and late responses ignored.
    Shutdown,
}

enum Completion {
    Suggestions(QueryTicket, Result<Vec<Suggestion>, ApiError>),
    Analysis(QueryTicket, Result<serde_json::Value, ApiError>),
}

pub struct SearchHandle {
    events: mpsc::UnboundedSender<SearchEvent>,
    view: watch::Receiver<SearchView>,
    task: JoinHandle<()>,
}

impl SearchHandle {
    /// Queue an event. Returns `false` once the loop has stopped.
    pub fn send(&self, event: SearchEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// Latest published snapshot.
    pub fn view(&self) -> SearchView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchView> {
        self.view.clone()
    }

    /// Stop the loop and wait for it to exit.
    pub async fn shutdown(self) {
        let _ = self.events.send(SearchEvent::Shutdown);
        if let Err(e) = self.task.await {
            tracing::error!("Suggestion search task failed: {e}");
        }
    }
}

/// Start the event loop for `controller`.
pub fn spawn_search(
    api: Arc<dyn ClinicApi>,
    controller: SuggestionSearchController,
) -> SearchHandle {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (view_tx, view_rx) = watch::channel(controller.view());
    let task = tokio::spawn(run(api, controller, events_rx, view_tx));
    SearchHandle {
        events: events_tx,
        view: view_rx,
        task,
    }
}

/// Current time on tokio's clock, so paused-time tests drive the controller.
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
        None => std::future::pending::<()>().await,
    }
}

async fn run(
    api: Arc<dyn ClinicApi>,
    mut controller: SuggestionSearchController,
    mut events: mpsc::UnboundedReceiver<SearchEvent>,
    view: watch::Sender<SearchView>,
) {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion>();
    tracing::debug!("Suggestion search loop started");

    loop {
        let deadline = controller.next_deadline();
        tokio::select! {
            event = events.recv() => match event {
                None | Some(SearchEvent::Shutdown) => {
                    controller.shutdown();
                    break;
                }
                Some(event) => apply(&mut controller, event, now()),
            },
            Some(done) = done_rx.recv() => match done {
                Completion::Suggestions(ticket, result) => {
                    controller.on_suggestions_loaded(&ticket, result, now());
                }
                Completion::Analysis(ticket, result) => {
                    controller.on_analysis_loaded(&ticket, result);
                }
            },
            () = sleep_until(deadline) => {}
        }

        if let Some(fetch) = controller.poll(now()) {
            spawn_fetches(&api, fetch, &done_tx);
        }
        view.send_replace(controller.view());
    }

    view.send_replace(controller.view());
    tracing::debug!("Suggestion search loop stopped");
}

fn apply(controller: &mut SuggestionSearchController, event: SearchEvent, now: Instant) {
    match event {
        SearchEvent::TermChanged(term) => controller.on_search_term_changed(&term, now),
        SearchEvent::PatientSelected(patient) => controller.on_patient_selected(patient, now),
        SearchEvent::SettingsChanged(settings) => controller.on_settings_changed(settings, now),
        SearchEvent::ExcludedDrugs(ids) => controller.set_excluded_drugs(ids),
        SearchEvent::MaxResults(n) => controller.set_max_results(n),
        SearchEvent::SortChanged(key) => controller.set_sort(key),
        SearchEvent::FilterChanged(filter) => controller.set_filter(filter),
        SearchEvent::AddRequested(id) => {
            if let Err(e) = controller.request_add(id, now) {
                tracing::warn!("Add request ignored: {e}");
            }
        }
        SearchEvent::ConfirmPending => {
            if let Err(e) = controller.confirm_pending(now) {
                tracing::warn!("Confirm ignored: {e}");
            }
        }
        SearchEvent::CancelPending => {
            controller.cancel_pending();
        }
        SearchEvent::Shutdown => controller.shutdown(),
    }
}

/// Suggestions and condition analysis go out together and land independently.
fn spawn_fetches(
    api: &Arc<dyn ClinicApi>,
    fetch: PendingFetch,
    done: &mpsc::UnboundedSender<Completion>,
) {
    let PendingFetch { ticket, query } = fetch;
    let request = query.to_request();

    let suggestions_api = Arc::clone(api);
    let suggestions_done = done.clone();
    let suggestions_ticket = ticket.clone();
    tokio::spawn(async move {
        let result = suggestions_api.fetch_suggestions(&request).await;
        let _ = suggestions_done.send(Completion::Suggestions(suggestions_ticket, result));
    });

    let analysis_api = Arc::clone(api);
    let analysis_done = done.clone();
    tokio::spawn(async move {
        let result = analysis_api.analyze_condition(&ticket.term).await;
        let _ = analysis_done.send(Completion::Analysis(ticket, result));
    });
}
