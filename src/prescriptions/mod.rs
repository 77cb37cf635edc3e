//! Prescription list screen: reference data, table state, and the
//! create/edit form lifecycle.

pub mod form;
pub mod table;

pub use form::{to_iso_date, FormError, FormField, PrescriptionFormState};
pub use table::TableState;

use std::time::Instant;

use serde::Serialize;

use crate::allergy_check;
use crate::api::{ApiError, ClinicApi, SavedPrescription};
use crate::config;
use crate::models::{Drug, Patient, Prescription, PrescriptionId};
use crate::notifications::{Notification, NotificationKind, Notifications};
use crate::suggestions::MedicationLine;

const SAVE_FAILED: &str = "Failed to save prescription";
const CONFLICT_REPORTED: &str = "Allergy conflict reported for this patient and drug";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "id", rename_all = "lowercase")]
pub enum FormMode {
    New,
    Edit(PrescriptionId),
}

/// An open create/edit dialog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenForm {
    pub mode: FormMode,
    pub draft: PrescriptionFormState,
    /// Validation or server error shown inside the dialog.
    pub error: Option<String>,
    /// Advisory allergy warning for the selected patient and drug.
    pub allergy_warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Saved(SavedPrescription),
    /// The server refused or could not be reached; the form stays open.
    Failed(String),
}

pub struct PrescriptionListController {
    prescriptions: Vec<Prescription>,
    patients: Vec<Patient>,
    drugs: Vec<Drug>,
    load_error: Option<String>,
    table: TableState,
    form: Option<OpenForm>,
    /// Allergy verdict from the last successful save.
    saved_warning: Option<String>,
    notifications: Notifications,
}

impl Default for PrescriptionListController {
    fn default() -> Self {
        Self::new()
    }
}

impl PrescriptionListController {
    pub fn new() -> Self {
        Self {
            prescriptions: Vec::new(),
            patients: Vec::new(),
            drugs: Vec::new(),
            load_error: None,
            table: TableState::default(),
            form: None,
            saved_warning: None,
            notifications: Notifications::new(config::NOTIFICATION_TTL),
        }
    }

    // ═══════════════════════════════════════════
    // Reference data
    // ═══════════════════════════════════════════

    /// Fetch patients, drugs and prescriptions together. A failed list keeps
    /// its previous contents and sets the banner.
    pub async fn load(&mut self, api: &dyn ClinicApi) {
        let (patients, drugs, prescriptions) = tokio::join!(
            api.list_patients(),
            api.list_drugs(),
            api.list_prescriptions()
        );

        let mut failures = Vec::new();
        match patients {
            Ok(items) => self.patients = items,
            Err(e) => failures.push(("patients", e)),
        }
        match drugs {
            Ok(items) => self.drugs = items,
            Err(e) => failures.push(("drugs", e)),
        }
        match prescriptions {
            Ok(items) => self.prescriptions = items,
            Err(e) => failures.push(("prescriptions", e)),
        }

        self.load_error = if failures.is_empty() {
            tracing::info!(
                patients = self.patients.len(),
                drugs = self.drugs.len(),
                prescriptions = self.prescriptions.len(),
                "Reference data loaded"
            );
            None
        } else {
            for (what, e) in &failures {
                tracing::warn!(list = *what, error = %e, "Failed to load list");
            }
            let names: Vec<&str> = failures.iter().map(|(what, _)| *what).collect();
            Some(format!("Failed to load {}", names.join(", ")))
        };
    }

    async fn refresh_prescriptions(&mut self, api: &dyn ClinicApi) {
        match api.list_prescriptions().await {
            Ok(items) => self.prescriptions = items,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to refresh prescriptions");
                self.load_error = Some("Failed to load prescriptions".into());
            }
        }
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn prescriptions(&self) -> &[Prescription] {
        &self.prescriptions
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn drugs(&self) -> &[Drug] {
        &self.drugs
    }

    // ═══════════════════════════════════════════
    // Table
    // ═══════════════════════════════════════════

    pub fn table(&self) -> &TableState {
        &self.table
    }

    pub fn set_search(&mut self, text: &str) {
        self.table.set_search(text);
    }

    pub fn filtered_rows(&self) -> Vec<&Prescription> {
        self.table.filter(&self.prescriptions)
    }

    pub fn visible_rows(&self) -> Vec<&Prescription> {
        self.table.page_of(&self.prescriptions)
    }

    pub fn page_count(&self) -> usize {
        self.table.page_count(&self.prescriptions)
    }

    pub fn set_page(&mut self, page: usize) {
        self.table.set_page(page);
    }

    pub fn set_rows_per_page(&mut self, rows: usize) {
        self.table.set_rows_per_page(rows);
    }

    pub fn toggle_expanded(&mut self, id: PrescriptionId) -> bool {
        self.table.toggle_expanded(id)
    }

    // ═══════════════════════════════════════════
    // Form
    // ═══════════════════════════════════════════

    pub fn form(&self) -> Option<&OpenForm> {
        self.form.as_ref()
    }

    pub fn open_new(&mut self) {
        self.form = Some(OpenForm {
            mode: FormMode::New,
            draft: PrescriptionFormState::default(),
            error: None,
            allergy_warning: None,
        });
    }

    /// Open `id` for editing. Returns `false` if it is not in the list.
    pub fn open_edit(&mut self, id: PrescriptionId) -> bool {
        let Some(p) = self.prescriptions.iter().find(|p| p.id == id) else {
            tracing::warn!(prescription_id = %id, "Edit requested for unknown prescription");
            return false;
        };
        if p.medications.len() > 1 {
            tracing::debug!(
                prescription_id = %id,
                lines = p.medications.len(),
                "Editing first medication line only"
            );
        }
        let draft = PrescriptionFormState::from_prescription(p);
        let allergy_warning = self.advisory_warning(&draft);
        self.form = Some(OpenForm {
            mode: FormMode::Edit(id),
            draft,
            error: None,
            allergy_warning,
        });
        true
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    pub fn update_field(
        &mut self,
        field: FormField,
        value: impl Into<String>,
    ) -> Result<(), FormError> {
        let mut form = self.form.take().ok_or(FormError::NoDraft)?;
        form.draft.set(field, value);
        if matches!(field, FormField::PatientId | FormField::DrugId) {
            form.allergy_warning = self.advisory_warning(&form.draft);
        }
        self.form = Some(form);
        Ok(())
    }

    /// Copy a line from the suggestion panel into the open draft.
    pub fn apply_line(&mut self, line: &MedicationLine) -> Result<(), FormError> {
        let mut form = self.form.take().ok_or(FormError::NoDraft)?;
        form.draft.apply_line(line);
        form.allergy_warning = self.advisory_warning(&form.draft);
        self.form = Some(form);
        Ok(())
    }

    fn advisory_warning(&self, draft: &PrescriptionFormState) -> Option<String> {
        let patient = draft
            .patient()
            .and_then(|id| self.patients.iter().find(|p| p.id == id));
        let drug = draft
            .drug()
            .and_then(|id| self.drugs.iter().find(|d| d.id == id));
        allergy_check::check(patient, drug)
    }

    /// Ask the server for its allergy verdict on the draft's patient and
    /// drug. A conflict with message text replaces the advisory warning; a
    /// conflict without text keeps it. Failures leave it untouched.
    pub async fn verify_allergy(&mut self, api: &dyn ClinicApi) -> Result<(), FormError> {
        let (patient, drug) = {
            let form = self.form.as_ref().ok_or(FormError::NoDraft)?;
            let patient = form
                .draft
                .patient()
                .ok_or(FormError::MissingField(FormField::PatientId))?;
            let drug = form
                .draft
                .drug()
                .ok_or(FormError::MissingField(FormField::DrugId))?;
            (patient, drug)
        };

        match api.check_allergy(patient, drug).await {
            Ok(response) => {
                if let Some(form) = self.form.as_mut() {
                    let advisory = form.allergy_warning.take();
                    form.allergy_warning = match response.summary() {
                        Some(text) => Some(text),
                        None if response.is_conflict() => {
                            advisory.or_else(|| Some(CONFLICT_REPORTED.to_string()))
                        }
                        None => advisory,
                    };
                }
            }
            Err(e) => tracing::warn!(error = %e, "Server allergy check failed"),
        }
        Ok(())
    }

    /// Allergy verdict the server attached to the last save.
    pub fn saved_warning(&self) -> Option<&str> {
        self.saved_warning.as_deref()
    }

    /// Validate, send and, on success, refetch and close.
    ///
    /// Validation problems are returned as `Err` and also stored on the form;
    /// nothing is sent. Server failures come back as `SubmitOutcome::Failed`.
    pub async fn submit(
        &mut self,
        api: &dyn ClinicApi,
        now: Instant,
    ) -> Result<SubmitOutcome, FormError> {
        let form = self.form.as_mut().ok_or(FormError::NoDraft)?;
        let payload = match form.draft.to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::debug!(error = %e, "Prescription form invalid");
                form.error = Some(e.to_string());
                return Err(e);
            }
        };
        form.error = None;
        let mode = form.mode;
        let advisory = form.allergy_warning.clone();

        let result = match mode {
            FormMode::New => api.create_prescription(&payload).await,
            FormMode::Edit(id) => api.update_prescription(id, &payload).await,
        };

        match result {
            Ok(saved) => {
                tracing::info!(
                    patient_id = %payload.patient,
                    prescription_id = ?saved.id,
                    "Prescription saved"
                );
                self.saved_warning = saved.allergy_warning.clone().or(advisory);
                if let Some(warning) = &self.saved_warning {
                    self.notifications
                        .push(NotificationKind::Warning, warning.clone(), now);
                }
                let message = match mode {
                    FormMode::New => "Prescription created",
                    FormMode::Edit(_) => "Prescription updated",
                };
                self.notifications.push(NotificationKind::Success, message, now);
                self.form = None;
                self.refresh_prescriptions(api).await;
                Ok(SubmitOutcome::Saved(saved))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Prescription save failed");
                let message = save_error_message(&e);
                self.notifications
                    .push(NotificationKind::Error, message.clone(), now);
                if let Some(form) = self.form.as_mut() {
                    form.error = Some(message.clone());
                }
                Ok(SubmitOutcome::Failed(message))
            }
        }
    }

    // ═══════════════════════════════════════════
    // Notifications
    // ═══════════════════════════════════════════

    pub fn expire_notifications(&mut self, now: Instant) {
        self.notifications.expire(now);
    }

    pub fn notifications(&self) -> &[Notification] {
        self.notifications.active()
    }
}

fn save_error_message(e: &ApiError) -> String {
    e.joined_field_errors()
        .or_else(|| e.server_message().map(str::to_string))
        .unwrap_or_else(|| SAVE_FAILED.to_string())
}
