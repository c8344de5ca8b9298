//! # Entity Workflow
//!
//! The list page of one entity type: load, search, and the
//! add/edit/delete dialogs.
//!
//! ## Dialog State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Workflow<T> Dialogs                             │
//! │                                                                         │
//! │                  start_add()            save() ok                       │
//! │         ┌───────────────────► Adding ─────────────────┐                 │
//! │         │                       │ save() err          │                 │
//! │         │                       └──► stays open,      │                 │
//! │         │                            report/form_error│                 │
//! │       None ◄─────────────────── cancel() ─────────────┤                 │
//! │         │      start_edit(e)                          │                 │
//! │         ├───────────────────► Editing{id} ────────────┤                 │
//! │         │      start_delete(e)                        │                 │
//! │         └───────────────────► Deleting{target} ───────┘                 │
//! │                                 confirm_delete() ok                     │
//! │                                                                         │
//! │  While a submission is in flight every transition answers Busy.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation always runs against the store's current snapshot, so
//! uniqueness checks see records created moments ago. An invalid draft never
//! reaches the backend.

use tracing::{debug, error};

use crate::error::{Action, WorkflowError, WorkflowResult};
use super::Submitting;
use crate::state::EntityStore;
use stockflow_core::{search, Entity, ValidationReport};

/// Whether the list has been fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Ready,
}

/// Holds [`Phase::Loading`] and restores the previous phase on drop.
struct Loading<'a> {
    phase: &'a mut Phase,
    previous: Phase,
}

impl<'a> Loading<'a> {
    fn begin(phase: &'a mut Phase) -> Self {
        let previous = std::mem::replace(phase, Phase::Loading);
        Loading { phase, previous }
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        *self.phase = self.previous;
    }
}

/// The dialog currently open over the list.
#[derive(Debug, Clone, PartialEq)]
pub enum Dialog<T> {
    None,
    Adding,
    Editing { id: String },
    Deleting { target: T },
}

impl<T> Dialog<T> {
    pub fn is_open(&self) -> bool {
        !matches!(self, Dialog::None)
    }

    /// True for the add and edit forms.
    pub fn is_form(&self) -> bool {
        matches!(self, Dialog::Adding | Dialog::Editing { .. })
    }
}

/// Controller of one entity list and its dialogs.
pub struct Workflow<T: Entity> {
    store: EntityStore<T>,
    phase: Phase,
    load_error: Option<String>,
    dialog: Dialog<T>,
    draft: T::Draft,
    report: ValidationReport,
    form_error: Option<String>,
    submitting: bool,
    term: String,
}

impl<T: Entity> Workflow<T> {
    pub fn new(store: EntityStore<T>) -> Self {
        Workflow {
            store,
            phase: Phase::Idle,
            load_error: None,
            dialog: Dialog::None,
            draft: T::Draft::default(),
            report: ValidationReport::default(),
            form_error: None,
            submitting: false,
            term: String::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn store(&self) -> &EntityStore<T> {
        &self.store
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Message of the last failed load.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn dialog(&self) -> &Dialog<T> {
        &self.dialog
    }

    pub fn draft(&self) -> &T::Draft {
        &self.draft
    }

    /// Field and form errors of the last rejected save.
    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    /// Backend or unexpected error shown on the open dialog.
    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn search_term(&self) -> &str {
        &self.term
    }

    // =========================================================================
    // List
    // =========================================================================

    /// Fetches the list. A failure leaves the stale list visible with the
    /// error next to it.
    ///
    /// Dropping the future mid-request puts the phase back where it was.
    pub async fn load(&mut self) -> WorkflowResult<usize> {
        let result = {
            let _loading = Loading::begin(&mut self.phase);
            self.store.fetch_all().await
        };
        self.phase = Phase::Ready;

        match result {
            Ok(items) => {
                self.load_error = None;
                Ok(items.len())
            }
            Err(e) => {
                let err = WorkflowError::classify(&e, Action::Load);
                self.load_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub fn search(&mut self, term: &str) {
        self.term = term.to_string();
    }

    /// Records matching the search term, in list order.
    pub async fn visible(&self) -> Vec<T> {
        let items = self.store.items().await;
        search::filter(&items, &self.term)
            .into_iter()
            .cloned()
            .collect()
    }

    // =========================================================================
    // Dialogs
    // =========================================================================

    fn ensure_idle(&self) -> WorkflowResult<()> {
        if self.submitting {
            return Err(WorkflowError::Busy);
        }
        Ok(())
    }

    fn open(&mut self, dialog: Dialog<T>, draft: T::Draft) {
        self.dialog = dialog;
        self.draft = draft;
        self.report = ValidationReport::default();
        self.form_error = None;
    }

    fn close(&mut self) {
        self.open(Dialog::None, T::Draft::default());
    }

    /// Opens the add form with an empty draft.
    pub fn start_add(&mut self) -> WorkflowResult<()> {
        self.ensure_idle()?;
        self.open(Dialog::Adding, T::Draft::default());
        Ok(())
    }

    /// Opens the edit form prefilled from `entity`.
    pub fn start_edit(&mut self, entity: &T) -> WorkflowResult<()> {
        self.ensure_idle()?;
        self.open(
            Dialog::Editing {
                id: entity.id().to_string(),
            },
            entity.to_draft(),
        );
        Ok(())
    }

    /// Asks for confirmation before deleting `entity`.
    pub fn start_delete(&mut self, entity: &T) -> WorkflowResult<()> {
        self.ensure_idle()?;
        self.open(
            Dialog::Deleting {
                target: entity.clone(),
            },
            T::Draft::default(),
        );
        Ok(())
    }

    /// Changes the draft of the open form.
    pub fn edit_draft<F>(&mut self, change: F) -> WorkflowResult<()>
    where
        F: FnOnce(&mut T::Draft),
    {
        self.ensure_idle()?;
        if !self.dialog.is_form() {
            return Err(WorkflowError::NoDialog);
        }
        change(&mut self.draft);
        Ok(())
    }

    /// Closes the dialog without saving.
    pub fn cancel(&mut self) -> WorkflowResult<()> {
        self.ensure_idle()?;
        self.close();
        Ok(())
    }

    /// Validates the draft and creates or updates the record.
    ///
    /// ## Outcomes
    /// - invalid draft: report kept for inline display, no request
    /// - backend failure: dialog stays open with `form_error`
    /// - success: dialog closed, record in the list
    pub async fn save(&mut self) -> WorkflowResult<T> {
        self.ensure_idle()?;
        let editing_id = match &self.dialog {
            Dialog::Adding => None,
            Dialog::Editing { id } => Some(id.clone()),
            _ => return Err(WorkflowError::NoDialog),
        };

        let existing = self.store.items().await;
        let report = T::validate(&self.draft, &existing, editing_id.as_deref());
        if !report.is_valid() {
            debug!(entity = %T::KIND, errors = %report, "Draft rejected");
            self.report = report.clone();
            self.form_error = None;
            return Err(WorkflowError::Validation(report));
        }
        self.report = ValidationReport::default();

        let payload = match T::payload(&self.draft) {
            Ok(payload) => payload,
            Err(e) => {
                error!(entity = %T::KIND, error = %e, "Valid draft did not convert");
                let err = WorkflowError::Unknown(Action::Save.generic_message().to_string());
                self.form_error = Some(err.to_string());
                return Err(err);
            }
        };

        let store = self.store.clone();
        let result = {
            let _submitting = Submitting::begin(&mut self.submitting);
            match editing_id.as_deref() {
                None => store.create(&payload).await,
                Some(id) => store.update(id, &payload).await,
            }
        };

        match result {
            Ok(saved) => {
                debug!(entity = %T::KIND, id = %saved.id(), created = editing_id.is_none(), "Saved");
                self.close();
                Ok(saved)
            }
            Err(e) => {
                let err = WorkflowError::from_api(&e, Action::Save);
                self.form_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Deletes the record of the open delete dialog.
    ///
    /// On failure the dialog stays open and the list is unchanged.
    pub async fn confirm_delete(&mut self) -> WorkflowResult<()> {
        self.ensure_idle()?;
        let id = match &self.dialog {
            Dialog::Deleting { target } => target.id().to_string(),
            _ => return Err(WorkflowError::NoDialog),
        };

        let store = self.store.clone();
        let result = {
            let _submitting = Submitting::begin(&mut self.submitting);
            store.remove(&id).await
        };

        match result {
            Ok(()) => {
                debug!(entity = %T::KIND, id = %id, "Deleted");
                self.close();
                Ok(())
            }
            Err(e) => {
                let err = WorkflowError::from_api(&e, Action::Delete);
                self.form_error = Some(err.to_string());
                Err(err)
            }
        }
    }
}
