//! # Workflow Error Type
//!
//! What a dialog, a list or a stock form shows when something fails.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Dashboard                          │
//! │                                                                         │
//! │  save() / confirm_delete() / load()                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Draft invalid? ──── ValidationReport ──────► Failure::Validation      │
//! │         │                                     inline, next to fields    │
//! │         ▼                                                               │
//! │  Backend said no? ── ApiError::Remote ──────► Failure::Remote          │
//! │         │            (message verbatim)       on the open dialog        │
//! │         │            ApiError::Unauthorized ► "Sessione scaduta..."     │
//! │         ▼                                                               │
//! │  Anything else? ──── transport, decode ─────► Failure::Unknown         │
//! │                      logged with error!       generic message           │
//! │                                                                         │
//! │  Busy / NoDialog / UnknownProduct ──────────► Failure::Rejected        │
//! │  (the call was ignored, nothing changed)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is fatal: every error is scoped to the one operation that
//! produced it and leaves prior state intact.

use thiserror::Error;

use stockflow_api::ApiError;
use stockflow_core::ValidationReport;

pub const SAVE_FAILED: &str = "Errore durante il salvataggio.";
pub const DELETE_FAILED: &str = "Errore durante l'eliminazione.";
pub const LOAD_FAILED: &str = "Errore durante il caricamento.";
pub const SESSION_EXPIRED: &str = "Sessione scaduta. Effettua di nuovo l'accesso.";
pub const LOGIN_FAILED: &str = "Credenziali non valide.";

/// Result type alias for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// The operation that failed, which picks the generic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Load,
    Save,
    Delete,
    Login,
}

impl Action {
    pub fn generic_message(&self) -> &'static str {
        match self {
            Action::Load => LOAD_FAILED,
            Action::Save | Action::Login => SAVE_FAILED,
            Action::Delete => DELETE_FAILED,
        }
    }
}

/// How a failure is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Inline field errors or a form banner; never a toast.
    Validation,
    /// Backend message, shown verbatim.
    Remote,
    /// Generic message; details only in the log.
    Unknown,
    /// The call was refused by the controller and had no effect.
    Rejected,
}

/// Error returned by workflow controllers and the stock editor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkflowError {
    #[error("{0}")]
    Validation(ValidationReport),

    #[error("{message}")]
    Remote { status: u16, message: String },

    #[error("{0}")]
    Unknown(String),

    /// A submission is already in flight.
    #[error("Operazione già in corso.")]
    Busy,

    /// The operation needs a dialog that is not open.
    #[error("Nessuna finestra aperta.")]
    NoDialog,

    #[error("Prodotto sconosciuto: {0}")]
    UnknownProduct(String),
}

impl WorkflowError {
    /// Maps a collaborator error for `action` and logs it.
    ///
    /// Remote messages pass through untouched; anything unexpected is
    /// replaced by the generic message of the action.
    pub fn from_api(err: &ApiError, action: Action) -> Self {
        match err {
            ApiError::Remote { status, message } => {
                tracing::warn!(status = *status, message = %message, ?action, "Backend rejected operation");
            }
            ApiError::Unauthorized => tracing::warn!(?action, "Not authenticated"),
            other => tracing::error!(error = %other, ?action, "Unexpected failure"),
        }
        Self::classify(err, action)
    }

    /// Same mapping as [`WorkflowError::from_api`] without logging, for
    /// errors a store has already reported.
    pub fn classify(err: &ApiError, action: Action) -> Self {
        match err {
            ApiError::Remote { status, message } => WorkflowError::Remote {
                status: *status,
                message: message.clone(),
            },
            ApiError::Unauthorized => {
                let message = if action == Action::Login {
                    LOGIN_FAILED
                } else {
                    SESSION_EXPIRED
                };
                WorkflowError::Remote {
                    status: 401,
                    message: message.to_string(),
                }
            }
            _ => WorkflowError::Unknown(action.generic_message().to_string()),
        }
    }

    pub fn failure(&self) -> Failure {
        match self {
            WorkflowError::Validation(_) => Failure::Validation,
            WorkflowError::Remote { .. } => Failure::Remote,
            WorkflowError::Unknown(_) => Failure::Unknown,
            WorkflowError::Busy | WorkflowError::NoDialog | WorkflowError::UnknownProduct(_) => {
                Failure::Rejected
            }
        }
    }

    /// The validation report, for inline display.
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            WorkflowError::Validation(report) => Some(report),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_message_is_verbatim() {
        let err = WorkflowError::from_api(&ApiError::remote(409, "warehouse has stock"), Action::Delete);
        assert_eq!(err.to_string(), "warehouse has stock");
        assert_eq!(err.failure(), Failure::Remote);
    }

    #[test]
    fn test_unexpected_errors_become_generic() {
        let err = WorkflowError::from_api(&ApiError::InvalidResponse("eof".into()), Action::Save);
        assert_eq!(err, WorkflowError::Unknown(SAVE_FAILED.into()));
        assert_eq!(err.failure(), Failure::Unknown);

        let err = WorkflowError::from_api(&ApiError::InvalidResponse("eof".into()), Action::Delete);
        assert_eq!(err.to_string(), "Errore durante l'eliminazione.");

        let err = WorkflowError::from_api(&ApiError::InvalidResponse("eof".into()), Action::Load);
        assert_eq!(err.to_string(), LOAD_FAILED);
    }

    #[test]
    fn test_unauthorized_depends_on_action() {
        let err = WorkflowError::from_api(&ApiError::Unauthorized, Action::Save);
        assert_eq!(err.to_string(), SESSION_EXPIRED);

        let err = WorkflowError::from_api(&ApiError::Unauthorized, Action::Login);
        assert_eq!(err.to_string(), LOGIN_FAILED);
    }

    #[test]
    fn test_classify_matches_from_api() {
        let errors = [
            ApiError::remote(422, "code taken"),
            ApiError::Unauthorized,
            ApiError::InvalidResponse("eof".into()),
        ];
        for err in &errors {
            for action in [Action::Load, Action::Save, Action::Delete, Action::Login] {
                assert_eq!(
                    WorkflowError::classify(err, action),
                    WorkflowError::from_api(err, action)
                );
            }
        }
    }

    #[test]
    fn test_guards_are_rejections() {
        assert_eq!(WorkflowError::Busy.failure(), Failure::Rejected);
        assert_eq!(WorkflowError::NoDialog.failure(), Failure::Rejected);
        assert!(WorkflowError::Busy.report().is_none());
    }
}
