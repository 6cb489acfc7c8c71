use super::duration::DurationOutOfRange;
use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("workflow is not open")]
    Closed,
    #[error("action not available in the {0} step")]
    WrongStep(&'static str),
    #[error("plan {0} is not in the catalog")]
    UnknownPlan(i64),
    #[error(transparent)]
    InvalidDuration(#[from] DurationOutOfRange),
    #[error("a cost calculation is already in flight")]
    Busy,
    #[error("a payment is already being submitted")]
    SubmissionInFlight,
    /// The workflow was closed or moved on while the request was outstanding.
    #[error("response arrived for a workflow step that is no longer active")]
    Stale,
    /// Backend call failed; the same text is kept in the workflow state.
    #[error("{0}")]
    Request(String),
    /// No usable session; the caller should send the user to login.
    #[error("{0}")]
    Unauthenticated(String),
}

impl WorkflowError {
    /// Wrap a failed backend call, keeping sign-in failures distinct.
    pub(crate) fn from_request(err: &AppError, fallback: &str) -> Self {
        let message = err.user_message(fallback);
        if err.requires_sign_in() {
            WorkflowError::Unauthenticated(message)
        } else {
            WorkflowError::Request(message)
        }
    }
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Request(msg) => AppError::Rejected(msg),
            WorkflowError::Unauthenticated(msg) => AppError::Unauthorized(msg),
            WorkflowError::InvalidDuration(e) => AppError::BadRequest(e.to_string()),
            WorkflowError::UnknownPlan(id) => AppError::BadRequest(format!("Unknown plan {}", id)),
            other => AppError::Rejected(other.to_string()),
        }
    }
}
