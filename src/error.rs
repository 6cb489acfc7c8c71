use serde::{Deserialize, Serialize};

/// Main client error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The backend answered `success: false` with an explanation.
    #[error("{0}")]
    Rejected(String),

    #[error("Authentication required: {0}")]
    Unauthorized(String),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Local storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Shown when a call needs a session and none is usable.
pub const SIGN_IN_REQUIRED: &str = "Please sign in to continue";

/// Error body returned by the backend on failure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl AppError {
    /// Message to put in front of a user.
    ///
    /// Backend rejections and sign-in prompts are shown verbatim; transport
    /// and decoding failures are replaced by `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Rejected(message) | Self::Unauthorized(message) => message.clone(),
            _ => fallback.to_string(),
        }
    }

    /// The caller should be sent to the login page.
    pub fn requires_sign_in(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            AppError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            AppError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decode(err.to_string())
    }
}

/// Custom result type for the client
pub type AppResult<T> = Result<T, AppError>;
