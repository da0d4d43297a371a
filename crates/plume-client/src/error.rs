use plume_types::validation::ValidationErrors;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Credentials or registration refused by the backend
    #[error("{message}")]
    Rejected { message: String },

    /// An authenticated request came back 401
    #[error("Your session has expired. Please log in again.")]
    SessionExpired,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Caught locally; no request was made
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Non-2xx, non-401 response
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl ClientError {
    pub fn storage(err: anyhow::Error) -> Self {
        Self::Storage(format!("{:#}", err))
    }

    /// Text suitable for a toast or inline message.
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth(e) => e.to_string(),
            Self::Validation(e) => e
                .errors
                .first()
                .map(|f| f.message.clone())
                .unwrap_or_else(|| "Please check the form and try again.".into()),
            Self::Server { message, .. } => message.clone(),
            Self::Network(_) => "Could not reach the server. Check your connection and try again.".into(),
            Self::Decode(_) => "The server sent an unexpected response.".into(),
            Self::Storage(_) => "Could not save local data.".into(),
        }
    }

    /// True for failures that ended the session.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::Auth(AuthError::SessionExpired))
    }
}

/// Generic message for a status the server did not explain.
pub fn fallback_message(status: u16) -> &'static str {
    match status {
        400 => "The request was invalid.",
        401 => "Invalid email or password.",
        403 => "You do not have permission to do that.",
        404 => "The requested item was not found.",
        409 => "That conflicts with existing data.",
        422 => "Some of the submitted data was rejected.",
        429 => "Too many requests. Please wait a moment and try again.",
        500..=599 => "Something went wrong on our side. Please try again.",
        _ => "The request failed. Please try again.",
    }
}
