use thiserror::Error;
use triage_core::SourceError;

#[derive(Debug, Error)]
pub enum AsanaError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl AsanaError {
    pub fn status(&self) -> Option<u16> {
        match self {
            AsanaError::Api { status, .. } => Some(*status),
            AsanaError::Http(e) => e.status().map(|s| s.as_u16()),
            AsanaError::InvalidResponse(_) => None,
        }
    }

    /// Only "service unavailable" is worth retrying.
    pub fn is_transient(&self) -> bool {
        self.status() == Some(503)
    }
}

impl From<AsanaError> for SourceError {
    fn from(e: AsanaError) -> Self {
        if e.is_transient() {
            SourceError::transient(e.to_string())
        } else {
            SourceError::other(e.to_string())
        }
    }
}
