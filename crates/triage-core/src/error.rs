use thiserror::Error;

#[derive(Debug, Error)]
pub enum TriageError {
    #[error("not configured: set token, workspace and initials")]
    NotConfigured,

    #[error("fetch failed: {0}")]
    FetchFailed(String),

    #[error("update failed: {0}")]
    UpdateFailed(String),

    #[error("invalid color: {0}")]
    InvalidColor(String),

    #[error("invalid view: {0}")]
    InvalidView(String),

    #[error("unknown config key '{0}': expected token, workspace or initials")]
    UnknownConfigKey(String),

    #[error("secret store error: {0}")]
    Secret(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, TriageError>;
