use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProgressError>;

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("fitness account login failed: {0}")]
    Auth(String),

    #[error("fitness data unavailable: {0}")]
    DataUnavailable(String),

    #[error("object storage failure: {0}")]
    Storage(String),

    #[error("progress log is malformed: {0}")]
    Malformed(#[from] csv::Error),

    #[error("chart rendering failed: {0}")]
    Render(String),

    #[error("email relay rejected the message: {0}")]
    Notify(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ProgressError {
    /// Short tag used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            ProgressError::Auth(_) => "auth",
            ProgressError::DataUnavailable(_) => "data_unavailable",
            ProgressError::Storage(_) | ProgressError::Malformed(_) => "storage",
            ProgressError::Render(_) => "render",
            ProgressError::Notify(_) => "notify",
            ProgressError::Config(_) => "config",
        }
    }
}
