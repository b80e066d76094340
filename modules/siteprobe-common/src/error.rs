use ai_client::AiError;
use browserless_client::BrowserlessError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProbeError>;

#[derive(Error, Debug)]
pub enum ProbeError {
    /// Navigation, timeout, or rendering failure for the page as a whole.
    #[error("Failed to scrape website: {0}")]
    Extraction(String),

    #[error("Generation backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Generation backend error: {0}")]
    Backend(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unknown session: {0}")]
    UnknownSession(String),

    #[error("Session store error: {0}")]
    Store(String),
}

impl From<AiError> for ProbeError {
    fn from(err: AiError) -> Self {
        if err.is_unavailable() {
            ProbeError::BackendUnavailable(err.to_string())
        } else {
            ProbeError::Backend(err.to_string())
        }
    }
}

impl From<BrowserlessError> for ProbeError {
    fn from(err: BrowserlessError) -> Self {
        match err {
            BrowserlessError::Setup(msg) => ProbeError::Config(msg),
            other => ProbeError::Extraction(other.to_string()),
        }
    }
}
