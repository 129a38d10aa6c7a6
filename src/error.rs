use thiserror::Error;

#[derive(Error, Debug)]
pub enum OnboardingError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Invalid configuration for {key}: {message}")]
    InvalidConfig { key: String, message: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Payment service responded with status {status}: {body}")]
    ServiceStatus { status: u16, body: String },
    #[error("Invalid response from payment service: {0}")]
    InvalidResponse(String),
    #[error("Invalid transition: {event} is not allowed from {from}")]
    InvalidTransition { from: String, event: String },
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for OnboardingError {
    fn from(err: rocksdb::Error) -> Self {
        OnboardingError::InternalError(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, OnboardingError>;
