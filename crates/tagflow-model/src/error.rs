use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown insert position: {0}")]
    UnknownPosition(String),

    #[error("unknown jitter strategy: {0}")]
    UnknownJitter(String),

    #[error("invalid model: {0}")]
    Invalid(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
