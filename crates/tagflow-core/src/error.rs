use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("an automation run is already in progress")]
    AlreadyRunning,

    #[error("run declined by confirmation gate")]
    Declined,

    #[error("internal error: {0}")]
    Internal(String),
}
