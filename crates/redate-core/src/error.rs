use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid object ID: {0}")]
    InvalidObjectId(String),
}
