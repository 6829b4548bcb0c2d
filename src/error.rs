use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecognizeError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No code region found in image")]
    NoRegionFound,

    #[error("Failed to initialize recognition engine: {0}")]
    InitializationError(String),

    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    #[error("Failed to write failure artifact: {0}")]
    ArtifactError(String),
}

impl RecognizeError {
    /// Whether this error is a caller contract violation that must be surfaced
    /// instead of being folded into an empty result.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, RecognizeError::InvalidArgument(_))
    }
}
