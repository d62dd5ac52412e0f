// Typed classification errors.
//
// The transport layer turns every one of these into an in-band
// `{"error": message}` payload, so the Display text is what callers see.

use thiserror::Error;

use crate::fetch::FetchError;

#[derive(Debug, Error)]
pub enum ClassifyError {
    /// Neither text nor an image URL was supplied.
    #[error("Provide at least text or image_url")]
    InvalidInput,

    /// The image URL could not be fetched or decoded.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// An external model call failed.
    #[error("model inference failed: {0:#}")]
    Model(anyhow::Error),
}

impl ClassifyError {
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, ClassifyError::InvalidInput)
    }
}
