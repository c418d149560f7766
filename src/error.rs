use thiserror::Error;

// Error types for offer computation and presentation
#[derive(Error, Debug)]
pub enum OfferError {
    // Details missing for the declared type, or a variant of the wrong kind
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    // Malformed input at the boundary (dates, ids, inverted ranges)
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl OfferError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, OfferError::Validation(_))
    }
}
