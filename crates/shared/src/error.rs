use thiserror::Error;

/// Failure kinds surfaced by the machine store contract.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing medium cannot be reached or read (connection refused,
    /// timeout, unreadable database file).
    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    /// The backend rejected or failed a request (failing insert/update/
    /// delete, non-success response, corrupt stored payload).
    #[error("backend request failed: {message}")]
    Backend { message: String },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}
