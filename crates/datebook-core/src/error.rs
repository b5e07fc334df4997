use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatebookError {
    #[error("Session expired (HTTP {status})")]
    AuthExpired { status: u16 },

    #[error("Not signed in")]
    Unauthenticated,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error(
        "Created {created} item(s) but could not remove {} of the originals: {}",
        failed.len(),
        failed.join(", ")
    )]
    PartialDelete {
        created: usize,
        deleted: usize,
        failed: Vec<String>,
    },

    #[error("Nothing selected")]
    EmptySelection,

    #[error("Already in progress: {0}")]
    Busy(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DatebookError {
    /// Errors that end the session instead of being reported locally.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthExpired { .. } | Self::Unauthenticated)
    }

    /// Maps an HTTP status onto the error taxonomy.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::AuthExpired { status },
            400 | 422 => Self::Validation(message),
            404 => Self::NotFound(message),
            _ => Self::Server { status, message },
        }
    }
}
