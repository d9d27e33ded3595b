//! Error types module
//!
//! Every failure a caller can observe is folded into the closed `ClientError` set:
//! local validation, rejection by the remote authority, a resource that no longer
//! exists remotely, and transport failures (including unstructured error bodies).
//! Callers pattern-match on the variant and display `client_message()`.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for rejections reported by the remote authority
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for presenting an error - defines how it should be shown and logged
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "AUTH_ERROR")
    fn error_code(&self) -> &'static str;

    /// User-visible message
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Local admission and form failures. These never reach the gateway.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please select a file to upload.")]
    MissingFile,

    #[error("File size exceeds the limit of 10MB")]
    SizeExceeded { size: u64, limit: u64 },

    #[error("{0}")]
    InvalidInput(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Credentials or session rejected by the remote authority.
    #[error("{0}")]
    Auth(String),

    /// The referenced resource no longer exists remotely.
    #[error("{0}")]
    NotFound(String),

    /// Network failure or an error response without a structured body.
    #[error("{0}")]
    Transport(String),
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(err: validator::ValidationErrors) -> Self {
        ClientError::Validation(ValidationError::from(err))
    }
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = err
            .field_errors()
            .keys()
            .map(|k| k.to_string())
            .collect();
        fields.sort_unstable();
        ValidationError::InvalidInput(format!("Invalid {}", fields.join(", ")))
    }
}

impl ClientError {
    /// Get the error type name, matching the taxonomy names used in logs
    pub fn error_type(&self) -> &'static str {
        match self {
            ClientError::Validation(_) => "ValidationError",
            ClientError::Auth(_) => "AuthError",
            ClientError::NotFound(_) => "NotFoundError",
            ClientError::Transport(_) => "TransportError",
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ClientError::Auth(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }
}

impl ErrorMetadata for ClientError {
    fn error_code(&self) -> &'static str {
        match self {
            ClientError::Validation(ValidationError::MissingFile) => "MISSING_FILE",
            ClientError::Validation(ValidationError::SizeExceeded { .. }) => "SIZE_EXCEEDED",
            ClientError::Validation(ValidationError::InvalidInput(_)) => "INVALID_INPUT",
            ClientError::Auth(_) => "AUTH_ERROR",
            ClientError::NotFound(_) => "NOT_FOUND",
            ClientError::Transport(_) => "TRANSPORT_ERROR",
        }
    }

    fn client_message(&self) -> String {
        self.to_string()
    }

    fn log_level(&self) -> LogLevel {
        match self {
            ClientError::Validation(_) => LogLevel::Debug,
            ClientError::Auth(_) | ClientError::NotFound(_) => LogLevel::Warn,
            ClientError::Transport(_) => LogLevel::Error,
        }
    }
}
