//! Common error type definitions.

use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
///
/// This type is used as the source error in [`Error`], providing a way to wrap
/// any error that implements the standard `Error` trait while keeping the
/// Send and Sync bounds required by the async request handlers.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors that can occur in slot-filling operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request was malformed: missing text, mismatched candidate lists.
    InvalidInput,
    /// The model failed or produced output that cannot be decoded.
    Inference,
    /// The model could not be loaded at startup.
    Startup,
    /// A configuration value or a label table is invalid.
    Configuration,
    /// Network-related error while talking to the model.
    NetworkError,
    /// The model did not answer in time.
    Timeout,
    /// Serialization/deserialization error.
    Serialization,
}

/// A structured error type for slot-filling operations.
#[derive(Debug, Error)]
#[error("{kind:?}{}", message.as_ref().map(|m| format!(": {}", m)).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional error message.
    pub message: Option<String>,
    /// Optional source error.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds a source error to this error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Creates a new invalid input (validation) error.
    pub fn invalid_input() -> Self {
        Self::new(ErrorKind::InvalidInput)
    }

    /// Creates a new inference error.
    pub fn inference() -> Self {
        Self::new(ErrorKind::Inference)
    }

    /// Creates a new startup error.
    pub fn startup() -> Self {
        Self::new(ErrorKind::Startup)
    }

    /// Creates a new configuration error.
    pub fn configuration() -> Self {
        Self::new(ErrorKind::Configuration)
    }

    /// Creates a new network error.
    pub fn network_error() -> Self {
        Self::new(ErrorKind::NetworkError)
    }

    /// Creates a new timeout error.
    pub fn timeout() -> Self {
        Self::new(ErrorKind::Timeout)
    }

    /// Creates a new serialization error.
    pub fn serialization() -> Self {
        Self::new(ErrorKind::Serialization)
    }

    /// Returns the message, or an empty string.
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }

    /// Returns true if this is a client error (4xx equivalent).
    pub fn is_client_error(&self) -> bool {
        matches!(self.kind, ErrorKind::InvalidInput)
    }

    /// Returns true if this is a server error (5xx equivalent).
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }

    /// Returns true if the error happened while the model was being loaded.
    pub fn is_startup_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Startup | ErrorKind::Configuration)
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization()
            .with_message(error.to_string())
            .with_source(error)
    }
}
