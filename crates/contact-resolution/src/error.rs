//! Error types for contact resolution
//!
//! Resolution itself never fails; these errors cover loading contacts,
//! configuration, the message log and intent handling.

use thiserror::Error;

/// Main error type for contact resolution operations
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// Invalid input data or arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File access or I/O error
    #[error("File error: {0}")]
    FileError(String),

    /// Contact or history file parsing error
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A contact record failed load-time validation
    #[error("Invalid contact: {0}")]
    InvalidContact(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// No signed-in user is available to send messages
    #[error("User not authenticated")]
    NotAuthenticated,

    /// An intent reached its handler without the data its resolution
    /// step should have produced
    #[error("Missing intent data: {0}")]
    MissingIntentData(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ResolutionError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        ResolutionError::InvalidInput(msg.into())
    }

    /// Create a file error
    pub fn file_error(msg: impl Into<String>) -> Self {
        ResolutionError::FileError(msg.into())
    }

    /// Create a parse error
    pub fn parse_error(msg: impl Into<String>) -> Self {
        ResolutionError::ParseError(msg.into())
    }

    /// Create an invalid contact error
    pub fn invalid_contact(msg: impl Into<String>) -> Self {
        ResolutionError::InvalidContact(msg.into())
    }

    /// Create a missing intent data error
    pub fn missing_intent_data(msg: impl Into<String>) -> Self {
        ResolutionError::MissingIntentData(msg.into())
    }

    /// Check if this is a user-facing error (vs internal)
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ResolutionError::InvalidInput(_)
                | ResolutionError::FileError(_)
                | ResolutionError::ParseError(_)
                | ResolutionError::InvalidContact(_)
                | ResolutionError::NotAuthenticated
        )
    }
}

impl From<std::io::Error> for ResolutionError {
    fn from(err: std::io::Error) -> Self {
        ResolutionError::FileError(err.to_string())
    }
}

impl From<serde_json::Error> for ResolutionError {
    fn from(err: serde_json::Error) -> Self {
        ResolutionError::ParseError(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for ResolutionError {
    fn from(err: serde_yaml::Error) -> Self {
        ResolutionError::ParseError(format!("YAML error: {}", err))
    }
}

impl From<toml::de::Error> for ResolutionError {
    fn from(err: toml::de::Error) -> Self {
        ResolutionError::ParseError(format!("TOML error: {}", err))
    }
}

impl From<crate::telemetry::TelemetryError> for ResolutionError {
    fn from(err: crate::telemetry::TelemetryError) -> Self {
        ResolutionError::InternalError(err.to_string())
    }
}

/// Result type alias for contact resolution operations
pub type Result<T> = std::result::Result<T, ResolutionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ResolutionError::InvalidInput("test error".to_string());
        assert_eq!(err.to_string(), "Invalid input: test error");
        assert_eq!(
            ResolutionError::NotAuthenticated.to_string(),
            "User not authenticated"
        );
    }

    #[test]
    fn test_is_user_error() {
        assert!(ResolutionError::invalid_contact("record 0").is_user_error());
        assert!(ResolutionError::file_error("missing").is_user_error());
        assert!(!ResolutionError::missing_intent_data("content").is_user_error());
        assert!(!ResolutionError::InternalError("test".to_string()).is_user_error());
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(ResolutionError::from(io), ResolutionError::FileError(_)));
    }
}
