//! Aurora Error Types
//!
//! Centralized error handling for all Aurora components

use std::fmt;

/// Main error type for Aurora operations
#[derive(Debug)]
pub enum AuroraError {
    /// Generic error with message
    Generic(String),
    /// IO-related errors
    Io(std::io::Error),
    /// Serialization/deserialization errors
    Serde(serde_json::Error),
    /// Local storage errors
    Storage(String),
    /// Configuration errors
    Config(String),
    /// Remote key-value sync errors
    Sync(String),
    /// AI provider errors
    Ai(String),
    /// Rejected user input or a guarded mutation
    Validation(String),
    /// Referenced entity does not exist
    NotFound(String),
    /// Admin password missing or wrong
    Unauthorized,
}

impl fmt::Display for AuroraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuroraError::Generic(msg) => write!(f, "Aurora error: {}", msg),
            AuroraError::Io(err) => write!(f, "IO error: {}", err),
            AuroraError::Serde(err) => write!(f, "Serialization error: {}", err),
            AuroraError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AuroraError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AuroraError::Sync(msg) => write!(f, "Sync error: {}", msg),
            AuroraError::Ai(msg) => write!(f, "AI error: {}", msg),
            AuroraError::Validation(msg) => write!(f, "Invalid request: {}", msg),
            AuroraError::NotFound(what) => write!(f, "Not found: {}", what),
            AuroraError::Unauthorized => write!(f, "Unauthorized"),
        }
    }
}

impl std::error::Error for AuroraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuroraError::Io(err) => Some(err),
            AuroraError::Serde(err) => Some(err),
            _ => None,
        }
    }
}

impl AuroraError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AuroraError::Validation(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        AuroraError::NotFound(what.into())
    }

    pub fn ai(msg: impl Into<String>) -> Self {
        AuroraError::Ai(msg.into())
    }

    pub fn sync(msg: impl Into<String>) -> Self {
        AuroraError::Sync(msg.into())
    }

    /// Message without the variant prefix, used for log entries shown to the user
    pub fn message(&self) -> String {
        match self {
            AuroraError::Generic(msg)
            | AuroraError::Storage(msg)
            | AuroraError::Config(msg)
            | AuroraError::Sync(msg)
            | AuroraError::Ai(msg)
            | AuroraError::Validation(msg)
            | AuroraError::NotFound(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

/// Convenience result type for Aurora operations
pub type Result<T> = std::result::Result<T, AuroraError>;

// Implement From traits for common error types
impl From<std::io::Error> for AuroraError {
    fn from(err: std::io::Error) -> Self {
        AuroraError::Io(err)
    }
}

impl From<serde_json::Error> for AuroraError {
    fn from(err: serde_json::Error) -> Self {
        AuroraError::Serde(err)
    }
}

impl From<anyhow::Error> for AuroraError {
    fn from(err: anyhow::Error) -> Self {
        AuroraError::Generic(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_strips_prefix() {
        let err = AuroraError::ai("API Key 未配置");
        assert_eq!(err.message(), "API Key 未配置");
        assert_eq!(err.to_string(), "AI error: API Key 未配置");
        assert_eq!(AuroraError::Unauthorized.message(), "Unauthorized");
    }
}
