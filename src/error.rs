use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(upnext::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(upnext::config))]
    Config(String),

    #[error("Calendar provider error: {0}")]
    #[diagnostic(code(upnext::provider))]
    Provider(String),

    #[error("Selection store error: {0}")]
    #[diagnostic(code(upnext::persistence))]
    Persistence(String),

    #[error("Date arithmetic error: {0}")]
    #[diagnostic(code(upnext::date_arithmetic))]
    DateArithmetic(String),

    #[error("Overlay error: {0}")]
    #[diagnostic(code(upnext::overlay))]
    Overlay(String),

    #[error(transparent)]
    #[diagnostic(code(upnext::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(upnext::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(upnext::other))]
    Other(String),
}

// Implement From for TOML serialization errors
impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Invalid environment variable: {}", var))
}

/// Helper to create configuration errors
#[allow(dead_code)]
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create calendar provider errors
pub fn provider_error(message: &str) -> Error {
    Error::Provider(message.to_string())
}

/// Helper to create selection store errors
pub fn persistence_error(message: &str) -> Error {
    Error::Persistence(message.to_string())
}

/// Helper to create date arithmetic errors
#[allow(dead_code)]
pub fn date_error(message: &str) -> Error {
    Error::DateArithmetic(message.to_string())
}

/// Helper to create overlay errors
pub fn overlay_error(message: &str) -> Error {
    Error::Overlay(message.to_string())
}
