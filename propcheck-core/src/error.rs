//! Error types for propcheck property-based testing.

use thiserror::Error;

/// Main error type for propcheck.
#[derive(Error, Debug)]
pub enum PropcheckError {
    /// A checked condition failed; carries the minimized input.
    #[error("Property '{label}' failed for input:\n{value}")]
    PropertyFailed { label: String, value: String },

    /// The minimized input no longer reproduced the failure on replay.
    #[error("Shrinking replay could not reproduce the failure")]
    NondeterministicProperty,

    /// A filtered generator ran out of attempts.
    #[error("Generator exhausted after {attempts} attempts without a satisfying value")]
    GeneratorExhausted { attempts: usize },

    /// An arbitrary for this type is already in the registry.
    #[error("An arbitrary for `{type_name}` is already registered")]
    AlreadyRegistered { type_name: &'static str },

    /// No arbitrary is registered for this type.
    #[error("No arbitrary registered for `{type_name}`")]
    NotRegistered { type_name: &'static str },

    /// A combinator was called with unusable input.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A replayed draw did not match the type recorded for it.
    #[error("Replayed value for `{type_name}` does not match the recorded draw")]
    ReplayMismatch { type_name: &'static str },
}

impl PropcheckError {
    /// Build an [`PropcheckError::InvalidArgument`] from a message.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        PropcheckError::InvalidArgument {
            message: message.into(),
        }
    }
}

/// Result type for propcheck operations.
pub type Result<T> = std::result::Result<T, PropcheckError>;
