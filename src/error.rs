//! Error types for analytic solves and simulation runs

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A single rejected input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Invalid input: {}", join(.0))]
    Validation(Vec<ValidationError>),

    #[error("System unstable for {model}: utilization {rho:.4} is not below 1")]
    Unstable { model: String, rho: f64 },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl QueueError {
    /// `Ok(())` for an empty list, otherwise every problem at once.
    pub fn from_validation(errors: Vec<ValidationError>) -> Result<(), Self> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self::Validation(errors))
        }
    }

    pub fn unstable(model: impl fmt::Display, rho: f64) -> Self {
        Self::Unstable {
            model: model.to_string(),
            rho,
        }
    }

    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::Validation(errors) => errors,
            _ => &[],
        }
    }
}
