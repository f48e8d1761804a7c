//! Error types for the path tracking controller

use crate::lifecycle::State;
use thiserror::Error;

/// Errors raised while configuring or hosting a path follower
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),

    #[error("{node}: cannot transition from {from:?} to {to:?}")]
    InvalidTransition { node: String, from: State, to: State },

    #[error("failed to load configuration: {0}")]
    Config(#[from] ::config::ConfigError),
}

pub type Result<T> = std::result::Result<T, ControllerError>;

/// Reject non-finite and non-positive values for a named parameter.
pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(ControllerError::InvalidParameter {
            name,
            value,
            reason: "must be finite",
        });
    }
    if value <= 0.0 {
        return Err(ControllerError::InvalidParameter {
            name,
            value,
            reason: "must be positive",
        });
    }
    Ok(value)
}
