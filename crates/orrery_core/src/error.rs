//! Error types for simulation setup
//!
//! Validation happens once, when configs are parsed or a [`Simulation`] is
//! built. Stepping has no error path.
//!
//! [`Simulation`]: crate::Simulation

use thiserror::Error;

/// Errors surfaced by the simulation core.
///
/// Everything here is raised at setup time. A running `step` never fails.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid configuration: `{field}` = {value} ({reason})")]
    InvalidConfiguration {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl SimError {
    pub(crate) fn invalid(field: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidConfiguration {
            field,
            value,
            reason,
        }
    }

    /// Name of the rejected field, if this is a configuration error.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidConfiguration { field, .. } => Some(*field),
            Self::ConfigParse(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SimError>;

/// Require a strictly positive, finite value.
pub(crate) fn ensure_positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::invalid(field, value, "must be positive and finite"))
    }
}

/// Require a non-negative, finite value.
pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::invalid(field, value, "must be non-negative and finite"))
    }
}

pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimError::invalid(field, value, "must be finite"))
    }
}
