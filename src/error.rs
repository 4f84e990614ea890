use thiserror::Error;

/// Errors raised by the simulation core.
///
/// Clipping inside the physical models is never reported here; only structural
/// problems with configuration or input data abort a run.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    /// A site, module, inverter or loss parameter is outside its valid range,
    /// or a loss category lookup failed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The weather series violates the input contract (cadence, ordering,
    /// length, value ranges).
    #[error("Data error: {0}")]
    Data(String),

    /// A model was evaluated outside its domain and the result could not be
    /// recovered by clipping.
    #[error("Numeric domain error: {0}")]
    NumericDomain(String),
}

impl SimulationError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    pub fn numeric(msg: impl Into<String>) -> Self {
        Self::NumericDomain(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SimulationError>;

/// Check that `value` lies in the closed interval `[min, max]`.
pub(crate) fn ensure_range(name: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(SimulationError::config(format!(
            "{name} must be between {min} and {max}, got {value}"
        )));
    }
    Ok(())
}

/// Check that `value` is finite and strictly positive.
pub(crate) fn ensure_positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SimulationError::config(format!(
            "{name} must be positive, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_range() {
        assert!(ensure_range("tilt", 30.0, 0.0, 90.0).is_ok());
        assert!(ensure_range("tilt", 0.0, 0.0, 90.0).is_ok());
        assert!(ensure_range("tilt", 90.0, 0.0, 90.0).is_ok());
        assert!(ensure_range("tilt", 90.5, 0.0, 90.0).is_err());
        assert!(ensure_range("tilt", f64::NAN, 0.0, 90.0).is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = SimulationError::config("albedo must be between 0 and 1, got 2");
        assert_eq!(
            err.to_string(),
            "Configuration error: albedo must be between 0 and 1, got 2"
        );
        assert!(matches!(SimulationError::data("x"), SimulationError::Data(_)));
        assert!(ensure_positive("pdc0", 0.0).is_err());
        assert!(ensure_positive("pdc0", 1.0).is_ok());
    }
}
