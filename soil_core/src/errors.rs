//! # Error Types
//!
//! Structured error types for soil_core. Errors carry enough context for a
//! form front end to point at the offending field, and they serialize to JSON
//! so partial results can embed them instead of failing outright.
//!
//! ## Propagation
//!
//! - Grain-size and Atterberg analysis return `Err` on malformed input.
//! - Classification, compaction and stress results embed the error in the
//!   returned record, so the computable fields still reach the caller.
//!
//! ## Example
//!
//! ```rust
//! use soil_core::errors::{CalcError, CalcResult};
//!
//! fn validate_depth(z_m: f64) -> CalcResult<()> {
//!     if z_m <= 0.0 {
//!         return Err(CalcError::InvalidInput {
//!             field: "z".to_string(),
//!             value: z_m.to_string(),
//!             reason: "Depth must be positive".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for soil_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculation operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is out of range or physically meaningless
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// The selected method needs inputs that were not supplied
    #[error("Incomplete data for {method}: missing {} - {reason}", .missing.join(", "))]
    IncompleteData {
        method: String,
        missing: Vec<String>,
        reason: String,
    },

    /// Too few data points for a fit or regression
    #[error("Insufficient data: {provided} provided, {required} required - {reason}")]
    InsufficientData {
        required: usize,
        provided: usize,
        reason: String,
    },

    /// Evaluation point sits on a singularity of a closed-form solution
    #[error("Numeric singularity in {method}: {reason}")]
    NumericSingularity { method: String, reason: String },

    /// Calculation failed (degenerate fit, no bracket, etc.)
    #[error("Calculation failed: {calculation_type} - {reason}")]
    CalculationFailed {
        calculation_type: String,
        reason: String,
    },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an IncompleteData error
    pub fn incomplete_data<S: Into<String>>(
        method: impl Into<String>,
        missing: impl IntoIterator<Item = S>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::IncompleteData {
            method: method.into(),
            missing: missing.into_iter().map(Into::into).collect(),
            reason: reason.into(),
        }
    }

    /// Create an InsufficientData error
    pub fn insufficient_data(required: usize, provided: usize, reason: impl Into<String>) -> Self {
        CalcError::InsufficientData {
            required,
            provided,
            reason: reason.into(),
        }
    }

    /// Create a NumericSingularity error
    pub fn numeric_singularity(method: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::NumericSingularity {
            method: method.into(),
            reason: reason.into(),
        }
    }

    /// Create a CalculationFailed error
    pub fn calculation_failed(calculation_type: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::CalculationFailed {
            calculation_type: calculation_type.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True when the user can fix the problem by editing form fields.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CalcError::InvalidInput { .. }
                | CalcError::IncompleteData { .. }
                | CalcError::InsufficientData { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "VALIDATION_ERROR",
            CalcError::IncompleteData { .. } => "INCOMPLETE_DATA",
            CalcError::InsufficientData { .. } => "INSUFFICIENT_DATA",
            CalcError::NumericSingularity { .. } => "NUMERIC_SINGULARITY",
            CalcError::CalculationFailed { .. } => "CALCULATION_FAILED",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(e: serde_json::Error) -> Self {
        CalcError::SerializationError {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::invalid_input("total_mass_g", "-5", "Total mass must be positive");
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::invalid_input("z", "0", "Depth must be positive").error_code(), "VALIDATION_ERROR");
        assert_eq!(
            CalcError::incomplete_data("USCS", ["liquid_limit"], "plasticity needed").error_code(),
            "INCOMPLETE_DATA"
        );
        assert_eq!(
            CalcError::insufficient_data(3, 2, "parabola").error_code(),
            "INSUFFICIENT_DATA"
        );
    }

    #[test]
    fn test_incomplete_data_message_lists_fields() {
        let error = CalcError::incomplete_data("HRB", ["liquid_limit", "plastic_limit"], "PI needed");
        let msg = error.to_string();
        assert!(msg.contains("liquid_limit, plastic_limit"));
        assert!(error.is_input_error());
    }

    #[test]
    fn test_tagged_json_shape() {
        let error = CalcError::numeric_singularity("Boussinesq", "R = 0");
        let value = serde_json::to_value(&error).unwrap();
        assert_eq!(value["type"], "NumericSingularity");
        assert_eq!(value["details"]["method"], "Boussinesq");
        assert!(!error.is_input_error());
    }
}
