//! # Error Types
//!
//! Structured error types for envelope_core.
//!
//! Almost all user-correctable problems (a zero-width segment, a missing
//! glazing reference) are *not* errors: the calculators collect them as
//! warnings on the result and mark it invalid. A `ThermalError` is reserved
//! for conditions that indicate corrupted persisted data or a programming
//! fault, and should surface to the caller as a hard failure.
//!
//! ## Example
//!
//! ```rust
//! use envelope_core::errors::{ThermalError, ThermalResult};
//!
//! fn check_cavity_depth(depth_mm: f64) -> ThermalResult<()> {
//!     if depth_mm <= 0.0 {
//!         return Err(ThermalError::data_integrity(
//!             "steel stud cavity",
//!             "thickness_mm",
//!             "cavity depth must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for envelope_core operations
pub type ThermalResult<T> = Result<T, ThermalError>;

/// Structured error type for calculation operations.
///
/// Each variant provides specific context about what went wrong, enabling
/// programmatic handling by the API layer (e.g. mapping `DataIntegrity`
/// to a 5xx response rather than a validation message).
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum ThermalError {
    /// Required persisted data is structurally absent or nonsensical.
    ///
    /// This signals corrupted storage, not a user-editable validation issue.
    #[error("Data integrity violation in {entity}: '{field}' - {reason}")]
    DataIntegrity {
        entity: String,
        field: String,
        reason: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ThermalError {
    /// Create a DataIntegrity error
    pub fn data_integrity(
        entity: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ThermalError::DataIntegrity {
            entity: entity.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        ThermalError::Internal {
            message: message.into(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ThermalError::DataIntegrity { .. } => "DATA_INTEGRITY",
            ThermalError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ThermalError::data_integrity(
            "steel stud cavity",
            "material",
            "cavity insulation material is missing",
        );
        let msg = error.to_string();
        assert!(msg.contains("steel stud cavity"));
        assert!(msg.contains("material"));
    }

    #[test]
    fn test_error_serialization() {
        let error = ThermalError::data_integrity("layer", "thickness_mm", "must be positive");
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: ThermalError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ThermalError::data_integrity("a", "b", "c").error_code(),
            "DATA_INTEGRITY"
        );
        assert_eq!(ThermalError::internal("boom").error_code(), "INTERNAL_ERROR");
    }
}
