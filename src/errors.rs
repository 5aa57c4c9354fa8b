//! # Basket Error Types Module
//!
//! This module defines the error taxonomy used by the basket engine.
//! Only [`BasketError`] ever escapes the engine's top-level call; the other
//! errors are recovered locally and simply remove one candidate from
//! consideration.

use thiserror::Error;

/// Unit token could not be normalized
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    /// The token is not one of the recognized units
    #[error("Unrecognized unit: '{0}'")]
    Unrecognized(String),
}

/// Package count could not be computed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PackError {
    /// Required quantity is zero, negative or not a number
    #[error("Required quantity must be positive, got {0}")]
    NonPositiveRequired(f64),
    /// Package quantity is zero, negative or not a number
    #[error("Package quantity must be positive, got {0}")]
    NonPositivePackage(f64),
    /// The package count does not fit in the result type
    #[error("Package count overflow: {required} / {package}")]
    Overflow { required: f64, package: f64 },
}

/// Catalog field could not be parsed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Field is absent or blank
    #[error("Empty value")]
    Empty,
    /// Field does not follow the `<number> <unit>` shape
    #[error("Malformed quantity: '{0}'")]
    MalformedQuantity(String),
    /// Number part could not be read
    #[error("Invalid number: '{0}'")]
    InvalidNumber(String),
    /// Unit part is not a recognized unit
    #[error(transparent)]
    Unit(#[from] UnitError),
}

/// Hard errors that abort a whole basket computation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BasketError {
    /// No requirement list was supplied at all
    #[error("Requirement list is missing")]
    MissingRequirements,
    /// A requirement carries a negative or non-finite quantity
    #[error("Invalid quantity {quantity} for requirement '{name}'")]
    InvalidQuantity { name: String, quantity: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            UnitError::Unrecognized("cup".to_string()).to_string(),
            "Unrecognized unit: 'cup'"
        );
        assert_eq!(
            BasketError::InvalidQuantity {
                name: "salt".to_string(),
                quantity: -1.0
            }
            .to_string(),
            "Invalid quantity -1 for requirement 'salt'"
        );
    }

    #[test]
    fn test_parse_error_wraps_unit_error() {
        let err: ParseError = UnitError::Unrecognized("упак".to_string()).into();
        assert_eq!(err.to_string(), "Unrecognized unit: 'упак'");
    }
}
