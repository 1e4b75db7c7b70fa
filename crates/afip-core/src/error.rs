//! Validation errors for domain-primitive construction.

/// Errors raised by the validating constructors in this crate.
///
/// Each variant carries the offending input so callers can report the
/// rejected value without re-deriving it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// CUIT is not 11 digits or its check digit does not verify.
    #[error("invalid CUIT: {0:?}")]
    InvalidCuit(String),

    /// Point of sale is outside the 1..=99999 range AFIP accepts.
    #[error("invalid point of sale: {0}")]
    InvalidPointOfSale(u32),

    /// Concept code is not 1 (products), 2 (services) or 3 (both).
    #[error("invalid concept code: {0}")]
    InvalidConcept(u8),

    /// Date string is not a valid `YYYYMMDD` calendar date.
    #[error("invalid compact date: {0:?}")]
    InvalidCompactDate(String),
}
