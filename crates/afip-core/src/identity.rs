//! # Identity Newtypes
//!
//! Domain-primitive newtypes for the identifiers AFIP requests carry.
//! Each identifier is a distinct type — you cannot pass a raw string
//! where a [`Cuit`] is expected.
//!
//! ## Validation
//!
//! [`Cuit`] validates length, digit content and the modulus-11 check digit
//! at construction time. [`PointOfSale`] validates the numeric range the
//! service accepts. Deserialization routes through the same constructors
//! so invalid values are rejected at the boundary, not deep inside a
//! request builder.

use serde::{Deserialize, Serialize, Serializer};

use crate::error::ValidationError;

/// Helper macro to implement `Deserialize` for newtypes that must validate
/// their contents. Deserializes the raw representation, then routes through
/// the type's `new()` constructor so that invalid values are rejected at
/// deserialization time — not silently accepted.
macro_rules! impl_validating_deserialize {
    ($ty:ident, $raw:ty) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = <$raw>::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Cuit
// ---------------------------------------------------------------------------

/// Argentina's taxpayer identifier (Clave Única de Identificación
/// Tributaria): 11 digits, the last of which is a modulus-11 check digit.
///
/// Stored canonically as 11 digits without separators. The constructor
/// also accepts the common `XX-XXXXXXXX-X` hyphenated form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cuit(String);

impl_validating_deserialize!(Cuit, String);

/// Weights applied to the first ten digits when computing the check digit.
const CUIT_WEIGHTS: [u32; 10] = [5, 4, 3, 2, 7, 6, 5, 4, 3, 2];

impl Cuit {
    /// Create a CUIT from a string value, validating digit count and the
    /// modulus-11 check digit. Hyphens are stripped before validation.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidCuit`] if the value is not 11
    /// digits or the check digit does not verify.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let digits: String = raw.chars().filter(|c| *c != '-').collect();
        if digits.len() != 11 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidCuit(raw));
        }
        let ds: Vec<u32> = digits.chars().map(|c| c.to_digit(10).unwrap()).collect();
        if Self::check_digit(&ds[..10]) != ds[10] {
            return Err(ValidationError::InvalidCuit(raw));
        }
        Ok(Self(digits))
    }

    /// Modulus-11 check digit over the first ten digits. A remainder of 11
    /// maps to 0 and a remainder of 10 maps to 9, per AFIP's convention.
    fn check_digit(first_ten: &[u32]) -> u32 {
        let sum: u32 = first_ten
            .iter()
            .zip(CUIT_WEIGHTS.iter())
            .map(|(d, w)| d * w)
            .sum();
        match 11 - (sum % 11) {
            11 => 0,
            10 => 9,
            d => d,
        }
    }

    /// Access the canonical 11-digit string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The CUIT in the conventional `XX-XXXXXXXX-X` display form.
    pub fn hyphenated(&self) -> String {
        format!("{}-{}-{}", &self.0[..2], &self.0[2..10], &self.0[10..])
    }
}

impl Serialize for Cuit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl std::fmt::Display for Cuit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Cuit {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ---------------------------------------------------------------------------
// PointOfSale
// ---------------------------------------------------------------------------

/// Point of sale (punto de venta) under which vouchers are numbered.
///
/// AFIP assigns each emitter numbered points of sale in 1..=99999; voucher
/// numbering is independent per (point of sale, voucher type) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointOfSale(u32);

impl_validating_deserialize!(PointOfSale, u32);

impl PointOfSale {
    /// Create a point of sale, validating the 1..=99999 range.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPointOfSale`] when out of range.
    pub fn new(value: u32) -> Result<Self, ValidationError> {
        if value == 0 || value > 99_999 {
            return Err(ValidationError::InvalidPointOfSale(value));
        }
        Ok(Self(value))
    }

    /// The numeric point-of-sale value.
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl Serialize for PointOfSale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.0)
    }
}

impl std::fmt::Display for PointOfSale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
