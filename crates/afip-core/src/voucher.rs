//! # AFIP Code Tables
//!
//! The invoicing service identifies voucher kinds, buyer document kinds,
//! invoice concepts and VAT rates by numeric codes from its parameter
//! tables. The common codes are carried here as typed constants so call
//! sites read as names instead of magic numbers, while still allowing any
//! table code the service may add (the voucher and document tables are
//! open-ended).

use serde::{Deserialize, Serialize, Serializer};

use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// VoucherType
// ---------------------------------------------------------------------------

/// Voucher type code (`CbteTipo`): invoice, debit note or credit note of
/// class A, B or C, among others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoucherType(pub u16);

impl VoucherType {
    pub const INVOICE_A: VoucherType = VoucherType(1);
    pub const DEBIT_NOTE_A: VoucherType = VoucherType(2);
    pub const CREDIT_NOTE_A: VoucherType = VoucherType(3);
    pub const INVOICE_B: VoucherType = VoucherType(6);
    pub const DEBIT_NOTE_B: VoucherType = VoucherType(7);
    pub const CREDIT_NOTE_B: VoucherType = VoucherType(8);
    pub const INVOICE_C: VoucherType = VoucherType(11);
    pub const DEBIT_NOTE_C: VoucherType = VoucherType(12);
    pub const CREDIT_NOTE_C: VoucherType = VoucherType(13);

    /// The numeric table code sent on the wire.
    pub fn code(&self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for VoucherType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self.0 {
            1 => "Factura A",
            2 => "Nota de Débito A",
            3 => "Nota de Crédito A",
            6 => "Factura B",
            7 => "Nota de Débito B",
            8 => "Nota de Crédito B",
            11 => "Factura C",
            12 => "Nota de Débito C",
            13 => "Nota de Crédito C",
            _ => return write!(f, "Comprobante tipo {}", self.0),
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// DocumentType
// ---------------------------------------------------------------------------

/// Buyer document type code (`DocTipo`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentType(pub u16);

impl DocumentType {
    /// Taxpayer identifier (CUIT).
    pub const CUIT: DocumentType = DocumentType(80);
    /// Individual benefit identifier (CUIL).
    pub const CUIL: DocumentType = DocumentType(86);
    /// National identity document.
    pub const DNI: DocumentType = DocumentType(96);
    /// Anonymous final consumer (document number 0).
    pub const FINAL_CONSUMER: DocumentType = DocumentType(99);

    /// The numeric table code sent on the wire.
    pub fn code(&self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            80 => write!(f, "CUIT"),
            86 => write!(f, "CUIL"),
            96 => write!(f, "DNI"),
            99 => write!(f, "Consumidor Final"),
            other => write!(f, "Documento tipo {other}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Concept
// ---------------------------------------------------------------------------

/// Invoice concept (`Concepto`): what the voucher covers.
///
/// Services (2) and products-and-services (3) additionally require the
/// service period and payment due date on the detail request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Concept {
    /// Goods only.
    Products,
    /// Services only.
    Services,
    /// Both goods and services.
    ProductsAndServices,
}

impl Concept {
    /// Build from the wire code 1, 2 or 3.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidConcept`] for any other code.
    pub fn from_code(code: u8) -> Result<Self, ValidationError> {
        match code {
            1 => Ok(Self::Products),
            2 => Ok(Self::Services),
            3 => Ok(Self::ProductsAndServices),
            other => Err(ValidationError::InvalidConcept(other)),
        }
    }

    /// The numeric code sent on the wire.
    pub fn code(&self) -> u8 {
        match self {
            Self::Products => 1,
            Self::Services => 2,
            Self::ProductsAndServices => 3,
        }
    }

    /// Whether this concept makes the service period mandatory.
    pub fn requires_service_period(&self) -> bool {
        !matches!(self, Self::Products)
    }
}

impl Serialize for Concept {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for Concept {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let code = u8::deserialize(deserializer)?;
        Self::from_code(code).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Concept {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Products => write!(f, "Productos"),
            Self::Services => write!(f, "Servicios"),
            Self::ProductsAndServices => write!(f, "Productos y Servicios"),
        }
    }
}

// ---------------------------------------------------------------------------
// VatRate
// ---------------------------------------------------------------------------

/// VAT rate code (`AlicIva/Id`) from the service's rate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VatRate(pub u16);

impl VatRate {
    pub const ZERO: VatRate = VatRate(3);
    pub const TEN_POINT_FIVE: VatRate = VatRate(4);
    pub const TWENTY_ONE: VatRate = VatRate(5);
    pub const TWENTY_SEVEN: VatRate = VatRate(6);
    pub const FIVE: VatRate = VatRate(8);
    pub const TWO_POINT_FIVE: VatRate = VatRate(9);

    /// The numeric table code sent on the wire.
    pub fn code(&self) -> u16 {
        self.0
    }

    /// The nominal percentage for the known table codes, if any.
    pub fn percent(&self) -> Option<f64> {
        match self.0 {
            3 => Some(0.0),
            4 => Some(10.5),
            5 => Some(21.0),
            6 => Some(27.0),
            8 => Some(5.0),
            9 => Some(2.5),
            _ => None,
        }
    }
}

impl std::fmt::Display for VatRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.percent() {
            Some(p) => write!(f, "IVA {p}%"),
            None => write!(f, "IVA id {}", self.0),
        }
    }
}
