//! # Invoice Value Records
//!
//! The flat invoice record submitted to the invoicing service, with its
//! VAT lines, additional taxes, associated vouchers and optional data
//! items. Amount fields mirror the service's breakdown: the grand total
//! must equal the sum of the untaxed, net, exempt, VAT and tax
//! components, and the service rejects vouchers that do not balance —
//! [`Invoice::validate`] applies the same identity locally so a doomed
//! request never leaves the process.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use afip_core::{Concept, Cuit, DocumentType, PointOfSale, VatRate, VoucherType};

/// Tolerance when comparing 2-decimal currency amounts held as `f64`.
const AMOUNT_EPSILON: f64 = 0.005;

/// Invoice consistency failures detected before submission.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvoiceError {
    /// Voucher number range is empty or inverted.
    #[error("invalid voucher number range {from}..{to}")]
    InvalidRange {
        /// First voucher number.
        from: u64,
        /// Last voucher number.
        to: u64,
    },

    /// The amount components do not add up to the declared total.
    #[error("declared total {declared:.2} differs from component sum {computed:.2}")]
    TotalMismatch {
        /// `total` as declared on the invoice.
        declared: f64,
        /// untaxed + net + exempt + VAT + taxes.
        computed: f64,
    },

    /// The VAT lines do not add up to the declared VAT total.
    #[error("declared VAT total {declared:.2} differs from VAT line sum {computed:.2}")]
    VatMismatch {
        /// `vat_total` as declared.
        declared: f64,
        /// Sum over the VAT lines.
        computed: f64,
    },

    /// The tax lines do not add up to the declared tax total.
    #[error("declared tax total {declared:.2} differs from tax line sum {computed:.2}")]
    TaxMismatch {
        /// `tax_total` as declared.
        declared: f64,
        /// Sum over the tax lines.
        computed: f64,
    },

    /// Concepts covering services require the service period and the
    /// payment due date.
    #[error("concept {concept} requires service period and payment due date")]
    MissingServicePeriod {
        /// The offending concept.
        concept: Concept,
    },
}

/// One VAT line (`AlicIva`): rate code, taxable base and resulting amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VatLine {
    /// VAT rate code from the service's table.
    pub rate: VatRate,
    /// Taxable base for this rate.
    pub base: f64,
    /// VAT amount for this rate.
    pub amount: f64,
}

/// One additional tax or contribution line (`Tributo`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tax {
    /// Tax type code from the service's table (e.g. 99 = other).
    pub code: u16,
    /// Free-form description.
    pub description: String,
    /// Taxable base.
    pub base: f64,
    /// Rate percentage.
    pub rate: f64,
    /// Resulting amount.
    pub amount: f64,
}

/// Reference to a related voucher (`CbteAsoc`), required for credit and
/// debit notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociatedVoucher {
    /// Voucher type of the referenced voucher.
    pub voucher_type: VoucherType,
    /// Point of sale of the referenced voucher.
    pub point_of_sale: PointOfSale,
    /// Number of the referenced voucher.
    pub number: u64,
    /// Emitter CUIT of the referenced voucher, when it differs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuit: Option<Cuit>,
    /// Issue date of the referenced voucher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// One optional data item (`Opcional`), keyed by the service's optional
/// data table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionalData {
    /// Optional data type code (e.g. "2101" for buyer's CBU).
    pub id: String,
    /// Value as the table defines it.
    pub value: String,
}

/// A domestic-market invoice (or credit/debit note) to be authorized.
///
/// Field names follow the service's amount breakdown: `untaxed_net` is
/// net amount not subject to VAT, `net` is the VAT-taxable net, `exempt`
/// is VAT-exempt, and `vat_total`/`tax_total` aggregate the respective
/// line collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// What the voucher covers (products, services, both).
    pub concept: Concept,
    /// Buyer document kind.
    pub document_type: DocumentType,
    /// Buyer document number (0 for anonymous final consumers).
    pub document_number: u64,
    /// Voucher type being issued.
    pub voucher_type: VoucherType,
    /// Point of sale issuing the voucher.
    pub point_of_sale: PointOfSale,
    /// First voucher number in the range (normally equal to `number_to`).
    pub number_from: u64,
    /// Last voucher number in the range.
    pub number_to: u64,
    /// Issue date.
    pub date: NaiveDate,
    /// Grand total.
    pub total: f64,
    /// Net amount not subject to VAT.
    #[serde(default)]
    pub untaxed_net: f64,
    /// VAT-taxable net amount.
    #[serde(default)]
    pub net: f64,
    /// VAT-exempt amount.
    #[serde(default)]
    pub exempt: f64,
    /// Total VAT across `vat` lines.
    #[serde(default)]
    pub vat_total: f64,
    /// Total additional taxes across `taxes` lines.
    #[serde(default)]
    pub tax_total: f64,
    /// Currency code from the service's table (`PES`, `DOL`, …).
    pub currency: String,
    /// Exchange rate to pesos (1.0 for `PES`).
    pub fx_rate: f64,
    /// Service period start (concepts 2 and 3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_from: Option<NaiveDate>,
    /// Service period end (concepts 2 and 3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_to: Option<NaiveDate>,
    /// Payment due date (concepts 2 and 3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_due: Option<NaiveDate>,
    /// VAT lines.
    #[serde(default)]
    pub vat: Vec<VatLine>,
    /// Additional tax lines.
    #[serde(default)]
    pub taxes: Vec<Tax>,
    /// Associated vouchers (credit/debit notes).
    #[serde(default)]
    pub associated: Vec<AssociatedVoucher>,
    /// Optional data items.
    #[serde(default)]
    pub optionals: Vec<OptionalData>,
}

impl Invoice {
    /// A minimal peso-denominated invoice for one voucher number, with
    /// all amounts zero. Callers fill amounts and lines afterwards.
    pub fn new(
        voucher_type: VoucherType,
        point_of_sale: PointOfSale,
        concept: Concept,
        date: NaiveDate,
    ) -> Self {
        Self {
            concept,
            document_type: DocumentType::FINAL_CONSUMER,
            document_number: 0,
            voucher_type,
            point_of_sale,
            number_from: 0,
            number_to: 0,
            date,
            total: 0.0,
            untaxed_net: 0.0,
            net: 0.0,
            exempt: 0.0,
            vat_total: 0.0,
            tax_total: 0.0,
            currency: "PES".to_string(),
            fx_rate: 1.0,
            service_from: None,
            service_to: None,
            payment_due: None,
            vat: Vec::new(),
            taxes: Vec::new(),
            associated: Vec::new(),
            optionals: Vec::new(),
        }
    }

    /// Set the voucher number (single-voucher range).
    pub fn numbered(mut self, number: u64) -> Self {
        self.number_from = number;
        self.number_to = number;
        self
    }

    /// Append a VAT line and fold it into `vat_total` and `total`.
    pub fn add_vat(&mut self, rate: VatRate, base: f64, amount: f64) {
        self.vat.push(VatLine { rate, base, amount });
        self.vat_total += amount;
        self.total += amount;
    }

    /// Append an additional tax line and fold it into `tax_total` and
    /// `total`.
    pub fn add_tax(&mut self, code: u16, description: impl Into<String>, base: f64, rate: f64, amount: f64) {
        self.taxes.push(Tax {
            code,
            description: description.into(),
            base,
            rate,
            amount,
        });
        self.tax_total += amount;
        self.total += amount;
    }

    /// Reference a related voucher.
    pub fn add_associated(&mut self, associated: AssociatedVoucher) {
        self.associated.push(associated);
    }

    /// Append an optional data item.
    pub fn add_optional(&mut self, id: impl Into<String>, value: impl Into<String>) {
        self.optionals.push(OptionalData {
            id: id.into(),
            value: value.into(),
        });
    }

    /// Check the consistency rules the service enforces remotely.
    ///
    /// # Errors
    ///
    /// The first violated rule, as an [`InvoiceError`].
    pub fn validate(&self) -> Result<(), InvoiceError> {
        if self.number_from == 0 || self.number_from > self.number_to {
            return Err(InvoiceError::InvalidRange {
                from: self.number_from,
                to: self.number_to,
            });
        }

        let computed = self.untaxed_net + self.net + self.exempt + self.vat_total + self.tax_total;
        if (computed - self.total).abs() > AMOUNT_EPSILON {
            return Err(InvoiceError::TotalMismatch {
                declared: self.total,
                computed,
            });
        }

        let vat_sum: f64 = self.vat.iter().map(|l| l.amount).sum();
        if (vat_sum - self.vat_total).abs() > AMOUNT_EPSILON {
            return Err(InvoiceError::VatMismatch {
                declared: self.vat_total,
                computed: vat_sum,
            });
        }

        let tax_sum: f64 = self.taxes.iter().map(|l| l.amount).sum();
        if (tax_sum - self.tax_total).abs() > AMOUNT_EPSILON {
            return Err(InvoiceError::TaxMismatch {
                declared: self.tax_total,
                computed: tax_sum,
            });
        }

        if self.concept.requires_service_period()
            && (self.service_from.is_none()
                || self.service_to.is_none()
                || self.payment_due.is_none())
        {
            return Err(InvoiceError::MissingServicePeriod {
                concept: self.concept,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_invoice() -> Invoice {
        let mut invoice = Invoice::new(
            VoucherType::INVOICE_B,
            PointOfSale::new(4000).unwrap(),
            Concept::Products,
            NaiveDate::from_ymd_opt(2019, 4, 1).unwrap(),
        )
        .numbered(12);
        invoice.net = 100.0;
        invoice.total = 100.0;
        invoice.add_vat(VatRate::TWENTY_ONE, 100.0, 21.0);
        invoice
    }

    #[test]
    fn add_vat_folds_into_totals() {
        let invoice = base_invoice();
        assert_eq!(invoice.vat_total, 21.0);
        assert_eq!(invoice.total, 121.0);
        assert!(invoice.validate().is_ok());
    }

    #[test]
    fn add_tax_folds_into_totals() {
        let mut invoice = base_invoice();
        invoice.add_tax(99, "Impuesto Municipal", 100.0, 1.0, 1.0);
        assert_eq!(invoice.tax_total, 1.0);
        assert_eq!(invoice.total, 122.0);
        assert!(invoice.validate().is_ok());
    }

    #[test]
    fn unbalanced_total_is_rejected() {
        let mut invoice = base_invoice();
        invoice.total = 500.0;
        assert!(matches!(
            invoice.validate(),
            Err(InvoiceError::TotalMismatch { .. })
        ));
    }

    #[test]
    fn vat_line_sum_must_match_declared_vat_total() {
        let mut invoice = base_invoice();
        invoice.vat.push(VatLine {
            rate: VatRate::TEN_POINT_FIVE,
            base: 10.0,
            amount: 1.05,
        });
        assert!(matches!(
            invoice.validate(),
            Err(InvoiceError::VatMismatch { .. })
        ));
    }

    #[test]
    fn empty_or_inverted_range_is_rejected() {
        let mut invoice = base_invoice();
        invoice.number_from = 0;
        invoice.number_to = 0;
        assert!(matches!(
            invoice.validate(),
            Err(InvoiceError::InvalidRange { .. })
        ));

        let mut invoice = base_invoice();
        invoice.number_from = 10;
        invoice.number_to = 9;
        assert!(invoice.validate().is_err());
    }

    #[test]
    fn service_concept_requires_period_and_due_date() {
        let mut invoice = base_invoice();
        invoice.concept = Concept::Services;
        assert!(matches!(
            invoice.validate(),
            Err(InvoiceError::MissingServicePeriod { .. })
        ));

        invoice.service_from = NaiveDate::from_ymd_opt(2019, 3, 1);
        invoice.service_to = NaiveDate::from_ymd_opt(2019, 3, 31);
        invoice.payment_due = NaiveDate::from_ymd_opt(2019, 4, 30);
        assert!(invoice.validate().is_ok());
    }

    #[test]
    fn half_cent_rounding_is_tolerated() {
        let mut invoice = base_invoice();
        invoice.total += 0.004;
        assert!(invoice.validate().is_ok());
    }

    #[test]
    fn json_round_trip_with_defaults() {
        let json = r#"{
            "concept": 1,
            "document_type": 96,
            "document_number": 12345678,
            "voucher_type": 6,
            "point_of_sale": 4000,
            "number_from": 0,
            "number_to": 0,
            "date": "2019-04-01",
            "total": 121.0,
            "net": 100.0,
            "vat_total": 21.0,
            "currency": "PES",
            "fx_rate": 1.0,
            "vat": [{ "rate": 5, "base": 100.0, "amount": 21.0 }]
        }"#;
        let invoice: Invoice = serde_json::from_str(json).unwrap();
        assert_eq!(invoice.document_type, DocumentType::DNI);
        assert_eq!(invoice.vat.len(), 1);
        assert!(invoice.taxes.is_empty());
        assert!(invoice.service_from.is_none());

        let back: Invoice = serde_json::from_str(&serde_json::to_string(&invoice).unwrap()).unwrap();
        assert_eq!(back, invoice);
    }
}
