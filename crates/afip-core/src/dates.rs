//! Compact `YYYYMMDD` wire dates.
//!
//! The invoicing service carries every calendar date (voucher date, service
//! period, payment due, CAE expiry) as an eight-digit string. Conversions
//! go through [`chrono::NaiveDate`] so impossible dates are rejected.

use chrono::NaiveDate;

use crate::error::ValidationError;

/// Format a date as the eight-digit `YYYYMMDD` wire form.
pub fn to_compact(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Parse an eight-digit `YYYYMMDD` wire date.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidCompactDate`] if the input is not
/// eight digits or names an impossible calendar date.
pub fn from_compact(value: &str) -> Result<NaiveDate, ValidationError> {
    if value.len() != 8 || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidCompactDate(value.to_string()));
    }
    NaiveDate::parse_from_str(value, "%Y%m%d")
        .map_err(|_| ValidationError::InvalidCompactDate(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let date = NaiveDate::from_ymd_opt(2019, 4, 1).unwrap();
        assert_eq!(to_compact(date), "20190401");
        assert_eq!(from_compact("20190401").unwrap(), date);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(from_compact("2019-04-01").is_err());
        assert!(from_compact("2019041").is_err());
        assert!(from_compact("201904011").is_err());
        assert!(from_compact("").is_err());
    }

    #[test]
    fn rejects_impossible_dates() {
        assert!(from_compact("20190231").is_err());
        assert!(from_compact("20191301").is_err());
        assert!(from_compact("20190100").is_err());
    }
}
