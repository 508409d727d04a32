//! Exchange-rate table and conversion core.

use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

/// Decimal places kept for converted amounts.
const AMOUNT_DECIMALS: i32 = 4;
/// Decimal places kept for effective rates.
const RATE_DECIMALS: i32 = 6;

/// Failures raised while fetching a rate table from the upstream provider.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// The transport could not complete the request (DNS, connect, timeout).
    #[error("network error fetching rates for {base}: {message}")]
    Network { base: String, message: String },

    /// The response arrived but violates the provider contract.
    #[error("malformed rate response for {base}: {reason}")]
    Malformed { base: String, reason: String },

    /// The provider does not recognise the requested base code.
    #[error("unknown currency code: {code}")]
    UnknownCurrency { code: String },
}

/// Failures raised by the pure conversion step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    /// The target code is missing from the table.
    #[error("no rate available for {code}")]
    RateUnavailable { code: String },

    /// The request's source does not match the table's base currency.
    #[error("rate table is for {base}, not {requested}")]
    SourceMismatch { requested: String, base: String },

    /// The amount is negative or not a finite number.
    #[error("amount must be a non-negative number, got {amount}")]
    InvalidAmount { amount: f64 },
}

/// A snapshot of every supported rate for one base currency.
///
/// Invariants, upheld by the constructor: every rate is strictly positive and
/// finite, and the table carries a self-entry for its own base so identity
/// conversions always resolve.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    base: String,
    rates: BTreeMap<String, f64>,
    as_of: String,
}

impl RateTable {
    pub fn new(
        base: &str,
        mut rates: BTreeMap<String, f64>,
        as_of: &str,
    ) -> Result<Self, FetchError> {
        for (code, rate) in &rates {
            if !rate.is_finite() || *rate <= 0.0 {
                return Err(FetchError::Malformed {
                    base: base.to_string(),
                    reason: format!("rate for {code} is not a positive number: {rate}"),
                });
            }
        }
        match rates.get(base) {
            Some(rate) if *rate != 1.0 => {
                return Err(FetchError::Malformed {
                    base: base.to_string(),
                    reason: format!("self-rate for {base} must be 1, got {rate}"),
                });
            }
            Some(_) => {}
            None => {
                rates.insert(base.to_string(), 1.0);
            }
        }

        Ok(RateTable {
            base: base.to_string(),
            rates,
            as_of: as_of.to_string(),
        })
    }

    /// The currency every rate in this table is expressed against.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Date the provider reported for this snapshot.
    pub fn as_of(&self) -> &str {
        &self.as_of
    }

    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    /// All rates, ordered by currency code.
    pub fn rates(&self) -> &BTreeMap<String, f64> {
        &self.rates
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// One conversion the user asked for: amount of source, expressed in target.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub source: String,
    pub target: String,
    pub amount: f64,
}

/// Outcome of a conversion. Amounts are rounded to four decimals, rates to
/// six, both half-away-from-zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionResult {
    pub converted_amount: f64,
    pub effective_rate: f64,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Converts `request.amount` from the table's base into the target currency.
///
/// Pure and deterministic: no I/O, no hidden state. The table must have been
/// fetched for `request.source`; a mismatch means the caller is holding a
/// stale table and is reported as such rather than silently mispriced.
pub fn convert(
    table: &RateTable,
    request: &ConversionRequest,
) -> Result<ConversionResult, ConvertError> {
    if !request.amount.is_finite() || request.amount < 0.0 {
        return Err(ConvertError::InvalidAmount {
            amount: request.amount,
        });
    }
    if request.source != table.base {
        return Err(ConvertError::SourceMismatch {
            requested: request.source.clone(),
            base: table.base.clone(),
        });
    }
    let rate = table
        .rate(&request.target)
        .ok_or_else(|| ConvertError::RateUnavailable {
            code: request.target.clone(),
        })?;

    let product = request.amount * rate;
    if !product.is_finite() {
        return Err(ConvertError::InvalidAmount {
            amount: request.amount,
        });
    }

    Ok(ConversionResult {
        converted_amount: round_to(product, AMOUNT_DECIMALS),
        effective_rate: round_to(rate, RATE_DECIMALS),
    })
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetches the full rate table for `base`. Always a live request; callers
    /// that want to avoid refetching hold on to the returned table.
    async fn fetch_rates(&self, base: &str) -> Result<RateTable, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd_table() -> RateTable {
        let rates = BTreeMap::from([
            ("USD".to_string(), 1.0),
            ("EUR".to_string(), 0.9),
            ("INR".to_string(), 87.52),
        ]);
        RateTable::new("USD", rates, "2025-08-19").unwrap()
    }

    fn request(source: &str, target: &str, amount: f64) -> ConversionRequest {
        ConversionRequest {
            source: source.to_string(),
            target: target.to_string(),
            amount,
        }
    }

    #[test]
    fn test_round_half_away_from_zero() {
        // 2.25 and 22.5 are exact in binary, so these pin the tie-break rule.
        assert_eq!(round_to(2.25, 1), 2.3);
        assert_eq!(round_to(-2.25, 1), -2.3);
        assert_eq!(round_to(0.123456789, 4), 0.1235);
        assert_eq!(round_to(0.123456789, 6), 0.123457);
    }

    #[test]
    fn test_convert_usd_to_eur() {
        let result = convert(&usd_table(), &request("USD", "EUR", 10.0)).unwrap();
        assert_eq!(result.converted_amount, 9.0);
        assert_eq!(result.effective_rate, 0.9);
    }

    #[test]
    fn test_convert_zero_amount() {
        let result = convert(&usd_table(), &request("USD", "EUR", 0.0)).unwrap();
        assert_eq!(result.converted_amount, 0.0);
        assert_eq!(result.effective_rate, 0.9);
    }

    #[test]
    fn test_convert_identity() {
        let result = convert(&usd_table(), &request("USD", "USD", 123.45)).unwrap();
        assert_eq!(result.converted_amount, 123.45);
        assert_eq!(result.effective_rate, 1.0);
    }

    #[test]
    fn test_convert_is_linear_in_amount() {
        let table = usd_table();
        let single = convert(&table, &request("USD", "INR", 7.0)).unwrap();
        let double = convert(&table, &request("USD", "INR", 14.0)).unwrap();
        assert!((double.converted_amount - 2.0 * single.converted_amount).abs() <= 1e-4);
    }

    #[test]
    fn test_convert_is_deterministic() {
        let table = usd_table();
        let req = request("USD", "INR", 42.42);
        assert_eq!(convert(&table, &req).unwrap(), convert(&table, &req).unwrap());
    }

    #[test]
    fn test_convert_missing_target_names_code() {
        let err = convert(&usd_table(), &request("USD", "XYZ", 1.0)).unwrap_err();
        assert_eq!(
            err,
            ConvertError::RateUnavailable {
                code: "XYZ".to_string()
            }
        );
        assert!(err.to_string().contains("XYZ"));
    }

    #[test]
    fn test_convert_source_mismatch() {
        let err = convert(&usd_table(), &request("EUR", "USD", 1.0)).unwrap_err();
        assert_eq!(
            err,
            ConvertError::SourceMismatch {
                requested: "EUR".to_string(),
                base: "USD".to_string()
            }
        );
    }

    #[test]
    fn test_convert_rejects_bad_amounts() {
        let table = usd_table();
        for amount in [-1.0, f64::NAN, f64::INFINITY] {
            let err = convert(&table, &request("USD", "EUR", amount)).unwrap_err();
            assert!(matches!(err, ConvertError::InvalidAmount { .. }));
        }
    }

    #[test]
    fn test_table_inserts_missing_self_entry() {
        let rates = BTreeMap::from([("EUR".to_string(), 0.9)]);
        let table = RateTable::new("USD", rates, "").unwrap();
        assert_eq!(table.rate("USD"), Some(1.0));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_table_keeps_provider_self_entry() {
        let rates = BTreeMap::from([("USD".to_string(), 1.0), ("EUR".to_string(), 0.9)]);
        let table = RateTable::new("USD", rates, "").unwrap();
        assert_eq!(table.rate("USD"), Some(1.0));
    }

    #[test]
    fn test_table_rejects_wrong_self_entry() {
        let rates = BTreeMap::from([("USD".to_string(), 2.0), ("EUR".to_string(), 0.9)]);
        let err = RateTable::new("USD", rates, "").unwrap_err();
        assert!(matches!(err, FetchError::Malformed { .. }));
        assert!(err.to_string().contains("USD"));
    }

    #[test]
    fn test_convert_rejects_overflowing_product() {
        let err = convert(&usd_table(), &request("USD", "INR", 1e308)).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidAmount { .. }));
    }

    #[test]
    fn test_table_rejects_non_positive_rates() {
        for bad in [0.0, -0.5, f64::NAN, f64::INFINITY] {
            let rates = BTreeMap::from([("EUR".to_string(), bad)]);
            let err = RateTable::new("USD", rates, "").unwrap_err();
            assert!(matches!(err, FetchError::Malformed { .. }));
            assert!(err.to_string().contains("EUR"));
        }
    }
}
