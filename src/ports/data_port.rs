//! Price data access port trait.

use crate::domain::error::QuantfolioError;
use crate::domain::price_matrix::PriceMatrix;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Source of historical prices and latest quotes.
///
/// Implementations must report an empty result as
/// [`QuantfolioError::DataUnavailable`], never as an empty success.
pub trait PriceDataPort {
    fn fetch_prices(
        &self,
        symbols: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceMatrix, QuantfolioError>;

    /// Most recent available close per symbol.
    fn latest_quotes(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, f64>, QuantfolioError>;
}
