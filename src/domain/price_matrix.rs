//! Historical close-price table and the return series derived from it.

use chrono::NaiveDate;
use std::collections::HashMap;

use super::error::QuantfolioError;

/// A date-indexed table of adjusted close prices, one column per asset.
///
/// Dates are strictly increasing and rows are rectangular. Cells may be NaN
/// where the source had no observation for that date.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceMatrix {
    dates: Vec<NaiveDate>,
    assets: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl PriceMatrix {
    pub fn new(
        dates: Vec<NaiveDate>,
        assets: Vec<String>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self, QuantfolioError> {
        if assets.is_empty() {
            return Err(QuantfolioError::InvalidInput {
                reason: "price matrix needs at least one asset column".into(),
            });
        }
        if dates.len() != rows.len() {
            return Err(QuantfolioError::InvalidInput {
                reason: format!(
                    "price matrix has {} dates but {} rows",
                    dates.len(),
                    rows.len()
                ),
            });
        }
        if let Some(row) = rows.iter().find(|r| r.len() != assets.len()) {
            return Err(QuantfolioError::InvalidInput {
                reason: format!(
                    "price row has {} cells, expected {}",
                    row.len(),
                    assets.len()
                ),
            });
        }
        if let Some(pair) = dates.windows(2).find(|w| w[1] <= w[0]) {
            return Err(QuantfolioError::InvalidInput {
                reason: format!("dates not strictly increasing at {}", pair[1]),
            });
        }
        Ok(Self {
            dates,
            assets,
            rows,
        })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// Number of dated price rows.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn asset_index(&self, name: &str) -> Option<usize> {
        self.assets.iter().position(|a| a == name)
    }

    pub fn price(&self, row: usize, col: usize) -> f64 {
        self.rows[row][col]
    }

    /// Most recent finite price per asset. Assets with no finite price at
    /// all are omitted.
    pub fn latest_prices(&self) -> HashMap<String, f64> {
        let mut out = HashMap::new();
        for (col, asset) in self.assets.iter().enumerate() {
            if let Some(price) = self
                .rows
                .iter()
                .rev()
                .map(|r| r[col])
                .find(|p| p.is_finite())
            {
                out.insert(asset.clone(), price);
            }
        }
        out
    }

    /// Simple period-over-period percentage change, one row fewer than the
    /// price matrix. A return is NaN when either endpoint is missing or the
    /// earlier price is not positive.
    pub fn returns(&self) -> ReturnSeries {
        let mut dates = Vec::with_capacity(self.len().saturating_sub(1));
        let mut rows = Vec::with_capacity(self.len().saturating_sub(1));
        for t in 1..self.len() {
            dates.push(self.dates[t]);
            let row = (0..self.assets.len())
                .map(|col| {
                    let prev = self.rows[t - 1][col];
                    let curr = self.rows[t][col];
                    if prev.is_finite() && curr.is_finite() && prev > 0.0 {
                        curr / prev - 1.0
                    } else {
                        f64::NAN
                    }
                })
                .collect();
            rows.push(row);
        }
        ReturnSeries { dates, rows }
    }
}

/// Per-period simple returns aligned to the second and later price dates.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSeries {
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<Vec<f64>>,
}

impl ReturnSeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}
