#![allow(dead_code)]

use chrono::NaiveDate;
use quantfolio::domain::error::QuantfolioError;
use quantfolio::domain::price_matrix::PriceMatrix;
use quantfolio::ports::data_port::PriceDataPort;
use std::collections::HashMap;

/// In-memory price source keyed by asset, with optional forced failure.
pub struct MockPriceDataPort {
    pub dates: Vec<NaiveDate>,
    pub series: HashMap<String, Vec<f64>>,
    pub quote_overrides: HashMap<String, f64>,
    pub fail_with: Option<String>,
}

impl MockPriceDataPort {
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates,
            series: HashMap::new(),
            quote_overrides: HashMap::new(),
            fail_with: None,
        }
    }

    pub fn with_series(mut self, code: &str, prices: Vec<f64>) -> Self {
        assert_eq!(prices.len(), self.dates.len(), "series length mismatch");
        self.series.insert(code.to_string(), prices);
        self
    }

    pub fn with_quote(mut self, code: &str, price: f64) -> Self {
        self.quote_overrides.insert(code.to_string(), price);
        self
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            dates: Vec::new(),
            series: HashMap::new(),
            quote_overrides: HashMap::new(),
            fail_with: Some(reason.to_string()),
        }
    }
}

impl PriceDataPort for MockPriceDataPort {
    fn fetch_prices(
        &self,
        symbols: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceMatrix, QuantfolioError> {
        if let Some(reason) = &self.fail_with {
            return Err(QuantfolioError::DataUnavailable {
                reason: reason.clone(),
            });
        }

        let columns: Vec<&Vec<f64>> = symbols
            .iter()
            .map(|s| {
                self.series
                    .get(s)
                    .ok_or_else(|| QuantfolioError::DataUnavailable {
                        reason: format!("no data for {s}"),
                    })
            })
            .collect::<Result<_, _>>()?;

        let mut dates = Vec::new();
        let mut rows = Vec::new();
        for (t, &date) in self.dates.iter().enumerate() {
            if date < start_date || date > end_date {
                continue;
            }
            dates.push(date);
            rows.push(columns.iter().map(|col| col[t]).collect());
        }
        if dates.is_empty() {
            return Err(QuantfolioError::DataUnavailable {
                reason: "no rows in range".into(),
            });
        }
        PriceMatrix::new(dates, symbols.to_vec(), rows)
    }

    fn latest_quotes(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, f64>, QuantfolioError> {
        if let Some(reason) = &self.fail_with {
            return Err(QuantfolioError::DataUnavailable {
                reason: reason.clone(),
            });
        }

        let mut quotes = HashMap::new();
        for symbol in symbols {
            if let Some(&price) = self.quote_overrides.get(symbol) {
                quotes.insert(symbol.clone(), price);
                continue;
            }
            let last = self
                .series
                .get(symbol)
                .and_then(|col| col.iter().rev().find(|p| p.is_finite()))
                .copied();
            match last {
                Some(price) => {
                    quotes.insert(symbol.clone(), price);
                }
                None => {
                    return Err(QuantfolioError::DataUnavailable {
                        reason: format!("no quote for {symbol}"),
                    });
                }
            }
        }
        Ok(quotes)
    }
}

/// `count` consecutive calendar days starting at `start`.
pub fn daily_dates(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    (0..count)
        .map(|i| start + chrono::Duration::days(i as i64))
        .collect()
}

pub fn symbols(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}
