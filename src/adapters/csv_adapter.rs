//! CSV price file adapter.
//!
//! Reads one wide CSV file: a `date` column followed by one adjusted-close
//! column per asset. Empty cells are missing observations.

use crate::domain::error::QuantfolioError;
use crate::domain::price_matrix::PriceMatrix;
use crate::ports::data_port::PriceDataPort;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

pub struct CsvPriceAdapter {
    path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_matrix(
        &self,
        symbols: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceMatrix, QuantfolioError> {
        let content =
            fs::read_to_string(&self.path).map_err(|e| QuantfolioError::DataUnavailable {
                reason: format!("failed to read {}: {}", self.path.display(), e),
            })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| QuantfolioError::DataUnavailable {
                reason: format!("CSV header error: {}", e),
            })?
            .clone();

        let columns: Vec<usize> = symbols
            .iter()
            .map(|symbol| {
                headers
                    .iter()
                    .position(|h| h.eq_ignore_ascii_case(symbol))
                    .filter(|&idx| idx > 0)
                    .ok_or_else(|| QuantfolioError::DataUnavailable {
                        reason: format!(
                            "no column for symbol {} in {}",
                            symbol,
                            self.path.display()
                        ),
                    })
            })
            .collect::<Result<_, _>>()?;

        let mut dated_rows: Vec<(NaiveDate, Vec<f64>)> = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| QuantfolioError::DataUnavailable {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(0).ok_or_else(|| QuantfolioError::DataUnavailable {
                reason: "missing date column".into(),
            })?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                QuantfolioError::DataUnavailable {
                    reason: format!("invalid date '{}': {}", date_str, e),
                }
            })?;

            if date < start_date || date > end_date {
                continue;
            }

            let row = columns
                .iter()
                .map(|&col| {
                    let cell = record.get(col).unwrap_or("").trim();
                    if cell.is_empty() {
                        Ok(f64::NAN)
                    } else {
                        cell.parse::<f64>().map_err(|e| {
                            QuantfolioError::DataUnavailable {
                                reason: format!(
                                    "invalid price '{}' on {}: {}",
                                    cell, date, e
                                ),
                            }
                        })
                    }
                })
                .collect::<Result<Vec<f64>, _>>()?;

            dated_rows.push((date, row));
        }

        if dated_rows.is_empty() {
            return Err(QuantfolioError::DataUnavailable {
                reason: format!(
                    "no price rows between {} and {} in {}",
                    start_date,
                    end_date,
                    self.path.display()
                ),
            });
        }

        dated_rows.sort_by_key(|&(date, _)| date);
        let (dates, rows) = dated_rows.into_iter().unzip();
        PriceMatrix::new(dates, symbols.to_vec(), rows)
    }
}

impl PriceDataPort for CsvPriceAdapter {
    fn fetch_prices(
        &self,
        symbols: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceMatrix, QuantfolioError> {
        self.read_matrix(symbols, start_date, end_date)
    }

    fn latest_quotes(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, f64>, QuantfolioError> {
        let matrix = self.read_matrix(symbols, NaiveDate::MIN, NaiveDate::MAX)?;
        let quotes = matrix.latest_prices();
        for symbol in symbols {
            if !quotes.contains_key(symbol) {
                return Err(QuantfolioError::DataUnavailable {
                    reason: format!("no quotable price for {}", symbol),
                });
            }
        }
        Ok(quotes)
    }
}
