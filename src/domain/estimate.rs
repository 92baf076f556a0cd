//! Expected-return and covariance estimation from price history.

use nalgebra::{DMatrix, DVector};

use super::TRADING_DAYS_PER_YEAR;
use super::error::QuantfolioError;
use super::price_matrix::PriceMatrix;

/// Annualized mean returns and sample covariance for a set of assets.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnEstimate {
    pub assets: Vec<String>,
    /// Annualized historical mean return per asset.
    pub expected_returns: DVector<f64>,
    /// Annualized sample covariance of per-period returns, symmetric.
    pub covariance: DMatrix<f64>,
}

impl ReturnEstimate {
    /// Estimate from a price matrix. Return rows containing any non-finite
    /// value are dropped listwise before the mean and covariance are taken.
    pub fn from_prices(prices: &PriceMatrix) -> Result<Self, QuantfolioError> {
        if prices.len() < 2 {
            return Err(QuantfolioError::InsufficientData {
                context: "price history".into(),
                observations: prices.len(),
                minimum: 2,
            });
        }
        for (col, asset) in prices.assets().iter().enumerate() {
            let finite = (0..prices.len())
                .filter(|&t| prices.price(t, col).is_finite())
                .count();
            if finite == 0 {
                return Err(QuantfolioError::InsufficientData {
                    context: asset.clone(),
                    observations: 0,
                    minimum: 2,
                });
            }
        }

        let returns = prices.returns();
        let complete: Vec<&Vec<f64>> = returns
            .rows
            .iter()
            .filter(|row| row.iter().all(|v| v.is_finite()))
            .collect();
        let n_obs = complete.len();
        if n_obs == 0 {
            return Err(QuantfolioError::InsufficientData {
                context: "return history".into(),
                observations: 0,
                minimum: 1,
            });
        }

        let n = prices.assets().len();
        let mut mean = DVector::zeros(n);
        for row in &complete {
            for (i, &value) in row.iter().enumerate() {
                mean[i] += value;
            }
        }
        mean /= n_obs as f64;

        let mut covariance = DMatrix::zeros(n, n);
        if n_obs > 1 {
            for row in &complete {
                for i in 0..n {
                    let di = row[i] - mean[i];
                    for j in i..n {
                        covariance[(i, j)] += di * (row[j] - mean[j]);
                    }
                }
            }
            covariance /= (n_obs - 1) as f64;
            for i in 0..n {
                for j in 0..i {
                    covariance[(i, j)] = covariance[(j, i)];
                }
            }
        }

        Ok(Self {
            assets: prices.assets().to_vec(),
            expected_returns: mean * TRADING_DAYS_PER_YEAR,
            covariance: covariance * TRADING_DAYS_PER_YEAR,
        })
    }
}
