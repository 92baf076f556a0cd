//! Mean-variance weight optimization.
//!
//! Long-only solves are done by Cholesky factorization on the active
//! support: solve the equality-constrained problem, drop the most negative
//! asset, and repeat until every remaining weight is non-negative.

use nalgebra::{Cholesky, DMatrix, DVector};
use std::collections::HashMap;

use super::error::QuantfolioError;
use super::estimate::ReturnEstimate;

/// Weights below this are clipped to exactly zero and the rest renormalized.
const WEIGHT_CUTOFF: f64 = 1e-4;

/// Optimization objective for [`optimize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Objective {
    /// Tangency portfolio: maximize (w'μ − r_f) / sqrt(w'Σw).
    MaxSharpe { risk_free_rate: f64 },
    /// Minimize w'Σw.
    MinVolatility,
    /// 1/N per asset, no solve.
    EqualWeight,
}

impl Objective {
    pub fn parse(name: &str, risk_free_rate: f64) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "max_sharpe" => Some(Objective::MaxSharpe { risk_free_rate }),
            "min_volatility" => Some(Objective::MinVolatility),
            "equal_weight" => Some(Objective::EqualWeight),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Objective::MaxSharpe { .. } => "max_sharpe",
            Objective::MinVolatility => "min_volatility",
            Objective::EqualWeight => "equal_weight",
        }
    }
}

/// Solve for a normalized, non-negative weight map under the objective.
pub fn optimize(
    estimate: &ReturnEstimate,
    objective: Objective,
) -> Result<HashMap<String, f64>, QuantfolioError> {
    let n = estimate.assets.len();
    if n == 0 {
        return Err(QuantfolioError::OptimizationInfeasible {
            reason: "no assets to optimize over".into(),
        });
    }

    let raw = match objective {
        // Uniform weights need no solve and no dust-clipping.
        Objective::EqualWeight => {
            return Ok(estimate
                .assets
                .iter()
                .map(|asset| (asset.clone(), 1.0 / n as f64))
                .collect());
        }
        Objective::MinVolatility => {
            solve_long_only(&estimate.covariance, &DVector::from_element(n, 1.0))?
        }
        Objective::MaxSharpe { risk_free_rate } => {
            let mu = &estimate.expected_returns;
            let spread = mu.max() - mu.min();
            if n > 1 && spread < 1e-12 {
                return Err(QuantfolioError::OptimizationInfeasible {
                    reason: "expected returns are constant across assets".into(),
                });
            }
            let excess = mu - DVector::from_element(n, risk_free_rate);
            if excess.max() <= 0.0 {
                return Err(QuantfolioError::OptimizationInfeasible {
                    reason: "no asset has positive excess return".into(),
                });
            }
            solve_long_only(&estimate.covariance, &excess)?
        }
    };

    Ok(clean_weights(&estimate.assets, &raw))
}

/// Solve Σx = b on a shrinking support, renormalizing x to sum to 1. The
/// most negative entry is evicted each round until all survivors are
/// non-negative.
fn solve_long_only(
    sigma: &DMatrix<f64>,
    b: &DVector<f64>,
) -> Result<Vec<f64>, QuantfolioError> {
    let n = b.len();
    let mut support: Vec<usize> = (0..n).collect();

    loop {
        if support.is_empty() {
            return Err(QuantfolioError::OptimizationInfeasible {
                reason: "no feasible long-only solution".into(),
            });
        }
        let k = support.len();
        let sub_sigma =
            DMatrix::from_fn(k, k, |r, c| sigma[(support[r], support[c])]);
        let sub_b = DVector::from_fn(k, |r, _| b[support[r]]);

        let cholesky = Cholesky::new(sub_sigma).ok_or_else(|| {
            QuantfolioError::OptimizationInfeasible {
                reason: "covariance matrix is not positive-definite".into(),
            }
        })?;
        let x = cholesky.solve(&sub_b);
        let total: f64 = x.sum();
        if total <= 0.0 {
            return Err(QuantfolioError::OptimizationInfeasible {
                reason: "no feasible long-only solution".into(),
            });
        }
        let weights = x / total;

        let mut worst: Option<(usize, f64)> = None;
        for (r, &w) in weights.iter().enumerate() {
            if w < -1e-10 && worst.is_none_or(|(_, lowest)| w < lowest) {
                worst = Some((r, w));
            }
        }
        match worst {
            Some((r, _)) => {
                support.remove(r);
            }
            None => {
                let mut full = vec![0.0; n];
                for (r, &w) in weights.iter().enumerate() {
                    full[support[r]] = w.max(0.0);
                }
                return Ok(full);
            }
        }
    }
}

/// Clip dust weights to zero and renormalize to sum to 1.
fn clean_weights(assets: &[String], raw: &[f64]) -> HashMap<String, f64> {
    let clipped: Vec<f64> = raw
        .iter()
        .map(|&w| if w < WEIGHT_CUTOFF { 0.0 } else { w })
        .collect();
    let total: f64 = clipped.iter().sum();
    assets
        .iter()
        .zip(clipped)
        .map(|(asset, w)| {
            let normalized = if total > 0.0 { w / total } else { 0.0 };
            (asset.clone(), normalized)
        })
        .collect()
}
