//! Risk/return statistics of an equity curve.

use super::TRADING_DAYS_PER_YEAR;
use super::error::QuantfolioError;
use super::simulator::EquityCurve;

/// Summary statistics, all expressed as fractions (0.0532 = 5.32%).
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_return: f64,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub sharpe_ratio: f64,
    /// Worst peak-to-trough loss; always <= 0.
    pub max_drawdown: f64,
}

impl Metrics {
    pub fn from_equity_curve(curve: &EquityCurve) -> Result<Self, QuantfolioError> {
        if curve.len() < 2 {
            return Err(QuantfolioError::InsufficientHistory {
                points: curve.len(),
                minimum: 2,
            });
        }

        let first = curve.points[0].value;
        let last = curve.points[curve.len() - 1].value;
        let total_return = if first > 0.0 { last / first - 1.0 } else { 0.0 };

        let periods = curve.len() as f64;
        let annualized_return =
            (1.0 + total_return).powf(TRADING_DAYS_PER_YEAR / periods) - 1.0;

        let daily_returns: Vec<f64> = curve
            .points
            .windows(2)
            .map(|w| {
                let prev = w[0].value;
                if prev > 0.0 {
                    w[1].value / prev - 1.0
                } else {
                    0.0
                }
            })
            .collect();
        let annualized_volatility =
            sample_stddev(&daily_returns) * TRADING_DAYS_PER_YEAR.sqrt();

        // Zero volatility is a legitimate degenerate state (flat curve), not
        // an error.
        let sharpe_ratio = if annualized_volatility > 0.0 {
            annualized_return / annualized_volatility
        } else {
            0.0
        };

        let max_drawdown = compute_max_drawdown(curve);

        Ok(Metrics {
            total_return,
            annualized_return,
            annualized_volatility,
            sharpe_ratio,
            max_drawdown,
        })
    }
}

/// Minimum of (value - running_max) / running_max over the curve; 0 for a
/// non-decreasing curve.
fn compute_max_drawdown(curve: &EquityCurve) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for point in &curve.points {
        if point.value > peak {
            peak = point.value;
        }
        if peak > 0.0 {
            let drawdown = (point.value - peak) / peak;
            if drawdown < worst {
                worst = drawdown;
            }
        }
    }
    worst
}

fn sample_stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean: f64 = values.iter().sum::<f64>() / n;
    let variance: f64 =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}
