//! Discrete share allocation from continuous weights and a cash budget.

use std::collections::HashMap;

use super::error::QuantfolioError;

/// Integer share counts plus whatever cash could not be deployed.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub shares: HashMap<String, i64>,
    pub leftover: f64,
}

impl Allocation {
    pub fn spent(&self, prices: &HashMap<String, f64>) -> f64 {
        self.shares
            .iter()
            .map(|(asset, &count)| count as f64 * prices.get(asset).copied().unwrap_or(0.0))
            .sum()
    }
}

/// Greedy deficit-minimizing rounding of `budget * weight / price`.
///
/// Floors every ideal share count first, then repeatedly awards one share
/// to the affordable asset furthest below its ideal fractional allocation,
/// until nothing below its ideal is affordable.
pub fn allocate_greedy(
    weights: &HashMap<String, f64>,
    prices: &HashMap<String, f64>,
    budget: f64,
) -> Result<Allocation, QuantfolioError> {
    if budget < 0.0 {
        return Err(QuantfolioError::AllocationInfeasible {
            reason: format!("budget must be non-negative, got {budget}"),
        });
    }
    if !weights.is_empty()
        && !weights.keys().any(|asset| {
            prices
                .get(asset)
                .is_some_and(|&p| p.is_finite() && p > 0.0)
        })
    {
        return Err(QuantfolioError::AllocationInfeasible {
            reason: "no asset has a positive price".into(),
        });
    }

    let total_weight: f64 = weights.values().filter(|w| w.is_finite()).sum();

    struct Entry {
        asset: String,
        price: f64,
        ideal: f64,
        shares: i64,
    }

    let mut entries: Vec<Entry> = weights
        .iter()
        .map(|(asset, &w)| {
            let price = prices.get(asset).copied().unwrap_or(f64::NAN);
            let purchasable = price.is_finite() && price > 0.0;
            let ideal = if purchasable && total_weight > 0.0 {
                (budget * w / total_weight / price).max(0.0)
            } else {
                0.0
            };
            Entry {
                asset: asset.clone(),
                price,
                ideal,
                shares: ideal.floor() as i64,
            }
        })
        .collect();
    entries.sort_by(|a, b| a.asset.cmp(&b.asset));

    let mut leftover = budget
        - entries
            .iter()
            .filter(|e| e.shares > 0)
            .map(|e| e.shares as f64 * e.price)
            .sum::<f64>();

    loop {
        let candidate = entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.price.is_finite() && e.price > 0.0 && e.price <= leftover)
            .max_by(|(_, a), (_, b)| {
                let da = a.ideal - a.shares as f64;
                let db = b.ideal - b.shares as f64;
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(idx, e)| (idx, e.ideal - e.shares as f64));
        match candidate {
            Some((idx, deficit)) if deficit > 0.0 => {
                leftover -= entries[idx].price;
                entries[idx].shares += 1;
            }
            _ => break,
        }
    }

    Ok(Allocation {
        shares: entries.into_iter().map(|e| (e.asset, e.shares)).collect(),
        leftover,
    })
}
