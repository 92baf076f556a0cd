//! Parsing of asset lists from configuration values.
//!
//! Codes are comma-separated (`AAPL, MSFT`); weights and holdings are
//! comma-separated `TICKER:value` pairs (`AAPL:0.6, MSFT:0.4`).

use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, thiserror::Error)]
pub enum AssetListError {
    #[error("empty token in asset list")]
    EmptyToken,

    #[error("duplicate asset: {0}")]
    DuplicateAsset(String),

    #[error("malformed pair '{0}', expected TICKER:value")]
    MalformedPair(String),

    #[error("invalid number for {asset}: {value}")]
    InvalidNumber { asset: String, value: String },
}

pub fn parse_codes(input: &str) -> Result<Vec<String>, AssetListError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(AssetListError::EmptyToken);
        }
        let code = trimmed.to_uppercase();
        if !seen.insert(code.clone()) {
            return Err(AssetListError::DuplicateAsset(code));
        }
        codes.push(code);
    }

    Ok(codes)
}

pub fn parse_weights(input: &str) -> Result<HashMap<String, f64>, AssetListError> {
    parse_pairs(input, |asset, value| {
        value
            .parse::<f64>()
            .ok()
            .filter(|w| w.is_finite() && *w >= 0.0)
            .ok_or_else(|| AssetListError::InvalidNumber {
                asset: asset.to_string(),
                value: value.to_string(),
            })
    })
}

pub fn parse_holdings(input: &str) -> Result<HashMap<String, i64>, AssetListError> {
    parse_pairs(input, |asset, value| {
        value
            .parse::<i64>()
            .ok()
            .filter(|shares| *shares >= 0)
            .ok_or_else(|| AssetListError::InvalidNumber {
                asset: asset.to_string(),
                value: value.to_string(),
            })
    })
}

fn parse_pairs<T>(
    input: &str,
    parse_value: impl Fn(&str, &str) -> Result<T, AssetListError>,
) -> Result<HashMap<String, T>, AssetListError> {
    let mut out = HashMap::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(AssetListError::EmptyToken);
        }
        let (asset, value) = trimmed
            .split_once(':')
            .ok_or_else(|| AssetListError::MalformedPair(trimmed.to_string()))?;
        let asset = asset.trim().to_uppercase();
        if asset.is_empty() {
            return Err(AssetListError::MalformedPair(trimmed.to_string()));
        }
        let parsed = parse_value(&asset, value.trim())?;
        if out.insert(asset.clone(), parsed).is_some() {
            return Err(AssetListError::DuplicateAsset(asset));
        }
    }

    Ok(out)
}
