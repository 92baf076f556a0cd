//! Domain error types.

/// Top-level error type for quantfolio.
#[derive(Debug, thiserror::Error)]
pub enum QuantfolioError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("price data unavailable: {reason}")]
    DataUnavailable { reason: String },

    #[error("insufficient data for {context}: have {observations} observations, need {minimum}")]
    InsufficientData {
        context: String,
        observations: usize,
        minimum: usize,
    },

    #[error("optimization infeasible: {reason}")]
    OptimizationInfeasible { reason: String },

    #[error("equity curve too short: have {points} points, need {minimum}")]
    InsufficientHistory { points: usize, minimum: usize },

    #[error("allocation infeasible: {reason}")]
    AllocationInfeasible { reason: String },

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&QuantfolioError> for std::process::ExitCode {
    fn from(err: &QuantfolioError) -> Self {
        let code: u8 = match err {
            QuantfolioError::Io(_) => 1,
            QuantfolioError::ConfigParse { .. }
            | QuantfolioError::ConfigMissing { .. }
            | QuantfolioError::ConfigInvalid { .. }
            | QuantfolioError::InvalidInput { .. } => 2,
            QuantfolioError::DataUnavailable { .. } => 3,
            QuantfolioError::InsufficientData { .. }
            | QuantfolioError::InsufficientHistory { .. } => 4,
            QuantfolioError::OptimizationInfeasible { .. }
            | QuantfolioError::AllocationInfeasible { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
