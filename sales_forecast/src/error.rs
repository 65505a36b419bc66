//! Error types for the sales_forecast crate

use polars::prelude::PolarsError;
use revenue_math::MathError;
use thiserror::Error;

/// Reasons a single record or query cannot be turned into a feature vector
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodingError {
    /// A required column was absent or empty for this row
    #[error("Missing field: {0}")]
    MissingField(String),

    /// A feature was negative, NaN or infinite
    #[error("Invalid feature '{name}': {value}")]
    InvalidFeature { name: String, value: f64 },

    /// The revenue value is not a finite number
    #[error("Invalid revenue: {0}")]
    InvalidTarget(f64),

    /// The weekday label is not one of 월 화 수 목 금 토 일
    #[error("Unknown weekday label: '{0}'")]
    UnknownWeekday(String),
}

/// Custom error types for the sales_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Fetching or reading the sales table failed
    #[error("Data source error: {0}")]
    DataSource(String),

    /// No model has been saved to the slot yet
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Training was attempted without a single usable record
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// A record or query could not be encoded
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration could not be read or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from the regression math
    #[error("Math error: {0}")]
    Math(#[from] MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Model (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<toml::de::Error> for ForecastError {
    fn from(err: toml::de::Error) -> Self {
        ForecastError::Config(err.to_string())
    }
}
