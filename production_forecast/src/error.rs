//! Error types for the production_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the production_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// A required input column is absent
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error from invalid parameters or configuration
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error raised by, or about the output of, the regression model
    #[error("Model error: {0}")]
    ModelError(String),

    /// Error from window statistics
    #[error("Math error: {0}")]
    MathError(#[from] feature_math::MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error from JSON (de)serialization
    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    /// Error from CSV writing
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}
