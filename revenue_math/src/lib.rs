//! # Revenue Math
//!
//! Numeric building blocks for revenue forecasting.
//! This crate provides CART regression trees, a bagged ensemble of them,
//! and the error statistics used to size prediction bands.

use thiserror::Error;

pub mod forest;
pub mod stats;
pub mod tree;

pub use forest::{BaggedForest, ForestParams};
pub use tree::{RegressionTree, TreeNode, TreeParams};

/// Errors that can occur in regression calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for revenue math operations
pub type Result<T> = std::result::Result<T, MathError>;

/// Check that a feature matrix and target vector can be fitted together.
///
/// Returns the number of features per row.
pub(crate) fn validate_training_data<R: AsRef<[f64]>>(x: &[R], y: &[f64]) -> Result<usize> {
    if x.len() != y.len() {
        return Err(MathError::InvalidInput(format!(
            "Feature rows ({}) and targets ({}) must have the same length",
            x.len(),
            y.len()
        )));
    }
    let Some(first) = x.first() else {
        return Err(MathError::InsufficientData(
            "Cannot fit with zero samples".to_string(),
        ));
    };

    let n_features = first.as_ref().len();
    if n_features == 0 {
        return Err(MathError::InvalidInput(
            "Feature rows must not be empty".to_string(),
        ));
    }

    for (row_idx, row) in x.iter().enumerate() {
        let row = row.as_ref();
        if row.len() != n_features {
            return Err(MathError::InvalidInput(format!(
                "Row {} has {} features, expected {}",
                row_idx,
                row.len(),
                n_features
            )));
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(format!(
                "Row {} contains a non-finite feature",
                row_idx
            )));
        }
    }

    if let Some(pos) = y.iter().position(|v| !v.is_finite()) {
        return Err(MathError::InvalidInput(format!(
            "Target {} is not finite",
            pos
        )));
    }

    Ok(n_features)
}
