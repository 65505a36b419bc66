//! Error statistics for fitted regressors

use crate::{MathError, Result};
use statrs::statistics::Statistics;

/// Arithmetic mean of a non-empty slice
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot take the mean of zero values".to_string(),
        ));
    }
    Ok(values.mean())
}

/// Mean absolute deviation between predictions and true values
pub fn mean_absolute_error(predicted: &[f64], actual: &[f64]) -> Result<f64> {
    if predicted.len() != actual.len() {
        return Err(MathError::InvalidInput(format!(
            "Predictions ({}) and actual values ({}) differ in length",
            predicted.len(),
            actual.len()
        )));
    }
    if predicted.is_empty() {
        return Err(MathError::InsufficientData(
            "No values to compare".to_string(),
        ));
    }

    Ok(predicted
        .iter()
        .zip(actual)
        .map(|(p, a)| (p - a).abs())
        .mean())
}

/// Mean absolute error normalised by the mean of the actual values.
///
/// A zero mean leaves the ratio undefined and is reported as a
/// `CalculationError`, as is any non-finite result.
pub fn relative_error(predicted: &[f64], actual: &[f64]) -> Result<f64> {
    let mae = mean_absolute_error(predicted, actual)?;
    let scale = mean(actual)?;

    if scale == 0.0 {
        return Err(MathError::CalculationError(
            "Mean of actual values is zero; relative error is undefined".to_string(),
        ));
    }

    let ratio = mae / scale;
    if !ratio.is_finite() {
        return Err(MathError::CalculationError(format!(
            "Relative error is not finite ({})",
            ratio
        )));
    }
    Ok(ratio.abs())
}
