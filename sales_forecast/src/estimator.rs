//! Empirical error ratio and prediction bands

use crate::encoder::{encode_dataset, EncodedDataset};
use crate::error::{ForecastError, Result};
use crate::model::SalesModel;
use crate::record::SalesRecord;
use revenue_math::stats;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Ratio used when the error cannot be measured
pub const FALLBACK_RATIO: f64 = 0.1;

/// Measures how far a model's predictions stray from known revenue
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorEstimator {
    fallback_ratio: f64,
}

impl Default for ErrorEstimator {
    fn default() -> Self {
        Self {
            fallback_ratio: FALLBACK_RATIO,
        }
    }
}

impl ErrorEstimator {
    /// Create an estimator with a custom fallback ratio
    pub fn new(fallback_ratio: f64) -> Result<Self> {
        if !fallback_ratio.is_finite() || fallback_ratio < 0.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "Fallback ratio must be a non-negative number, got {}",
                fallback_ratio
            )));
        }
        Ok(Self { fallback_ratio })
    }

    pub fn fallback_ratio(&self) -> f64 {
        self.fallback_ratio
    }

    /// Mean absolute error over `records` divided by their mean revenue
    pub fn estimate_relative_error(&self, model: &SalesModel, records: &[SalesRecord]) -> f64 {
        self.estimate_encoded(model, &encode_dataset(records))
    }

    /// Same as [`Self::estimate_relative_error`] on an already encoded dataset.
    ///
    /// Falls back to the fixed ratio when nothing could be encoded, when the
    /// mean revenue is zero, or when the model cannot score the data.
    pub fn estimate_encoded(&self, model: &SalesModel, encoded: &EncodedDataset) -> f64 {
        if encoded.is_empty() {
            debug!(
                fallback = self.fallback_ratio,
                "no encodable records; using fallback error ratio"
            );
            return self.fallback_ratio;
        }

        let predictions = match model.predict(&encoded.features) {
            Ok(predictions) => predictions,
            Err(e) => {
                warn!(error = %e, "model could not score the dataset; using fallback error ratio");
                return self.fallback_ratio;
            }
        };

        match stats::relative_error(&predictions, &encoded.targets) {
            Ok(ratio) => ratio,
            Err(e) => {
                debug!(error = %e, "relative error undefined; using fallback error ratio");
                self.fallback_ratio
            }
        }
    }
}

/// Relative error of `model` over `records` with the default fallback
pub fn estimate_relative_error(model: &SalesModel, records: &[SalesRecord]) -> f64 {
    ErrorEstimator::default().estimate_relative_error(model, records)
}

/// Symmetric relative band around a prediction, rounded to whole won
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorBand {
    pub low: f64,
    pub high: f64,
}

impl ErrorBand {
    /// `[round(p × (1 − r)), round(p × (1 + r))]`, ordered so `low <= high`
    pub fn from_prediction(prediction: f64, ratio: f64) -> Self {
        let a = (prediction * (1.0 - ratio)).round();
        let b = (prediction * (1.0 + ratio)).round();
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.low <= value && value <= self.high
    }
}
