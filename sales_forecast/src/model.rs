//! Fitted sales model and its trainer

use crate::encoder::{encode_dataset, EncodedDataset, FeatureVector};
use crate::error::{ForecastError, Result};
use crate::record::SalesRecord;
use chrono::{DateTime, Utc};
use revenue_math::stats;
use revenue_math::{BaggedForest, ForestParams};
use serde::{Deserialize, Serialize};
use tracing::info;

/// What a model was trained on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    /// Records that were encoded and used for fitting
    pub samples: usize,
    /// Records skipped as malformed
    pub skipped: usize,
    /// Mean revenue over the training samples
    pub target_mean: f64,
    pub trained_at: DateTime<Utc>,
}

impl TrainingSummary {
    /// Whether `encoded` looks like the data this model was trained on.
    ///
    /// Only the sample count and target mean are compared.
    pub fn matches(&self, encoded: &EncodedDataset) -> bool {
        if encoded.len() != self.samples {
            return false;
        }
        match stats::mean(&encoded.targets) {
            Ok(mean) => (mean - self.target_mean).abs() <= 1e-9 * self.target_mean.abs().max(1.0),
            Err(_) => false,
        }
    }
}

/// Bagged-tree revenue regressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesModel {
    forest: BaggedForest,
    summary: TrainingSummary,
}

impl SalesModel {
    /// Predict revenue for each feature vector
    pub fn predict(&self, vectors: &[FeatureVector]) -> Result<Vec<f64>> {
        Ok(self.forest.predict(vectors)?)
    }

    /// Predict revenue for one feature vector
    pub fn predict_one(&self, vector: &FeatureVector) -> Result<f64> {
        Ok(self.forest.predict_one(vector.as_slice())?)
    }

    pub fn summary(&self) -> &TrainingSummary {
        &self.summary
    }

    pub fn forest(&self) -> &BaggedForest {
        &self.forest
    }

    /// True when `encoded` differs from the training data
    pub fn is_stale_for(&self, encoded: &EncodedDataset) -> bool {
        !self.summary.matches(encoded)
    }
}

/// Fits [`SalesModel`]s from sales records
#[derive(Debug, Clone, Default)]
pub struct ModelTrainer {
    params: ForestParams,
}

impl ModelTrainer {
    /// Create a trainer with explicit forest parameters
    pub fn new(params: ForestParams) -> Result<Self> {
        params
            .validate()
            .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Encode `records` (skipping malformed rows) and fit a model
    pub fn train(&self, records: &[SalesRecord]) -> Result<SalesModel> {
        self.train_encoded(&encode_dataset(records))
    }

    /// Fit a model on an already encoded dataset
    pub fn train_encoded(&self, encoded: &EncodedDataset) -> Result<SalesModel> {
        if encoded.is_empty() {
            return Err(ForecastError::InsufficientData(format!(
                "No usable sales records ({} skipped as malformed)",
                encoded.skipped.len()
            )));
        }

        info!(
            samples = encoded.len(),
            skipped = encoded.skipped.len(),
            n_estimators = self.params.n_estimators,
            seed = self.params.seed,
            "training sales model"
        );

        let forest = BaggedForest::fit(&encoded.features, &encoded.targets, self.params)?;
        let summary = TrainingSummary {
            samples: encoded.len(),
            skipped: encoded.skipped.len(),
            target_mean: stats::mean(&encoded.targets)?,
            trained_at: Utc::now(),
        };

        Ok(SalesModel { forest, summary })
    }
}
