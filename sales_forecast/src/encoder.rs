//! Feature encoding for records and live queries
//!
//! A feature vector is the five raw features followed by a one-hot weekday
//! block, twelve values in total. Historical rows that cannot be encoded are
//! skipped and reported; live queries surface the encoding error instead.

use crate::error::EncodingError;
use crate::record::{DayOfWeek, SalesRecord, FEATURE_COUNT, FEATURE_NAMES, WEEKDAY_COUNT};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Length of every encoded feature vector
pub const VECTOR_LEN: usize = FEATURE_COUNT + WEEKDAY_COUNT;

/// Fixed-length model input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; VECTOR_LEN]);

impl FeatureVector {
    /// Raw feature values
    pub fn features(&self) -> &[f64] {
        &self.0[..FEATURE_COUNT]
    }

    /// One-hot weekday block
    pub fn weekday_block(&self) -> &[f64] {
        &self.0[FEATURE_COUNT..]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl AsRef<[f64]> for FeatureVector {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

/// A record that was left out of an encoded dataset
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    /// Position of the record in the input slice
    pub index: usize,
    /// Why it could not be encoded
    pub reason: EncodingError,
}

/// Survivors of dataset encoding plus the rows that were skipped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodedDataset {
    pub features: Vec<FeatureVector>,
    pub targets: Vec<f64>,
    pub skipped: Vec<SkippedRecord>,
}

impl EncodedDataset {
    /// Number of encoded samples
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Encode raw features and a weekday into a feature vector
pub fn encode(
    features: [f64; FEATURE_COUNT],
    weekday: DayOfWeek,
) -> Result<FeatureVector, EncodingError> {
    let mut vector = [0.0; VECTOR_LEN];

    for (idx, value) in features.into_iter().enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(EncodingError::InvalidFeature {
                name: FEATURE_NAMES[idx].to_string(),
                value,
            });
        }
        vector[idx] = value;
    }
    vector[FEATURE_COUNT + weekday.ordinal()] = 1.0;

    Ok(FeatureVector(vector))
}

/// Encode raw features with a weekday given as a sheet label
pub fn encode_labeled(
    features: [f64; FEATURE_COUNT],
    label: &str,
) -> Result<FeatureVector, EncodingError> {
    encode(features, DayOfWeek::from_label(label)?)
}

/// Encode a historical record into a feature vector and its revenue target
pub fn encode_record(record: &SalesRecord) -> Result<(FeatureVector, f64), EncodingError> {
    let mut features = [0.0; FEATURE_COUNT];
    for (idx, value) in record.features.iter().enumerate() {
        features[idx] =
            value.ok_or_else(|| EncodingError::MissingField(FEATURE_NAMES[idx].to_string()))?;
    }

    let label = record
        .weekday
        .as_deref()
        .ok_or_else(|| EncodingError::MissingField("요일".to_string()))?;
    let revenue = record
        .revenue
        .ok_or_else(|| EncodingError::MissingField("매출".to_string()))?;
    if !revenue.is_finite() {
        return Err(EncodingError::InvalidTarget(revenue));
    }

    Ok((encode_labeled(features, label)?, revenue))
}

/// Encode every usable record, skipping and reporting the rest
pub fn encode_dataset(records: &[SalesRecord]) -> EncodedDataset {
    let mut dataset = EncodedDataset::default();

    for (index, record) in records.iter().enumerate() {
        match encode_record(record) {
            Ok((vector, target)) => {
                dataset.features.push(vector);
                dataset.targets.push(target);
            }
            Err(reason) => {
                debug!(index, %reason, "skipping record");
                dataset.skipped.push(SkippedRecord { index, reason });
            }
        }
    }

    if !dataset.skipped.is_empty() {
        warn!(
            skipped = dataset.skipped.len(),
            encoded = dataset.len(),
            "some sales records could not be encoded"
        );
    }

    dataset
}
