//! Configuration for the forecasting pipeline
//!
//! Everything can be read from a TOML file; absent keys fall back to the
//! defaults below and unknown keys are rejected.
//!
//! ```toml
//! [source]
//! csv_path = "sales.csv"
//!
//! [model]
//! path = "model.json"
//! n_estimators = 100
//! seed = 42
//!
//! [estimator]
//! fallback_ratio = 0.1
//! ```

use crate::data::{CsvFileSource, DataSource, SheetSource};
use crate::error::{ForecastError, Result};
use crate::estimator::FALLBACK_RATIO;
use crate::record::{FEATURE_COUNT, FEATURE_NAMES};
use revenue_math::{ForestParams, TreeParams};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Sheet the restaurant keeps its daily sales in
pub const DEFAULT_SHEET_URL: &str = "https://docs.google.com/spreadsheets/d/1amJjEsYbWHEnJuy6em3phSStqtyE4f9ryak0I0KBNf4/edit?usp=sharing";

/// Default model slot
pub const DEFAULT_MODEL_PATH: &str = "model.json";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastConfig {
    pub source: SourceConfig,
    pub model: ModelConfig,
    pub estimator: EstimatorConfig,
    pub columns: ColumnNames,
}

/// Where the sales table comes from. A CSV path wins over a sheet URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub csv_path: Option<PathBuf>,
    pub sheet_url: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            csv_path: None,
            sheet_url: Some(DEFAULT_SHEET_URL.to_string()),
        }
    }
}

/// Model slot and training parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    pub path: PathBuf,
    pub n_estimators: usize,
    pub seed: u64,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let forest = ForestParams::default();
        Self {
            path: PathBuf::from(DEFAULT_MODEL_PATH),
            n_estimators: forest.n_estimators,
            seed: forest.seed,
            max_depth: forest.tree.max_depth,
            min_samples_split: forest.tree.min_samples_split,
            min_samples_leaf: forest.tree.min_samples_leaf,
        }
    }
}

impl ModelConfig {
    /// Forest parameters described by this section
    pub fn forest_params(&self) -> ForestParams {
        ForestParams {
            n_estimators: self.n_estimators,
            seed: self.seed,
            tree: TreeParams {
                max_depth: self.max_depth,
                min_samples_split: self.min_samples_split,
                min_samples_leaf: self.min_samples_leaf,
            },
        }
    }
}

/// Error band estimation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EstimatorConfig {
    /// Ratio used when the error cannot be measured
    pub fallback_ratio: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            fallback_ratio: FALLBACK_RATIO,
        }
    }
}

/// Column names of the sales table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnNames {
    /// Feature columns, in encoding order
    pub features: [String; FEATURE_COUNT],
    pub weekday: String,
    pub revenue: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            features: FEATURE_NAMES.map(str::to_string),
            weekday: "요일".to_string(),
            revenue: "매출".to_string(),
        }
    }
}

impl ForecastConfig {
    /// Read and validate a TOML configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            ForecastError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        self.model
            .forest_params()
            .validate()
            .map_err(|e| ForecastError::Config(e.to_string()))?;

        let ratio = self.estimator.fallback_ratio;
        if !ratio.is_finite() || ratio < 0.0 {
            return Err(ForecastError::Config(format!(
                "fallback_ratio must be a non-negative number, got {}",
                ratio
            )));
        }

        if self.source.csv_path.is_none() && self.source.sheet_url.is_none() {
            return Err(ForecastError::Config(
                "Either source.csv_path or source.sheet_url must be set".to_string(),
            ));
        }

        Ok(())
    }

    /// Build the data source this configuration points at
    pub fn data_source(&self) -> Result<Box<dyn DataSource>> {
        match (&self.source.csv_path, &self.source.sheet_url) {
            (Some(path), _) => Ok(Box::new(CsvFileSource::new(path))),
            (None, Some(url)) => Ok(Box::new(SheetSource::new(url))),
            (None, None) => Err(ForecastError::Config(
                "No sales data source configured".to_string(),
            )),
        }
    }
}
