//! Forecast orchestration
//!
//! [`ForecastService`] ties a data source and a model slot together. A
//! forecast uses the saved model as-is and trains one only when the slot is
//! empty; [`ForecastService::refresh`] is the only way to replace an
//! existing model.

use crate::config::{ColumnNames, ForecastConfig};
use crate::data::{DataSource, Dataset};
use crate::encoder::{encode, encode_dataset, EncodedDataset};
use crate::error::{ForecastError, Result};
use crate::estimator::{ErrorBand, ErrorEstimator};
use crate::model::{ModelTrainer, SalesModel};
use crate::record::{DayOfWeek, FEATURE_COUNT};
use crate::store::{FileModelStore, ModelState, ModelStore};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

/// Input values offered when the user has not entered any
pub const DEFAULT_FEATURES: [f64; FEATURE_COUNT] = [10.0, 10.0, 10.0, 50.0, 200.0];

/// One forecast question: current metrics and the day to forecast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastRequest {
    pub features: [f64; FEATURE_COUNT],
    pub date: NaiveDate,
}

impl ForecastRequest {
    pub fn new(features: [f64; FEATURE_COUNT], date: NaiveDate) -> Self {
        Self { features, date }
    }

    /// Request with the default input values
    pub fn with_defaults(date: NaiveDate) -> Self {
        Self::new(DEFAULT_FEATURES, date)
    }
}

/// Revenue forecast for one day, in won
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub date: NaiveDate,
    pub weekday: DayOfWeek,
    /// Prediction rounded half away from zero
    pub point: f64,
    pub low: f64,
    pub high: f64,
    /// Relative error ratio the band was built from
    pub error_ratio: f64,
    pub error_percent: f64,
    /// The saved model was trained on different data than the current table
    pub model_stale: bool,
}

impl fmt::Display for Forecast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.date, self.weekday)?;
        writeln!(f, "  예측 매출: {} 원", format_won(self.point))?;
        writeln!(
            f,
            "  예상 범위: {} ~ {} 원",
            format_won(self.low),
            format_won(self.high)
        )?;
        write!(f, "  오차율: ±{:.1}%", self.error_percent)?;
        if self.model_stale {
            write!(f, "\n  (모델이 최신 데이터로 학습되지 않았습니다. refresh 를 실행하세요)")?;
        }
        Ok(())
    }
}

/// Outcome of a forced retrain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshSummary {
    /// Rows in the fetched table
    pub records: usize,
    /// Rows used for training
    pub samples: usize,
    /// Rows skipped as malformed
    pub skipped: usize,
    /// Relative error of the new model over the fetched table
    pub error_ratio: f64,
}

impl fmt::Display for RefreshSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "모델 재학습 완료: {}건 중 {}건 사용, {}건 제외, 오차율 {:.1}%",
            self.records,
            self.samples,
            self.skipped,
            self.error_ratio * 100.0
        )
    }
}

/// Fetch → model → predict → error band pipeline
pub struct ForecastService {
    source: Box<dyn DataSource>,
    store: Box<dyn ModelStore>,
    columns: ColumnNames,
    trainer: ModelTrainer,
    estimator: ErrorEstimator,
    dataset: Option<Dataset>,
}

impl ForecastService {
    /// Create a service with default columns, trainer and estimator
    pub fn new(source: Box<dyn DataSource>, store: Box<dyn ModelStore>) -> Self {
        Self {
            source,
            store,
            columns: ColumnNames::default(),
            trainer: ModelTrainer::default(),
            estimator: ErrorEstimator::default(),
            dataset: None,
        }
    }

    /// Build a service from a validated configuration
    pub fn from_config(config: &ForecastConfig) -> Result<Self> {
        config.validate()?;
        let service = Self::new(
            config.data_source()?,
            Box::new(FileModelStore::new(&config.model.path)),
        )
        .with_columns(config.columns.clone())
        .with_trainer(ModelTrainer::new(config.model.forest_params())?)
        .with_estimator(ErrorEstimator::new(config.estimator.fallback_ratio)?);
        Ok(service)
    }

    pub fn with_columns(mut self, columns: ColumnNames) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_trainer(mut self, trainer: ModelTrainer) -> Self {
        self.trainer = trainer;
        self
    }

    pub fn with_estimator(mut self, estimator: ErrorEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    /// Current dataset, fetched on first use and cached until refresh
    pub fn dataset(&mut self) -> Result<&Dataset> {
        self.ensure_dataset()?;
        self.cached_dataset()
    }

    /// Drop the cached dataset so the next call fetches again
    pub fn invalidate(&mut self) {
        self.dataset = None;
    }

    /// Forecast revenue for the requested day.
    ///
    /// Trains and saves a model only if none has been saved yet.
    pub fn forecast(&mut self, request: &ForecastRequest) -> Result<Forecast> {
        self.ensure_dataset()?;
        let encoded = encode_dataset(self.cached_dataset()?.records());

        let (model, model_stale) = self.acquire_model(&encoded)?;

        let weekday = DayOfWeek::from_date(request.date);
        let query = encode(request.features, weekday)?;

        let prediction = model.predict_one(&query)?;
        let error_ratio = self.estimator.estimate_encoded(&model, &encoded);
        let band = ErrorBand::from_prediction(prediction, error_ratio);

        Ok(Forecast {
            date: request.date,
            weekday,
            point: prediction.round(),
            low: band.low,
            high: band.high,
            error_ratio,
            error_percent: error_ratio * 100.0,
            model_stale,
        })
    }

    /// Re-fetch the table, retrain unconditionally and save the new model.
    ///
    /// If training fails the previously saved model is left untouched.
    pub fn refresh(&mut self) -> Result<RefreshSummary> {
        self.invalidate();

        let dataset = Dataset::load(self.source.as_ref(), &self.columns)?;
        let encoded = encode_dataset(dataset.records());
        let model = self.trainer.train_encoded(&encoded)?;
        self.store.save(&model)?;

        let summary = RefreshSummary {
            records: dataset.len(),
            samples: encoded.len(),
            skipped: encoded.skipped.len(),
            error_ratio: self.estimator.estimate_encoded(&model, &encoded),
        };
        info!(
            records = summary.records,
            samples = summary.samples,
            skipped = summary.skipped,
            error_ratio = summary.error_ratio,
            "model refreshed"
        );

        self.dataset = Some(dataset);
        Ok(summary)
    }

    fn ensure_dataset(&mut self) -> Result<()> {
        if self.dataset.is_none() {
            self.dataset = Some(Dataset::load(self.source.as_ref(), &self.columns)?);
        }
        Ok(())
    }

    fn cached_dataset(&self) -> Result<&Dataset> {
        self.dataset
            .as_ref()
            .ok_or_else(|| ForecastError::DataSource("Sales table has not been fetched".to_string()))
    }

    fn acquire_model(&self, encoded: &EncodedDataset) -> Result<(SalesModel, bool)> {
        match ModelState::resolve(self.store.as_ref(), encoded)? {
            ModelState::Ready(model) => Ok((model, false)),
            ModelState::Stale(model) => {
                warn!(
                    store = %self.store.describe(),
                    trained_on = model.summary().samples,
                    current = encoded.len(),
                    "saved model was trained on different data; refresh to retrain"
                );
                Ok((model, true))
            }
            ModelState::Missing => {
                info!(store = %self.store.describe(), "no saved model; training a new one");
                let model = self.trainer.train_encoded(encoded)?;
                self.store.save(&model)?;
                Ok((model, false))
            }
        }
    }
}

/// Format whole won with thousands separators, e.g. `1,250,000`
pub fn format_won(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
