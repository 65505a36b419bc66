//! # Sales Forecast
//!
//! Daily revenue forecasting for a single restaurant from search volume,
//! place inflow and the day of the week.
//!
//! ## Features
//!
//! - Sales table loading from a CSV file or a shared spreadsheet
//! - Twelve-value feature encoding (five metrics plus a one-hot weekday)
//! - Bagged regression tree model with a fixed seed
//! - Empirical error band around every prediction
//! - Atomic model slot on disk
//!
//! ## Pipeline
//!
//! A forecast fetches the current table (cached until refresh), loads the
//! saved model (training one only if the slot is empty), encodes the query,
//! predicts and attaches a band sized by the model's relative error over the
//! table. `refresh` is the only operation that replaces an existing model.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chrono::NaiveDate;
//! use sales_forecast::data::CsvFileSource;
//! use sales_forecast::store::FileModelStore;
//! use sales_forecast::{ForecastRequest, ForecastService};
//!
//! let mut service = ForecastService::new(
//!     Box::new(CsvFileSource::new("sales.csv")),
//!     Box::new(FileModelStore::new("model.json")),
//! );
//!
//! let date = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
//! let forecast = service.forecast(&ForecastRequest::with_defaults(date))?;
//! println!("{}", forecast);
//! # Ok::<(), sales_forecast::ForecastError>(())
//! ```

pub mod config;
pub mod data;
pub mod encoder;
pub mod error;
pub mod estimator;
pub mod model;
pub mod record;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use crate::config::ForecastConfig;
pub use crate::data::{DataSource, Dataset};
pub use crate::encoder::{encode, encode_dataset, EncodedDataset, FeatureVector};
pub use crate::error::{EncodingError, ForecastError};
pub use crate::estimator::{estimate_relative_error, ErrorBand, ErrorEstimator};
pub use crate::model::{ModelTrainer, SalesModel};
pub use crate::record::{DayOfWeek, SalesRecord};
pub use crate::service::{Forecast, ForecastRequest, ForecastService, RefreshSummary};
pub use crate::store::{ModelState, ModelStore};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
