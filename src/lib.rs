//! # Sales Forecast Workspace
//!
//! Umbrella crate for the restaurant revenue forecasting workspace.
//!
//! - [`sales_forecast`]: records, encoding, training, model slots and the
//!   forecast service
//! - [`revenue_math`]: regression trees, bagged forests and error statistics
//!
//! ## Example
//!
//! ```
//! use sales_forecast_workspace::sales_forecast::{encode, DayOfWeek};
//!
//! let vector = encode([10.0, 10.0, 10.0, 50.0, 200.0], DayOfWeek::Monday).unwrap();
//! assert_eq!(vector.as_slice().len(), 12);
//! assert_eq!(vector.weekday_block()[0], 1.0);
//! ```

pub use revenue_math;
pub use sales_forecast;
