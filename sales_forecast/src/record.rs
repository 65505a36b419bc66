//! Sales records and weekday labels

use crate::error::EncodingError;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of raw numeric features per record
pub const FEATURE_COUNT: usize = 5;

/// Number of weekday labels
pub const WEEKDAY_COUNT: usize = 7;

/// Display names of the raw features, in encoding order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "울산이자카야 검색량",
    "울산달동술집 검색량",
    "울산술집 검색량",
    "울산삼산술집 검색량",
    "플레이스 유입수",
];

/// Day of the week, ordered from Monday (ordinal 0) to Sunday (ordinal 6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// All weekdays in ordinal order
    pub const ALL: [DayOfWeek; WEEKDAY_COUNT] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    /// Position of this day in the one-hot block (Monday = 0)
    pub fn ordinal(self) -> usize {
        match self {
            DayOfWeek::Monday => 0,
            DayOfWeek::Tuesday => 1,
            DayOfWeek::Wednesday => 2,
            DayOfWeek::Thursday => 3,
            DayOfWeek::Friday => 4,
            DayOfWeek::Saturday => 5,
            DayOfWeek::Sunday => 6,
        }
    }

    /// Label used in the sales sheet
    pub fn label(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "월",
            DayOfWeek::Tuesday => "화",
            DayOfWeek::Wednesday => "수",
            DayOfWeek::Thursday => "목",
            DayOfWeek::Friday => "금",
            DayOfWeek::Saturday => "토",
            DayOfWeek::Sunday => "일",
        }
    }

    /// Parse a sheet label, ignoring surrounding whitespace
    pub fn from_label(label: &str) -> Result<Self, EncodingError> {
        let trimmed = label.trim();
        Self::ALL
            .into_iter()
            .find(|day| day.label() == trimmed)
            .ok_or_else(|| EncodingError::UnknownWeekday(label.to_string()))
    }

    /// Weekday of a calendar date (ISO convention, Monday first)
    pub fn from_date(date: NaiveDate) -> Self {
        date.weekday().into()
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        Self::ALL[weekday.num_days_from_monday() as usize]
    }
}

impl FromStr for DayOfWeek {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One historical row of the sales sheet.
///
/// Fields are kept as parsed-or-missing so malformed rows survive loading;
/// the encoder decides whether a row is usable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SalesRecord {
    /// Search volumes and place inflow, in [`FEATURE_NAMES`] order
    pub features: [Option<f64>; FEATURE_COUNT],
    /// Raw weekday label
    pub weekday: Option<String>,
    /// Revenue in won
    pub revenue: Option<f64>,
}

impl SalesRecord {
    /// Create a fully populated record
    pub fn new(features: [f64; FEATURE_COUNT], weekday: &str, revenue: f64) -> Self {
        Self {
            features: features.map(Some),
            weekday: Some(weekday.to_string()),
            revenue: Some(revenue),
        }
    }
}
