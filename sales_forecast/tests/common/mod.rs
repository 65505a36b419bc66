#![allow(dead_code)]

use polars::prelude::DataFrame;
use sales_forecast::data::{read_csv_bytes, DataSource};
use sales_forecast::error::Result;
use std::cell::Cell;
use std::rc::Rc;

pub const HEADER: &str =
    "울산이자카야 검색량,울산달동술집 검색량,울산술집 검색량,울산삼산술집 검색량,플레이스 유입수,요일,매출";

/// Build a sales table from CSV data rows
pub fn table(rows: &[&str]) -> DataFrame {
    let mut text = String::from(HEADER);
    text.push('\n');
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    read_csv_bytes(text.into_bytes()).unwrap()
}

/// The two-day table used throughout the scenario tests
pub fn two_day_table() -> DataFrame {
    table(&[
        "10,10,10,50,200,월,1000000",
        "20,20,20,60,300,화,1500000",
    ])
}

/// A week of plausible sales
pub fn week_table() -> DataFrame {
    table(&[
        "10,12,30,50,200,월,900000",
        "11,13,28,55,210,화,950000",
        "14,15,35,60,260,수,1100000",
        "16,18,40,62,280,목,1250000",
        "25,30,60,90,420,금,2100000",
        "30,33,70,95,480,토,2400000",
        "12,14,33,52,230,일,1000000",
    ])
}

/// Data source that counts how often it is fetched
pub struct CountingSource {
    df: DataFrame,
    fetches: Rc<Cell<usize>>,
}

impl CountingSource {
    pub fn new(df: DataFrame) -> (Self, Rc<Cell<usize>>) {
        let fetches = Rc::new(Cell::new(0));
        (
            Self {
                df,
                fetches: Rc::clone(&fetches),
            },
            fetches,
        )
    }
}

impl DataSource for CountingSource {
    fn fetch(&self) -> Result<DataFrame> {
        self.fetches.set(self.fetches.get() + 1);
        Ok(self.df.clone())
    }

    fn describe(&self) -> String {
        "counting source".to_string()
    }
}
