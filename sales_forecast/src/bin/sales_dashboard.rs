use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use sales_forecast::record::FEATURE_NAMES;
use sales_forecast::service::DEFAULT_FEATURES;
use sales_forecast::{ForecastConfig, ForecastError, ForecastRequest, ForecastService};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Restaurant revenue forecasting dashboard
#[derive(Debug, Parser)]
#[command(name = "sales_dashboard", version, about)]
struct Cli {
    /// TOML configuration file
    #[arg(long, env = "SALES_FORECAST_CONFIG")]
    config: Option<PathBuf>,

    /// Read the sales table from a local CSV file
    #[arg(long, conflicts_with = "sheet")]
    csv: Option<PathBuf>,

    /// Read the sales table from a shared spreadsheet link
    #[arg(long)]
    sheet: Option<String>,

    /// Model slot path
    #[arg(long)]
    model: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Predict revenue for a day
    Forecast {
        /// Day to forecast (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,

        /// The five current metrics, in sheet column order
        #[arg(long, num_args = 5, value_names = ["IZAKAYA", "DALDONG", "PUBS", "SAMSAN", "INFLOW"])]
        values: Option<Vec<f64>>,
    },
    /// Re-fetch the table and retrain the model
    Refresh,
    /// Print the current sales table
    Show,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("오류: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), ForecastError> {
    let mut config = match &cli.config {
        Some(path) => ForecastConfig::from_file(path)?,
        None => ForecastConfig::default(),
    };
    if let Some(csv) = cli.csv {
        config.source.csv_path = Some(csv);
    }
    if let Some(sheet) = cli.sheet {
        config.source.csv_path = None;
        config.source.sheet_url = Some(sheet);
    }
    if let Some(model) = cli.model {
        config.model.path = model;
    }

    let mut service = ForecastService::from_config(&config)?;

    match cli.command {
        Command::Forecast { date, values } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let features = match values {
                Some(values) => parse_features(&values)?,
                None => DEFAULT_FEATURES,
            };

            for (name, value) in FEATURE_NAMES.iter().zip(features) {
                println!("{}: {}", name, value);
            }
            let forecast = service.forecast(&ForecastRequest::new(features, date))?;
            println!("{}", forecast);
        }
        Command::Refresh => {
            let summary = service.refresh()?;
            println!("{}", summary);
        }
        Command::Show => {
            let dataset = service.dataset()?;
            println!("{}", dataset.frame());
            println!(
                "{} rows fetched at {}",
                dataset.len(),
                dataset.fetched_at().format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
    }

    Ok(())
}

fn parse_features(values: &[f64]) -> Result<[f64; 5], ForecastError> {
    values.try_into().map_err(|_| {
        ForecastError::InvalidParameter(format!("Expected 5 values, got {}", values.len()))
    })
}
