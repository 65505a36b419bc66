use chrono::NaiveDate;
use sales_forecast::data::{read_csv_bytes, FrameSource};
use sales_forecast::store::MemoryModelStore;
use sales_forecast::{ForecastRequest, ForecastService};

const SALES: &str = "\
울산이자카야 검색량,울산달동술집 검색량,울산술집 검색량,울산삼산술집 검색량,플레이스 유입수,요일,매출
10,12,30,50,200,월,900000
11,13,28,55,210,화,950000
14,15,35,60,260,수,1100000
16,18,40,62,280,목,1250000
25,30,60,90,420,금,2100000
30,33,70,95,480,토,2400000
12,14,33,52,230,일,1000000
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let table = read_csv_bytes(SALES.as_bytes().to_vec())?;
    println!("Loaded {} days of sales", table.height());

    let mut service = ForecastService::new(
        Box::new(FrameSource::new(table)),
        Box::new(MemoryModelStore::new()),
    );

    // Forecast the following week with the default inputs
    let start = NaiveDate::from_ymd_opt(2024, 1, 8).ok_or("invalid date")?;
    for date in start.iter_days().take(7) {
        let forecast = service.forecast(&ForecastRequest::with_defaults(date))?;
        println!("{}\n", forecast);
    }

    let summary = service.refresh()?;
    println!("{}", summary);

    Ok(())
}
