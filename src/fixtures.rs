// Small report set shared by unit tests

use crate::config::Settings;
use crate::gdp::GdpTable;
use crate::queries::Dashboard;
use crate::reports::{read_records, GlobalMetrics, GlobalSummaryRow, ReportStore};

pub const PERFORMANCE_CSV: &str = "\
country,continent,n_observations,n_train,n_test,arima_mae,arima_rmse,arima_mape,prophet_mae,prophet_rmse,prophet_mape
Chile,South America,5,2,3,5e9,6e9,3.0,6e9,7e9,3.5
Brazil,South America,5,2,3,20e9,30e9,4.0,10e9,12e9,2.0
Kenya,Africa,,,,2e9,3e9,6.0,2e9,2e9,5.0
Zambia,Africa,5,2,2,0,0,4.0,1e9,1e9,3.0
";

pub const GLOBAL_CSV: &str = "\
Metric,Value
arima_mae,6750000000
arima_rmse,9750000000
arima_mape,4.25
prophet_mae,4750000000
prophet_rmse,5500000000
prophet_mape,3.375
";

pub const CONTINENT_CSV: &str = "\
continent,arima_mae,arima_rmse,arima_mape,prophet_mae,prophet_rmse,prophet_mape
South America,12500000000,18000000000,3.5,8000000000,9500000000,2.75
Africa,1000000000,1500000000,5.0,1500000000,1500000000,4.0
";

pub const WINS_CSV: &str = "\
better_model,Count
ARIMA,3
Prophet,1
";

pub const GDP_CSV: &str = "\
Name of country,Continent,2020,2021,2022,2023,2024
Chile,South America,250e9,260e9,300e9,320e9,330e9
Brazil,South America,1500e9,1600e9,1900e9,2000e9,2125e9
Zambia,Africa,20e9,21e9,22e9,23e9,
Norway,Europe,360e9,480e9,590e9,540e9,480e9
";

pub const FORECAST_CSV: &str = "\
Country,Continent,Model,Year,Actual,Forecast
Chile,South America,ARIMA,2022,300e9,310e9
Chile,South America,Prophet,2022,300e9,280e9
Chile,South America,ARIMA,2023,320e9,350e9
Chile,South America,Prophet,2023,320e9,325e9
Chile,South America,ARIMA,2024,330e9,335e9
Chile,South America,Prophet,2024,330e9,325e9
Brazil,South America,ARIMA,2022,1900e9,1950e9
Brazil,South America,Prophet,2022,1900e9,1890e9
Kenya,Africa,ARIMA,2022,110e9,112e9
Kenya,Africa,Prophet,2022,110e9,108e9
";

pub fn store() -> ReportStore {
    let global_rows: Vec<GlobalSummaryRow> =
        read_records(GLOBAL_CSV.as_bytes(), "summary_global_fixed.csv").unwrap();

    ReportStore {
        performance: read_records(PERFORMANCE_CSV.as_bytes(), "model_performance_by_country.csv")
            .unwrap(),
        global: GlobalMetrics::from_rows(&global_rows).unwrap(),
        continent_summary: read_records(CONTINENT_CSV.as_bytes(), "summary_by_continent.csv")
            .unwrap(),
        wins: read_records(WINS_CSV.as_bytes(), "summary_wins.csv").unwrap(),
        gdp: GdpTable::from_reader(GDP_CSV.as_bytes(), "gdp_2000_2025.csv").unwrap(),
        forecasts: read_records(FORECAST_CSV.as_bytes(), "forecast_outputs.csv").unwrap(),
    }
}

pub fn dashboard() -> Dashboard {
    Dashboard::new(store(), &Settings::default())
}
