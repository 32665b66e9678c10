use crate::config::{
    Settings, CONTINENT_SUMMARY_FILE, FORECAST_FILE, GLOBAL_SUMMARY_FILE, PERFORMANCE_FILE,
    WINS_SUMMARY_FILE,
};
use crate::error::{DashboardError, Result};
use crate::gdp::GdpTable;
use crate::metrics::Model;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

// ============================================================================
// REPORT ROWS (one struct per offline-generated CSV)
// ============================================================================

/// Row of `model_performance_by_country.csv`. Errors are in raw currency units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub country: String,
    pub continent: String,

    #[serde(default)]
    pub n_observations: Option<usize>,

    #[serde(default)]
    pub n_train: Option<usize>,

    #[serde(default)]
    pub n_test: Option<usize>,

    pub arima_mae: f64,
    pub arima_rmse: f64,
    pub arima_mape: f64,
    pub prophet_mae: f64,
    pub prophet_rmse: f64,
    pub prophet_mape: f64,
}

/// Row of `summary_global_fixed.csv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSummaryRow {
    #[serde(rename = "Metric")]
    pub metric: String,

    #[serde(rename = "Value")]
    pub value: f64,
}

/// Row of `summary_by_continent.csv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinentSummary {
    pub continent: String,
    pub arima_mae: f64,
    pub arima_rmse: f64,
    pub arima_mape: f64,
    pub prophet_mae: f64,
    pub prophet_rmse: f64,
    pub prophet_mape: f64,
}

/// Row of `summary_wins.csv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinsRow {
    pub better_model: String,

    #[serde(rename = "Count")]
    pub count: u64,
}

/// Row of `forecast_outputs.csv`: one model's forecast for one test year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastOutput {
    #[serde(rename = "Country")]
    pub country: String,

    #[serde(rename = "Continent")]
    pub continent: String,

    #[serde(rename = "Model")]
    pub model: Model,

    #[serde(rename = "Year")]
    pub year: i32,

    #[serde(rename = "Actual")]
    pub actual: f64,

    #[serde(rename = "Forecast")]
    pub forecast: f64,
}

impl ForecastOutput {
    pub fn absolute_error(&self) -> f64 {
        (self.actual - self.forecast).abs()
    }
}

// ============================================================================
// GLOBAL METRICS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub mae: f64,
    pub rmse: f64,
    pub mape: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobalMetrics {
    pub arima: ModelMetrics,
    pub prophet: ModelMetrics,
}

impl GlobalMetrics {
    pub const METRIC_NAMES: [&'static str; 6] = [
        "arima_mae",
        "arima_rmse",
        "arima_mape",
        "prophet_mae",
        "prophet_rmse",
        "prophet_mape",
    ];

    /// Resolve the Metric/Value rows. The first row for a metric wins.
    pub fn from_rows(rows: &[GlobalSummaryRow]) -> Result<Self> {
        let lookup = |metric: &str| -> Result<f64> {
            rows.iter()
                .find(|row| row.metric.trim() == metric)
                .map(|row| row.value)
                .ok_or_else(|| DashboardError::MissingMetric {
                    metric: metric.to_string(),
                })
        };

        Ok(Self {
            arima: ModelMetrics {
                mae: lookup("arima_mae")?,
                rmse: lookup("arima_rmse")?,
                mape: lookup("arima_mape")?,
            },
            prophet: ModelMetrics {
                mae: lookup("prophet_mae")?,
                rmse: lookup("prophet_rmse")?,
                mape: lookup("prophet_mape")?,
            },
        })
    }

    pub fn to_rows(&self) -> Vec<GlobalSummaryRow> {
        let values = [
            self.arima.mae,
            self.arima.rmse,
            self.arima.mape,
            self.prophet.mae,
            self.prophet.rmse,
            self.prophet.mape,
        ];
        Self::METRIC_NAMES
            .iter()
            .zip(values)
            .map(|(metric, value)| GlobalSummaryRow {
                metric: metric.to_string(),
                value,
            })
            .collect()
    }

    pub fn for_model(&self, model: Model) -> &ModelMetrics {
        match model {
            Model::Arima => &self.arima,
            Model::Prophet => &self.prophet,
        }
    }
}

// ============================================================================
// CSV IO
// ============================================================================

/// Deserialize every row of a report. `source` names the input in errors.
pub fn read_records<T: DeserializeOwned, R: Read>(reader: R, source: &str) -> Result<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: T = result.map_err(|e| DashboardError::Report {
            file: source.to_string(),
            source: e,
        })?;
        records.push(record);
    }
    Ok(records)
}

pub fn load_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Err(DashboardError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    let file = std::fs::File::open(path)?;
    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    read_records(file, &source)
}

pub fn write_csv<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut wtr = csv::Writer::from_path(path)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

// ============================================================================
// REPORT STORE
// ============================================================================

/// Every table the dashboard serves, loaded once at startup
#[derive(Debug, Clone)]
pub struct ReportStore {
    pub performance: Vec<PerformanceRecord>,
    pub global: GlobalMetrics,
    pub continent_summary: Vec<ContinentSummary>,
    pub wins: Vec<WinsRow>,
    pub gdp: GdpTable,
    pub forecasts: Vec<ForecastOutput>,
}

impl ReportStore {
    pub fn load(settings: &Settings) -> Result<Self> {
        tracing::info!(data_dir = %settings.data_dir.display(), reports_dir = %settings.reports_dir.display(), "Loading report files");

        let performance: Vec<PerformanceRecord> =
            load_csv(&settings.report_path(PERFORMANCE_FILE))?;
        tracing::info!(rows = performance.len(), "✓ Loaded {}", PERFORMANCE_FILE);

        let global_rows: Vec<GlobalSummaryRow> =
            load_csv(&settings.report_path(GLOBAL_SUMMARY_FILE))?;
        let global = GlobalMetrics::from_rows(&global_rows)?;
        tracing::info!("✓ Loaded {}", GLOBAL_SUMMARY_FILE);

        let continent_summary: Vec<ContinentSummary> =
            load_csv(&settings.report_path(CONTINENT_SUMMARY_FILE))?;
        tracing::info!(rows = continent_summary.len(), "✓ Loaded {}", CONTINENT_SUMMARY_FILE);

        let wins: Vec<WinsRow> = load_csv(&settings.report_path(WINS_SUMMARY_FILE))?;
        tracing::info!(rows = wins.len(), "✓ Loaded {}", WINS_SUMMARY_FILE);

        let gdp = GdpTable::load(&settings.gdp_path())?;
        tracing::info!(countries = gdp.len(), years = gdp.years().len(), "✓ Loaded GDP table");

        let forecasts = Self::load_forecasts(settings)?;

        Ok(Self {
            performance,
            global,
            continent_summary,
            wins,
            gdp,
            forecasts,
        })
    }

    /// Forecast outputs and the GDP table are the only inputs `summarize` needs
    pub fn load_forecasts(settings: &Settings) -> Result<Vec<ForecastOutput>> {
        let forecasts: Vec<ForecastOutput> = load_csv(&settings.report_path(FORECAST_FILE))?;
        tracing::info!(rows = forecasts.len(), "✓ Loaded {}", FORECAST_FILE);
        Ok(forecasts)
    }

    pub fn forecasts_for<'a>(&'a self, country: &'a str) -> impl Iterator<Item = &'a ForecastOutput> + 'a {
        self.forecasts.iter().filter(move |f| f.country == country)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_performance_without_count_columns() {
        let csv = "\
country,continent,arima_mae,arima_rmse,arima_mape,prophet_mae,prophet_rmse,prophet_mape
Chile,South America,1e9,2e9,3.5,2e9,3e9,4.5
";
        let rows: Vec<PerformanceRecord> = read_records(csv.as_bytes(), "perf.csv").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].n_train, None);
        assert_eq!(rows[0].arima_mae, 1e9);
        assert_eq!(rows[0].prophet_mape, 4.5);
    }

    #[test]
    fn test_forecast_rows_parse_model_names() {
        let csv = "\
Country,Continent,Model,Year,Actual,Forecast
Chile,South America,ARIMA,2022,100.0,90.0
Chile,South America,Prophet,2022,100.0,104.0
";
        let rows: Vec<ForecastOutput> = read_records(csv.as_bytes(), "forecast.csv").unwrap();
        assert_eq!(rows[0].model, Model::Arima);
        assert_eq!(rows[1].model, Model::Prophet);
        assert_eq!(rows[0].absolute_error(), 10.0);
        assert_eq!(rows[1].absolute_error(), 4.0);
    }

    #[test]
    fn test_unknown_model_is_a_report_error() {
        let csv = "Country,Continent,Model,Year,Actual,Forecast\nChile,South America,LSTM,2022,1,1\n";
        let err = read_records::<ForecastOutput, _>(csv.as_bytes(), "forecast.csv").unwrap_err();
        assert!(matches!(err, DashboardError::Report { ref file, .. } if file == "forecast.csv"));
    }

    #[test]
    fn test_global_metrics_lookup() {
        let rows: Vec<GlobalSummaryRow> = read_records(
            "Metric,Value\narima_mae,1\narima_rmse,2\narima_mape,3\nprophet_mae,4\nprophet_rmse,5\nprophet_mape,6\n"
                .as_bytes(),
            "global.csv",
        )
        .unwrap();

        let metrics = GlobalMetrics::from_rows(&rows).unwrap();
        assert_eq!(metrics.arima.rmse, 2.0);
        assert_eq!(metrics.prophet.mape, 6.0);
        assert_eq!(metrics.for_model(Model::Prophet).mae, 4.0);
        assert_eq!(metrics.to_rows(), rows);
    }

    #[test]
    fn test_global_metrics_missing_metric() {
        let rows = vec![GlobalSummaryRow {
            metric: "arima_mae".to_string(),
            value: 1.0,
        }];
        let err = GlobalMetrics::from_rows(&rows).unwrap_err();
        assert!(matches!(err, DashboardError::MissingMetric { ref metric } if metric == "arima_rmse"));
    }

    #[test]
    fn test_write_then_load_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("summary_wins.csv");
        let wins = vec![
            WinsRow {
                better_model: "ARIMA".to_string(),
                count: 3,
            },
            WinsRow {
                better_model: "Prophet".to_string(),
                count: 2,
            },
        ];
        write_csv(&path, &wins).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("better_model,Count\n"));
        let loaded: Vec<WinsRow> = load_csv(&path).unwrap();
        assert_eq!(loaded, wins);
    }

    #[test]
    fn test_missing_report_file() {
        let err = load_csv::<WinsRow>(Path::new("/nonexistent/summary_wins.csv")).unwrap_err();
        assert!(matches!(err, DashboardError::MissingFile { .. }));
    }
}
