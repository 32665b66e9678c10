// Forecast accuracy: winner rule, error metrics, and the summary reports
//
// The summaries mirror what the offline analysis writes to `reports/`:
// per-country metrics, global means, continent means, and win counts.

use crate::error::DashboardError;
use crate::gdp::{GdpObservation, GdpTable};
use crate::reports::{
    ContinentSummary, ForecastOutput, GlobalMetrics, ModelMetrics, PerformanceRecord, WinsRow,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// MODEL
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Model {
    #[serde(rename = "ARIMA")]
    Arima,
    #[serde(rename = "Prophet")]
    Prophet,
}

impl Model {
    pub const ALL: [Model; 2] = [Model::Arima, Model::Prophet];

    pub fn as_str(&self) -> &'static str {
        match self {
            Model::Arima => "ARIMA",
            Model::Prophet => "Prophet",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Model {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "arima" => Ok(Model::Arima),
            "prophet" => Ok(Model::Prophet),
            other => Err(DashboardError::InvalidValue {
                file: "forecast outputs".to_string(),
                column: "Model".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Model {
    type Error = DashboardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Model with the lower error; ties go to ARIMA. A NaN error always loses.
pub fn winner(arima_error: f64, prophet_error: f64) -> Model {
    match (arima_error.is_nan(), prophet_error.is_nan()) {
        (false, true) => Model::Arima,
        (true, false) => Model::Prophet,
        _ if arima_error <= prophet_error => Model::Arima,
        _ => Model::Prophet,
    }
}

// ============================================================================
// ERROR METRICS
// ============================================================================

/// Mean over the finite values, `None` when there are none
pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ErrorMetrics {
    pub mae: Option<f64>,
    pub rmse: Option<f64>,
    /// Percentage, zero actuals excluded
    pub mape: Option<f64>,
}

impl ErrorMetrics {
    /// Pairs where either side is not finite are dropped.
    pub fn compute(actual: &[f64], forecast: &[f64]) -> Self {
        let pairs: Vec<(f64, f64)> = actual
            .iter()
            .zip(forecast)
            .map(|(a, f)| (*a, *f))
            .filter(|(a, f)| a.is_finite() && f.is_finite())
            .collect();

        if pairs.is_empty() {
            return Self::default();
        }

        let mae = mean(pairs.iter().map(|(a, f)| (a - f).abs()));
        let rmse = mean(pairs.iter().map(|(a, f)| (a - f).powi(2))).map(f64::sqrt);
        let mape = mean(
            pairs
                .iter()
                .filter(|(a, _)| *a != 0.0)
                .map(|(a, f)| ((a - f) / a).abs()),
        )
        .map(|m| m * 100.0);

        Self { mae, rmse, mape }
    }

    /// Report form: a metric that could not be computed is written as 0.0
    pub fn or_zero(&self) -> ModelMetrics {
        ModelMetrics {
            mae: self.mae.unwrap_or(0.0),
            rmse: self.rmse.unwrap_or(0.0),
            mape: self.mape.unwrap_or(0.0),
        }
    }
}

// ============================================================================
// SUMMARIES
// ============================================================================

/// Winner of a country by MAE
pub fn country_winner(record: &PerformanceRecord) -> Model {
    winner(record.arima_mae, record.prophet_mae)
}

/// Rebuild per-country metrics from the forecast outputs. Countries keep the
/// order in which they first appear; forecast rows are matched by year.
pub fn performance_from_forecasts(
    forecasts: &[ForecastOutput],
    gdp: &GdpTable,
    training_end_year: i32,
) -> Vec<PerformanceRecord> {
    let observations = gdp.melt();
    let mut countries: Vec<(&str, &str)> = Vec::new();
    for row in forecasts {
        if !countries.iter().any(|(c, _)| *c == row.country) {
            countries.push((row.country.as_str(), row.continent.as_str()));
        }
    }

    countries
        .into_iter()
        .map(|(country, continent)| {
            let rows_for = |model: Model| {
                let mut rows: Vec<&ForecastOutput> = forecasts
                    .iter()
                    .filter(|f| f.country == country && f.model == model)
                    .collect();
                rows.sort_by_key(|f| f.year);
                rows
            };
            let arima_rows = rows_for(Model::Arima);
            let prophet_rows = rows_for(Model::Prophet);

            let metrics_for = |rows: &[&ForecastOutput]| {
                let actual: Vec<f64> = rows.iter().map(|f| f.actual).collect();
                let forecast: Vec<f64> = rows.iter().map(|f| f.forecast).collect();
                ErrorMetrics::compute(&actual, &forecast).or_zero()
            };
            let arima = metrics_for(arima_rows.as_slice());
            let prophet = metrics_for(prophet_rows.as_slice());

            let history: Vec<&GdpObservation> =
                observations.iter().filter(|o| o.country == country).collect();
            let known = !history.is_empty();

            PerformanceRecord {
                country: country.to_string(),
                continent: continent.to_string(),
                n_observations: known.then_some(history.len()),
                n_train: known.then(|| {
                    history
                        .iter()
                        .filter(|o| o.year <= training_end_year && o.gdp.is_some())
                        .count()
                }),
                n_test: Some(arima_rows.len().max(prophet_rows.len())),
                arima_mae: arima.mae,
                arima_rmse: arima.rmse,
                arima_mape: arima.mape,
                prophet_mae: prophet.mae,
                prophet_rmse: prophet.rmse,
                prophet_mape: prophet.mape,
            }
        })
        .collect()
}

fn mean_metrics<'a, I>(records: I) -> (ModelMetrics, ModelMetrics)
where
    I: Iterator<Item = &'a PerformanceRecord> + Clone,
{
    let avg = |pick: fn(&PerformanceRecord) -> f64| mean(records.clone().map(pick)).unwrap_or(0.0);
    (
        ModelMetrics {
            mae: avg(|r| r.arima_mae),
            rmse: avg(|r| r.arima_rmse),
            mape: avg(|r| r.arima_mape),
        },
        ModelMetrics {
            mae: avg(|r| r.prophet_mae),
            rmse: avg(|r| r.prophet_rmse),
            mape: avg(|r| r.prophet_mape),
        },
    )
}

/// Mean of every metric across all countries
pub fn global_summary(records: &[PerformanceRecord]) -> GlobalMetrics {
    let (arima, prophet) = mean_metrics(records.iter());
    GlobalMetrics { arima, prophet }
}

/// Continent names in order of first appearance
pub fn continents(records: &[PerformanceRecord]) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for record in records {
        if !names.contains(&record.continent.as_str()) {
            names.push(record.continent.as_str());
        }
    }
    names
}

pub fn continent_summary(records: &[PerformanceRecord]) -> Vec<ContinentSummary> {
    continents(records)
        .into_iter()
        .map(|continent| {
            let (arima, prophet) =
                mean_metrics(records.iter().filter(move |r| r.continent == continent));
            ContinentSummary {
                continent: continent.to_string(),
                arima_mae: arima.mae,
                arima_rmse: arima.rmse,
                arima_mape: arima.mape,
                prophet_mae: prophet.mae,
                prophet_rmse: prophet.rmse,
                prophet_mape: prophet.mape,
            }
        })
        .collect()
}

/// Countries won per model. The counts always sum to `records.len()`.
pub fn wins_summary(records: &[PerformanceRecord]) -> Vec<WinsRow> {
    Model::ALL
        .iter()
        .map(|model| WinsRow {
            better_model: model.to_string(),
            count: records.iter().filter(|r| country_winner(r) == *model).count() as u64,
        })
        .collect()
}
