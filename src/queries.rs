// Query layer: one method per dashboard endpoint, all pure reads over the
// immutable ReportStore.

use crate::config::Settings;
use crate::error::{DashboardError, Result};
use crate::metrics::{self, country_winner, mean, Model};
use crate::reports::{ContinentSummary, ForecastOutput, GlobalMetrics, ReportStore, WinsRow};
use serde::{Deserialize, Serialize};

pub const BILLION: f64 = 1e9;
pub const TRILLION: f64 = 1e12;

pub const COUNTRY_NOT_FOUND: &str = "Country not found";
pub const FORECAST_NOT_FOUND: &str = "Country forecast data not found";
pub const GDP_NOT_FOUND: &str = "Country GDP data not found";

// ============================================================================
// RESPONSE TYPES
// ============================================================================

/// Country table row. MAE/RMSE in billions, MAPE in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryPerformance {
    pub country: String,
    pub continent: String,
    pub arima_mae: f64,
    pub arima_rmse: f64,
    pub arima_mape: f64,
    pub prophet_mae: f64,
    pub prophet_rmse: f64,
    pub prophet_mape: f64,
    pub winner: Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Improvement {
    pub country: String,
    pub continent: String,
    /// Percent reduction of MAE when switching from ARIMA to Prophet
    pub mae_improvement: f64,
    pub rmse_improvement: Option<f64>,
    pub arima_mae: f64,
    pub prophet_mae: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopCountry {
    pub country: String,
    pub continent: String,
    /// Trillions, rounded to 3 decimals
    pub gdp: f64,
    pub year: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinentStats {
    pub continent: String,
    pub total_countries: usize,
    pub prophet_wins: usize,
    pub arima_wins: usize,
    pub avg_arima_mape: f64,
    pub avg_prophet_mape: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryEntry {
    pub country: String,
    pub continent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub year: i32,
    pub gdp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GdpTrends {
    pub country: String,
    pub continent: String,
    pub trends: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub year: i32,
    pub actual: Option<f64>,
    pub forecast_arima: Option<f64>,
    pub forecast_prophet: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearWinner {
    pub year: i32,
    pub winner: Model,
    pub arima_error: f64,
    pub prophet_error: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDetail {
    pub country: String,
    pub continent: String,
    pub data: Vec<ForecastPoint>,
    pub winners: Vec<YearWinner>,
    pub arima_wins: usize,
    pub prophet_wins: usize,
    pub total_forecast_years: usize,
}

// ============================================================================
// DASHBOARD
// ============================================================================

#[derive(Debug, Clone)]
pub struct Dashboard {
    store: ReportStore,
    training_end_year: i32,
    forecast_years: std::ops::RangeInclusive<i32>,
    top_n: usize,
}

impl Dashboard {
    pub fn new(store: ReportStore, settings: &Settings) -> Self {
        Self {
            store,
            training_end_year: settings.training_end_year,
            forecast_years: settings.forecast_years(),
            top_n: settings.top_n,
        }
    }

    pub fn load(settings: &Settings) -> Result<Self> {
        let store = ReportStore::load(settings)?;
        Ok(Self::new(store, settings))
    }

    pub fn store(&self) -> &ReportStore {
        &self.store
    }

    /// GET /api/global-metrics
    pub fn global_metrics(&self) -> GlobalMetrics {
        self.store.global
    }

    /// GET /api/wins
    pub fn wins(&self) -> Vec<WinsRow> {
        self.store.wins.clone()
    }

    /// GET /api/continent-performance
    pub fn continent_performance(&self) -> Vec<ContinentSummary> {
        self.store.continent_summary.clone()
    }

    /// GET /api/country-performance
    pub fn country_performance(&self) -> Vec<CountryPerformance> {
        self.store
            .performance
            .iter()
            .map(|r| CountryPerformance {
                country: r.country.clone(),
                continent: r.continent.clone(),
                arima_mae: r.arima_mae / BILLION,
                arima_rmse: r.arima_rmse / BILLION,
                arima_mape: r.arima_mape,
                prophet_mae: r.prophet_mae / BILLION,
                prophet_rmse: r.prophet_rmse / BILLION,
                prophet_mape: r.prophet_mape,
                winner: country_winner(r),
            })
            .collect()
    }

    /// GET /api/top-improvements
    pub fn top_improvements(&self) -> Vec<Improvement> {
        let mut improvements: Vec<Improvement> = self
            .store
            .performance
            .iter()
            .filter_map(|r| {
                let mae_improvement = (r.arima_mae - r.prophet_mae) / r.arima_mae * 100.0;
                if !mae_improvement.is_finite() {
                    return None;
                }
                let rmse_improvement = (r.arima_rmse - r.prophet_rmse) / r.arima_rmse * 100.0;
                Some(Improvement {
                    country: r.country.clone(),
                    continent: r.continent.clone(),
                    mae_improvement,
                    rmse_improvement: Some(rmse_improvement).filter(|v| v.is_finite()),
                    arima_mae: r.arima_mae / BILLION,
                    prophet_mae: r.prophet_mae / BILLION,
                })
            })
            .collect();

        // stable: equal improvements keep report order
        improvements.sort_by(|a, b| b.mae_improvement.total_cmp(&a.mae_improvement));
        improvements.truncate(self.top_n);
        improvements
    }

    /// GET /api/top-countries
    pub fn top_countries(&self) -> Vec<TopCountry> {
        let gdp = &self.store.gdp;
        let Some(year) = gdp.latest_year_with_data() else {
            return Vec::new();
        };

        let mut ranked: Vec<(&str, &str, f64)> = gdp
            .rows()
            .iter()
            .filter_map(|row| {
                gdp.value(row, year)
                    .filter(|v| *v > 0.0)
                    .map(|v| (row.country.as_str(), row.continent.as_str(), v))
            })
            .collect();
        ranked.sort_by(|a, b| b.2.total_cmp(&a.2));

        ranked
            .into_iter()
            .take(self.top_n)
            .map(|(country, continent, value)| TopCountry {
                country: country.to_string(),
                continent: continent.to_string(),
                gdp: (value / TRILLION * 1000.0).round() / 1000.0,
                year: year.to_string(),
            })
            .collect()
    }

    /// GET /api/continent-stats
    pub fn continent_stats(&self) -> Vec<ContinentStats> {
        let records = &self.store.performance;
        metrics::continents(records)
            .into_iter()
            .map(|continent| {
                let members: Vec<_> = records.iter().filter(|r| r.continent == continent).collect();
                let arima_wins = members
                    .iter()
                    .filter(|r| country_winner(r) == Model::Arima)
                    .count();
                ContinentStats {
                    continent: continent.to_string(),
                    total_countries: members.len(),
                    prophet_wins: members.len() - arima_wins,
                    arima_wins,
                    avg_arima_mape: mean(members.iter().map(|r| r.arima_mape)).unwrap_or(0.0),
                    avg_prophet_mape: mean(members.iter().map(|r| r.prophet_mape)).unwrap_or(0.0),
                }
            })
            .collect()
    }

    /// GET /api/countries
    pub fn countries(&self) -> Vec<CountryEntry> {
        let mut entries: Vec<CountryEntry> = self
            .store
            .performance
            .iter()
            .map(|r| CountryEntry {
                country: r.country.clone(),
                continent: r.continent.clone(),
            })
            .collect();
        entries.sort_by(|a, b| a.country.cmp(&b.country));
        entries
    }

    /// GET /api/gdp-trends/<country>
    pub fn gdp_trends(&self, country: &str) -> Result<GdpTrends> {
        let gdp = &self.store.gdp;
        let row = gdp
            .find(country)
            .ok_or_else(|| DashboardError::not_found(COUNTRY_NOT_FOUND))?;

        let trends = gdp
            .series(&row.country)
            .unwrap_or_default()
            .into_iter()
            .map(|(year, value)| TrendPoint {
                year,
                gdp: value / BILLION,
            })
            .collect();

        Ok(GdpTrends {
            country: row.country.clone(),
            continent: row.continent.clone(),
            trends,
        })
    }

    /// GET /api/forecast-detail/<country>
    pub fn forecast_detail(&self, country: &str) -> Result<ForecastDetail> {
        let rows: Vec<&ForecastOutput> = self.store.forecasts_for(country).collect();
        let first = rows
            .first()
            .ok_or_else(|| DashboardError::not_found(FORECAST_NOT_FOUND))?;

        let gdp = &self.store.gdp;
        let gdp_row = gdp
            .find(country)
            .ok_or_else(|| DashboardError::not_found(GDP_NOT_FOUND))?;

        let lookup = |model: Model, year: i32| {
            rows.iter()
                .find(|f| f.model == model && f.year == year)
                .copied()
        };

        let mut data: Vec<ForecastPoint> = gdp
            .years()
            .iter()
            .zip(&gdp_row.values)
            .filter(|(year, _)| **year <= self.training_end_year)
            .filter_map(|(year, value)| {
                value.map(|v| ForecastPoint {
                    year: *year,
                    actual: Some(v / BILLION),
                    forecast_arima: None,
                    forecast_prophet: None,
                })
            })
            .collect();

        let mut winners = Vec::new();
        for year in self.forecast_years.clone() {
            let arima = lookup(Model::Arima, year);
            let prophet = lookup(Model::Prophet, year);

            data.push(ForecastPoint {
                year,
                actual: arima.map(|f| f.actual / BILLION),
                forecast_arima: arima.map(|f| f.forecast / BILLION),
                forecast_prophet: prophet.map(|f| f.forecast / BILLION),
            });

            if let (Some(arima), Some(prophet)) = (arima, prophet) {
                // both errors are measured against the ARIMA row's actual
                let arima_error = arima.absolute_error();
                let prophet_error = (arima.actual - prophet.forecast).abs();
                winners.push(YearWinner {
                    year,
                    winner: metrics::winner(arima_error, prophet_error),
                    arima_error: arima_error / BILLION,
                    prophet_error: prophet_error / BILLION,
                });
            }
        }

        let arima_wins = winners.iter().filter(|w| w.winner == Model::Arima).count();

        Ok(ForecastDetail {
            country: country.to_string(),
            continent: first.continent.clone(),
            arima_wins,
            prophet_wins: winners.len() - arima_wins,
            total_forecast_years: winners.len(),
            data,
            winners,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::gdp::GdpTable;
    use crate::reports::PerformanceRecord;

    fn forecast(model: Model, year: i32, actual: f64, forecast: f64) -> ForecastOutput {
        ForecastOutput {
            country: "Chile".to_string(),
            continent: "South America".to_string(),
            model,
            year,
            actual,
            forecast,
        }
    }

    #[test]
    fn test_country_performance_units_and_winner() {
        let dashboard = fixtures::dashboard();
        let rows = dashboard.country_performance();
        assert_eq!(rows.len(), 4);

        let brazil = rows.iter().find(|r| r.country == "Brazil").unwrap();
        assert_eq!(brazil.arima_mae, 20.0);
        assert_eq!(brazil.prophet_mae, 10.0);
        assert_eq!(brazil.arima_mape, 4.0);
        assert_eq!(brazil.winner, Model::Prophet);

        let kenya = rows.iter().find(|r| r.country == "Kenya").unwrap();
        assert_eq!(kenya.winner, Model::Arima, "ties go to ARIMA");

        for row in &rows {
            let expected = if row.arima_mae <= row.prophet_mae { Model::Arima } else { Model::Prophet };
            assert_eq!(row.winner, expected);
        }
    }

    #[test]
    fn test_top_improvements_sorted_and_filtered() {
        let dashboard = fixtures::dashboard();
        let top = dashboard.top_improvements();

        // Zambia has arima_mae == 0 and is skipped
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].country, "Brazil");
        assert_eq!(top[0].mae_improvement, 50.0);
        assert_eq!(top[0].arima_mae, 20.0);
        assert!(top.windows(2).all(|w| w[0].mae_improvement >= w[1].mae_improvement));
        assert!(top.iter().all(|i| i.country != "Zambia"));
    }

    #[test]
    fn test_top_improvements_respects_top_n() {
        let settings = Settings {
            top_n: 1,
            ..Default::default()
        };
        let dashboard = Dashboard::new(fixtures::store(), &settings);
        assert_eq!(dashboard.top_improvements().len(), 1);
        assert_eq!(dashboard.top_countries().len(), 1);
    }

    #[test]
    fn test_top_countries_uses_latest_year_with_data() {
        let dashboard = fixtures::dashboard();
        let top = dashboard.top_countries();

        assert_eq!(top.len(), 3);
        assert_eq!(top[0].country, "Brazil");
        assert_eq!(top[0].year, "2024");
        assert_eq!(top[0].gdp, 2.125);
        assert!(top.iter().all(|t| t.country != "Zambia"), "missing GDP is skipped");
    }

    #[test]
    fn test_continent_stats_counts_sum_to_total() {
        let dashboard = fixtures::dashboard();
        let stats = dashboard.continent_stats();

        assert_eq!(stats[0].continent, "South America");
        assert_eq!(stats[1].continent, "Africa");

        let total: usize = stats.iter().map(|s| s.total_countries).sum();
        assert_eq!(total, dashboard.country_performance().len());
        for s in &stats {
            assert_eq!(s.arima_wins + s.prophet_wins, s.total_countries);
        }

        let africa = &stats[1];
        assert_eq!(africa.total_countries, 2);
        assert_eq!(africa.arima_wins, 2);
        assert_eq!(africa.prophet_wins, 0);
        assert_eq!(africa.avg_arima_mape, 5.0);
    }

    #[test]
    fn test_countries_sorted() {
        let names: Vec<String> = fixtures::dashboard()
            .countries()
            .into_iter()
            .map(|c| c.country)
            .collect();
        assert_eq!(names, vec!["Brazil", "Chile", "Kenya", "Zambia"]);
    }

    #[test]
    fn test_gdp_trends() {
        let dashboard = fixtures::dashboard();
        let trends = dashboard.gdp_trends("Chile").unwrap();
        assert_eq!(trends.continent, "South America");
        let years: Vec<i32> = trends.trends.iter().map(|t| t.year).collect();
        assert_eq!(years, vec![2020, 2021, 2022, 2023, 2024]);
        assert_eq!(trends.trends[0].gdp, 250.0);

        let err = dashboard.gdp_trends("Atlantis").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), COUNTRY_NOT_FOUND);
    }

    #[test]
    fn test_forecast_detail() {
        let dashboard = fixtures::dashboard();
        let detail = dashboard.forecast_detail("Chile").unwrap();

        assert_eq!(detail.continent, "South America");
        let years: Vec<i32> = detail.data.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2020, 2021, 2022, 2023, 2024, 2025]);

        let training = &detail.data[0];
        assert_eq!(training.actual, Some(250.0));
        assert_eq!(training.forecast_arima, None);

        let y2022 = &detail.data[2];
        assert_eq!(y2022.actual, Some(300.0));
        assert_eq!(y2022.forecast_arima, Some(310.0));
        assert_eq!(y2022.forecast_prophet, Some(280.0));

        // 2025 has no forecast rows at all
        let y2025 = &detail.data[5];
        assert_eq!(y2025.actual, None);
        assert_eq!(y2025.forecast_prophet, None);

        assert_eq!(detail.total_forecast_years, 3);
        assert_eq!(detail.winners[0].winner, Model::Arima);
        assert_eq!(detail.winners[0].arima_error, 10.0);
        assert_eq!(detail.winners[0].prophet_error, 20.0);
        assert_eq!(detail.winners[1].winner, Model::Prophet);
        assert_eq!(detail.winners[2].winner, Model::Arima, "equal errors go to ARIMA");
        assert_eq!(detail.arima_wins, 2);
        assert_eq!(detail.prophet_wins, 1);
        assert_eq!(detail.arima_wins + detail.prophet_wins, detail.total_forecast_years);
    }

    #[test]
    fn test_forecast_detail_not_found_messages() {
        let dashboard = fixtures::dashboard();

        let err = dashboard.forecast_detail("Atlantis").unwrap_err();
        assert_eq!(err.to_string(), FORECAST_NOT_FOUND);

        // Kenya has forecasts but no GDP row
        let err = dashboard.forecast_detail("Kenya").unwrap_err();
        assert_eq!(err.to_string(), GDP_NOT_FOUND);
    }

    #[test]
    fn test_top_improvements_null_rmse_when_arima_rmse_is_zero() {
        let mut store = fixtures::store();
        store.performance.push(PerformanceRecord {
            country: "Peru".to_string(),
            continent: "South America".to_string(),
            n_observations: None,
            n_train: None,
            n_test: None,
            arima_mae: 4e9,
            arima_rmse: 0.0,
            arima_mape: 2.0,
            prophet_mae: 2e9,
            prophet_rmse: 1e9,
            prophet_mape: 1.0,
        });
        let dashboard = Dashboard::new(store, &Settings::default());

        let peru = dashboard
            .top_improvements()
            .into_iter()
            .find(|i| i.country == "Peru")
            .unwrap();
        assert_eq!(peru.mae_improvement, 50.0);
        assert_eq!(peru.rmse_improvement, None);

        let json = serde_json::to_value(&peru).unwrap();
        assert_eq!(json["rmse_improvement"], serde_json::Value::Null);
    }

    #[test]
    fn test_top_countries_skip_non_positive_gdp() {
        let mut store = fixtures::store();
        store.gdp = GdpTable::from_reader(
            "Country,Continent,2023,2024\n\
             Chile,South America,1e12,0\n\
             Peru,South America,1e12,-5e11\n\
             Brazil,South America,2e12,2.5e12\n"
                .as_bytes(),
            "gdp.csv",
        )
        .unwrap();
        let dashboard = Dashboard::new(store, &Settings::default());

        let top = dashboard.top_countries();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].country, "Brazil");
        assert_eq!(top[0].gdp, 2.5);
        assert_eq!(top[0].year, "2024");
    }

    #[test]
    fn test_forecast_detail_prophet_only_year() {
        let mut store = fixtures::store();
        store.forecasts.push(forecast(Model::Prophet, 2025, 340e9, 400e9));
        let dashboard = Dashboard::new(store, &Settings::default());

        let detail = dashboard.forecast_detail("Chile").unwrap();
        let y2025 = detail.data.iter().find(|p| p.year == 2025).unwrap();
        assert_eq!(y2025.actual, None);
        assert_eq!(y2025.forecast_arima, None);
        assert_eq!(y2025.forecast_prophet, Some(400.0));

        // a single model cannot win a year
        assert_eq!(detail.total_forecast_years, 3);
        assert!(detail.winners.iter().all(|w| w.year != 2025));
    }

    #[test]
    fn test_forecast_detail_keeps_zero_actual() {
        let mut store = fixtures::store();
        store.forecasts.push(forecast(Model::Arima, 2025, 0.0, 5e9));
        store.forecasts.push(forecast(Model::Prophet, 2025, 0.0, 8e9));
        let dashboard = Dashboard::new(store, &Settings::default());

        let detail = dashboard.forecast_detail("Chile").unwrap();
        let y2025 = detail.data.iter().find(|p| p.year == 2025).unwrap();
        assert_eq!(y2025.actual, Some(0.0));

        let json = serde_json::to_value(y2025).unwrap();
        assert_eq!(json["actual"].as_f64(), Some(0.0));

        let winner = detail.winners.iter().find(|w| w.year == 2025).unwrap();
        assert_eq!(winner.winner, Model::Arima);
        assert_eq!(winner.arima_error, 5.0);
        assert_eq!(detail.total_forecast_years, 4);
    }
}
