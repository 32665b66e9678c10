use crate::error::Result;
use crate::metrics::Model;
use crate::queries::{
    ContinentStats, CountryEntry, CountryPerformance, Dashboard, ForecastDetail, Improvement,
    TopCountry,
};
use crate::reports::{ContinentSummary, GlobalMetrics, WinsRow};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Headline finding for the Insights section
#[derive(Debug, Clone, PartialEq)]
pub struct Insight {
    pub title: String,
    pub detail: String,
}

/// Client-side snapshot of every dashboard query, taken once.
/// Forecast details are fetched per country on demand and cached.
#[derive(Debug, Clone)]
pub struct AppData {
    pub global: GlobalMetrics,
    pub wins: Vec<WinsRow>,
    pub continent_performance: Vec<ContinentSummary>,
    pub country_performance: Vec<CountryPerformance>,
    pub top_improvements: Vec<Improvement>,
    pub top_countries: Vec<TopCountry>,
    pub continent_stats: Vec<ContinentStats>,
    pub countries: Vec<CountryEntry>,
    pub loaded_at: DateTime<Utc>,
    details: HashMap<String, ForecastDetail>,
}

impl AppData {
    pub fn collect(dashboard: &Dashboard) -> Self {
        let data = Self {
            global: dashboard.global_metrics(),
            wins: dashboard.wins(),
            continent_performance: dashboard.continent_performance(),
            country_performance: dashboard.country_performance(),
            top_improvements: dashboard.top_improvements(),
            top_countries: dashboard.top_countries(),
            continent_stats: dashboard.continent_stats(),
            countries: dashboard.countries(),
            loaded_at: Utc::now(),
            details: HashMap::new(),
        };
        tracing::debug!(
            countries = data.countries.len(),
            continents = data.continent_stats.len(),
            "Dashboard snapshot collected"
        );
        data
    }

    /// Cached forecast detail; the first request for a country hits the dashboard
    pub fn forecast_detail(&mut self, dashboard: &Dashboard, country: &str) -> Result<&ForecastDetail> {
        if !self.details.contains_key(country) {
            let detail = dashboard.forecast_detail(country)?;
            self.details.insert(country.to_string(), detail);
        }
        // inserted above when missing
        Ok(&self.details[country])
    }

    pub fn cached_detail(&self, country: &str) -> Option<&ForecastDetail> {
        self.details.get(country)
    }

    pub fn cached_details(&self) -> usize {
        self.details.len()
    }

    /// Win count for a model as reported by the wins summary
    pub fn wins_for(&self, model: Model) -> u64 {
        self.wins
            .iter()
            .filter(|w| w.better_model.eq_ignore_ascii_case(model.as_str()))
            .map(|w| w.count)
            .sum()
    }

    pub fn insights(&self) -> Vec<Insight> {
        let mut insights = Vec::new();

        let arima = self.wins_for(Model::Arima);
        let prophet = self.wins_for(Model::Prophet);
        let total = arima + prophet;
        if total > 0 {
            let (leader, leader_wins) = if arima >= prophet {
                (Model::Arima, arima)
            } else {
                (Model::Prophet, prophet)
            };
            insights.push(Insight {
                title: format!("{} wins more countries", leader),
                detail: format!(
                    "{} is the better model for {} of {} countries ({:.1}%).",
                    leader,
                    leader_wins,
                    total,
                    leader_wins as f64 / total as f64 * 100.0
                ),
            });
        }

        let arima_mape = self.global.arima.mape;
        let prophet_mape = self.global.prophet.mape;
        let lower = crate::metrics::winner(arima_mape, prophet_mape);
        insights.push(Insight {
            title: format!("{} has the lower average MAPE", lower),
            detail: format!(
                "Average MAPE is {:.2}% for ARIMA and {:.2}% for Prophet ({:.2} points apart).",
                arima_mape,
                prophet_mape,
                (arima_mape - prophet_mape).abs()
            ),
        });

        let share = |s: &ContinentStats| {
            if s.total_countries == 0 {
                0.0
            } else {
                s.prophet_wins as f64 / s.total_countries as f64
            }
        };
        if let Some(best) = self
            .continent_stats
            .iter()
            .max_by(|a, b| share(a).total_cmp(&share(b)))
        {
            insights.push(Insight {
                title: format!("Prophet is strongest in {}", best.continent),
                detail: format!(
                    "Prophet wins {} of {} countries in {}.",
                    best.prophet_wins, best.total_countries, best.continent
                ),
            });
        }
        if let Some(best) = self
            .continent_stats
            .iter()
            .min_by(|a, b| share(a).total_cmp(&share(b)))
        {
            insights.push(Insight {
                title: format!("ARIMA is strongest in {}", best.continent),
                detail: format!(
                    "ARIMA wins {} of {} countries in {}.",
                    best.arima_wins, best.total_countries, best.continent
                ),
            });
        }

        if let Some(top) = self.top_improvements.first() {
            insights.push(Insight {
                title: format!("Largest Prophet gain: {}", top.country),
                detail: format!(
                    "Switching to Prophet cuts MAE by {:.1}% (from {:.2}B to {:.2}B).",
                    top.mae_improvement, top.arima_mae, top.prophet_mae
                ),
            });
        }

        insights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_collect_takes_every_query() {
        let dashboard = fixtures::dashboard();
        let data = AppData::collect(&dashboard);

        assert_eq!(data.country_performance.len(), 4);
        assert_eq!(data.countries.len(), 4);
        assert_eq!(data.continent_stats.len(), 2);
        assert_eq!(data.continent_performance.len(), 2);
        assert_eq!(data.top_countries[0].country, "Brazil");
        assert_eq!(data.wins_for(Model::Arima), 3);
        assert_eq!(data.wins_for(Model::Prophet), 1);
        assert_eq!(data.cached_details(), 0);
    }

    #[test]
    fn test_forecast_detail_is_cached() {
        let dashboard = fixtures::dashboard();
        let mut data = AppData::collect(&dashboard);

        let detail = data.forecast_detail(&dashboard, "Chile").unwrap();
        assert_eq!(detail.total_forecast_years, 3);
        assert_eq!(data.cached_details(), 1);

        data.forecast_detail(&dashboard, "Chile").unwrap();
        assert_eq!(data.cached_details(), 1);

        assert!(data.forecast_detail(&dashboard, "Atlantis").is_err());
        assert_eq!(data.cached_details(), 1);
    }

    #[test]
    fn test_insights() {
        let data = AppData::collect(&fixtures::dashboard());
        let insights = data.insights();

        assert_eq!(insights[0].title, "ARIMA wins more countries");
        assert!(insights[0].detail.contains("3 of 4 countries (75.0%)"));
        assert_eq!(insights[1].title, "Prophet has the lower average MAPE");
        assert_eq!(insights[2].title, "Prophet is strongest in South America");
        assert_eq!(insights[3].title, "ARIMA is strongest in Africa");
        assert_eq!(insights[4].title, "Largest Prophet gain: Brazil");
    }
}
