// GDP Forecast Dashboard - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod config;
pub mod error;
pub mod logging;
pub mod gdp;
pub mod reports;
pub mod metrics;
pub mod queries;
pub mod app_data;
pub mod view;

#[cfg(feature = "server")]
pub mod api;

#[cfg(test)]
mod fixtures;

// Re-export commonly used types
pub use config::{Environment, Settings, SettingsArgs};
pub use error::{DashboardError, Result};
pub use gdp::{GdpObservation, GdpRow, GdpTable};
pub use reports::{
    ContinentSummary, ForecastOutput, GlobalMetrics, GlobalSummaryRow, ModelMetrics,
    PerformanceRecord, ReportStore, WinsRow,
};
pub use metrics::{winner, ErrorMetrics, Model};
pub use queries::{
    ContinentStats, CountryEntry, CountryPerformance, Dashboard, ForecastDetail, ForecastPoint,
    GdpTrends, Improvement, TopCountry, TrendPoint, YearWinner,
};
pub use app_data::{AppData, Insight};
pub use view::{CountryFilter, SortColumn, SortDirection, TableView};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
