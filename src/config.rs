// Dashboard configuration
// TOML file (optional) -> CLI flags / environment variables -> validated Settings

use crate::error::{DashboardError, Result};
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";

pub const GDP_FILE: &str = "gdp_2000_2025.csv";
pub const PERFORMANCE_FILE: &str = "model_performance_by_country.csv";
pub const GLOBAL_SUMMARY_FILE: &str = "summary_global_fixed.csv";
pub const CONTINENT_SUMMARY_FILE: &str = "summary_by_continent.csv";
pub const WINS_SUMMARY_FILE: &str = "summary_wins.csv";
pub const FORECAST_FILE: &str = "forecast_outputs.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Testing,
}

impl Environment {
    pub fn is_debug(&self) -> bool {
        !matches!(self, Environment::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Testing => "testing",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the wide GDP table
    pub data_dir: PathBuf,
    /// Directory holding the offline-generated report CSVs
    pub reports_dir: PathBuf,
    /// Static assets for the browser dashboard
    pub web_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    /// Last year used for model training; later years are the test window
    pub training_end_year: i32,
    pub forecast_start_year: i32,
    pub forecast_end_year: i32,
    /// Length of the top-N lists
    pub top_n: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("Data"),
            reports_dir: PathBuf::from("reports"),
            web_dir: PathBuf::from("web"),
            host: "0.0.0.0".to_string(),
            port: 5000,
            environment: Environment::Development,
            training_end_year: 2021,
            forecast_start_year: 2022,
            forecast_end_year: 2025,
            top_n: 10,
        }
    }
}

impl Settings {
    /// Read settings from a TOML file. Missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DashboardError::MissingFile {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Resolve settings: explicit config file, else `dashboard.toml` when present,
    /// else defaults; then CLI/environment overrides on top.
    pub fn resolve(args: &SettingsArgs) -> Result<Self> {
        let mut settings = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        settings.apply_overrides(args);
        settings.validate()?;
        Ok(settings)
    }

    pub fn apply_overrides(&mut self, args: &SettingsArgs) {
        if let Some(dir) = &args.data_dir {
            self.data_dir = dir.clone();
        }
        if let Some(dir) = &args.reports_dir {
            self.reports_dir = dir.clone();
        }
        if let Some(dir) = &args.web_dir {
            self.web_dir = dir.clone();
        }
        if let Some(host) = &args.host {
            self.host = host.clone();
        }
        if let Some(port) = args.port {
            self.port = port;
        }
        if let Some(env) = args.environment {
            self.environment = env;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(DashboardError::config("port must be greater than 0"));
        }
        if self.top_n == 0 {
            return Err(DashboardError::config("top_n must be greater than 0"));
        }
        if self.forecast_start_year <= self.training_end_year {
            return Err(DashboardError::config(format!(
                "forecast window ({}) must start after training_end_year ({})",
                self.forecast_start_year, self.training_end_year
            )));
        }
        if self.forecast_end_year < self.forecast_start_year {
            return Err(DashboardError::config(format!(
                "forecast_end_year ({}) is before forecast_start_year ({})",
                self.forecast_end_year, self.forecast_start_year
            )));
        }
        Ok(())
    }

    pub fn forecast_years(&self) -> std::ops::RangeInclusive<i32> {
        self.forecast_start_year..=self.forecast_end_year
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn gdp_path(&self) -> PathBuf {
        self.data_dir.join(GDP_FILE)
    }

    pub fn report_path(&self, file_name: &str) -> PathBuf {
        self.reports_dir.join(file_name)
    }
}

/// Overrides shared by every binary
#[derive(Debug, Clone, Default, Args)]
pub struct SettingsArgs {
    /// TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, env = "DASHBOARD_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[arg(long, global = true, env = "DASHBOARD_REPORTS_DIR")]
    pub reports_dir: Option<PathBuf>,

    #[arg(long, global = true, env = "DASHBOARD_WEB_DIR")]
    pub web_dir: Option<PathBuf>,

    #[arg(long, global = true, env = "DASHBOARD_HOST")]
    pub host: Option<String>,

    #[arg(long, global = true, env = "PORT")]
    pub port: Option<u16>,

    #[arg(long = "env", global = true, env = "DASHBOARD_ENV", value_enum)]
    pub environment: Option<Environment>,

    /// Debug-level logging for the dashboard crate
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_report_layout() {
        let settings = Settings::default();
        assert_eq!(settings.port, 5000);
        assert_eq!(settings.gdp_path(), PathBuf::from("Data").join(GDP_FILE));
        assert_eq!(
            settings.report_path(FORECAST_FILE),
            PathBuf::from("reports").join(FORECAST_FILE)
        );
        assert_eq!(settings.forecast_years().collect::<Vec<_>>(), vec![2022, 2023, 2024, 2025]);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 8080\nenvironment = \"production\"\nreports_dir = \"/srv/reports\"").unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.environment, Environment::Production);
        assert_eq!(settings.reports_dir, PathBuf::from("/srv/reports"));
        assert_eq!(settings.data_dir, PathBuf::from("Data"));
        assert_eq!(settings.top_n, 10);
    }

    #[test]
    fn test_missing_config_file() {
        let err = Settings::from_file(Path::new("/nonexistent/dashboard.toml")).unwrap_err();
        assert!(matches!(err, DashboardError::MissingFile { .. }));
    }

    #[test]
    fn test_overrides_win_over_file_values() {
        let mut settings = Settings::default();
        let args = SettingsArgs {
            port: Some(9000),
            environment: Some(Environment::Testing),
            data_dir: Some(PathBuf::from("/tmp/data")),
            ..Default::default()
        };
        settings.apply_overrides(&args);

        assert_eq!(settings.port, 9000);
        assert_eq!(settings.environment, Environment::Testing);
        assert_eq!(settings.data_dir, PathBuf::from("/tmp/data"));
        assert_eq!(settings.reports_dir, PathBuf::from("reports"));
        assert_eq!(settings.bind_address(), "0.0.0.0:9000");
    }

    #[test]
    fn test_validate_rejects_bad_windows() {
        let overlapping = Settings {
            forecast_start_year: 2021,
            ..Default::default()
        };
        assert!(overlapping.validate().is_err());

        let inverted = Settings {
            forecast_end_year: 2021,
            forecast_start_year: 2022,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());

        let empty_top = Settings {
            top_n: 0,
            ..Default::default()
        };
        assert!(empty_top.validate().is_err());
    }
}
