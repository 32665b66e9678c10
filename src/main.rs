// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gdp_dashboard::config::{
    CONTINENT_SUMMARY_FILE, GLOBAL_SUMMARY_FILE, PERFORMANCE_FILE, WINS_SUMMARY_FILE,
};
use gdp_dashboard::reports::{self, ReportStore};
use gdp_dashboard::{
    logging, metrics, view, CountryFilter, Dashboard, GdpTable, Model, Settings, SettingsArgs,
    SortColumn, SortDirection, TableView,
};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "gdp-dashboard", version, about = "GDP forecast dashboard: ARIMA vs Prophet")]
struct Cli {
    #[command(flatten)]
    settings: SettingsArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive terminal dashboard (default)
    Tui {
        /// Directory for CSV exports made from the country table
        #[arg(long, default_value = ".")]
        export_dir: PathBuf,
    },
    /// Rebuild the performance and summary reports from forecast_outputs.csv
    Summarize {
        /// Write the reports here instead of the reports directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export the country performance table as CSV
    Export {
        /// Case-insensitive substring of the country name
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        continent: Option<String>,
        /// ARIMA or Prophet
        #[arg(long)]
        winner: Option<Model>,
        #[arg(long, value_enum, default_value_t = SortColumn::Country)]
        sort: SortColumn,
        #[arg(long)]
        desc: bool,
        /// Output file; a timestamped name in the current directory by default
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::resolve(&cli.settings).context("Invalid configuration")?;
    logging::init_logger(settings.environment, cli.settings.verbose);

    match cli.command {
        None => run_ui_mode(&settings, PathBuf::from(".")),
        Some(Command::Tui { export_dir }) => run_ui_mode(&settings, export_dir),
        Some(Command::Summarize { output }) => run_summarize(&settings, output),
        Some(Command::Export {
            search,
            continent,
            winner,
            sort,
            desc,
            output,
        }) => {
            let view = TableView {
                filter: CountryFilter {
                    search,
                    continent,
                    winner,
                },
                sort,
                direction: if desc {
                    SortDirection::Descending
                } else {
                    SortDirection::Ascending
                },
            };
            run_export(&settings, &view, output)
        }
    }
}

fn run_summarize(settings: &Settings, output: Option<PathBuf>) -> Result<()> {
    println!("📊 Rebuilding model performance reports");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let gdp = GdpTable::load(&settings.gdp_path())
        .with_context(|| format!("Failed to load {}", settings.gdp_path().display()))?;
    let forecasts = ReportStore::load_forecasts(settings)?;
    println!("✓ Loaded {} forecast rows, {} GDP countries", forecasts.len(), gdp.len());

    let performance = metrics::performance_from_forecasts(&forecasts, &gdp, settings.training_end_year);
    let out_dir = output.unwrap_or_else(|| settings.reports_dir.clone());

    reports::write_csv(&out_dir.join(PERFORMANCE_FILE), &performance)?;
    reports::write_csv(
        &out_dir.join(GLOBAL_SUMMARY_FILE),
        &metrics::global_summary(&performance).to_rows(),
    )?;
    reports::write_csv(
        &out_dir.join(CONTINENT_SUMMARY_FILE),
        &metrics::continent_summary(&performance),
    )?;
    let wins = metrics::wins_summary(&performance);
    reports::write_csv(&out_dir.join(WINS_SUMMARY_FILE), &wins)?;

    tracing::info!(countries = performance.len(), out_dir = %out_dir.display(), "Reports written");
    println!("✓ {} countries summarized into {}", performance.len(), out_dir.display());
    for row in &wins {
        println!("   {:<8} {}", row.better_model, row.count);
    }
    Ok(())
}

fn run_export(settings: &Settings, table_view: &TableView, output: Option<PathBuf>) -> Result<()> {
    let dashboard = Dashboard::load(settings).context("Failed to load report data")?;
    let rows = view::visible_rows(&dashboard.country_performance(), table_view);

    let path = output.unwrap_or_else(|| PathBuf::from(view::export_file_name(chrono::Utc::now())));
    let file = std::fs::File::create(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    view::export_csv(&rows, file)?;

    tracing::info!(rows = rows.len(), path = %path.display(), "Country table exported");
    println!("✓ Exported {} rows to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(settings: &Settings, export_dir: PathBuf) -> Result<()> {
    println!("🖥️  Loading GDP Forecast Dashboard...\n");

    let dashboard = match Dashboard::load(settings) {
        Ok(dashboard) => dashboard,
        Err(e) => {
            eprintln!("❌ Failed to load report data: {}", e);
            eprintln!("   Run: gdp-dashboard summarize");
            eprintln!("   to rebuild the reports from forecast_outputs.csv.");
            std::process::exit(1);
        }
    };

    println!("✓ Loaded {} countries\n", dashboard.store().performance.len());
    println!("Starting UI... (Press 'q' to quit)\n");

    let mut app = ui::App::new(dashboard, export_dir);
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_settings: &Settings, _export_dir: PathBuf) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the web dashboard: cargo run --bin gdp-server --features server");
    std::process::exit(1);
}
