// GDP Forecast Dashboard - Web Server

use anyhow::{Context, Result};
use clap::Parser;
use gdp_dashboard::{api, logging, Dashboard, Settings, SettingsArgs};
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "gdp-server", version, about = "Serve the GDP forecast reports as JSON")]
struct ServerCli {
    #[command(flatten)]
    settings: SettingsArgs,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = ServerCli::parse();
    let settings = Settings::resolve(&cli.settings).context("Invalid configuration")?;

    logging::init_logger(settings.environment, cli.settings.verbose);

    tracing::info!("🌐 GDP Forecast Dashboard - Web Server");
    tracing::info!(environment = %settings.environment, debug = settings.environment.is_debug(), "Configuration resolved");

    // Report files are required; a load failure aborts startup
    let dashboard = match Dashboard::load(&settings) {
        Ok(dashboard) => dashboard,
        Err(e) => {
            tracing::error!("❌ Failed to load report data: {}", e);
            tracing::error!("   Run the offline analysis (or `gdp-dashboard summarize`) to produce the reports first.");
            std::process::exit(1);
        }
    };
    tracing::info!("✅ All data loaded successfully");

    let app = api::app(Arc::new(dashboard), &settings.web_dir);

    let addr = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("🚀 Server running on http://{}", addr);
    tracing::info!("   API: http://{}/api/global-metrics", addr);
    tracing::info!("   UI:  http://{}/", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}
