// GDP Forecast Dashboard - REST API with Axum

use crate::error::DashboardError;
use crate::queries::Dashboard;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::path::Path as FsPath;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
}

/// Error body read by the dashboard clients
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = if self.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    countries: usize,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "OK",
        version: crate::VERSION,
        countries: state.dashboard.store().performance.len(),
    })
}

/// GET /api/global-metrics - Mean MAE/RMSE/MAPE per model
async fn global_metrics(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.global_metrics())
}

/// GET /api/wins - Countries won per model
async fn wins(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.wins())
}

/// GET /api/continent-performance - Continent summary report
async fn continent_performance(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.continent_performance())
}

/// GET /api/country-performance - Per-country metrics with winner
async fn country_performance(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.country_performance())
}

/// GET /api/top-improvements - Largest MAE reductions from Prophet
async fn top_improvements(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.top_improvements())
}

/// GET /api/top-countries - Largest economies in the latest year
async fn top_countries(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.top_countries())
}

/// GET /api/continent-stats - Win counts and mean MAPE per continent
async fn continent_stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.continent_stats())
}

/// GET /api/countries - Country list for pickers
async fn countries(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.countries())
}

/// GET /api/gdp-trends/:country - GDP history of one country
async fn gdp_trends(
    State(state): State<AppState>,
    Path(country): Path<String>,
) -> impl IntoResponse {
    match state.dashboard.gdp_trends(&country) {
        Ok(trends) => (StatusCode::OK, Json(trends)).into_response(),
        Err(e) => {
            tracing::warn!(%country, "gdp-trends: {}", e);
            e.into_response()
        }
    }
}

/// GET /api/forecast-detail/:country - Actuals, both forecasts, per-year winners
async fn forecast_detail(
    State(state): State<AppState>,
    Path(country): Path<String>,
) -> impl IntoResponse {
    match state.dashboard.forecast_detail(&country) {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(e) => {
            tracing::warn!(%country, "forecast-detail: {}", e);
            e.into_response()
        }
    }
}

/// GET / - Serve index.html
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

// ============================================================================
// Routers
// ============================================================================

/// JSON endpoints, mounted under `/api`
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/global-metrics", get(global_metrics))
        .route("/wins", get(wins))
        .route("/continent-performance", get(continent_performance))
        .route("/country-performance", get(country_performance))
        .route("/top-improvements", get(top_improvements))
        .route("/top-countries", get(top_countries))
        .route("/continent-stats", get(continent_stats))
        .route("/countries", get(countries))
        .route("/gdp-trends/:country", get(gdp_trends))
        .route("/forecast-detail/:country", get(forecast_detail))
        .with_state(state)
}

/// Full application: API, dashboard page, static assets, CORS, request tracing
pub fn app(dashboard: Arc<Dashboard>, web_dir: &FsPath) -> Router {
    let state = AppState { dashboard };

    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes(state))
        .nest_service("/static", ServeDir::new(web_dir))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
