//! HTTP API handlers for Epiwatch.
//!
//! Every endpoint returns a view model as JSON. Upstream failures never turn
//! into 5xx responses here: they arrive already degraded to empty lists and
//! unavailable (`null`) fields. Only malformed request parameters are
//! rejected, with `400 Bad Request`, and unknown diseases with `404`.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::aggregation::{InfluenzaView, MapMarker, MapView, SeverityScale, SeverityTier};
use crate::dashboard::{CountryView, DailySeriesView, Dashboard, OverviewView, VaccinationView};
use crate::model::{CountryRecord, MapQuery, OverviewQuery, VaccinationQuery, VaccinationScope};
use crate::reference::{DiseaseId, DiseaseProfile};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Dashboard,
}

/// Build the router with every endpoint.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/overview", get(get_overview))
        .route("/countries", get(get_countries))
        .route("/countries/names", get(get_country_names))
        .route("/countries/:name", get(get_country))
        .route("/timeseries/daily", get(get_daily_series))
        .route("/vaccinations", get(get_vaccinations))
        .route("/influenza", get(get_influenza))
        .route("/map", get(get_map))
        .route("/severity/:table", get(get_severity_legend))
        .route("/diseases/:id", get(get_disease))
        .with_state(state)
}

/// GET /health - Simple health check endpoint.
pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// GET /overview - Worldwide figures, top countries and influenza panel.
///
/// # Query Parameters
///
/// - `top` (optional): How many countries to rank (default: configured top-N)
///
/// # Response
///
/// ```json
/// {
///     "timestamp": "2024-01-15T10:30:00Z",
///     "global": {"confirmed": 704753890, "new_cases": null, ...},
///     "totals": {"cases": 704753890, "recovered": 675619811, ...},
///     "top_countries": [...],
///     "countries": [...],
///     "influenza": {"current": {...}, "ili_summary": {"status": "observed", ...}, ...}
/// }
/// ```
#[instrument(skip(state))]
pub async fn get_overview(
    State(state): State<AppState>,
    Query(query): Query<OverviewQuery>,
) -> Json<OverviewView> {
    let overview = match query.top {
        Some(n) => state.dashboard.load_overview_with_top(n).await,
        None => state.dashboard.load_overview().await,
    };

    info!(
        countries = overview.countries.len(),
        top = overview.top_countries.len(),
        "Overview queried"
    );
    Json(overview)
}

/// GET /countries - Every country, most cases first.
#[instrument(skip(state))]
pub async fn get_countries(State(state): State<AppState>) -> Json<Vec<CountryRecord>> {
    Json(state.dashboard.country_table().await)
}

/// GET /countries/names - Country names for a picker, alphabetically.
#[instrument(skip(state))]
pub async fn get_country_names(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.dashboard.country_names().await)
}

/// GET /countries/:name - One country's totals and vaccination series.
#[instrument(skip(state))]
pub async fn get_country(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Json<CountryView> {
    Json(state.dashboard.load_country(&name).await)
}

/// GET /timeseries/daily - Worldwide cumulative history with daily increments.
#[instrument(skip(state))]
pub async fn get_daily_series(State(state): State<AppState>) -> Json<DailySeriesView> {
    Json(state.dashboard.daily_series().await)
}

/// GET /vaccinations - Last 30 days of doses administered.
///
/// # Query Parameters
///
/// - `country` (optional): Country name; absent or `Global` for worldwide
#[instrument(skip(state))]
pub async fn get_vaccinations(
    State(state): State<AppState>,
    Query(query): Query<VaccinationQuery>,
) -> Json<VaccinationView> {
    let scope = VaccinationScope::from_param(query.country.as_deref());
    Json(state.dashboard.vaccinations(&scope).await)
}

/// GET /influenza - CDC ILINet panel.
#[instrument(skip(state))]
pub async fn get_influenza(State(state): State<AppState>) -> Json<InfluenzaView> {
    Json(state.dashboard.influenza().await)
}

/// GET /map - Circle markers for a map.
///
/// # Query Parameters
///
/// - `view` (optional): `cases` (default), `recovered`, `deaths`, `hotspot`
///   or `overview`
#[instrument(skip(state))]
pub async fn get_map(
    State(state): State<AppState>,
    Query(query): Query<MapQuery>,
) -> Result<Json<Vec<MapMarker>>, StatusCode> {
    let Some(view) = MapView::parse(&query.view) else {
        warn!(view = %query.view, "Invalid map view");
        return Err(StatusCode::BAD_REQUEST);
    };

    Ok(Json(state.dashboard.map(view).await))
}

/// A severity table rendered as a legend.
#[derive(Debug, Serialize)]
pub struct SeverityLegend {
    pub name: &'static str,
    pub tiers: Vec<SeverityTier>,
}

/// GET /severity/:table - Legend for the `detailed` or `coarse` table.
#[instrument]
pub async fn get_severity_legend(
    Path(table): Path<String>,
) -> Result<Json<SeverityLegend>, StatusCode> {
    let scale = SeverityScale::by_name(&table).ok_or_else(|| {
        warn!(table = %table, "Invalid severity table");
        StatusCode::BAD_REQUEST
    })?;

    Ok(Json(SeverityLegend {
        name: scale.name,
        tiers: scale.legend(),
    }))
}

/// GET /diseases/:id - Static profile for malaria, tuberculosis or HIV.
///
/// Live diseases (`covid`, `influenza`) have no static profile and answer 404,
/// as do unknown identifiers.
#[instrument]
pub async fn get_disease(
    Path(id): Path<String>,
) -> Result<Json<&'static DiseaseProfile>, StatusCode> {
    DiseaseId::parse(&id)
        .and_then(|disease| disease.profile())
        .map(Json)
        .ok_or_else(|| {
            warn!(disease = %id, "No static profile");
            StatusCode::NOT_FOUND
        })
}
