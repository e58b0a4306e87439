use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::{
    climate::{Error, ErrorResponse},
    AppState, PrecipitationReport, StationsReport, TemperatureObservationsReport,
    TemperatureStatsReport,
};

#[utoipa::path(
    get,
    path = "/api/v1.0/precipitation",
    responses(
        (status = OK, description = "Last 12 months of precipitation keyed by date", body = PrecipitationReport),
        (status = NOT_FOUND, description = "No measurements recorded", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read measurements", body = ErrorResponse)
    ))]
pub async fn precipitation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PrecipitationReport>, Error> {
    state.climate.precipitation().await.map(Json)
}

#[utoipa::path(
    get,
    path = "/api/v1.0/stations",
    responses(
        (status = OK, description = "Station names keyed by station id", body = StationsReport),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read stations", body = ErrorResponse)
    ))]
pub async fn stations(State(state): State<Arc<AppState>>) -> Result<Json<StationsReport>, Error> {
    state.climate.stations().await.map(Json)
}

#[utoipa::path(
    get,
    path = "/api/v1.0/tobs",
    responses(
        (status = OK, description = "Last 12 months of temperature observations for the most active station", body = TemperatureObservationsReport),
        (status = NOT_FOUND, description = "No station has measurements", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read measurements", body = ErrorResponse)
    ))]
pub async fn tobs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TemperatureObservationsReport>, Error> {
    state.climate.temperature_observations().await.map(Json)
}

#[utoipa::path(
    get,
    path = "/api/v1.0/{start}",
    params(
        ("start" = String, Path, description = "First day of the range, YYYY-MM-DD"),
    ),
    responses(
        (status = OK, description = "Minimum, average and maximum temperature from start on", body = TemperatureStatsReport),
        (status = BAD_REQUEST, description = "Malformed date", body = ErrorResponse),
        (status = NOT_FOUND, description = "No temperature observations in range", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read measurements", body = ErrorResponse)
    ))]
pub async fn temperature_stats_from(
    State(state): State<Arc<AppState>>,
    Path(start): Path<String>,
) -> Result<Json<TemperatureStatsReport>, Error> {
    state.climate.temperature_stats(&start, None).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/api/v1.0/{start}/{end}",
    params(
        ("start" = String, Path, description = "First day of the range, YYYY-MM-DD"),
        ("end" = String, Path, description = "Last day of the range inclusive, YYYY-MM-DD"),
    ),
    responses(
        (status = OK, description = "Minimum, average and maximum temperature between start and end", body = TemperatureStatsReport),
        (status = BAD_REQUEST, description = "Malformed date or start after end", body = ErrorResponse),
        (status = NOT_FOUND, description = "No temperature observations in range", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read measurements", body = ErrorResponse)
    ))]
pub async fn temperature_stats_between(
    State(state): State<Arc<AppState>>,
    Path((start, end)): Path<(String, String)>,
) -> Result<Json<TemperatureStatsReport>, Error> {
    state
        .climate
        .temperature_stats(&start, Some(&end))
        .await
        .map(Json)
}
