use crate::{
    climate, db, index_handler, precipitation, routes, stations, temperature_stats_between,
    temperature_stats_from, tobs, Climate, ClimateAccess, ClimateData,
};
use anyhow::{anyhow, Context};
use axum::{
    body::Body,
    extract::Request,
    middleware::{self, Next},
    response::IntoResponse,
    routing::get,
    Router,
};
use hyper::{header::ACCEPT, Method};
use log::info;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

#[derive(Clone)]
pub struct AppState {
    pub climate: Arc<Climate>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::climate::climate_routes::precipitation,
        routes::climate::climate_routes::stations,
        routes::climate::climate_routes::tobs,
        routes::climate::climate_routes::temperature_stats_from,
        routes::climate::climate_routes::temperature_stats_between,
    ),
    components(
        schemas(
                climate::ErrorResponse,
                climate::DateInterval,
                climate::MostActiveStation,
                climate::PrecipitationReport,
                climate::StationsReport,
                climate::TemperatureObservationsReport,
                climate::TemperatureSummary,
                climate::TemperatureStatsReport,
        )
    ),
    tags(
        (name = "climate data api", description = "a read-only RESTful api over historical precipitation and temperature observations")
    )
)]
struct ApiDoc;

/// Open the observation database read-only and verify it can serve queries
pub async fn connect_climate_db(
    database: &str,
    max_connections: u32,
) -> Result<Arc<ClimateAccess>, anyhow::Error> {
    let climate_db = ClimateAccess::new(database, max_connections)
        .await
        .with_context(|| format!("error opening climate database {}", database))?;

    climate_db
        .health_check()
        .await
        .map_err(|e: db::Error| anyhow!("climate database failed health check: {}", e))?;

    Ok(Arc::new(climate_db))
}

pub fn build_app_state(climate_db: Arc<dyn ClimateData>, region: &str) -> AppState {
    AppState {
        climate: Arc::new(Climate::new(climate_db, region)),
    }
}

pub fn app(app_state: AppState) -> Router {
    let api_docs = ApiDoc::openapi();
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ACCEPT])
        .allow_origin(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/api/v1.0/precipitation", get(precipitation))
        .route("/api/v1.0/stations", get(stations))
        .route("/api/v1.0/tobs", get(tobs))
        .route("/api/v1.0/{start}", get(temperature_stats_from))
        .route("/api/v1.0/{start}/{end}", get(temperature_stats_between))
        .with_state(Arc::new(app_state))
        .layer(middleware::from_fn(log_request))
        .merge(Scalar::with_url("/docs", api_docs))
        .layer(cors)
}

async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let now = time::OffsetDateTime::now_utc();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_default()
        .to_owned();
    info!(target: "http_request", "new request, {} {}", request.method().as_str(), path);

    let response = next.run(request).await;
    let response_time = time::OffsetDateTime::now_utc() - now;
    info!(target: "http_response", "response, {} code: {}, time: {}", path, response.status().as_str(), response_time);

    response
}
