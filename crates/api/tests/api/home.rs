use crate::helpers::{hawaii_measurements, hawaii_stations, seeded_db, spawn_app};
use axum::http::StatusCode;

/// The landing page lists every route a client can call
#[tokio::test]
async fn welcome_lists_routes() {
    let climate_db = seeded_db(&hawaii_stations(), &hawaii_measurements()).await;
    let test_app = spawn_app(climate_db).await;

    let (status, body) = test_app.get("/").await;
    let text = String::from_utf8(body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("Hawaii"));
    for route in [
        "/api/v1.0/precipitation",
        "/api/v1.0/stations",
        "/api/v1.0/tobs",
        "/api/v1.0/<start_date>",
        "/api/v1.0/<start_date>/<end_date>",
    ] {
        assert!(text.contains(route), "missing {route}");
    }
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let climate_db = seeded_db(&hawaii_stations(), &hawaii_measurements()).await;
    let test_app = spawn_app(climate_db).await;

    let (status, _) = test_app.get("/api/v1.0/2017-08-20/2017-08-21/extra").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn api_docs_are_served() {
    let climate_db = seeded_db(&hawaii_stations(), &hawaii_measurements()).await;
    let test_app = spawn_app(climate_db).await;

    let (status, body) = test_app.get("/docs").await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("/api/v1.0/precipitation"));
    assert!(html.contains("/api/v1.0/{start}/{end}"));
    assert!(html.contains("TemperatureStatsReport"));
}
