use crate::helpers::{
    hawaii_measurements, hawaii_stations, seeded_db, spawn_app, MeasurementRow, MockClimateDb,
};
use axum::http::StatusCode;
use climate_api::{
    db, ErrorResponse, PrecipitationReport, StationsReport, TemperatureObservationsReport,
    TemperatureStatsReport,
};
use serde_json::Value;
use std::{collections::BTreeMap, sync::Arc};
use time::macros::date;

#[tokio::test]
async fn precipitation_covers_last_365_days() {
    let climate_db = seeded_db(&hawaii_stations(), &hawaii_measurements()).await;
    let test_app = spawn_app(climate_db).await;

    let (status, report): (_, PrecipitationReport) =
        test_app.get_json("/api/v1.0/precipitation").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report.info, "Last 12 months of precipitation data in inches");
    assert_eq!(report.date_interval.from, "2016-08-23");
    assert_eq!(report.date_interval.to, "2017-08-23");

    let expected: BTreeMap<String, Option<f64>> = [
        ("2016-08-23", Some(0.0)),
        ("2017-01-01", Some(0.29)),
        ("2017-08-17", Some(0.01)),
        ("2017-08-18", Some(0.06)),
        ("2017-08-21", None),
        ("2017-08-22", Some(0.5)),
        // two stations reported this day, the later row wins
        ("2017-08-23", Some(0.45)),
    ]
    .into_iter()
    .map(|(date, prcp)| (date.to_string(), prcp))
    .collect();
    assert_eq!(report.results, expected);
}

#[tokio::test]
async fn precipitation_keeps_published_field_names() {
    let climate_db = seeded_db(&hawaii_stations(), &hawaii_measurements()).await;
    let test_app = spawn_app(climate_db).await;

    let (status, body): (_, Value) = test_app.get_json("/api/v1.0/precipitation").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["date interval"]["to"], "2017-08-23");
    assert!(body["results"]["2017-08-21"].is_null());
}

#[tokio::test]
async fn precipitation_on_empty_table_is_not_found() {
    let climate_db = seeded_db(&hawaii_stations(), &[]).await;
    let test_app = spawn_app(climate_db).await;

    let (status, body): (_, ErrorResponse) = test_app.get_json("/api/v1.0/precipitation").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.error.contains("no measurements"));
}

#[tokio::test]
async fn stations_lists_each_station_once() {
    let mut stations = hawaii_stations();
    stations.push(("USC00519397", "WAIKIKI 717.2, HI US"));
    let climate_db = seeded_db(&stations, &hawaii_measurements()).await;
    let test_app = spawn_app(climate_db).await;

    let (status, first): (_, StationsReport) = test_app.get_json("/api/v1.0/stations").await;
    let (_, second): (_, StationsReport) = test_app.get_json("/api/v1.0/stations").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        first.info,
        "Available stations responsible for the observations"
    );
    assert_eq!(first.stations.len(), 3);
    assert_eq!(
        first.stations.get("USC00519281").map(String::as_str),
        Some("WAIHEE 837.5, HI US")
    );
    assert_eq!(first.stations, second.stations);
}

#[tokio::test]
async fn stations_on_empty_table_is_empty_mapping() {
    let climate_db = seeded_db(&[], &[]).await;
    let test_app = spawn_app(climate_db).await;

    let (status, report): (_, StationsReport) = test_app.get_json("/api/v1.0/stations").await;

    assert_eq!(status, StatusCode::OK);
    assert!(report.stations.is_empty());
}

#[tokio::test]
async fn tobs_uses_most_active_station_window() {
    let climate_db = seeded_db(&hawaii_stations(), &hawaii_measurements()).await;
    let test_app = spawn_app(climate_db).await;

    let (status, report): (_, TemperatureObservationsReport) =
        test_app.get_json("/api/v1.0/tobs").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report.most_active_station.id, "USC00519281");
    assert_eq!(report.most_active_station.name, "WAIHEE 837.5, HI US");
    // the window ends on the station's own latest observation
    assert_eq!(report.date_interval.from, "2016-08-18");
    assert_eq!(report.date_interval.to, "2017-08-18");

    let expected: BTreeMap<String, Option<f64>> = [
        ("2016-08-18", Some(80.0)),
        ("2017-01-01", Some(72.0)),
        ("2017-08-17", Some(76.0)),
        ("2017-08-18", Some(79.0)),
    ]
    .into_iter()
    .map(|(date, tobs)| (date.to_string(), tobs))
    .collect();
    assert_eq!(report.results, expected);
}

#[tokio::test]
async fn tobs_reports_unrecorded_days_as_null() {
    let mut measurements = hawaii_measurements();
    measurements.push(("USC00519281", "2017-02-01", Some(0.0), None));
    let climate_db = seeded_db(&hawaii_stations(), &measurements).await;
    let test_app = spawn_app(climate_db).await;

    let (status, body) = test_app.get("/api/v1.0/tobs").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["most active station"]["id"], "USC00519281");
    let results = json["results"].as_object().unwrap();
    assert_eq!(results.len(), 5);
    assert!(results["2017-02-01"].is_null());
    assert_eq!(results["2017-01-01"], 72.0);
}

#[tokio::test]
async fn tobs_most_active_station_outcounts_the_rest() {
    let measurements = hawaii_measurements();
    let climate_db = seeded_db(&hawaii_stations(), &measurements).await;
    let test_app = spawn_app(climate_db).await;

    let (_, report): (_, TemperatureObservationsReport) =
        test_app.get_json("/api/v1.0/tobs").await;

    let count = |station: &str| {
        measurements
            .iter()
            .filter(|(id, _, _, tobs)| *id == station && tobs.is_some())
            .count()
    };
    let winner = count(&report.most_active_station.id);
    for (station, _) in hawaii_stations() {
        assert!(winner >= count(station));
    }
}

#[tokio::test]
async fn tobs_on_empty_table_is_not_found() {
    let climate_db = seeded_db(&hawaii_stations(), &[]).await;
    let test_app = spawn_app(climate_db).await;

    let (status, _): (_, ErrorResponse) = test_app.get_json("/api/v1.0/tobs").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn temperature_stats_from_start() {
    let climate_db = seeded_db(
        &[("A", "Station A")],
        &[
            ("A", "2017-08-20", Some(0.5), Some(75)),
            ("A", "2017-08-21", Some(0.0), Some(78)),
        ],
    )
    .await;
    let test_app = spawn_app(climate_db).await;

    let (status, report): (_, TemperatureStatsReport) =
        test_app.get_json("/api/v1.0/2017-08-20").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        report.info,
        "Maximum, average and minimum temperature in F in Hawaii from 2017-08-20 on"
    );
    assert_eq!(report.results.minimum, 75.0);
    assert_eq!(report.results.average, 76.5);
    assert_eq!(report.results.maximum, 78.0);
}

#[tokio::test]
async fn temperature_stats_single_day_range() {
    let climate_db = seeded_db(
        &[("A", "Station A")],
        &[
            ("A", "2017-08-20", Some(0.5), Some(75)),
            ("A", "2017-08-21", Some(0.0), Some(78)),
        ],
    )
    .await;
    let test_app = spawn_app(climate_db).await;

    let (status, report): (_, TemperatureStatsReport) =
        test_app.get_json("/api/v1.0/2017-08-20/2017-08-20").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        report.info,
        "Maximum, average and minimum temperature in F in Hawaii from 2017-08-20 to 2017-08-20"
    );
    assert_eq!(report.results.minimum, 75.0);
    assert_eq!(report.results.average, 75.0);
    assert_eq!(report.results.maximum, 75.0);
}

#[tokio::test]
async fn temperature_stats_are_ordered_and_rounded() {
    let climate_db = seeded_db(&hawaii_stations(), &hawaii_measurements()).await;
    let test_app = spawn_app(climate_db).await;

    for uri in [
        "/api/v1.0/2017-08-22",
        "/api/v1.0/2017-01-01/2017-08-18",
        "/api/v1.0/2016-01-01",
    ] {
        let (status, report): (_, TemperatureStatsReport) = test_app.get_json(uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");

        let stats = report.results;
        assert!(stats.minimum <= stats.average, "{uri}");
        assert!(stats.average <= stats.maximum, "{uri}");
        for value in [stats.minimum, stats.average, stats.maximum] {
            assert_eq!((value * 100.0).round() / 100.0, value, "{uri}");
        }
    }

    let (_, report): (_, TemperatureStatsReport) =
        test_app.get_json("/api/v1.0/2017-08-22").await;
    assert_eq!(report.results.minimum, 76.0);
    assert_eq!(report.results.average, 77.67);
    assert_eq!(report.results.maximum, 81.0);

    let (_, report): (_, TemperatureStatsReport) =
        test_app.get_json("/api/v1.0/2017-01-01/2017-08-18").await;
    assert_eq!(report.results.minimum, 72.0);
    assert_eq!(report.results.average, 75.67);
    assert_eq!(report.results.maximum, 79.0);
}

#[tokio::test]
async fn temperature_stats_round_half_averages_to_even() {
    let dates = [
        "2017-08-01",
        "2017-08-02",
        "2017-08-03",
        "2017-08-04",
        "2017-08-05",
        "2017-08-06",
        "2017-08-07",
        "2017-08-08",
    ];
    let tobs = [76, 76, 76, 76, 76, 76, 77, 76];
    let measurements: Vec<MeasurementRow> = dates
        .iter()
        .zip(tobs)
        .map(|(date, tobs)| ("A", *date, None, Some(tobs)))
        .collect();
    let climate_db = seeded_db(&[("A", "Station A")], &measurements).await;
    let test_app = spawn_app(climate_db).await;

    let (status, report): (_, TemperatureStatsReport) =
        test_app.get_json("/api/v1.0/2017-08-01/2017-08-08").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report.results.minimum, 76.0);
    assert_eq!(report.results.average, 76.12);
    assert_eq!(report.results.maximum, 77.0);
}

#[tokio::test]
async fn temperature_stats_empty_table_is_no_data() {
    let climate_db = seeded_db(&[], &[]).await;
    let test_app = spawn_app(climate_db).await;

    let (status, body): (_, ErrorResponse) = test_app.get_json("/api/v1.0/2017-08-20").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.error.contains("no temperature observations from 2017-08-20 on"));

    let (status, _): (_, ErrorResponse) =
        test_app.get_json("/api/v1.0/2017-08-20/2017-08-21").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn temperature_stats_reject_malformed_dates() {
    let climate_db = seeded_db(&hawaii_stations(), &hawaii_measurements()).await;
    let test_app = spawn_app(climate_db).await;

    for uri in [
        "/api/v1.0/2017-8-20",
        "/api/v1.0/yesterday",
        "/api/v1.0/2017-02-30",
        "/api/v1.0/2017-08-20/soon",
    ] {
        let (status, body): (_, ErrorResponse) = test_app.get_json(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body.error.contains("YYYY-MM-DD"), "{uri}");
    }
}

#[tokio::test]
async fn temperature_stats_reject_reversed_range() {
    let climate_db = seeded_db(&hawaii_stations(), &hawaii_measurements()).await;
    let test_app = spawn_app(climate_db).await;

    let (status, body): (_, ErrorResponse) =
        test_app.get_json("/api/v1.0/2017-08-21/2017-08-20").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.error.contains("after end"));
}

#[tokio::test]
async fn temperature_stats_pass_parsed_dates_to_store() {
    let mut climate_db = MockClimateDb::new();
    climate_db
        .expect_temperature_stats()
        .withf(|start, end| *start == date!(2017 - 08 - 01) && *end == Some(date!(2017 - 08 - 31)))
        .times(1)
        .returning(|_, _| {
            Ok(Some(climate_api::TemperatureStats {
                minimum: 70.0,
                average: 74.123_456,
                maximum: 82.0,
                observations: 81,
            }))
        });
    let test_app = spawn_app(Arc::new(climate_db)).await;

    let (status, report): (_, TemperatureStatsReport) =
        test_app.get_json("/api/v1.0/2017-08-01/2017-08-31").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report.results.average, 74.12);
}

#[tokio::test]
async fn store_failure_is_a_server_error() {
    let mut climate_db = MockClimateDb::new();
    climate_db
        .expect_latest_date()
        .times(1)
        .returning(|| Err(db::Error::Query(sqlx::Error::PoolTimedOut)));
    climate_db
        .expect_stations()
        .times(1)
        .returning(|| Err(db::Error::Query(sqlx::Error::PoolClosed)));
    let test_app = spawn_app(Arc::new(climate_db)).await;

    let (status, body): (_, ErrorResponse) = test_app.get_json("/api/v1.0/precipitation").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.error.starts_with("Failed to read climate data"));

    let (status, _): (_, ErrorResponse) = test_app.get_json("/api/v1.0/stations").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn tobs_without_station_dates_is_not_found() {
    let mut climate_db = MockClimateDb::new();
    climate_db.expect_most_active_station().times(1).returning(|| {
        Ok(Some(climate_api::ActiveStation {
            station_id: "USC00519281".into(),
            name: "WAIHEE 837.5, HI US".into(),
            observations: 0,
        }))
    });
    climate_db
        .expect_latest_station_date()
        .withf(|station_id| station_id.to_string() == "USC00519281")
        .times(1)
        .returning(|_| Ok(None));
    climate_db.expect_temperature_observations().never();
    let test_app = spawn_app(Arc::new(climate_db)).await;

    let (status, body): (_, ErrorResponse) = test_app.get_json("/api/v1.0/tobs").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.error.contains("USC00519281"));
}
