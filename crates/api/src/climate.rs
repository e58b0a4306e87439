use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::Arc};
use time::{Date, Duration};
use utoipa::ToSchema;

use crate::db::{self, ClimateData, DATE_FORMAT};

/// Length of the rolling window served by the precipitation and tobs reports
pub const WINDOW_DAYS: i64 = 365;

pub const PRECIPITATION_INFO: &str = "Last 12 months of precipitation data in inches";
pub const STATIONS_INFO: &str = "Available stations responsible for the observations";
pub const TOBS_INFO: &str =
    "Last 12 months of temperature observation in Fahrenheit for the Station with more observations";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid date '{0}', dates must be formatted as YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Invalid date range, start {start} is after end {end}")]
    InvalidRange { start: String, end: String },
    #[error("No data: {0}")]
    NoData(String),
    #[error("Date window ending {0} starts before the earliest representable date")]
    DateOutOfRange(String),
    #[error("Failed to read climate data: {0}")]
    Data(#[from] db::Error),
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::InvalidDate(_) | Error::InvalidRange { .. } => StatusCode::BAD_REQUEST,
            Error::NoData(_) => StatusCode::NOT_FOUND,
            Error::DateOutOfRange(_) | Error::Data(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("error serving climate data: {}", self);
        } else {
            debug!("rejected climate request: {}", self);
        }

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct DateInterval {
    pub from: String,
    pub to: String,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct PrecipitationReport {
    pub info: String,
    #[serde(rename = "date interval")]
    pub date_interval: DateInterval,
    /// Inches of precipitation keyed by date, null when not recorded
    #[schema(value_type = Object)]
    pub results: BTreeMap<String, Option<f64>>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct StationsReport {
    pub info: String,
    /// Station name keyed by station id
    #[schema(value_type = Object)]
    pub stations: BTreeMap<String, String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct MostActiveStation {
    pub id: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct TemperatureObservationsReport {
    pub info: String,
    #[serde(rename = "most active station")]
    pub most_active_station: MostActiveStation,
    #[serde(rename = "date interval")]
    pub date_interval: DateInterval,
    /// Fahrenheit keyed by date, null when not recorded
    #[schema(value_type = Object)]
    pub results: BTreeMap<String, Option<f64>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct TemperatureSummary {
    #[serde(rename = "minimum temperature")]
    pub minimum: f64,
    #[serde(rename = "average temperature")]
    pub average: f64,
    #[serde(rename = "maximum temperature")]
    pub maximum: f64,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct TemperatureStatsReport {
    pub info: String,
    pub results: TemperatureSummary,
}

/// Round to two decimal places
///
/// Goes through the exact decimal expansion, so a value sitting on a
/// half (76.125) rounds to the even hundredth (76.12).
pub fn round_hundredths(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Parse a `YYYY-MM-DD` path segment
pub fn parse_date(value: &str) -> Result<Date, Error> {
    Date::parse(value, DATE_FORMAT).map_err(|_| Error::InvalidDate(value.to_owned()))
}

/// Window covering the [`WINDOW_DAYS`] days that end on `latest`
pub fn year_window(latest: Date) -> Result<(Date, Date), Error> {
    let start = latest
        .checked_sub(Duration::days(WINDOW_DAYS))
        .ok_or_else(|| Error::DateOutOfRange(latest.to_string()))?;
    Ok((start, latest))
}

fn date_interval(start: Date, end: Date) -> Result<DateInterval, Error> {
    Ok(DateInterval {
        from: start.format(DATE_FORMAT).map_err(db::Error::from)?,
        to: end.format(DATE_FORMAT).map_err(db::Error::from)?,
    })
}

pub struct Climate {
    climate_db: Arc<dyn ClimateData>,
    region: String,
}

impl Climate {
    pub fn new(climate_db: Arc<dyn ClimateData>, region: impl Into<String>) -> Self {
        Self {
            climate_db,
            region: region.into(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub async fn precipitation(&self) -> Result<PrecipitationReport, Error> {
        let latest = self
            .climate_db
            .latest_date()
            .await?
            .ok_or_else(|| Error::NoData("no measurements recorded".to_string()))?;
        let (start, end) = year_window(latest)?;

        // Rows arrive ordered by date, so a later row for the same date replaces an earlier one
        let results: BTreeMap<String, Option<f64>> = self
            .climate_db
            .precipitation_since(start)
            .await?
            .into_iter()
            .map(|row| (row.date, row.prcp))
            .collect();
        info!(
            "precipitation window {} to {} with {} days",
            start,
            end,
            results.len()
        );

        Ok(PrecipitationReport {
            info: PRECIPITATION_INFO.to_string(),
            date_interval: date_interval(start, end)?,
            results,
        })
    }

    pub async fn stations(&self) -> Result<StationsReport, Error> {
        let stations = self
            .climate_db
            .stations()
            .await?
            .into_iter()
            .map(|station| (station.station_id, station.name))
            .collect();

        Ok(StationsReport {
            info: STATIONS_INFO.to_string(),
            stations,
        })
    }

    pub async fn temperature_observations(&self) -> Result<TemperatureObservationsReport, Error> {
        let station = self
            .climate_db
            .most_active_station()
            .await?
            .ok_or_else(|| Error::NoData("no station has measurements".to_string()))?;
        debug!(
            "most active station {} ({}) with {} observations",
            station.station_id, station.name, station.observations
        );

        let latest = self
            .climate_db
            .latest_station_date(&station.station_id)
            .await?
            .ok_or_else(|| {
                Error::NoData(format!("no measurements for station {}", station.station_id))
            })?;
        let (start, end) = year_window(latest)?;

        let results = self
            .climate_db
            .temperature_observations(&station.station_id, start)
            .await?
            .into_iter()
            .map(|row| (row.date, row.tobs))
            .collect();

        Ok(TemperatureObservationsReport {
            info: TOBS_INFO.to_string(),
            most_active_station: MostActiveStation {
                id: station.station_id,
                name: station.name,
            },
            date_interval: date_interval(start, end)?,
            results,
        })
    }

    /// Temperature summary from `start` onwards, or between `start` and `end` inclusive
    pub async fn temperature_stats(
        &self,
        start: &str,
        end: Option<&str>,
    ) -> Result<TemperatureStatsReport, Error> {
        let start_date = parse_date(start)?;
        let end_date = end.map(parse_date).transpose()?;

        if let (Some(end_date), Some(end)) = (end_date, end) {
            if start_date > end_date {
                return Err(Error::InvalidRange {
                    start: start.to_owned(),
                    end: end.to_owned(),
                });
            }
        }

        let stats = self
            .climate_db
            .temperature_stats(start_date, end_date)
            .await?
            .ok_or_else(|| {
                Error::NoData(match end {
                    Some(end) => format!("no temperature observations from {} to {}", start, end),
                    None => format!("no temperature observations from {} on", start),
                })
            })?;

        let info = match end {
            Some(end) => format!(
                "Maximum, average and minimum temperature in F in {} from {} to {}",
                self.region, start, end
            ),
            None => format!(
                "Maximum, average and minimum temperature in F in {} from {} on",
                self.region, start
            ),
        };

        Ok(TemperatureStatsReport {
            info,
            results: TemperatureSummary {
                minimum: round_hundredths(stats.minimum),
                average: round_hundredths(stats.average),
                maximum: round_hundredths(stats.maximum),
            },
        })
    }
}
