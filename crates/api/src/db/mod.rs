pub mod climate_data;

pub use climate_data::*;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{format_description::BorrowedFormatItem, macros::format_description};

/// Calendar dates are stored and exchanged as `YYYY-MM-DD`
pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Row of the `station` table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Station {
    pub station_id: String,
    pub name: String,
}

/// Precipitation reading for one day at one station, in inches
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Precipitation {
    pub date: String,
    pub prcp: Option<f64>,
}

/// Temperature observation for one day, in Fahrenheit
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct TemperatureObservation {
    pub date: String,
    pub tobs: Option<f64>,
}

/// Station with the highest number of temperature observations
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ActiveStation {
    pub station_id: String,
    pub name: String,
    pub observations: i64,
}

/// Unrounded min/avg/max over a date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureStats {
    pub minimum: f64,
    pub average: f64,
    pub maximum: f64,
    pub observations: i64,
}
