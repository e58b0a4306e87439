pub mod climate;
pub mod db;
pub mod routes;
mod startup;
mod utils;

pub use climate::{
    Climate, DateInterval, ErrorResponse, MostActiveStation, PrecipitationReport,
    StationsReport, TemperatureObservationsReport, TemperatureStatsReport, TemperatureSummary,
};
pub use db::{
    ActiveStation, ClimateAccess, ClimateData, Precipitation, Station, TemperatureObservation,
    TemperatureStats, DATE_FORMAT,
};
pub use routes::*;
pub use startup::*;
pub use utils::*;
