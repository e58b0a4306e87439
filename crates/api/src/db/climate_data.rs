use async_trait::async_trait;
use log::{debug, info};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    Row,
};
use std::time::Duration;
use time::Date;

use super::{
    ActiveStation, Precipitation, Station, TemperatureObservation, TemperatureStats, DATE_FORMAT,
};

const REQUIRED_TABLES: [&str; 2] = ["measurement", "station"];

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to query sqlite: {0}")]
    Query(#[from] sqlx::Error),
    #[error("Stored date is not YYYY-MM-DD: {0}")]
    StoredDate(#[from] time::error::Parse),
    #[error("Failed to format date: {0}")]
    DateFormat(#[from] time::error::Format),
    #[error("Database is missing the `{0}` table")]
    MissingTable(String),
}

#[async_trait]
pub trait ClimateData: Sync + Send {
    /// Most recent observation date across every station
    async fn latest_date(&self) -> Result<Option<Date>, Error>;
    /// Most recent observation date for a single station
    async fn latest_station_date(&self, station_id: &str) -> Result<Option<Date>, Error>;
    /// Daily precipitation on or after `start`, ordered by date then storage order
    async fn precipitation_since(&self, start: Date) -> Result<Vec<Precipitation>, Error>;
    async fn stations(&self) -> Result<Vec<Station>, Error>;
    /// Station with the most temperature observations, ties go to the lowest station id
    async fn most_active_station(&self) -> Result<Option<ActiveStation>, Error>;
    async fn temperature_observations(
        &self,
        station_id: &str,
        start: Date,
    ) -> Result<Vec<TemperatureObservation>, Error>;
    /// Min/avg/max temperature in `[start, end]`, `None` when nothing matched
    async fn temperature_stats(
        &self,
        start: Date,
        end: Option<Date>,
    ) -> Result<Option<TemperatureStats>, Error>;
}

pub struct ClimateAccess {
    pool: SqlitePool,
}

impl ClimateAccess {
    /// Opens a read-only pool over an existing SQLite file, the file is never created
    pub async fn new(path: &str, max_connections: u32) -> Result<Self, Error> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        info!(
            "SQLite climate database opened read-only at: {} (max connections: {})",
            path, max_connections
        );
        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check connectivity and that both observation tables are present.
    pub async fn health_check(&self) -> Result<(), Error> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;

        for table in REQUIRED_TABLES {
            let found: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?",
            )
            .bind(table)
            .fetch_one(&self.pool)
            .await?;
            if found == 0 {
                return Err(Error::MissingTable(table.to_string()));
            }
        }

        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("SQLite climate database closed");
    }
}

fn parse_stored_date(value: Option<String>) -> Result<Option<Date>, Error> {
    value
        .map(|date| Date::parse(&date, DATE_FORMAT).map_err(Error::from))
        .transpose()
}

fn iso(date: Date) -> Result<String, Error> {
    Ok(date.format(DATE_FORMAT)?)
}

#[async_trait]
impl ClimateData for ClimateAccess {
    async fn latest_date(&self) -> Result<Option<Date>, Error> {
        let latest: Option<String> = sqlx::query_scalar("SELECT MAX(date) FROM measurement")
            .fetch_one(&self.pool)
            .await?;
        parse_stored_date(latest)
    }

    async fn latest_station_date(&self, station_id: &str) -> Result<Option<Date>, Error> {
        let latest: Option<String> =
            sqlx::query_scalar("SELECT MAX(date) FROM measurement WHERE station = ?")
                .bind(station_id)
                .fetch_one(&self.pool)
                .await?;
        parse_stored_date(latest)
    }

    async fn precipitation_since(&self, start: Date) -> Result<Vec<Precipitation>, Error> {
        let start = iso(start)?;
        debug!("querying precipitation since {}", start);

        let rows = sqlx::query_as::<_, Precipitation>(
            "SELECT date, CAST(prcp AS REAL) AS prcp
             FROM measurement
             WHERE date >= ?
             ORDER BY date, rowid",
        )
        .bind(start)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn stations(&self) -> Result<Vec<Station>, Error> {
        let rows = sqlx::query_as::<_, Station>(
            "SELECT station AS station_id, name FROM station ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn most_active_station(&self) -> Result<Option<ActiveStation>, Error> {
        let row = sqlx::query_as::<_, ActiveStation>(
            "SELECT m.station AS station_id, s.name AS name, COUNT(m.tobs) AS observations
             FROM measurement m
             JOIN station s ON m.station = s.station
             GROUP BY m.station, s.name
             ORDER BY observations DESC, m.station ASC
             LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn temperature_observations(
        &self,
        station_id: &str,
        start: Date,
    ) -> Result<Vec<TemperatureObservation>, Error> {
        let start = iso(start)?;
        debug!(
            "querying temperature observations for {} since {}",
            station_id, start
        );

        let rows = sqlx::query_as::<_, TemperatureObservation>(
            "SELECT date, CAST(tobs AS REAL) AS tobs
             FROM measurement
             WHERE station = ? AND date >= ?
             ORDER BY date, rowid",
        )
        .bind(station_id)
        .bind(start)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn temperature_stats(
        &self,
        start: Date,
        end: Option<Date>,
    ) -> Result<Option<TemperatureStats>, Error> {
        let mut sql = String::from(
            "SELECT MIN(CAST(tobs AS REAL)) AS minimum,
                    AVG(CAST(tobs AS REAL)) AS average,
                    MAX(CAST(tobs AS REAL)) AS maximum,
                    COUNT(tobs) AS observations
             FROM measurement
             WHERE date >= ?",
        );
        if end.is_some() {
            sql.push_str(" AND date <= ?");
        }

        let mut query = sqlx::query(&sql).bind(iso(start)?);
        if let Some(end) = end {
            query = query.bind(iso(end)?);
        }
        let row = query.fetch_one(&self.pool).await?;

        let observations: i64 = row.try_get("observations")?;
        if observations == 0 {
            return Ok(None);
        }

        let minimum: Option<f64> = row.try_get("minimum")?;
        let average: Option<f64> = row.try_get("average")?;
        let maximum: Option<f64> = row.try_get("maximum")?;

        Ok(match (minimum, average, maximum) {
            (Some(minimum), Some(average), Some(maximum)) => Some(TemperatureStats {
                minimum,
                average,
                maximum,
                observations,
            }),
            _ => None,
        })
    }
}
