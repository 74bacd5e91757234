//! SQLite-backed cache of daily max/min temperatures.

use chrono::NaiveDate;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use std::{fmt::Debug, path::Path};

use crate::{
    error::Result,
    model::{Coordinates, WeatherObservation},
};

/// Cache keyed by (date, rounded latitude, rounded longitude).
///
/// Implementations round coordinates themselves, so callers may pass raw input.
pub trait ObservationStore: Send + Sync + Debug {
    fn get(&self, date: NaiveDate, coordinates: Coordinates) -> Result<Option<WeatherObservation>>;

    /// Insert or replace a single observation.
    fn put(&self, observation: &WeatherObservation) -> Result<()>;

    /// Insert or replace many observations atomically; returns how many were written.
    fn put_many(&self, observations: &[WeatherObservation]) -> Result<usize>;
}

#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the cache database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS weather_data (
                date TEXT NOT NULL,
                latitude REAL NOT NULL,
                longitude REAL NOT NULL,
                maxTemperature REAL NOT NULL,
                minTemperature REAL NOT NULL,
                PRIMARY KEY (date, latitude, longitude)
            );
            "#,
        )?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

const INSERT_SQL: &str = "INSERT OR REPLACE INTO weather_data \
     (date, latitude, longitude, maxTemperature, minTemperature) VALUES (?1, ?2, ?3, ?4, ?5)";

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

impl ObservationStore for SqliteStore {
    fn get(&self, date: NaiveDate, coordinates: Coordinates) -> Result<Option<WeatherObservation>> {
        let key = coordinates.rounded();
        let conn = self.conn.lock();
        let row = conn
            .query_row(
                "SELECT maxTemperature, minTemperature FROM weather_data \
                 WHERE date = ?1 AND latitude = ?2 AND longitude = ?3",
                params![date_key(date), key.latitude, key.longitude],
                |row| Ok((row.get::<_, f64>(0)?, row.get::<_, f64>(1)?)),
            )
            .optional()?;

        Ok(row.map(|(max, min)| WeatherObservation::new(date, key, max, min)))
    }

    fn put(&self, observation: &WeatherObservation) -> Result<()> {
        self.put_many(std::slice::from_ref(observation)).map(|_| ())
    }

    fn put_many(&self, observations: &[WeatherObservation]) -> Result<usize> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(INSERT_SQL)?;
            for obs in observations {
                let key = obs.coordinates().rounded();
                stmt.execute(params![
                    date_key(obs.date),
                    key.latitude,
                    key.longitude,
                    obs.max_temperature,
                    obs.min_temperature,
                ])?;
            }
        }
        tx.commit()?;
        Ok(observations.len())
    }
}
