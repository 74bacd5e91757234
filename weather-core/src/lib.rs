//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Input validation for date and coordinate strings
//! - A SQLite cache of daily max/min temperatures
//! - Open-Meteo archive and forecast sources
//! - The router deciding between cache, archive, forecast and historical average
//! - Configuration handling
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod router;
pub mod store;
pub mod validate;

pub use config::{CacheConfig, Config, RoutingConfig, SourceConfig};
pub use error::{ApiFailure, Axis, WeatherError};
pub use model::{
    Coordinates, ReportSource, TemperatureReport, TemperatureRequest, WeatherObservation,
    WeatherSeries, round2,
};
pub use provider::{SourceId, TemperatureSource};
pub use router::WeatherRouter;
pub use store::{ObservationStore, SqliteStore};
pub use validate::{validate_coordinates, validate_request};
