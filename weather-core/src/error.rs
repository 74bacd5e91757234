//! Error type shared by validation, routing, the remote sources and the cache.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Latitude => f.write_str("latitude"),
            Axis::Longitude => f.write_str("longitude"),
        }
    }
}

/// Ways a remote source can answer without giving usable data.
#[derive(Error, Debug)]
pub enum ApiFailure {
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("no temperature data for {date}")]
    EmptyData { date: NaiveDate },

    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid {axis} format '{value}'")]
    InvalidCoordinateFormat { axis: Axis, value: String },

    #[error("{axis} {value} out of range")]
    CoordinateOutOfRange { axis: Axis, value: f64 },

    #[error("{source_name} API error: {failure}")]
    Api { source_name: &'static str, failure: ApiFailure },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("no cached history to average for {0}")]
    NoHistoricalData(NaiveDate),

    #[error("cache error: {0}")]
    Store(#[from] rusqlite::Error),
}

impl WeatherError {
    pub fn api(source_name: &'static str, failure: ApiFailure) -> Self {
        Self::Api { source_name, failure }
    }

    /// Message suitable for showing to a person.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidDate(_) => "Invalid input. Please enter a valid date (YYYY-MM-DD).".to_string(),
            Self::InvalidCoordinateFormat { axis, .. } => format!("Invalid {axis} format"),
            Self::CoordinateOutOfRange { axis: Axis::Latitude, .. } => {
                "Latitude must be within -90 to 90 degrees".to_string()
            }
            Self::CoordinateOutOfRange { axis: Axis::Longitude, .. } => {
                "Longitude must be within -180 to 180 degrees".to_string()
            }
            Self::Api { failure: ApiFailure::EmptyData { .. }, .. } => {
                "Temperature data is not available for the specified date".to_string()
            }
            Self::Api { .. } => "Error fetching weather data. Please try again later.".to_string(),
            Self::Network(_) => "Network error. Please check your internet connection.".to_string(),
            Self::NoHistoricalData(_) => {
                "No historical data available to calculate averages.".to_string()
            }
            Self::Store(_) => "Local cache error".to_string(),
        }
    }
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;
