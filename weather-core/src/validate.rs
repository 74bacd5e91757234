//! Input checks run before any cache lookup or fetch.

use chrono::NaiveDate;

use crate::{
    error::{Axis, Result, WeatherError},
    model::{Coordinates, TemperatureRequest},
};

/// Strict `YYYY-MM-DD`: four-digit year, zero-padded month and day.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .filter(|date| date.format("%Y-%m-%d").to_string() == trimmed)
        .ok_or_else(|| WeatherError::InvalidDate(raw.to_string()))
}

fn parse_axis(axis: Axis, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| WeatherError::InvalidCoordinateFormat { axis, value: raw.to_string() })
}

pub fn validate_coordinates(latitude: &str, longitude: &str) -> Result<Coordinates> {
    let lat = parse_axis(Axis::Latitude, latitude)?;
    let lon = parse_axis(Axis::Longitude, longitude)?;

    if !(-90.0..=90.0).contains(&lat) {
        return Err(WeatherError::CoordinateOutOfRange { axis: Axis::Latitude, value: lat });
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(WeatherError::CoordinateOutOfRange { axis: Axis::Longitude, value: lon });
    }

    Ok(Coordinates::new(lat, lon))
}

/// Validate raw user input into a request the router accepts.
pub fn validate_request(date: &str, latitude: &str, longitude: &str) -> Result<TemperatureRequest> {
    let date = parse_date(date)?;
    let coordinates = validate_coordinates(latitude, longitude)?;
    Ok(TemperatureRequest { date, coordinates })
}
