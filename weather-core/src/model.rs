use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Round to two decimal places, half away from zero.
///
/// Ties are decided on the binary value, so a decimal tie such as `1.005`
/// (stored as slightly less than 1.005) rounds down to `1.0`.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// The form used as a cache key component.
    pub fn rounded(&self) -> Self {
        Self { latitude: round2(self.latitude), longitude: round2(self.longitude) }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// A validated lookup: parsed date plus in-range coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureRequest {
    pub date: NaiveDate,
    pub coordinates: Coordinates,
}

/// One cached day. Coordinates are stored rounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub date: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
    pub max_temperature: f64,
    pub min_temperature: f64,
}

impl WeatherObservation {
    pub fn new(date: NaiveDate, coordinates: Coordinates, max: f64, min: f64) -> Self {
        let key = coordinates.rounded();
        Self {
            date,
            latitude: key.latitude,
            longitude: key.longitude,
            max_temperature: max,
            min_temperature: min,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Daily series as returned by the archive and forecast endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSeries {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub elevation: Option<f64>,
    pub daily: DailySeries,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    pub time: Vec<String>,
    pub temperature_2m_max: Vec<Option<f64>>,
    pub temperature_2m_min: Vec<Option<f64>>,
}

impl DailySeries {
    pub fn is_consistent(&self) -> bool {
        self.time.len() == self.temperature_2m_max.len()
            && self.time.len() == self.temperature_2m_min.len()
    }

    /// Max/min of the first day, if both are present.
    pub fn first_day(&self) -> Option<(f64, f64)> {
        match (self.temperature_2m_max.first(), self.temperature_2m_min.first()) {
            (Some(Some(max)), Some(Some(min))) => Some((*max, *min)),
            _ => None,
        }
    }

    /// Days with a parseable date and both temperatures present.
    pub fn complete_days(&self) -> impl Iterator<Item = (NaiveDate, f64, f64)> + '_ {
        self.time
            .iter()
            .zip(&self.temperature_2m_max)
            .zip(&self.temperature_2m_min)
            .filter_map(|((time, max), min)| {
                let date = NaiveDate::parse_from_str(time, "%Y-%m-%d").ok()?;
                Some((date, (*max)?, (*min)?))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportSource {
    Cache,
    Archive,
    Forecast,
    HistoricalAverage { samples: usize },
}

impl std::fmt::Display for ReportSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportSource::Cache => f.write_str("local cache"),
            ReportSource::Archive => f.write_str("archive API"),
            ReportSource::Forecast => f.write_str("forecast API"),
            ReportSource::HistoricalAverage { samples } => {
                write!(f, "average of {samples} cached year(s)")
            }
        }
    }
}

/// What a lookup hands back to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReport {
    pub date: NaiveDate,
    pub coordinates: Coordinates,
    pub max_temperature: f64,
    pub min_temperature: f64,
    pub source: ReportSource,
}
