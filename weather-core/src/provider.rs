use crate::{Config, error::Result, model::{Coordinates, WeatherSeries}, provider::open_meteo::OpenMeteoSource};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt::Debug;

pub mod open_meteo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceId {
    Archive,
    Forecast,
}

impl SourceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Archive => "archive",
            SourceId::Forecast => "forecast",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            SourceId::Archive => "https://archive-api.open-meteo.com/v1",
            SourceId::Forecast => "https://api.open-meteo.com/v1",
        }
    }

    pub const fn all() -> &'static [SourceId] {
        &[SourceId::Archive, SourceId::Forecast]
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remote service returning daily max/min temperature series.
#[async_trait]
pub trait TemperatureSource: Send + Sync + Debug {
    fn id(&self) -> SourceId;

    /// Fetch the inclusive `start..=end` range. A successful result has
    /// equal-length, non-empty daily arrays.
    async fn fetch_daily(
        &self,
        coordinates: Coordinates,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<WeatherSeries>;
}

/// Construct a source from config and explicit SourceId.
pub fn source_from_config(id: SourceId, config: &Config) -> Box<dyn TemperatureSource> {
    Box::new(OpenMeteoSource::new(id, config.source_base_url(id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn source_from_config_uses_default_urls() {
        let cfg = Config::default();
        let source = source_from_config(SourceId::Forecast, &cfg);
        assert_eq!(source.id(), SourceId::Forecast);
    }

    #[test]
    fn source_names_match_endpoint_paths() {
        let names: Vec<_> = SourceId::all().iter().map(SourceId::as_str).collect();
        assert_eq!(names, ["archive", "forecast"]);
    }
}
