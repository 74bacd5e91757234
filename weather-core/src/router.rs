//! Date-driven choice between the cache, the archive and forecast sources,
//! and the multi-year average used for dates that have not happened yet.

use chrono::{Datelike, Days, Local, Months, NaiveDate};
use std::sync::Arc;

use crate::{
    Config,
    config::RoutingConfig,
    error::{ApiFailure, Result, WeatherError},
    model::{Coordinates, ReportSource, TemperatureReport, TemperatureRequest, WeatherObservation, round2},
    provider::{SourceId, TemperatureSource, source_from_config},
    store::ObservationStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRoute {
    /// After today: averaged from cached history, never fetched.
    Future,
    /// Older than the forecast window.
    Archive,
    /// Within the window, today inclusive.
    Forecast,
}

pub fn classify_date(today: NaiveDate, date: NaiveDate, window_days: u32) -> DateRoute {
    let window_start = today.checked_sub_days(Days::new(window_days.into())).unwrap_or(NaiveDate::MIN);

    if date > today {
        DateRoute::Future
    } else if date < window_start {
        DateRoute::Archive
    } else {
        DateRoute::Forecast
    }
}

/// `date`'s month/day in each of the `years` years before `today`'s year.
/// Years where that day does not exist (Feb 29) are skipped.
pub fn historical_dates(date: NaiveDate, today: NaiveDate, years: u32) -> Vec<NaiveDate> {
    let current = today.year();
    let first = current
        .saturating_sub(i32::try_from(years).unwrap_or(i32::MAX))
        .max(NaiveDate::MIN.year());
    (first..current)
        .filter_map(|year| NaiveDate::from_ymd_opt(year, date.month(), date.day()))
        .collect()
}

#[derive(Debug, Clone)]
pub struct WeatherRouter {
    store: Arc<dyn ObservationStore>,
    archive: Arc<dyn TemperatureSource>,
    forecast: Arc<dyn TemperatureSource>,
    routing: RoutingConfig,
}

impl WeatherRouter {
    pub fn new(
        store: Arc<dyn ObservationStore>,
        archive: Arc<dyn TemperatureSource>,
        forecast: Arc<dyn TemperatureSource>,
    ) -> Self {
        Self { store, archive, forecast, routing: RoutingConfig::default() }
    }

    pub fn from_config(config: &Config, store: Arc<dyn ObservationStore>) -> Self {
        let archive: Arc<dyn TemperatureSource> = source_from_config(SourceId::Archive, config).into();
        let forecast: Arc<dyn TemperatureSource> = source_from_config(SourceId::Forecast, config).into();
        Self::new(store, archive, forecast).with_routing(config.routing.clone())
    }

    pub fn with_routing(mut self, routing: RoutingConfig) -> Self {
        self.routing = routing;
        self
    }

    /// Resolve a request against the current local date.
    pub async fn lookup(&self, request: &TemperatureRequest) -> Result<TemperatureReport> {
        self.lookup_on(request, Local::now().date_naive()).await
    }

    pub async fn lookup_on(
        &self,
        request: &TemperatureRequest,
        today: NaiveDate,
    ) -> Result<TemperatureReport> {
        let route = classify_date(today, request.date, self.routing.forecast_window_days);
        tracing::debug!(date = %request.date, %today, ?route, "routing lookup");

        match route {
            DateRoute::Future => self.historical_average(request, today),
            DateRoute::Archive => self.cached_or_fetch(self.archive.as_ref(), request).await,
            DateRoute::Forecast => self.cached_or_fetch(self.forecast.as_ref(), request).await,
        }
    }

    async fn cached_or_fetch(
        &self,
        source: &dyn TemperatureSource,
        request: &TemperatureRequest,
    ) -> Result<TemperatureReport> {
        let key = request.coordinates.rounded();

        if let Some(hit) = self.store.get(request.date, key)? {
            tracing::debug!(date = %request.date, coordinates = %key, "cache hit");
            return Ok(report(request.date, key, hit.max_temperature, hit.min_temperature, ReportSource::Cache));
        }

        let series = source.fetch_daily(request.coordinates, request.date, request.date).await?;
        let (max, min) = series.daily.first_day().ok_or_else(|| {
            WeatherError::api(source.id().as_str(), ApiFailure::EmptyData { date: request.date })
        })?;

        let observation = WeatherObservation::new(request.date, key, max, min);
        if let Err(e) = self.store.put(&observation) {
            tracing::warn!(date = %request.date, coordinates = %key, "failed to cache fetched day: {e}");
        }

        let source = match source.id() {
            SourceId::Archive => ReportSource::Archive,
            SourceId::Forecast => ReportSource::Forecast,
        };
        Ok(report(request.date, key, max, min, source))
    }

    /// Mean of the cached max/min for the same month/day over past years.
    /// Reads the cache only.
    pub fn historical_average(
        &self,
        request: &TemperatureRequest,
        today: NaiveDate,
    ) -> Result<TemperatureReport> {
        let key = request.coordinates.rounded();
        let mut total_max = 0.0;
        let mut total_min = 0.0;
        let mut samples = 0usize;

        for date in historical_dates(request.date, today, self.routing.history_years) {
            if let Some(hit) = self.store.get(date, key)? {
                total_max += hit.max_temperature;
                total_min += hit.min_temperature;
                samples += 1;
            }
        }

        if samples == 0 {
            return Err(WeatherError::NoHistoricalData(request.date));
        }

        let n = samples as f64;
        tracing::debug!(date = %request.date, samples, "averaged cached history");
        Ok(report(
            request.date,
            key,
            round2(total_max / n),
            round2(total_min / n),
            ReportSource::HistoricalAverage { samples },
        ))
    }

    /// Pull the archive range covering the configured history and store every
    /// complete day. Returns the number of rows written.
    pub async fn backfill(&self, coordinates: Coordinates) -> Result<usize> {
        self.backfill_on(coordinates, Local::now().date_naive()).await
    }

    pub async fn backfill_on(&self, coordinates: Coordinates, today: NaiveDate) -> Result<usize> {
        let end = today
            .checked_sub_days(Days::new(self.routing.forecast_window_days.into()))
            .unwrap_or(NaiveDate::MIN);
        let start = end
            .checked_sub_months(Months::new(self.routing.history_years.saturating_mul(12)))
            .unwrap_or(NaiveDate::MIN);

        let series = self.archive.fetch_daily(coordinates, start, end).await?;
        let observations: Vec<_> = series
            .daily
            .complete_days()
            .map(|(date, max, min)| WeatherObservation::new(date, coordinates, max, min))
            .collect();

        let written = self.store.put_many(&observations)?;
        tracing::info!(%coordinates, %start, %end, written, "backfilled archive history");
        Ok(written)
    }
}

fn report(
    date: NaiveDate,
    coordinates: Coordinates,
    max_temperature: f64,
    min_temperature: f64,
    source: ReportSource,
) -> TemperatureReport {
    TemperatureReport { date, coordinates, max_temperature, min_temperature, source }
}
