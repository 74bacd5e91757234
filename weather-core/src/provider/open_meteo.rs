use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;

use crate::{
    error::{ApiFailure, Result, WeatherError},
    model::{Coordinates, WeatherSeries},
};

use super::{SourceId, TemperatureSource};

const DAILY_METRICS: &str = "temperature_2m_max,temperature_2m_min";

/// Open-Meteo archive or forecast endpoint; both share one query shape.
#[derive(Debug, Clone)]
pub struct OpenMeteoSource {
    id: SourceId,
    base_url: String,
    http: Client,
}

impl OpenMeteoSource {
    pub fn new(id: SourceId, base_url: impl Into<String>) -> Self {
        Self { id, base_url: base_url.into(), http: Client::new() }
    }

    fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.id.as_str())
    }
}

#[async_trait]
impl TemperatureSource for OpenMeteoSource {
    fn id(&self) -> SourceId {
        self.id
    }

    async fn fetch_daily(
        &self,
        coordinates: Coordinates,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<WeatherSeries> {
        let source = self.id.as_str();
        let url = self.endpoint();
        tracing::info!(%source, %coordinates, %start, %end, "fetching daily temperatures");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("latitude", coordinates.latitude.to_string()),
                ("longitude", coordinates.longitude.to_string()),
                ("start_date", start.format("%Y-%m-%d").to_string()),
                ("end_date", end.format("%Y-%m-%d").to_string()),
                ("daily", DAILY_METRICS.to_string()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(WeatherError::api(
                source,
                ApiFailure::Status { status: status.as_u16(), body: truncate_body(&body) },
            ));
        }

        let parsed: WeatherSeries = serde_json::from_str(&body)
            .map_err(|e| WeatherError::api(source, ApiFailure::Malformed(e.to_string())))?;

        if !parsed.daily.is_consistent() {
            return Err(WeatherError::api(
                source,
                ApiFailure::Malformed("daily arrays differ in length".to_string()),
            ));
        }

        if parsed.daily.temperature_2m_max.is_empty() || parsed.daily.temperature_2m_min.is_empty() {
            return Err(WeatherError::api(source, ApiFailure::EmptyData { date: start }));
        }

        tracing::debug!(%source, days = parsed.daily.time.len(), "received daily series");
        Ok(parsed)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 6, 1).unwrap()
    }

    fn body(max: &str, min: &str) -> String {
        format!(
            r#"{{"latitude":52.52,"longitude":13.42,"timezone":"GMT","elevation":38.0,
                "daily":{{"time":["2020-06-01"],"temperature_2m_max":{max},"temperature_2m_min":{min}}}}}"#
        )
    }

    #[tokio::test]
    async fn sends_single_day_query_to_archive_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/archive"))
            .and(query_param("latitude", "52.52"))
            .and(query_param("longitude", "13.41"))
            .and(query_param("start_date", "2020-06-01"))
            .and(query_param("end_date", "2020-06-01"))
            .and(query_param("daily", DAILY_METRICS))
            .respond_with(ResponseTemplate::new(200).set_body_string(body("[24.1]", "[12.3]")))
            .expect(1)
            .mount(&server)
            .await;

        let source = OpenMeteoSource::new(SourceId::Archive, format!("{}/v1/", server.uri()));
        let series = source
            .fetch_daily(Coordinates::new(52.52, 13.41), day(), day())
            .await
            .expect("fetch should succeed");

        assert_eq!(series.daily.first_day(), Some((24.1, 12.3)));
    }

    #[tokio::test]
    async fn forecast_uses_forecast_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body("[1.0]", "[0.5]")))
            .expect(1)
            .mount(&server)
            .await;

        let source = OpenMeteoSource::new(SourceId::Forecast, format!("{}/v1", server.uri()));
        assert!(source.fetch_daily(Coordinates::new(0.0, 0.0), day(), day()).await.is_ok());
    }

    #[tokio::test]
    async fn non_success_status_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_string("{\"reason\":\"bad range\"}"))
            .mount(&server)
            .await;

        let source = OpenMeteoSource::new(SourceId::Archive, server.uri());
        let err = source.fetch_daily(Coordinates::new(0.0, 0.0), day(), day()).await.unwrap_err();

        match err {
            WeatherError::Api { failure: ApiFailure::Status { status, body }, .. } => {
                assert_eq!(status, 400);
                assert!(body.contains("bad range"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_arrays_are_api_error() {
        let server = MockServer::start().await;
        let empty = r#"{"latitude":0,"longitude":0,"daily":{"time":[],"temperature_2m_max":[],"temperature_2m_min":[]}}"#;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(empty))
            .mount(&server)
            .await;

        let source = OpenMeteoSource::new(SourceId::Forecast, server.uri());
        let err = source.fetch_daily(Coordinates::new(0.0, 0.0), day(), day()).await.unwrap_err();
        assert!(matches!(err, WeatherError::Api { failure: ApiFailure::EmptyData { .. }, .. }));
    }

    #[tokio::test]
    async fn mismatched_lengths_are_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body("[1.0, 2.0]", "[0.5]")))
            .mount(&server)
            .await;

        let source = OpenMeteoSource::new(SourceId::Archive, server.uri());
        let err = source.fetch_daily(Coordinates::new(0.0, 0.0), day(), day()).await.unwrap_err();
        assert!(matches!(err, WeatherError::Api { failure: ApiFailure::Malformed(_), .. }));
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let source = OpenMeteoSource::new(SourceId::Archive, "http://127.0.0.1:1/v1");
        let err = source.fetch_daily(Coordinates::new(0.0, 0.0), day(), day()).await.unwrap_err();
        assert!(matches!(err, WeatherError::Network(_)));
    }

    #[test]
    fn truncate_body_limits_length() {
        let long = "x".repeat(500);
        let t = truncate_body(&long);
        assert_eq!(t.len(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
