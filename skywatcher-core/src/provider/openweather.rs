use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::model::LocationWeatherView;

use super::CoordinateProvider;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// OpenWeather client used for the location flow: current weather for a
/// latitude/longitude pair, metric units.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Point the client at a different host, e.g. a mock server in tests.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self { api_key, base_url, http: Client::new() }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[async_trait]
impl CoordinateProvider for OpenWeatherProvider {
    async fn current_at(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<LocationWeatherView> {
        let url = format!("{}/data/2.5/weather", self.base_url);

        tracing::debug!(latitude, longitude, "requesting OpenWeather current conditions");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await
            .context("Failed to send request to OpenWeather (current weather)")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read OpenWeather current response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather current request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).context("Failed to parse OpenWeather current JSON")?;

        let condition = parsed
            .weather
            .first()
            .map(|w| w.description.clone())
            .unwrap_or_else(|| "Unknown".to_string());

        Ok(LocationWeatherView {
            name: parsed.name,
            country: parsed.sys.country.unwrap_or_default(),
            temp_c: parsed.main.temp,
            humidity_pct: parsed.main.humidity,
            condition,
            wind_speed: parsed.wind.speed,
        })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX { format!("{}...", &body[..MAX]) } else { body.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn parses_current_response() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("appid", "test_key"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "Camden Town",
                "sys": {"country": "GB"},
                "main": {"temp": 14.3, "humidity": 77},
                "weather": [{"description": "overcast clouds"}],
                "wind": {"speed": 4.1}
            })))
            .mount(&server)
            .await;

        let provider = OpenWeatherProvider::with_base_url("test_key".into(), server.uri());
        let view = provider.current_at(51.54, -0.14).await.expect("fetch should succeed");

        assert_eq!(view.name, "Camden Town");
        assert_eq!(view.country, "GB");
        assert_eq!(view.temp_c, 14.3);
        assert_eq!(view.humidity_pct, 77);
        assert_eq!(view.condition, "overcast clouds");
        assert_eq!(view.wind_speed, 4.1);
    }

    #[tokio::test]
    async fn missing_weather_array_entry_defaults_condition() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "Camden Town",
                "sys": {},
                "main": {"temp": 14.3, "humidity": 77},
                "weather": [],
                "wind": {"speed": 4.1}
            })))
            .mount(&server)
            .await;

        let provider = OpenWeatherProvider::with_base_url("test_key".into(), server.uri());
        let view = provider.current_at(51.54, -0.14).await.expect("fetch should succeed");

        assert_eq!(view.condition, "Unknown");
        assert_eq!(view.country, "");
    }

    #[tokio::test]
    async fn unauthorized_surfaces_status_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "cod": 401, "message": "Invalid API key."
            })))
            .mount(&server)
            .await;

        let provider = OpenWeatherProvider::with_base_url("bad_key".into(), server.uri());
        let err = provider.current_at(51.54, -0.14).await.unwrap_err();

        assert!(err.to_string().contains("failed with status 401"));
    }
}
