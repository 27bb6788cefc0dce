use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::model::{CityForecast, CityLocation, CurrentConditions, HourSample};

use super::ForecastProvider;

const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com";

/// WeatherAPI.com client used for the search flow: one `forecast.json` call
/// yields current conditions, astro times and the 24 hourly samples.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Point the client at a different host, e.g. a mock server in tests.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self { api_key, base_url, http: Client::new() }
    }

    async fn fetch_forecast(&self, city: &str) -> Result<WaForecastResponse> {
        let url = format!("{}/v1/forecast.json", self.base_url);

        tracing::debug!(city, "requesting WeatherAPI forecast");

        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("q", city)])
            .send()
            .await
            .context("Failed to send request to WeatherAPI.com (forecast)")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read WeatherAPI forecast response body")?;

        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "WeatherAPI forecast request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body).context("Failed to parse WeatherAPI forecast JSON")
    }
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    region: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    wind_kph: f64,
    humidity: u8,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaAstro {
    sunrise: String,
    sunset: String,
}

#[derive(Debug, Deserialize)]
struct WaForecastHour {
    time: String,
    temp_c: f64,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    astro: WaAstro,
    hour: Vec<WaForecastHour>,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    location: WaLocation,
    current: WaCurrent,
    forecast: WaForecast,
}

#[async_trait]
impl ForecastProvider for WeatherApiProvider {
    async fn city_forecast(&self, city: &str) -> Result<CityForecast> {
        let parsed = self.fetch_forecast(city).await?;

        let today = parsed
            .forecast
            .forecastday
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("WeatherAPI response contained no forecastday data"))?;

        Ok(CityForecast {
            location: CityLocation {
                name: parsed.location.name,
                region: parsed.location.region,
                country: parsed.location.country,
            },
            current: CurrentConditions {
                temp_c: parsed.current.temp_c,
                wind_kph: parsed.current.wind_kph,
                humidity: parsed.current.humidity,
                condition: parsed.current.condition.text,
                icon: parsed.current.condition.icon,
            },
            sunrise: today.astro.sunrise,
            sunset: today.astro.sunset,
            hours: today
                .hour
                .into_iter()
                .map(|h| HourSample { time: h.time, temp_c: h.temp_c })
                .collect(),
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

    fn forecast_body() -> serde_json::Value {
        let hours: Vec<serde_json::Value> = (0..24)
            .map(|h| {
                serde_json::json!({
                    "time": format!("2026-08-30 {h:02}:00"),
                    "temp_c": 10.0 + h as f64,
                })
            })
            .collect();

        serde_json::json!({
            "location": {"name": "London", "region": "City of London, Greater London", "country": "United Kingdom"},
            "current": {
                "temp_c": 15.0,
                "wind_kph": 6.8,
                "humidity": 72,
                "condition": {"text": "Cloudy", "icon": "//cdn.weatherapi.com/119.png"}
            },
            "forecast": {
                "forecastday": [{
                    "astro": {"sunrise": "06:12 AM", "sunset": "07:48 PM"},
                    "hour": hours
                }]
            }
        })
    }

    #[tokio::test]
    async fn parses_forecast_response() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast.json"))
            .and(query_param("key", "test_key"))
            .and(query_param("q", "London"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .mount(&server)
            .await;

        let provider = WeatherApiProvider::with_base_url("test_key".into(), server.uri());
        let forecast = provider.city_forecast("London").await.expect("fetch should succeed");

        assert_eq!(forecast.location.name, "London");
        assert_eq!(forecast.current.temp_c, 15.0);
        assert_eq!(forecast.current.condition, "Cloudy");
        assert_eq!(forecast.sunrise, "06:12 AM");
        assert_eq!(forecast.hours.len(), 24);
        assert_eq!(forecast.hours[13].time, "2026-08-30 13:00");
        assert_eq!(forecast.hours[13].temp_c, 23.0);
    }

    #[tokio::test]
    async fn unknown_city_surfaces_status_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast.json"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"code": 1006, "message": "No matching location found."}
            })))
            .mount(&server)
            .await;

        let provider = WeatherApiProvider::with_base_url("test_key".into(), server.uri());
        let err = provider.city_forecast("Nowhereville").await.unwrap_err();

        assert!(err.to_string().contains("failed with status 400"));
    }

    #[tokio::test]
    async fn missing_forecastday_is_an_error() {
        let server = MockServer::start().await;

        let mut body = forecast_body();
        body["forecast"]["forecastday"] = serde_json::json!([]);

        Mock::given(method("GET"))
            .and(path("/v1/forecast.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let provider = WeatherApiProvider::with_base_url("test_key".into(), server.uri());
        let err = provider.city_forecast("London").await.unwrap_err();

        assert!(err.to_string().contains("no forecastday data"));
    }
}
