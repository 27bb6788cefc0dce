use crate::{
    Config,
    model::{CityForecast, LocationWeatherView},
    provider::{openweather::OpenWeatherProvider, weatherapi::WeatherApiProvider},
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug};

pub mod openweather;
pub mod weatherapi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenWeather,
    WeatherApi,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::WeatherApi => "weatherapi",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::WeatherApi]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweather" => Ok(ProviderId::OpenWeather),
            "weatherapi" => Ok(ProviderId::WeatherApi),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: openweather, weatherapi."
            )),
        }
    }
}

/// City-keyed current conditions plus today's hourly forecast.
/// Backs the search flow of the dashboard.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn city_forecast(&self, city: &str) -> anyhow::Result<CityForecast>;
}

/// Current weather for a latitude/longitude pair.
/// Backs the location flow of the dashboard.
#[async_trait]
pub trait CoordinateProvider: Send + Sync + Debug {
    async fn current_at(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> anyhow::Result<LocationWeatherView>;
}

fn require_api_key(id: ProviderId, config: &Config) -> anyhow::Result<String> {
    let api_key = config.provider_api_key(id).ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for provider '{id}'.\n\
                 Hint: run `skywatcher configure {id}` and enter your API key."
        )
    })?;

    Ok(api_key.to_owned())
}

/// Construct the search-flow provider from config.
pub fn forecast_provider_from_config(config: &Config) -> anyhow::Result<Box<dyn ForecastProvider>> {
    let api_key = require_api_key(ProviderId::WeatherApi, config)?;
    Ok(Box::new(WeatherApiProvider::new(api_key)))
}

/// Construct the location-flow provider from config.
pub fn coordinate_provider_from_config(
    config: &Config,
) -> anyhow::Result<Box<dyn CoordinateProvider>> {
    let api_key = require_api_key(ProviderId::OpenWeather, config)?;
    Ok(Box::new(OpenWeatherProvider::new(api_key)))
}
