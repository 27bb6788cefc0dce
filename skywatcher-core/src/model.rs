use serde::{Deserialize, Serialize};

/// Provider-agnostic bundle returned by a forecast provider for one city.
///
/// This is the raw material the dashboard turns into a [`SearchWeatherView`]
/// and the hourly [`ForecastEntry`] list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityForecast {
    pub location: CityLocation,
    pub current: CurrentConditions,
    /// Today's sunrise, as the provider formats it (e.g. "06:12 AM").
    pub sunrise: String,
    /// Today's sunset, as the provider formats it.
    pub sunset: String,
    /// The 24 hourly samples for today, index 0 = midnight local time.
    pub hours: Vec<HourSample>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityLocation {
    pub name: String,
    pub region: String,
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp_c: f64,
    pub wind_kph: f64,
    pub humidity: u8,
    pub condition: String,
    /// Provider icon reference for the current condition.
    pub icon: String,
}

/// One hourly forecast sample as delivered by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourSample {
    /// Full provider timestamp, e.g. "2026-08-30 13:00".
    pub time: String,
    pub temp_c: f64,
}

/// Display-ready record for a searched city. Every field is a pre-formatted
/// string; the record is rebuilt from scratch on each successful search and
/// left untouched when a search fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchWeatherView {
    pub name: String,
    pub region: String,
    pub country: String,
    pub temp: String,
    pub wind: String,
    pub humidity: String,
    pub condition: String,
    pub icon: String,
    pub sunrise: String,
    pub sunset: String,
}

/// One entry of the six-hour forecast strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Hour label, "HH:MM".
    pub time: String,
    /// Temperature label, e.g. "15 °C".
    pub temp: String,
}

/// Normalized current weather for the user's own coordinates.
///
/// Unlike [`SearchWeatherView`] this keeps the provider's numeric values;
/// formatting is left to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationWeatherView {
    pub name: String,
    pub country: String,
    pub temp_c: f64,
    pub humidity_pct: u8,
    pub condition: String,
    pub wind_speed: f64,
}
