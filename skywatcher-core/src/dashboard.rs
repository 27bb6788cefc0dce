//! Dashboard state: the two fetch/normalize flows behind the render surface.
//!
//! The search flow and the location flow own disjoint state slices and never
//! write into each other. Either flow may have a request in flight while the
//! other does; within the search flow, overlapping requests are resolved by a
//! sequence number so only the most recently issued request may publish its
//! result.

use anyhow::{Result, anyhow};
use chrono::{Local, Timelike};
use std::time::Duration;

use crate::geolocate::{DEFAULT_POSITION_TIMEOUT, Geolocator};
use crate::model::{
    CityForecast, ForecastEntry, HourSample, LocationWeatherView, SearchWeatherView,
};
use crate::provider::{CoordinateProvider, ForecastProvider};

/// Number of entries in the hourly forecast strip.
pub const FORECAST_LEN: usize = 6;

/// Shown in the location panel when the coordinate fetch itself fails.
pub const LOCATION_FETCH_ERROR: &str = "Failed to fetch weather data";

/// What a search attempt did to the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// View and forecast were replaced; the results panel should be revealed.
    Updated,
    /// Input was empty after trimming; nothing was issued.
    EmptyInput,
    /// The fetch failed or the response was unusable; prior results kept.
    InvalidCity,
    /// The response belonged to a superseded request and was discarded.
    Superseded,
}

impl SearchOutcome {
    /// User-facing notice for this outcome, if any.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            SearchOutcome::EmptyInput => Some("Please enter a city name"),
            SearchOutcome::InvalidCity => Some("Please enter a valid city name"),
            SearchOutcome::Updated | SearchOutcome::Superseded => None,
        }
    }
}

/// Handle for one issued search request. Returned by [`Dashboard::begin_search`]
/// and redeemed by [`Dashboard::apply_search`]; a ticket whose request has been
/// superseded in the meantime loses the right to publish.
#[derive(Debug)]
pub struct SearchTicket {
    seq: u64,
    city: String,
}

impl SearchTicket {
    pub fn city(&self) -> &str {
        &self.city
    }
}

/// Which of the mutually exclusive location panel states to render.
/// Priority: busy, then error, then data.
#[derive(Debug, PartialEq)]
pub enum LocationPanel<'a> {
    Loading,
    Error(&'a str),
    Data(&'a LocationWeatherView),
    Empty,
}

pub struct Dashboard {
    forecast_provider: Box<dyn ForecastProvider>,
    coordinate_provider: Box<dyn CoordinateProvider>,
    geolocator: Box<dyn Geolocator>,
    position_timeout: Duration,

    /// Hour-of-day captured once at construction; forecast entries index the
    /// provider's hourly array relative to this, not to the search time.
    mount_hour: u32,

    city: String,
    searching: bool,
    available: bool,
    issued_searches: u64,
    weather: Option<SearchWeatherView>,
    forecast: Vec<ForecastEntry>,
    reveal_pending: bool,

    locating: bool,
    location_error: Option<String>,
    location_weather: Option<LocationWeatherView>,
}

impl Dashboard {
    pub fn new(
        forecast_provider: Box<dyn ForecastProvider>,
        coordinate_provider: Box<dyn CoordinateProvider>,
        geolocator: Box<dyn Geolocator>,
    ) -> Self {
        Self {
            forecast_provider,
            coordinate_provider,
            geolocator,
            position_timeout: DEFAULT_POSITION_TIMEOUT,
            mount_hour: Local::now().hour(),
            city: String::new(),
            searching: false,
            available: false,
            issued_searches: 0,
            weather: None,
            forecast: Vec::new(),
            reveal_pending: false,
            locating: false,
            location_error: None,
            location_weather: None,
        }
    }

    /// Override the captured mount hour (0..24).
    pub fn with_mount_hour(mut self, hour: u32) -> Self {
        self.mount_hour = hour % 24;
        self
    }

    pub fn with_position_timeout(mut self, timeout: Duration) -> Self {
        self.position_timeout = timeout;
        self
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn set_city(&mut self, city: impl Into<String>) {
        self.city = city.into();
    }

    pub fn searching(&self) -> bool {
        self.searching
    }

    /// True once at least one search has succeeded; never reset.
    pub fn available(&self) -> bool {
        self.available
    }

    pub fn weather(&self) -> Option<&SearchWeatherView> {
        self.weather.as_ref()
    }

    pub fn forecast(&self) -> &[ForecastEntry] {
        &self.forecast
    }

    pub fn locating(&self) -> bool {
        self.locating
    }

    pub fn location_error(&self) -> Option<&str> {
        self.location_error.as_deref()
    }

    pub fn location_weather(&self) -> Option<&LocationWeatherView> {
        self.location_weather.as_ref()
    }

    /// Consume the reveal signal raised by the last successful search.
    /// Returns true at most once per success.
    pub fn take_reveal(&mut self) -> bool {
        std::mem::take(&mut self.reveal_pending)
    }

    /// Issue a search for the current input. Returns `None` without touching
    /// any state (and without any network traffic) when the input is empty
    /// after trimming.
    pub fn begin_search(&mut self) -> Option<SearchTicket> {
        if self.city.trim().is_empty() {
            return None;
        }

        self.searching = true;
        self.issued_searches += 1;

        Some(SearchTicket { seq: self.issued_searches, city: self.city.clone() })
    }

    /// Publish the completion of an issued search. A ticket that is no longer
    /// the latest issued request is discarded wholesale: no field changes, the
    /// busy flag stays owned by the still-pending request.
    pub fn apply_search(
        &mut self,
        ticket: SearchTicket,
        result: Result<CityForecast>,
    ) -> SearchOutcome {
        if ticket.seq != self.issued_searches {
            return SearchOutcome::Superseded;
        }

        self.searching = false;
        self.city.clear();

        let data = match result {
            Ok(data) => data,
            Err(err) => {
                tracing::debug!(error = %err, "search fetch failed");
                return SearchOutcome::InvalidCity;
            }
        };

        let entries = match forecast_entries(self.mount_hour, &data.hours) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::debug!(error = %err, "search response unusable");
                return SearchOutcome::InvalidCity;
            }
        };

        // View and strip are replaced together or not at all.
        self.weather = Some(search_view(&data));
        self.forecast = entries;
        self.available = true;
        self.reveal_pending = true;

        SearchOutcome::Updated
    }

    /// One-call search: issue, await, publish.
    pub async fn search(&mut self) -> SearchOutcome {
        let Some(ticket) = self.begin_search() else {
            return SearchOutcome::EmptyInput;
        };

        let result = self.forecast_provider.city_forecast(ticket.city()).await;
        self.apply_search(ticket, result)
    }

    /// Resolve the current position and fetch weather for it. On any failure
    /// the previously fetched view is left in place; only the error message
    /// changes.
    pub async fn refresh_location_weather(&mut self) {
        self.locating = true;
        self.location_error = None;

        match self.geolocator.position(self.position_timeout).await {
            Ok(pos) => {
                match self.coordinate_provider.current_at(pos.latitude, pos.longitude).await {
                    Ok(view) => {
                        self.location_weather = Some(view);
                        self.location_error = None;
                    }
                    Err(err) => {
                        tracing::debug!(error = %err, "coordinate fetch failed");
                        self.location_error = Some(LOCATION_FETCH_ERROR.to_string());
                    }
                }
            }
            Err(err) => {
                self.location_error = Some(err.to_string());
            }
        }

        self.locating = false;
    }

    /// Select the location panel to render: busy, then error, then data.
    pub fn location_panel(&self) -> LocationPanel<'_> {
        if self.locating {
            LocationPanel::Loading
        } else if let Some(message) = &self.location_error {
            LocationPanel::Error(message)
        } else if let Some(view) = &self.location_weather {
            LocationPanel::Data(view)
        } else {
            LocationPanel::Empty
        }
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("mount_hour", &self.mount_hour)
            .field("city", &self.city)
            .field("searching", &self.searching)
            .field("available", &self.available)
            .field("locating", &self.locating)
            .field("location_error", &self.location_error)
            .finish_non_exhaustive()
    }
}

fn search_view(data: &CityForecast) -> SearchWeatherView {
    SearchWeatherView {
        name: format!("{} ,", data.location.name),
        region: format!("{} ,", data.location.region),
        country: data.location.country.clone(),
        temp: format!("{} °C", data.current.temp_c),
        wind: format!("{} km/hr", data.current.wind_kph),
        humidity: format!("{} %", data.current.humidity),
        condition: format!("Condition: {}", data.current.condition),
        icon: data.current.icon.clone(),
        sunrise: format!("Sunrise: {}", data.sunrise),
        sunset: format!("Sunset: {}", data.sunset),
    }
}

/// Build the six-entry strip from the provider's hourly array, starting one
/// hour after the mount hour and wrapping past midnight.
fn forecast_entries(mount_hour: u32, hours: &[HourSample]) -> Result<Vec<ForecastEntry>> {
    (1..=FORECAST_LEN)
        .map(|i| {
            let idx = (mount_hour as usize + i) % 24;
            let sample = hours
                .get(idx)
                .ok_or_else(|| anyhow!("hourly forecast has no sample for hour {idx}"))?;

            Ok(ForecastEntry {
                time: hour_label(&sample.time),
                temp: format!("{} °C", sample.temp_c),
            })
        })
        .collect()
}

/// "2026-08-30 13:00" -> "13:00"; anything shorter is shown as-is.
fn hour_label(time: &str) -> String {
    time.get(11..16).map(str::to_string).unwrap_or_else(|| time.to_string())
}
