//! Core library for the SkyWatcher weather dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Abstractions over the forecast and coordinate weather providers
//! - The one-shot geolocation capability
//! - The dashboard state shared by any front end (search flow, location flow,
//!   panel reconciliation)
//!
//! It is used by `skywatcher-cli`, but can also be reused by other front ends.

pub mod config;
pub mod dashboard;
pub mod geolocate;
pub mod model;
pub mod provider;

pub use config::{Config, LocationConfig, ProviderConfig};
pub use dashboard::{Dashboard, LocationPanel, SearchOutcome};
pub use geolocate::{GeolocateError, Geolocator, Position};
pub use model::{CityForecast, ForecastEntry, LocationWeatherView, SearchWeatherView};
pub use provider::{CoordinateProvider, ForecastProvider, ProviderId};
