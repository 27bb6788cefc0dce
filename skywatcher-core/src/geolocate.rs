//! One-shot geolocation capability for the location flow.
//!
//! Modeled as an async operation with an explicit timeout and a classified
//! error type, so the dashboard never depends on how a position is actually
//! obtained. Ships with a fixed-coordinates source (config override) and an
//! IP-based lookup as the default.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, time::Duration};
use thiserror::Error;

use crate::config::Config;

/// Applied when the caller does not pick a timeout itself.
pub const DEFAULT_POSITION_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

/// Classified geolocation failures. The `Display` text is the user-facing
/// message shown in the location panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocateError {
    #[error("Geolocation is not supported on this system")]
    Unsupported,
    #[error("Location access denied by user")]
    PermissionDenied,
    #[error("Location information unavailable")]
    PositionUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("An unknown error occurred")]
    Unknown,
}

impl GeolocateError {
    /// Classify a numeric error code as reported by platform position
    /// sources (1 = permission denied, 2 = position unavailable,
    /// 3 = timeout). Anything else is `Unknown`.
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => GeolocateError::PermissionDenied,
            2 => GeolocateError::PositionUnavailable,
            3 => GeolocateError::Timeout,
            _ => GeolocateError::Unknown,
        }
    }
}

/// A one-shot position source.
#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    /// Resolve the current position, giving up after `timeout` elapses.
    async fn position(&self, timeout: Duration) -> Result<Position, GeolocateError>;
}

/// Position source backed by fixed coordinates from the config file.
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocator {
    position: Position,
}

impl FixedGeolocator {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { position: Position { latitude, longitude } }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn position(&self, _timeout: Duration) -> Result<Position, GeolocateError> {
        Ok(self.position)
    }
}

const IP_API_BASE_URL: &str = "http://ip-api.com";

/// Position source that geolocates the machine's public IP address.
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    base_url: String,
    http: Client,
}

impl IpGeolocator {
    pub fn new() -> Self {
        Self::with_base_url(IP_API_BASE_URL.to_string())
    }

    /// Point the client at a different host, e.g. a mock server in tests.
    pub fn with_base_url(base_url: String) -> Self {
        Self { base_url, http: Client::new() }
    }
}

impl Default for IpGeolocator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
}

#[async_trait]
impl Geolocator for IpGeolocator {
    async fn position(&self, timeout: Duration) -> Result<Position, GeolocateError> {
        let url = format!("{}/json", self.base_url);

        tracing::debug!("requesting IP-based position");

        let fut = async {
            let res = self
                .http
                .get(&url)
                .send()
                .await
                .map_err(|_| GeolocateError::PositionUnavailable)?;

            if !res.status().is_success() {
                return Err(GeolocateError::PositionUnavailable);
            }

            let parsed: IpApiResponse =
                res.json().await.map_err(|_| GeolocateError::Unknown)?;

            if parsed.status != "success" {
                return Err(GeolocateError::PositionUnavailable);
            }

            match (parsed.lat, parsed.lon) {
                (Some(latitude), Some(longitude)) => Ok(Position { latitude, longitude }),
                _ => Err(GeolocateError::Unknown),
            }
        };

        // The lookup service enforces no deadline of its own.
        match tokio::time::timeout(timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(GeolocateError::Timeout),
        }
    }
}

/// Pick a position source from config: fixed coordinates when the user has
/// pinned them, the IP lookup otherwise.
pub fn geolocator_from_config(config: &Config) -> Box<dyn Geolocator> {
    match config.location {
        Some(loc) => Box::new(FixedGeolocator::new(loc.latitude, loc.longitude)),
        None => Box::new(IpGeolocator::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocationConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn error_codes_map_to_distinct_messages() {
        assert_eq!(
            GeolocateError::from_code(1).to_string(),
            "Location access denied by user"
        );
        assert_eq!(
            GeolocateError::from_code(2).to_string(),
            "Location information unavailable"
        );
        assert_eq!(GeolocateError::from_code(3).to_string(), "Location request timed out");
        assert_eq!(GeolocateError::from_code(42).to_string(), "An unknown error occurred");
    }

    #[tokio::test]
    async fn fixed_geolocator_returns_configured_position() {
        let locator = FixedGeolocator::new(51.5, -0.12);
        let pos = locator.position(DEFAULT_POSITION_TIMEOUT).await.expect("fixed never fails");

        assert_eq!(pos, Position { latitude: 51.5, longitude: -0.12 });
    }

    #[tokio::test]
    async fn ip_geolocator_parses_success_response() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success", "lat": 48.85, "lon": 2.35
            })))
            .mount(&server)
            .await;

        let locator = IpGeolocator::with_base_url(server.uri());
        let pos = locator.position(DEFAULT_POSITION_TIMEOUT).await.expect("lookup should succeed");

        assert_eq!(pos.latitude, 48.85);
        assert_eq!(pos.longitude, 2.35);
    }

    #[tokio::test]
    async fn ip_geolocator_maps_failure_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "fail", "message": "private range"
            })))
            .mount(&server)
            .await;

        let locator = IpGeolocator::with_base_url(server.uri());
        let err = locator.position(DEFAULT_POSITION_TIMEOUT).await.unwrap_err();

        assert_eq!(err, GeolocateError::PositionUnavailable);
    }

    #[tokio::test]
    async fn slow_lookup_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({
                        "status": "success", "lat": 48.85, "lon": 2.35
                    }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let locator = IpGeolocator::with_base_url(server.uri());
        let err = locator.position(Duration::from_millis(20)).await.unwrap_err();

        assert_eq!(err, GeolocateError::Timeout);
    }

    #[test]
    fn config_override_selects_fixed_source() {
        let mut cfg = Config::default();
        cfg.location = Some(LocationConfig { latitude: 1.0, longitude: 2.0 });

        // Just check it builds a source; behaviour is covered above.
        let _ = geolocator_from_config(&cfg);
        let _ = geolocator_from_config(&Config::default());
    }
}
