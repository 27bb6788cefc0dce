use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use skywatcher_core::{
    Config, Dashboard, ProviderId,
    geolocate::geolocator_from_config,
    provider::{coordinate_provider_from_config, forecast_provider_from_config},
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skywatcher", version, about = "SkyWatcher weather dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name, e.g. "openweather" or "weatherapi".
        provider: String,
    },

    /// Search weather by city name.
    Search {
        /// City name, e.g. "London".
        city: String,
    },

    /// Show current weather for this machine's location.
    Locate,

    /// Location weather plus an optional city search, in one run.
    Dashboard {
        /// Optional city to search after the location refresh.
        city: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Search { city } => {
                let mut dash = build_dashboard()?;
                run_search(&mut dash, city).await;
                Ok(())
            }
            Command::Locate => {
                let mut dash = build_dashboard()?;
                dash.refresh_location_weather().await;
                render::location_panel(&dash);
                Ok(())
            }
            Command::Dashboard { city } => {
                let mut dash = build_dashboard()?;

                // The location flow runs automatically on startup.
                dash.refresh_location_weather().await;
                render::location_panel(&dash);

                if let Some(city) = city {
                    println!();
                    run_search(&mut dash, city).await;
                }

                Ok(())
            }
        }
    }
}

async fn run_search(dash: &mut Dashboard, city: String) {
    dash.set_city(city);
    let outcome = dash.search().await;

    if let Some(notice) = outcome.notice() {
        println!("{notice}");
        return;
    }

    if dash.take_reveal() {
        render::search_results(dash);
    }
}

fn build_dashboard() -> Result<Dashboard> {
    let config = Config::load()?;
    tracing::debug!(path = %Config::config_file_path()?.display(), "configuration loaded");

    let forecast = forecast_provider_from_config(&config)?;
    let coordinates = coordinate_provider_from_config(&config)?;
    let geolocator = geolocator_from_config(&config);

    Ok(Dashboard::new(forecast, coordinates, geolocator))
}

fn configure(provider: &str) -> Result<()> {
    let id = ProviderId::try_from(provider)?;

    let mut config = Config::load()?;

    let api_key = inquire::Password::new(&format!("API key for {id}:"))
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.upsert_provider_api_key(id, api_key);
    config.save()?;

    println!("Saved API key for '{id}' to {}", Config::config_file_path()?.display());

    Ok(())
}
