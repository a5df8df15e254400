use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use weather_core::{
    Config, FieldValues, WeatherDataRepository, WeatherLookupResult, get_weather_info_by_name,
};

use crate::{render::WeatherView, server};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-web", version, about = "Weather lookup web app")]
pub struct Cli {
    /// Defaults to `serve`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the web server.
    Serve {
        /// Address to listen on, e.g. "0.0.0.0:8080". Overrides the config file.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Store the OpenWeather API key in the config file.
    Configure,

    /// Run a single lookup and print the result.
    Lookup {
        /// Search mode: "city", "zip" or "coordinates".
        mode: String,

        /// Field values as name=value, e.g. city="Lake Saint Louis" state=MO.
        #[arg(value_parser = parse_field)]
        fields: Vec<(String, String)>,

        /// Print the raw result as JSON.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Serve { bind: None }) {
            Command::Serve { bind } => {
                let config = Config::load()?;
                let repo = WeatherDataRepository::with_reqwest(config.openweather_settings()?)?;
                let state = server::AppState::new(Arc::new(repo))?;
                let bind_addr = bind.unwrap_or(config.bind_addr);
                info!(%bind_addr, base_url = %config.base_url, "Configuration loaded");

                server::serve(&bind_addr, state).await
            }
            Command::Configure => {
                // Edit the file itself so environment overrides never get persisted.
                let path = Config::config_file_path()?;
                let mut config = Config::load_from(&path)?;

                let api_key = inquire::Password::new("OpenWeather API key:")
                    .without_confirmation()
                    .with_display_mode(inquire::PasswordDisplayMode::Masked)
                    .prompt()
                    .context("Failed to read API key")?;
                if api_key.trim().is_empty() {
                    bail!("API key must not be empty");
                }

                config.set_api_key(api_key);
                config.save_to(&path)?;
                println!("Saved OpenWeather API key to {}", path.display());
                Ok(())
            }
            Command::Lookup { mode, fields, json } => {
                let config = Config::load()?;
                let repo = WeatherDataRepository::with_reqwest(config.openweather_settings()?)?;
                let values: FieldValues = fields.into_iter().collect();

                let result = get_weather_info_by_name(&repo, &mode, Some(&values)).await;

                if json {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                    return Ok(());
                }
                match result {
                    WeatherLookupResult::CityWeather(weather) => {
                        print_weather(&WeatherView::from(&weather));
                        Ok(())
                    }
                    WeatherLookupResult::Error(message) => bail!(message),
                }
            }
        }
    }
}

fn print_weather(view: &WeatherView) {
    println!("{}", view.headline);
    println!("{}", view.coordinates);
    if !view.description.is_empty() {
        println!("{}", view.description);
    }
    println!("{}", view.temperature);
    println!("{}", view.feels_like);
    println!("{}", view.humidity);
    if let Some(observed_at) = &view.observed_at {
        println!("{observed_at}");
    }
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_lowercase(), value.to_string()))
        }
        _ => Err(format!("expected name=value, got '{raw}'")),
    }
}
