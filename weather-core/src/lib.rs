//! Core library for the weather lookup app.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather repository and the HTTP capability it is built on
//! - Search modes and the dispatcher that maps form input to lookups
//! - Shared domain models (lookup results, field values)
//!
//! It is used by `weather-web`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod model;
pub mod repository;
pub mod search;

pub use client::{HttpClient, ReqwestHttpClient};
pub use config::{Config, ConfigError, OpenWeatherSettings};
pub use dispatch::{FormField, extract_parameters, get_weather_info, get_weather_info_by_name};
pub use model::{CityWeather, FieldValues, INTERNAL_ERROR, WeatherLookupResult};
pub use repository::{WeatherDataRepository, WeatherLookup};
pub use search::{FieldSpec, SearchMode, UnknownSearchMode};
