use std::{fmt::Debug, sync::Arc};

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::{
    client::{HttpClient, ReqwestHttpClient},
    config::OpenWeatherSettings,
    model::{CityWeather, Coordinates, WeatherCondition, WeatherLookupResult, WeatherMetrics},
};

pub const DEFAULT_COUNTRY_CODE: &str = "US";

const WEATHER_PATH: &str = "/data/2.5/weather";
const UNITS: &str = "imperial";

/// The three lookups every search mode resolves to.
///
/// Implementations never fail: every problem is folded into
/// [`WeatherLookupResult::Error`].
#[async_trait]
pub trait WeatherLookup: Send + Sync + Debug {
    /// A missing country code means `US`.
    async fn get_by_city_name(
        &self,
        city_name: &str,
        state_code: Option<&str>,
        country_code: Option<&str>,
    ) -> WeatherLookupResult;

    async fn get_by_zip(&self, zip: &str, country_code: Option<&str>) -> WeatherLookupResult;

    async fn get_by_coordinates(&self, lat: f64, lon: f64) -> WeatherLookupResult;
}

/// Current-weather lookups against OpenWeather.
#[derive(Debug, Clone)]
pub struct WeatherDataRepository {
    settings: OpenWeatherSettings,
    client: Arc<dyn HttpClient>,
}

impl WeatherDataRepository {
    pub fn new(settings: OpenWeatherSettings, client: Arc<dyn HttpClient>) -> Self {
        Self { settings, client }
    }

    /// Repository backed by a real HTTP client bounded by the configured timeout.
    pub fn with_reqwest(settings: OpenWeatherSettings) -> Result<Self> {
        let client = ReqwestHttpClient::new(settings.timeout)?;
        Ok(Self::new(settings, Arc::new(client)))
    }

    fn request_url(&self, query: &[(&str, String)]) -> Result<Url> {
        let endpoint = format!("{}{}", self.settings.base_url.trim_end_matches('/'), WEATHER_PATH);

        let params = query
            .iter()
            .map(|(name, value)| (*name, value.as_str()))
            .chain([("appid", self.settings.api_key.as_str()), ("units", UNITS)]);

        Url::parse_with_params(&endpoint, params)
            .with_context(|| format!("Invalid OpenWeather endpoint: {endpoint}"))
    }

    async fn fetch(&self, query: &[(&str, String)]) -> WeatherLookupResult {
        match self.try_fetch(query).await {
            Ok(result) => result,
            Err(err) => {
                error!(error = ?err, "Weather lookup failed");
                WeatherLookupResult::internal_error()
            }
        }
    }

    async fn try_fetch(&self, query: &[(&str, String)]) -> Result<WeatherLookupResult> {
        let url = self.request_url(query)?;
        let body = self.client.get(url.as_str()).await?;
        normalize(body)
    }
}

#[async_trait]
impl WeatherLookup for WeatherDataRepository {
    async fn get_by_city_name(
        &self,
        city_name: &str,
        state_code: Option<&str>,
        country_code: Option<&str>,
    ) -> WeatherLookupResult {
        let q = city_query(city_name, state_code, country_code);
        debug!(%q, "Looking up weather by city name");
        self.fetch(&[("q", q)]).await
    }

    async fn get_by_zip(&self, zip: &str, country_code: Option<&str>) -> WeatherLookupResult {
        let zip = zip_query(zip, country_code);
        debug!(%zip, "Looking up weather by zip code");
        self.fetch(&[("zip", zip)]).await
    }

    async fn get_by_coordinates(&self, lat: f64, lon: f64) -> WeatherLookupResult {
        debug!(lat, lon, "Looking up weather by coordinates");
        self.fetch(&[("lat", lat.to_string()), ("lon", lon.to_string())]).await
    }
}

/// `{city},{state},{country}` with an absent state kept as an empty segment.
pub fn city_query(city_name: &str, state_code: Option<&str>, country_code: Option<&str>) -> String {
    format!(
        "{city_name},{},{}",
        state_code.unwrap_or_default(),
        country_code.unwrap_or(DEFAULT_COUNTRY_CODE),
    )
}

pub fn zip_query(zip: &str, country_code: Option<&str>) -> String {
    format!("{zip},{}", country_code.unwrap_or(DEFAULT_COUNTRY_CODE))
}

/// Turn a provider payload into the uniform result.
///
/// `Err` means the payload was not shaped like any OpenWeather answer.
fn normalize(body: Value) -> Result<WeatherLookupResult> {
    let status = OwStatus::deserialize(&body).context("OpenWeather response has no status code")?;

    if status.cod.as_code()? == 200 {
        let parsed = OwCurrentResponse::deserialize(body)
            .context("Failed to parse OpenWeather current weather JSON")?;
        return Ok(WeatherLookupResult::CityWeather(parsed.try_into()?));
    }

    let message = status.message.ok_or_else(|| {
        anyhow!("OpenWeather reported status {:?} without a message", status.cod)
    })?;

    Ok(WeatherLookupResult::Error(message))
}

/// OpenWeather sends `cod` as a number on success and as a string on failure.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OwCode {
    Number(i64),
    Text(String),
}

impl OwCode {
    fn as_code(&self) -> Result<i64> {
        match self {
            OwCode::Number(code) => Ok(*code),
            OwCode::Text(text) => text
                .trim()
                .parse()
                .with_context(|| format!("OpenWeather status code is not numeric: {text:?}")),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwStatus {
    cod: OwCode,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: f64,
    temp_min: Option<f64>,
    temp_max: Option<f64>,
    pressure: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: Option<i64>,
    main: Option<String>,
    description: Option<String>,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: Option<i64>,
    sys: OwSys,
    main: OwMain,
    coord: OwCoord,
    weather: Vec<OwWeather>,
}

impl TryFrom<OwCurrentResponse> for CityWeather {
    type Error = anyhow::Error;

    fn try_from(parsed: OwCurrentResponse) -> Result<Self> {
        let condition = parsed
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("OpenWeather response contained no weather conditions"))?;

        Ok(CityWeather {
            city: parsed.name,
            country_code: parsed.sys.country,
            weather_metrics: WeatherMetrics {
                temp: parsed.main.temp,
                feels_like: parsed.main.feels_like,
                humidity: parsed.main.humidity,
                temp_min: parsed.main.temp_min,
                temp_max: parsed.main.temp_max,
                pressure: parsed.main.pressure,
            },
            coordinates: Coordinates { lat: parsed.coord.lat, lon: parsed.coord.lon },
            weather: WeatherCondition {
                id: condition.id,
                main: condition.main.unwrap_or_default(),
                description: condition.description.unwrap_or_default(),
                icon: condition.icon,
            },
            observed_at: parsed.dt.and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
        })
    }
}
