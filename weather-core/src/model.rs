use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message shown for every failure that is not reported by the provider itself.
pub const INTERNAL_ERROR: &str = "Internal error";

const ICON_URL_BASE: &str = "http://openweathermap.org/img/wn";

/// Temperature readings are in Fahrenheit, humidity in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherMetrics {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub main: String,
    #[serde(default)]
    pub description: String,
    /// Provider glyph code, e.g. `04d`.
    pub icon: String,
}

/// Current conditions for a city, built only from a successful provider response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityWeather {
    pub city: String,
    pub country_code: String,
    pub weather_metrics: WeatherMetrics,
    pub coordinates: Coordinates,
    pub weather: WeatherCondition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<DateTime<Utc>>,
}

impl CityWeather {
    pub fn icon_url(&self) -> String {
        format!("{ICON_URL_BASE}/{}@2x.png", self.weather.icon)
    }
}

/// Outcome of any lookup: either the conditions or a message for the user.
///
/// Serializes as `{"cityWeather": {...}}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WeatherLookupResult {
    CityWeather(CityWeather),
    Error(String),
}

impl WeatherLookupResult {
    pub fn internal_error() -> Self {
        WeatherLookupResult::Error(INTERNAL_ERROR.to_string())
    }

    pub fn city_weather(&self) -> Option<&CityWeather> {
        match self {
            WeatherLookupResult::CityWeather(weather) => Some(weather),
            WeatherLookupResult::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            WeatherLookupResult::CityWeather(_) => None,
            WeatherLookupResult::Error(message) => Some(message),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, WeatherLookupResult::CityWeather(_))
    }
}

/// Raw form input keyed by lowercase field name.
///
/// A blank value is stored as "not supplied".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValues(BTreeMap<String, Option<String>>);

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: Option<String>) {
        let value = value.filter(|v| !v.trim().is_empty());
        self.0.insert(name.trim().to_lowercase(), value);
    }

    /// The supplied value for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|v| v.as_deref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for FieldValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = FieldValues::new();
        for (name, value) in iter {
            values.insert(name.as_ref(), Some(value.into()));
        }
        values
    }
}
