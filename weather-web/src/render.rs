//! HTML rendering of a [`Page`] with embedded Tera templates.

use std::sync::Arc;

use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;
use weather_core::{CityWeather, SearchMode};

use crate::page::{Page, PageState};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template compilation failed: {0}")]
    Compile(String),

    #[error("Template rendering failed: {0}")]
    Render(String),
}

/// Display strings for a successful lookup, shared by the web page and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherView {
    pub headline: String,
    pub coordinates: String,
    pub icon_url: String,
    pub description: String,
    pub temperature: String,
    pub feels_like: String,
    pub humidity: String,
    pub observed_at: Option<String>,
}

impl From<&CityWeather> for WeatherView {
    fn from(weather: &CityWeather) -> Self {
        let metrics = &weather.weather_metrics;
        Self {
            headline: format!("{}, {}", weather.city, weather.country_code),
            coordinates: format!(
                "Lat: {}, Lon: {}",
                weather.coordinates.lat, weather.coordinates.lon
            ),
            icon_url: weather.icon_url(),
            description: weather.weather.description.clone(),
            temperature: format!("Temperature: {:.1} °F", metrics.temp),
            feels_like: format!("Feels like: {:.1} °F", metrics.feels_like),
            humidity: format!("Humidity: {:.0}%", metrics.humidity),
            observed_at: weather
                .observed_at
                .map(|at| format!("Observed at {}", at.format("%Y-%m-%d %H:%M UTC"))),
        }
    }
}

#[derive(Debug, Serialize)]
struct ModeOption {
    name: &'static str,
    label: &'static str,
}

#[derive(Debug, Serialize)]
struct FieldView<'a> {
    name: &'a str,
    label: &'a str,
    placeholder: &'a str,
    value: &'a str,
}

#[derive(Clone)]
pub struct Renderer {
    tera: Arc<Tera>,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer").finish_non_exhaustive()
    }
}

impl Renderer {
    pub fn new() -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html"]);
        tera.add_raw_templates(vec![
            ("base.html", templates::BASE),
            ("select.html", templates::SELECT),
            ("fields.html", templates::FIELDS),
            ("result.html", templates::RESULT),
            ("error.html", templates::ERROR),
        ])
        .map_err(|e| RenderError::Compile(e.to_string()))?;

        Ok(Self { tera: Arc::new(tera) })
    }

    pub fn render_page(&self, page: &Page) -> Result<String, RenderError> {
        let mut ctx = Context::new();

        let template = match page.state() {
            PageState::Idle => {
                let modes: Vec<ModeOption> = SearchMode::all()
                    .iter()
                    .map(|mode| ModeOption { name: mode.as_str(), label: mode.label() })
                    .collect();
                ctx.insert("modes", &modes);
                "select.html"
            }
            PageState::AwaitingFields(mode) | PageState::Submitting(mode) => {
                let fields: Vec<FieldView<'_>> = page
                    .fields()
                    .iter()
                    .map(|field| FieldView {
                        name: field.name,
                        label: field.label,
                        placeholder: field.placeholder,
                        value: field.value.as_deref().unwrap_or_default(),
                    })
                    .collect();
                ctx.insert("mode", mode.as_str());
                ctx.insert("mode_label", mode.label());
                ctx.insert("fields", &fields);
                "fields.html"
            }
            PageState::ShowingResult(weather) => {
                ctx.insert("weather", &WeatherView::from(&**weather));
                "result.html"
            }
            PageState::ShowingError(message) => {
                ctx.insert("message", message);
                "error.html"
            }
        };

        self.tera
            .render(template, &ctx)
            .map_err(|e| RenderError::Render(format!("{template}: {e}")))
    }
}

mod templates {
    pub const BASE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Weather lookup</title>
    <style>
        body { font-family: Arial, sans-serif; margin: 2rem auto; max-width: 28rem; }
        label { display: block; margin-top: 0.75rem; }
        .error { color: #b00020; }
        .reset { margin-top: 1.5rem; }
    </style>
</head>
<body>
    <h1>Weather lookup</h1>
    {% block content %}{% endblock content %}
</body>
</html>
"#;

    pub const SELECT: &str = r#"{% extends "base.html" %}
{% block content %}
<form method="get" action="/search">
    <label for="mode">Search by</label>
    <select id="mode" name="mode">
        {% for mode in modes %}<option value="{{ mode.name }}">{{ mode.label }}</option>
        {% endfor %}
    </select>
    <button type="submit">Next</button>
</form>
{% endblock content %}
"#;

    pub const FIELDS: &str = r#"{% extends "base.html" %}
{% block content %}
<h2>{{ mode_label }}</h2>
<form method="post" action="/search?mode={{ mode }}">
    {% for field in fields %}<label>{{ field.label }}
        <input type="text" name="{{ field.name }}" placeholder="{{ field.placeholder }}" value="{{ field.value }}">
    </label>
    {% endfor %}
    <button type="submit">Search</button>
</form>
<p class="reset"><a href="/">Start over</a></p>
{% endblock content %}
"#;

    pub const RESULT: &str = r#"{% extends "base.html" %}
{% block content %}
<h2>{{ weather.headline }}</h2>
<p>{{ weather.coordinates }}</p>
<img src="{{ weather.icon_url }}" alt="{{ weather.description }}">
<p>{{ weather.temperature }}</p>
<p>{{ weather.feels_like }}</p>
<p>{{ weather.humidity }}</p>
{% if weather.observed_at %}<p><small>{{ weather.observed_at }}</small></p>{% endif %}
<form class="reset" method="get" action="/"><button type="submit">New search</button></form>
{% endblock content %}
"#;

    pub const ERROR: &str = r#"{% extends "base.html" %}
{% block content %}
<p class="error">{{ message }}</p>
<form class="reset" method="get" action="/"><button type="submit">New search</button></form>
{% endblock content %}
"#;
}
