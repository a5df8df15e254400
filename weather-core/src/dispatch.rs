//! Glue between raw form input and the repository.

use tracing::warn;

use crate::{
    model::{FieldValues, WeatherLookupResult},
    repository::WeatherLookup,
    search::SearchMode,
};

/// Anything on a form that may carry a named value.
///
/// Components that are not inputs (labels, buttons) answer `None`.
pub trait FormField {
    fn name(&self) -> Option<&str>;
    fn value(&self) -> Option<&str>;
}

/// Collect `name -> value` from form components.
///
/// A single component without a name or value invalidates the whole form.
pub fn extract_parameters<'a, I, F>(components: I) -> Option<FieldValues>
where
    I: IntoIterator<Item = &'a F>,
    F: FormField + ?Sized + 'a,
{
    let mut values = FieldValues::new();

    for component in components {
        let (Some(name), Some(value)) = (component.name(), component.value()) else {
            warn!("Form component without a name or value, discarding submitted fields");
            return None;
        };
        values.insert(name, Some(value.to_string()));
    }

    Some(values)
}

/// Route a search to the matching repository lookup.
///
/// Coordinates that are not decimal numbers are rejected here as an internal
/// error. Numbers outside the valid lat/lon range still go to the provider,
/// which answers with its own message.
pub async fn get_weather_info(
    lookup: &dyn WeatherLookup,
    mode: SearchMode,
    values: Option<&FieldValues>,
) -> WeatherLookupResult {
    let Some(values) = values else {
        warn!(%mode, "No field values supplied for search");
        return WeatherLookupResult::internal_error();
    };

    match mode {
        SearchMode::ByCity => {
            let city = values.get("city").unwrap_or_default();
            lookup.get_by_city_name(city, values.get("state"), values.get("country")).await
        }
        SearchMode::ByZip => {
            let zip = values.get("zip").unwrap_or_default();
            lookup.get_by_zip(zip, values.get("country")).await
        }
        SearchMode::ByCoordinates => {
            match (coordinate(values, "lat"), coordinate(values, "lon")) {
                (Some(lat), Some(lon)) => lookup.get_by_coordinates(lat, lon).await,
                _ => {
                    warn!("Latitude or longitude missing or not a number");
                    WeatherLookupResult::internal_error()
                }
            }
        }
    }
}

/// Same as [`get_weather_info`] for a mode that arrives by name.
pub async fn get_weather_info_by_name(
    lookup: &dyn WeatherLookup,
    mode: &str,
    values: Option<&FieldValues>,
) -> WeatherLookupResult {
    match mode.parse::<SearchMode>() {
        Ok(mode) => get_weather_info(lookup, mode, values).await,
        Err(err) => {
            warn!(error = %err, "Unrecognized search mode");
            WeatherLookupResult::internal_error()
        }
    }
}

fn coordinate(values: &FieldValues, name: &str) -> Option<f64> {
    values
        .get(name)
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
