//! Per-page UI state and the event handlers that move it along.
//!
//! Every request builds its own [`Page`], replays the user's event on it and renders
//! the resulting state, so no page state is shared between sessions.

use std::collections::HashMap;

use tracing::{debug, warn};
use weather_core::{
    CityWeather, FormField, INTERNAL_ERROR, SearchMode, WeatherLookup, WeatherLookupResult,
    extract_parameters, get_weather_info,
};

#[derive(Debug, Clone, PartialEq)]
pub enum PageState {
    /// Mode-selection screen.
    Idle,
    AwaitingFields(SearchMode),
    /// A lookup is in flight. Only held while `on_submit` awaits the lookup.
    Submitting(SearchMode),
    ShowingResult(Box<CityWeather>),
    ShowingError(String),
}

/// A text input on the field-entry screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputField {
    pub name: &'static str,
    pub label: &'static str,
    pub placeholder: &'static str,
    /// `None` until the form is posted, and after a post that left the input out.
    pub value: Option<String>,
}

impl FormField for InputField {
    fn name(&self) -> Option<&str> {
        Some(self.name)
    }

    fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    state: PageState,
    fields: Vec<InputField>,
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    pub fn new() -> Self {
        Self { state: PageState::Idle, fields: Vec::new() }
    }

    #[cfg(test)]
    pub(crate) fn with_state(state: PageState) -> Self {
        Self { state, fields: Vec::new() }
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    /// Inputs currently on screen.
    pub fn fields(&self) -> &[InputField] {
        &self.fields
    }

    /// Swap in the field set for `mode`, replacing whatever was shown.
    pub fn on_search_mode_selected(&mut self, mode: SearchMode) -> &PageState {
        self.fields = mode
            .fields()
            .iter()
            .map(|spec| InputField {
                name: spec.name,
                label: spec.label,
                placeholder: spec.placeholder,
                value: None,
            })
            .collect();
        self.state = PageState::AwaitingFields(mode);
        &self.state
    }

    /// Read the posted values into the displayed fields and run the lookup.
    pub async fn on_submit(
        &mut self,
        posted: &HashMap<String, String>,
        lookup: &dyn WeatherLookup,
    ) -> &PageState {
        let PageState::AwaitingFields(mode) = self.state else {
            warn!(state = ?self.state, "Submit without a field-entry screen");
            return self.show_error(INTERNAL_ERROR.to_string());
        };

        self.state = PageState::Submitting(mode);
        debug!(state = ?self.state, "Form submitted");
        for field in &mut self.fields {
            field.value = posted.get(field.name).cloned();
        }

        let values = extract_parameters(&self.fields);
        match get_weather_info(lookup, mode, values.as_ref()).await {
            WeatherLookupResult::CityWeather(weather) => {
                self.fields.clear();
                self.state = PageState::ShowingResult(Box::new(weather));
                &self.state
            }
            WeatherLookupResult::Error(message) => self.show_error(message),
        }
    }

    /// A mode name that does not exist was requested.
    pub fn on_unrecognized_mode(&mut self, name: &str) -> &PageState {
        warn!(mode = name, "Unrecognized search mode requested");
        self.show_error(INTERNAL_ERROR.to_string())
    }

    /// The posted form could not be read at all.
    pub fn on_rejected_submission(&mut self, reason: &str) -> &PageState {
        warn!(state = ?self.state, reason, "Discarding unreadable form submission");
        self.show_error(INTERNAL_ERROR.to_string())
    }

    /// Back to the mode-selection screen with nothing displayed.
    pub fn on_reset_requested(&mut self) -> &PageState {
        self.fields.clear();
        self.state = PageState::Idle;
        &self.state
    }

    fn show_error(&mut self, message: String) -> &PageState {
        self.fields.clear();
        self.state = PageState::ShowingError(message);
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use weather_core::model::{Coordinates, WeatherCondition, WeatherMetrics};

    #[derive(Debug, Default)]
    struct CountingLookup {
        calls: AtomicUsize,
    }

    impl CountingLookup {
        fn answer(&self, city: &str) -> WeatherLookupResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if city.is_empty() {
                return WeatherLookupResult::Error("city not found".into());
            }
            WeatherLookupResult::CityWeather(CityWeather {
                city: city.to_string(),
                country_code: "US".into(),
                weather_metrics: WeatherMetrics {
                    temp: 54.7,
                    feels_like: 53.4,
                    humidity: 78.0,
                    temp_min: None,
                    temp_max: None,
                    pressure: None,
                },
                coordinates: Coordinates { lat: 38.7976, lon: -90.7857 },
                weather: WeatherCondition {
                    id: Some(804),
                    main: "Clouds".into(),
                    description: "overcast clouds".into(),
                    icon: "04n".into(),
                },
                observed_at: None,
            })
        }
    }

    #[async_trait]
    impl WeatherLookup for CountingLookup {
        async fn get_by_city_name(
            &self,
            city_name: &str,
            _state_code: Option<&str>,
            _country_code: Option<&str>,
        ) -> WeatherLookupResult {
            self.answer(city_name)
        }

        async fn get_by_zip(&self, _zip: &str, _country_code: Option<&str>) -> WeatherLookupResult {
            self.answer("Lake Saint Louis")
        }

        async fn get_by_coordinates(&self, _lat: f64, _lon: f64) -> WeatherLookupResult {
            self.answer("Lake Saint Louis")
        }
    }

    fn posted(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn field_names(page: &Page) -> Vec<&str> {
        page.fields().iter().map(|f| f.name).collect()
    }

    #[test]
    fn new_page_is_idle_and_empty() {
        let page = Page::new();
        assert_eq!(page.state(), &PageState::Idle);
        assert!(page.fields().is_empty());
    }

    #[test]
    fn selecting_a_mode_replaces_displayed_fields() {
        let mut page = Page::new();

        page.on_search_mode_selected(SearchMode::ByCity);
        assert_eq!(field_names(&page), ["city", "state", "country"]);

        let state = page.on_search_mode_selected(SearchMode::ByCoordinates);
        assert_eq!(state, &PageState::AwaitingFields(SearchMode::ByCoordinates));
        assert_eq!(field_names(&page), ["lat", "lon"]);
    }

    #[tokio::test]
    async fn successful_submit_shows_result() {
        let lookup = CountingLookup::default();
        let mut page = Page::new();
        page.on_search_mode_selected(SearchMode::ByCity);

        let form = posted(&[("city", "Lake Saint Louis"), ("state", "MO"), ("country", "")]);
        let state = page.on_submit(&form, &lookup).await;

        let PageState::ShowingResult(weather) = state else {
            panic!("expected a result screen, got {state:?}");
        };
        assert_eq!(weather.city, "Lake Saint Louis");
        assert!(page.fields().is_empty());
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn provider_message_is_shown_verbatim() {
        let lookup = CountingLookup::default();
        let mut page = Page::new();
        page.on_search_mode_selected(SearchMode::ByCity);

        let form = posted(&[("city", ""), ("state", ""), ("country", "")]);
        let state = page.on_submit(&form, &lookup).await;

        assert_eq!(state, &PageState::ShowingError("city not found".into()));
    }

    #[tokio::test]
    async fn input_left_out_of_the_post_is_internal_error() {
        let lookup = CountingLookup::default();
        let mut page = Page::new();
        page.on_search_mode_selected(SearchMode::ByZip);

        let state = page.on_submit(&posted(&[("zip", "63367")]), &lookup).await;

        assert_eq!(state, &PageState::ShowingError(INTERNAL_ERROR.into()));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn submit_from_idle_is_internal_error() {
        let lookup = CountingLookup::default();
        let mut page = Page::new();

        let state = page.on_submit(&posted(&[("zip", "63367")]), &lookup).await;

        assert_eq!(state, &PageState::ShowingError(INTERNAL_ERROR.into()));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn reset_returns_to_mode_selection() {
        let lookup = CountingLookup::default();
        let mut page = Page::new();
        page.on_search_mode_selected(SearchMode::ByCoordinates);
        page.on_submit(&posted(&[("lat", "38.79755"), ("lon", "-90.785683")]), &lookup)
            .await;

        assert_eq!(page.on_reset_requested(), &PageState::Idle);
        assert!(page.fields().is_empty());
    }

    #[test]
    fn rejected_submission_shows_internal_error() {
        let mut page = Page::new();
        page.on_search_mode_selected(SearchMode::ByCity);

        assert_eq!(
            page.on_rejected_submission("unsupported content type"),
            &PageState::ShowingError(INTERNAL_ERROR.into())
        );
        assert!(page.fields().is_empty());
    }

    #[test]
    fn unrecognized_mode_shows_internal_error() {
        let mut page = Page::new();
        page.on_search_mode_selected(SearchMode::ByZip);

        assert_eq!(
            page.on_unrecognized_mode("by-planet"),
            &PageState::ShowingError(INTERNAL_ERROR.into())
        );
        assert!(page.fields().is_empty());
    }
}
