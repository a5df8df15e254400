//! Web server: routes, shared state and request handlers.

use std::{collections::HashMap, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    Form, Json, Router,
    extract::{Query, State, rejection::FormRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use weather_core::{
    FieldValues, INTERNAL_ERROR, SearchMode, WeatherLookup, WeatherLookupResult,
    get_weather_info_by_name,
};

use crate::{
    page::Page,
    render::{RenderError, Renderer},
};

/// Shared application state
#[derive(Clone, Debug)]
pub struct AppState {
    pub lookup: Arc<dyn WeatherLookup>,
    pub renderer: Renderer,
}

impl AppState {
    pub fn new(lookup: Arc<dyn WeatherLookup>) -> Result<Self, RenderError> {
        Ok(Self { lookup, renderer: Renderer::new()? })
    }
}

#[derive(Debug, Deserialize)]
pub struct ModeQuery {
    pub mode: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/search", get(select_mode).post(submit))
        .route("/api/weather", get(api_weather))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `bind_addr` and serve until Ctrl-C.
pub async fn serve(bind_addr: &str, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;

    info!("Weather lookup running at http://{}", listener.local_addr()?);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server failed")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

async fn index(State(state): State<AppState>) -> Response {
    let mut page = Page::new();
    page.on_reset_requested();
    render(&state, &page)
}

async fn select_mode(State(state): State<AppState>, Query(query): Query<ModeQuery>) -> Response {
    let mut page = Page::new();
    match query.mode.as_deref().map(|name| (name, name.parse::<SearchMode>())) {
        None => {}
        Some((_, Ok(mode))) => {
            page.on_search_mode_selected(mode);
        }
        Some((name, Err(_))) => {
            page.on_unrecognized_mode(name);
        }
    }
    render(&state, &page)
}

async fn submit(
    State(state): State<AppState>,
    Query(query): Query<ModeQuery>,
    posted: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Response {
    let mut page = Page::new();
    let name = query.mode.unwrap_or_default();
    match (name.parse::<SearchMode>(), posted) {
        (Err(_), _) => {
            page.on_unrecognized_mode(&name);
        }
        (Ok(mode), Ok(Form(posted))) => {
            page.on_search_mode_selected(mode);
            page.on_submit(&posted, state.lookup.as_ref()).await;
        }
        (Ok(mode), Err(rejection)) => {
            page.on_search_mode_selected(mode);
            page.on_rejected_submission(&rejection.body_text());
        }
    }
    render(&state, &page)
}

/// JSON flavour of a search: `?mode=zip&zip=63367`.
async fn api_weather(
    State(state): State<AppState>,
    Query(mut params): Query<HashMap<String, String>>,
) -> Json<WeatherLookupResult> {
    let Some(mode) = params.remove("mode") else {
        warn!("API lookup without a search mode");
        return Json(WeatherLookupResult::internal_error());
    };
    let values: FieldValues = params.into_iter().collect();
    Json(get_weather_info_by_name(state.lookup.as_ref(), &mode, Some(&values)).await)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn render(state: &AppState, page: &Page) -> Response {
    match state.renderer.render_page(page) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render page");
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, header::CONTENT_TYPE},
    };
    use std::sync::Mutex;
    use tower::ServiceExt;
    use weather_core::{
        CityWeather,
        model::{Coordinates, WeatherCondition, WeatherMetrics},
    };

    /// Knows only Lake Saint Louis and records what it was asked.
    #[derive(Debug, Default)]
    struct FakeLookup {
        calls: Mutex<Vec<String>>,
    }

    impl FakeLookup {
        fn answer(&self, call: String, found: bool) -> WeatherLookupResult {
            self.calls.lock().unwrap().push(call);
            if !found {
                return WeatherLookupResult::Error("city not found".into());
            }
            WeatherLookupResult::CityWeather(CityWeather {
                city: "Lake Saint Louis".into(),
                country_code: "US".into(),
                weather_metrics: WeatherMetrics {
                    temp: 54.73,
                    feels_like: 53.38,
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
    impl WeatherLookup for FakeLookup {
        async fn get_by_city_name(
            &self,
            city_name: &str,
            state_code: Option<&str>,
            country_code: Option<&str>,
        ) -> WeatherLookupResult {
            self.answer(
                format!("city:{city_name}:{state_code:?}:{country_code:?}"),
                city_name == "Lake Saint Louis",
            )
        }

        async fn get_by_zip(&self, zip: &str, country_code: Option<&str>) -> WeatherLookupResult {
            self.answer(format!("zip:{zip}:{country_code:?}"), zip == "63367")
        }

        async fn get_by_coordinates(&self, lat: f64, lon: f64) -> WeatherLookupResult {
            self.answer(format!("coordinates:{lat}:{lon}"), true)
        }
    }

    fn create_test_router() -> (Router, Arc<FakeLookup>) {
        let lookup = Arc::new(FakeLookup::default());
        let state = AppState::new(lookup.clone()).unwrap();
        (create_router(state), lookup)
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn send_get(app: Router, uri: &str) -> Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post_form(app: Router, uri: &str, body: &str) -> Response {
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn index_shows_mode_selection() {
        let (app, _) = create_test_router();

        let response = send_get(app, "/").await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("<select id=\"mode\" name=\"mode\">"));
        assert!(html.contains("value=\"coordinates\""));
    }

    #[tokio::test]
    async fn selecting_a_mode_shows_its_fields() {
        let (app, _) = create_test_router();

        let html = body_text(send_get(app, "/search?mode=coordinates").await).await;

        assert!(html.contains("name=\"lat\""));
        assert!(html.contains("name=\"lon\""));
        assert!(!html.contains("name=\"zip\""));
    }

    #[tokio::test]
    async fn search_without_mode_falls_back_to_selection() {
        let (app, _) = create_test_router();

        let html = body_text(send_get(app, "/search").await).await;

        assert!(html.contains("<select id=\"mode\" name=\"mode\">"));
    }

    #[tokio::test]
    async fn unknown_mode_shows_internal_error() {
        let (app, lookup) = create_test_router();

        let html = body_text(post_form(app, "/search?mode=planet", "city=Mars").await).await;

        assert!(html.contains(INTERNAL_ERROR));
        assert!(lookup.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreadable_form_body_shows_internal_error() {
        let (app, lookup) = create_test_router();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/search?mode=city")
                    .header(CONTENT_TYPE, "text/plain")
                    .body(Body::from("city=Lake"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains(&format!("<p class=\"error\">{INTERNAL_ERROR}</p>")));
        assert!(html.contains("New search"));
        assert!(lookup.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn submitting_city_form_renders_result() {
        let (app, lookup) = create_test_router();

        let response = post_form(
            app,
            "/search?mode=city",
            "city=Lake+Saint+Louis&state=MO&country=",
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Lake Saint Louis, US"));
        assert!(html.contains("Temperature: 54.7 °F"));
        assert!(html.contains("New search"));
        assert_eq!(
            *lookup.calls.lock().unwrap(),
            ["city:Lake Saint Louis:Some(\"MO\"):None"]
        );
    }

    #[tokio::test]
    async fn not_found_is_rendered_verbatim() {
        let (app, _) = create_test_router();

        let html = body_text(post_form(app, "/search?mode=zip", "zip=49000&country=").await).await;

        assert!(html.contains("<p class=\"error\">city not found</p>"));
    }

    #[tokio::test]
    async fn api_returns_uniform_result() {
        let (app, _) = create_test_router();

        let response = send_get(app, "/api/weather?mode=zip&zip=63367").await;

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["cityWeather"]["city"], "Lake Saint Louis");
        assert!(json.get("error").is_none());
    }

    #[tokio::test]
    async fn api_without_mode_is_internal_error() {
        let (app, lookup) = create_test_router();

        let response = send_get(app, "/api/weather?zip=63367").await;

        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json, serde_json::json!({ "error": INTERNAL_ERROR }));
        assert!(lookup.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn health_reports_version() {
        let (app, _) = create_test_router();

        let response = send_get(app, "/health").await;

        assert_eq!(response.status(), StatusCode::OK);
        let health: HealthResponse = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    }
}
