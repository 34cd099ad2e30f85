//! MealMood REST API
//!
//! HTTP API layer over the shared timeline, built with Axum.
//!
//! # Endpoints
//!
//! ## Events
//! - `POST /api/v1/events` - Record one observation (meal, mood, health sample)
//! - `POST /api/v1/events/batch` - Record a batch of observations
//!
//! ## Timeline
//! - `GET /api/v1/timeline?kind=&limit=` - Events newest first
//! - `GET /api/v1/timeline/latest/:kind` - Most recent event of a kind
//!
//! ## Insights
//! - `GET /api/v1/insights` - All insights
//! - `GET /api/v1/insights/best` - Single best insight
//! - `POST /api/v1/insights/annotate` - Write insights onto meal events
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use mealmood::api::{serve, ApiConfig, AppState};
//! use mealmood::insights::InsightEngine;
//! use mealmood::producers::Journal;
//! use mealmood::timeline::{EventFactory, TimelineHandle};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let journal = Journal::new(TimelineHandle::new(), EventFactory::local());
//!     let config = ApiConfig::default();
//!
//!     let state = AppState::new(journal, InsightEngine::default(), config.clone());
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Event routes
        .route("/events", post(routes::events::record_event))
        .route("/events/batch", post(routes::events::record_batch))
        // Timeline routes
        .route("/timeline", get(routes::timeline::get_timeline))
        .route("/timeline/latest/:kind", get(routes::timeline::latest_of_kind))
        // Insight routes
        .route("/insights", get(routes::insights::list_insights))
        .route("/insights/best", get(routes::insights::best_insight))
        .route("/insights/annotate", post(routes::insights::annotate));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let timeout = Duration::from_secs(state.config.request_timeout_secs);
    let cors = cors_layer(&state.config.cors_origins);

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// CORS for the configured origins; no origins means any origin
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("MealMood API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("MealMood API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::InsightEngine;
    use crate::producers::Journal;
    use crate::timeline::{EventFactory, TimelineHandle};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    const MINUTE: i64 = 60_000;
    const HOUR: i64 = 3_600_000;
    const T0: i64 = 1_747_648_800_000;

    fn create_test_app() -> Router {
        let journal = Journal::new(TimelineHandle::new(), EventFactory::utc());
        let state = AppState::new(journal, InsightEngine::default(), ApiConfig::default());
        build_router(state)
    }

    async fn get(app: &Router, uri: &str) -> Response {
        app.clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post(app: &Router, uri: &str, body: Value) -> Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn pizza_scenario() -> Value {
        json!({
            "observations": [
                {"kind": "meal", "foodType": "Pizza", "description": "dinner", "timestamp": T0},
                {"kind": "mood", "mood": "Angry", "intensity": 70, "timestamp": T0 + 30 * MINUTE},
                {"kind": "mood", "mood": "Sad", "intensity": 55, "timestamp": T0 + 2 * HOUR},
                {"kind": "health", "metric": "sleep", "start": T0 + 9 * HOUR, "end": T0 + 13 * HOUR}
            ]
        })
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = create_test_app();

        assert_eq!(get(&app, "/health/live").await.status(), StatusCode::OK);
        assert_eq!(get(&app, "/health/ready").await.status(), StatusCode::OK);

        let response = get(&app, "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["events"], 0);
    }

    #[tokio::test]
    async fn test_record_meal() {
        let app = create_test_app();

        let response = post(
            &app,
            "/api/v1/events",
            json!({"kind": "meal", "foodType": "Ramen", "description": "late lunch", "timestamp": T0}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["status"], "created");
        assert_eq!(body["event"]["kind"], "meal");
        assert_eq!(body["event"]["title"], "Ramen");
        assert_eq!(body["event"]["subtitle"], "late lunch");
    }

    #[tokio::test]
    async fn test_duplicate_sleep_returns_ok() {
        let app = create_test_app();
        let sleep = json!({"kind": "health", "metric": "sleep", "start": T0, "end": T0 + 7 * HOUR});

        assert_eq!(
            post(&app, "/api/v1/events", sleep.clone()).await.status(),
            StatusCode::CREATED
        );

        let response = post(&app, "/api/v1/events", sleep).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "duplicate");
    }

    #[tokio::test]
    async fn test_invalid_intensity_rejected() {
        let app = create_test_app();

        let response = post(
            &app,
            "/api/v1/events",
            json!({"kind": "mood", "mood": "Sad", "intensity": 150, "timestamp": T0}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "INVALID_EVENT");
        assert!(body["request_id"].is_string());
    }

    #[tokio::test]
    async fn test_out_of_range_sleep_rejected() {
        let app = create_test_app();

        let response = post(
            &app,
            "/api/v1/events",
            json!({"kind": "health", "metric": "sleep", "start": i64::MIN, "end": 1000}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "INVALID_EVENT");
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/events")
                    .header("Content-Type", "application/json")
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_batch_partial() {
        let app = create_test_app();

        let response = post(
            &app,
            "/api/v1/events/batch",
            json!({
                "observations": [
                    {"kind": "health", "metric": "heart_rate", "start": T0, "value": 58.0},
                    {"kind": "health", "metric": "sleep", "start": T0, "end": T0 - HOUR}
                ]
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::MULTI_STATUS);
        let body = json_body(response).await;
        assert_eq!(body["status"], "partial");
        assert_eq!(body["accepted"], 1);
        assert_eq!(body["rejected"], 1);
        assert_eq!(body["errors"][0]["index"], 1);
    }

    #[tokio::test]
    async fn test_empty_batch_rejected() {
        let app = create_test_app();
        let response = post(&app, "/api/v1/events/batch", json!({"observations": []})).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_timeline_filter_and_limit() {
        let app = create_test_app();
        post(&app, "/api/v1/events/batch", pizza_scenario()).await;

        let body = json_body(get(&app, "/api/v1/timeline").await).await;
        assert_eq!(body["total"], 4);
        assert_eq!(body["version"], 4);
        assert_eq!(body["events"][0]["kind"], "sleep");

        let body = json_body(get(&app, "/api/v1/timeline?kind=mood&limit=1").await).await;
        assert_eq!(body["total"], 2);
        let events = body["events"].as_array().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["title"], "Sad");
    }

    #[tokio::test]
    async fn test_timeline_unknown_kind() {
        let app = create_test_app();
        let response = get(&app, "/api/v1/timeline?kind=snack").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_latest_of_kind() {
        let app = create_test_app();

        let response = get(&app, "/api/v1/timeline/latest/sleep").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        post(&app, "/api/v1/events/batch", pizza_scenario()).await;

        let response = get(&app, "/api/v1/timeline/latest/meal").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["title"], "Pizza");
    }

    #[tokio::test]
    async fn test_insights_insufficient_data() {
        let app = create_test_app();
        post(
            &app,
            "/api/v1/events",
            json!({"kind": "meal", "foodType": "Pizza", "timestamp": T0}),
        )
        .await;

        let body = json_body(get(&app, "/api/v1/insights").await).await;
        assert_eq!(body["status"], "insufficient_data");
        assert_eq!(body["insights"], json!([]));
    }

    #[tokio::test]
    async fn test_insights_end_to_end() {
        let app = create_test_app();
        post(&app, "/api/v1/events/batch", pizza_scenario()).await;

        let body = json_body(get(&app, "/api/v1/insights").await).await;
        assert_eq!(body["status"], "ready");
        assert_eq!(body["event_count"], 4);
        assert_eq!(
            body["insights"][0]["text"],
            "After eating pizza, you often feel angry"
        );
        assert_eq!(body["insights"][0]["pattern"], "mood_after_meal");
        assert_eq!(
            body["insights"][1]["text"],
            "Eating pizza before bed may lead to poorer sleep"
        );

        let body = json_body(get(&app, "/api/v1/insights/best").await).await;
        assert_eq!(body["insight"]["text"], "Pizza may cause sad feelings");
    }

    #[tokio::test]
    async fn test_annotate_writes_meal_insight() {
        let app = create_test_app();
        post(&app, "/api/v1/events/batch", pizza_scenario()).await;

        let body = json_body(post(&app, "/api/v1/insights/annotate", json!({})).await).await;
        assert_eq!(body["annotated"], 1);
        assert_eq!(body["version"], 5);

        let meal = json_body(get(&app, "/api/v1/timeline/latest/meal").await).await;
        assert_eq!(
            meal["insight"],
            "After eating pizza, you often feel angry; Eating pizza before bed may lead to poorer sleep"
        );
    }
}
