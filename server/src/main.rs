mod api;
mod auth;
mod config;
mod db;
mod models;
mod schema;

use axum::extract::{FromRef, MatchedPath};
use axum::http::Request;
use axum::Router;
use foodgram_core::FontSource;
use std::env;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::Span;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<db::DbPool>,
    pub font: Arc<FontSource>,
}

impl FromRef<AppState> for Arc<db::DbPool> {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<FontSource> {
    fn from_ref(state: &AppState) -> Self {
        state.font.clone()
    }
}

/// Console logging, filtered by RUST_LOG.
fn init_telemetry() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn app(state: AppState) -> Router {
    // Public routes (no identity required)
    let public_router = Router::new()
        .nest("/api/tags", api::tags::router())
        .nest("/api/ingredients", api::ingredients::router());

    // Every handler below takes AuthUser
    let protected_router = Router::new()
        .nest("/api/recipes", api::recipes::router())
        .nest("/api/users", api::users::router());

    let swagger_ui = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api::openapi());

    Router::new()
        .merge(public_router)
        .merge(protected_router)
        .merge(swagger_ui)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let matched_path = request
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str)
                        .unwrap_or(request.uri().path());

                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %matched_path,
                    )
                })
                .on_request(|_request: &Request<_>, _span: &Span| {})
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &Span| {
                        let status = response.status().as_u16();
                        if status >= 500 {
                            tracing::error!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request failed with server error"
                            );
                        } else {
                            tracing::info!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request completed"
                            );
                        }
                    },
                )
                .on_failure(
                    |error: tower_http::classify::ServerErrorsFailureClass,
                     latency: std::time::Duration,
                     _span: &Span| {
                        tracing::error!(
                            error = %error,
                            latency_ms = %latency.as_millis(),
                            "request failed"
                        );
                    },
                ),
        )
}

#[tokio::main]
async fn main() {
    // Check for --openapi flag to dump spec and exit
    if env::args().any(|arg| arg == "--openapi") {
        let spec = api::openapi()
            .to_pretty_json()
            .expect("Failed to serialize OpenAPI spec");
        println!("{}", spec);
        return;
    }

    init_telemetry();

    let config = config::Config::load();

    let state = AppState {
        pool: Arc::new(db::create_pool(&config.database_url, config.db_pool_size)),
        font: Arc::new(config.font),
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind {}: {}", config.bind_addr, e));

    tracing::info!("Server listening on {}", config.bind_addr);
    tracing::info!("Swagger UI available at /swagger-ui/");

    if let Err(e) = axum::serve(listener, app(state)).await {
        tracing::error!("Server error: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use diesel::r2d2::{ConnectionManager, Pool};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    /// A state whose pool never connects; only requests rejected before
    /// touching the database can be served.
    fn offline_state() -> AppState {
        let manager = ConnectionManager::new("postgres://offline.invalid/foodgram");
        AppState {
            pool: Arc::new(Pool::builder().build_unchecked(manager)),
            font: Arc::new(FontSource::Bundled),
        }
    }

    async fn send(request: Request<Body>) -> (StatusCode, String) {
        let response = app(offline_state()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[tokio::test]
    async fn test_download_requires_identity() {
        let (status, body) = send(
            Request::get("/api/recipes/download_shopping_cart?format=txt")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Missing X-User-Id header"));
    }

    #[tokio::test]
    async fn test_malformed_identity_is_rejected() {
        let (status, body) = send(
            Request::post("/api/recipes/3fa85f64-5717-4562-b3fc-2c963f66afa6/shopping_cart")
                .header(auth::USER_ID_HEADER, "not-a-uuid")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Invalid X-User-Id header"));
    }

    #[tokio::test]
    async fn test_subscriptions_require_identity() {
        let (status, _) = send(
            Request::get("/api/users/subscriptions")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let (status, body) = send(
            Request::get("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("/api/recipes/download_shopping_cart"));
    }
}
