pub mod list;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/tags endpoints (mounted at /api/tags)
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list::list_tags))
}

#[derive(OpenApi)]
#[openapi(paths(list::list_tags), components(schemas(list::TagsResponse)))]
pub struct ApiDoc;
