pub mod ingredients;
pub mod recipes;
pub mod tags;
pub mod users;

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use foodgram_core::GuardError;
use serde::Serialize;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{OpenApi, ToSchema};

use crate::auth::USER_ID_HEADER;
use crate::models::{Ingredient, RecipeShort, Tag};

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Permission failures are 403, everything else a guard rejects is the client's input.
pub fn guard_rejection(err: GuardError) -> Response {
    let status = if err.is_permission() {
        StatusCode::FORBIDDEN
    } else {
        StatusCode::BAD_REQUEST
    };
    error_response(status, err.to_string())
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    #[derive(OpenApi)]
    #[openapi(components(schemas(ErrorResponse, Tag, Ingredient, RecipeShort)))]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    if let Some(components) = spec.components.as_mut() {
        components.add_security_scheme(
            "user_id",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(USER_ID_HEADER))),
        );
    }

    let modules: Vec<utoipa::openapi::OpenApi> = vec![
        tags::ApiDoc::openapi(),
        ingredients::ApiDoc::openapi(),
        recipes::ApiDoc::openapi(),
        users::ApiDoc::openapi(),
    ];

    for module_spec in modules {
        spec.paths.paths.extend(module_spec.paths.paths);

        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_rejection_status() {
        assert_eq!(
            guard_rejection(GuardError::NotAuthor).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            guard_rejection(GuardError::SelfFollow).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_openapi_lists_export_endpoint() {
        let spec = openapi();
        assert!(spec
            .paths
            .paths
            .contains_key("/api/recipes/download_shopping_cart"));
        assert!(spec.paths.paths.contains_key("/api/users/{id}/subscribe"));
    }
}
