use crate::api::ErrorResponse;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Ingredient;
use crate::schema::ingredients;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListIngredientsParams {
    /// Case-insensitive prefix of the ingredient name
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IngredientsResponse {
    pub ingredients: Vec<Ingredient>,
}

/// Build an ILIKE pattern matching names that start with `prefix`.
fn prefix_pattern(prefix: &str) -> Option<String> {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        return None;
    }
    let escaped = prefix
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("{}%", escaped))
}

#[utoipa::path(
    get,
    path = "/api/ingredients",
    tag = "ingredients",
    params(ListIngredientsParams),
    responses(
        (status = 200, description = "Ingredients, optionally filtered by name prefix", body = IngredientsResponse)
    )
)]
pub async fn list_ingredients(
    State(pool): State<Arc<DbPool>>,
    Query(params): Query<ListIngredientsParams>,
) -> impl IntoResponse {
    let pattern = params.name.as_deref().and_then(prefix_pattern);

    let mut conn = get_conn!(pool);

    let mut query = ingredients::table
        .select(Ingredient::as_select())
        .order((ingredients::name.asc(), ingredients::measurement_unit.asc()))
        .into_boxed();

    if let Some(ref pattern) = pattern {
        query = query.filter(ingredients::name.ilike(pattern));
    }

    let ingredients: Vec<Ingredient> = match query.load(&mut conn) {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to fetch ingredients: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch ingredients".to_string(),
                }),
            )
                .into_response();
        }
    };

    (StatusCode::OK, Json(IngredientsResponse { ingredients })).into_response()
}
