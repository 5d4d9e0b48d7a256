use crate::api::{error_response, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::{ingredients, recipe_ingredients, saved_recipes};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use diesel::prelude::*;
use foodgram_core::{
    aggregate, render, ExportFormat, FontSource, IngredientAmount, ReportError, SavePurpose,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DownloadParams {
    /// `pdf` (default) or `txt`
    #[serde(default)]
    #[param(value_type = Option<String>)]
    pub format: ExportFormat,
}

/// Every ingredient line of every recipe on the user's shopping list, unsummed.
pub fn fetch_shopping_list_items(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> QueryResult<Vec<IngredientAmount>> {
    let rows: Vec<(String, String, i32)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .inner_join(
            saved_recipes::table.on(saved_recipes::recipe_id.eq(recipe_ingredients::recipe_id)),
        )
        .filter(saved_recipes::user_id.eq(user_id))
        .filter(saved_recipes::purpose.eq(SavePurpose::ShoppingList.as_str()))
        .select((
            ingredients::name,
            ingredients::measurement_unit,
            recipe_ingredients::amount,
        ))
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|(name, unit, amount)| IngredientAmount::new(name, unit, amount))
        .collect())
}

/// A name the font cannot draw is reported back to the caller; anything else is on the server.
fn render_rejection(err: &ReportError) -> Response {
    match err {
        ReportError::MissingGlyph { .. } => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
        _ => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to render shopping list",
        ),
    }
}

#[utoipa::path(
    get,
    path = "/api/recipes/download_shopping_cart",
    tag = "recipes",
    params(DownloadParams),
    responses(
        (status = 200, description = "Summed shopping list as a PDF", content_type = "application/pdf"),
        (status = 200, description = "Summed shopping list as plain text", content_type = "text/plain"),
        (status = 400, description = "Unknown format", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 422, description = "An ingredient name has characters the PDF font cannot draw", body = ErrorResponse),
        (status = 500, description = "The document could not be rendered", body = ErrorResponse)
    ),
    security(("user_id" = []))
)]
pub async fn download_shopping_cart(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(font): State<Arc<FontSource>>,
    Query(params): Query<DownloadParams>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let items = match fetch_shopping_list_items(&mut conn, user.id) {
        Ok(items) => items,
        Err(e) => {
            tracing::error!("Failed to fetch shopping list for {}: {}", user.id, e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch shopping list",
            );
        }
    };
    drop(conn);

    let lines = aggregate(items);

    let artifact = match render(&lines, params.format, &font) {
        Ok(a) => a,
        Err(e) => {
            tracing::error!("Failed to render shopping list for {}: {}", user.id, e);
            return render_rejection(&e);
        }
    };

    tracing::info!(
        user = %user.id,
        format = ?params.format,
        lines = lines.len(),
        bytes = artifact.body.len(),
        "Shopping list exported"
    );

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, artifact.content_type.to_string()),
            (header::CONTENT_DISPOSITION, artifact.content_disposition()),
        ],
        artifact.body,
    )
        .into_response()
}
