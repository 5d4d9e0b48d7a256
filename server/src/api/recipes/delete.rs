use crate::api::{error_response, guard_rejection, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::{recipe_ingredients, recipe_tags, recipes, saved_recipes};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use diesel::prelude::*;
use foodgram_core::guards;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 204, description = "Recipe deleted successfully"),
        (status = 403, description = "Only the author or an administrator may delete", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("user_id" = []))
)]
pub async fn delete_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let author_id: Uuid = match recipes::table
        .filter(recipes::id.eq(id))
        .select(recipes::author_id)
        .first(&mut conn)
    {
        Ok(a) => a,
        Err(diesel::NotFound) => return error_response(StatusCode::NOT_FOUND, "Recipe not found"),
        Err(e) => {
            tracing::error!("Failed to fetch recipe {}: {}", id, e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete recipe");
        }
    };

    if let Err(rejection) = guards::can_modify_recipe(&user.actor(), author_id) {
        return guard_rejection(rejection);
    }

    // Saved copies, tag links and ingredient lines go with the recipe
    let result: Result<usize, diesel::result::Error> = conn.transaction(|conn| {
        diesel::delete(saved_recipes::table.filter(saved_recipes::recipe_id.eq(id)))
            .execute(conn)?;
        diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(id))).execute(conn)?;
        diesel::delete(recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(id)))
            .execute(conn)?;
        diesel::delete(recipes::table.find(id)).execute(conn)
    });

    match result {
        Ok(0) => error_response(StatusCode::NOT_FOUND, "Recipe not found"),
        Ok(_) => {
            tracing::info!(recipe = %id, by = %user.id, "Recipe deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            tracing::error!("Failed to delete recipe {}: {}", id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete recipe")
        }
    }
}
