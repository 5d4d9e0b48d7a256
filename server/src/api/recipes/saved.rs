//! Favourites and the shopping list: the same "user saved recipe" relation with a
//! different purpose.

use crate::api::{error_response, guard_rejection, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{NewSavedRecipe, RecipeShort};
use crate::schema::{recipes, saved_recipes};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use foodgram_core::{guards, GuardError, SavePurpose};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Whether the caller has saved a recipe, per purpose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SavedFlags {
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

impl SavedFlags {
    fn set(&mut self, purpose: SavePurpose) {
        match purpose {
            SavePurpose::Favourite => self.is_favorited = true,
            SavePurpose::ShoppingList => self.is_in_shopping_cart = true,
        }
    }
}

/// Fold (recipe, purpose) rows into per-recipe flags. Unknown purposes are ignored.
pub fn collect_flags(rows: Vec<(Uuid, String)>) -> HashMap<Uuid, SavedFlags> {
    let mut flags: HashMap<Uuid, SavedFlags> = HashMap::new();
    for (recipe_id, purpose) in rows {
        if let Some(purpose) = SavePurpose::from_str(&purpose) {
            flags.entry(recipe_id).or_default().set(purpose);
        }
    }
    flags
}

pub fn load_flags(
    conn: &mut PgConnection,
    user_id: Uuid,
    recipe_ids: &[Uuid],
) -> QueryResult<HashMap<Uuid, SavedFlags>> {
    if recipe_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(Uuid, String)> = saved_recipes::table
        .filter(saved_recipes::user_id.eq(user_id))
        .filter(saved_recipes::recipe_id.eq_any(recipe_ids))
        .select((saved_recipes::recipe_id, saved_recipes::purpose))
        .load(conn)?;

    Ok(collect_flags(rows))
}

fn save_recipe(pool: &DbPool, user_id: Uuid, recipe_id: Uuid, purpose: SavePurpose) -> Response {
    let mut conn = get_conn!(pool);

    let recipe: RecipeShort = match recipes::table
        .filter(recipes::id.eq(recipe_id))
        .select(RecipeShort::as_select())
        .first(&mut conn)
        .optional()
    {
        Ok(Some(r)) => r,
        Ok(None) => return error_response(StatusCode::NOT_FOUND, "Recipe not found"),
        Err(e) => {
            tracing::error!("Failed to fetch recipe {}: {}", recipe_id, e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch recipe");
        }
    };

    let already_saved = match diesel::select(diesel::dsl::exists(
        saved_recipes::table
            .filter(saved_recipes::user_id.eq(user_id))
            .filter(saved_recipes::recipe_id.eq(recipe_id))
            .filter(saved_recipes::purpose.eq(purpose.as_str())),
    ))
    .get_result::<bool>(&mut conn)
    {
        Ok(exists) => exists,
        Err(e) => {
            tracing::error!("Failed to check saved recipe: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save recipe");
        }
    };

    if let Err(rejection) = guards::can_save(purpose, already_saved) {
        return guard_rejection(rejection);
    }

    let result = diesel::insert_into(saved_recipes::table)
        .values(NewSavedRecipe {
            user_id,
            recipe_id,
            purpose: purpose.as_str(),
        })
        .execute(&mut conn);

    match result {
        Ok(_) => (StatusCode::CREATED, Json(recipe)).into_response(),
        // Lost a race with a concurrent save of the same recipe
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            guard_rejection(GuardError::AlreadySaved(purpose))
        }
        Err(e) => {
            tracing::error!("Failed to save recipe to {}: {}", purpose.as_str(), e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save recipe")
        }
    }
}

fn unsave_recipe(pool: &DbPool, user_id: Uuid, recipe_id: Uuid, purpose: SavePurpose) -> Response {
    let mut conn = get_conn!(pool);

    let deleted = match diesel::delete(
        saved_recipes::table
            .filter(saved_recipes::user_id.eq(user_id))
            .filter(saved_recipes::recipe_id.eq(recipe_id))
            .filter(saved_recipes::purpose.eq(purpose.as_str())),
    )
    .execute(&mut conn)
    {
        Ok(count) => count,
        Err(e) => {
            tracing::error!("Failed to remove recipe from {}: {}", purpose.as_str(), e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to remove recipe");
        }
    };

    if deleted == 0 {
        return error_response(
            StatusCode::NOT_FOUND,
            format!("Recipe is not in your {}", purpose.label()),
        );
    }

    StatusCode::NO_CONTENT.into_response()
}

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/favorite",
    tag = "recipes",
    params(("id" = Uuid, Path, description = "Recipe ID")),
    responses(
        (status = 201, description = "Recipe added to favourites", body = RecipeShort),
        (status = 400, description = "Already in favourites", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("user_id" = []))
)]
pub async fn add_favorite(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    save_recipe(&pool, user.id, id, SavePurpose::Favourite)
}

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/favorite",
    tag = "recipes",
    params(("id" = Uuid, Path, description = "Recipe ID")),
    responses(
        (status = 204, description = "Recipe removed from favourites"),
        (status = 404, description = "Recipe is not in favourites", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("user_id" = []))
)]
pub async fn remove_favorite(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    unsave_recipe(&pool, user.id, id, SavePurpose::Favourite)
}

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/shopping_cart",
    tag = "recipes",
    params(("id" = Uuid, Path, description = "Recipe ID")),
    responses(
        (status = 201, description = "Recipe added to the shopping list", body = RecipeShort),
        (status = 400, description = "Already on the shopping list", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("user_id" = []))
)]
pub async fn add_to_shopping_cart(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    save_recipe(&pool, user.id, id, SavePurpose::ShoppingList)
}

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/shopping_cart",
    tag = "recipes",
    params(("id" = Uuid, Path, description = "Recipe ID")),
    responses(
        (status = 204, description = "Recipe removed from the shopping list"),
        (status = 404, description = "Recipe is not on the shopping list", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("user_id" = []))
)]
pub async fn remove_from_shopping_cart(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    unsave_recipe(&pool, user.id, id, SavePurpose::ShoppingList)
}
