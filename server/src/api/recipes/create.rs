use crate::api::{error_response, guard_rejection, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{NewRecipe, NewRecipeIngredient, NewRecipeTag};
use crate::schema::{ingredients, recipe_ingredients, recipe_tags, recipes, tags};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::dsl::count_star;
use diesel::prelude::*;
use foodgram_core::{guards, DraftIngredient, RecipeDraft};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RecipeIngredientRequest {
    /// Ingredient ID
    pub id: Uuid,
    pub amount: i32,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRecipeRequest {
    pub name: String,
    pub text: String,
    /// Minutes
    pub cooking_time: i32,
    /// Stored image reference
    pub image: Option<String>,
    pub tags: Vec<Uuid>,
    pub ingredients: Vec<RecipeIngredientRequest>,
}

impl CreateRecipeRequest {
    fn draft(&self) -> RecipeDraft {
        RecipeDraft {
            name: self.name.trim().to_string(),
            text: self.text.clone(),
            cooking_time: self.cooking_time,
            tags: self.tags.clone(),
            ingredients: self
                .ingredients
                .iter()
                .map(|i| DraftIngredient {
                    id: i.id,
                    amount: i.amount,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateRecipeResponse {
    pub id: Uuid,
}

#[derive(Error, Debug)]
enum CreateError {
    #[error("Unknown tag")]
    UnknownTag,
    #[error("Unknown ingredient")]
    UnknownIngredient,
    #[error(transparent)]
    Db(#[from] diesel::result::Error),
}

fn insert_recipe(
    conn: &mut PgConnection,
    author_id: Uuid,
    image: Option<&str>,
    draft: &RecipeDraft,
) -> Result<Uuid, CreateError> {
    let known_tags: i64 = tags::table
        .filter(tags::id.eq_any(&draft.tags))
        .select(count_star())
        .first(conn)?;
    if known_tags as usize != draft.tags.len() {
        return Err(CreateError::UnknownTag);
    }

    let ingredient_ids: Vec<Uuid> = draft.ingredients.iter().map(|i| i.id).collect();
    let known_ingredients: i64 = ingredients::table
        .filter(ingredients::id.eq_any(&ingredient_ids))
        .select(count_star())
        .first(conn)?;
    if known_ingredients as usize != ingredient_ids.len() {
        return Err(CreateError::UnknownIngredient);
    }

    let recipe_id: Uuid = diesel::insert_into(recipes::table)
        .values(NewRecipe {
            author_id,
            name: &draft.name,
            image,
            text: &draft.text,
            cooking_time: draft.cooking_time,
        })
        .returning(recipes::id)
        .get_result(conn)?;

    let tag_rows: Vec<NewRecipeTag> = draft
        .tags
        .iter()
        .map(|&tag_id| NewRecipeTag { recipe_id, tag_id })
        .collect();
    diesel::insert_into(recipe_tags::table)
        .values(&tag_rows)
        .execute(conn)?;

    let ingredient_rows: Vec<NewRecipeIngredient> = draft
        .ingredients
        .iter()
        .map(|i| NewRecipeIngredient {
            recipe_id,
            ingredient_id: i.id,
            amount: i.amount,
        })
        .collect();
    diesel::insert_into(recipe_ingredients::table)
        .values(&ingredient_rows)
        .execute(conn)?;

    Ok(recipe_id)
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe created successfully", body = CreateRecipeResponse),
        (status = 400, description = "Invalid recipe, unknown tag or unknown ingredient", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("user_id" = []))
)]
pub async fn create_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Json(request): Json<CreateRecipeRequest>,
) -> impl IntoResponse {
    let draft = request.draft();
    if let Err(rejection) = guards::validate_recipe(&draft) {
        return guard_rejection(rejection);
    }

    let image = request
        .image
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let mut conn = get_conn!(pool);

    let result = conn.transaction(|conn| insert_recipe(conn, user.id, image, &draft));

    match result {
        Ok(recipe_id) => {
            tracing::info!(recipe = %recipe_id, author = %user.id, "Recipe created");
            (
                StatusCode::CREATED,
                Json(CreateRecipeResponse { id: recipe_id }),
            )
                .into_response()
        }
        Err(e @ (CreateError::UnknownTag | CreateError::UnknownIngredient)) => {
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(CreateError::Db(e)) => {
            tracing::error!("Failed to create recipe: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create recipe")
        }
    }
}
