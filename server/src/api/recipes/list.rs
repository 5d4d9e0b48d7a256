use super::saved::{load_flags, SavedFlags};
use crate::api::users::{load_users, UserResponse};
use crate::api::{error_response, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Tag;
use crate::schema::{recipe_tags, recipes, saved_recipes, tags};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use foodgram_core::SavePurpose;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListRecipesParams {
    /// Number of items to return (default: 20, max: 100)
    pub limit: Option<i64>,
    /// Number of items to skip (default: 0)
    pub offset: Option<i64>,
    /// Comma-separated tag slugs; a recipe matches if it has any of them
    pub tags: Option<String>,
    /// Only recipes by this author
    pub author: Option<Uuid>,
    /// `1` or `true` to list only the caller's favourites
    pub is_favorited: Option<String>,
    /// `1` or `true` to list only recipes on the caller's shopping list
    pub is_in_shopping_cart: Option<String>,
}

/// Split a comma-separated slug list, dropping blanks and repeats.
fn parse_tags(raw: &str) -> Vec<String> {
    let mut slugs: Vec<String> = Vec::new();
    for slug in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !slugs.iter().any(|s| s == slug) {
            slugs.push(slug.to_string());
        }
    }
    slugs
}

/// Boolean query flags are only switched on by `1` or `true`.
fn parse_flag(raw: Option<&str>) -> bool {
    matches!(raw.map(str::trim), Some(v) if v == "1" || v.eq_ignore_ascii_case("true"))
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationMetadata {
    /// Total number of items available
    pub total: i64,
    /// Number of items requested (limit)
    pub limit: i64,
    /// Number of items skipped (offset)
    pub offset: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeSummary {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub text: String,
    pub cooking_time: i32,
    pub author: Option<UserResponse>,
    pub tags: Vec<Tag>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListRecipesResponse {
    pub recipes: Vec<RecipeSummary>,
    pub pagination: PaginationMetadata,
}

#[derive(Queryable)]
struct RecipeForList {
    id: Uuid,
    author_id: Uuid,
    name: String,
    image: Option<String>,
    text: String,
    cooking_time: i32,
    /// Total count of all matching rows (from window function)
    total_count: i64,
}

/// Tags of each recipe in `recipe_ids`, ordered by tag name.
pub fn load_tags(
    conn: &mut PgConnection,
    recipe_ids: &[Uuid],
) -> QueryResult<HashMap<Uuid, Vec<Tag>>> {
    if recipe_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(Uuid, Tag)> = recipe_tags::table
        .inner_join(tags::table)
        .filter(recipe_tags::recipe_id.eq_any(recipe_ids))
        .order(tags::name.asc())
        .select((recipe_tags::recipe_id, Tag::as_select()))
        .load(conn)?;

    let mut by_recipe: HashMap<Uuid, Vec<Tag>> = HashMap::new();
    for (recipe_id, tag) in rows {
        by_recipe.entry(recipe_id).or_default().push(tag);
    }
    Ok(by_recipe)
}

/// Everything a recipe card shows besides its own columns.
pub struct Related {
    pub tags: HashMap<Uuid, Vec<Tag>>,
    pub flags: HashMap<Uuid, SavedFlags>,
    pub authors: HashMap<Uuid, UserResponse>,
}

pub fn load_related(
    conn: &mut PgConnection,
    viewer_id: Uuid,
    recipe_ids: &[Uuid],
    author_ids: &[Uuid],
) -> QueryResult<Related> {
    Ok(Related {
        tags: load_tags(conn, recipe_ids)?,
        flags: load_flags(conn, viewer_id, recipe_ids)?,
        authors: load_users(conn, viewer_id, author_ids)?,
    })
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "recipes",
    params(ListRecipesParams),
    responses(
        (status = 200, description = "Filtered page of recipes", body = ListRecipesResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("user_id" = []))
)]
pub async fn list_recipes(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Query(params): Query<ListRecipesParams>,
) -> impl IntoResponse {
    // Validate and set defaults for pagination
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let offset = params.offset.unwrap_or(0).max(0);

    let slugs = params.tags.as_deref().map(parse_tags).unwrap_or_default();
    let only_favourites = parse_flag(params.is_favorited.as_deref());
    let only_shopping_list = parse_flag(params.is_in_shopping_cart.as_deref());

    let mut conn = get_conn!(pool);

    let mut query = recipes::table.into_boxed();

    if let Some(author_id) = params.author {
        query = query.filter(recipes::author_id.eq(author_id));
    }

    // Any-of match on tag slugs
    if !slugs.is_empty() {
        query = query.filter(
            recipes::id.eq_any(
                recipe_tags::table
                    .inner_join(tags::table)
                    .filter(tags::slug.eq_any(slugs))
                    .select(recipe_tags::recipe_id),
            ),
        );
    }

    let purposes = [
        (only_favourites, SavePurpose::Favourite),
        (only_shopping_list, SavePurpose::ShoppingList),
    ];
    for (enabled, purpose) in purposes {
        if enabled {
            query = query.filter(
                recipes::id.eq_any(
                    saved_recipes::table
                        .filter(saved_recipes::user_id.eq(user.id))
                        .filter(saved_recipes::purpose.eq(purpose.as_str()))
                        .select(saved_recipes::recipe_id),
                ),
            );
        }
    }

    // Get paginated results with total count using window function
    let results: Vec<RecipeForList> = match query
        .order((recipes::name.desc(), recipes::id.asc()))
        .select((
            recipes::id,
            recipes::author_id,
            recipes::name,
            recipes::image,
            recipes::text,
            recipes::cooking_time,
            sql::<BigInt>("COUNT(*) OVER()"),
        ))
        .limit(limit)
        .offset(offset)
        .load(&mut conn)
    {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Failed to fetch recipes: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch recipes");
        }
    };

    // Extract total from first result, or 0 if no results
    let total = results.first().map(|r| r.total_count).unwrap_or(0);

    let recipe_ids: Vec<Uuid> = results.iter().map(|r| r.id).collect();
    let mut author_ids: Vec<Uuid> = results.iter().map(|r| r.author_id).collect();
    author_ids.sort_unstable();
    author_ids.dedup();

    let mut related = match load_related(&mut conn, user.id, &recipe_ids, &author_ids) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Failed to fetch recipe details: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch recipes");
        }
    };

    let recipes = results
        .into_iter()
        .map(|r| {
            let SavedFlags {
                is_favorited,
                is_in_shopping_cart,
            } = related.flags.get(&r.id).copied().unwrap_or_default();

            RecipeSummary {
                id: r.id,
                author: related.authors.get(&r.author_id).cloned(),
                tags: related.tags.remove(&r.id).unwrap_or_default(),
                name: r.name,
                image: r.image,
                text: r.text,
                cooking_time: r.cooking_time,
                is_favorited,
                is_in_shopping_cart,
            }
        })
        .collect();

    (
        StatusCode::OK,
        Json(ListRecipesResponse {
            recipes,
            pagination: PaginationMetadata {
                total,
                limit,
                offset,
            },
        }),
    )
        .into_response()
}
