use super::UserResponse;
use crate::api::{error_response, guard_rejection, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{NewFollow, RecipeShort, User};
use crate::schema::{follows, recipes, users};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use foodgram_core::{guards, GuardError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RecipesLimitParams {
    /// Maximum number of the author's recipes to embed (default: all)
    pub recipes_limit: Option<i64>,
}

/// A followed author together with a preview of their recipes.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubscriptionResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub recipes: Vec<RecipeShort>,
    pub recipes_count: i64,
}

impl SubscriptionResponse {
    fn new(author: UserResponse, recipes: Vec<RecipeShort>, recipes_count: i64) -> Self {
        Self {
            id: author.id,
            email: author.email,
            username: author.username,
            first_name: author.first_name,
            last_name: author.last_name,
            is_subscribed: author.is_subscribed,
            recipes,
            recipes_count,
        }
    }
}

/// Negative limits are treated as "no recipes", not as an error.
pub(crate) fn clamp_recipes_limit(limit: Option<i64>) -> Option<i64> {
    limit.map(|l| l.max(0))
}

/// Build the subscription card for an author the caller follows.
pub(crate) fn subscription_card(
    conn: &mut PgConnection,
    author: User,
    recipes_limit: Option<i64>,
) -> QueryResult<SubscriptionResponse> {
    let recipes_count: i64 = recipes::table
        .filter(recipes::author_id.eq(author.id))
        .select(count_star())
        .first(conn)?;

    let mut query = recipes::table
        .filter(recipes::author_id.eq(author.id))
        .select(RecipeShort::as_select())
        .order(recipes::created_at.desc())
        .into_boxed();

    if let Some(limit) = clamp_recipes_limit(recipes_limit) {
        query = query.limit(limit);
    }

    let recipes = query.load(conn)?;

    Ok(SubscriptionResponse::new(
        UserResponse::new(author, true),
        recipes,
        recipes_count,
    ))
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/subscribe",
    tag = "users",
    params(
        ("id" = Uuid, Path, description = "Author ID"),
        RecipesLimitParams
    ),
    responses(
        (status = 201, description = "Subscribed to the author", body = SubscriptionResponse),
        (status = 400, description = "Subscribing to yourself or already subscribed", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("user_id" = []))
)]
pub async fn subscribe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
    Query(params): Query<RecipesLimitParams>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let author: User = match users::table
        .filter(users::id.eq(id))
        .select(User::as_select())
        .first(&mut conn)
        .optional()
    {
        Ok(Some(u)) => u,
        Ok(None) => return error_response(StatusCode::NOT_FOUND, "User not found"),
        Err(e) => {
            tracing::error!("Failed to fetch user {}: {}", id, e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch user");
        }
    };

    let already_following = match diesel::select(diesel::dsl::exists(
        follows::table
            .filter(follows::user_id.eq(user.id))
            .filter(follows::author_id.eq(author.id)),
    ))
    .get_result::<bool>(&mut conn)
    {
        Ok(exists) => exists,
        Err(e) => {
            tracing::error!("Failed to check subscription: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to subscribe");
        }
    };

    if let Err(rejection) = guards::can_follow(user.id, author.id, already_following) {
        return guard_rejection(rejection);
    }

    let inserted = diesel::insert_into(follows::table)
        .values(NewFollow {
            user_id: user.id,
            author_id: author.id,
        })
        .execute(&mut conn);

    match inserted {
        Ok(_) => {}
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            return guard_rejection(GuardError::AlreadyFollowing);
        }
        Err(e) => {
            tracing::error!("Failed to subscribe {} to {}: {}", user.id, author.id, e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to subscribe");
        }
    }

    tracing::info!(follower = %user.id, author = %author.id, "New subscription");

    match subscription_card(&mut conn, author, params.recipes_limit) {
        Ok(card) => (StatusCode::CREATED, Json(card)).into_response(),
        Err(e) => {
            tracing::error!("Failed to load subscription for {}: {}", id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load subscription")
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}/subscribe",
    tag = "users",
    params(("id" = Uuid, Path, description = "Author ID")),
    responses(
        (status = 204, description = "Unsubscribed"),
        (status = 404, description = "Not subscribed to this user", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("user_id" = []))
)]
pub async fn unsubscribe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let deleted = diesel::delete(
        follows::table
            .filter(follows::user_id.eq(user.id))
            .filter(follows::author_id.eq(id)),
    )
    .execute(&mut conn);

    match deleted {
        Ok(0) => error_response(StatusCode::NOT_FOUND, "You are not subscribed to this user"),
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            tracing::error!("Failed to unsubscribe {} from {}: {}", user.id, id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to unsubscribe")
        }
    }
}
