pub mod me;
pub mod subscribe;
pub mod subscriptions;

use crate::models::User;
use crate::schema::{follows, users};
use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use diesel::prelude::*;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

/// Public view of an account, as seen by the caller.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Whether the caller follows this user
    pub is_subscribed: bool,
}

impl UserResponse {
    pub fn new(user: User, is_subscribed: bool) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
        }
    }
}

/// Ids among `author_ids` that `viewer_id` follows.
pub fn followed_among(
    conn: &mut PgConnection,
    viewer_id: Uuid,
    author_ids: &[Uuid],
) -> QueryResult<HashSet<Uuid>> {
    if author_ids.is_empty() {
        return Ok(HashSet::new());
    }

    let ids: Vec<Uuid> = follows::table
        .filter(follows::user_id.eq(viewer_id))
        .filter(follows::author_id.eq_any(author_ids))
        .select(follows::author_id)
        .load(conn)?;

    Ok(ids.into_iter().collect())
}

/// Load the given users keyed by id, with `is_subscribed` resolved for `viewer_id`.
pub fn load_users(
    conn: &mut PgConnection,
    viewer_id: Uuid,
    user_ids: &[Uuid],
) -> QueryResult<HashMap<Uuid, UserResponse>> {
    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<User> = users::table
        .filter(users::id.eq_any(user_ids))
        .select(User::as_select())
        .load(conn)?;
    let followed = followed_among(conn, viewer_id, user_ids)?;

    Ok(rows
        .into_iter()
        .map(|u| {
            let is_subscribed = followed.contains(&u.id);
            (u.id, UserResponse::new(u, is_subscribed))
        })
        .collect())
}

/// Returns the router for /api/users endpoints (mounted at /api/users)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me::get_me))
        .route("/subscriptions", get(subscriptions::list_subscriptions))
        .route(
            "/{id}/subscribe",
            post(subscribe::subscribe).delete(subscribe::unsubscribe),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        me::get_me,
        subscribe::subscribe,
        subscribe::unsubscribe,
        subscriptions::list_subscriptions,
    ),
    components(schemas(
        UserResponse,
        subscribe::SubscriptionResponse,
        subscriptions::SubscriptionsResponse,
    ))
)]
pub struct ApiDoc;
