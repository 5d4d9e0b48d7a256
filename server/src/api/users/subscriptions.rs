use super::subscribe::{subscription_card, SubscriptionResponse};
use crate::api::recipes::list::PaginationMetadata;
use crate::api::{error_response, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::User;
use crate::schema::{follows, users};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListSubscriptionsParams {
    /// Number of authors to return (default: 20, max: 100)
    pub limit: Option<i64>,
    /// Number of authors to skip (default: 0)
    pub offset: Option<i64>,
    /// Maximum number of recipes embedded per author (default: all)
    pub recipes_limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubscriptionsResponse {
    pub subscriptions: Vec<SubscriptionResponse>,
    pub pagination: PaginationMetadata,
}

#[derive(Queryable)]
struct FollowedAuthor {
    id: Uuid,
    email: String,
    username: String,
    first_name: String,
    last_name: String,
    role: String,
    total_count: i64,
}

impl FollowedAuthor {
    fn into_user(self) -> User {
        User {
            id: self.id,
            email: self.email,
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            role: self.role,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/users/subscriptions",
    tag = "users",
    params(ListSubscriptionsParams),
    responses(
        (status = 200, description = "Authors the caller follows, with their recipes", body = SubscriptionsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("user_id" = []))
)]
pub async fn list_subscriptions(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Query(params): Query<ListSubscriptionsParams>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let offset = params.offset.unwrap_or(0).max(0);

    let mut conn = get_conn!(pool);

    let rows: Vec<FollowedAuthor> = match follows::table
        .inner_join(users::table.on(users::id.eq(follows::author_id)))
        .filter(follows::user_id.eq(user.id))
        .order(users::username.asc())
        .select((
            users::id,
            users::email,
            users::username,
            users::first_name,
            users::last_name,
            users::role,
            sql::<BigInt>("COUNT(*) OVER()"),
        ))
        .limit(limit)
        .offset(offset)
        .load(&mut conn)
    {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Failed to fetch subscriptions for {}: {}", user.id, e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch subscriptions",
            );
        }
    };

    let total = rows.first().map(|r| r.total_count).unwrap_or(0);

    let mut subscriptions = Vec::with_capacity(rows.len());
    for row in rows {
        match subscription_card(&mut conn, row.into_user(), params.recipes_limit) {
            Ok(card) => subscriptions.push(card),
            Err(e) => {
                tracing::error!("Failed to load subscription card: {}", e);
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fetch subscriptions",
                );
            }
        }
    }

    (
        StatusCode::OK,
        Json(SubscriptionsResponse {
            subscriptions,
            pagination: PaginationMetadata {
                total,
                limit,
                offset,
            },
        }),
    )
        .into_response()
}
