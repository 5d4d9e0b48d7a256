use crate::api::ErrorResponse;
use crate::db::DbPool;
use crate::models::User;
use crate::schema::users;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use diesel::prelude::*;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Header carrying the id of the user the authentication proxy has already verified.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor that resolves the authenticated user for a request.
///
/// Credentials are checked upstream; this only trusts the forwarded user id and
/// makes sure it names an existing account.
/// ```ignore
/// async fn my_handler(AuthUser(user): AuthUser) -> impl IntoResponse {
///     // user is the caller's User row
/// }
/// ```
pub struct AuthUser(pub User);

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing X-User-Id header")]
    MissingHeader,
    #[error("Invalid X-User-Id header")]
    InvalidHeader,
    #[error("Unknown user")]
    UnknownUser,
    #[error("Failed to look up user")]
    Lookup,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::Lookup => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        };

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

fn parse_user_id(parts: &Parts) -> Result<Uuid, AuthError> {
    let value = parts
        .headers
        .get(USER_ID_HEADER)
        .ok_or(AuthError::MissingHeader)?;

    let value = value.to_str().map_err(|_| AuthError::InvalidHeader)?;

    Uuid::parse_str(value.trim()).map_err(|_| AuthError::InvalidHeader)
}

fn load_user(pool: &DbPool, user_id: Uuid) -> Result<User, AuthError> {
    let mut conn = pool.get().map_err(|e| {
        tracing::error!("Failed to get database connection: {}", e);
        AuthError::Lookup
    })?;

    users::table
        .filter(users::id.eq(user_id))
        .select(User::as_select())
        .first(&mut conn)
        .optional()
        .map_err(|e| {
            tracing::error!("Failed to load user {}: {}", user_id, e);
            AuthError::Lookup
        })?
        .ok_or(AuthError::UnknownUser)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<DbPool>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parse_user_id(parts)?;
        let pool = Arc::<DbPool>::from_ref(state);

        load_user(&pool, user_id).map(AuthUser)
    }
}
