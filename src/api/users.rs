//! User management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        borrowing::BorrowingHistoryEntry,
        user::{CreateUser, UpdateUser, UserQuery, UserResponse},
    },
};

use super::ApiKey;

/// Response for a successful user creation
#[derive(Serialize, ToSchema)]
pub struct UserCreatedResponse {
    pub message: String,
    pub user: UserResponse,
}

/// List users, active ones by default
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("api_key" = [])),
    params(
        ("active_only" = Option<bool>, Query, description = "Only list active users (default true)")
    ),
    responses(
        (status = 200, description = "List of users", body = Vec<UserResponse>),
        (status = 401, description = "Missing or invalid API key")
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    _auth: ApiKey,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state
        .services
        .users
        .list_users(query.active_only.unwrap_or(true))
        .await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Get user details by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("api_key" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User details", body = UserResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<crate::AppState>,
    _auth: ApiKey,
    Path(id): Path<i32>,
) -> AppResult<Json<UserResponse>> {
    let user = state.services.users.get_user(id).await?;
    Ok(Json(user.into()))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    security(("api_key" = [])),
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = UserCreatedResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Username or email already exists")
    )
)]
pub async fn create_user(
    State(state): State<crate::AppState>,
    _auth: ApiKey,
    Json(user): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<UserCreatedResponse>)> {
    user.validate()?;

    let created = state.services.users.create_user(user).await?;
    Ok((
        StatusCode::CREATED,
        Json(UserCreatedResponse {
            message: "User created successfully".to_string(),
            user: created.into(),
        }),
    ))
}

/// Update an existing user
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    security(("api_key" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 404, description = "User not found"),
        (status = 409, description = "Username or email already exists, or open borrowings block deactivation")
    )
)]
pub async fn update_user(
    State(state): State<crate::AppState>,
    _auth: ApiKey,
    Path(id): Path<i32>,
    Json(user): Json<UpdateUser>,
) -> AppResult<Json<UserResponse>> {
    user.validate()?;

    let updated = state.services.users.update_user(id, user).await?;
    Ok(Json(updated.into()))
}

/// Get a user's borrowing history, newest first
#[utoipa::path(
    get,
    path = "/users/{id}/borrowings",
    tag = "users",
    security(("api_key" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Borrowing history", body = Vec<BorrowingHistoryEntry>),
        (status = 404, description = "User not found")
    )
)]
pub async fn user_borrowings(
    State(state): State<crate::AppState>,
    _auth: ApiKey,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<BorrowingHistoryEntry>>> {
    let history = state.services.users.user_history(id).await?;
    Ok(Json(history))
}
