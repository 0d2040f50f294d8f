//! Borrow and return endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        book::BorrowedCopyInfo,
        borrowing::{BorrowingResult, ReturnResult},
    },
};

use super::{ApiKey, BorrowerId};

/// Response for a successful borrow
#[derive(Serialize, ToSchema)]
pub struct BorrowResponse {
    pub message: String,
    pub borrowing_details: BorrowingResult,
}

/// Response for a successful return
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    pub message: String,
    pub return_details: ReturnResult,
}

/// Borrow a specific copy for the user given in the x-user-id header
#[utoipa::path(
    post,
    path = "/copies/{id}/borrow",
    tag = "borrowings",
    security(("api_key" = [])),
    params(
        ("id" = i32, Path, description = "Copy ID"),
        ("x-user-id" = i32, Header, description = "ID of the borrowing user")
    ),
    responses(
        (status = 200, description = "Copy borrowed", body = BorrowResponse),
        (status = 400, description = "Missing or malformed x-user-id header"),
        (status = 404, description = "Copy or user not found"),
        (status = 409, description = "Copy not available")
    )
)]
pub async fn borrow_copy(
    State(state): State<crate::AppState>,
    _auth: ApiKey,
    BorrowerId(user_id): BorrowerId,
    Path(id): Path<i32>,
) -> AppResult<Json<BorrowResponse>> {
    let details = state.services.borrowings.borrow(id, user_id).await?;
    Ok(Json(BorrowResponse {
        message: "Copy borrowed successfully".to_string(),
        borrowing_details: details,
    }))
}

/// Return a borrowed copy
#[utoipa::path(
    post,
    path = "/copies/{id}/return",
    tag = "borrowings",
    security(("api_key" = [])),
    params(
        ("id" = i32, Path, description = "Copy ID")
    ),
    responses(
        (status = 200, description = "Copy returned", body = ReturnResponse),
        (status = 404, description = "No active borrowing for the copy")
    )
)]
pub async fn return_copy(
    State(state): State<crate::AppState>,
    _auth: ApiKey,
    Path(id): Path<i32>,
) -> AppResult<Json<ReturnResponse>> {
    let details = state.services.borrowings.return_copy(id).await?;
    Ok(Json(ReturnResponse {
        message: "Book returned successfully".to_string(),
        return_details: details,
    }))
}

/// List open borrowings past their due date
#[utoipa::path(
    get,
    path = "/borrowings/overdue",
    tag = "borrowings",
    security(("api_key" = [])),
    responses(
        (status = 200, description = "Overdue borrowings", body = Vec<BorrowedCopyInfo>),
        (status = 401, description = "Missing or invalid API key")
    )
)]
pub async fn list_overdue(
    State(state): State<crate::AppState>,
    _auth: ApiKey,
) -> AppResult<Json<Vec<BorrowedCopyInfo>>> {
    let overdue = state.services.borrowings.list_overdue().await?;
    Ok(Json(overdue))
}
