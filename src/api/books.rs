//! Book and copy management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        book::{BookWithCopies, CreateBook},
        copy::{BookCopy, UpdateCopyStatus},
    },
};

use super::ApiKey;

/// Response for a successful book creation
#[derive(Serialize, ToSchema)]
pub struct BookCreatedResponse {
    pub message: String,
    pub book: BookWithCopies,
}

/// List all books with availability details
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("api_key" = [])),
    responses(
        (status = 200, description = "List of books", body = Vec<BookWithCopies>),
        (status = 401, description = "Missing or invalid API key")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    _auth: ApiKey,
) -> AppResult<Json<Vec<BookWithCopies>>> {
    let books = state.services.catalog.list_books().await?;
    Ok(Json(books))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("api_key" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookWithCopies),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    _auth: ApiKey,
    Path(id): Path<i32>,
) -> AppResult<Json<BookWithCopies>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Create a new book with its initial copies
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("api_key" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = BookCreatedResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "ISBN already exists")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    _auth: ApiKey,
    Json(book): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<BookCreatedResponse>)> {
    book.validate()?;

    let created = state.services.catalog.create_book(book).await?;
    let message = format!(
        "Book '{}' created successfully with {} copies",
        created.title, created.total_copies
    );

    Ok((
        StatusCode::CREATED,
        Json(BookCreatedResponse {
            message,
            book: created,
        }),
    ))
}

/// Delete a book together with its copies and their borrowings
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("api_key" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    _auth: ApiKey,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List all copies of a book
#[utoipa::path(
    get,
    path = "/books/{id}/copies",
    tag = "books",
    security(("api_key" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Copies of the book", body = Vec<BookCopy>),
        (status = 404, description = "Book not found")
    )
)]
pub async fn list_copies(
    State(state): State<crate::AppState>,
    _auth: ApiKey,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<BookCopy>>> {
    let copies = state.services.catalog.list_copies(id).await?;
    Ok(Json(copies))
}

/// Add one copy to an existing book
#[utoipa::path(
    post,
    path = "/books/{id}/copies",
    tag = "books",
    security(("api_key" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 201, description = "Copy created", body = BookCopy),
        (status = 404, description = "Book not found")
    )
)]
pub async fn add_copy(
    State(state): State<crate::AppState>,
    _auth: ApiKey,
    Path(id): Path<i32>,
) -> AppResult<(StatusCode, Json<BookCopy>)> {
    let copy = state.services.catalog.add_copy(id).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

/// Set a copy's status (damaged, lost, or back to available)
#[utoipa::path(
    put,
    path = "/copies/{id}/status",
    tag = "books",
    security(("api_key" = [])),
    params(
        ("id" = i32, Path, description = "Copy ID")
    ),
    request_body = UpdateCopyStatus,
    responses(
        (status = 200, description = "Copy updated", body = BookCopy),
        (status = 400, description = "Status not settable directly"),
        (status = 404, description = "Copy not found"),
        (status = 409, description = "Copy has an open borrowing")
    )
)]
pub async fn update_copy_status(
    State(state): State<crate::AppState>,
    _auth: ApiKey,
    Path(id): Path<i32>,
    Json(update): Json<UpdateCopyStatus>,
) -> AppResult<Json<BookCopy>> {
    let copy = state.services.catalog.set_copy_status(id, update.status).await?;
    Ok(Json(copy))
}
