//! OpenAPI documentation

use axum::Router;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, borrowings, health, users};

/// Registers the X-API-Key header security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "api_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-API-Key"))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Biblio API",
        version = "0.1.0",
        description = "Library loan tracking REST API",
        license(name = "MIT")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        // Books and copies
        books::list_books,
        books::get_book,
        books::create_book,
        books::delete_book,
        books::list_copies,
        books::add_copy,
        books::update_copy_status,
        // Borrowings
        borrowings::borrow_copy,
        borrowings::return_copy,
        borrowings::list_overdue,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::user_borrowings,
    ),
    components(
        schemas(
            // Books and copies
            crate::models::book::Book,
            crate::models::book::BookWithCopies,
            crate::models::book::BorrowedCopyInfo,
            crate::models::book::CreateBook,
            crate::models::copy::BookCopy,
            crate::models::copy::CopyStatus,
            crate::models::copy::UpdateCopyStatus,
            books::BookCreatedResponse,
            // Borrowings
            crate::models::borrowing::BorrowingResult,
            crate::models::borrowing::ReturnResult,
            crate::models::borrowing::BorrowingHistoryEntry,
            borrowings::BorrowResponse,
            borrowings::ReturnResponse,
            // Users
            crate::models::user::User,
            crate::models::user::UserResponse,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            crate::models::user::UserQuery,
            users::UserCreatedResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book and copy management"),
        (name = "borrowings", description = "Borrow and return lifecycle"),
        (name = "users", description = "User management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
