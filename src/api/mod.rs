//! API handlers for Biblio REST endpoints

pub mod books;
pub mod borrowings;
pub mod health;
pub mod openapi;
pub mod users;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use subtle::ConstantTimeEq;

use crate::{error::AppError, AppState};

/// Extractor enforcing the X-API-Key header on protected routes
pub struct ApiKey;

#[async_trait]
impl FromRequestParts<AppState> for ApiKey {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let provided = parts
            .headers
            .get("x-api-key")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("API Key required".to_string()))?;

        // Constant-time comparison of the configured key
        let matches: bool = provided
            .as_bytes()
            .ct_eq(state.config.auth.api_key.as_bytes())
            .into();

        if !matches {
            return Err(AppError::Unauthorized("Invalid API Key".to_string()));
        }

        Ok(ApiKey)
    }
}

/// Extractor for the x-user-id header identifying the borrower
pub struct BorrowerId(pub i32);

#[async_trait]
impl FromRequestParts<AppState> for BorrowerId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::BadRequest("Missing x-user-id header".to_string()))?;

        let user_id = value
            .parse::<i32>()
            .map_err(|_| AppError::BadRequest("x-user-id header must be an integer".to_string()))?;

        Ok(BorrowerId(user_id))
    }
}
