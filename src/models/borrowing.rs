//! Borrowing (loan) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Result of a successful borrow operation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowingResult {
    pub borrowing_id: i32,
    pub copy_id: i32,
    pub borrowed_at: NaiveDate,
    pub due_date: NaiveDate,
}

/// Result of a successful return operation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReturnResult {
    pub borrowing_id: i32,
    pub copy_id: i32,
    pub returned_at: NaiveDate,
}

/// Internal row structure for borrowing history queries
#[derive(Debug, Clone, FromRow)]
pub struct BorrowingHistoryRow {
    pub book_title: String,
    pub borrowed_at: NaiveDate,
    pub due_date: NaiveDate,
    pub returned_at: Option<NaiveDate>,
}

/// One entry of a user's borrowing history
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowingHistoryEntry {
    pub book_title: String,
    pub borrowed_at: NaiveDate,
    pub due_date: NaiveDate,
    pub returned_at: Option<NaiveDate>,
    pub is_active: bool,
    pub is_overdue: bool,
}

impl BorrowingHistoryEntry {
    /// Build the API representation, computing the date-dependent fields
    /// against the given day
    pub fn from_row(row: BorrowingHistoryRow, today: NaiveDate) -> Self {
        let is_active = row.returned_at.is_none();
        BorrowingHistoryEntry {
            is_active,
            is_overdue: is_active && row.due_date < today,
            book_title: row.book_title,
            borrowed_at: row.borrowed_at,
            due_date: row.due_date,
            returned_at: row.returned_at,
        }
    }
}
