//! Book model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::copy::BookCopy;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub isbn: Option<String>,
    pub year_published: Option<i32>,
    pub created_at: NaiveDate,
}

/// Internal row structure for borrowed-copy queries
#[derive(Debug, Clone, FromRow)]
pub struct BorrowedCopyRow {
    pub copy_id: i32,
    pub book_id: i32,
    pub book_title: String,
    pub borrower_id: i32,
    pub borrower_first_name: String,
    pub borrower_last_name: String,
    pub borrower_email: String,
    pub borrowed_at: NaiveDate,
    pub due_date: NaiveDate,
}

/// A copy currently out on loan, with borrower details
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowedCopyInfo {
    pub copy_id: i32,
    pub book_title: String,
    pub borrower_id: i32,
    pub borrower_first_name: String,
    pub borrower_last_name: String,
    pub borrower_email: String,
    pub borrower_full_name: String,
    pub borrowed_at: NaiveDate,
    pub due_date: NaiveDate,
    pub is_overdue: bool,
    /// Days until due, negative once overdue
    pub days_until_due: i64,
}

impl BorrowedCopyInfo {
    /// Build the API representation, computing the date-dependent fields
    /// against the given day
    pub fn from_row(row: BorrowedCopyRow, today: NaiveDate) -> Self {
        BorrowedCopyInfo {
            copy_id: row.copy_id,
            borrower_full_name: format!("{} {}", row.borrower_first_name, row.borrower_last_name),
            is_overdue: row.due_date < today,
            days_until_due: (row.due_date - today).num_days(),
            book_title: row.book_title,
            borrower_id: row.borrower_id,
            borrower_first_name: row.borrower_first_name,
            borrower_last_name: row.borrower_last_name,
            borrower_email: row.borrower_email,
            borrowed_at: row.borrowed_at,
            due_date: row.due_date,
        }
    }
}

/// Book with full copy availability details
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookWithCopies {
    pub id: i32,
    pub title: String,
    pub isbn: Option<String>,
    pub year_published: Option<i32>,
    pub created_at: NaiveDate,
    pub available_copies: Vec<BookCopy>,
    pub borrowed_copies: Vec<BorrowedCopyInfo>,
    pub total_copies: usize,
    pub available_copies_count: usize,
    pub borrowed_copies_count: usize,
    pub is_available: bool,
    pub availability_status: String,
}

impl BookWithCopies {
    pub fn new(
        book: Book,
        available_copies: Vec<BookCopy>,
        borrowed_copies: Vec<BorrowedCopyInfo>,
    ) -> Self {
        let available = available_copies.len();
        let borrowed = borrowed_copies.len();
        let total = available + borrowed;

        let availability_status = if available == 0 {
            "Not available".to_string()
        } else if available == total {
            "Fully available".to_string()
        } else {
            format!("{} of {} available", available, total)
        };

        BookWithCopies {
            id: book.id,
            title: book.title,
            isbn: book.isbn,
            year_published: book.year_published,
            created_at: book.created_at,
            available_copies,
            borrowed_copies,
            total_copies: total,
            available_copies_count: available,
            borrowed_copies_count: borrowed,
            is_available: available > 0,
            availability_status,
        }
    }
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
    /// ISBN-13 (optional). When set, must be unique across books.
    #[validate(length(equal = 13, message = "ISBN must be exactly 13 characters"))]
    pub isbn: Option<String>,
    #[validate(range(min = 1000, max = 2030, message = "Publication year must be 1000-2030"))]
    pub year_published: Option<i32>,
    /// Number of copies to create alongside the book (0-50)
    #[validate(range(min = 0, max = 50, message = "Copies count must be 0-50"))]
    pub copies_count: Option<i32>,
}
