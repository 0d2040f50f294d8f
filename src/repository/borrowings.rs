//! Borrowings repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::BorrowedCopyRow,
        borrowing::{BorrowingHistoryRow, BorrowingResult, ReturnResult},
        copy::CopyStatus,
    },
};

#[derive(Clone)]
pub struct BorrowingsRepository {
    pool: Pool<Postgres>,
}

impl BorrowingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Borrow a copy for a user.
    ///
    /// The conditional status update claims the copy row (and its lock) in
    /// a single statement, so two concurrent borrows of the same copy can
    /// never both insert a borrowing.
    pub async fn borrow(
        &self,
        copy_id: i32,
        user_id: i32,
        borrowed_at: NaiveDate,
        due_date: NaiveDate,
    ) -> AppResult<BorrowingResult> {
        let mut tx = self.pool.begin().await?;

        let claimed = sqlx::query(
            "UPDATE copies SET status = 'borrowed' WHERE id = $1 AND status = 'available'",
        )
        .bind(copy_id)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            let status: Option<CopyStatus> =
                sqlx::query_scalar("SELECT status FROM copies WHERE id = $1")
                    .bind(copy_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            return match status {
                None => Err(AppError::NotFound(format!("Copy {} not found", copy_id))),
                Some(CopyStatus::Borrowed) => Err(AppError::Unavailable(format!(
                    "Copy {} is already borrowed",
                    copy_id
                ))),
                Some(status) => Err(AppError::Unavailable(format!(
                    "Copy {} is marked {} and cannot be borrowed",
                    copy_id, status
                ))),
            };
        }

        let borrowing_id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO borrowings (copy_id, user_id, borrowed_at, due_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(copy_id)
        .bind(user_id)
        .bind(borrowed_at)
        .bind(due_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(BorrowingResult {
            borrowing_id,
            copy_id,
            borrowed_at,
            due_date,
        })
    }

    /// Return a copy by closing its open borrowing.
    ///
    /// The copy flips back to available only from borrowed; a copy marked
    /// damaged or lost while on loan keeps that status.
    pub async fn return_copy(&self, copy_id: i32, returned_at: NaiveDate) -> AppResult<ReturnResult> {
        let mut tx = self.pool.begin().await?;

        let borrowing_id: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE borrowings
            SET returned_at = $1
            WHERE copy_id = $2 AND returned_at IS NULL
            RETURNING id
            "#,
        )
        .bind(returned_at)
        .bind(copy_id)
        .fetch_optional(&mut *tx)
        .await?;

        let borrowing_id = borrowing_id.ok_or_else(|| {
            AppError::NotFound(format!("No active borrowing found for copy {}", copy_id))
        })?;

        sqlx::query("UPDATE copies SET status = 'available' WHERE id = $1 AND status = 'borrowed'")
            .bind(copy_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(ReturnResult {
            borrowing_id,
            copy_id,
            returned_at,
        })
    }

    /// Get open borrowings past their due date, earliest due first
    pub async fn list_overdue(&self, today: NaiveDate) -> AppResult<Vec<BorrowedCopyRow>> {
        let rows = sqlx::query_as::<_, BorrowedCopyRow>(
            r#"
            SELECT br.copy_id, c.book_id, b.title AS book_title,
                   u.id AS borrower_id, u.first_name AS borrower_first_name,
                   u.last_name AS borrower_last_name, u.email AS borrower_email,
                   br.borrowed_at, br.due_date
            FROM borrowings br
            JOIN copies c ON br.copy_id = c.id
            JOIN users u ON br.user_id = u.id
            JOIN books b ON c.book_id = b.id
            WHERE br.returned_at IS NULL AND br.due_date < $1
            ORDER BY br.due_date
            "#,
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get a user's borrowing history, newest first
    pub async fn user_history(&self, user_id: i32) -> AppResult<Vec<BorrowingHistoryRow>> {
        let rows = sqlx::query_as::<_, BorrowingHistoryRow>(
            r#"
            SELECT b.title AS book_title, br.borrowed_at, br.due_date, br.returned_at
            FROM borrowings br
            JOIN copies c ON br.copy_id = c.id
            JOIN books b ON c.book_id = b.id
            WHERE br.user_id = $1
            ORDER BY br.borrowed_at DESC, br.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Count a user's open borrowings
    pub async fn count_open_for_user(&self, user_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrowings WHERE user_id = $1 AND returned_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Check whether a copy has an open borrowing
    pub async fn open_exists_for_copy(&self, copy_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM borrowings WHERE copy_id = $1 AND returned_at IS NULL)",
        )
        .bind(copy_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
