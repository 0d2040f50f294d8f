//! Borrowing lifecycle service

use chrono::{Duration, Utc};

use crate::{
    config::LoansConfig,
    error::AppResult,
    models::{
        book::BorrowedCopyInfo,
        borrowing::{BorrowingResult, ReturnResult},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BorrowingsService {
    repository: Repository,
    period_days: i64,
}

impl BorrowingsService {
    pub fn new(repository: Repository, loans_config: LoansConfig) -> Self {
        Self {
            repository,
            period_days: loans_config.period_days,
        }
    }

    /// Borrow a copy for a user
    pub async fn borrow(&self, copy_id: i32, user_id: i32) -> AppResult<BorrowingResult> {
        // Verify user exists
        self.repository.users.get_by_id(user_id).await?;

        let borrowed_at = Utc::now().date_naive();
        let due_date = borrowed_at + Duration::days(self.period_days);

        let result = self
            .repository
            .borrowings
            .borrow(copy_id, user_id, borrowed_at, due_date)
            .await?;

        tracing::info!(
            "User {} borrowed copy {} (due {})",
            user_id,
            copy_id,
            result.due_date
        );
        Ok(result)
    }

    /// Return a copy, closing its open borrowing
    pub async fn return_copy(&self, copy_id: i32) -> AppResult<ReturnResult> {
        let returned_at = Utc::now().date_naive();
        let result = self.repository.borrowings.return_copy(copy_id, returned_at).await?;

        tracing::info!("Copy {} returned (borrowing {})", copy_id, result.borrowing_id);
        Ok(result)
    }

    /// Get all open borrowings past their due date
    pub async fn list_overdue(&self) -> AppResult<Vec<BorrowedCopyInfo>> {
        let today = Utc::now().date_naive();
        let rows = self.repository.borrowings.list_overdue(today).await?;

        Ok(rows
            .into_iter()
            .map(|row| BorrowedCopyInfo::from_row(row, today))
            .collect())
    }
}
