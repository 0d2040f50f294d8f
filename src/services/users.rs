//! User management service

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{
        borrowing::BorrowingHistoryEntry,
        user::{CreateUser, UpdateUser, User},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get users, active ones only unless asked otherwise
    pub async fn list_users(&self, active_only: bool) -> AppResult<Vec<User>> {
        self.repository.users.list(active_only).await
    }

    /// Get user by ID
    pub async fn get_user(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Create a new user
    pub async fn create_user(&self, user: CreateUser) -> AppResult<User> {
        if self.repository.users.username_exists(&user.username, None).await? {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }
        if self.repository.users.email_exists(&user.email, None).await? {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let created = self.repository.users.create(&user).await?;
        tracing::info!("Created user '{}' with id {}", created.username, created.id);
        Ok(created)
    }

    /// Update an existing user.
    ///
    /// Deactivation is refused while the user still has open borrowings.
    pub async fn update_user(&self, id: i32, user: UpdateUser) -> AppResult<User> {
        // Verify user exists
        self.repository.users.get_by_id(id).await?;

        if let Some(ref username) = user.username {
            if self.repository.users.username_exists(username, Some(id)).await? {
                return Err(AppError::Conflict("Username already exists".to_string()));
            }
        }
        if let Some(ref email) = user.email {
            if self.repository.users.email_exists(email, Some(id)).await? {
                return Err(AppError::Conflict("Email already exists".to_string()));
            }
        }

        if user.active == Some(false) {
            let open = self.repository.borrowings.count_open_for_user(id).await?;
            if open > 0 {
                return Err(AppError::Conflict(format!(
                    "User has {} active borrowing(s). All books must be returned before deactivation.",
                    open
                )));
            }
        }

        self.repository.users.update(id, &user).await
    }

    /// Get a user's borrowing history, newest first
    pub async fn user_history(&self, user_id: i32) -> AppResult<Vec<BorrowingHistoryEntry>> {
        // Verify user exists
        self.repository.users.get_by_id(user_id).await?;

        let rows = self.repository.borrowings.user_history(user_id).await?;
        let today = Utc::now().date_naive();

        Ok(rows
            .into_iter()
            .map(|row| BorrowingHistoryEntry::from_row(row, today))
            .collect())
    }
}
