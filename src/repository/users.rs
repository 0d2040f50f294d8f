//! Users repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateUser, User},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get users, newest first, optionally restricted to active ones
    pub async fn list(&self, active_only: bool) -> AppResult<Vec<User>> {
        let users = if active_only {
            sqlx::query_as::<_, User>(
                r#"
                SELECT id, username, email, first_name, last_name, phone, active, created_at
                FROM users
                WHERE active = true
                ORDER BY id DESC
                "#,
            )
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, User>(
                r#"
                SELECT id, username, email, first_name, last_name, phone, active, created_at
                FROM users
                ORDER BY id DESC
                "#,
            )
            .fetch_all(&self.pool)
            .await?
        };
        Ok(users)
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, first_name, last_name, phone, active, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Check if username already exists
    pub async fn username_exists(&self, username: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(username) = LOWER($1) AND id != $2)",
            )
            .bind(username)
            .bind(id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(username) = LOWER($1))")
                .bind(username)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Check if email already exists
    pub async fn email_exists(&self, email: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1) AND id != $2)",
            )
            .bind(email)
            .bind(id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
                .bind(email)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Create a new user
    pub async fn create(&self, user: &CreateUser) -> AppResult<User> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, first_name, last_name, phone)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, email, first_name, last_name, phone, active, created_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Update an existing user
    pub async fn update(&self, id: i32, user: &UpdateUser) -> AppResult<User> {
        // Build dynamic update query
        let mut sets: Vec<String> = Vec::new();
        let mut param_idx = 1;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, param_idx));
                    param_idx += 1;
                }
            };
        }

        add_field!(user.username, "username");
        add_field!(user.email, "email");
        add_field!(user.first_name, "first_name");
        add_field!(user.last_name, "last_name");
        add_field!(user.phone, "phone");
        add_field!(user.active, "active");

        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!("UPDATE users SET {} WHERE id = ${}", sets.join(", "), param_idx);

        let mut builder = sqlx::query(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(user.username);
        bind_field!(user.email);
        bind_field!(user.first_name);
        bind_field!(user.last_name);
        bind_field!(user.phone);
        bind_field!(user.active);

        builder = builder.bind(id);

        builder.execute(&self.pool).await?;

        self.get_by_id(id).await
    }
}
