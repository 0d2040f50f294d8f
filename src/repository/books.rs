//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BorrowedCopyRow, CreateBook},
        copy::{BookCopy, CopyStatus},
    },
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get all books, ordered by title
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT id, title, isbn, year_published, created_at FROM books ORDER BY title",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            "SELECT id, title, isbn, year_published, created_at FROM books WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Check if a book with the given ISBN already exists
    pub async fn isbn_exists(&self, isbn: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1)")
            .bind(isbn)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Create a new book together with its initial copies
    pub async fn create(&self, book: &CreateBook, copies_count: i32) -> AppResult<i32> {
        let mut tx = self.pool.begin().await?;

        let book_id: i32 = sqlx::query_scalar(
            "INSERT INTO books (title, isbn, year_published) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&book.title)
        .bind(&book.isbn)
        .bind(book.year_published)
        .fetch_one(&mut *tx)
        .await?;

        for _ in 0..copies_count {
            sqlx::query("INSERT INTO copies (book_id) VALUES ($1)")
                .bind(book_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(book_id)
    }

    /// Delete a book (copies and borrowings cascade)
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    /// Append one available copy to an existing book
    pub async fn add_copy(&self, book_id: i32) -> AppResult<BookCopy> {
        let copy = sqlx::query_as::<_, BookCopy>(
            "INSERT INTO copies (book_id) VALUES ($1) RETURNING id, book_id, status, created_at",
        )
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(copy)
    }

    /// Get all copies of a book, whatever their status
    pub async fn list_copies(&self, book_id: i32) -> AppResult<Vec<BookCopy>> {
        let copies = sqlx::query_as::<_, BookCopy>(
            "SELECT id, book_id, status, created_at FROM copies WHERE book_id = $1 ORDER BY id",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(copies)
    }

    /// Get a single copy by ID
    pub async fn get_copy(&self, copy_id: i32) -> AppResult<BookCopy> {
        sqlx::query_as::<_, BookCopy>(
            "SELECT id, book_id, status, created_at FROM copies WHERE id = $1",
        )
        .bind(copy_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Copy {} not found", copy_id)))
    }

    /// Set a copy's status directly
    pub async fn set_copy_status(&self, copy_id: i32, status: CopyStatus) -> AppResult<BookCopy> {
        sqlx::query_as::<_, BookCopy>(
            "UPDATE copies SET status = $2 WHERE id = $1 RETURNING id, book_id, status, created_at",
        )
        .bind(copy_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Copy {} not found", copy_id)))
    }

    /// Get available copies, for one book or for all books
    pub async fn available_copies(&self, book_id: Option<i32>) -> AppResult<Vec<BookCopy>> {
        let copies = if let Some(book_id) = book_id {
            sqlx::query_as::<_, BookCopy>(
                r#"
                SELECT id, book_id, status, created_at
                FROM copies
                WHERE book_id = $1 AND status = 'available'
                ORDER BY id
                "#,
            )
            .bind(book_id)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, BookCopy>(
                r#"
                SELECT id, book_id, status, created_at
                FROM copies
                WHERE status = 'available'
                ORDER BY book_id, id
                "#,
            )
            .fetch_all(&self.pool)
            .await?
        };
        Ok(copies)
    }

    /// Get copies out on loan with borrower details, for one book or for all
    pub async fn borrowed_copies(&self, book_id: Option<i32>) -> AppResult<Vec<BorrowedCopyRow>> {
        let rows = if let Some(book_id) = book_id {
            sqlx::query_as::<_, BorrowedCopyRow>(
                r#"
                SELECT br.copy_id, c.book_id, b.title AS book_title,
                       u.id AS borrower_id, u.first_name AS borrower_first_name,
                       u.last_name AS borrower_last_name, u.email AS borrower_email,
                       br.borrowed_at, br.due_date
                FROM borrowings br
                JOIN copies c ON br.copy_id = c.id
                JOIN users u ON br.user_id = u.id
                JOIN books b ON c.book_id = b.id
                WHERE br.returned_at IS NULL AND c.book_id = $1
                ORDER BY br.due_date
                "#,
            )
            .bind(book_id)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, BorrowedCopyRow>(
                r#"
                SELECT br.copy_id, c.book_id, b.title AS book_title,
                       u.id AS borrower_id, u.first_name AS borrower_first_name,
                       u.last_name AS borrower_last_name, u.email AS borrower_email,
                       br.borrowed_at, br.due_date
                FROM borrowings br
                JOIN copies c ON br.copy_id = c.id
                JOIN users u ON br.user_id = u.id
                JOIN books b ON c.book_id = b.id
                WHERE br.returned_at IS NULL
                ORDER BY c.book_id, br.due_date
                "#,
            )
            .fetch_all(&self.pool)
            .await?
        };
        Ok(rows)
    }
}
