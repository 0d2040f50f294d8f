//! Catalog management service

use std::collections::HashMap;

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{BookWithCopies, BorrowedCopyInfo, CreateBook},
        copy::{BookCopy, CopyStatus},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get all books with availability details
    pub async fn list_books(&self) -> AppResult<Vec<BookWithCopies>> {
        let books = self.repository.books.list().await?;
        let available = self.repository.books.available_copies(None).await?;
        let borrowed = self.repository.books.borrowed_copies(None).await?;
        let today = Utc::now().date_naive();

        let mut available_map: HashMap<i32, Vec<BookCopy>> = HashMap::new();
        for copy in available {
            available_map.entry(copy.book_id).or_default().push(copy);
        }

        let mut borrowed_map: HashMap<i32, Vec<BorrowedCopyInfo>> = HashMap::new();
        for row in borrowed {
            borrowed_map
                .entry(row.book_id)
                .or_default()
                .push(BorrowedCopyInfo::from_row(row, today));
        }

        Ok(books
            .into_iter()
            .map(|book| {
                let available = available_map.remove(&book.id).unwrap_or_default();
                let borrowed = borrowed_map.remove(&book.id).unwrap_or_default();
                BookWithCopies::new(book, available, borrowed)
            })
            .collect())
    }

    /// Get one book with availability details
    pub async fn get_book(&self, id: i32) -> AppResult<BookWithCopies> {
        let book = self.repository.books.get_by_id(id).await?;
        let available = self.repository.books.available_copies(Some(id)).await?;
        let borrowed = self.repository.books.borrowed_copies(Some(id)).await?;
        let today = Utc::now().date_naive();

        let borrowed = borrowed
            .into_iter()
            .map(|row| BorrowedCopyInfo::from_row(row, today))
            .collect();

        Ok(BookWithCopies::new(book, available, borrowed))
    }

    /// Create a new book with its initial copies
    pub async fn create_book(&self, book: CreateBook) -> AppResult<BookWithCopies> {
        if let Some(ref isbn) = book.isbn {
            if self.repository.books.isbn_exists(isbn).await? {
                return Err(AppError::Conflict(format!(
                    "Book with ISBN '{}' already exists",
                    isbn
                )));
            }
        }

        let copies_count = book.copies_count.unwrap_or(0);
        let book_id = self.repository.books.create(&book, copies_count).await?;

        tracing::info!("Created book '{}' with {} copies", book.title, copies_count);

        self.get_book(book_id).await
    }

    /// Delete a book; its copies and their borrowings cascade
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!("Deleted book {}", id);
        Ok(())
    }

    /// Append one available copy to a book
    pub async fn add_copy(&self, book_id: i32) -> AppResult<BookCopy> {
        // Verify book exists
        self.repository.books.get_by_id(book_id).await?;
        self.repository.books.add_copy(book_id).await
    }

    /// Get all copies of a book
    pub async fn list_copies(&self, book_id: i32) -> AppResult<Vec<BookCopy>> {
        // Verify book exists
        self.repository.books.get_by_id(book_id).await?;
        self.repository.books.list_copies(book_id).await
    }

    /// Set a copy's status directly (damaged, lost, or back to available).
    ///
    /// Borrowed is reserved for the borrow flow; available is refused while
    /// the copy still has an open borrowing.
    pub async fn set_copy_status(&self, copy_id: i32, status: CopyStatus) -> AppResult<BookCopy> {
        if status == CopyStatus::Borrowed {
            return Err(AppError::BadRequest(
                "Copy status cannot be set to borrowed directly".to_string(),
            ));
        }

        // Verify copy exists
        self.repository.books.get_copy(copy_id).await?;

        if status == CopyStatus::Available
            && self.repository.borrowings.open_exists_for_copy(copy_id).await?
        {
            return Err(AppError::Unavailable(format!(
                "Copy {} has an open borrowing and cannot be marked available",
                copy_id
            )));
        }

        self.repository.books.set_copy_status(copy_id, status).await
    }
}
