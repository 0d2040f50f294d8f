//! Data models for Biblio

pub mod book;
pub mod borrowing;
pub mod copy;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookWithCopies, BorrowedCopyInfo};
pub use borrowing::{BorrowingResult, ReturnResult};
pub use copy::{BookCopy, CopyStatus};
pub use user::User;
