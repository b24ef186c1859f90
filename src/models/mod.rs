//! Data models for Bookshelf

pub mod book;
pub mod envelope;

// Re-export commonly used types
pub use book::{Book, BookFilter, BookPayload, BookQuery, BookSummary};
pub use envelope::ResponseStatus;
