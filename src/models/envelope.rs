//! Response envelopes wrapping every successful API response

use serde::Serialize;
use utoipa::ToSchema;

use super::book::{Book, BookSummary};

/// Value of the `status` field of every envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Fail,
    Error,
}

/// Envelope carrying only a message
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub status: ResponseStatus,
    pub message: String,
}

impl MessageResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookIdData {
    pub book_id: String,
}

/// Envelope returned after a book was added
#[derive(Debug, Serialize, ToSchema)]
pub struct BookCreatedResponse {
    pub status: ResponseStatus,
    pub message: String,
    pub data: BookIdData,
}

impl BookCreatedResponse {
    pub fn new(book_id: String) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: "Buku berhasil ditambahkan".to_string(),
            data: BookIdData { book_id },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookListData {
    pub books: Vec<BookSummary>,
}

/// Envelope for the book list
#[derive(Debug, Serialize, ToSchema)]
pub struct BookListResponse {
    pub status: ResponseStatus,
    pub data: BookListData,
}

impl BookListResponse {
    pub fn new(books: Vec<BookSummary>) -> Self {
        Self {
            status: ResponseStatus::Success,
            data: BookListData { books },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookData {
    pub book: Book,
}

/// Envelope for a single book
#[derive(Debug, Serialize, ToSchema)]
pub struct BookResponse {
    pub status: ResponseStatus,
    pub data: BookData,
}

impl BookResponse {
    pub fn new(book: Book) -> Self {
        Self {
            status: ResponseStatus::Success,
            data: BookData { book },
        }
    }
}
