//! Bookshelf service
//!
//! [`BookStore`] owns the collection and implements every rule on it.
//! [`BooksService`] is the cloneable handle shared with the HTTP handlers.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookFilter, BookPayload, BookSummary},
};

const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";
const ID_LENGTH: usize = 16;

const ADD_MISSING_NAME: &str = "Gagal menambahkan buku. Mohon isi nama buku";
const ADD_READ_PAGE_TOO_LARGE: &str =
    "Gagal menambahkan buku. readPage tidak boleh lebih besar dari pageCount";
const ADD_FAILED: &str = "Buku gagal ditambahkan";
const UPDATE_MISSING_NAME: &str = "Gagal memperbarui buku. Mohon isi nama buku";
const UPDATE_READ_PAGE_TOO_LARGE: &str =
    "Gagal memperbarui buku. readPage tidak boleh lebih besar dari pageCount";
const UPDATE_NOT_FOUND: &str = "Gagal memperbarui buku. Id tidak ditemukan";
const GET_NOT_FOUND: &str = "Buku tidak ditemukan";
const DELETE_NOT_FOUND: &str = "Buku gagal dihapus. Id tidak ditemukan";

fn random_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LENGTH)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Validates a payload and returns the name to store.
fn validate(
    payload: &BookPayload,
    missing_name: &str,
    read_page_too_large: &str,
) -> AppResult<String> {
    let name = payload
        .valid_name()
        .ok_or_else(|| AppError::Validation(missing_name.to_string()))?;

    if payload.read_page_exceeds_page_count() {
        return Err(AppError::Validation(read_page_too_large.to_string()));
    }

    Ok(name.to_string())
}

/// In-memory, insertion-ordered book collection
#[derive(Debug, Default)]
pub struct BookStore {
    books: Vec<Book>,
}

impl BookStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.books.iter().position(|book| book.id == id)
    }

    fn next_id(&self) -> String {
        loop {
            let id = random_id();
            if self.position(&id).is_none() {
                return id;
            }
        }
    }

    /// Add a book and return its generated id
    pub fn add(&mut self, payload: BookPayload) -> AppResult<String> {
        let name = validate(&payload, ADD_MISSING_NAME, ADD_READ_PAGE_TOO_LARGE)?;

        let id = self.next_id();
        let now = Utc::now();

        self.books.push(Book {
            id: id.clone(),
            name,
            year: payload.year,
            author: payload.author,
            summary: payload.summary,
            publisher: payload.publisher,
            page_count: payload.page_count,
            read_page: payload.read_page,
            finished: payload.page_count == payload.read_page,
            reading: payload.reading,
            inserted_at: now,
            updated_at: now,
        });

        // Sanity check: the record must be reachable by its id after the push.
        if self.position(&id).is_none() {
            return Err(AppError::Storage(ADD_FAILED.to_string()));
        }

        Ok(id)
    }

    /// Project the books matching `filter`, in insertion order
    pub fn list(&self, filter: &BookFilter) -> Vec<BookSummary> {
        self.books
            .iter()
            .filter(|book| filter.matches(book))
            .map(BookSummary::from)
            .collect()
    }

    pub fn get(&self, id: &str) -> AppResult<Book> {
        self.books
            .iter()
            .find(|book| book.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(GET_NOT_FOUND.to_string()))
    }

    /// Replace every field except `id`, `inserted_at` and `finished`.
    ///
    /// The payload is validated before the id is looked up, so an invalid payload for an
    /// unknown id reports the validation failure.
    pub fn update(&mut self, id: &str, payload: BookPayload) -> AppResult<()> {
        let name = validate(&payload, UPDATE_MISSING_NAME, UPDATE_READ_PAGE_TOO_LARGE)?;

        let index = self
            .position(id)
            .ok_or_else(|| AppError::NotFound(UPDATE_NOT_FOUND.to_string()))?;

        let book = &mut self.books[index];
        book.name = name;
        book.year = payload.year;
        book.author = payload.author;
        book.summary = payload.summary;
        book.publisher = payload.publisher;
        book.page_count = payload.page_count;
        book.read_page = payload.read_page;
        book.reading = payload.reading;
        book.updated_at = Utc::now();

        Ok(())
    }

    pub fn delete(&mut self, id: &str) -> AppResult<()> {
        let index = self
            .position(id)
            .ok_or_else(|| AppError::NotFound(DELETE_NOT_FOUND.to_string()))?;
        self.books.remove(index);
        Ok(())
    }
}

/// Shared handle to the bookshelf
#[derive(Clone, Default)]
pub struct BooksService {
    store: Arc<RwLock<BookStore>>,
}

impl BooksService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, payload: BookPayload) -> AppResult<String> {
        let id = self
            .store
            .write()
            .await
            .add(payload)
            .inspect_err(|e| tracing::debug!("Book creation rejected: {}", e))?;
        tracing::info!(book_id = %id, "Book added");
        Ok(id)
    }

    pub async fn list(&self, filter: &BookFilter) -> Vec<BookSummary> {
        let books = self.store.read().await.list(filter);
        tracing::debug!(?filter, count = books.len(), "Books listed");
        books
    }

    pub async fn get(&self, id: &str) -> AppResult<Book> {
        self.store.read().await.get(id)
    }

    pub async fn update(&self, id: &str, payload: BookPayload) -> AppResult<()> {
        self.store
            .write()
            .await
            .update(id, payload)
            .inspect_err(|e| tracing::debug!(book_id = %id, "Book update rejected: {}", e))?;
        tracing::info!(book_id = %id, "Book updated");
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.store
            .write()
            .await
            .delete(id)
            .inspect_err(|e| tracing::debug!(book_id = %id, "Book deletion rejected: {}", e))?;
        tracing::info!(book_id = %id, "Book deleted");
        Ok(())
    }

    pub async fn count(&self) -> usize {
        self.store.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: Option<&str>, page_count: u32, read_page: u32) -> BookPayload {
        BookPayload {
            name: name.map(str::to_string),
            page_count,
            read_page,
            ..Default::default()
        }
    }

    fn reading(name: &str, reading: bool) -> BookPayload {
        BookPayload {
            reading,
            ..payload(Some(name), 10, 5)
        }
    }

    fn names(books: &[BookSummary]) -> Vec<&str> {
        books.iter().map(|b| b.name.as_str()).collect()
    }

    #[test]
    fn add_computes_finished_and_timestamps() {
        let mut store = BookStore::new();
        let done = store.add(payload(Some("A"), 100, 100)).unwrap();
        let ongoing = store.add(payload(Some("B"), 100, 20)).unwrap();

        let done = store.get(&done).unwrap();
        assert!(done.finished);
        assert_eq!(done.inserted_at, done.updated_at);
        assert!(!store.get(&ongoing).unwrap().finished);
    }

    #[test]
    fn add_generates_unique_ids_of_fixed_length() {
        let mut store = BookStore::new();
        let first = store.add(payload(Some("A"), 1, 0)).unwrap();
        let second = store.add(payload(Some("A"), 1, 0)).unwrap();

        assert_ne!(first, second);
        assert_eq!(first.len(), ID_LENGTH);
        assert!(first.bytes().all(|b| ID_ALPHABET.contains(&b)));
    }

    #[test]
    fn add_without_name_fails_validation() {
        let mut store = BookStore::new();
        let err = store.add(payload(None, 100, 10)).unwrap_err();

        assert!(matches!(err, AppError::Validation(ref m) if m == ADD_MISSING_NAME));
        assert!(store.is_empty());
    }

    #[test]
    fn missing_name_is_reported_before_page_mismatch() {
        let mut store = BookStore::new();
        let err = store.add(payload(None, 100, 150)).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == ADD_MISSING_NAME));
    }

    #[test]
    fn add_with_read_page_over_page_count_fails_validation() {
        let mut store = BookStore::new();
        let err = store.add(payload(Some("A"), 100, 150)).unwrap_err();

        assert!(matches!(err, AppError::Validation(ref m) if m == ADD_READ_PAGE_TOO_LARGE));
        assert!(store.is_empty());
    }

    #[test]
    fn list_preserves_insertion_order() {
        let mut store = BookStore::new();
        for name in ["C", "A", "B"] {
            store.add(payload(Some(name), 1, 0)).unwrap();
        }
        assert_eq!(names(&store.list(&BookFilter::All)), vec!["C", "A", "B"]);
    }

    #[test]
    fn list_by_name_is_case_insensitive_exact_match() {
        let mut store = BookStore::new();
        store.add(payload(Some("Dicoding"), 1, 0)).unwrap();
        store.add(payload(Some("Dicoding Academy"), 1, 0)).unwrap();
        store.add(payload(Some("dicoding"), 1, 0)).unwrap();

        let books = store.list(&BookFilter::Name("DICODING".to_string()));
        assert_eq!(names(&books), vec!["Dicoding", "dicoding"]);
    }

    #[test]
    fn list_by_reading_splits_collection() {
        let mut store = BookStore::new();
        store.add(reading("A", true)).unwrap();
        store.add(reading("B", false)).unwrap();
        store.add(reading("C", true)).unwrap();

        assert_eq!(names(&store.list(&BookFilter::Reading(true))), vec!["A", "C"]);
        assert_eq!(names(&store.list(&BookFilter::Reading(false))), vec!["B"]);
    }

    #[test]
    fn list_by_finished_uses_creation_state() {
        let mut store = BookStore::new();
        store.add(payload(Some("Done"), 10, 10)).unwrap();
        store.add(payload(Some("Open"), 10, 3)).unwrap();

        assert_eq!(names(&store.list(&BookFilter::Finished(true))), vec!["Done"]);
        assert_eq!(names(&store.list(&BookFilter::Finished(false))), vec!["Open"]);
    }

    #[test]
    fn get_unknown_id_is_not_found() {
        let store = BookStore::new();
        let err = store.get("missing").unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == GET_NOT_FOUND));
    }

    #[test]
    fn update_replaces_fields_but_keeps_insertion_time_and_finished() {
        let mut store = BookStore::new();
        let id = store.add(payload(Some("Old"), 100, 100)).unwrap();
        let before = store.get(&id).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(5));

        let update = BookPayload {
            name: Some("New".to_string()),
            author: Some("Someone".to_string()),
            reading: true,
            ..payload(None, 200, 10)
        };
        store.update(&id, update).unwrap();

        let after = store.get(&id).unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.name, "New");
        assert_eq!(after.author.as_deref(), Some("Someone"));
        assert_eq!(after.page_count, 200);
        assert_eq!(after.read_page, 10);
        assert!(after.reading);
        assert!(after.finished);
        assert_eq!(after.inserted_at, before.inserted_at);
        assert!(after.updated_at > before.updated_at);
    }

    #[test]
    fn update_clears_fields_missing_from_payload() {
        let mut store = BookStore::new();
        let first = BookPayload {
            publisher: Some("Press".to_string()),
            year: Some(2010),
            ..payload(Some("A"), 5, 1)
        };
        let id = store.add(first).unwrap();

        store.update(&id, payload(Some("A"), 5, 1)).unwrap();

        let book = store.get(&id).unwrap();
        assert_eq!(book.publisher, None);
        assert_eq!(book.year, None);
    }

    #[test]
    fn update_validates_before_looking_up_id() {
        let mut store = BookStore::new();

        let err = store.update("missing", payload(None, 1, 0)).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == UPDATE_MISSING_NAME));

        let err = store.update("missing", payload(Some("A"), 1, 2)).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == UPDATE_READ_PAGE_TOO_LARGE));

        let err = store.update("missing", payload(Some("A"), 2, 1)).unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == UPDATE_NOT_FOUND));
    }

    #[test]
    fn rejected_update_leaves_record_untouched() {
        let mut store = BookStore::new();
        let id = store.add(payload(Some("A"), 10, 5)).unwrap();
        let before = store.get(&id).unwrap();

        assert!(store.update(&id, payload(Some("B"), 10, 11)).is_err());
        assert_eq!(store.get(&id).unwrap(), before);
    }

    #[test]
    fn delete_removes_record_and_keeps_order() {
        let mut store = BookStore::new();
        let a = store.add(payload(Some("A"), 1, 0)).unwrap();
        let b = store.add(payload(Some("B"), 1, 0)).unwrap();
        store.add(payload(Some("C"), 1, 0)).unwrap();

        store.delete(&b).unwrap();

        assert!(matches!(store.get(&b), Err(AppError::NotFound(_))));
        assert_eq!(names(&store.list(&BookFilter::All)), vec!["A", "C"]);
        assert_eq!(store.len(), 2);
        assert!(store.get(&a).is_ok());
    }

    #[test]
    fn delete_unknown_id_is_not_found() {
        let mut store = BookStore::new();
        let err = store.delete("missing").unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == DELETE_NOT_FOUND));
    }

    #[tokio::test]
    async fn service_clones_share_one_store() {
        let service = BooksService::new();
        let other = service.clone();

        let id = service.add(payload(Some("Shared"), 3, 1)).await.unwrap();

        assert_eq!(other.get(&id).await.unwrap().name, "Shared");
        assert_eq!(other.count().await, 1);
        other.delete(&id).await.unwrap();
        assert_eq!(service.count().await, 0);
    }
}
