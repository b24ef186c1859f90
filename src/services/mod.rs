//! Business logic services

pub mod books;

/// Container for all services
#[derive(Clone, Default)]
pub struct Services {
    pub books: books::BooksService,
}

impl Services {
    /// Create all services with an empty bookshelf
    pub fn new() -> Self {
        Self {
            books: books::BooksService::new(),
        }
    }
}
