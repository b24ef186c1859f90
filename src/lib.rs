//! Bookshelf
//!
//! A small REST JSON server keeping a shelf of book records in memory: add, list with
//! simple filters, fetch, update and delete.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use crate::config::AppConfig;
pub use crate::error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone, Default)]
pub struct AppState {
    pub services: Arc<services::Services>,
}

impl AppState {
    /// State with an empty bookshelf
    pub fn new() -> Self {
        Self {
            services: Arc::new(services::Services::new()),
        }
    }
}
