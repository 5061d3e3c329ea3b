//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use chrono::{NaiveDate, Utc};
use lumina_core::library::Library;
use std::sync::Arc;
use tokio::sync::Mutex;

/// The shared application state, created once at startup and passed to all handlers.
///
/// Every request goes through the one `Library`; the mutex makes each
/// operation's read-modify-persist step run alone.
pub struct AppState {
    pub library: Mutex<Library>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(library: Library, config: Arc<Config>) -> Self {
        let library = library.with_pages_per_day(config.reading_pace);
        Self {
            library: Mutex::new(library),
            config,
        }
    }
}

/// The calendar day requests are recorded against.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
