//! crates/lumina_core/src/library.rs
//!
//! The `Library` ties the book store and the profile store together and is
//! the whole surface a presentation layer talks to. Every operation names its
//! target book explicitly; there is no notion of a "current" book here.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::book_store::BookStore;
use crate::domain::{Book, BookPatch, BookStatus, ExportDocument, Genre, NewBook, Note, UserProfile};
use crate::error::{LibraryError, LibraryResult};
use crate::persistence::Persistence;
use crate::ports::KeyValueStore;
use crate::profile::ProfileStore;
use crate::progress::{self, Milestone, TimeLeft, DEFAULT_PAGES_PER_DAY};
use crate::stats;

const CURRENTLY_READING_LIMIT: usize = 4;
const RECENTLY_FINISHED_LIMIT: usize = 6;

/// What a progress update did, for the caller to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ProgressOutcome {
    pub book: Book,
    pub pages_read: u32,
    pub crossed_finish: bool,
    pub completion_percent: u32,
    /// Empty when the user has turned notifications off.
    pub milestones: Vec<Milestone>,
}

/// Library listing filter; all criteria are optional and combined with AND.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
#[serde(default)]
pub struct LibraryQuery {
    pub status: Option<BookStatus>,
    pub genre: Option<Genre>,
    /// Case-insensitive match against title or author.
    pub search: Option<String>,
}

impl LibraryQuery {
    pub fn matches(&self, book: &Book) -> bool {
        if self.status.is_some_and(|s| s != book.status) {
            return false;
        }
        if self.genre.is_some_and(|g| g != book.genre) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => {
                let q = q.to_lowercase();
                book.title.to_lowercase().contains(&q) || book.author.to_lowercase().contains(&q)
            }
            _ => true,
        }
    }
}

pub struct Library {
    books: BookStore,
    profile: ProfileStore,
    pages_per_day: u32,
}

impl Library {
    /// Opens both stores over the same key-value store.
    pub async fn open(store: Arc<dyn KeyValueStore>) -> Self {
        let persistence = Persistence::new(store);
        Self {
            books: BookStore::open(persistence.clone()).await,
            profile: ProfileStore::open(persistence).await,
            pages_per_day: DEFAULT_PAGES_PER_DAY,
        }
    }

    /// Sets the reading pace used for time-left estimates.
    pub fn with_pages_per_day(mut self, pages_per_day: u32) -> Self {
        self.pages_per_day = pages_per_day.max(1);
        self
    }

    pub fn books(&self) -> &BookStore {
        &self.books
    }

    pub fn books_mut(&mut self) -> &mut BookStore {
        &mut self.books
    }

    pub fn profile(&self) -> &ProfileStore {
        &self.profile
    }

    pub fn profile_mut(&mut self) -> &mut ProfileStore {
        &mut self.profile
    }

    //=====================================================================================
    // Books
    //=====================================================================================

    pub fn list_books(&self) -> &[Book] {
        self.books.list_books()
    }

    pub fn get_book(&self, id: Uuid) -> Option<&Book> {
        self.books.get_book(id)
    }

    pub fn query(&self, query: &LibraryQuery) -> Vec<&Book> {
        self.list_books().iter().filter(|b| query.matches(b)).collect()
    }

    pub fn currently_reading(&self) -> Vec<&Book> {
        self.with_status(BookStatus::Reading, CURRENTLY_READING_LIMIT)
    }

    pub fn recently_finished(&self) -> Vec<&Book> {
        self.with_status(BookStatus::Finished, RECENTLY_FINISHED_LIMIT)
    }

    fn with_status(&self, status: BookStatus, limit: usize) -> Vec<&Book> {
        self.list_books()
            .iter()
            .filter(|b| b.status == status)
            .take(limit)
            .collect()
    }

    pub async fn add_book(&mut self, fields: NewBook, today: NaiveDate) -> LibraryResult<Book> {
        self.books.add_book(fields, today).await
    }

    /// Applies a partial update; a page change is recorded as progress made `today`.
    pub async fn update_book(
        &mut self,
        id: Uuid,
        patch: BookPatch,
        today: NaiveDate,
    ) -> LibraryResult<Option<Book>> {
        self.books.update_book(id, patch, today).await
    }

    pub async fn delete_book(&mut self, id: Uuid) -> LibraryResult<()> {
        self.books.delete_book(id).await
    }

    /// Moves the book to `new_page`, logging a session for forward progress.
    pub async fn update_progress(
        &mut self,
        id: Uuid,
        new_page: u32,
        today: NaiveDate,
    ) -> LibraryResult<Option<ProgressOutcome>> {
        let Some(update) = self.books.apply_progress(id, new_page, today).await? else {
            return Ok(None);
        };

        let profile = self.profile.profile();
        let milestones = if profile.preferences.notifications {
            let pages_today = stats::pages_on_date(self.books.list_books(), today);
            progress::milestones(&update, pages_today, profile.daily_page_goal)
        } else {
            Vec::new()
        };

        Ok(Some(ProgressOutcome {
            completion_percent: progress::completion_percent(&update.book),
            book: update.book,
            pages_read: update.pages_read,
            crossed_finish: update.crossed_finish,
            milestones,
        }))
    }

    pub async fn advance_chapter(
        &mut self,
        id: Uuid,
        chapter_index: u32,
    ) -> LibraryResult<Option<Book>> {
        let Some(book) = self.books.get_book(id) else {
            return Ok(None);
        };
        let updated = progress::advance_chapter(book, chapter_index)?;
        let patch = BookPatch {
            current_chapter: Some(updated.current_chapter),
            ..Default::default()
        };
        self.books.edit_book(id, patch).await
    }

    /// Moves a to-be-read book onto the currently-reading shelf.
    pub async fn start_reading(&mut self, id: Uuid) -> LibraryResult<Option<Book>> {
        let patch = BookPatch {
            status: Some(BookStatus::Reading),
            ..Default::default()
        };
        self.books.edit_book(id, patch).await
    }

    pub async fn save_review(
        &mut self,
        id: Uuid,
        rating: u8,
        review: &str,
    ) -> LibraryResult<Option<Book>> {
        let patch = BookPatch {
            rating: Some(rating),
            review: Some(review.trim().to_string()),
            ..Default::default()
        };
        self.books.edit_book(id, patch).await
    }

    /// Time left at the configured pace, or `None` for an unknown book.
    pub fn estimate(&self, id: Uuid) -> Option<TimeLeft> {
        self.get_book(id)
            .map(|book| progress::estimate_days_remaining(book, self.pages_per_day))
    }

    //=====================================================================================
    // Notes
    //=====================================================================================

    /// Adds a note at the front of the book's notes.
    pub async fn add_note(
        &mut self,
        id: Uuid,
        text: &str,
        today: NaiveDate,
    ) -> LibraryResult<Option<Note>> {
        let text = text.trim();
        if text.is_empty() || text == "<br>" {
            return Err(LibraryError::Validation("note text must not be empty".into()));
        }
        let Some(book) = self.books.get_book(id) else {
            return Ok(None);
        };

        let note = Note {
            id: Uuid::new_v4(),
            text: text.to_string(),
            date: today,
        };
        let mut notes = book.notes.clone();
        notes.insert(0, note.clone());
        let patch = BookPatch {
            notes: Some(notes),
            ..Default::default()
        };
        Ok(self.books.edit_book(id, patch).await?.map(|_| note))
    }

    /// Removes a note. An unknown note id leaves the book unchanged.
    pub async fn delete_note(&mut self, id: Uuid, note_id: Uuid) -> LibraryResult<Option<Book>> {
        let Some(book) = self.books.get_book(id) else {
            return Ok(None);
        };
        if !book.notes.iter().any(|n| n.id == note_id) {
            return Ok(Some(book.clone()));
        }
        let notes = book.notes.iter().filter(|n| n.id != note_id).cloned().collect();
        let patch = BookPatch {
            notes: Some(notes),
            ..Default::default()
        };
        self.books.edit_book(id, patch).await
    }

    //=====================================================================================
    // Whole-library operations
    //=====================================================================================

    pub fn export(&self, now: DateTime<Utc>) -> ExportDocument {
        ExportDocument {
            books: self.list_books().to_vec(),
            user: self.profile.profile().clone(),
            export_date: now,
        }
    }

    /// Replaces the library (and the profile, when the document has one) with
    /// the contents of an export document.
    ///
    /// The document is checked in full before anything is written; a
    /// malformed one leaves the current state untouched. Returns the number of
    /// imported books.
    pub async fn import_json(&mut self, raw: &str) -> LibraryResult<usize> {
        let (books, user) = parse_import(raw).map_err(|e| {
            warn!("Rejected import: {}", e);
            e
        })?;

        let count = books.len();
        let previous = self.list_books().to_vec();
        self.books.replace_all(books).await?;
        if let Some(user) = user {
            if let Err(e) = self.profile.replace(user).await {
                self.restore_books(previous).await;
                return Err(e);
            }
        }
        info!("Imported {} books", count);
        Ok(count)
    }

    /// Clears all reading statistics but keeps the books: sessions and page
    /// progress are wiped, finished books return to `tbr`, and the yearly
    /// goal is reset.
    pub async fn restart_profile(&mut self) -> LibraryResult<()> {
        let previous = self.list_books().to_vec();
        self.books.reset_all_progress().await?;
        let reset = self.profile.reset_goals().await.map(|_| ());
        if let Err(e) = reset {
            self.restore_books(previous).await;
            return Err(e);
        }
        info!("Profile restarted");
        Ok(())
    }

    /// Deletes every stored document.
    pub async fn clear_all(&mut self) -> LibraryResult<()> {
        let previous = self.list_books().to_vec();
        self.books.clear().await?;
        if let Err(e) = self.profile.clear().await {
            self.restore_books(previous).await;
            return Err(e);
        }
        info!("All library data cleared");
        Ok(())
    }

    /// Puts the collection back after the profile half of a two-document
    /// change failed. If the store refuses this write too, the books keep
    /// the new state and the error is only logged.
    async fn restore_books(&mut self, previous: Vec<Book>) {
        if let Err(e) = self.books.replace_all(previous).await {
            error!("Could not roll back the book collection: {}", e);
        }
    }
}

fn parse_import(raw: &str) -> LibraryResult<(Vec<Book>, Option<UserProfile>)> {
    let invalid = LibraryError::ImportFormat;

    let mut document: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| invalid(format!("not valid JSON: {}", e)))?;

    let books = match document.get_mut("books").map(serde_json::Value::take) {
        None | Some(serde_json::Value::Null) => {
            return Err(invalid("the document has no 'books' field".into()))
        }
        Some(books) => books,
    };
    let books: Vec<Book> =
        serde_json::from_value(books).map_err(|e| invalid(format!("invalid book list: {}", e)))?;

    let mut seen = HashSet::new();
    for book in &books {
        book.validate()
            .map_err(|e| invalid(format!("book '{}': {}", book.title, e)))?;
        if !seen.insert(book.id) {
            return Err(invalid(format!("duplicate book id {}", book.id)));
        }
    }

    let user = match document.get_mut("user").map(serde_json::Value::take) {
        None | Some(serde_json::Value::Null) => None,
        Some(user) => {
            let user: UserProfile = serde_json::from_value(user)
                .map_err(|e| invalid(format!("invalid user profile: {}", e)))?;
            user.validate()
                .map_err(|e| invalid(format!("user profile: {}", e)))?;
            Some(user)
        }
    };

    Ok((books, user))
}
