//! crates/lumina_core/src/book_store.rs
//!
//! The in-memory book collection and its write-through persistence.
//!
//! Every mutation builds the next version of the collection, saves it as one
//! document and only then replaces the in-memory copy, so a rejected or
//! failed write leaves the store unchanged.

use chrono::NaiveDate;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{Book, BookPatch, BookStatus, NewBook, Session};
use crate::error::{LibraryError, LibraryResult};
use crate::persistence::{Persistence, BOOKS_KEY};
use crate::progress::{self, ProgressUpdate};

pub struct BookStore {
    persistence: Persistence,
    books: Vec<Book>,
}

impl BookStore {
    /// Loads the collection. A missing or corrupt document yields an empty library.
    pub async fn open(persistence: Persistence) -> Self {
        let books: Vec<Book> = persistence.load(BOOKS_KEY).await;
        info!("Loaded {} books", books.len());
        Self { persistence, books }
    }

    /// All books in insertion order.
    pub fn list_books(&self) -> &[Book] {
        &self.books
    }

    pub fn get_book(&self, id: Uuid) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.books.iter().position(|b| b.id == id)
    }

    async fn commit(&mut self, next: Vec<Book>) -> LibraryResult<()> {
        self.persistence.save(BOOKS_KEY, &next).await?;
        self.books = next;
        Ok(())
    }

    /// Validates `fields`, creates a `tbr` book with a fresh id and appends it.
    pub async fn add_book(&mut self, fields: NewBook, today: NaiveDate) -> LibraryResult<Book> {
        let NewBook {
            title,
            author,
            cover,
            total_pages,
            total_chapters,
            mut chapter_titles,
            genre,
            description,
        } = fields;

        if !chapter_titles.is_empty() && chapter_titles.len() != total_chapters as usize {
            debug!(
                "Dropping {} chapter titles that do not match {} chapters",
                chapter_titles.len(),
                total_chapters
            );
            chapter_titles.clear();
        }

        let book = Book {
            id: Uuid::new_v4(),
            title: title.trim().to_string(),
            author: author.trim().to_string(),
            cover: cover.filter(|c| !c.trim().is_empty()),
            total_pages,
            current_page: 0,
            total_chapters,
            chapter_titles,
            current_chapter: 0,
            genre,
            status: BookStatus::Tbr,
            rating: 0,
            review: String::new(),
            description: description.trim().to_string(),
            sessions: Vec::new(),
            notes: Vec::new(),
            date_added: today,
            date_finished: None,
        };
        book.validate()?;

        let mut next = self.books.clone();
        next.push(book.clone());
        self.commit(next).await?;
        info!("Added book '{}' ({})", book.title, book.id);
        Ok(book)
    }

    /// Merges `patch` into the stored book and persists it.
    ///
    /// A `current_page` in the patch is applied as a progress update dated
    /// `today`, so it logs a session and finishes the book on its last page.
    /// A book entering `finished` gets `today` as its finish date unless the
    /// patch supplies one.
    ///
    /// Returns `Ok(None)` when no book has `id`. The merged record must pass
    /// validation and the status state machine, otherwise nothing changes.
    pub async fn update_book(
        &mut self,
        id: Uuid,
        patch: BookPatch,
        today: NaiveDate,
    ) -> LibraryResult<Option<Book>> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };

        let before = &self.books[index];
        let target_page = patch.current_page;
        let mut updated = before.clone();
        BookPatch {
            current_page: None,
            ..patch
        }
        .apply_to(&mut updated);

        if let Some(page) = target_page.filter(|page| *page != updated.current_page) {
            updated = progress::apply_progress_update(&updated, page, today)?.book;
        }
        if updated.status == BookStatus::Finished
            && before.status != BookStatus::Finished
            && updated.date_finished.is_none()
        {
            updated.date_finished = Some(today);
        }

        self.store(index, updated).await.map(Some)
    }

    /// Applies a patch that leaves page progress alone, such as a chapter,
    /// review or note change.
    pub(crate) async fn edit_book(
        &mut self,
        id: Uuid,
        patch: BookPatch,
    ) -> LibraryResult<Option<Book>> {
        if patch.current_page.is_some() {
            return Err(LibraryError::Validation(
                "page changes must go through a progress update".into(),
            ));
        }
        let Some(index) = self.position(id) else {
            return Ok(None);
        };
        let mut updated = self.books[index].clone();
        patch.apply_to(&mut updated);
        self.store(index, updated).await.map(Some)
    }

    /// Moves the book to `new_page` and persists the result.
    pub async fn apply_progress(
        &mut self,
        id: Uuid,
        new_page: u32,
        today: NaiveDate,
    ) -> LibraryResult<Option<ProgressUpdate>> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };
        let update = progress::apply_progress_update(&self.books[index], new_page, today)?;
        self.store(index, update.book.clone()).await?;
        if update.crossed_finish {
            info!("Finished '{}'", update.book.title);
        }
        Ok(Some(update))
    }

    /// Checks `updated` against the stored version and commits it.
    async fn store(&mut self, index: usize, updated: Book) -> LibraryResult<Book> {
        let before = &self.books[index];
        updated.validate()?;
        progress::check_status_change(before, &updated)?;
        if updated.status == BookStatus::Finished
            && before.status != BookStatus::Finished
            && updated.date_finished.is_none()
        {
            return Err(LibraryError::Validation(
                "a book entering 'finished' needs a finish date".into(),
            ));
        }

        let mut next = self.books.clone();
        next[index] = updated.clone();
        self.commit(next).await?;
        debug!("Updated book {}", updated.id);
        Ok(updated)
    }

    /// Removes the book. Deleting an unknown id is a no-op.
    pub async fn delete_book(&mut self, id: Uuid) -> LibraryResult<()> {
        let Some(index) = self.position(id) else {
            return Ok(());
        };
        let mut next = self.books.clone();
        let removed = next.remove(index);
        self.commit(next).await?;
        info!("Deleted book '{}' ({})", removed.title, id);
        Ok(())
    }

    /// Logs a reading session at the front of the book's session list.
    pub async fn record_session(
        &mut self,
        id: Uuid,
        pages_read: u32,
        date: NaiveDate,
    ) -> LibraryResult<Option<Book>> {
        if pages_read == 0 {
            return Err(LibraryError::Validation(
                "a session must cover at least one page".into(),
            ));
        }
        let Some(book) = self.get_book(id) else {
            return Ok(None);
        };
        let mut sessions = book.sessions.clone();
        sessions.insert(0, Session::new(date, pages_read));
        self.edit_book(
            id,
            BookPatch {
                sessions: Some(sessions),
                ..Default::default()
            },
        )
        .await
    }

    /// Clears every book's sessions and progress; finished books return to `tbr`.
    pub async fn reset_all_progress(&mut self) -> LibraryResult<()> {
        let mut next = self.books.clone();
        next.iter_mut().for_each(progress::reset_progress);
        self.commit(next).await?;
        info!("Reset reading progress for {} books", self.books.len());
        Ok(())
    }

    /// Replaces the whole collection, e.g. from an import.
    pub async fn replace_all(&mut self, books: Vec<Book>) -> LibraryResult<()> {
        self.commit(books).await
    }

    /// Deletes the persisted collection and empties the store.
    pub async fn clear(&mut self) -> LibraryResult<()> {
        self.persistence.remove(BOOKS_KEY).await?;
        self.books.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Genre;
    use crate::memory::MemoryStore;
    use std::sync::Arc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 14).unwrap()
    }

    fn new_book(title: &str, pages: u32) -> NewBook {
        NewBook {
            title: title.into(),
            author: "Ursula K. Le Guin".into(),
            total_pages: pages,
            genre: Genre::SciFi,
            ..Default::default()
        }
    }

    async fn empty_store() -> (BookStore, Persistence) {
        let persistence = Persistence::new(Arc::new(MemoryStore::new()));
        (BookStore::open(persistence.clone()).await, persistence)
    }

    #[tokio::test]
    async fn add_book_initializes_and_persists() {
        let (mut store, persistence) = empty_store().await;
        let book = store
            .add_book(new_book("  The Dispossessed ", 387), today())
            .await
            .unwrap();

        assert_eq!(book.title, "The Dispossessed");
        assert_eq!(book.status, BookStatus::Tbr);
        assert_eq!(book.current_page, 0);
        assert!(book.sessions.is_empty());
        assert_eq!(book.date_added, today());

        let stored: Vec<Book> = persistence.load(BOOKS_KEY).await;
        assert_eq!(stored, vec![book]);
    }

    #[tokio::test]
    async fn add_book_rejects_missing_fields() {
        let (mut store, _) = empty_store().await;
        assert!(matches!(
            store.add_book(new_book("", 100), today()).await,
            Err(LibraryError::Validation(_))
        ));
        assert!(store.add_book(new_book("Lathe of Heaven", 0), today()).await.is_err());
        let mut no_author = new_book("Lathe of Heaven", 184);
        no_author.author = "   ".into();
        assert!(store.add_book(no_author, today()).await.is_err());
        assert!(store.list_books().is_empty());
    }

    #[tokio::test]
    async fn chapter_titles_are_kept_only_when_they_match() {
        let (mut store, _) = empty_store().await;
        let mut matching = new_book("A Wizard of Earthsea", 183);
        matching.total_chapters = 2;
        matching.chapter_titles = vec!["Warriors in the Mist".into(), "The Shadow".into()];
        let kept = store.add_book(matching, today()).await.unwrap();
        assert_eq!(kept.chapter_titles.len(), 2);

        let mut mismatched = new_book("The Tombs of Atuan", 180);
        mismatched.total_chapters = 12;
        mismatched.chapter_titles = vec!["Prologue".into()];
        let dropped = store.add_book(mismatched, today()).await.unwrap();
        assert!(dropped.chapter_titles.is_empty());
        assert_eq!(dropped.total_chapters, 12);
    }

    #[tokio::test]
    async fn books_keep_insertion_order_across_updates() {
        let (mut store, _) = empty_store().await;
        let first = store.add_book(new_book("One", 10), today()).await.unwrap();
        let second = store.add_book(new_book("Two", 10), today()).await.unwrap();
        store
            .update_book(
                first.id,
                BookPatch {
                    description: Some("updated".into()),
                    ..Default::default()
                },
                today(),
            )
            .await
            .unwrap();
        let ids: Vec<Uuid> = store.list_books().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn update_unknown_id_is_absent() {
        let (mut store, _) = empty_store().await;
        let result = store
            .update_book(Uuid::new_v4(), BookPatch::default(), today())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn invalid_update_leaves_record_untouched() {
        let (mut store, persistence) = empty_store().await;
        let book = store.add_book(new_book("Always Coming Home", 523), today()).await.unwrap();

        let result = store
            .update_book(
                book.id,
                BookPatch {
                    current_page: Some(600),
                    status: Some(BookStatus::Reading),
                    ..Default::default()
                },
                today(),
            )
            .await;
        assert!(matches!(result, Err(LibraryError::Validation(_))));
        assert_eq!(store.get_book(book.id), Some(&book));
        let stored: Vec<Book> = persistence.load(BOOKS_KEY).await;
        assert_eq!(stored[0], book);
    }

    #[tokio::test]
    async fn finished_books_cannot_be_moved_back_by_update() {
        let (mut store, _) = empty_store().await;
        let book = store.add_book(new_book("Rocannon's World", 10), today()).await.unwrap();
        store
            .update_book(
                book.id,
                BookPatch {
                    current_page: Some(10),
                    status: Some(BookStatus::Finished),
                    ..Default::default()
                },
                today(),
            )
            .await
            .unwrap();
        let result = store
            .update_book(
                book.id,
                BookPatch {
                    status: Some(BookStatus::Reading),
                    ..Default::default()
                },
                today(),
            )
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn page_patches_are_recorded_as_progress() {
        let (mut store, _) = empty_store().await;
        let book = store.add_book(new_book("The Lathe of Heaven", 100), today()).await.unwrap();
        let page = |p| BookPatch {
            current_page: Some(p),
            ..Default::default()
        };

        let reading = store.update_book(book.id, page(10), today()).await.unwrap().unwrap();
        assert_eq!(reading.status, BookStatus::Reading);
        assert_eq!(reading.sessions.len(), 1);
        assert_eq!(reading.sessions[0].pages, 10);

        let done = store.update_book(book.id, page(100), today()).await.unwrap().unwrap();
        assert_eq!(done.status, BookStatus::Finished);
        assert_eq!(done.date_finished, Some(today()));
        assert_eq!(done.sessions.len(), 2);
        assert_eq!(done.sessions[0].pages, 90);
    }

    #[tokio::test]
    async fn finishing_by_status_sets_the_finish_date() {
        let (mut store, _) = empty_store().await;
        let book = store.add_book(new_book("The Eye of the Heron", 180), today()).await.unwrap();
        store.apply_progress(book.id, 120, today()).await.unwrap();

        let early = BookPatch {
            status: Some(BookStatus::Finished),
            ..Default::default()
        };
        assert!(matches!(
            store.update_book(book.id, early, today()).await,
            Err(LibraryError::Validation(_))
        ));

        let shortened = BookPatch {
            total_pages: Some(120),
            status: Some(BookStatus::Finished),
            ..Default::default()
        };
        let finished = store.update_book(book.id, shortened, today()).await.unwrap().unwrap();
        assert_eq!(finished.status, BookStatus::Finished);
        assert_eq!(finished.date_finished, Some(today()));
    }

    #[tokio::test]
    async fn a_reading_book_cannot_be_left_on_its_last_page() {
        let (mut store, _) = empty_store().await;
        let book = store.add_book(new_book("Malafrena", 200), today()).await.unwrap();
        store.apply_progress(book.id, 150, today()).await.unwrap();
        let before = store.get_book(book.id).cloned();

        let shrink = BookPatch {
            total_pages: Some(150),
            ..Default::default()
        };
        assert!(store.update_book(book.id, shrink, today()).await.is_err());
        assert_eq!(store.get_book(book.id).cloned(), before);
    }

    #[tokio::test]
    async fn field_edits_cannot_move_the_page() {
        let (mut store, _) = empty_store().await;
        let book = store.add_book(new_book("Searoad", 200), today()).await.unwrap();
        let patch = BookPatch {
            current_page: Some(200),
            ..Default::default()
        };
        assert!(store.edit_book(book.id, patch).await.is_err());
        assert_eq!(store.get_book(book.id), Some(&book));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (mut store, _) = empty_store().await;
        let book = store.add_book(new_book("Planet of Exile", 126), today()).await.unwrap();
        store.delete_book(Uuid::new_v4()).await.unwrap();
        assert_eq!(store.list_books().len(), 1);
        store.delete_book(book.id).await.unwrap();
        store.delete_book(book.id).await.unwrap();
        assert!(store.list_books().is_empty());
    }

    #[tokio::test]
    async fn sessions_are_most_recent_first() {
        let (mut store, _) = empty_store().await;
        let book = store.add_book(new_book("City of Illusions", 160), today()).await.unwrap();
        let yesterday = today().pred_opt().unwrap();
        store.record_session(book.id, 20, yesterday).await.unwrap();
        let updated = store.record_session(book.id, 9, today()).await.unwrap().unwrap();

        assert_eq!(updated.sessions.len(), 2);
        assert_eq!(updated.sessions[0].date, today());
        assert_eq!(updated.sessions[0].pages, 9);
        assert_eq!(updated.sessions[0].duration, 14);
        assert_eq!(updated.sessions[1].pages, 20);
        assert_eq!(updated.sessions[1].duration, 30);

        assert!(store.record_session(book.id, 0, today()).await.is_err());
        assert!(store.record_session(Uuid::new_v4(), 5, today()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reopening_reads_the_saved_collection() {
        let (mut store, persistence) = empty_store().await;
        store.add_book(new_book("The Word for World Is Forest", 189), today()).await.unwrap();
        let reopened = BookStore::open(persistence).await;
        assert_eq!(reopened.list_books(), store.list_books());
    }
}
