//! crates/lumina_core/src/domain.rs
//!
//! Defines the core data structures of the reading tracker: books, their
//! reading sessions and notes, and the single user profile.
//!
//! The serde representation of these types is the persisted (and exported)
//! JSON document shape, so field names are camelCase on the wire.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{LibraryError, LibraryResult};

/// Minutes of reading assumed per page when estimating a session's duration.
pub const MINUTES_PER_PAGE: f64 = 1.5;
pub const DEFAULT_YEARLY_GOAL: u32 = 20;
pub const DEFAULT_DAILY_PAGE_GOAL: u32 = 30;
pub const MAX_RATING: u8 = 5;

const PLACEHOLDER_COVERS: [&str; 5] = [
    "https://images.unsplash.com/photo-1544947950-fa07a98d237f?w=300&h=450&fit=crop",
    "https://images.unsplash.com/photo-1512820790803-83ca734da794?w=300&h=450&fit=crop",
    "https://images.unsplash.com/photo-1543002588-bfa74002ed7e?w=300&h=450&fit=crop",
    "https://images.unsplash.com/photo-1495446815901-a7297e633e8d?w=300&h=450&fit=crop",
    "https://images.unsplash.com/photo-1474366521946-c3b3e5f5a5c6?w=300&h=450&fit=crop",
];

//=========================================================================================
// Enumerations
//=========================================================================================

/// Where a book sits in the reading lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    /// "To be read": acquired but not started.
    Tbr,
    Reading,
    Finished,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Tbr => "tbr",
            BookStatus::Reading => "reading",
            BookStatus::Finished => "finished",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            BookStatus::Tbr => "TBR",
            BookStatus::Reading => "Reading",
            BookStatus::Finished => "Finished",
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookStatus {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tbr" => Ok(BookStatus::Tbr),
            "reading" => Ok(BookStatus::Reading),
            "finished" => Ok(BookStatus::Finished),
            other => Err(LibraryError::Validation(format!(
                "unknown book status '{}'",
                other
            ))),
        }
    }
}

/// The closed set of genres a book can be filed under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "kebab-case")]
pub enum Genre {
    #[default]
    Fiction,
    NonFiction,
    SciFi,
    Fantasy,
    Mystery,
    Romance,
    Classic,
    Biography,
    Theology,
    SelfHelp,
}

impl Genre {
    pub const ALL: [Genre; 10] = [
        Genre::Fiction,
        Genre::NonFiction,
        Genre::SciFi,
        Genre::Fantasy,
        Genre::Mystery,
        Genre::Romance,
        Genre::Classic,
        Genre::Biography,
        Genre::Theology,
        Genre::SelfHelp,
    ];

    /// The wire key, e.g. `sci-fi`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Fiction => "fiction",
            Genre::NonFiction => "non-fiction",
            Genre::SciFi => "sci-fi",
            Genre::Fantasy => "fantasy",
            Genre::Mystery => "mystery",
            Genre::Romance => "romance",
            Genre::Classic => "classic",
            Genre::Biography => "biography",
            Genre::Theology => "theology",
            Genre::SelfHelp => "self-help",
        }
    }

    /// Display label used by statistics, e.g. `Classic Literature`.
    pub fn label(&self) -> &'static str {
        match self {
            Genre::Fiction => "Fiction",
            Genre::NonFiction => "Non-Fiction",
            Genre::SciFi => "Sci-Fi",
            Genre::Fantasy => "Fantasy",
            Genre::Mystery => "Mystery",
            Genre::Romance => "Romance",
            Genre::Classic => "Classic Literature",
            Genre::Biography => "Biography",
            Genre::Theology => "Theology/Christian",
            Genre::SelfHelp => "Self-Help",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Genre {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Genre::ALL
            .into_iter()
            .find(|g| g.as_str() == key)
            .ok_or_else(|| LibraryError::Validation(format!("unknown genre '{}'", s.trim())))
    }
}

//=========================================================================================
// Book and its nested records
//=========================================================================================

/// One logged reading update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Session {
    pub date: NaiveDate,
    /// Page delta since the previously recorded position.
    pub pages: u32,
    /// Estimated minutes, derived from `pages`.
    pub duration: u32,
}

impl Session {
    pub fn new(date: NaiveDate, pages: u32) -> Self {
        Self {
            date,
            pages,
            duration: (pages as f64 * MINUTES_PER_PAGE).round() as u32,
        }
    }
}

/// A free-form (rich text) note attached to a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Note {
    pub id: Uuid,
    pub text: String,
    pub date: NaiveDate,
}

/// A book in the user's library.
///
/// `sessions` and `notes` are kept most-recent-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    pub total_pages: u32,
    #[serde(default)]
    pub current_page: u32,
    /// Zero means chapters are not tracked.
    #[serde(default)]
    pub total_chapters: u32,
    #[serde(default, rename = "chapterList")]
    pub chapter_titles: Vec<String>,
    /// Zero means no chapter started.
    #[serde(default)]
    pub current_chapter: u32,
    #[serde(default)]
    pub genre: Genre,
    pub status: BookStatus,
    /// 0 = unrated, otherwise 1..=5.
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub review: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub notes: Vec<Note>,
    pub date_added: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_finished: Option<NaiveDate>,
}

impl Book {
    /// Checks the record-level invariants that every stored book must hold.
    pub fn validate(&self) -> LibraryResult<()> {
        if self.title.trim().is_empty() {
            return Err(LibraryError::Validation("title must not be empty".into()));
        }
        if self.author.trim().is_empty() {
            return Err(LibraryError::Validation("author must not be empty".into()));
        }
        if self.total_pages < 1 {
            return Err(LibraryError::Validation(
                "total pages must be at least 1".into(),
            ));
        }
        if self.current_page > self.total_pages {
            return Err(LibraryError::Validation(format!(
                "current page {} exceeds total pages {}",
                self.current_page, self.total_pages
            )));
        }
        if self.current_chapter > self.total_chapters {
            return Err(LibraryError::Validation(format!(
                "current chapter {} exceeds total chapters {}",
                self.current_chapter, self.total_chapters
            )));
        }
        if !self.chapter_titles.is_empty()
            && self.chapter_titles.len() != self.total_chapters as usize
        {
            return Err(LibraryError::Validation(format!(
                "{} chapter titles given for {} chapters",
                self.chapter_titles.len(),
                self.total_chapters
            )));
        }
        if self.rating > MAX_RATING {
            return Err(LibraryError::Validation(format!(
                "rating {} is outside 0..={}",
                self.rating, MAX_RATING
            )));
        }
        if self.status != BookStatus::Finished && self.current_page == self.total_pages {
            return Err(LibraryError::Validation(format!(
                "a book on its last page must be finished, not '{}'",
                self.status
            )));
        }
        if self.status == BookStatus::Tbr && self.current_page > 0 {
            return Err(LibraryError::Validation(
                "a to-be-read book cannot have pages read".into(),
            ));
        }
        Ok(())
    }

    /// The stored cover, or a placeholder picked stably from the id.
    pub fn cover_or_placeholder(&self) -> &str {
        match &self.cover {
            Some(cover) if !cover.is_empty() => cover,
            _ => {
                let slot = self.id.as_u128() % PLACEHOLDER_COVERS.len() as u128;
                PLACEHOLDER_COVERS[slot as usize]
            }
        }
    }

    /// Label for a 1-based chapter index: the named title when the book
    /// carries a chapter list, otherwise `Chapter N`.
    pub fn chapter_label(&self, index: u32) -> Option<String> {
        if index == 0 || index > self.total_chapters {
            return None;
        }
        Some(
            self.chapter_titles
                .get(index as usize - 1)
                .cloned()
                .unwrap_or_else(|| format!("Chapter {}", index)),
        )
    }

    pub fn is_finished(&self) -> bool {
        self.status == BookStatus::Finished
    }
}

/// The fields a caller supplies to create a book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub cover: Option<String>,
    pub total_pages: u32,
    pub total_chapters: u32,
    #[serde(rename = "chapterList")]
    pub chapter_titles: Vec<String>,
    pub genre: Genre,
    pub description: String,
}

/// A typed partial update: every field is optional and only the supplied
/// ones replace the stored values. Nested lists are replaced wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub cover: Option<String>,
    pub total_pages: Option<u32>,
    pub current_page: Option<u32>,
    pub total_chapters: Option<u32>,
    #[serde(rename = "chapterList")]
    pub chapter_titles: Option<Vec<String>>,
    pub current_chapter: Option<u32>,
    pub genre: Option<Genre>,
    pub status: Option<BookStatus>,
    pub rating: Option<u8>,
    pub review: Option<String>,
    pub description: Option<String>,
    pub sessions: Option<Vec<Session>>,
    pub notes: Option<Vec<Note>>,
    pub date_finished: Option<NaiveDate>,
}

impl BookPatch {
    /// Applies the supplied fields onto `book`, field by field.
    pub fn apply_to(self, book: &mut Book) {
        if let Some(title) = self.title {
            book.title = title;
        }
        if let Some(author) = self.author {
            book.author = author;
        }
        if let Some(cover) = self.cover {
            book.cover = Some(cover);
        }
        if let Some(total_pages) = self.total_pages {
            book.total_pages = total_pages;
        }
        if let Some(current_page) = self.current_page {
            book.current_page = current_page;
        }
        if let Some(total_chapters) = self.total_chapters {
            book.total_chapters = total_chapters;
        }
        if let Some(chapter_titles) = self.chapter_titles {
            book.chapter_titles = chapter_titles;
        }
        if let Some(current_chapter) = self.current_chapter {
            book.current_chapter = current_chapter;
        }
        if let Some(genre) = self.genre {
            book.genre = genre;
        }
        if let Some(status) = self.status {
            book.status = status;
        }
        if let Some(rating) = self.rating {
            book.rating = rating;
        }
        if let Some(review) = self.review {
            book.review = review;
        }
        if let Some(description) = self.description {
            book.description = description;
        }
        if let Some(sessions) = self.sessions {
            book.sessions = sessions;
        }
        if let Some(notes) = self.notes {
            book.notes = notes;
        }
        if let Some(date_finished) = self.date_finished {
            book.date_finished = Some(date_finished);
        }
    }
}

//=========================================================================================
// User profile
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Preferences {
    pub notifications: bool,
    pub privacy: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            notifications: true,
            privacy: false,
        }
    }
}

/// The singleton profile of the library's owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub bio: String,
    /// Initials, or an embedded `data:image/...` URI.
    #[serde(default)]
    pub avatar: String,
    pub yearly_goal: u32,
    pub daily_page_goal: u32,
    #[serde(default)]
    pub preferences: Preferences,
}

impl Default for UserProfile {
    fn default() -> Self {
        let name = "Reader".to_string();
        Self {
            avatar: initials(&name),
            name,
            title: "Avid Reader".to_string(),
            bio: String::new(),
            yearly_goal: DEFAULT_YEARLY_GOAL,
            daily_page_goal: DEFAULT_DAILY_PAGE_GOAL,
            preferences: Preferences::default(),
        }
    }
}

impl UserProfile {
    pub fn validate(&self) -> LibraryResult<()> {
        if self.name.trim().is_empty() {
            return Err(LibraryError::Validation("name must not be empty".into()));
        }
        if self.yearly_goal == 0 {
            return Err(LibraryError::Validation(
                "yearly goal must be positive".into(),
            ));
        }
        if self.daily_page_goal == 0 {
            return Err(LibraryError::Validation(
                "daily page goal must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn avatar_is_image(&self) -> bool {
        self.avatar.starts_with("data:image")
    }
}

/// Up to two uppercase initials taken from the words of `name`.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

//=========================================================================================
// Export document
//=========================================================================================

/// The full-state export: the ordered book list, the profile and a timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub books: Vec<Book>,
    pub user: UserProfile,
    pub export_date: DateTime<Utc>,
}
