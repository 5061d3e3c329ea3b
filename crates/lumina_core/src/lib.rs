pub mod book_store;
pub mod domain;
pub mod error;
pub mod library;
pub mod memory;
pub mod persistence;
pub mod ports;
pub mod profile;
pub mod progress;
pub mod search;
pub mod smart_import;
pub mod stats;

pub use book_store::BookStore;
pub use domain::{
    Book, BookPatch, BookStatus, ExportDocument, Genre, NewBook, Note, Preferences, Session,
    UserProfile,
};
pub use error::{LibraryError, LibraryResult};
pub use library::{Library, LibraryQuery, ProgressOutcome};
pub use memory::MemoryStore;
pub use persistence::Persistence;
pub use ports::{
    BookSearchClient, DocumentMetadata, KeyValueStore, MetadataExtractor, PortError, PortResult,
    SearchCandidate,
};
pub use profile::{OnboardingForm, ProfileEdit, ProfileStore};
pub use progress::{Milestone, TimeLeft};
pub use search::{InputOutcome, SearchDebouncer, SearchEvent};
