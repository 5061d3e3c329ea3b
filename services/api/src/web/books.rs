//! services/api/src/web/books.rs
//!
//! Handlers for the book collection: CRUD, reading progress, chapters,
//! reviews and notes.

use crate::error::{book_not_found, to_http, HandlerError};
use crate::web::state::{today, AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use lumina_core::domain::{Book, BookPatch, NewBook, Note};
use lumina_core::library::{LibraryQuery, ProgressOutcome};
use lumina_core::ports::SearchCandidate;
use lumina_core::progress::TimeLeft;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Request and Response Payloads
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct ProgressRequest {
    /// The page the reader is now on.
    pub page: u32,
}

#[derive(Deserialize, ToSchema)]
pub struct ChapterRequest {
    pub chapter: u32,
}

#[derive(Deserialize, ToSchema)]
pub struct ReviewRequest {
    /// 0 to 5 stars; 0 means unrated.
    pub rating: u8,
    #[serde(default)]
    pub review: String,
}

#[derive(Deserialize, ToSchema)]
pub struct NoteRequest {
    pub text: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EstimateResponse {
    pub completed: bool,
    /// Absent once the book is completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<u32>,
    pub pages_per_day: u32,
}

//=========================================================================================
// Collection
//=========================================================================================

/// List books, optionally filtered by status, genre and a title/author search.
#[utoipa::path(
    get,
    path = "/books",
    params(LibraryQuery),
    responses((status = 200, description = "Books in insertion order", body = [Book]))
)]
pub async fn list_books_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<LibraryQuery>,
) -> Json<Vec<Book>> {
    let library = app_state.library.lock().await;
    Json(library.query(&query).into_iter().cloned().collect())
}

/// Add a book to the library with status `tbr`.
#[utoipa::path(
    post,
    path = "/books",
    request_body = NewBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Missing title or author, or zero pages"),
        (status = 500, description = "The library could not be saved")
    )
)]
pub async fn create_book_handler(
    State(app_state): State<Arc<AppState>>,
    Json(fields): Json<NewBook>,
) -> Result<impl IntoResponse, HandlerError> {
    let mut library = app_state.library.lock().await;
    let book = library.add_book(fields, today()).await.map_err(to_http)?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Turn an online search result into an editable draft. Nothing is stored.
#[utoipa::path(
    post,
    path = "/books/draft",
    request_body = SearchCandidate,
    responses((status = 200, description = "Draft fields for a new book", body = NewBook))
)]
pub async fn draft_book_handler(Json(candidate): Json<SearchCandidate>) -> Json<NewBook> {
    Json(NewBook::from(candidate))
}

//=========================================================================================
// Single Book
//=========================================================================================

#[utoipa::path(
    get,
    path = "/books/{id}",
    params(("id" = Uuid, Path, description = "Book id")),
    responses(
        (status = 200, body = Book),
        (status = 404, description = "No such book")
    )
)]
pub async fn get_book_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Book>, HandlerError> {
    let library = app_state.library.lock().await;
    library
        .get_book(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| book_not_found(id))
}

/// Apply a partial update. Status changes must follow `tbr → reading → finished`;
/// a `currentPage` change is recorded as today's progress.
#[utoipa::path(
    patch,
    path = "/books/{id}",
    params(("id" = Uuid, Path, description = "Book id")),
    request_body = BookPatch,
    responses(
        (status = 200, body = Book),
        (status = 400, description = "Invalid field or status transition"),
        (status = 404, description = "No such book")
    )
)]
pub async fn update_book_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(patch): Json<BookPatch>,
) -> Result<Json<Book>, HandlerError> {
    let mut library = app_state.library.lock().await;
    library
        .update_book(id, patch, today())
        .await
        .map_err(to_http)?
        .map(Json)
        .ok_or_else(|| book_not_found(id))
}

/// Delete a book. Deleting an unknown id succeeds.
#[utoipa::path(
    delete,
    path = "/books/{id}",
    params(("id" = Uuid, Path, description = "Book id")),
    responses((status = 204, description = "Book removed"))
)]
pub async fn delete_book_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HandlerError> {
    let mut library = app_state.library.lock().await;
    library.delete_book(id).await.map_err(to_http)?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Reading Progress
//=========================================================================================

/// Move to a page, logging a session for today when it is forward progress.
#[utoipa::path(
    post,
    path = "/books/{id}/progress",
    params(("id" = Uuid, Path, description = "Book id")),
    request_body = ProgressRequest,
    responses(
        (status = 200, body = ProgressOutcome),
        (status = 400, description = "Page outside 0..=totalPages"),
        (status = 404, description = "No such book")
    )
)]
pub async fn update_progress_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<ProgressRequest>,
) -> Result<Json<ProgressOutcome>, HandlerError> {
    let mut library = app_state.library.lock().await;
    library
        .update_progress(id, request.page, today())
        .await
        .map_err(to_http)?
        .map(Json)
        .ok_or_else(|| book_not_found(id))
}

#[utoipa::path(
    post,
    path = "/books/{id}/chapter",
    params(("id" = Uuid, Path, description = "Book id")),
    request_body = ChapterRequest,
    responses(
        (status = 200, body = Book),
        (status = 400, description = "Chapter outside 0..=totalChapters"),
        (status = 404, description = "No such book")
    )
)]
pub async fn advance_chapter_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChapterRequest>,
) -> Result<Json<Book>, HandlerError> {
    let mut library = app_state.library.lock().await;
    library
        .advance_chapter(id, request.chapter)
        .await
        .map_err(to_http)?
        .map(Json)
        .ok_or_else(|| book_not_found(id))
}

#[utoipa::path(
    post,
    path = "/books/{id}/start",
    params(("id" = Uuid, Path, description = "Book id")),
    responses(
        (status = 200, body = Book),
        (status = 400, description = "The book is already finished"),
        (status = 404, description = "No such book")
    )
)]
pub async fn start_reading_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Book>, HandlerError> {
    let mut library = app_state.library.lock().await;
    let book = library
        .start_reading(id)
        .await
        .map_err(to_http)?
        .ok_or_else(|| book_not_found(id))?;
    info!("Started reading '{}'", book.title);
    Ok(Json(book))
}

#[utoipa::path(
    put,
    path = "/books/{id}/review",
    params(("id" = Uuid, Path, description = "Book id")),
    request_body = ReviewRequest,
    responses(
        (status = 200, body = Book),
        (status = 400, description = "Rating above 5"),
        (status = 404, description = "No such book")
    )
)]
pub async fn save_review_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<Book>, HandlerError> {
    let mut library = app_state.library.lock().await;
    library
        .save_review(id, request.rating, &request.review)
        .await
        .map_err(to_http)?
        .map(Json)
        .ok_or_else(|| book_not_found(id))
}

/// Days left at the configured reading pace.
#[utoipa::path(
    get,
    path = "/books/{id}/estimate",
    params(("id" = Uuid, Path, description = "Book id")),
    responses(
        (status = 200, body = EstimateResponse),
        (status = 404, description = "No such book")
    )
)]
pub async fn estimate_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<EstimateResponse>, HandlerError> {
    let library = app_state.library.lock().await;
    let estimate = library.estimate(id).ok_or_else(|| book_not_found(id))?;
    let pages_per_day = app_state.config.reading_pace;
    let response = match estimate {
        TimeLeft::Completed => EstimateResponse {
            completed: true,
            days_remaining: None,
            pages_per_day,
        },
        TimeLeft::Days(days) => EstimateResponse {
            completed: false,
            days_remaining: Some(days),
            pages_per_day,
        },
    };
    Ok(Json(response))
}

//=========================================================================================
// Notes
//=========================================================================================

#[utoipa::path(
    post,
    path = "/books/{id}/notes",
    params(("id" = Uuid, Path, description = "Book id")),
    request_body = NoteRequest,
    responses(
        (status = 201, body = Note),
        (status = 400, description = "Empty note"),
        (status = 404, description = "No such book")
    )
)]
pub async fn add_note_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<NoteRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let mut library = app_state.library.lock().await;
    let note = library
        .add_note(id, &request.text, today())
        .await
        .map_err(to_http)?
        .ok_or_else(|| book_not_found(id))?;
    Ok((StatusCode::CREATED, Json(note)))
}

#[utoipa::path(
    delete,
    path = "/books/{id}/notes/{note_id}",
    params(
        ("id" = Uuid, Path, description = "Book id"),
        ("note_id" = Uuid, Path, description = "Note id")
    ),
    responses(
        (status = 200, description = "The book after removal", body = Book),
        (status = 404, description = "No such book")
    )
)]
pub async fn delete_note_handler(
    State(app_state): State<Arc<AppState>>,
    Path((id, note_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Book>, HandlerError> {
    let mut library = app_state.library.lock().await;
    library
        .delete_note(id, note_id)
        .await
        .map_err(to_http)?
        .map(Json)
        .ok_or_else(|| book_not_found(id))
}
