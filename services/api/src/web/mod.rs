pub mod books;
pub mod profile;
pub mod rest;
pub mod state;
pub mod stats;
pub mod transfer;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use state::AppState;

/// Builds the REST router over the shared state. CORS and Swagger UI are
/// layered on by the binary.
pub fn router(app_state: Arc<AppState>) -> Router {
    let book_routes = Router::new()
        .route(
            "/books",
            get(books::list_books_handler).post(books::create_book_handler),
        )
        .route("/books/draft", post(books::draft_book_handler))
        .route(
            "/books/{id}",
            get(books::get_book_handler)
                .patch(books::update_book_handler)
                .delete(books::delete_book_handler),
        )
        .route("/books/{id}/progress", post(books::update_progress_handler))
        .route("/books/{id}/chapter", post(books::advance_chapter_handler))
        .route("/books/{id}/start", post(books::start_reading_handler))
        .route("/books/{id}/review", put(books::save_review_handler))
        .route("/books/{id}/notes", post(books::add_note_handler))
        .route(
            "/books/{id}/notes/{note_id}",
            delete(books::delete_note_handler),
        )
        .route("/books/{id}/estimate", get(books::estimate_handler));

    let stats_routes = Router::new()
        .route("/stats/dashboard", get(stats::dashboard_handler))
        .route("/stats/streak", get(stats::streak_handler))
        .route("/stats/genres", get(stats::genres_handler))
        .route("/stats/monthly", get(stats::monthly_handler))
        .route("/stats/ratings", get(stats::ratings_handler));

    let profile_routes = Router::new()
        .route(
            "/profile",
            get(profile::get_profile_handler).put(profile::edit_profile_handler),
        )
        .route("/profile/onboarding", post(profile::onboarding_handler))
        .route("/profile/goals", put(profile::goals_handler))
        .route("/profile/preferences", put(profile::preferences_handler))
        .route("/profile/avatar", put(profile::avatar_handler))
        .route("/profile/restart", post(profile::restart_handler));

    let transfer_routes = Router::new()
        .route("/export", get(transfer::export_handler))
        .route("/import", post(transfer::import_handler))
        .route("/data", delete(transfer::clear_handler));

    Router::new()
        .merge(book_routes)
        .merge(stats_routes)
        .merge(profile_routes)
        .merge(transfer_routes)
        .with_state(app_state)
}
