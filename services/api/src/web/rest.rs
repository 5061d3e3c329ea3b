//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification. The handlers live in
//! the `books`, `stats`, `profile` and `transfer` modules.

use crate::web::{books, profile, stats, transfer};
use lumina_core::domain::{
    Book, BookPatch, BookStatus, ExportDocument, Genre, NewBook, Note, Preferences, Session,
    UserProfile,
};
use lumina_core::library::ProgressOutcome;
use lumina_core::ports::SearchCandidate;
use lumina_core::profile::{OnboardingForm, ProfileEdit};
use lumina_core::progress::Milestone;
use lumina_core::stats::{DashboardSummary, GenreCount, GoalProgress, RatingBucket};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        books::list_books_handler,
        books::create_book_handler,
        books::draft_book_handler,
        books::get_book_handler,
        books::update_book_handler,
        books::delete_book_handler,
        books::update_progress_handler,
        books::advance_chapter_handler,
        books::start_reading_handler,
        books::save_review_handler,
        books::estimate_handler,
        books::add_note_handler,
        books::delete_note_handler,
        stats::dashboard_handler,
        stats::streak_handler,
        stats::genres_handler,
        stats::monthly_handler,
        stats::ratings_handler,
        profile::get_profile_handler,
        profile::edit_profile_handler,
        profile::onboarding_handler,
        profile::goals_handler,
        profile::preferences_handler,
        profile::avatar_handler,
        profile::restart_handler,
        transfer::export_handler,
        transfer::import_handler,
        transfer::clear_handler,
    ),
    components(
        schemas(
            Book, BookPatch, BookStatus, Genre, NewBook, Note, Session,
            UserProfile, Preferences, ExportDocument, OnboardingForm, ProfileEdit,
            ProgressOutcome, Milestone, SearchCandidate,
            DashboardSummary, GoalProgress, GenreCount, RatingBucket,
            books::ProgressRequest, books::ChapterRequest, books::ReviewRequest,
            books::NoteRequest, books::EstimateResponse,
            stats::StreakResponse, stats::MonthlyResponse, stats::RatingsResponse,
            profile::ProfileResponse, profile::GoalsRequest, profile::AvatarRequest,
            transfer::ImportResponse,
        )
    ),
    tags(
        (name = "Lumina API", description = "Reading tracker: books, progress, statistics and profile.")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        for path in [
            "/books",
            "/books/{id}",
            "/books/{id}/progress",
            "/books/{id}/notes/{note_id}",
            "/stats/monthly",
            "/profile/goals",
            "/import",
            "/data",
        ] {
            assert!(paths.contains_key(path), "missing {}", path);
        }
    }
}
