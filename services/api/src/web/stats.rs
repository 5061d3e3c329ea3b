//! services/api/src/web/stats.rs
//!
//! Read-only views computed from the collection on every request.

use crate::web::state::{today, AppState};
use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::Datelike;
use lumina_core::stats::{self, DashboardSummary, GenreCount, RatingBucket};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Serialize, ToSchema)]
pub struct StreakResponse {
    /// Consecutive reading days ending today (or yesterday).
    pub streak: u32,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MonthlyQuery {
    /// Defaults to the current year.
    pub year: Option<i32>,
}

#[derive(Serialize, ToSchema)]
pub struct MonthlyResponse {
    pub year: i32,
    /// Pages per month, January first.
    pub pages: Vec<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct RatingsResponse {
    /// Mean over rated finished books; 0 when none are rated.
    pub average: f64,
    pub buckets: Vec<RatingBucket>,
}

#[utoipa::path(
    get,
    path = "/stats/dashboard",
    responses((status = 200, body = DashboardSummary))
)]
pub async fn dashboard_handler(State(app_state): State<Arc<AppState>>) -> Json<DashboardSummary> {
    let library = app_state.library.lock().await;
    let yearly_goal = library.profile().profile().yearly_goal;
    Json(stats::dashboard(library.list_books(), today(), yearly_goal))
}

#[utoipa::path(
    get,
    path = "/stats/streak",
    responses((status = 200, body = StreakResponse))
)]
pub async fn streak_handler(State(app_state): State<Arc<AppState>>) -> Json<StreakResponse> {
    let library = app_state.library.lock().await;
    Json(StreakResponse {
        streak: stats::reading_streak(library.list_books(), today()),
    })
}

#[utoipa::path(
    get,
    path = "/stats/genres",
    responses((status = 200, description = "Books per genre, first seen first", body = [GenreCount]))
)]
pub async fn genres_handler(State(app_state): State<Arc<AppState>>) -> Json<Vec<GenreCount>> {
    let library = app_state.library.lock().await;
    Json(stats::genre_distribution(library.list_books()))
}

#[utoipa::path(
    get,
    path = "/stats/monthly",
    params(MonthlyQuery),
    responses((status = 200, body = MonthlyResponse))
)]
pub async fn monthly_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<MonthlyQuery>,
) -> Json<MonthlyResponse> {
    let year = query.year.unwrap_or_else(|| today().year());
    let library = app_state.library.lock().await;
    Json(MonthlyResponse {
        year,
        pages: stats::monthly_page_totals(library.list_books(), year).to_vec(),
    })
}

#[utoipa::path(
    get,
    path = "/stats/ratings",
    responses((status = 200, body = RatingsResponse))
)]
pub async fn ratings_handler(State(app_state): State<Arc<AppState>>) -> Json<RatingsResponse> {
    let library = app_state.library.lock().await;
    let books = library.list_books();
    Json(RatingsResponse {
        average: stats::average_rating(books),
        buckets: stats::rating_distribution(books),
    })
}
