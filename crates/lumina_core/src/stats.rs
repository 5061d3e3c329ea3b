//! crates/lumina_core/src/stats.rs
//!
//! Cross-book aggregates: daily and weekly page totals, the reading streak,
//! yearly-goal progress and the genre, monthly and rating distributions.
//!
//! Everything is recomputed from the collection on demand; a single user's
//! library is small enough that no caching is needed.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::domain::{Book, BookStatus, Genre, MAX_RATING};

/// How far back the streak walk looks.
pub const STREAK_WINDOW_DAYS: u32 = 365;

fn sessions(books: &[Book]) -> impl Iterator<Item = &crate::domain::Session> {
    books.iter().flat_map(|b| b.sessions.iter())
}

/// Pages logged on `date` across all books.
pub fn pages_on_date(books: &[Book], date: NaiveDate) -> u32 {
    sessions(books)
        .filter(|s| s.date == date)
        .map(|s| s.pages)
        .sum()
}

/// Daily totals for the seven days ending on `today`, oldest first.
pub fn weekly_activity(books: &[Book], today: NaiveDate) -> [u32; 7] {
    let mut days = [0u32; 7];
    for (slot, offset) in days.iter_mut().zip((0..7).rev()) {
        *slot = pages_on_date(books, today - Duration::days(offset));
    }
    days
}

/// Consecutive days with pages read, walking back from `today`.
///
/// An empty `today` does not break the streak: yesterday's run still counts.
pub fn reading_streak(books: &[Book], today: NaiveDate) -> u32 {
    let mut streak = 0;
    for offset in 0..STREAK_WINDOW_DAYS {
        let date = today - Duration::days(offset as i64);
        if pages_on_date(books, date) > 0 {
            streak += 1;
        } else if offset > 0 {
            break;
        }
    }
    streak
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub finished_count: u32,
    pub goal: u32,
    /// Clamped to 100.
    pub percent: u32,
    pub remaining: u32,
}

pub fn finished_count(books: &[Book]) -> u32 {
    books.iter().filter(|b| b.is_finished()).count() as u32
}

pub fn goal_progress(books: &[Book], yearly_goal: u32) -> GoalProgress {
    let finished = finished_count(books);
    let percent = if yearly_goal == 0 {
        100
    } else {
        ((finished as f64 / yearly_goal as f64 * 100.0).round() as u32).min(100)
    };
    GoalProgress {
        finished_count: finished,
        goal: yearly_goal,
        percent,
        remaining: yearly_goal.saturating_sub(finished),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GenreCount {
    pub genre: Genre,
    pub label: String,
    pub count: u32,
}

/// Book count per genre, in the order genres are first encountered.
pub fn genre_distribution(books: &[Book]) -> Vec<GenreCount> {
    let mut counts: Vec<GenreCount> = Vec::new();
    for book in books {
        match counts.iter_mut().find(|c| c.genre == book.genre) {
            Some(entry) => entry.count += 1,
            None => counts.push(GenreCount {
                genre: book.genre,
                label: book.genre.label().to_string(),
                count: 1,
            }),
        }
    }
    counts
}

/// Pages logged in each month of `year`, January first.
pub fn monthly_page_totals(books: &[Book], year: i32) -> [u32; 12] {
    let mut months = [0u32; 12];
    for session in sessions(books).filter(|s| s.date.year() == year) {
        months[session.date.month0() as usize] += session.pages;
    }
    months
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RatingBucket {
    pub stars: u8,
    pub count: u32,
    /// Share of all finished books, rated or not.
    pub percent: f64,
}

/// Buckets for 5 down to 1 stars over the finished books.
pub fn rating_distribution(books: &[Book]) -> Vec<RatingBucket> {
    let finished: Vec<&Book> = books.iter().filter(|b| b.is_finished()).collect();
    let total = finished.len() as u32;
    (1..=MAX_RATING)
        .rev()
        .map(|stars| {
            let count = finished.iter().filter(|b| b.rating == stars).count() as u32;
            let percent = if total == 0 {
                0.0
            } else {
                count as f64 / total as f64 * 100.0
            };
            RatingBucket { stars, count, percent }
        })
        .collect()
}

/// Mean rating of finished books that have been rated; 0.0 when none are.
pub fn average_rating(books: &[Book]) -> f64 {
    let ratings: Vec<u8> = books
        .iter()
        .filter(|b| b.is_finished() && b.rating > 0)
        .map(|b| b.rating)
        .collect();
    if ratings.is_empty() {
        return 0.0;
    }
    ratings.iter().map(|&r| r as f64).sum::<f64>() / ratings.len() as f64
}

/// Sum of every book's current page.
pub fn total_pages_read(books: &[Book]) -> u64 {
    books.iter().map(|b| b.current_page as u64).sum()
}

/// The dashboard's numbers in one pass over the collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub pages_today: u32,
    pub weekly_activity: Vec<u32>,
    pub weekly_total: u32,
    pub streak: u32,
    pub goal: GoalProgress,
    pub reading_count: u32,
    pub total_pages_read: u64,
    pub average_rating: f64,
}

pub fn dashboard(books: &[Book], today: NaiveDate, yearly_goal: u32) -> DashboardSummary {
    let weekly = weekly_activity(books, today);
    DashboardSummary {
        pages_today: weekly[6],
        weekly_total: weekly.iter().sum(),
        weekly_activity: weekly.to_vec(),
        streak: reading_streak(books, today),
        goal: goal_progress(books, yearly_goal),
        reading_count: books
            .iter()
            .filter(|b| b.status == BookStatus::Reading)
            .count() as u32,
        total_pages_read: total_pages_read(books),
        average_rating: average_rating(books),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Session;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn book_with(genre: Genre, status: BookStatus, rating: u8, sessions: Vec<Session>) -> Book {
        Book {
            id: Uuid::new_v4(),
            title: "Title".into(),
            author: "Author".into(),
            cover: None,
            total_pages: 200,
            current_page: if status == BookStatus::Finished { 200 } else { 0 },
            total_chapters: 0,
            chapter_titles: Vec::new(),
            current_chapter: 0,
            genre,
            status,
            rating,
            review: String::new(),
            description: String::new(),
            sessions,
            notes: Vec::new(),
            date_added: date(2024, 1, 1),
            date_finished: None,
        }
    }

    fn reading(sessions: Vec<Session>) -> Book {
        book_with(Genre::Fiction, BookStatus::Reading, 0, sessions)
    }

    fn finished(rating: u8) -> Book {
        book_with(Genre::Fiction, BookStatus::Finished, rating, Vec::new())
    }

    #[test]
    fn pages_on_date_sums_across_books() {
        let today = date(2024, 5, 10);
        let books = vec![
            reading(vec![Session::new(today, 12), Session::new(date(2024, 5, 9), 7)]),
            reading(vec![Session::new(today, 8)]),
        ];
        assert_eq!(pages_on_date(&books, today), 20);
        assert_eq!(pages_on_date(&books, date(2024, 5, 9)), 7);
        assert_eq!(pages_on_date(&books, date(2024, 5, 8)), 0);
    }

    #[test]
    fn weekly_activity_is_oldest_first() {
        let today = date(2024, 3, 2);
        let books = vec![reading(vec![
            Session::new(today, 5),
            Session::new(date(2024, 2, 25), 9),
            Session::new(date(2024, 2, 24), 100),
        ])];
        assert_eq!(weekly_activity(&books, today), [9, 0, 0, 0, 0, 0, 5]);
    }

    #[test]
    fn streak_is_zero_without_sessions() {
        assert_eq!(reading_streak(&[], date(2024, 1, 1)), 0);
        let old = vec![reading(vec![Session::new(date(2022, 1, 1), 10)])];
        assert_eq!(reading_streak(&old, date(2024, 1, 1)), 0);
    }

    #[test]
    fn streak_counts_consecutive_days_including_today() {
        let today = date(2024, 3, 1);
        let sessions = (0..4)
            .map(|back| Session::new(today - Duration::days(back), 10))
            .chain(std::iter::once(Session::new(today - Duration::days(5), 10)))
            .collect();
        let books = vec![reading(sessions)];
        assert_eq!(reading_streak(&books, today), 4);
    }

    #[test]
    fn empty_today_keeps_yesterdays_run() {
        let today = date(2024, 3, 1);
        let books = vec![reading(vec![
            Session::new(today - Duration::days(1), 10),
            Session::new(today - Duration::days(2), 10),
        ])];
        assert_eq!(reading_streak(&books, today), 2);
    }

    #[test]
    fn streak_walk_is_bounded() {
        let today = date(2024, 12, 31);
        let sessions = (0..400)
            .map(|back| Session::new(today - Duration::days(back), 1))
            .collect();
        assert_eq!(reading_streak(&[reading(sessions)], today), 365);
    }

    #[test]
    fn goal_progress_clamps() {
        let five: Vec<Book> = (0..5).map(|_| finished(0)).collect();
        let progress = goal_progress(&five, 20);
        assert_eq!(progress.finished_count, 5);
        assert_eq!(progress.percent, 25);
        assert_eq!(progress.remaining, 15);

        let many: Vec<Book> = (0..25).map(|_| finished(0)).collect();
        let progress = goal_progress(&many, 20);
        assert_eq!(progress.percent, 100);
        assert_eq!(progress.remaining, 0);
    }

    #[test]
    fn genres_keep_first_seen_order() {
        let books = vec![
            book_with(Genre::Mystery, BookStatus::Tbr, 0, Vec::new()),
            book_with(Genre::Classic, BookStatus::Tbr, 0, Vec::new()),
            book_with(Genre::Mystery, BookStatus::Tbr, 0, Vec::new()),
        ];
        let dist = genre_distribution(&books);
        assert_eq!(dist.len(), 2);
        assert_eq!(dist[0].genre, Genre::Mystery);
        assert_eq!(dist[0].count, 2);
        assert_eq!(dist[1].label, "Classic Literature");
    }

    #[test]
    fn monthly_totals_only_count_the_year() {
        let books = vec![reading(vec![
            Session::new(date(2024, 1, 31), 10),
            Session::new(date(2024, 1, 2), 5),
            Session::new(date(2024, 12, 1), 7),
            Session::new(date(2023, 1, 5), 99),
        ])];
        let months = monthly_page_totals(&books, 2024);
        assert_eq!(months[0], 15);
        assert_eq!(months[11], 7);
        assert_eq!(months.iter().sum::<u32>(), 22);
    }

    #[test]
    fn rating_buckets_use_all_finished_books() {
        let books = vec![finished(5), finished(5), finished(3), finished(0), reading(Vec::new())];
        let dist = rating_distribution(&books);
        assert_eq!(dist.len(), 5);
        assert_eq!(dist[0].stars, 5);
        assert_eq!(dist[0].count, 2);
        assert!((dist[0].percent - 50.0).abs() < f64::EPSILON);
        assert_eq!(dist[2].count, 1);
        assert_eq!(dist[4].count, 0);

        assert!(rating_distribution(&[]).iter().all(|b| b.percent == 0.0));
    }

    #[test]
    fn average_ignores_unrated() {
        let books = vec![finished(5), finished(4), finished(0)];
        assert!((average_rating(&books) - 4.5).abs() < f64::EPSILON);
        assert_eq!(average_rating(&[finished(0)]), 0.0);
    }

    #[test]
    fn dashboard_bundles_the_numbers() {
        let today = date(2024, 7, 4);
        let books = vec![reading(vec![Session::new(today, 30)]), finished(4)];
        let summary = dashboard(&books, today, 10);
        assert_eq!(summary.pages_today, 30);
        assert_eq!(summary.weekly_total, 30);
        assert_eq!(summary.streak, 1);
        assert_eq!(summary.goal.percent, 10);
        assert_eq!(summary.reading_count, 1);
        assert_eq!(summary.total_pages_read, 200);
    }
}
