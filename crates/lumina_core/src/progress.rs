//! crates/lumina_core/src/progress.rs
//!
//! Pure derivations over a single book: completion percentage, the status
//! state machine, page and chapter updates, and time-left estimates.
//! Nothing here touches storage; callers persist the results through the
//! book store.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{Book, BookStatus, Session};
use crate::error::{LibraryError, LibraryResult};

/// Reading pace assumed when none is configured.
pub const DEFAULT_PAGES_PER_DAY: u32 = 30;

/// Percentage of pages read, rounded to the nearest integer.
pub fn completion_percent(book: &Book) -> u32 {
    if book.total_pages == 0 {
        return 0;
    }
    (book.current_page as f64 / book.total_pages as f64 * 100.0).round() as u32
}

//=========================================================================================
// Status State Machine
//=========================================================================================

/// Checks a status change made through normal operations.
///
/// `tbr -> reading`, `tbr -> finished` and `reading -> finished` are the only
/// forward moves, and entering `finished` requires the last page. Returning a
/// book to `tbr` is reserved for [`reset_progress`].
pub fn check_status_change(before: &Book, after: &Book) -> LibraryResult<()> {
    use BookStatus::*;

    match (before.status, after.status) {
        (from, to) if from == to => Ok(()),
        (Tbr, Reading) => Ok(()),
        (Tbr, Finished) | (Reading, Finished) => {
            if after.current_page == after.total_pages {
                Ok(())
            } else {
                Err(LibraryError::Validation(format!(
                    "a book can only be finished on its last page ({} of {})",
                    after.current_page, after.total_pages
                )))
            }
        }
        (from, to) => Err(LibraryError::Validation(format!(
            "cannot move a book from '{}' to '{}'",
            from, to
        ))),
    }
}

/// Bulk-reset semantics for one book: sessions cleared, back to page zero,
/// and a finished book returns to `tbr`.
pub fn reset_progress(book: &mut Book) {
    book.sessions.clear();
    book.current_page = 0;
    if book.status == BookStatus::Finished {
        book.status = BookStatus::Tbr;
        book.date_finished = None;
    }
}

//=========================================================================================
// Page Progress
//=========================================================================================

/// The result of moving a book's bookmark to a new page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// The book as it looks after the update.
    pub book: Book,
    /// Positive page delta logged as a session, or zero.
    pub pages_read: u32,
    /// Whether this call moved the book into `finished`.
    pub crossed_finish: bool,
}

/// Moves `book` to `new_page`, logging a session dated `today` for any
/// forward movement and applying the status transitions.
///
/// Pages outside `0..=total_pages` are rejected. Moving backwards logs no
/// session, and a finished book stays finished.
pub fn apply_progress_update(
    book: &Book,
    new_page: u32,
    today: NaiveDate,
) -> LibraryResult<ProgressUpdate> {
    if new_page > book.total_pages {
        return Err(LibraryError::Validation(format!(
            "page {} is outside 0..={}",
            new_page, book.total_pages
        )));
    }

    let mut updated = book.clone();
    let pages_read = new_page.saturating_sub(book.current_page);
    if pages_read > 0 {
        updated.sessions.insert(0, Session::new(today, pages_read));
    }
    updated.current_page = new_page;

    let mut crossed_finish = false;
    if new_page == book.total_pages {
        if book.status != BookStatus::Finished {
            updated.status = BookStatus::Finished;
            updated.date_finished = Some(today);
            crossed_finish = true;
        }
    } else if book.status == BookStatus::Tbr && new_page > 0 {
        updated.status = BookStatus::Reading;
    }

    Ok(ProgressUpdate {
        book: updated,
        pages_read,
        crossed_finish,
    })
}

//=========================================================================================
// Milestone Hints
//=========================================================================================

/// Encouragement hints a presentation layer may surface after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Milestone {
    Finished,
    /// At least 90% read but not done.
    NearlyDone,
    /// Just past the halfway mark (50% up to 55%).
    Halfway,
    /// Today's total crossed the daily page goal with this update.
    #[serde(rename_all = "camelCase")]
    DailyGoalReached { pages_today: u32 },
}

/// Milestones for `update`. `pages_today` is today's total across all books,
/// including this update's pages.
pub fn milestones(update: &ProgressUpdate, pages_today: u32, daily_goal: u32) -> Vec<Milestone> {
    let mut hints = Vec::new();
    if update.crossed_finish {
        hints.push(Milestone::Finished);
        return hints;
    }
    if update.pages_read == 0 || update.book.current_page >= update.book.total_pages {
        return hints;
    }

    let percent = update.book.current_page as f64 / update.book.total_pages as f64 * 100.0;
    if (90.0..100.0).contains(&percent) {
        hints.push(Milestone::NearlyDone);
    } else if (50.0..55.0).contains(&percent) {
        hints.push(Milestone::Halfway);
    }

    if pages_today >= daily_goal && pages_today - update.pages_read < daily_goal {
        hints.push(Milestone::DailyGoalReached { pages_today });
    }
    hints
}

//=========================================================================================
// Chapters and Estimates
//=========================================================================================

/// Sets the current chapter. Page progress is left untouched.
pub fn advance_chapter(book: &Book, chapter_index: u32) -> LibraryResult<Book> {
    if chapter_index > book.total_chapters {
        return Err(LibraryError::Validation(format!(
            "chapter {} is outside 0..={}",
            chapter_index, book.total_chapters
        )));
    }
    let mut updated = book.clone();
    updated.current_chapter = chapter_index;
    Ok(updated)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeLeft {
    Completed,
    Days(u32),
}

/// Days left at `avg_pages_per_day`, rounded up.
pub fn estimate_days_remaining(book: &Book, avg_pages_per_day: u32) -> TimeLeft {
    let pages_left = book.total_pages.saturating_sub(book.current_page);
    if pages_left == 0 {
        return TimeLeft::Completed;
    }
    TimeLeft::Days(pages_left.div_ceil(avg_pages_per_day.max(1)))
}
