//! The scoring ledger.
//!
//! Pure point tables mapping a severity and transition kind to a signed
//! delta, plus the compensating-delta table used when a task is deleted
//! after scoring has already occurred. Nothing here touches state; the
//! engine applies these deltas through its score-adjustment primitive.

use crate::model::{TaskSeverity, TaskStatus};

/// Bonus credited on top of the completion reward when proof of a forfeit
/// is accepted. Resolution after a forfeit beats plain completion on
/// purpose, to make compliance the rational move.
pub const REDEMPTION_BONUS: i64 = 15;

/// Points credited on voluntary completion or post-forfeit resolution.
#[must_use]
pub fn completion_points(severity: TaskSeverity) -> i64 {
    match severity {
        TaskSeverity::Low => 10,
        TaskSeverity::Medium => 20,
        TaskSeverity::High => 30,
        TaskSeverity::Critical => 50,
    }
}

/// Points debited when a task becomes overdue (including creation with a
/// deadline already in the past).
#[must_use]
pub fn penalty_points(severity: TaskSeverity) -> i64 {
    match severity {
        TaskSeverity::Low => -15,
        TaskSeverity::Medium => -30,
        TaskSeverity::High => -50,
        TaskSeverity::Critical => -100,
    }
}

/// Compensating delta that undoes a task's historical effect on its
/// assignee's score, given the status at deletion time.
///
/// | status at deletion | delta |
/// |---|---|
/// | `Overdue` / `JudgementPending` / `ForfeitAssigned` | `+\|penalty\|` |
/// | `Resolved` | `+\|penalty\| - REDEMPTION_BONUS` |
/// | `Completed` | `-completion` |
/// | `Pending` / `InProgress` | `0` (never scored) |
///
/// A zero result means the engine skips the score write entirely.
#[must_use]
pub fn reversal_delta(status: TaskStatus, severity: TaskSeverity) -> i64 {
    match status {
        TaskStatus::Overdue | TaskStatus::JudgementPending | TaskStatus::ForfeitAssigned => {
            penalty_points(severity).abs()
        }
        TaskStatus::Resolved => penalty_points(severity).abs() - REDEMPTION_BONUS,
        TaskStatus::Completed => -completion_points(severity),
        TaskStatus::Pending | TaskStatus::InProgress => 0,
    }
}
