//! Task domain model and status state machine.
//!
//! # State Transitions
//!
//! ```text
//! Pending ──────> InProgress ──────> Completed
//!    │                │
//!    │                │ (deadline passes)
//!    ▼                ▼
//!         Overdue ──summon──> JudgementPending ──select──> ForfeitAssigned
//!                                    │    ▲                      │
//!                                    └────┘ (re-summon)          │ proof
//!                                                                ▼
//!                                                            Resolved
//! ```
//!
//! `Completed` and `Resolved` are terminal for scoring purposes: a task in
//! either state can never be re-penalized or re-credited by a later
//! transition. The status itself is the only guard against double scoring -
//! there is no separate "already penalized" flag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::forfeit::Forfeit;

/// How badly a missed deadline hurts.
///
/// Severity scales both the completion reward and the overdue penalty.
/// Wire form is SCREAMING_SNAKE_CASE to match the stored team documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for TaskSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskSeverity::Low => write!(f, "LOW"),
            TaskSeverity::Medium => write!(f, "MEDIUM"),
            TaskSeverity::High => write!(f, "HIGH"),
            TaskSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl TaskSeverity {
    /// All severities in ascending order of weight.
    pub const ALL: [TaskSeverity; 4] = [
        TaskSeverity::Low,
        TaskSeverity::Medium,
        TaskSeverity::High,
        TaskSeverity::Critical,
    ];
}

/// Current position of a task in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Created, not yet picked up
    #[default]
    Pending,
    /// Assignee is working on it
    InProgress,
    /// Finished before the deadline
    Completed,
    /// Deadline passed while still active; penalty applied
    Overdue,
    /// Forfeit candidates generated, awaiting a choice
    JudgementPending,
    /// A forfeit was chosen, awaiting proof of execution
    ForfeitAssigned,
    /// Proof accepted; debt settled
    Resolved,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "PENDING"),
            TaskStatus::InProgress => write!(f, "IN_PROGRESS"),
            TaskStatus::Completed => write!(f, "COMPLETED"),
            TaskStatus::Overdue => write!(f, "OVERDUE"),
            TaskStatus::JudgementPending => write!(f, "JUDGEMENT_PENDING"),
            TaskStatus::ForfeitAssigned => write!(f, "FORFEIT_ASSIGNED"),
            TaskStatus::Resolved => write!(f, "RESOLVED"),
        }
    }
}

impl TaskStatus {
    /// Check if this status can transition to the target status.
    ///
    /// Re-entering `JudgementPending` is legal: re-summoning replaces the
    /// candidate pair without re-triggering the overdue penalty.
    ///
    /// # Example
    ///
    /// ```
    /// use nazir::model::TaskStatus;
    ///
    /// assert!(TaskStatus::Pending.can_transition_to(TaskStatus::Completed));
    /// assert!(!TaskStatus::Completed.can_transition_to(TaskStatus::Overdue));
    /// ```
    #[must_use]
    pub fn can_transition_to(&self, target: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, target),
            // From Pending
            (Pending, InProgress) | (Pending, Completed) | (Pending, Overdue) |
            // From InProgress
            (InProgress, Pending) | (InProgress, Completed) | (InProgress, Overdue) |
            // From Overdue
            (Overdue, JudgementPending) |
            // From JudgementPending (self-loop = re-summon)
            (JudgementPending, JudgementPending) | (JudgementPending, ForfeitAssigned) |
            // From ForfeitAssigned
            (ForfeitAssigned, Resolved)
        )
    }

    /// Check if this status is eligible for overdue detection.
    ///
    /// `Pending` and `InProgress` are equivalent for the sweeper.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::InProgress)
    }

    /// Check if this status is terminal for scoring purposes.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Resolved)
    }
}

/// A tracked obligation with a deadline.
///
/// A task belongs to exactly one team and has exactly one assignee; there
/// is no reassignment operation. The forfeit fields are populated only
/// after the task goes overdue and a judgement is summoned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub assignee_id: String,
    /// Absolute deadline; strictly-past deadlines trigger the penalty path
    pub deadline: DateTime<Utc>,
    pub severity: TaskSeverity,
    pub status: TaskStatus,
    /// Candidate pair attached at judgement time; tasks own their copies
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generated_forfeits: Vec<Forfeit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_forfeit: Option<Forfeit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_url: Option<String>,
    /// Set once the candidate pair has been broadcast to the team channel
    #[serde(default)]
    pub judgement_published: bool,
}

impl Task {
    /// Create a new task with a fresh id.
    ///
    /// The initial status is `Pending`; the engine's creation path may
    /// override it to `Overdue` for backdated deadlines.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        assignee_id: impl Into<String>,
        deadline: DateTime<Utc>,
        severity: TaskSeverity,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            description: description.into(),
            assignee_id: assignee_id.into(),
            deadline,
            severity,
            status: TaskStatus::Pending,
            generated_forfeits: Vec::new(),
            selected_forfeit: None,
            proof_url: None,
            judgement_published: false,
        }
    }

    /// Check if the deadline is strictly in the past.
    #[must_use]
    pub fn is_past_deadline(&self, now: DateTime<Utc>) -> bool {
        self.deadline < now
    }

    /// Look up a generated forfeit candidate by id.
    #[must_use]
    pub fn candidate(&self, forfeit_id: &str) -> Option<&Forfeit> {
        self.generated_forfeits.iter().find(|f| f.id == forfeit_id)
    }
}
