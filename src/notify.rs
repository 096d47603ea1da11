//! One-way notification abstraction.
//!
//! Every interesting state change fans out to the team channel through a
//! [`Notifier`]. Delivery is best-effort: the engine logs failures and
//! moves on, and nothing downstream ever depends on a notification having
//! landed.

use crate::model::{Forfeit, Task};
use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Mutex;

/// A notification event with its payload.
///
/// Rendering (message templates, localization, channel-vs-DM fan-out) is
/// the notifier implementation's concern; the engine only states what
/// happened.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotifyEvent {
    /// A task was created and assigned
    NewTask { task: Task },
    /// Forfeit candidates were generated and published for an overdue task
    JudgementCandidates { task: Task },
    /// One forfeit was chosen; the sentence is final
    JudgementFinalized { task: Task, forfeit: Forfeit },
    /// Proof was accepted and the task resolved
    Resolution { task: Task },
    /// A member's reputation moved
    ScoreChange {
        member_id: String,
        member_name: String,
        delta: i64,
        new_score: i64,
        reason: String,
    },
    /// A recognized sender replied with something other than "1" or "2"
    InvalidSelection { chat_id: String },
}

impl NotifyEvent {
    /// Short name for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            NotifyEvent::NewTask { .. } => "new_task",
            NotifyEvent::JudgementCandidates { .. } => "judgement_candidates",
            NotifyEvent::JudgementFinalized { .. } => "judgement_finalized",
            NotifyEvent::Resolution { .. } => "resolution",
            NotifyEvent::ScoreChange { .. } => "score_change",
            NotifyEvent::InvalidSelection { .. } => "invalid_selection",
        }
    }
}

/// Abstraction for the outbound notification channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one event, best-effort.
    ///
    /// # Errors
    ///
    /// Returns an error on delivery failure; callers treat it as
    /// non-fatal.
    async fn notify(&self, event: &NotifyEvent) -> Result<()>;
}

/// Mock notifier that records every event.
///
/// # Example
///
/// ```rust,ignore
/// let notifier = MockNotifier::new();
/// // ... run engine operations ...
/// assert_eq!(notifier.events_of_kind("score_change").len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct MockNotifier {
    events: Mutex<Vec<NotifyEvent>>,
    fail: bool,
}

impl MockNotifier {
    /// Create a mock that records and succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure every delivery to fail (events are still recorded).
    #[must_use]
    pub fn with_failures(mut self) -> Self {
        self.fail = true;
        self
    }

    /// All recorded events, in delivery order.
    pub fn events(&self) -> Vec<NotifyEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Recorded events matching the given [`NotifyEvent::kind`].
    pub fn events_of_kind(&self, kind: &str) -> Vec<NotifyEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.kind() == kind)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(&self, event: &NotifyEvent) -> Result<()> {
        self.events.lock().unwrap().push(event.clone());
        if self.fail {
            bail!("mock notifier: delivery failure");
        }
        Ok(())
    }
}
