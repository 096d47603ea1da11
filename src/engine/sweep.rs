//! Overdue detection sweep.
//!
//! The sweep walks the full cached task set each tick - fine at team
//! scale - and pushes every active task with a lapsed deadline onto the
//! penalty path. Idempotency comes from the status filter alone: a task
//! already `Overdue` is no longer active, so a second sweep cannot
//! re-penalize it.

use super::Engine;
use crate::model::TaskStatus;
use crate::scoring::penalty_points;
use chrono::{DateTime, Utc};
use tracing::debug;

impl Engine {
    /// Flag every active task whose deadline is strictly before `now` as
    /// `Overdue` and debit the severity penalty from its assignee.
    ///
    /// Returns the number of tasks flagged this pass.
    pub async fn sweep_overdue(&mut self, now: DateTime<Utc>) -> usize {
        let due: Vec<usize> = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.status.is_active() && t.is_past_deadline(now))
            .map(|(idx, _)| idx)
            .collect();

        if due.is_empty() {
            return 0;
        }
        debug!(count = due.len(), "overdue sweep flagged tasks");

        for idx in &due {
            let idx = *idx;
            self.apply_status(idx, TaskStatus::Overdue).await;
            let (assignee_id, severity, title) = {
                let task = &self.tasks[idx];
                (task.assignee_id.clone(), task.severity, task.title.clone())
            };
            self.adjust_score(
                &assignee_id,
                penalty_points(severity),
                format!("Deadline missed: {title}"),
            )
            .await;
        }
        due.len()
    }
}
