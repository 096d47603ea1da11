//! Team storage abstraction.
//!
//! The engine treats durable storage as a remote collaborator: reads pull
//! a whole-team snapshot, writes are fire-and-forget. There is no
//! transactional rollback anywhere in this contract - a failed write
//! leaves the engine's in-memory state as the source of truth until the
//! next refresh reconciles.
//!
//! # Object Safety
//!
//! [`TeamStore`] is object-safe and used as `Arc<dyn TeamStore>` so tests
//! can inject [`MockTeamStore`] without generic plumbing.

use crate::config::ChannelConfig;
use crate::model::{Member, Task, TeamInfo};
use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// Whole-team snapshot as stored by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamData {
    pub info: TeamInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ChannelConfig>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl TeamData {
    /// Create an empty snapshot for the given team.
    #[must_use]
    pub fn new(info: TeamInfo) -> Self {
        Self {
            info,
            config: None,
            members: Vec::new(),
            tasks: Vec::new(),
        }
    }
}

/// Abstraction for the durable team-data backend.
///
/// All calls are best-effort from the engine's perspective: a returned
/// error is logged and swallowed, never propagated into a state change.
#[async_trait]
pub trait TeamStore: Send + Sync {
    /// Fetch the full snapshot for a team.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or the team does
    /// not exist.
    async fn get_team_data(&self, team_id: &str) -> Result<TeamData>;

    /// Persist one task record (insert or overwrite).
    async fn save_task(&self, team_id: &str, task: &Task) -> Result<()>;

    /// Remove one task record.
    async fn delete_task(&self, team_id: &str, task_id: &str) -> Result<()>;

    /// Overwrite a member's reputation score with a new absolute value.
    ///
    /// The engine computes the new value from its own cached snapshot;
    /// the backend offers no atomic increment.
    async fn update_member_score(
        &self,
        team_id: &str,
        member_id: &str,
        new_score: i64,
    ) -> Result<()>;
}

/// Mock store for testing.
///
/// Behaves like a tiny in-memory backend: writes mutate the held
/// snapshot, so a later `get_team_data` observes them the way a real
/// store round-trip would. Every write is also recorded for assertions,
/// and failure flags let tests exercise the best-effort paths.
///
/// # Example
///
/// ```rust,ignore
/// let store = MockTeamStore::new().with_team_data(snapshot);
/// let saved = store.saved_tasks();
/// assert_eq!(saved.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockTeamStore {
    data: Mutex<Option<TeamData>>,
    saved_tasks: Mutex<Vec<Task>>,
    deleted_task_ids: Mutex<Vec<String>>,
    score_writes: Mutex<Vec<(String, i64)>>,
    fail_reads: bool,
    fail_writes: bool,
    read_count: AtomicU32,
}

impl MockTeamStore {
    /// Create a mock with no snapshot and all operations succeeding.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the snapshot served by `get_team_data`.
    #[must_use]
    pub fn with_team_data(self, data: TeamData) -> Self {
        *self.data.lock().unwrap() = Some(data);
        self
    }

    /// Configure every read to fail.
    #[must_use]
    pub fn with_failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    /// Configure every write (save/delete/score) to fail.
    #[must_use]
    pub fn with_failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Tasks passed to `save_task`, in call order.
    pub fn saved_tasks(&self) -> Vec<Task> {
        self.saved_tasks.lock().unwrap().clone()
    }

    /// Task ids passed to `delete_task`, in call order.
    pub fn deleted_task_ids(&self) -> Vec<String> {
        self.deleted_task_ids.lock().unwrap().clone()
    }

    /// `(member_id, new_score)` pairs passed to `update_member_score`.
    pub fn score_writes(&self) -> Vec<(String, i64)> {
        self.score_writes.lock().unwrap().clone()
    }

    /// Number of `get_team_data` calls.
    pub fn read_count(&self) -> u32 {
        self.read_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TeamStore for MockTeamStore {
    async fn get_team_data(&self, team_id: &str) -> Result<TeamData> {
        self.read_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads {
            bail!("mock store: read failure");
        }
        match self.data.lock().unwrap().clone() {
            Some(data) => Ok(data),
            None => bail!("mock store: no team {team_id}"),
        }
    }

    async fn save_task(&self, _team_id: &str, task: &Task) -> Result<()> {
        if self.fail_writes {
            bail!("mock store: write failure");
        }
        self.saved_tasks.lock().unwrap().push(task.clone());
        if let Some(data) = self.data.lock().unwrap().as_mut() {
            match data.tasks.iter_mut().find(|t| t.id == task.id) {
                Some(existing) => *existing = task.clone(),
                None => data.tasks.insert(0, task.clone()),
            }
        }
        Ok(())
    }

    async fn delete_task(&self, _team_id: &str, task_id: &str) -> Result<()> {
        if self.fail_writes {
            bail!("mock store: write failure");
        }
        self.deleted_task_ids
            .lock()
            .unwrap()
            .push(task_id.to_string());
        if let Some(data) = self.data.lock().unwrap().as_mut() {
            data.tasks.retain(|t| t.id != task_id);
        }
        Ok(())
    }

    async fn update_member_score(
        &self,
        _team_id: &str,
        member_id: &str,
        new_score: i64,
    ) -> Result<()> {
        if self.fail_writes {
            bail!("mock store: write failure");
        }
        self.score_writes
            .lock()
            .unwrap()
            .push((member_id.to_string(), new_score));
        if let Some(data) = self.data.lock().unwrap().as_mut() {
            if let Some(member) = data.members.iter_mut().find(|m| m.id == member_id) {
                member.reputation_score = new_score;
            }
        }
        Ok(())
    }
}
