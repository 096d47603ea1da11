//! The task lifecycle / reputation scoring engine.
//!
//! # Architecture
//!
//! The [`Engine`] owns a cached copy of one team's state (roster, tasks,
//! channel settings) and applies every mutation in two phases:
//!
//! 1. **Local phase** (synchronous, always succeeds): the cache is
//!    updated and becomes the source of truth the caller reads.
//! 2. **Durable phase** (async, fallible): persistence and notification
//!    calls run best-effort; failures are logged and never unwound. The
//!    next refresh cycle reconciles.
//!
//! Scoring rides on status transitions: completion and resolution credit
//! through [`Engine::set_status`], the overdue penalty fires on the sweep
//! or on backdated creation, and deletion applies the compensating
//! reversal delta. The status itself guards against double scoring - a
//! transition that is illegal in the state machine can never re-apply a
//! delta.
//!
//! # Example
//!
//! ```rust,ignore
//! use nazir::engine::{Collaborators, Engine, TaskDraft};
//!
//! let mut engine = Engine::new("team-1", config, deps);
//! engine.refresh().await;
//! let id = engine.add_task("admin-id", draft).await?;
//! engine.set_status(&id, TaskStatus::InProgress).await?;
//! ```

mod ingest;
mod runtime;
mod sweep;

pub use runtime::Runtime;

use crate::config::{ChannelConfig, EngineConfig};
use crate::error::{EngineError, Result};
use crate::generator::{fallback_pair, ForfeitGenerator, CANDIDATE_COUNT};
use crate::model::{Member, Task, TaskSeverity, TaskStatus};
use crate::notify::{Notifier, NotifyEvent};
use crate::replies::ReplySource;
use crate::scoring::{completion_points, penalty_points, reversal_delta, REDEMPTION_BONUS};
use crate::store::TeamStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// External collaborators injected into the engine.
///
/// Trait objects so tests swap in mocks without generic plumbing.
pub struct Collaborators {
    pub store: Arc<dyn TeamStore>,
    pub generator: Arc<dyn ForfeitGenerator>,
    pub notifier: Arc<dyn Notifier>,
    pub replies: Arc<dyn ReplySource>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("store", &"<dyn TeamStore>")
            .field("generator", &"<dyn ForfeitGenerator>")
            .field("notifier", &"<dyn Notifier>")
            .field("replies", &"<dyn ReplySource>")
            .finish()
    }
}

/// Input for task creation.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub assignee_id: String,
    pub deadline: DateTime<Utc>,
    pub severity: TaskSeverity,
}

/// The core engine: one instance per active team view.
///
/// The cached state is a lease over remote storage - valid until the next
/// refresh or local mutation, whichever comes first.
#[derive(Debug)]
pub struct Engine {
    team_id: String,
    config: EngineConfig,
    channel: Option<ChannelConfig>,
    members: Vec<Member>,
    tasks: Vec<Task>,
    reply_offset: i64,
    deps: Collaborators,
}

impl Engine {
    /// Create an engine with an empty cache.
    ///
    /// Call [`Engine::refresh`] to populate it before use.
    #[must_use]
    pub fn new(team_id: impl Into<String>, config: EngineConfig, deps: Collaborators) -> Self {
        Self {
            team_id: team_id.into(),
            config,
            channel: None,
            members: Vec::new(),
            tasks: Vec::new(),
            reply_offset: 0,
            deps,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn team_id(&self) -> &str {
        &self.team_id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn channel(&self) -> Option<&ChannelConfig> {
        self.channel.as_ref()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn member(&self, member_id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == member_id)
    }

    // =========================================================================
    // Cache refresh
    // =========================================================================

    /// Replace the cached team state with a fresh snapshot.
    ///
    /// Tasks are ordered by deadline, most urgent history first (newest
    /// deadline at the top), matching the stored document order. On
    /// failure the previous cache stays in place as last known good.
    ///
    /// Returns whether the refresh succeeded.
    pub async fn refresh(&mut self) -> bool {
        match self.deps.store.get_team_data(&self.team_id).await {
            Ok(mut data) => {
                data.tasks.sort_by(|a, b| b.deadline.cmp(&a.deadline));
                self.members = data.members;
                self.tasks = data.tasks;
                self.channel = data.config;
                debug!(
                    team = %self.team_id,
                    members = self.members.len(),
                    tasks = self.tasks.len(),
                    "team cache refreshed"
                );
                true
            }
            Err(error) => {
                warn!(team = %self.team_id, %error, "team refresh failed, keeping cached state");
                false
            }
        }
    }

    // =========================================================================
    // Task creation
    // =========================================================================

    /// Create a task. Admin only.
    ///
    /// A task whose deadline is already past is inserted directly as
    /// `Overdue` and the severity penalty is debited immediately -
    /// backdated creation is itself a scoring event.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an admin or the assignee is
    /// not on the roster.
    pub async fn add_task(&mut self, actor_id: &str, draft: TaskDraft) -> Result<String> {
        self.require_admin(actor_id, "add task")?;
        if self.member(&draft.assignee_id).is_none() {
            return Err(EngineError::unknown_member(draft.assignee_id));
        }

        let mut task = Task::new(
            draft.title,
            draft.description,
            draft.assignee_id,
            draft.deadline,
            draft.severity,
        );
        let backdated = task.is_past_deadline(Utc::now());
        if backdated {
            task.status = TaskStatus::Overdue;
        }

        info!(
            task = %task.id,
            severity = %task.severity,
            status = %task.status,
            "task created"
        );

        self.tasks.insert(0, task.clone());
        self.persist_task(&task).await;
        self.emit(NotifyEvent::NewTask { task: task.clone() }).await;

        if backdated {
            self.adjust_score(
                &task.assignee_id,
                penalty_points(task.severity),
                format!("False start (deadline already past): {}", task.title),
            )
            .await;
        }

        Ok(task.id)
    }

    // =========================================================================
    // Status transitions
    // =========================================================================

    /// Move a task to a new status.
    ///
    /// Transitions into `Completed` or `Resolved` credit the completion
    /// reward for the task's severity. No other target carries scoring
    /// through this entrypoint - the overdue penalty belongs to the
    /// sweeper and to backdated creation, the redemption bonus to
    /// [`Engine::submit_proof`].
    ///
    /// # Errors
    ///
    /// Returns an error if the task is unknown or the move is illegal.
    pub async fn set_status(&mut self, task_id: &str, new_status: TaskStatus) -> Result<()> {
        let idx = self.task_index(task_id)?;
        let current = self.tasks[idx].status;
        if !current.can_transition_to(new_status) {
            return Err(EngineError::InvalidTransition {
                from: current,
                to: new_status,
            });
        }
        self.apply_status(idx, new_status).await;
        Ok(())
    }

    /// Unconditionally apply a validated status change: cache write,
    /// best-effort persist, completion credit where the target earns one.
    async fn apply_status(&mut self, idx: usize, new_status: TaskStatus) {
        let previous = self.tasks[idx].status;
        self.tasks[idx].status = new_status;
        let task = self.tasks[idx].clone();

        info!(task = %task.id, from = %previous, to = %new_status, "status transition");
        self.persist_task(&task).await;

        if new_status.is_terminal() {
            self.adjust_score(
                &task.assignee_id,
                completion_points(task.severity),
                format!("Task delivered: {}", task.title),
            )
            .await;
        }
    }

    // =========================================================================
    // Forfeit selection flow
    // =========================================================================

    /// Generate and publish forfeit candidates for an overdue task.
    ///
    /// Legal from `Overdue` (first summon) and from `JudgementPending`
    /// (re-summon: the old pair is overwritten; the candidates carry no
    /// score so nothing needs undoing). If the generator fails or breaks
    /// the two-candidate contract, the deterministic fallback pair is
    /// attached instead. No scoring here - the penalty already fired when
    /// the task went overdue.
    ///
    /// # Errors
    ///
    /// Returns an error if the task is unknown or not awaiting judgement.
    pub async fn summon_judgement(&mut self, task_id: &str) -> Result<()> {
        let idx = self.task_index(task_id)?;
        let current = self.tasks[idx].status;
        if !current.can_transition_to(TaskStatus::JudgementPending) {
            return Err(EngineError::InvalidTransition {
                from: current,
                to: TaskStatus::JudgementPending,
            });
        }

        let assignee_name = self
            .member(&self.tasks[idx].assignee_id)
            .map(|m| m.name.clone())
            .unwrap_or_else(|| self.tasks[idx].assignee_id.clone());

        let candidates = match self
            .deps
            .generator
            .generate(&self.tasks[idx], &assignee_name)
            .await
        {
            Ok(pair) if pair.len() == CANDIDATE_COUNT => pair,
            Ok(pair) => {
                warn!(
                    task = %task_id,
                    count = pair.len(),
                    "generator broke the candidate-pair contract, using fallback"
                );
                fallback_pair()
            }
            Err(error) => {
                warn!(task = %task_id, %error, "forfeit generation failed, using fallback");
                fallback_pair()
            }
        };

        {
            let task = &mut self.tasks[idx];
            task.generated_forfeits = candidates;
            task.status = TaskStatus::JudgementPending;
            task.judgement_published = true;
        }
        let task = self.tasks[idx].clone();
        info!(task = %task.id, "judgement candidates published");
        self.persist_task(&task).await;
        self.emit(NotifyEvent::JudgementCandidates { task }).await;
        Ok(())
    }

    /// Choose one of the generated forfeits by id.
    ///
    /// No scoring - the penalty was applied when the task went overdue.
    ///
    /// # Errors
    ///
    /// Returns an error if the task is unknown, has no published
    /// judgement, is not awaiting a choice, or the id was never offered.
    /// Rejections leave the task untouched.
    pub async fn select_forfeit(&mut self, task_id: &str, forfeit_id: &str) -> Result<()> {
        let idx = self.task_index(task_id)?;
        let task = &self.tasks[idx];
        if task.generated_forfeits.is_empty() {
            return Err(EngineError::MissingJudgement {
                task_id: task_id.to_string(),
            });
        }
        if task.status != TaskStatus::JudgementPending {
            return Err(EngineError::InvalidTransition {
                from: task.status,
                to: TaskStatus::ForfeitAssigned,
            });
        }
        let chosen = task
            .candidate(forfeit_id)
            .cloned()
            .ok_or_else(|| EngineError::UnknownForfeit {
                task_id: task_id.to_string(),
                forfeit_id: forfeit_id.to_string(),
            })?;

        self.tasks[idx].selected_forfeit = Some(chosen.clone());
        self.tasks[idx].status = TaskStatus::ForfeitAssigned;
        let task = self.tasks[idx].clone();
        info!(task = %task.id, forfeit = %chosen.id, "forfeit selected");
        self.persist_task(&task).await;
        self.emit(NotifyEvent::JudgementFinalized {
            task,
            forfeit: chosen,
        })
        .await;
        Ok(())
    }

    /// Record proof of forfeit execution and resolve the task.
    ///
    /// Resolution credits the completion reward (through the status
    /// transition) plus the redemption bonus as a separate score event,
    /// so the two credits stay individually accounted.
    ///
    /// # Errors
    ///
    /// Returns an error if the task is unknown or no forfeit is assigned.
    pub async fn submit_proof(&mut self, task_id: &str, proof_url: &str) -> Result<()> {
        let idx = self.task_index(task_id)?;
        let current = self.tasks[idx].status;
        if current != TaskStatus::ForfeitAssigned {
            return Err(EngineError::InvalidTransition {
                from: current,
                to: TaskStatus::Resolved,
            });
        }

        self.tasks[idx].proof_url = Some(proof_url.to_string());
        self.apply_status(idx, TaskStatus::Resolved).await;

        let task = self.tasks[idx].clone();
        self.adjust_score(
            &task.assignee_id,
            REDEMPTION_BONUS,
            format!("Redemption served: {}", task.title),
        )
        .await;
        self.emit(NotifyEvent::Resolution { task }).await;
        Ok(())
    }

    // =========================================================================
    // Deletion and reversal
    // =========================================================================

    /// Delete a task and undo its effect on the assignee's score. Admin
    /// only.
    ///
    /// The task leaves the active set immediately; the storage delete and
    /// the compensating score write are best-effort follow-ups. The
    /// reversal delta depends on the status at deletion time (see
    /// [`crate::scoring::reversal_delta`]); a zero delta produces no
    /// score write and no notification.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an admin or the task is
    /// unknown.
    pub async fn delete_task(&mut self, actor_id: &str, task_id: &str) -> Result<()> {
        self.require_admin(actor_id, "delete task")?;
        let idx = self.task_index(task_id)?;
        let task = self.tasks.remove(idx);
        info!(task = %task.id, status = %task.status, "task deleted");

        if let Err(error) = self.deps.store.delete_task(&self.team_id, &task.id).await {
            warn!(task = %task.id, %error, "task delete not persisted");
        }

        let delta = reversal_delta(task.status, task.severity);
        if delta != 0 {
            self.adjust_score(
                &task.assignee_id,
                delta,
                format!("Ledger reversal for deleted task: {}", task.title),
            )
            .await;
        }
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn task_index(&self, task_id: &str) -> Result<usize> {
        self.tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or_else(|| EngineError::unknown_task(task_id))
    }

    fn require_admin(&self, actor_id: &str, action: &str) -> Result<()> {
        match self.member(actor_id) {
            Some(member) if member.is_admin() => Ok(()),
            Some(_) => Err(EngineError::admin_only(action)),
            None => Err(EngineError::unknown_member(actor_id)),
        }
    }

    /// Apply a signed delta to a member's cached score, then push the new
    /// absolute value to storage and announce the change. Read-modify-
    /// write against the cache; there is no storage-side increment.
    pub(crate) async fn adjust_score(&mut self, member_id: &str, delta: i64, reason: String) {
        let Some(member) = self.members.iter_mut().find(|m| m.id == member_id) else {
            warn!(member = %member_id, delta, "score change for unknown member dropped");
            return;
        };
        member.reputation_score += delta;
        let new_score = member.reputation_score;
        let member_name = member.name.clone();

        info!(member = %member_id, delta, new_score, %reason, "score adjusted");

        if let Err(error) = self
            .deps
            .store
            .update_member_score(&self.team_id, member_id, new_score)
            .await
        {
            warn!(member = %member_id, %error, "score write not persisted");
        }
        self.emit(NotifyEvent::ScoreChange {
            member_id: member_id.to_string(),
            member_name,
            delta,
            new_score,
            reason,
        })
        .await;
    }

    pub(crate) async fn persist_task(&self, task: &Task) {
        if let Err(error) = self.deps.store.save_task(&self.team_id, task).await {
            warn!(task = %task.id, %error, "task write not persisted");
        }
    }

    pub(crate) async fn emit(&self, event: NotifyEvent) {
        let kind = event.kind();
        if let Err(error) = self.deps.notifier.notify(&event).await {
            warn!(event = kind, %error, "notification dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::MockForfeitGenerator;
    use crate::model::{MemberRole, TeamInfo};
    use crate::notify::MockNotifier;
    use crate::replies::MockReplySource;
    use crate::store::{MockTeamStore, TeamData};
    use chrono::Duration;

    pub(crate) struct Harness {
        pub store: Arc<MockTeamStore>,
        pub generator: Arc<MockForfeitGenerator>,
        pub notifier: Arc<MockNotifier>,
        pub replies: Arc<MockReplySource>,
        pub engine: Engine,
    }

    /// Engine over mocks, cache primed with one admin and one member.
    pub(crate) async fn harness() -> Harness {
        harness_with(MockForfeitGenerator::new().with_candidates(fallback_pair())).await
    }

    pub(crate) async fn harness_with(generator: MockForfeitGenerator) -> Harness {
        let mut data = TeamData::new(TeamInfo::new("team-1", "Backend Crew"));
        data.members.push(Member::new(
            "admin-1",
            "Amira",
            "@amira",
            MemberRole::Admin,
            50,
        ));
        data.members.push(
            Member::new("m-1", "Omar", "@omar", MemberRole::Member, 50).with_chat_id("777"),
        );

        let store = Arc::new(MockTeamStore::new().with_team_data(data));
        let generator = Arc::new(generator);
        let notifier = Arc::new(MockNotifier::new());
        let replies = Arc::new(MockReplySource::new());

        let mut engine = Engine::new(
            "team-1",
            EngineConfig::default(),
            Collaborators {
                store: store.clone(),
                generator: generator.clone(),
                notifier: notifier.clone(),
                replies: replies.clone(),
            },
        );
        assert!(engine.refresh().await);
        Harness {
            store,
            generator,
            notifier,
            replies,
            engine,
        }
    }

    pub(crate) fn draft(severity: TaskSeverity, deadline: DateTime<Utc>) -> TaskDraft {
        TaskDraft {
            title: "Ship the release notes".into(),
            description: "Write and publish notes for v2.1".into(),
            assignee_id: "m-1".into(),
            deadline,
            severity,
        }
    }

    fn score_of(engine: &Engine, member_id: &str) -> i64 {
        engine.member(member_id).unwrap().reputation_score
    }

    #[tokio::test]
    async fn test_add_task_requires_admin() {
        let mut h = harness().await;
        let result = h
            .engine
            .add_task("m-1", draft(TaskSeverity::Low, Utc::now() + Duration::hours(1)))
            .await;
        assert!(matches!(result, Err(EngineError::Forbidden { .. })));
        assert!(h.engine.tasks().is_empty());
    }

    #[tokio::test]
    async fn test_add_task_unknown_assignee_rejected() {
        let mut h = harness().await;
        let mut d = draft(TaskSeverity::Low, Utc::now() + Duration::hours(1));
        d.assignee_id = "ghost".into();
        let result = h.engine.add_task("admin-1", d).await;
        assert!(matches!(result, Err(EngineError::UnknownMember { .. })));
    }

    #[tokio::test]
    async fn test_add_task_future_deadline_is_pending() {
        let mut h = harness().await;
        let id = h
            .engine
            .add_task(
                "admin-1",
                draft(TaskSeverity::High, Utc::now() + Duration::hours(1)),
            )
            .await
            .unwrap();
        assert_eq!(h.engine.task(&id).unwrap().status, TaskStatus::Pending);
        assert_eq!(score_of(&h.engine, "m-1"), 50);
        assert_eq!(h.notifier.events_of_kind("new_task").len(), 1);
    }

    /// Backdated creation inserts Overdue and debits the penalty once.
    #[tokio::test]
    async fn test_add_task_past_deadline_is_overdue_and_penalized() {
        let mut h = harness().await;
        let id = h
            .engine
            .add_task(
                "admin-1",
                draft(TaskSeverity::High, Utc::now() - Duration::hours(1)),
            )
            .await
            .unwrap();
        assert_eq!(h.engine.task(&id).unwrap().status, TaskStatus::Overdue);
        assert_eq!(score_of(&h.engine, "m-1"), 0);
        // Persisted new absolute value, not a delta.
        assert_eq!(h.store.score_writes(), vec![("m-1".to_string(), 0)]);
    }

    #[tokio::test]
    async fn test_set_status_rejects_illegal_move() {
        let mut h = harness().await;
        let id = h
            .engine
            .add_task(
                "admin-1",
                draft(TaskSeverity::Low, Utc::now() + Duration::hours(1)),
            )
            .await
            .unwrap();
        let result = h.engine.set_status(&id, TaskStatus::Resolved).await;
        assert!(matches!(
            result,
            Err(EngineError::InvalidTransition { .. })
        ));
        assert_eq!(h.engine.task(&id).unwrap().status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn test_plain_completion_credits_completion_only() {
        let mut h = harness().await;
        let id = h
            .engine
            .add_task(
                "admin-1",
                draft(TaskSeverity::Medium, Utc::now() + Duration::hours(1)),
            )
            .await
            .unwrap();
        h.engine.set_status(&id, TaskStatus::Completed).await.unwrap();
        assert_eq!(score_of(&h.engine, "m-1"), 70);
    }

    #[tokio::test]
    async fn test_completed_task_cannot_be_rescored() {
        let mut h = harness().await;
        let id = h
            .engine
            .add_task(
                "admin-1",
                draft(TaskSeverity::Medium, Utc::now() + Duration::hours(1)),
            )
            .await
            .unwrap();
        h.engine.set_status(&id, TaskStatus::Completed).await.unwrap();
        assert!(h
            .engine
            .set_status(&id, TaskStatus::Completed)
            .await
            .is_err());
        assert_eq!(score_of(&h.engine, "m-1"), 70);
    }

    #[tokio::test]
    async fn test_summon_attaches_pair_and_publishes() {
        let mut h = harness().await;
        let id = h
            .engine
            .add_task(
                "admin-1",
                draft(TaskSeverity::Low, Utc::now() - Duration::hours(1)),
            )
            .await
            .unwrap();
        let score_after_penalty = score_of(&h.engine, "m-1");

        h.engine.summon_judgement(&id).await.unwrap();
        let task = h.engine.task(&id).unwrap();
        assert_eq!(task.status, TaskStatus::JudgementPending);
        assert_eq!(task.generated_forfeits.len(), 2);
        assert!(task.judgement_published);
        // Summoning is attach-and-broadcast, never a scoring event.
        assert_eq!(score_of(&h.engine, "m-1"), score_after_penalty);
        assert_eq!(h.notifier.events_of_kind("judgement_candidates").len(), 1);
    }

    #[tokio::test]
    async fn test_summon_from_pending_rejected() {
        let mut h = harness().await;
        let id = h
            .engine
            .add_task(
                "admin-1",
                draft(TaskSeverity::Low, Utc::now() + Duration::hours(1)),
            )
            .await
            .unwrap();
        assert!(h.engine.summon_judgement(&id).await.is_err());
    }

    #[tokio::test]
    async fn test_resummon_replaces_pair_without_rescoring() {
        // The failing generator routes both summons through the fallback,
        // which mints fresh candidate ids on every call.
        let mut h = harness_with(MockForfeitGenerator::new().with_error("model down")).await;
        let id = h
            .engine
            .add_task(
                "admin-1",
                draft(TaskSeverity::Low, Utc::now() - Duration::hours(1)),
            )
            .await
            .unwrap();
        h.engine.summon_judgement(&id).await.unwrap();
        let first_ids: Vec<String> = h
            .engine
            .task(&id)
            .unwrap()
            .generated_forfeits
            .iter()
            .map(|f| f.id.clone())
            .collect();
        let score = score_of(&h.engine, "m-1");

        h.engine.summon_judgement(&id).await.unwrap();
        let task = h.engine.task(&id).unwrap();
        let second_ids: Vec<String> = task
            .generated_forfeits
            .iter()
            .map(|f| f.id.clone())
            .collect();
        assert_ne!(first_ids, second_ids);
        assert_eq!(task.status, TaskStatus::JudgementPending);
        assert_eq!(score_of(&h.engine, "m-1"), score);
        assert_eq!(h.generator.call_count(), 2);
    }

    #[tokio::test]
    async fn test_generator_failure_falls_back() {
        let mut h = harness_with(MockForfeitGenerator::new().with_error("model down")).await;
        let id = h
            .engine
            .add_task(
                "admin-1",
                draft(TaskSeverity::Low, Utc::now() - Duration::hours(1)),
            )
            .await
            .unwrap();
        h.engine.summon_judgement(&id).await.unwrap();
        let task = h.engine.task(&id).unwrap();
        assert_eq!(task.generated_forfeits.len(), 2);
        assert_eq!(task.generated_forfeits[0].title, "The regret round");
    }

    #[tokio::test]
    async fn test_generator_wrong_count_falls_back() {
        let one = vec![crate::model::Forfeit::new("Solo", "Only one", "Nope")];
        let mut h = harness_with(MockForfeitGenerator::new().with_candidates(one)).await;
        let id = h
            .engine
            .add_task(
                "admin-1",
                draft(TaskSeverity::Low, Utc::now() - Duration::hours(1)),
            )
            .await
            .unwrap();
        h.engine.summon_judgement(&id).await.unwrap();
        assert_eq!(h.engine.task(&id).unwrap().generated_forfeits.len(), 2);
        assert_ne!(h.engine.task(&id).unwrap().generated_forfeits[0].title, "Solo");
    }

    #[tokio::test]
    async fn test_select_forfeit_unknown_id_is_a_noop() {
        let mut h = harness().await;
        let id = h
            .engine
            .add_task(
                "admin-1",
                draft(TaskSeverity::Low, Utc::now() - Duration::hours(1)),
            )
            .await
            .unwrap();
        h.engine.summon_judgement(&id).await.unwrap();
        let score = score_of(&h.engine, "m-1");

        let result = h.engine.select_forfeit(&id, "not-a-candidate").await;
        assert!(matches!(result, Err(EngineError::UnknownForfeit { .. })));
        let task = h.engine.task(&id).unwrap();
        assert_eq!(task.status, TaskStatus::JudgementPending);
        assert!(task.selected_forfeit.is_none());
        assert_eq!(score_of(&h.engine, "m-1"), score);
    }

    #[tokio::test]
    async fn test_select_forfeit_before_summon_rejected() {
        let mut h = harness().await;
        let id = h
            .engine
            .add_task(
                "admin-1",
                draft(TaskSeverity::Low, Utc::now() - Duration::hours(1)),
            )
            .await
            .unwrap();
        let result = h.engine.select_forfeit(&id, "whatever").await;
        assert!(matches!(result, Err(EngineError::MissingJudgement { .. })));
    }

    #[tokio::test]
    async fn test_select_forfeit_assigns_copy() {
        let mut h = harness().await;
        let id = h
            .engine
            .add_task(
                "admin-1",
                draft(TaskSeverity::Low, Utc::now() - Duration::hours(1)),
            )
            .await
            .unwrap();
        h.engine.summon_judgement(&id).await.unwrap();
        let chosen_id = h.engine.task(&id).unwrap().generated_forfeits[0].id.clone();

        h.engine.select_forfeit(&id, &chosen_id).await.unwrap();
        let task = h.engine.task(&id).unwrap();
        assert_eq!(task.status, TaskStatus::ForfeitAssigned);
        assert_eq!(task.selected_forfeit.as_ref().unwrap().id, chosen_id);
        assert_eq!(h.notifier.events_of_kind("judgement_finalized").len(), 1);
    }

    /// Resolution pays completion + redemption; strictly better than
    /// plain completion for the same severity.
    #[tokio::test]
    async fn test_submit_proof_credits_completion_plus_redemption() {
        let mut h = harness().await;
        let id = h
            .engine
            .add_task(
                "admin-1",
                draft(TaskSeverity::Critical, Utc::now() - Duration::hours(1)),
            )
            .await
            .unwrap();
        assert_eq!(score_of(&h.engine, "m-1"), -50);

        h.engine.summon_judgement(&id).await.unwrap();
        assert_eq!(score_of(&h.engine, "m-1"), -50);

        let chosen_id = h.engine.task(&id).unwrap().generated_forfeits[0].id.clone();
        h.engine.select_forfeit(&id, &chosen_id).await.unwrap();
        assert_eq!(score_of(&h.engine, "m-1"), -50);

        h.engine
            .submit_proof(&id, "https://img.example/proof.jpg")
            .await
            .unwrap();
        let task = h.engine.task(&id).unwrap();
        assert_eq!(task.status, TaskStatus::Resolved);
        assert_eq!(task.proof_url.as_deref(), Some("https://img.example/proof.jpg"));
        assert_eq!(score_of(&h.engine, "m-1"), 15);
        // Penalty, completion credit, redemption bonus: three events.
        assert_eq!(h.notifier.events_of_kind("score_change").len(), 3);
    }

    #[tokio::test]
    async fn test_submit_proof_without_forfeit_rejected() {
        let mut h = harness().await;
        let id = h
            .engine
            .add_task(
                "admin-1",
                draft(TaskSeverity::Low, Utc::now() + Duration::hours(1)),
            )
            .await
            .unwrap();
        assert!(h.engine.submit_proof(&id, "proof").await.is_err());
    }

    #[tokio::test]
    async fn test_delete_requires_admin() {
        let mut h = harness().await;
        let id = h
            .engine
            .add_task(
                "admin-1",
                draft(TaskSeverity::Low, Utc::now() + Duration::hours(1)),
            )
            .await
            .unwrap();
        assert!(h.engine.delete_task("m-1", &id).await.is_err());
        assert!(h.engine.task(&id).is_some());
    }

    #[tokio::test]
    async fn test_delete_pending_task_reverses_nothing() {
        let mut h = harness().await;
        let id = h
            .engine
            .add_task(
                "admin-1",
                draft(TaskSeverity::Critical, Utc::now() + Duration::hours(1)),
            )
            .await
            .unwrap();
        h.engine.delete_task("admin-1", &id).await.unwrap();
        assert!(h.engine.task(&id).is_none());
        assert_eq!(score_of(&h.engine, "m-1"), 50);
        // No reversal, so the only writes are zero.
        assert!(h.store.score_writes().is_empty());
        assert_eq!(h.store.deleted_task_ids(), vec![id]);
    }

    #[tokio::test]
    async fn test_delete_overdue_task_refunds_penalty() {
        let mut h = harness().await;
        let id = h
            .engine
            .add_task(
                "admin-1",
                draft(TaskSeverity::Critical, Utc::now() - Duration::hours(1)),
            )
            .await
            .unwrap();
        assert_eq!(score_of(&h.engine, "m-1"), -50);
        h.engine.delete_task("admin-1", &id).await.unwrap();
        assert_eq!(score_of(&h.engine, "m-1"), 50);
    }

    #[tokio::test]
    async fn test_delete_completed_task_claws_back_reward() {
        let mut h = harness().await;
        let id = h
            .engine
            .add_task(
                "admin-1",
                draft(TaskSeverity::High, Utc::now() + Duration::hours(1)),
            )
            .await
            .unwrap();
        h.engine.set_status(&id, TaskStatus::Completed).await.unwrap();
        assert_eq!(score_of(&h.engine, "m-1"), 80);
        h.engine.delete_task("admin-1", &id).await.unwrap();
        assert_eq!(score_of(&h.engine, "m-1"), 50);
    }

    /// Deletion removes the task from the active set even when every
    /// storage call fails.
    #[tokio::test]
    async fn test_delete_survives_storage_failure() {
        let mut h = harness().await;
        let id = h
            .engine
            .add_task(
                "admin-1",
                draft(TaskSeverity::Low, Utc::now() + Duration::hours(1)),
            )
            .await
            .unwrap();

        // Swap in a store that fails everything.
        h.engine.deps.store = Arc::new(MockTeamStore::new().with_failing_writes());
        h.engine.delete_task("admin-1", &id).await.unwrap();
        assert!(h.engine.task(&id).is_none());
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_cached_state() {
        let mut h = harness().await;
        h.engine
            .add_task(
                "admin-1",
                draft(TaskSeverity::Low, Utc::now() + Duration::hours(1)),
            )
            .await
            .unwrap();
        h.engine.deps.store = Arc::new(MockTeamStore::new().with_failing_reads());
        assert!(!h.engine.refresh().await);
        assert_eq!(h.engine.tasks().len(), 1);
        assert_eq!(h.engine.members().len(), 2);
    }

    #[tokio::test]
    async fn test_refresh_sorts_tasks_by_deadline_descending() {
        let mut data = TeamData::new(TeamInfo::new("team-1", "Crew"));
        data.members
            .push(Member::new("m-1", "Omar", "@omar", MemberRole::Member, 50));
        let early = Task::new("early", "", "m-1", Utc::now(), TaskSeverity::Low);
        let late = Task::new(
            "late",
            "",
            "m-1",
            Utc::now() + Duration::hours(5),
            TaskSeverity::Low,
        );
        data.tasks.push(early);
        data.tasks.push(late);

        let store = Arc::new(MockTeamStore::new().with_team_data(data));
        let mut engine = Engine::new(
            "team-1",
            EngineConfig::default(),
            Collaborators {
                store,
                generator: Arc::new(MockForfeitGenerator::new()),
                notifier: Arc::new(MockNotifier::new()),
                replies: Arc::new(MockReplySource::new()),
            },
        );
        assert!(engine.refresh().await);
        assert_eq!(engine.tasks()[0].title, "late");
        assert_eq!(engine.tasks()[1].title, "early");
    }
}
