//! Nazir - gamified task discipline for small teams.
//!
//! A library engine for deadline-driven task tracking where slipping has
//! consequences: missed deadlines cost reputation, trigger a randomized
//! "forfeit" judgement flow, and redemption pays the debt back with
//! interest.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`model`] - Domain types: tasks, members, forfeits, the status state machine
//! - [`scoring`] - Point tables and the deletion-reversal ledger
//! - [`engine`] - The lifecycle engine: transitions, sweep, judgement flow, reversal
//! - [`store`], [`generator`], [`notify`], [`replies`] - External collaborator contracts with mocks
//! - [`config`] - Engine tuning and channel settings
//! - [`error`] - Custom error types and handling
//!
//! # Example
//!
//! ```rust,ignore
//! use nazir::engine::{Collaborators, Engine, Runtime, TaskDraft};
//! use nazir::config::EngineConfig;
//!
//! let mut engine = Engine::new("team-1", EngineConfig::default(), deps);
//! engine.refresh().await;
//!
//! // Backdated tasks go straight to Overdue and cost points.
//! let id = engine.add_task(&admin_id, draft).await?;
//!
//! // Keep the view current in the background.
//! let runtime = Runtime::start(shared_engine).await;
//! // ... later, when the view closes:
//! runtime.shutdown().await;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod generator;
pub mod model;
pub mod notify;
pub mod replies;
pub mod scoring;
pub mod store;

// Re-export commonly used types
pub use error::{EngineError, Result};

// Re-export domain types
pub use model::{Forfeit, Member, MemberRole, Task, TaskSeverity, TaskStatus, TeamInfo};

// Re-export engine types
pub use engine::{Collaborators, Engine, Runtime, TaskDraft};

// Re-export collaborator contracts
pub use generator::{ForfeitGenerator, MockForfeitGenerator};
pub use notify::{MockNotifier, Notifier, NotifyEvent};
pub use replies::{InboundReply, MockReplySource, ReplySource};
pub use store::{MockTeamStore, TeamData, TeamStore};

// Re-export configuration
pub use config::{ChannelConfig, EngineConfig};
