//! Custom error types for the Nazir engine.
//!
//! This module provides structured error types for the invalid-operation
//! class of failures: moves the state machine rejects, privilege checks,
//! and lookups that miss. Transient collaborator failures (storage writes,
//! notifications, forfeit generation) are deliberately NOT represented
//! here - the engine logs and swallows those without unwinding local
//! state.

use crate::model::{TaskStatus, MemberRole};
use thiserror::Error;

/// Main error type for engine operations.
#[derive(Error, Debug)]
pub enum EngineError {
    // =========================================================================
    // Privilege Errors
    // =========================================================================
    /// Actor lacks the role required for the operation
    #[error("'{action}' requires {required:?} role")]
    Forbidden {
        action: String,
        required: MemberRole,
    },

    // =========================================================================
    // Lookup Errors
    // =========================================================================
    /// No task with the given id in the active set
    #[error("Unknown task: {id}")]
    UnknownTask { id: String },

    /// No member with the given id on the team roster
    #[error("Unknown member: {id}")]
    UnknownMember { id: String },

    /// Forfeit id not among the task's generated candidates
    #[error("Forfeit {forfeit_id} was not offered for task {task_id}")]
    UnknownForfeit {
        task_id: String,
        forfeit_id: String,
    },

    // =========================================================================
    // State Machine Errors
    // =========================================================================
    /// Transition rejected by the status legality table
    #[error("Illegal status transition: {from} -> {to}")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },

    /// Operation requires a judgement that has not been summoned
    #[error("Task {task_id} has no pending judgement")]
    MissingJudgement { task_id: String },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration value
    #[error("Configuration error: {message}")]
    Config { message: String },

    // =========================================================================
    // Wrapped Errors
    // =========================================================================
    /// IO error wrapper
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON error wrapper
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EngineError {
    // =========================================================================
    // Constructor helpers
    // =========================================================================

    /// Create a privilege error for an admin-only operation.
    pub fn admin_only(action: impl Into<String>) -> Self {
        Self::Forbidden {
            action: action.into(),
            required: MemberRole::Admin,
        }
    }

    /// Create an unknown-task error.
    pub fn unknown_task(id: impl Into<String>) -> Self {
        Self::UnknownTask { id: id.into() }
    }

    /// Create an unknown-member error.
    pub fn unknown_member(id: impl Into<String>) -> Self {
        Self::UnknownMember { id: id.into() }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    // =========================================================================
    // Classification helpers
    // =========================================================================

    /// Check if this error is a user-facing rejection.
    ///
    /// Rejections carry a message suitable for showing to the operator and
    /// guarantee that no state was changed by the rejected call.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Forbidden { .. }
                | Self::UnknownTask { .. }
                | Self::UnknownMember { .. }
                | Self::UnknownForfeit { .. }
                | Self::InvalidTransition { .. }
                | Self::MissingJudgement { .. }
        )
    }
}

/// Type alias for engine results.
pub type Result<T> = std::result::Result<T, EngineError>;
