//! Forfeit generation abstraction.
//!
//! The generator is an external collaborator (an LLM in the original
//! deployment) asked to produce exactly two forfeit candidates per
//! judgement event. It may fail or misbehave; the engine substitutes the
//! deterministic [`fallback_pair`] in that case so the judgement flow
//! never stalls on a flaky collaborator.

use crate::model::{Forfeit, Task};
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};

/// Number of candidates a judgement event offers.
pub const CANDIDATE_COUNT: usize = 2;

/// Abstraction for the forfeit candidate generator.
#[async_trait]
pub trait ForfeitGenerator: Send + Sync {
    /// Generate forfeit candidates for an overdue task.
    ///
    /// The contract is exactly [`CANDIDATE_COUNT`] candidates; callers
    /// must treat any other count as a failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing service is unreachable or returns
    /// an unusable response.
    async fn generate(&self, task: &Task, assignee_name: &str) -> Result<Vec<Forfeit>>;
}

/// Fixed candidate pair used whenever the generator fails.
///
/// Deterministic content with fresh ids per call, so a task still ends up
/// owning uniquely identifiable copies.
#[must_use]
pub fn fallback_pair() -> Vec<Forfeit> {
    vec![
        Forfeit::new(
            "The regret round",
            "Order coffee (or dessert) for the whole team right now, on your own tab.",
            "Deadlines have a price, and this one is payable in cash.",
        ),
        Forfeit::new(
            "Potato profile",
            "Set your messenger avatar to a potato for 48 hours, status: \
             'Sorry team, I am a potato at work'.",
            "So everyone can see your true rank when deliveries slip.",
        ),
    ]
}

/// Mock generator for testing.
///
/// # Example
///
/// ```rust,ignore
/// let generator = MockForfeitGenerator::new().with_candidates(pair);
/// let forfeits = generator.generate(&task, "Amira").await?;
/// ```
#[derive(Debug, Default)]
pub struct MockForfeitGenerator {
    candidates: Vec<Forfeit>,
    error: Option<String>,
    call_count: AtomicU32,
}

impl MockForfeitGenerator {
    /// Create a mock returning an empty candidate list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the candidates to return.
    #[must_use]
    pub fn with_candidates(mut self, candidates: Vec<Forfeit>) -> Self {
        self.candidates = candidates;
        self
    }

    /// Configure the mock to fail with the given message.
    #[must_use]
    pub fn with_error(mut self, error: &str) -> Self {
        self.error = Some(error.to_string());
        self
    }

    /// Number of `generate` calls.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ForfeitGenerator for MockForfeitGenerator {
    async fn generate(&self, _task: &Task, _assignee_name: &str) -> Result<Vec<Forfeit>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Some(ref error) = self.error {
            bail!("{}", error);
        }
        Ok(self.candidates.clone())
    }
}
