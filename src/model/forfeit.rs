//! Forfeit model.

use serde::{Deserialize, Serialize};

/// A punitive action offered as a choice after a task goes overdue.
///
/// Forfeits are generated in pairs per judgement event and are immutable
/// once created. A task holds its own copies, never shared references, so
/// re-summoning a judgement can overwrite the pair without touching any
/// other record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forfeit {
    pub id: String,
    pub title: String,
    pub description: String,
    /// The generator's commentary roasting the offender
    pub wittiness: String,
}

impl Forfeit {
    /// Create a forfeit with a fresh id.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        wittiness: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            description: description.into(),
            wittiness: wittiness.into(),
        }
    }
}
