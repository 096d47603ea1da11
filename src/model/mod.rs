//! Domain model for the Nazir engine.
//!
//! Types here mirror the documents stored by the team-data backend:
//! enums serialize SCREAMING_SNAKE_CASE and struct fields camelCase, so a
//! record written by any client of the same store round-trips unchanged.

pub mod forfeit;
pub mod member;
pub mod task;
pub mod team;

pub use forfeit::Forfeit;
pub use member::{Member, MemberRole};
pub use task::{Task, TaskSeverity, TaskStatus};
pub use team::TeamInfo;
