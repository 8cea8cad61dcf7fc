//! Enrollment-rule failures.
//!
//! Every rejected mutation in the core is one of these variants. They are
//! raised synchronously at the point of mutation, always name the offending
//! entities, and are never downgraded to warnings. Time-window ineligibility
//! is normally a boolean policy answer; the `Eligibility` variant only fires
//! when a caller attempts a mutation despite a closed window.

use super::member::Role;

/// A rejected input or state. Not a system fault.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// Two offerings in the same period share an overlapping time block.
    /// Also raised when an offering would double-book its teacher.
    #[error("offerings are overlapping: `{first}` and `{second}`")]
    Overlap { first: String, second: String },

    /// An offering does not list the enrollment's cycle among its cycles.
    #[error("cycle `{cycle}` of {student} is not accepted by `{offering}`")]
    CohortMismatch {
        student: String,
        cycle: String,
        offering: String,
    },

    /// An offering's `max_students` cap would be exceeded.
    #[error("offering is already full: `{offering}` (max {max_students} students)")]
    QuotaExceeded { offering: String, max_students: u32 },

    /// An already-held offering was re-added. Signals a client bug, not a
    /// business conflict.
    #[error("offering is already assigned to this enrollment: `{offering}`")]
    DuplicateAssignment { offering: String },

    /// A date or time-of-day ordering invariant was violated.
    #[error("{entity}: {detail}")]
    Ordering { entity: String, detail: String },

    /// Two stored time blocks on the same weekday, or two periods' active
    /// date ranges, intersect.
    #[error("`{first}` collides with existing `{second}`")]
    Collision { first: String, second: String },

    /// A member was used in a position requiring a role they do not hold.
    #[error("{member} does not hold the {expected} role")]
    Role { member: String, expected: Role },

    /// A mutation was attempted outside the enrollment window.
    #[error("{student} may not change enrollment for `{period}` at this time")]
    Eligibility { student: String, period: String },
}
