use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::error::RuleError;

crate::define_id_type!(i64, TimeBlockId);

/// Day of the school week. Weekend days are not schedulable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    pub const ALL: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A weekly time slot: one weekday plus a half-open `[start, end)` interval.
///
/// Blocks are created administratively and are immutable once referenced by
/// an offering. The system-wide invariant that no two stored blocks on the
/// same weekday overlap is enforced at creation time by the repository, not
/// here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeBlock {
    pub id: TimeBlockId,
    pub weekday: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeBlock {
    /// Build a block, rejecting inverted or empty intervals.
    pub fn new(
        id: TimeBlockId,
        weekday: Weekday,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<Self, RuleError> {
        if start >= end {
            return Err(RuleError::Ordering {
                entity: format!("time block {} @ {} - {}", weekday, start, end),
                detail: "start time must be before end time".to_string(),
            });
        }
        Ok(Self {
            id,
            weekday,
            start,
            end,
        })
    }

    /// Half-open interval intersection test.
    ///
    /// Blocks on different weekdays never overlap. Back-to-back blocks on
    /// the same day (`a.end == b.start`) share an instant but no time, so
    /// they do not overlap either.
    pub fn overlaps(&self, other: &TimeBlock) -> bool {
        if self.weekday != other.weekday {
            return false;
        }
        self.start < other.end && other.start < self.end
    }
}

// Blocks sort by position in the week, with the id as a tiebreaker so the
// ordering stays total for otherwise identical intervals.
impl Ord for TimeBlock {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.weekday, self.start, self.end, self.id).cmp(&(
            other.weekday,
            other.start,
            other.end,
            other.id,
        ))
    }
}

impl PartialOrd for TimeBlock {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TimeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {} - {}", self.weekday, self.start, self.end)
    }
}
