use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::member::MemberId;
use super::period::PeriodId;
use super::time_block::{TimeBlock, TimeBlockId};
use super::workshop::{CycleId, WorkshopId};

crate::define_id_type!(i64, OfferingId);

/// One taught instance of a workshop: a teacher, a period, a capacity, the
/// cycles allowed to join, and the weekly time blocks it occupies.
///
/// The workshop name is carried alongside the id so conflict and quota
/// failures can name the offering without another lookup. Blocks are stored
/// by value; they are immutable once referenced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offering {
    pub id: OfferingId,
    pub workshop_id: WorkshopId,
    pub workshop_name: String,
    pub period_id: PeriodId,
    pub teacher_id: MemberId,
    /// Maximum number of enrolled students. Zero means unlimited.
    pub max_students: u32,
    pub cycle_ids: BTreeSet<CycleId>,
    pub blocks: Vec<TimeBlock>,
}

impl Offering {
    pub fn accepts_cycle(&self, cycle: CycleId) -> bool {
        self.cycle_ids.contains(&cycle)
    }

    pub fn block_ids(&self) -> impl Iterator<Item = TimeBlockId> + '_ {
        self.blocks.iter().map(|b| b.id)
    }

    /// True iff both offerings run in the same period and any pair of their
    /// time blocks overlaps.
    ///
    /// Used administratively to block teacher double-booking at creation
    /// time, and at enrollment time to reject overlapping session
    /// combinations for a single student.
    pub fn conflicts_with(&self, other: &Offering) -> bool {
        if self.period_id != other.period_id {
            return false;
        }
        self.blocks
            .iter()
            .any(|a| other.blocks.iter().any(|b| a.overlaps(b)))
    }
}

impl fmt::Display for Offering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (offering {})", self.workshop_name, self.id)
    }
}
