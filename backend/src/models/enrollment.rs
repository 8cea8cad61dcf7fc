use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::member::MemberId;
use super::offering::OfferingId;
use super::workshop::CycleId;

crate::define_id_type!(i64, EnrollmentId);

/// The evolving set of offerings one student holds within one cycle
/// membership.
///
/// A student accumulates one record per cycle change; the current record is
/// the most recently created. The session set only changes through the
/// repository commit path, which runs the full rule validation before
/// persisting anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub student_id: MemberId,
    pub cycle_id: CycleId,
    pub date_joined: NaiveDate,
    pub offering_ids: BTreeSet<OfferingId>,
}

impl Enrollment {
    pub fn holds(&self, offering: OfferingId) -> bool {
        self.offering_ids.contains(&offering)
    }
}
