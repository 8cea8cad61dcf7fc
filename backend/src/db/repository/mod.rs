//! Repository trait definitions.
//!
//! The traits split along the two halves of the system: `CatalogRepository`
//! covers the administratively managed entities (members, cycles,
//! workshops, time blocks, periods, offerings) and their read projections;
//! `EnrollmentRepository` covers student enrollment records and the
//! session-set commit path where all invariants are jointly enforced.
//!
//! Implementations must make `commit_sessions` serializable with respect to
//! itself: two concurrent commits targeting the same near-full offering
//! must not both pass the quota recount. The in-memory backend does this
//! with a single store-wide write lock; a SQL backend would use a
//! serializable transaction or a row lock on the offering.

pub mod error;

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

pub use error::{RepositoryError, RepositoryResult};

use crate::models::{
    Cycle, CycleId, Enrollment, EnrollmentId, Member, MemberId, Offering, OfferingId, Period,
    PeriodId, Role, TimeBlock, TimeBlockId, Weekday, Workshop, WorkshopId,
};
use crate::services::validation::ChangeMode;

/// Parameters for creating a member.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// Parameters for creating or editing a period.
#[derive(Debug, Clone)]
pub struct NewPeriod {
    pub name: String,
    pub preview_date: NaiveDate,
    pub enrollment_start: NaiveDateTime,
    pub enrollment_end: NaiveDate,
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
}

/// Parameters for creating an offering.
#[derive(Debug, Clone)]
pub struct NewOffering {
    pub workshop_id: WorkshopId,
    pub period_id: PeriodId,
    pub teacher_id: MemberId,
    /// Zero means unlimited seats.
    pub max_students: u32,
    pub cycle_ids: Vec<CycleId>,
    pub block_ids: Vec<TimeBlockId>,
}

/// A session-set change to commit against one enrollment record.
#[derive(Debug, Clone)]
pub struct SessionChange {
    /// Period the incoming offerings belong to. Offerings of other periods
    /// already on the record are untouched by `Replace`.
    pub period_id: PeriodId,
    pub mode: ChangeMode,
    pub offering_ids: Vec<OfferingId>,
}

/// Administrative catalog operations and read projections.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn health_check(&self) -> RepositoryResult<bool>;

    async fn create_member(&self, member: NewMember) -> RepositoryResult<Member>;
    async fn get_member(&self, id: MemberId) -> RepositoryResult<Member>;
    async fn list_members(&self) -> RepositoryResult<Vec<Member>>;

    async fn create_cycle(&self, name: String, description: String) -> RepositoryResult<Cycle>;
    async fn get_cycle(&self, id: CycleId) -> RepositoryResult<Cycle>;
    async fn list_cycles(&self) -> RepositoryResult<Vec<Cycle>>;

    async fn create_workshop(&self, name: String, description: String)
        -> RepositoryResult<Workshop>;
    async fn list_workshops(&self) -> RepositoryResult<Vec<Workshop>>;

    /// Create a weekly time block. Rejects inverted intervals and any
    /// overlap with a stored block on the same weekday (system-wide
    /// invariant).
    async fn create_time_block(
        &self,
        weekday: Weekday,
        start: NaiveTime,
        end: NaiveTime,
    ) -> RepositoryResult<TimeBlock>;
    async fn list_time_blocks(&self) -> RepositoryResult<Vec<TimeBlock>>;

    /// Create a period. Rejects date-ordering violations and any overlap of
    /// active ranges with an existing period. Invalidates the period-by-date
    /// memo.
    async fn create_period(&self, period: NewPeriod) -> RepositoryResult<Period>;
    /// Edit a period's calendar. Same validation as creation; invalidates
    /// the period-by-date memo within the same commit.
    async fn update_period(&self, id: PeriodId, period: NewPeriod) -> RepositoryResult<Period>;
    async fn get_period(&self, id: PeriodId) -> RepositoryResult<Period>;
    async fn list_periods(&self) -> RepositoryResult<Vec<Period>>;

    /// The period whose active range contains `date`, if any. Memoized;
    /// implementations must invalidate the memo when any period changes.
    async fn period_by_date(&self, date: NaiveDate) -> RepositoryResult<Option<Period>>;
    /// The period containing `now`. At most one can match because active
    /// ranges are non-overlapping by construction.
    async fn current_period(&self, now: NaiveDateTime) -> RepositoryResult<Option<Period>>;

    /// Create an offering. Validates the teacher role and rejects teacher
    /// double-booking against the teacher's other offerings in the same
    /// period.
    async fn create_offering(&self, offering: NewOffering) -> RepositoryResult<Offering>;
    async fn get_offering(&self, id: OfferingId) -> RepositoryResult<Offering>;
    async fn list_offerings(&self, period: Option<PeriodId>) -> RepositoryResult<Vec<Offering>>;

    /// Replace an offering's block set (bulk-import path). Re-validates
    /// teacher availability.
    async fn replace_offering_blocks(
        &self,
        id: OfferingId,
        block_ids: Vec<TimeBlockId>,
    ) -> RepositoryResult<Offering>;
    /// Replace an offering's cycle set (bulk-import path).
    async fn replace_offering_cycles(
        &self,
        id: OfferingId,
        cycle_ids: Vec<CycleId>,
    ) -> RepositoryResult<Offering>;

    /// Delete an offering, cascading it out of every enrollment holding it.
    async fn delete_offering(&self, id: OfferingId) -> RepositoryResult<()>;

    /// Read-only projection used to render choice forms: for each time
    /// block, the offerings in `period` open to `cycle` that occupy it.
    async fn available_offerings(
        &self,
        cycle: CycleId,
        period: PeriodId,
    ) -> RepositoryResult<BTreeMap<TimeBlock, Vec<Offering>>>;
}

/// Enrollment records and the guarded session-set mutation.
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Create an enrollment record. Rejects students that do not hold the
    /// student role.
    async fn create_enrollment(
        &self,
        student: MemberId,
        cycle: CycleId,
        date_joined: NaiveDate,
    ) -> RepositoryResult<Enrollment>;
    async fn get_enrollment(&self, id: EnrollmentId) -> RepositoryResult<Enrollment>;
    /// The student's most recently created record, if any.
    async fn current_enrollment_for(
        &self,
        student: MemberId,
    ) -> RepositoryResult<Option<Enrollment>>;

    /// Resolved offerings currently held by an enrollment.
    async fn offerings_of(&self, id: EnrollmentId) -> RepositoryResult<Vec<Offering>>;

    /// Number of enrollment records holding `offering`, optionally
    /// excluding one student (used when re-validating that student's own
    /// edit).
    async fn count_students(
        &self,
        offering: OfferingId,
        excluding: Option<MemberId>,
    ) -> RepositoryResult<usize>;

    /// `None` for unlimited offerings; otherwise `max_students` minus the
    /// current count. May be negative after an administrative
    /// over-enrollment; callers clamp for display.
    async fn remaining_quota(
        &self,
        offering: OfferingId,
        excluding: Option<MemberId>,
    ) -> RepositoryResult<Option<i64>>;

    /// Atomically validate and apply a session-set change.
    ///
    /// Runs the full rule validation (duplicates, cohort, quota, pairwise
    /// non-overlap) over the prospective set with quota counts re-read
    /// inside the commit's isolation; on the first violation the entire
    /// change is discarded. `enforce_quota` is false only on the
    /// administrative override path.
    async fn commit_sessions(
        &self,
        id: EnrollmentId,
        change: SessionChange,
        enforce_quota: bool,
    ) -> RepositoryResult<Enrollment>;
}

/// Complete repository combining catalog and enrollment operations.
pub trait FullRepository: CatalogRepository + EnrollmentRepository {}

impl<T: CatalogRepository + EnrollmentRepository> FullRepository for T {}
