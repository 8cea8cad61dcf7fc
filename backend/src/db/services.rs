//! High-level service layer.
//!
//! Repository-agnostic operations that work with any implementation of the
//! repository traits. Anything that combines the eligibility policy, the
//! rule validation and a commit belongs here, so callers (HTTP handlers,
//! admin tooling, tests) never have to sequence those steps themselves.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (REST API, admin tooling, tests)     │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs)                            │
//! │  - eligibility gate on mutations                         │
//! │  - pre-commit rule validation orchestration              │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/)                        │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────▼────────────────┐
//!     │       Local Repository         │
//!     │         (in-memory)            │
//!     └────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::{info, warn};

use super::repository::{
    FullRepository, NewMember, NewOffering, NewPeriod, RepositoryResult, SessionChange,
};
use crate::models::{
    Cycle, CycleId, Enrollment, EnrollmentId, Member, MemberId, Offering, OfferingId, Period,
    PeriodId, Role, RuleError, TimeBlock, Weekday, Workshop,
};
use crate::services::eligibility;
use crate::services::validation::ChangeMode;

/// The acting principal of a mutation, passed explicitly rather than read
/// from ambient state.
///
/// Staff acting on a student's behalf may bypass the quota check and the
/// time-window gate; cohort membership and overlap checks remain absolute
/// for everyone.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub member_id: MemberId,
    pub role: Role,
}

impl Actor {
    pub fn student(member_id: MemberId) -> Self {
        Self {
            member_id,
            role: Role::Student,
        }
    }

    pub fn staff(member_id: MemberId) -> Self {
        Self {
            member_id,
            role: Role::Staff,
        }
    }

    /// True for the administrative override path.
    pub fn is_override(&self) -> bool {
        self.role == Role::Staff
    }
}

// ==================== Health ====================

/// Check if the storage backend is reachable.
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

// ==================== Catalog ====================

/// Register a member with an explicit role.
pub async fn create_member<R: FullRepository + ?Sized>(
    repo: &R,
    member: NewMember,
) -> RepositoryResult<Member> {
    info!(
        "Service layer: creating member `{}` with role {}",
        member.username, member.role
    );
    repo.create_member(member).await
}

pub async fn create_cycle<R: FullRepository + ?Sized>(
    repo: &R,
    name: String,
    description: String,
) -> RepositoryResult<Cycle> {
    repo.create_cycle(name, description).await
}

pub async fn create_workshop<R: FullRepository + ?Sized>(
    repo: &R,
    name: String,
    description: String,
) -> RepositoryResult<Workshop> {
    repo.create_workshop(name, description).await
}

/// Create a weekly time block.
///
/// Rejects inverted intervals (`Ordering`) and overlap with any stored
/// block on the same weekday (`Collision`); the no-overlap invariant is
/// system-wide, not per offering.
pub async fn create_time_block<R: FullRepository + ?Sized>(
    repo: &R,
    weekday: Weekday,
    start: NaiveTime,
    end: NaiveTime,
) -> RepositoryResult<TimeBlock> {
    info!(
        "Service layer: creating time block {} {} - {}",
        weekday, start, end
    );
    repo.create_time_block(weekday, start, end).await
}

/// Create an academic period.
///
/// Rejects date-ordering violations (`Ordering`) and overlapping active
/// ranges (`Collision`). The period-by-date memo is invalidated as part of
/// the same commit.
pub async fn create_period<R: FullRepository + ?Sized>(
    repo: &R,
    period: NewPeriod,
) -> RepositoryResult<Period> {
    info!("Service layer: creating period `{}`", period.name);
    repo.create_period(period).await
}

/// Edit a period's calendar, with the same validation as creation.
pub async fn update_period<R: FullRepository + ?Sized>(
    repo: &R,
    id: PeriodId,
    period: NewPeriod,
) -> RepositoryResult<Period> {
    info!("Service layer: updating period {}", id);
    repo.update_period(id, period).await
}

/// The period whose active range contains `now`, if any.
pub async fn current_period<R: FullRepository + ?Sized>(
    repo: &R,
    now: NaiveDateTime,
) -> RepositoryResult<Option<Period>> {
    repo.current_period(now).await
}

/// Create an offering.
///
/// Rejects non-teachers (`Role`) and teacher double-booking (`Overlap`).
pub async fn create_offering<R: FullRepository + ?Sized>(
    repo: &R,
    offering: NewOffering,
) -> RepositoryResult<Offering> {
    info!(
        "Service layer: creating offering of workshop {} in period {}",
        offering.workshop_id, offering.period_id
    );
    repo.create_offering(offering).await
}

/// Delete an offering, cascading it out of every enrollment holding it.
pub async fn delete_offering<R: FullRepository + ?Sized>(
    repo: &R,
    id: OfferingId,
) -> RepositoryResult<()> {
    warn!("Service layer: deleting offering {} (cascades to enrollments)", id);
    repo.delete_offering(id).await
}

/// The choice-form projection: per time block, the offerings in `period`
/// open to `cycle`.
pub async fn available_offerings<R: FullRepository + ?Sized>(
    repo: &R,
    cycle: CycleId,
    period: PeriodId,
) -> RepositoryResult<BTreeMap<TimeBlock, Vec<Offering>>> {
    repo.available_offerings(cycle, period).await
}

// ==================== Enrollment ====================

/// Create an enrollment record for a student joining a cycle.
pub async fn create_enrollment<R: FullRepository + ?Sized>(
    repo: &R,
    student: MemberId,
    cycle: CycleId,
    date_joined: NaiveDate,
) -> RepositoryResult<Enrollment> {
    info!(
        "Service layer: creating enrollment for student {} in cycle {}",
        student, cycle
    );
    repo.create_enrollment(student, cycle, date_joined).await
}

/// Remaining seats on an offering, clamped to zero for display.
///
/// `None` means unlimited. The unclamped figure stays available through the
/// repository for accounting.
pub async fn remaining_quota_display<R: FullRepository + ?Sized>(
    repo: &R,
    offering: OfferingId,
    excluding: Option<MemberId>,
) -> RepositoryResult<Option<i64>> {
    let quota = repo.remaining_quota(offering, excluding).await?;
    Ok(quota.map(|q| q.max(0)))
}

/// Whether the record's offerings for `period` cover every time block in
/// the system.
pub async fn is_schedule_full<R: FullRepository + ?Sized>(
    repo: &R,
    enrollment: EnrollmentId,
    period: PeriodId,
) -> RepositoryResult<bool> {
    let offerings = repo.offerings_of(enrollment).await?;
    let total_blocks = repo.list_time_blocks().await?.len();
    Ok(eligibility::is_schedule_full(
        &offerings,
        period,
        total_blocks,
    ))
}

/// Whether the record may change its session set for `period` at `now`.
/// A boolean policy answer consumed by the UI; mutations re-check it.
pub async fn is_enabled_to_enroll<R: FullRepository + ?Sized>(
    repo: &R,
    enrollment: EnrollmentId,
    period: PeriodId,
    now: NaiveDateTime,
) -> RepositoryResult<bool> {
    let period = repo.get_period(period).await?;
    let full = is_schedule_full(repo, enrollment, period.id).await?;
    Ok(eligibility::is_enabled_to_enroll(&period, full, now))
}

/// Replace a student's session set for one period.
///
/// Re-submitting the unchanged set is idempotent; duplicates within
/// `desired` are rejected. Runs the eligibility gate (unless `actor` is the
/// administrative override), then the full rule validation and commit
/// atomically inside the repository.
///
/// # Arguments
/// * `repo` - Repository implementation
/// * `enrollment` - Record being mutated
/// * `period` - Period the desired offerings belong to
/// * `desired` - The replacement offering set for that period
/// * `actor` - Acting principal, passed explicitly
/// * `now` - Wall-clock instant of the request
pub async fn set_student_sessions<R: FullRepository + ?Sized>(
    repo: &R,
    enrollment: EnrollmentId,
    period: PeriodId,
    desired: Vec<OfferingId>,
    actor: &Actor,
    now: NaiveDateTime,
) -> RepositoryResult<Enrollment> {
    mutate_sessions(repo, enrollment, period, ChangeMode::Replace, desired, actor, now).await
}

/// Add offerings to a student's session set. Re-adding a held offering is a
/// `DuplicateAssignment` error.
pub async fn add_student_sessions<R: FullRepository + ?Sized>(
    repo: &R,
    enrollment: EnrollmentId,
    period: PeriodId,
    incoming: Vec<OfferingId>,
    actor: &Actor,
    now: NaiveDateTime,
) -> RepositoryResult<Enrollment> {
    mutate_sessions(repo, enrollment, period, ChangeMode::Add, incoming, actor, now).await
}

async fn mutate_sessions<R: FullRepository + ?Sized>(
    repo: &R,
    enrollment_id: EnrollmentId,
    period_id: PeriodId,
    mode: ChangeMode,
    offering_ids: Vec<OfferingId>,
    actor: &Actor,
    now: NaiveDateTime,
) -> RepositoryResult<Enrollment> {
    let enrollment = repo.get_enrollment(enrollment_id).await?;
    let period = repo.get_period(period_id).await?;

    if !actor.is_override() {
        let full = is_schedule_full(repo, enrollment_id, period_id).await?;
        if !eligibility::is_enabled_to_enroll(&period, full, now) {
            let student = repo.get_member(enrollment.student_id).await?;
            warn!(
                "Service layer: rejected out-of-window mutation for enrollment {}",
                enrollment_id
            );
            return Err(RuleError::Eligibility {
                student: student.full_name(),
                period: period.name,
            }
            .into());
        }
    }

    info!(
        "Service layer: committing {:?} of {} offering(s) for enrollment {}",
        mode,
        offering_ids.len(),
        enrollment_id
    );
    repo.commit_sessions(
        enrollment_id,
        SessionChange {
            period_id,
            mode,
            offering_ids,
        },
        !actor.is_override(),
    )
    .await
}
