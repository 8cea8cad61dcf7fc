//! In-memory local repository implementation.
//!
//! Stores all data in HashMaps behind a single `parking_lot::RwLock`,
//! giving fast, deterministic, isolated execution for unit tests and local
//! development.
//!
//! The store-wide write lock doubles as the serialization domain for
//! enrollment commits: `commit_sessions` re-reads quota counts and applies
//! the change while holding it, so two racing mutations against the same
//! near-full offering cannot both pass the recount. The period-by-date memo
//! lives behind the same lock and carries a generation counter bumped by
//! every period write; this is only sound within one process, which is the
//! deployment model of this backend.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use parking_lot::RwLock;

use crate::db::repository::{
    CatalogRepository, EnrollmentRepository, NewMember, NewOffering, NewPeriod, RepositoryError,
    RepositoryResult, SessionChange,
};
use crate::models::{
    Cycle, CycleId, Enrollment, EnrollmentId, Member, MemberId, Offering, OfferingId, Period,
    PeriodId, Role, RuleError, TimeBlock, TimeBlockId, Weekday, Workshop, WorkshopId,
};
use crate::services::validation::{self, SessionSetInput};

/// In-memory repository for tests and local deployments.
#[derive(Clone, Default)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

/// Memo for `period_by_date`. The generation is compared against the
/// store's period generation on every read; a mismatch discards all cached
/// entries, so period edits invalidate the memo in the same commit that
/// changes the dates.
#[derive(Default)]
struct PeriodDateCache {
    generation: u64,
    by_date: HashMap<NaiveDate, Option<PeriodId>>,
}

#[derive(Default)]
struct LocalData {
    members: HashMap<MemberId, Member>,
    cycles: HashMap<CycleId, Cycle>,
    workshops: HashMap<WorkshopId, Workshop>,
    blocks: HashMap<TimeBlockId, TimeBlock>,
    periods: HashMap<PeriodId, Period>,
    offerings: HashMap<OfferingId, Offering>,
    enrollments: HashMap<EnrollmentId, Enrollment>,

    next_id: i64,
    period_generation: u64,
    period_cache: PeriodDateCache,

    unhealthy: bool,
}

impl LocalData {
    fn alloc(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn ensure_healthy(&self) -> RepositoryResult<()> {
        if self.unhealthy {
            return Err(RepositoryError::internal("repository is not healthy"));
        }
        Ok(())
    }

    fn member(&self, id: MemberId) -> RepositoryResult<&Member> {
        self.members
            .get(&id)
            .ok_or_else(|| RepositoryError::not_found(format!("member {} not found", id)))
    }

    fn cycle(&self, id: CycleId) -> RepositoryResult<&Cycle> {
        self.cycles
            .get(&id)
            .ok_or_else(|| RepositoryError::not_found(format!("cycle {} not found", id)))
    }

    fn period(&self, id: PeriodId) -> RepositoryResult<&Period> {
        self.periods
            .get(&id)
            .ok_or_else(|| RepositoryError::not_found(format!("period {} not found", id)))
    }

    fn offering(&self, id: OfferingId) -> RepositoryResult<&Offering> {
        self.offerings
            .get(&id)
            .ok_or_else(|| RepositoryError::not_found(format!("offering {} not found", id)))
    }

    fn enrollment(&self, id: EnrollmentId) -> RepositoryResult<&Enrollment> {
        self.enrollments
            .get(&id)
            .ok_or_else(|| RepositoryError::not_found(format!("enrollment {} not found", id)))
    }

    /// Records holding `offering`, optionally ignoring one student's
    /// records.
    fn count_students(&self, offering: OfferingId, excluding: Option<MemberId>) -> usize {
        self.enrollments
            .values()
            .filter(|e| e.holds(offering))
            .filter(|e| excluding != Some(e.student_id))
            .count()
    }

    fn teacher_offerings(&self, teacher: MemberId, period: PeriodId) -> Vec<Offering> {
        self.offerings
            .values()
            .filter(|o| o.teacher_id == teacher && o.period_id == period)
            .cloned()
            .collect()
    }

    /// Re-validate teacher availability for an edited or new offering and
    /// store it.
    fn put_offering(&mut self, offering: Offering) -> RepositoryResult<Offering> {
        let colleagues = self.teacher_offerings(offering.teacher_id, offering.period_id);
        validation::check_teacher_availability(&offering, &colleagues)?;
        self.offerings.insert(offering.id, offering.clone());
        Ok(offering)
    }

    fn resolve_blocks(&self, ids: &[TimeBlockId]) -> RepositoryResult<Vec<TimeBlock>> {
        let mut blocks = Vec::with_capacity(ids.len());
        for id in ids {
            let block = self
                .blocks
                .get(id)
                .ok_or_else(|| RepositoryError::not_found(format!("time block {} not found", id)))?;
            blocks.push(*block);
        }
        Ok(blocks)
    }

    fn resolve_cycles(&self, ids: &[CycleId]) -> RepositoryResult<BTreeSet<CycleId>> {
        let mut cycles = BTreeSet::new();
        for id in ids {
            self.cycle(*id)?;
            cycles.insert(*id);
        }
        Ok(cycles)
    }

    /// Mark every period-dependent memo stale. Must be called by every
    /// write that touches period calendars.
    fn touch_periods(&mut self) {
        self.period_generation += 1;
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle the simulated connection health, for error-path tests.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().unhealthy = !healthy;
    }

    /// Drop all stored data.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData::default();
    }
}

#[async_trait]
impl CatalogRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(!self.data.read().unhealthy)
    }

    async fn create_member(&self, member: NewMember) -> RepositoryResult<Member> {
        let mut data = self.data.write();
        data.ensure_healthy()?;
        let id = MemberId(data.alloc());
        let member = Member {
            id,
            username: member.username,
            first_name: member.first_name,
            last_name: member.last_name,
            role: member.role,
        };
        data.members.insert(id, member.clone());
        Ok(member)
    }

    async fn get_member(&self, id: MemberId) -> RepositoryResult<Member> {
        self.data.read().member(id).cloned()
    }

    async fn list_members(&self) -> RepositoryResult<Vec<Member>> {
        let mut members: Vec<Member> = self.data.read().members.values().cloned().collect();
        members.sort_by_key(|m| m.id);
        Ok(members)
    }

    async fn create_cycle(&self, name: String, description: String) -> RepositoryResult<Cycle> {
        let mut data = self.data.write();
        data.ensure_healthy()?;
        let id = CycleId(data.alloc());
        let cycle = Cycle {
            id,
            name,
            description,
        };
        data.cycles.insert(id, cycle.clone());
        Ok(cycle)
    }

    async fn get_cycle(&self, id: CycleId) -> RepositoryResult<Cycle> {
        self.data.read().cycle(id).cloned()
    }

    async fn list_cycles(&self) -> RepositoryResult<Vec<Cycle>> {
        let mut cycles: Vec<Cycle> = self.data.read().cycles.values().cloned().collect();
        cycles.sort_by_key(|c| c.id);
        Ok(cycles)
    }

    async fn create_workshop(
        &self,
        name: String,
        description: String,
    ) -> RepositoryResult<Workshop> {
        let mut data = self.data.write();
        data.ensure_healthy()?;
        let id = WorkshopId(data.alloc());
        let workshop = Workshop {
            id,
            name,
            description,
        };
        data.workshops.insert(id, workshop.clone());
        Ok(workshop)
    }

    async fn list_workshops(&self) -> RepositoryResult<Vec<Workshop>> {
        let mut workshops: Vec<Workshop> = self.data.read().workshops.values().cloned().collect();
        workshops.sort_by_key(|w| w.id);
        Ok(workshops)
    }

    async fn create_time_block(
        &self,
        weekday: Weekday,
        start: NaiveTime,
        end: NaiveTime,
    ) -> RepositoryResult<TimeBlock> {
        let mut data = self.data.write();
        data.ensure_healthy()?;
        let id = TimeBlockId(data.alloc());
        let block = TimeBlock::new(id, weekday, start, end)?;
        let existing: Vec<TimeBlock> = data.blocks.values().copied().collect();
        validation::check_block_placement(&block, &existing)?;
        data.blocks.insert(id, block);
        Ok(block)
    }

    async fn list_time_blocks(&self) -> RepositoryResult<Vec<TimeBlock>> {
        let mut blocks: Vec<TimeBlock> = self.data.read().blocks.values().copied().collect();
        blocks.sort();
        Ok(blocks)
    }

    async fn create_period(&self, period: NewPeriod) -> RepositoryResult<Period> {
        let mut data = self.data.write();
        data.ensure_healthy()?;
        let id = PeriodId(data.alloc());
        let period = Period::new(
            id,
            period.name,
            period.preview_date,
            period.enrollment_start,
            period.enrollment_end,
            period.date_start,
            period.date_end,
        )?;
        let existing: Vec<Period> = data.periods.values().cloned().collect();
        validation::check_period_placement(&period, &existing)?;
        data.periods.insert(id, period.clone());
        data.touch_periods();
        Ok(period)
    }

    async fn update_period(&self, id: PeriodId, period: NewPeriod) -> RepositoryResult<Period> {
        let mut data = self.data.write();
        data.ensure_healthy()?;
        data.period(id)?;
        let period = Period::new(
            id,
            period.name,
            period.preview_date,
            period.enrollment_start,
            period.enrollment_end,
            period.date_start,
            period.date_end,
        )?;
        let existing: Vec<Period> = data.periods.values().cloned().collect();
        validation::check_period_placement(&period, &existing)?;
        data.periods.insert(id, period.clone());
        data.touch_periods();
        Ok(period)
    }

    async fn get_period(&self, id: PeriodId) -> RepositoryResult<Period> {
        self.data.read().period(id).cloned()
    }

    async fn list_periods(&self) -> RepositoryResult<Vec<Period>> {
        let mut periods: Vec<Period> = self.data.read().periods.values().cloned().collect();
        periods.sort_by_key(|p| p.date_start);
        Ok(periods)
    }

    async fn period_by_date(&self, date: NaiveDate) -> RepositoryResult<Option<Period>> {
        // Write lock: the memo is populated on demand.
        let mut data = self.data.write();
        if data.period_cache.generation != data.period_generation {
            data.period_cache.by_date.clear();
            data.period_cache.generation = data.period_generation;
        }
        if let Some(cached) = data.period_cache.by_date.get(&date).copied() {
            return Ok(cached.and_then(|id| data.periods.get(&id).cloned()));
        }
        let found = data.periods.values().find(|p| p.contains(date)).cloned();
        data.period_cache
            .by_date
            .insert(date, found.as_ref().map(|p| p.id));
        Ok(found)
    }

    async fn current_period(&self, now: NaiveDateTime) -> RepositoryResult<Option<Period>> {
        self.period_by_date(now.date()).await
    }

    async fn create_offering(&self, offering: NewOffering) -> RepositoryResult<Offering> {
        let mut data = self.data.write();
        data.ensure_healthy()?;

        let teacher = data.member(offering.teacher_id)?;
        if !teacher.is_teacher() {
            return Err(RuleError::Role {
                member: teacher.full_name(),
                expected: Role::Teacher,
            }
            .into());
        }
        let workshop = data
            .workshops
            .get(&offering.workshop_id)
            .ok_or_else(|| {
                RepositoryError::not_found(format!("workshop {} not found", offering.workshop_id))
            })?
            .clone();
        data.period(offering.period_id)?;
        let blocks = data.resolve_blocks(&offering.block_ids)?;
        let cycle_ids = data.resolve_cycles(&offering.cycle_ids)?;

        let id = OfferingId(data.alloc());
        data.put_offering(Offering {
            id,
            workshop_id: workshop.id,
            workshop_name: workshop.name,
            period_id: offering.period_id,
            teacher_id: offering.teacher_id,
            max_students: offering.max_students,
            cycle_ids,
            blocks,
        })
    }

    async fn get_offering(&self, id: OfferingId) -> RepositoryResult<Offering> {
        self.data.read().offering(id).cloned()
    }

    async fn list_offerings(&self, period: Option<PeriodId>) -> RepositoryResult<Vec<Offering>> {
        let data = self.data.read();
        let mut offerings: Vec<Offering> = data
            .offerings
            .values()
            .filter(|o| period.map_or(true, |p| o.period_id == p))
            .cloned()
            .collect();
        offerings.sort_by_key(|o| o.id);
        Ok(offerings)
    }

    async fn replace_offering_blocks(
        &self,
        id: OfferingId,
        block_ids: Vec<TimeBlockId>,
    ) -> RepositoryResult<Offering> {
        let mut data = self.data.write();
        data.ensure_healthy()?;
        let mut offering = data.offering(id)?.clone();
        offering.blocks = data.resolve_blocks(&block_ids)?;
        data.put_offering(offering)
    }

    async fn replace_offering_cycles(
        &self,
        id: OfferingId,
        cycle_ids: Vec<CycleId>,
    ) -> RepositoryResult<Offering> {
        let mut data = self.data.write();
        data.ensure_healthy()?;
        let mut offering = data.offering(id)?.clone();
        offering.cycle_ids = data.resolve_cycles(&cycle_ids)?;
        data.offerings.insert(id, offering.clone());
        Ok(offering)
    }

    async fn delete_offering(&self, id: OfferingId) -> RepositoryResult<()> {
        let mut data = self.data.write();
        data.ensure_healthy()?;
        data.offering(id)?;
        data.offerings.remove(&id);
        // Cascade: drop the offering from every record holding it.
        for enrollment in data.enrollments.values_mut() {
            enrollment.offering_ids.remove(&id);
        }
        Ok(())
    }

    async fn available_offerings(
        &self,
        cycle: CycleId,
        period: PeriodId,
    ) -> RepositoryResult<BTreeMap<TimeBlock, Vec<Offering>>> {
        let data = self.data.read();
        data.cycle(cycle)?;
        data.period(period)?;

        let mut by_block: BTreeMap<TimeBlock, Vec<Offering>> = BTreeMap::new();
        for offering in data.offerings.values() {
            if offering.period_id != period || !offering.accepts_cycle(cycle) {
                continue;
            }
            for block in &offering.blocks {
                by_block.entry(*block).or_default().push(offering.clone());
            }
        }
        for offerings in by_block.values_mut() {
            offerings.sort_by_key(|o| o.id);
        }
        Ok(by_block)
    }
}

#[async_trait]
impl EnrollmentRepository for LocalRepository {
    async fn create_enrollment(
        &self,
        student: MemberId,
        cycle: CycleId,
        date_joined: NaiveDate,
    ) -> RepositoryResult<Enrollment> {
        let mut data = self.data.write();
        data.ensure_healthy()?;

        let member = data.member(student)?;
        if !member.is_student() {
            return Err(RuleError::Role {
                member: member.full_name(),
                expected: Role::Student,
            }
            .into());
        }
        data.cycle(cycle)?;

        let id = EnrollmentId(data.alloc());
        let enrollment = Enrollment {
            id,
            student_id: student,
            cycle_id: cycle,
            date_joined,
            offering_ids: BTreeSet::new(),
        };
        data.enrollments.insert(id, enrollment.clone());
        Ok(enrollment)
    }

    async fn get_enrollment(&self, id: EnrollmentId) -> RepositoryResult<Enrollment> {
        self.data.read().enrollment(id).cloned()
    }

    async fn current_enrollment_for(
        &self,
        student: MemberId,
    ) -> RepositoryResult<Option<Enrollment>> {
        let data = self.data.read();
        Ok(data
            .enrollments
            .values()
            .filter(|e| e.student_id == student)
            .max_by_key(|e| (e.date_joined, e.id))
            .cloned())
    }

    async fn offerings_of(&self, id: EnrollmentId) -> RepositoryResult<Vec<Offering>> {
        let data = self.data.read();
        let enrollment = data.enrollment(id)?;
        let mut offerings = Vec::with_capacity(enrollment.offering_ids.len());
        for oid in &enrollment.offering_ids {
            offerings.push(data.offering(*oid)?.clone());
        }
        Ok(offerings)
    }

    async fn count_students(
        &self,
        offering: OfferingId,
        excluding: Option<MemberId>,
    ) -> RepositoryResult<usize> {
        let data = self.data.read();
        data.offering(offering)?;
        Ok(data.count_students(offering, excluding))
    }

    async fn remaining_quota(
        &self,
        offering: OfferingId,
        excluding: Option<MemberId>,
    ) -> RepositoryResult<Option<i64>> {
        let data = self.data.read();
        let offering = data.offering(offering)?;
        if offering.max_students == 0 {
            return Ok(None);
        }
        let count = data.count_students(offering.id, excluding) as i64;
        Ok(Some(offering.max_students as i64 - count))
    }

    async fn commit_sessions(
        &self,
        id: EnrollmentId,
        change: SessionChange,
        enforce_quota: bool,
    ) -> RepositoryResult<Enrollment> {
        // The write lock is held across the recount and the write, so
        // concurrent commits against the same offering serialize here.
        let mut data = self.data.write();
        data.ensure_healthy()?;

        let enrollment = data.enrollment(id)?.clone();
        data.period(change.period_id)?;
        for oid in &change.offering_ids {
            let offering = data.offering(*oid)?;
            if offering.period_id != change.period_id {
                return Err(RepositoryError::validation(format!(
                    "`{}` does not belong to period {}",
                    offering, change.period_id
                )));
            }
        }

        let replaced: BTreeSet<OfferingId> = enrollment
            .offering_ids
            .iter()
            .filter(|oid| {
                data.offerings
                    .get(oid)
                    .is_some_and(|o| o.period_id == change.period_id)
            })
            .copied()
            .collect();

        let prospective = validation::prospective_set(
            &enrollment.offering_ids,
            &replaced,
            change.mode,
            &change.offering_ids,
            |oid| {
                data.offerings
                    .get(&oid)
                    .map(|o| o.to_string())
                    .unwrap_or_else(|| format!("offering {}", oid))
            },
        )?;

        // Every offering in the prospective set is re-checked against live
        // data, not just the incoming ones.
        let mut offerings = Vec::with_capacity(prospective.len());
        let mut other_counts = HashMap::with_capacity(prospective.len());
        for oid in &prospective {
            offerings.push(data.offering(*oid)?.clone());
            other_counts.insert(
                *oid,
                data.count_students(*oid, Some(enrollment.student_id)),
            );
        }
        let student = data.member(enrollment.student_id)?;
        let cycle = data.cycle(enrollment.cycle_id)?;
        validation::validate_session_set(&SessionSetInput {
            student,
            cycle,
            offerings: &offerings,
            other_counts: &other_counts,
            enforce_quota,
        })?;

        let entry = data
            .enrollments
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::internal("enrollment vanished during commit"))?;
        entry.offering_ids = prospective;
        Ok(entry.clone())
    }
}
