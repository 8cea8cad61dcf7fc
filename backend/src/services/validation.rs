//! Reusable enrollment-rule predicates.
//!
//! Every rule here is a pure function over snapshot data. The same
//! predicates run in two places so form-level and data-level validation can
//! never diverge:
//! 1. as a pre-check in the service layer before a confirmation is shown,
//! 2. inside the repository's commit path, under the store lock, against
//!    live counts.
//!
//! Rules cover:
//! - placement of new time blocks against the system-wide no-overlap
//!   invariant
//! - placement of new periods against the one-active-period invariant
//! - teacher double-booking at offering creation
//! - the joint session-set validation (duplicates, cohort membership,
//!   quota, pairwise non-overlap) run on every enrollment mutation

use std::collections::{BTreeSet, HashMap};

use crate::models::{
    Cycle, Member, Offering, OfferingId, Period, RuleError, TimeBlock,
};

/// How a session change composes with the record's existing set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeMode {
    /// Incoming offerings are added to the existing set. Re-adding a held
    /// offering is a duplicate assignment.
    Add,
    /// Incoming offerings replace the record's offerings for the target
    /// period. Re-submitting the unchanged set is idempotent.
    Replace,
}

/// Reject a new time block that would overlap any stored block on the same
/// weekday. This is a system-wide invariant: blocks are shared across all
/// offerings, so no two stored blocks may ever intersect.
pub fn check_block_placement(
    candidate: &TimeBlock,
    existing: &[TimeBlock],
) -> Result<(), RuleError> {
    for block in existing {
        if block.id == candidate.id {
            continue;
        }
        if candidate.overlaps(block) {
            return Err(RuleError::Collision {
                first: candidate.to_string(),
                second: block.to_string(),
            });
        }
    }
    Ok(())
}

/// Reject a new period whose `[date_start, date_end)` range intersects an
/// existing period's range. Overlapping active ranges would make `current()`
/// ambiguous, so they are a data-integrity violation rejected up front.
pub fn check_period_placement(candidate: &Period, existing: &[Period]) -> Result<(), RuleError> {
    for period in existing {
        if period.id == candidate.id {
            continue;
        }
        if candidate.date_start < period.date_end && period.date_start < candidate.date_end {
            return Err(RuleError::Collision {
                first: candidate.to_string(),
                second: period.to_string(),
            });
        }
    }
    Ok(())
}

/// Reject an offering that would double-book its teacher: any conflicting
/// offering taught by the same teacher in the same period.
pub fn check_teacher_availability(
    candidate: &Offering,
    teacher_offerings: &[Offering],
) -> Result<(), RuleError> {
    for other in teacher_offerings {
        if other.id == candidate.id || other.teacher_id != candidate.teacher_id {
            continue;
        }
        if candidate.conflicts_with(other) {
            return Err(RuleError::Overlap {
                first: candidate.to_string(),
                second: other.to_string(),
            });
        }
    }
    Ok(())
}

/// Resolve the prospective offering-id set for a session change, rejecting
/// duplicate assignments (rule 1 of the session-set validation).
///
/// For `Add`, incoming ids merge into `existing`; an id already held, or
/// repeated in the incoming list, is a duplicate. For `Replace`, the
/// incoming ids stand in for `replaced` (the record's offerings in the
/// target period) and only repetitions within the incoming list itself are
/// duplicates, so re-submitting an unchanged set stays idempotent.
///
/// `label` renders an offering id for the error message.
pub fn prospective_set(
    existing: &BTreeSet<OfferingId>,
    replaced: &BTreeSet<OfferingId>,
    mode: ChangeMode,
    incoming: &[OfferingId],
    label: impl Fn(OfferingId) -> String,
) -> Result<BTreeSet<OfferingId>, RuleError> {
    let mut result: BTreeSet<OfferingId> = match mode {
        ChangeMode::Add => existing.clone(),
        ChangeMode::Replace => existing.difference(replaced).copied().collect(),
    };

    let mut seen: BTreeSet<OfferingId> = BTreeSet::new();
    for &id in incoming {
        let duplicate = match mode {
            ChangeMode::Add => result.contains(&id) || !seen.insert(id),
            ChangeMode::Replace => !seen.insert(id),
        };
        if duplicate {
            return Err(RuleError::DuplicateAssignment { offering: label(id) });
        }
        result.insert(id);
    }

    Ok(result)
}

/// Input to the joint session-set validation: the full prospective set with
/// the live per-offering counts of *other* students.
#[derive(Debug)]
pub struct SessionSetInput<'a> {
    pub student: &'a Member,
    pub cycle: &'a Cycle,
    /// The prospective resulting set: existing plus incoming offerings.
    pub offerings: &'a [Offering],
    /// Per offering, how many other students already hold it. The student
    /// being mutated is excluded so re-validating their own edit does not
    /// count them against the cap.
    pub other_counts: &'a HashMap<OfferingId, usize>,
    /// False only on the administrative override path. Cohort and overlap
    /// checks are absolute and cannot be bypassed.
    pub enforce_quota: bool,
}

/// Validate the prospective session set (rules 2-4).
///
/// Every offering in the set is re-checked, not just the incoming ones, so
/// external changes such as an administratively lowered cap are caught. The
/// first violation aborts the whole mutation.
pub fn validate_session_set(input: &SessionSetInput<'_>) -> Result<(), RuleError> {
    for offering in input.offerings {
        // Cohort membership is absolute.
        if !offering.accepts_cycle(input.cycle.id) {
            return Err(RuleError::CohortMismatch {
                student: input.student.full_name(),
                cycle: input.cycle.name.clone(),
                offering: offering.to_string(),
            });
        }

        if input.enforce_quota && offering.max_students > 0 {
            let others = input
                .other_counts
                .get(&offering.id)
                .copied()
                .unwrap_or(0);
            if others >= offering.max_students as usize {
                return Err(RuleError::QuotaExceeded {
                    offering: offering.to_string(),
                    max_students: offering.max_students,
                });
            }
        }
    }

    for (i, a) in input.offerings.iter().enumerate() {
        for b in &input.offerings[i + 1..] {
            if a.conflicts_with(b) {
                return Err(RuleError::Overlap {
                    first: a.to_string(),
                    second: b.to_string(),
                });
            }
        }
    }

    Ok(())
}
