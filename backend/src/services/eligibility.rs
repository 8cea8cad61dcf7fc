//! Time-gated mutation rights.
//!
//! These are boolean policy answers, not errors. Callers use them to decide
//! which affordances to show; the mutation entry points re-check them and
//! raise `RuleError::Eligibility` if a caller mutates despite a closed
//! window.

use chrono::NaiveDateTime;

use crate::models::{Offering, Period, PeriodId};

/// Number of distinct weekly time blocks the offerings cover within the
/// given period.
pub fn covered_block_count(offerings: &[Offering], period: PeriodId) -> usize {
    let mut seen = std::collections::BTreeSet::new();
    for offering in offerings {
        if offering.period_id != period {
            continue;
        }
        for id in offering.block_ids() {
            seen.insert(id);
        }
    }
    seen.len()
}

/// A schedule is full when the record's offerings for the period cover every
/// time block that exists in the system.
///
/// `total_block_count` is the global count of stored blocks, not a
/// per-offering figure: adding a new system-wide block retroactively makes
/// previously full students not full again.
pub fn is_schedule_full(
    offerings: &[Offering],
    period: PeriodId,
    total_block_count: usize,
) -> bool {
    total_block_count > 0 && covered_block_count(offerings, period) == total_block_count
}

/// Whether the record may change its session set at `now`.
///
/// Hard bounds first: nothing is possible before `enrollment_start` or after
/// the period's last day. Inside those bounds the window depends on
/// fullness: a student with a complete weekly schedule may only reshuffle
/// during the initial enrollment window (up to `enrollment_end`), while a
/// student with gaps may keep filling them until the period ends. The
/// asymmetry keeps satisfied students from churning sessions deep into the
/// period without locking out students who never completed a schedule.
pub fn is_enabled_to_enroll(period: &Period, schedule_full: bool, now: NaiveDateTime) -> bool {
    if now < period.enrollment_start || now.date() > period.date_end {
        return false;
    }
    if schedule_full {
        now.date() <= period.enrollment_end
    } else {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        MemberId, OfferingId, TimeBlock, TimeBlockId, Weekday, WorkshopId,
    };
    use chrono::{NaiveDate, NaiveTime};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn at(date: NaiveDate) -> NaiveDateTime {
        date.and_hms_opt(12, 0, 0).unwrap()
    }

    fn period() -> Period {
        Period::new(
            PeriodId(1),
            "Period 1",
            d(2024, 4, 12),
            d(2024, 4, 19).and_hms_opt(0, 0, 0).unwrap(),
            d(2024, 4, 26),
            d(2024, 5, 4),
            d(2024, 6, 15),
        )
        .unwrap()
    }

    fn block(id: i64, weekday: Weekday, h: u32) -> TimeBlock {
        TimeBlock::new(
            TimeBlockId(id),
            weekday,
            NaiveTime::from_hms_opt(h, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(h + 1, 0, 0).unwrap(),
        )
        .unwrap()
    }

    fn offering(id: i64, period: i64, blocks: Vec<TimeBlock>) -> Offering {
        Offering {
            id: OfferingId(id),
            workshop_id: WorkshopId(id),
            workshop_name: format!("Workshop {}", id),
            period_id: PeriodId(period),
            teacher_id: MemberId(1),
            max_students: 0,
            cycle_ids: Default::default(),
            blocks,
        }
    }

    #[test]
    fn test_covered_blocks_ignore_other_periods() {
        let offerings = vec![
            offering(1, 1, vec![block(1, Weekday::Monday, 9)]),
            offering(2, 2, vec![block(2, Weekday::Tuesday, 9)]),
        ];
        assert_eq!(covered_block_count(&offerings, PeriodId(1)), 1);
    }

    #[test]
    fn test_full_schedule_counts_distinct_blocks_globally() {
        let b1 = block(1, Weekday::Monday, 9);
        let b2 = block(2, Weekday::Tuesday, 9);
        let offerings = vec![offering(1, 1, vec![b1]), offering(2, 1, vec![b2])];

        assert!(is_schedule_full(&offerings, PeriodId(1), 2));
        // A new system-wide block makes the same record not full anymore.
        assert!(!is_schedule_full(&offerings, PeriodId(1), 3));
    }

    #[test]
    fn test_empty_system_is_never_full() {
        assert!(!is_schedule_full(&[], PeriodId(1), 0));
    }

    #[test]
    fn test_window_for_non_full_record() {
        let p = period();
        // Scenario: inside the enrollment window.
        assert!(is_enabled_to_enroll(&p, false, at(d(2024, 4, 25))));
        // After enrollment_end a non-full record may still fill gaps.
        assert!(is_enabled_to_enroll(&p, false, at(d(2024, 4, 27))));
        assert!(is_enabled_to_enroll(&p, false, at(d(2024, 6, 15))));
        // Past the period's end nothing is possible.
        assert!(!is_enabled_to_enroll(&p, false, at(d(2024, 6, 16))));
    }

    #[test]
    fn test_window_for_full_record() {
        let p = period();
        assert!(is_enabled_to_enroll(&p, true, at(d(2024, 4, 25))));
        assert!(is_enabled_to_enroll(&p, true, at(d(2024, 4, 26))));
        // Full schedules may only reshuffle during the enrollment window.
        assert!(!is_enabled_to_enroll(&p, true, at(d(2024, 4, 27))));
        assert!(!is_enabled_to_enroll(&p, true, at(d(2024, 6, 16))));
    }

    #[test]
    fn test_nothing_before_enrollment_start() {
        let p = period();
        assert!(!is_enabled_to_enroll(&p, false, at(d(2024, 4, 18))));
        assert!(!is_enabled_to_enroll(&p, true, at(d(2024, 4, 18))));
    }
}
