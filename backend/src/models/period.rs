use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::error::RuleError;

crate::define_id_type!(i64, PeriodId);

/// An academic period with preview, enrollment and active date windows.
///
/// Periods are created and edited administratively and only read by
/// enrollment activity. All state is derived: the predicates below are pure
/// functions of `now` against the stored dates, so "transitions" happen as
/// wall-clock time advances, never through a stored state field.
///
/// Date orderings enforced at construction:
/// - `preview_date <= enrollment_start.date() <= enrollment_end`
/// - `enrollment_start.date() <= date_start < date_end`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub id: PeriodId,
    pub name: String,
    /// First day the period's offerings may be browsed.
    pub preview_date: NaiveDate,
    /// Instant enrollment opens.
    pub enrollment_start: NaiveDateTime,
    /// Last day a student with a full schedule may still change workshops.
    pub enrollment_end: NaiveDate,
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
}

impl Period {
    pub fn new(
        id: PeriodId,
        name: impl Into<String>,
        preview_date: NaiveDate,
        enrollment_start: NaiveDateTime,
        enrollment_end: NaiveDate,
        date_start: NaiveDate,
        date_end: NaiveDate,
    ) -> Result<Self, RuleError> {
        let name = name.into();
        let ordering = |detail: &str| RuleError::Ordering {
            entity: format!("period `{}`", name),
            detail: detail.to_string(),
        };

        if preview_date > enrollment_start.date() {
            return Err(ordering("preview date must not be after enrollment start"));
        }
        if enrollment_start.date() > enrollment_end {
            return Err(ordering("enrollment start must not be after enrollment end"));
        }
        if enrollment_start.date() > date_start {
            return Err(ordering("enrollment start must not be after period start"));
        }
        if date_start >= date_end {
            return Err(ordering("start date must be before end date"));
        }

        Ok(Self {
            id,
            name,
            preview_date,
            enrollment_start,
            enrollment_end,
            date_start,
            date_end,
        })
    }

    /// True if `date` falls inside the half-open active range
    /// `[date_start, date_end)`.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.date_start <= date && date < self.date_end
    }

    pub fn is_current(&self, now: NaiveDateTime) -> bool {
        self.contains(now.date())
    }

    pub fn is_in_the_past(&self, now: NaiveDateTime) -> bool {
        now.date() >= self.date_end
    }

    pub fn is_in_the_future(&self, now: NaiveDateTime) -> bool {
        now.date() < self.date_start
    }

    /// Offerings become visible on the preview date and stay visible until
    /// the period ends.
    pub fn is_enabled_to_preview(&self, now: NaiveDateTime) -> bool {
        self.preview_date <= now.date() && now.date() < self.date_end
    }

    /// Hard enrollment bounds: changes are possible from the enrollment
    /// start instant through the last day of the period. Whether a specific
    /// student may act also depends on schedule fullness, which is the
    /// eligibility policy's concern, not the period's.
    pub fn is_enabled_to_enroll(&self, now: NaiveDateTime) -> bool {
        self.enrollment_start <= now && now.date() <= self.date_end
    }

    pub fn state(&self, now: NaiveDateTime) -> PeriodState {
        PeriodState::of(self, now)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} from {} to {}",
            self.name, self.date_start, self.date_end
        )
    }
}

/// Derived lifecycle stage of a period at a given instant.
///
/// The sequence over time is `Future -> Previewable -> Enrolling -> Active
/// -> Past`. Enrollment remains possible during `Active`; the stage reports
/// where the period sits in its calendar, not whether a given student may
/// act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodState {
    Future,
    Previewable,
    Enrolling,
    Active,
    Past,
}

impl PeriodState {
    pub fn of(period: &Period, now: NaiveDateTime) -> Self {
        if period.is_in_the_past(now) {
            PeriodState::Past
        } else if period.is_current(now) {
            PeriodState::Active
        } else if period.enrollment_start <= now {
            PeriodState::Enrolling
        } else if period.preview_date <= now.date() {
            PeriodState::Previewable
        } else {
            PeriodState::Future
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodState::Future => "future",
            PeriodState::Previewable => "previewable",
            PeriodState::Enrolling => "enrolling",
            PeriodState::Active => "active",
            PeriodState::Past => "past",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn at(date: NaiveDate) -> NaiveDateTime {
        date.and_hms_opt(12, 0, 0).unwrap()
    }

    fn sample_period() -> Period {
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

    #[test]
    fn test_valid_period_construction() {
        let p = sample_period();
        assert_eq!(p.name, "Period 1");
        assert_eq!(p.to_string(), "Period 1 from 2024-05-04 to 2024-06-15");
    }

    #[test]
    fn test_rejects_start_after_end() {
        let err = Period::new(
            PeriodId(1),
            "Bad",
            d(2024, 4, 12),
            d(2024, 4, 19).and_hms_opt(0, 0, 0).unwrap(),
            d(2024, 4, 26),
            d(2024, 6, 15),
            d(2024, 5, 4),
        );
        assert!(matches!(err, Err(RuleError::Ordering { .. })));
    }

    #[test]
    fn test_rejects_enrollment_end_before_enrollment_start() {
        let err = Period::new(
            PeriodId(1),
            "Bad",
            d(2024, 4, 12),
            d(2024, 5, 3).and_hms_opt(0, 0, 0).unwrap(),
            d(2024, 5, 2),
            d(2024, 5, 4),
            d(2024, 6, 15),
        );
        assert!(matches!(err, Err(RuleError::Ordering { .. })));
    }

    #[test]
    fn test_rejects_preview_after_enrollment_start() {
        let err = Period::new(
            PeriodId(1),
            "Bad",
            d(2024, 4, 20),
            d(2024, 4, 19).and_hms_opt(0, 0, 0).unwrap(),
            d(2024, 4, 26),
            d(2024, 5, 4),
            d(2024, 6, 15),
        );
        assert!(matches!(err, Err(RuleError::Ordering { .. })));
    }

    #[test]
    fn test_current_window_is_half_open() {
        let p = sample_period();
        assert!(p.is_current(at(d(2024, 5, 4))));
        assert!(p.is_current(at(d(2024, 6, 14))));
        assert!(!p.is_current(at(d(2024, 6, 15))));
        assert!(p.is_in_the_past(at(d(2024, 6, 15))));
        assert!(p.is_in_the_future(at(d(2024, 5, 3))));
    }

    #[test]
    fn test_preview_window() {
        let p = sample_period();
        assert!(!p.is_enabled_to_preview(at(d(2024, 4, 11))));
        assert!(p.is_enabled_to_preview(at(d(2024, 4, 12))));
        assert!(p.is_enabled_to_preview(at(d(2024, 6, 14))));
        assert!(!p.is_enabled_to_preview(at(d(2024, 6, 15))));
    }

    #[test]
    fn test_enrollment_hard_bounds() {
        let p = sample_period();
        assert!(!p.is_enabled_to_enroll(at(d(2024, 4, 18))));
        assert!(p.is_enabled_to_enroll(at(d(2024, 4, 19))));
        // Changes stay possible through the last day of the period.
        assert!(p.is_enabled_to_enroll(at(d(2024, 6, 15))));
        assert!(!p.is_enabled_to_enroll(at(d(2024, 6, 16))));
    }

    #[test]
    fn test_state_sequence() {
        let p = sample_period();
        assert_eq!(p.state(at(d(2024, 4, 1))), PeriodState::Future);
        assert_eq!(p.state(at(d(2024, 4, 15))), PeriodState::Previewable);
        assert_eq!(p.state(at(d(2024, 4, 25))), PeriodState::Enrolling);
        assert_eq!(p.state(at(d(2024, 5, 10))), PeriodState::Active);
        assert_eq!(p.state(at(d(2024, 7, 1))), PeriodState::Past);
    }
}
