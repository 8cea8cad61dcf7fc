//! Shared fixtures for integration tests.
//!
//! Seeds a `LocalRepository` with a small but realistic program: three
//! weekly time blocks, one period with distinct preview, enrollment and
//! active windows, two cycles, a teacher and a few workshops.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use enroll_rust::db::repository::{
    CatalogRepository, EnrollmentRepository, NewMember, NewOffering, NewPeriod,
};
use enroll_rust::db::repositories::LocalRepository;
use enroll_rust::models::{
    Cycle, CycleId, Enrollment, Member, MemberId, Offering, Period, Role, TimeBlock, TimeBlockId,
    Weekday, Workshop, WorkshopId,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn noon(y: i32, m: u32, d: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(12, 0, 0).unwrap()
}

/// An instant inside the period's enrollment window.
pub fn during_enrollment() -> NaiveDateTime {
    noon(2024, 4, 25)
}

/// An instant inside the period's active range but after enrollment_end.
pub fn after_enrollment_window() -> NaiveDateTime {
    noon(2024, 5, 10)
}

/// An instant after the period has ended.
pub fn after_period() -> NaiveDateTime {
    noon(2024, 7, 1)
}

pub struct Fixture {
    pub repo: LocalRepository,
    pub period: Period,
    pub cycle: Cycle,
    pub other_cycle: Cycle,
    pub teacher: Member,
    pub other_teacher: Member,
    pub blocks: Vec<TimeBlock>,
    pub chess: Workshop,
    pub theater: Workshop,
    pub football: Workshop,
}

impl Fixture {
    pub async fn seed() -> Self {
        let repo = LocalRepository::new();

        let mut blocks = Vec::new();
        for weekday in [Weekday::Monday, Weekday::Tuesday, Weekday::Wednesday] {
            let block = repo
                .create_time_block(weekday, time(10, 15), time(11, 15))
                .await
                .unwrap();
            blocks.push(block);
        }

        let period = repo
            .create_period(NewPeriod {
                name: "Period 1".to_string(),
                preview_date: date(2024, 4, 12),
                enrollment_start: date(2024, 4, 19).and_hms_opt(0, 0, 0).unwrap(),
                enrollment_end: date(2024, 4, 26),
                date_start: date(2024, 5, 4),
                date_end: date(2024, 6, 15),
            })
            .await
            .unwrap();

        let cycle = repo
            .create_cycle("Ulmos".to_string(), "Older cohort".to_string())
            .await
            .unwrap();
        let other_cycle = repo
            .create_cycle("Avellanos".to_string(), "Younger cohort".to_string())
            .await
            .unwrap();

        let teacher = repo
            .create_member(NewMember {
                username: "jsilva".to_string(),
                first_name: "Juan".to_string(),
                last_name: "Silva".to_string(),
                role: Role::Teacher,
            })
            .await
            .unwrap();
        let other_teacher = repo
            .create_member(NewMember {
                username: "crojas".to_string(),
                first_name: "Carla".to_string(),
                last_name: "Rojas".to_string(),
                role: Role::Teacher,
            })
            .await
            .unwrap();

        let chess = repo
            .create_workshop("Chess".to_string(), String::new())
            .await
            .unwrap();
        let theater = repo
            .create_workshop("Theater".to_string(), String::new())
            .await
            .unwrap();
        let football = repo
            .create_workshop("Football".to_string(), String::new())
            .await
            .unwrap();

        Self {
            repo,
            period,
            cycle,
            other_cycle,
            teacher,
            other_teacher,
            blocks,
            chess,
            theater,
            football,
        }
    }

    pub fn block_ids(&self, indices: &[usize]) -> Vec<TimeBlockId> {
        indices.iter().map(|&i| self.blocks[i].id).collect()
    }

    pub async fn offering(
        &self,
        workshop: WorkshopId,
        teacher: MemberId,
        max_students: u32,
        cycles: &[CycleId],
        block_indices: &[usize],
    ) -> Offering {
        self.repo
            .create_offering(NewOffering {
                workshop_id: workshop,
                period_id: self.period.id,
                teacher_id: teacher,
                max_students,
                cycle_ids: cycles.to_vec(),
                block_ids: self.block_ids(block_indices),
            })
            .await
            .unwrap()
    }

    pub async fn student(&self, username: &str, first: &str, last: &str) -> Member {
        self.repo
            .create_member(NewMember {
                username: username.to_string(),
                first_name: first.to_string(),
                last_name: last.to_string(),
                role: Role::Student,
            })
            .await
            .unwrap()
    }

    /// A student enrolled in the main cycle, with their enrollment record.
    pub async fn enrolled_student(&self, username: &str) -> (Member, Enrollment) {
        let student = self.student(username, "Maria", "Perez").await;
        let enrollment = self
            .repo
            .create_enrollment(student.id, self.cycle.id, date(2024, 3, 1))
            .await
            .unwrap();
        (student, enrollment)
    }
}
