//! Repository-level tests for the in-memory backend: catalog invariants,
//! the period-by-date memo, cascade deletes and the availability
//! projection.

mod support;

use enroll_rust::db::repository::{
    CatalogRepository, EnrollmentRepository, NewMember, NewOffering, NewPeriod, RepositoryError,
};
use enroll_rust::db::repositories::LocalRepository;
use enroll_rust::models::{Role, RuleError, Weekday};
use support::*;

#[tokio::test]
async fn test_health_check_toggles() {
    let repo = LocalRepository::new();
    assert!(repo.health_check().await.unwrap());
    repo.set_healthy(false);
    assert!(!repo.health_check().await.unwrap());
    assert!(repo.list_members().await.is_ok());
    assert!(repo
        .create_cycle("Ulmos".to_string(), String::new())
        .await
        .is_err());
}

#[tokio::test]
async fn test_time_blocks_may_never_overlap_system_wide() {
    let repo = LocalRepository::new();
    repo.create_time_block(Weekday::Monday, time(10, 15), time(11, 15))
        .await
        .unwrap();

    let err = repo
        .create_time_block(Weekday::Monday, time(10, 45), time(11, 45))
        .await
        .unwrap_err();
    assert!(matches!(err.rule(), Some(RuleError::Collision { .. })));

    // Back-to-back and other-weekday blocks are fine.
    assert!(repo
        .create_time_block(Weekday::Monday, time(11, 15), time(12, 15))
        .await
        .is_ok());
    assert!(repo
        .create_time_block(Weekday::Tuesday, time(10, 45), time(11, 45))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_inverted_time_block_is_rejected() {
    let repo = LocalRepository::new();
    let err = repo
        .create_time_block(Weekday::Monday, time(11, 0), time(10, 0))
        .await
        .unwrap_err();
    assert!(matches!(err.rule(), Some(RuleError::Ordering { .. })));
}

#[tokio::test]
async fn test_period_active_ranges_may_not_overlap() {
    let fx = Fixture::seed().await;
    // Seeded period runs 2024-05-04 to 2024-06-15.
    let err = fx
        .repo
        .create_period(NewPeriod {
            name: "Period 2".to_string(),
            preview_date: date(2024, 5, 20),
            enrollment_start: date(2024, 5, 27).and_hms_opt(0, 0, 0).unwrap(),
            enrollment_end: date(2024, 6, 3),
            date_start: date(2024, 6, 10),
            date_end: date(2024, 7, 20),
        })
        .await
        .unwrap_err();
    assert!(matches!(err.rule(), Some(RuleError::Collision { .. })));

    // Starting exactly on the previous end date is allowed (half-open).
    assert!(fx
        .repo
        .create_period(NewPeriod {
            name: "Period 2".to_string(),
            preview_date: date(2024, 5, 20),
            enrollment_start: date(2024, 5, 27).and_hms_opt(0, 0, 0).unwrap(),
            enrollment_end: date(2024, 6, 3),
            date_start: date(2024, 6, 15),
            date_end: date(2024, 7, 20),
        })
        .await
        .is_ok());
}

#[tokio::test]
async fn test_period_by_date_memo_survives_repeat_lookups() {
    let fx = Fixture::seed().await;
    for _ in 0..3 {
        let found = fx.repo.period_by_date(date(2024, 5, 10)).await.unwrap();
        assert_eq!(found.map(|p| p.id), Some(fx.period.id));
        let missing = fx.repo.period_by_date(date(2024, 12, 25)).await.unwrap();
        assert!(missing.is_none());
    }
}

#[tokio::test]
async fn test_period_edit_invalidates_date_lookup() {
    let fx = Fixture::seed().await;
    // Warm the memo.
    assert!(fx
        .repo
        .period_by_date(date(2024, 6, 10))
        .await
        .unwrap()
        .is_some());

    // Shrink the active range so 2024-06-10 falls outside it.
    fx.repo
        .update_period(
            fx.period.id,
            NewPeriod {
                name: "Period 1".to_string(),
                preview_date: date(2024, 4, 12),
                enrollment_start: date(2024, 4, 19).and_hms_opt(0, 0, 0).unwrap(),
                enrollment_end: date(2024, 4, 26),
                date_start: date(2024, 5, 4),
                date_end: date(2024, 6, 1),
            },
        )
        .await
        .unwrap();

    assert!(fx
        .repo
        .period_by_date(date(2024, 6, 10))
        .await
        .unwrap()
        .is_none());
    assert!(fx
        .repo
        .period_by_date(date(2024, 5, 10))
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_current_period_uses_active_range() {
    let fx = Fixture::seed().await;
    let current = fx
        .repo
        .current_period(during_enrollment())
        .await
        .unwrap();
    // Enrollment is open but the period has not started yet.
    assert!(current.is_none());

    let current = fx
        .repo
        .current_period(after_enrollment_window())
        .await
        .unwrap();
    assert_eq!(current.map(|p| p.id), Some(fx.period.id));
}

#[tokio::test]
async fn test_offering_requires_teacher_role() {
    let fx = Fixture::seed().await;
    let student = fx.student("mperez", "Maria", "Perez").await;
    let err = fx
        .repo
        .create_offering(NewOffering {
            workshop_id: fx.chess.id,
            period_id: fx.period.id,
            teacher_id: student.id,
            max_students: 0,
            cycle_ids: vec![fx.cycle.id],
            block_ids: fx.block_ids(&[0]),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.rule(),
        Some(RuleError::Role {
            expected: Role::Teacher,
            ..
        })
    ));
}

#[tokio::test]
async fn test_enrollment_requires_student_role() {
    let fx = Fixture::seed().await;
    let err = fx
        .repo
        .create_enrollment(fx.teacher.id, fx.cycle.id, date(2024, 3, 1))
        .await
        .unwrap_err();
    assert!(matches!(
        err.rule(),
        Some(RuleError::Role {
            expected: Role::Student,
            ..
        })
    ));
}

#[tokio::test]
async fn test_teacher_cannot_be_double_booked() {
    let fx = Fixture::seed().await;
    fx.offering(fx.chess.id, fx.teacher.id, 0, &[fx.cycle.id], &[0])
        .await;

    // Same teacher, same Monday block.
    let err = fx
        .repo
        .create_offering(NewOffering {
            workshop_id: fx.theater.id,
            period_id: fx.period.id,
            teacher_id: fx.teacher.id,
            max_students: 0,
            cycle_ids: vec![fx.cycle.id],
            block_ids: fx.block_ids(&[0]),
        })
        .await
        .unwrap_err();
    assert!(matches!(err.rule(), Some(RuleError::Overlap { .. })));

    // A different teacher may take the block.
    assert!(fx
        .repo
        .create_offering(NewOffering {
            workshop_id: fx.theater.id,
            period_id: fx.period.id,
            teacher_id: fx.other_teacher.id,
            max_students: 0,
            cycle_ids: vec![fx.cycle.id],
            block_ids: fx.block_ids(&[0]),
        })
        .await
        .is_ok());
}

#[tokio::test]
async fn test_replace_offering_blocks_revalidates_teacher() {
    let fx = Fixture::seed().await;
    fx.offering(fx.chess.id, fx.teacher.id, 0, &[fx.cycle.id], &[0])
        .await;
    let theater = fx
        .offering(fx.theater.id, fx.teacher.id, 0, &[fx.cycle.id], &[1])
        .await;

    // Moving theater onto chess's block double-books the teacher.
    let err = fx
        .repo
        .replace_offering_blocks(theater.id, fx.block_ids(&[0]))
        .await
        .unwrap_err();
    assert!(matches!(err.rule(), Some(RuleError::Overlap { .. })));

    // The failed edit left the offering untouched.
    let unchanged = fx.repo.get_offering(theater.id).await.unwrap();
    assert_eq!(unchanged.blocks, theater.blocks);
}

#[tokio::test]
async fn test_delete_offering_cascades_to_enrollments() {
    let fx = Fixture::seed().await;
    let chess = fx
        .offering(fx.chess.id, fx.teacher.id, 0, &[fx.cycle.id], &[0])
        .await;
    let (_, enrollment) = fx.enrolled_student("mperez").await;
    fx.repo
        .commit_sessions(
            enrollment.id,
            enroll_rust::db::repository::SessionChange {
                period_id: fx.period.id,
                mode: enroll_rust::services::validation::ChangeMode::Add,
                offering_ids: vec![chess.id],
            },
            true,
        )
        .await
        .unwrap();

    fx.repo.delete_offering(chess.id).await.unwrap();

    let record = fx.repo.get_enrollment(enrollment.id).await.unwrap();
    assert!(record.offering_ids.is_empty());
    assert!(matches!(
        fx.repo.get_offering(chess.id).await,
        Err(RepositoryError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_commit_rejects_offering_from_another_period() {
    let fx = Fixture::seed().await;
    let next_period = fx
        .repo
        .create_period(NewPeriod {
            name: "Period 2".to_string(),
            preview_date: date(2024, 6, 1),
            enrollment_start: date(2024, 6, 16).and_hms_opt(0, 0, 0).unwrap(),
            enrollment_end: date(2024, 6, 23),
            date_start: date(2024, 7, 1),
            date_end: date(2024, 8, 15),
        })
        .await
        .unwrap();
    let chess = fx
        .offering(fx.chess.id, fx.teacher.id, 0, &[fx.cycle.id], &[0])
        .await;
    let (_, enrollment) = fx.enrolled_student("mperez").await;

    let err = fx
        .repo
        .commit_sessions(
            enrollment.id,
            enroll_rust::db::repository::SessionChange {
                period_id: next_period.id,
                mode: enroll_rust::services::validation::ChangeMode::Add,
                offering_ids: vec![chess.id],
            },
            true,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Validation(_)));
}

#[tokio::test]
async fn test_available_offerings_groups_by_block_and_filters_cycle() {
    let fx = Fixture::seed().await;
    let chess = fx
        .offering(fx.chess.id, fx.teacher.id, 0, &[fx.cycle.id], &[0])
        .await;
    let theater = fx
        .offering(
            fx.theater.id,
            fx.other_teacher.id,
            0,
            &[fx.cycle.id, fx.other_cycle.id],
            &[0, 1],
        )
        .await;
    // Not open to the main cycle.
    fx.offering(fx.football.id, fx.teacher.id, 0, &[fx.other_cycle.id], &[2])
        .await;

    let by_block = fx
        .repo
        .available_offerings(fx.cycle.id, fx.period.id)
        .await
        .unwrap();

    assert_eq!(by_block.len(), 2);
    let monday = &by_block[&fx.blocks[0]];
    assert_eq!(
        monday.iter().map(|o| o.id).collect::<Vec<_>>(),
        vec![chess.id, theater.id]
    );
    let tuesday = &by_block[&fx.blocks[1]];
    assert_eq!(
        tuesday.iter().map(|o| o.id).collect::<Vec<_>>(),
        vec![theater.id]
    );
}

#[tokio::test]
async fn test_current_enrollment_is_latest_by_date_joined() {
    let fx = Fixture::seed().await;
    let student = fx.student("mperez", "Maria", "Perez").await;
    fx.repo
        .create_enrollment(student.id, fx.cycle.id, date(2023, 3, 1))
        .await
        .unwrap();
    let newer = fx
        .repo
        .create_enrollment(student.id, fx.cycle.id, date(2024, 3, 1))
        .await
        .unwrap();

    let current = fx
        .repo
        .current_enrollment_for(student.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(current.id, newer.id);
}

#[tokio::test]
async fn test_unlimited_offering_has_no_quota() {
    let fx = Fixture::seed().await;
    let chess = fx
        .offering(fx.chess.id, fx.teacher.id, 0, &[fx.cycle.id], &[0])
        .await;
    assert_eq!(fx.repo.remaining_quota(chess.id, None).await.unwrap(), None);
}

#[tokio::test]
async fn test_member_roles_are_stored_explicitly() {
    let repo = LocalRepository::new();
    let member = repo
        .create_member(NewMember {
            username: "asoto".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Soto".to_string(),
            role: Role::Staff,
        })
        .await
        .unwrap();
    assert!(member.is_staff());
    assert!(!member.is_student());
    assert_eq!(member.full_name(), "Ana Soto");
}
