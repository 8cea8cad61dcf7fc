//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for rule logic.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDateTime, Utc};

use super::dto::{
    AvailableOfferingsResponse, AvailableQuery, CreateEnrollmentRequest, CreateMemberRequest,
    CreateOfferingRequest, CreateTimeBlockRequest, EligibilityQuery, EligibilityResponse,
    HealthResponse, NamedEntityRequest, OfferingDto, OfferingListQuery, PeriodRequest,
    ScheduleSlotDto, SessionChangeRequest,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::repository::{
    CatalogRepository, EnrollmentRepository, NewMember, NewOffering, NewPeriod,
};
use crate::db::services as db_services;
use crate::db::Actor;
use crate::models::{
    Cycle, Enrollment, EnrollmentId, Member, MemberId, Offering, OfferingId, Period, PeriodId,
    TimeBlock, Workshop,
};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

fn now_or(as_of: Option<NaiveDateTime>) -> NaiveDateTime {
    as_of.unwrap_or_else(|| Utc::now().naive_utc())
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and storage is
/// accessible.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Catalog
// =============================================================================

/// POST /v1/time-blocks
pub async fn create_time_block(
    State(state): State<AppState>,
    Json(request): Json<CreateTimeBlockRequest>,
) -> Result<(StatusCode, Json<TimeBlock>), AppError> {
    let block = db_services::create_time_block(
        state.repository.as_ref(),
        request.weekday,
        request.start,
        request.end,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(block)))
}

/// GET /v1/time-blocks
pub async fn list_time_blocks(State(state): State<AppState>) -> HandlerResult<Vec<TimeBlock>> {
    Ok(Json(state.repository.list_time_blocks().await?))
}

/// POST /v1/members
pub async fn create_member(
    State(state): State<AppState>,
    Json(request): Json<CreateMemberRequest>,
) -> Result<(StatusCode, Json<Member>), AppError> {
    let member = db_services::create_member(
        state.repository.as_ref(),
        NewMember {
            username: request.username,
            first_name: request.first_name,
            last_name: request.last_name,
            role: request.role,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// GET /v1/members
pub async fn list_members(State(state): State<AppState>) -> HandlerResult<Vec<Member>> {
    Ok(Json(state.repository.list_members().await?))
}

/// POST /v1/cycles
pub async fn create_cycle(
    State(state): State<AppState>,
    Json(request): Json<NamedEntityRequest>,
) -> Result<(StatusCode, Json<Cycle>), AppError> {
    let cycle =
        db_services::create_cycle(state.repository.as_ref(), request.name, request.description)
            .await?;
    Ok((StatusCode::CREATED, Json(cycle)))
}

/// GET /v1/cycles
pub async fn list_cycles(State(state): State<AppState>) -> HandlerResult<Vec<Cycle>> {
    Ok(Json(state.repository.list_cycles().await?))
}

/// POST /v1/workshops
pub async fn create_workshop(
    State(state): State<AppState>,
    Json(request): Json<NamedEntityRequest>,
) -> Result<(StatusCode, Json<Workshop>), AppError> {
    let workshop =
        db_services::create_workshop(state.repository.as_ref(), request.name, request.description)
            .await?;
    Ok((StatusCode::CREATED, Json(workshop)))
}

/// GET /v1/workshops
pub async fn list_workshops(State(state): State<AppState>) -> HandlerResult<Vec<Workshop>> {
    Ok(Json(state.repository.list_workshops().await?))
}

// =============================================================================
// Periods
// =============================================================================

fn new_period(request: PeriodRequest) -> NewPeriod {
    NewPeriod {
        name: request.name,
        preview_date: request.preview_date,
        enrollment_start: request.enrollment_start,
        enrollment_end: request.enrollment_end,
        date_start: request.date_start,
        date_end: request.date_end,
    }
}

/// POST /v1/periods
pub async fn create_period(
    State(state): State<AppState>,
    Json(request): Json<PeriodRequest>,
) -> Result<(StatusCode, Json<Period>), AppError> {
    let period = db_services::create_period(state.repository.as_ref(), new_period(request)).await?;
    Ok((StatusCode::CREATED, Json(period)))
}

/// PUT /v1/periods/{period_id}
pub async fn update_period(
    State(state): State<AppState>,
    Path(period_id): Path<i64>,
    Json(request): Json<PeriodRequest>,
) -> HandlerResult<Period> {
    let period = db_services::update_period(
        state.repository.as_ref(),
        PeriodId::new(period_id),
        new_period(request),
    )
    .await?;
    Ok(Json(period))
}

/// GET /v1/periods
pub async fn list_periods(State(state): State<AppState>) -> HandlerResult<Vec<Period>> {
    Ok(Json(state.repository.list_periods().await?))
}

/// GET /v1/periods/current
///
/// The period whose active range contains today, or 404 when between
/// periods.
pub async fn get_current_period(State(state): State<AppState>) -> HandlerResult<Period> {
    let now = Utc::now().naive_utc();
    db_services::current_period(state.repository.as_ref(), now)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("no period is currently active".to_string()))
}

/// GET /v1/periods/{period_id}
pub async fn get_period(
    State(state): State<AppState>,
    Path(period_id): Path<i64>,
) -> HandlerResult<Period> {
    Ok(Json(
        state.repository.get_period(PeriodId::new(period_id)).await?,
    ))
}

/// GET /v1/periods/{period_id}/offerings?cycle={cycle_id}
///
/// The choice-form projection: per time block, the offerings of the period
/// open to the given cycle, each with its display quota.
pub async fn get_available_offerings(
    State(state): State<AppState>,
    Path(period_id): Path<i64>,
    Query(query): Query<AvailableQuery>,
) -> HandlerResult<AvailableOfferingsResponse> {
    let period_id = PeriodId::new(period_id);
    let by_block =
        db_services::available_offerings(state.repository.as_ref(), query.cycle, period_id).await?;

    let mut slots = Vec::with_capacity(by_block.len());
    for (block, offerings) in by_block {
        let mut dtos = Vec::with_capacity(offerings.len());
        for offering in offerings {
            dtos.push(offering_dto(&state, offering).await?);
        }
        slots.push(ScheduleSlotDto {
            block,
            offerings: dtos,
        });
    }

    Ok(Json(AvailableOfferingsResponse {
        period_id,
        cycle_id: query.cycle,
        slots,
    }))
}

// =============================================================================
// Offerings
// =============================================================================

async fn offering_dto(state: &AppState, offering: Offering) -> Result<OfferingDto, AppError> {
    let quota =
        db_services::remaining_quota_display(state.repository.as_ref(), offering.id, None).await?;
    Ok(OfferingDto::new(offering, quota))
}

/// POST /v1/offerings
pub async fn create_offering(
    State(state): State<AppState>,
    Json(request): Json<CreateOfferingRequest>,
) -> Result<(StatusCode, Json<OfferingDto>), AppError> {
    let offering = db_services::create_offering(
        state.repository.as_ref(),
        NewOffering {
            workshop_id: request.workshop_id,
            period_id: request.period_id,
            teacher_id: request.teacher_id,
            max_students: request.max_students,
            cycle_ids: request.cycle_ids,
            block_ids: request.block_ids,
        },
    )
    .await?;
    let dto = offering_dto(&state, offering).await?;
    Ok((StatusCode::CREATED, Json(dto)))
}

/// GET /v1/offerings?period={period_id}
pub async fn list_offerings(
    State(state): State<AppState>,
    Query(query): Query<OfferingListQuery>,
) -> HandlerResult<Vec<OfferingDto>> {
    let offerings = state.repository.list_offerings(query.period).await?;
    let mut dtos = Vec::with_capacity(offerings.len());
    for offering in offerings {
        dtos.push(offering_dto(&state, offering).await?);
    }
    Ok(Json(dtos))
}

/// GET /v1/offerings/{offering_id}
pub async fn get_offering(
    State(state): State<AppState>,
    Path(offering_id): Path<i64>,
) -> HandlerResult<OfferingDto> {
    let offering = state
        .repository
        .get_offering(OfferingId::new(offering_id))
        .await?;
    Ok(Json(offering_dto(&state, offering).await?))
}

/// DELETE /v1/offerings/{offering_id}
pub async fn delete_offering(
    State(state): State<AppState>,
    Path(offering_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    db_services::delete_offering(state.repository.as_ref(), OfferingId::new(offering_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Enrollments
// =============================================================================

/// POST /v1/enrollments
pub async fn create_enrollment(
    State(state): State<AppState>,
    Json(request): Json<CreateEnrollmentRequest>,
) -> Result<(StatusCode, Json<Enrollment>), AppError> {
    let enrollment = db_services::create_enrollment(
        state.repository.as_ref(),
        request.student_id,
        request.cycle_id,
        request.date_joined,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

/// GET /v1/enrollments/{enrollment_id}
pub async fn get_enrollment(
    State(state): State<AppState>,
    Path(enrollment_id): Path<i64>,
) -> HandlerResult<Enrollment> {
    Ok(Json(
        state
            .repository
            .get_enrollment(EnrollmentId::new(enrollment_id))
            .await?,
    ))
}

async fn resolve_actor(state: &AppState, member_id: MemberId) -> Result<Actor, AppError> {
    let member = state.repository.get_member(member_id).await?;
    Ok(Actor {
        member_id: member.id,
        role: member.role,
    })
}

/// PUT /v1/enrollments/{enrollment_id}/sessions
///
/// Replace the record's session set for one period. Idempotent for an
/// unchanged set.
pub async fn set_sessions(
    State(state): State<AppState>,
    Path(enrollment_id): Path<i64>,
    Json(request): Json<SessionChangeRequest>,
) -> HandlerResult<Enrollment> {
    let actor = resolve_actor(&state, request.actor_id).await?;
    let enrollment = db_services::set_student_sessions(
        state.repository.as_ref(),
        EnrollmentId::new(enrollment_id),
        request.period_id,
        request.offering_ids,
        &actor,
        now_or(request.as_of),
    )
    .await?;
    Ok(Json(enrollment))
}

/// POST /v1/enrollments/{enrollment_id}/sessions
///
/// Add offerings to the record's session set. Re-adding a held offering is
/// an error.
pub async fn add_sessions(
    State(state): State<AppState>,
    Path(enrollment_id): Path<i64>,
    Json(request): Json<SessionChangeRequest>,
) -> HandlerResult<Enrollment> {
    let actor = resolve_actor(&state, request.actor_id).await?;
    let enrollment = db_services::add_student_sessions(
        state.repository.as_ref(),
        EnrollmentId::new(enrollment_id),
        request.period_id,
        request.offering_ids,
        &actor,
        now_or(request.as_of),
    )
    .await?;
    Ok(Json(enrollment))
}

/// GET /v1/enrollments/{enrollment_id}/eligibility?period={period_id}
///
/// Whether the record may still change its session set for the period.
pub async fn get_eligibility(
    State(state): State<AppState>,
    Path(enrollment_id): Path<i64>,
    Query(query): Query<EligibilityQuery>,
) -> HandlerResult<EligibilityResponse> {
    let enrollment_id = EnrollmentId::new(enrollment_id);
    let now = now_or(query.as_of);

    let period = state.repository.get_period(query.period).await?;
    let schedule_full =
        db_services::is_schedule_full(state.repository.as_ref(), enrollment_id, period.id).await?;
    let enabled = db_services::is_enabled_to_enroll(
        state.repository.as_ref(),
        enrollment_id,
        period.id,
        now,
    )
    .await?;

    Ok(Json(EligibilityResponse {
        period_id: period.id,
        period_state: period.state(now),
        schedule_full,
        enabled_to_enroll: enabled,
    }))
}
