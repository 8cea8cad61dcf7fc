//! Data Transfer Objects for the HTTP API.
//!
//! Domain models already derive `Serialize`/`Deserialize` and are returned
//! directly where no shaping is needed. DTOs exist where the wire shape
//! diverges from the stored one: offerings carry a display quota clamped to
//! zero, and the availability projection flattens the per-block map into a
//! list.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::{
    CycleId, MemberId, Offering, OfferingId, PeriodId, PeriodState, Role, TimeBlock, TimeBlockId,
    Weekday, WorkshopId,
};

/// Request body for creating a time block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTimeBlockRequest {
    pub weekday: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// Request body for creating or editing a period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodRequest {
    pub name: String,
    pub preview_date: NaiveDate,
    pub enrollment_start: NaiveDateTime,
    pub enrollment_end: NaiveDate,
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
}

/// Request body for registering a member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMemberRequest {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// Request body for creating a cycle or a workshop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedEntityRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Request body for creating an offering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOfferingRequest {
    pub workshop_id: WorkshopId,
    pub period_id: PeriodId,
    pub teacher_id: MemberId,
    /// Zero means unlimited seats.
    #[serde(default)]
    pub max_students: u32,
    #[serde(default)]
    pub cycle_ids: Vec<CycleId>,
    #[serde(default)]
    pub block_ids: Vec<TimeBlockId>,
}

/// Request body for creating an enrollment record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEnrollmentRequest {
    pub student_id: MemberId,
    pub cycle_id: CycleId,
    pub date_joined: NaiveDate,
}

/// Request body for replacing or extending a session set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionChangeRequest {
    pub period_id: PeriodId,
    pub offering_ids: Vec<OfferingId>,
    /// Member performing the change; staff bypass quota and the time window.
    pub actor_id: MemberId,
    /// Clock override for the request, defaults to the server clock.
    #[serde(default)]
    pub as_of: Option<NaiveDateTime>,
}

/// Query parameters for the availability projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableQuery {
    pub cycle: CycleId,
}

/// Query parameters for the eligibility endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityQuery {
    pub period: PeriodId,
    #[serde(default)]
    pub as_of: Option<NaiveDateTime>,
}

/// Query parameters for listing offerings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OfferingListQuery {
    #[serde(default)]
    pub period: Option<PeriodId>,
}

/// Offering as exposed on the wire, with the display quota.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferingDto {
    #[serde(flatten)]
    pub offering: Offering,
    /// Remaining seats clamped to zero; absent for unlimited offerings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_quota: Option<i64>,
}

impl OfferingDto {
    pub fn new(offering: Offering, remaining_quota: Option<i64>) -> Self {
        Self {
            offering,
            remaining_quota: remaining_quota.map(|q| q.max(0)),
        }
    }
}

/// One row of the choice-form projection: a time block and the offerings
/// occupying it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSlotDto {
    pub block: TimeBlock,
    pub offerings: Vec<OfferingDto>,
}

/// Response for the availability projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableOfferingsResponse {
    pub period_id: PeriodId,
    pub cycle_id: CycleId,
    pub slots: Vec<ScheduleSlotDto>,
}

/// Response for the eligibility endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityResponse {
    pub period_id: PeriodId,
    pub period_state: PeriodState,
    pub schedule_full: bool,
    pub enabled_to_enroll: bool,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Storage backend status
    pub database: String,
}
