use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use entity::{
    availability_slot, employer_profile, interview_booking, interview_invite, job, notification,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    Statement, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    extract::AuthUser,
    notify,
    response::Envelope,
    routes::employers::require_employer_profile,
    state::AppState,
    validate::{format_hhmm, normalize_email, parse_hhmm, require_trimmed},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/availability",
            put(set_availability_handler).get(get_availability_handler),
        )
        .route("/invites", post(create_invite_handler))
        .route("/slots", get(list_slots_handler))
        .route("/book", post(book_slot_handler))
}

const DEFAULT_TIMEZONE: &str = "America/New_York";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotNode {
    pub id: Uuid,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub timezone: String,
    pub max_candidates: i32,
    pub booked_count: i32,
    pub remaining: i32,
    pub is_available: bool,
}

impl From<availability_slot::Model> for SlotNode {
    fn from(model: availability_slot::Model) -> Self {
        Self {
            id: model.id,
            date: model.slot_date,
            start_time: format_hhmm(model.start_minute),
            end_time: format_hhmm(model.end_minute),
            timezone: model.timezone,
            max_candidates: model.max_candidates,
            remaining: (model.max_candidates - model.booked_count).max(0),
            booked_count: model.booked_count,
            is_available: model.is_available,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotInput {
    pub date: NaiveDate,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub timezone: Option<String>,
    pub max_candidates: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAvailabilityRequest {
    pub slots: Vec<SlotInput>,
}

struct ParsedSlot {
    date: NaiveDate,
    start_minute: i32,
    end_minute: i32,
    timezone: String,
    max_candidates: i32,
}

fn parse_slot(input: &SlotInput) -> ApiResult<ParsedSlot> {
    let start = input
        .start_time
        .as_deref()
        .ok_or_else(|| ApiError::validation("slot is missing startTime"))?;
    let end = input
        .end_time
        .as_deref()
        .ok_or_else(|| ApiError::validation("slot is missing endTime"))?;
    let start_minute = parse_hhmm("startTime", start)?;
    let end_minute = parse_hhmm("endTime", end)?;
    if start_minute >= end_minute {
        return Err(ApiError::validation("slot startTime must be before endTime"));
    }
    let max_candidates = input.max_candidates.unwrap_or(1);
    if !(1..=100).contains(&max_candidates) {
        return Err(ApiError::validation(
            "maxCandidates must be between 1 and 100",
        ));
    }
    Ok(ParsedSlot {
        date: input.date,
        start_minute,
        end_minute,
        timezone: input
            .timezone
            .clone()
            .filter(|tz| !tz.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
        max_candidates,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityPayload {
    pub slots: Vec<SlotNode>,
}

/// Replaces the employer's slot list. Slots that already carry bookings
/// survive the replacement so a candidate's reservation cannot vanish
/// out from under them.
async fn set_availability_handler(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Json(input): Json<SetAvailabilityRequest>,
) -> ApiResult<Json<Envelope<AvailabilityPayload>>> {
    let employer = require_employer_profile(&state, &current).await?;
    let parsed: Vec<ParsedSlot> = input
        .slots
        .iter()
        .map(parse_slot)
        .collect::<ApiResult<_>>()?;

    let txn = state.db.as_ref().begin().await?;
    availability_slot::Entity::delete_many()
        .filter(availability_slot::Column::EmployerId.eq(employer.id))
        .filter(availability_slot::Column::BookedCount.eq(0))
        .exec(&txn)
        .await?;
    let now = Utc::now();
    for slot in &parsed {
        availability_slot::ActiveModel {
            id: Set(Uuid::new_v4()),
            employer_id: Set(employer.id),
            slot_date: Set(slot.date),
            start_minute: Set(slot.start_minute),
            end_minute: Set(slot.end_minute),
            timezone: Set(slot.timezone.clone()),
            max_candidates: Set(slot.max_candidates),
            booked_count: Set(0),
            is_available: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;
    }
    txn.commit().await?;
    info!(employer_id = %employer.id, count = parsed.len(), "availability replaced");

    let rows = load_employer_slots(&state, employer.id).await?;
    Ok(Envelope::ok(
        "availability updated",
        AvailabilityPayload {
            slots: rows.into_iter().map(SlotNode::from).collect(),
        },
    ))
}

async fn load_employer_slots(
    state: &AppState,
    employer_id: Uuid,
) -> Result<Vec<availability_slot::Model>, sea_orm::DbErr> {
    availability_slot::Entity::find()
        .filter(availability_slot::Column::EmployerId.eq(employer_id))
        .order_by_asc(availability_slot::Column::SlotDate)
        .order_by_asc(availability_slot::Column::StartMinute)
        .all(state.db.as_ref())
        .await
}

async fn get_availability_handler(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
) -> ApiResult<Json<Envelope<AvailabilityPayload>>> {
    let employer = require_employer_profile(&state, &current).await?;
    let rows = load_employer_slots(&state, employer.id).await?;
    Ok(Envelope::ok(
        "ok",
        AvailabilityPayload {
            slots: rows.into_iter().map(SlotNode::from).collect(),
        },
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInviteRequest {
    pub job_id: Uuid,
    pub candidate_name: String,
    pub candidate_email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteNode {
    pub id: Uuid,
    pub token: String,
    pub job_id: Uuid,
    pub candidate_name: String,
    pub candidate_email: String,
    pub expires_at: DateTime<Utc>,
}

impl From<interview_invite::Model> for InviteNode {
    fn from(model: interview_invite::Model) -> Self {
        Self {
            id: model.id,
            token: model.token,
            job_id: model.job_id,
            candidate_name: model.candidate_name,
            candidate_email: model.candidate_email,
            expires_at: model.expires_at.with_timezone(&Utc),
        }
    }
}

async fn create_invite_handler(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Json(input): Json<CreateInviteRequest>,
) -> ApiResult<(StatusCode, Json<Envelope<InviteNode>>)> {
    let employer = require_employer_profile(&state, &current).await?;
    let target = job::Entity::find_by_id(input.job_id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("job"))?;
    if target.employer_id != employer.id {
        return Err(ApiError::forbidden("job belongs to another employer"));
    }
    let candidate_name = require_trimmed("candidateName", &input.candidate_name, 200)?;
    let candidate_email = normalize_email(&input.candidate_email)?;

    let now = Utc::now();
    let expires_at = now + chrono::Duration::days(state.settings.invite_ttl_days);
    let record = interview_invite::ActiveModel {
        id: Set(Uuid::new_v4()),
        token: Set(Uuid::new_v4().simple().to_string()),
        job_id: Set(target.id),
        candidate_name: Set(candidate_name),
        candidate_email: Set(candidate_email),
        expires_at: Set(expires_at.into()),
        used_at: Set(None),
        created_at: Set(now.into()),
    }
    .insert(state.db.as_ref())
    .await?;
    Ok((
        StatusCode::CREATED,
        Envelope::ok("invite created", record.into()),
    ))
}

/// Resolves a token to a live invite, or `INVALID_TOKEN`.
async fn resolve_invite(
    state: &AppState,
    token: &str,
    now: DateTime<Utc>,
) -> ApiResult<interview_invite::Model> {
    let invite = interview_invite::Entity::find()
        .filter(interview_invite::Column::Token.eq(token))
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| invalid_token())?;
    if invite.used_at.is_some() || invite.expires_at.with_timezone(&Utc) <= now {
        return Err(invalid_token());
    }
    Ok(invite)
}

fn invalid_token() -> ApiError {
    ApiError::unauthorized_code("INVALID_TOKEN", "invite token is unknown, expired, or used")
}

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotListPayload {
    pub job_title: String,
    pub company_name: String,
    pub slots: Vec<SlotNode>,
}

async fn list_slots_handler(
    State(state): State<AppState>,
    Query(query): Query<SlotsQuery>,
) -> ApiResult<Json<Envelope<SlotListPayload>>> {
    let now = Utc::now();
    let invite = resolve_invite(&state, query.token.trim(), now).await?;
    let target = job::Entity::find_by_id(invite.job_id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("job"))?;
    let employer = employer_profile::Entity::find_by_id(target.employer_id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("employer"))?;

    let today = now.date_naive();
    let rows = availability_slot::Entity::find()
        .filter(availability_slot::Column::EmployerId.eq(employer.id))
        .filter(availability_slot::Column::IsAvailable.eq(true))
        .filter(availability_slot::Column::SlotDate.gte(today))
        .order_by_asc(availability_slot::Column::SlotDate)
        .order_by_asc(availability_slot::Column::StartMinute)
        .all(state.db.as_ref())
        .await?;
    let open: Vec<SlotNode> = rows
        .into_iter()
        .filter(|slot| slot.booked_count < slot.max_candidates)
        .map(SlotNode::from)
        .collect();
    Ok(Envelope::ok(
        "ok",
        SlotListPayload {
            job_title: target.title,
            company_name: employer.company_name,
            slots: open,
        },
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    pub token: String,
    pub slot_id: Uuid,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingNode {
    pub id: Uuid,
    pub slot: SlotNode,
    pub candidate_name: String,
    pub candidate_email: String,
    pub created_at: DateTime<Utc>,
}

/// Claims one seat on the slot, or reports why it cannot. The guard is a
/// single conditional UPDATE, so two concurrent bookings against the last
/// seat cannot both succeed.
async fn claim_seat<C: ConnectionTrait>(
    conn: &C,
    slot_id: Uuid,
    now: DateTime<Utc>,
) -> Result<u64, sea_orm::DbErr> {
    let backend = conn.get_database_backend();
    let sql = match backend {
        sea_orm::DatabaseBackend::Postgres => {
            "UPDATE availability_slot \
             SET booked_count = booked_count + 1, updated_at = $1 \
             WHERE id = $2 AND is_available = TRUE \
               AND booked_count < max_candidates"
        }
        _ => {
            "UPDATE availability_slot \
             SET booked_count = booked_count + 1, updated_at = ? \
             WHERE id = ? AND is_available = TRUE \
               AND booked_count < max_candidates"
        }
    };
    let result = conn
        .execute(Statement::from_sql_and_values(
            backend,
            sql,
            [now.into(), slot_id.into()],
        ))
        .await?;
    Ok(result.rows_affected())
}

async fn book_slot_handler(
    State(state): State<AppState>,
    Json(input): Json<BookRequest>,
) -> ApiResult<(StatusCode, Json<Envelope<BookingNode>>)> {
    let now = Utc::now();
    let invite = resolve_invite(&state, input.token.trim(), now).await?;
    let slot = availability_slot::Entity::find_by_id(input.slot_id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("slot"))?;
    let target = job::Entity::find_by_id(invite.job_id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("job"))?;
    if slot.employer_id != target.employer_id {
        return Err(ApiError::not_found("slot"));
    }
    if slot.slot_date < now.date_naive() {
        return Err(ApiError::validation_code(
            "SLOT_IN_PAST",
            "slot date has already passed",
        ));
    }

    // One candidate cannot hold two bookings over the same window.
    let existing = interview_booking::Entity::find()
        .filter(interview_booking::Column::CandidateEmail.eq(invite.candidate_email.clone()))
        .find_also_related(availability_slot::Entity)
        .all(state.db.as_ref())
        .await?;
    for (_, held) in &existing {
        if let Some(held) = held {
            if held.slot_date == slot.slot_date
                && held.start_minute < slot.end_minute
                && slot.start_minute < held.end_minute
            {
                return Err(ApiError::conflict(
                    "OVERLAPPING_BOOKING",
                    "candidate already has a booking overlapping this window",
                ));
            }
        }
    }

    let txn = state.db.as_ref().begin().await?;
    let claimed = claim_seat(&txn, slot.id, now).await?;
    if claimed == 0 {
        txn.rollback().await?;
        return Err(ApiError::conflict("SLOT_FULL", "slot is fully booked"));
    }
    let booking = interview_booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        slot_id: Set(slot.id),
        invite_id: Set(invite.id),
        candidate_name: Set(invite.candidate_name.clone()),
        candidate_email: Set(invite.candidate_email.clone()),
        notes: Set(input.notes.clone()),
        created_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;
    let mut used: interview_invite::ActiveModel = invite.clone().into();
    used.used_at = Set(Some(now.into()));
    used.update(&txn).await?;
    txn.commit().await?;
    info!(slot_id = %slot.id, booking_id = %booking.id, "interview booked");

    let fresh = availability_slot::Entity::find_by_id(slot.id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("slot"))?;

    if let Some(employer) = employer_profile::Entity::find_by_id(slot.employer_id)
        .one(state.db.as_ref())
        .await?
    {
        let title = format!("Interview booked for {}", target.title);
        let body = format!(
            "{} booked {} {}-{}",
            invite.candidate_name,
            slot.slot_date,
            format_hhmm(slot.start_minute),
            format_hhmm(slot.end_minute),
        );
        if let Err(err) = notify::push(
            state.db.as_ref(),
            employer.user_id,
            notification::Kind::Interview,
            &title,
            &body,
        )
        .await
        {
            warn!(error = %err, slot_id = %slot.id, "failed to notify employer of booking");
        }
    }

    Ok((
        StatusCode::CREATED,
        Envelope::ok(
            "interview booked",
            BookingNode {
                id: booking.id,
                slot: fresh.into(),
                candidate_name: booking.candidate_name,
                candidate_email: booking.candidate_email,
                created_at: booking.created_at.with_timezone(&Utc),
            },
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot_input(start: Option<&str>, end: Option<&str>) -> SlotInput {
        SlotInput {
            date: NaiveDate::from_ymd_opt(2026, 9, 15).unwrap(),
            start_time: start.map(str::to_string),
            end_time: end.map(str::to_string),
            timezone: None,
            max_candidates: Some(2),
        }
    }

    #[test]
    fn slot_requires_both_times() {
        assert!(parse_slot(&slot_input(None, Some("10:00"))).is_err());
        assert!(parse_slot(&slot_input(Some("09:00"), None)).is_err());
        let parsed = parse_slot(&slot_input(Some("09:00"), Some("10:30"))).unwrap();
        assert_eq!(parsed.start_minute, 540);
        assert_eq!(parsed.end_minute, 630);
        assert_eq!(parsed.timezone, DEFAULT_TIMEZONE);
    }

    #[test]
    fn slot_rejects_inverted_window() {
        assert!(parse_slot(&slot_input(Some("11:00"), Some("10:00"))).is_err());
        assert!(parse_slot(&slot_input(Some("10:00"), Some("10:00"))).is_err());
    }
}
