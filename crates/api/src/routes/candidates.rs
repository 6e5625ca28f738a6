use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use entity::{application, employer_profile, job, notification, saved_job, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    extract::AuthUser,
    notify,
    response::Envelope,
    routes::jobs::JobNode,
    state::AppState,
    validate::paging,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/applications", get(list_applications_handler))
        .route("/jobs/{id}/apply", post(apply_handler))
        .route(
            "/saved-jobs",
            get(list_saved_jobs_handler),
        )
        .route(
            "/saved-jobs/{id}",
            post(save_job_handler).delete(unsave_job_handler),
        )
}

fn require_candidate(current: &crate::auth::CurrentUser) -> ApiResult<()> {
    match current.role {
        user::Role::Candidate => Ok(()),
        user::Role::Employer
        | user::Role::RecruitmentPartner
        | user::Role::Admin
        | user::Role::SubAdmin => Err(ApiError::forbidden("candidate account required")),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationNode {
    pub id: Uuid,
    pub job_id: Uuid,
    pub status: String,
    pub resume_path: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<JobNode>,
}

fn status_as_str(value: application::Status) -> &'static str {
    match value {
        application::Status::Submitted => "submitted",
        application::Status::Reviewed => "reviewed",
        application::Status::Rejected => "rejected",
        application::Status::Hired => "hired",
    }
}

impl ApplicationNode {
    fn new(model: application::Model, job: Option<job::Model>) -> Self {
        Self {
            id: model.id,
            job_id: model.job_id,
            status: status_as_str(model.status).to_string(),
            resume_path: model.resume_path,
            note: model.note,
            created_at: model.created_at.with_timezone(&Utc),
            job: job.map(JobNode::from),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub resume_path: Option<String>,
    pub note: Option<String>,
}

async fn apply_handler(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Path(job_id): Path<Uuid>,
    Json(input): Json<ApplyRequest>,
) -> ApiResult<(StatusCode, Json<Envelope<ApplicationNode>>)> {
    require_candidate(&current)?;
    let target = job::Entity::find_by_id(job_id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("job"))?;
    if target.status != job::Status::Open {
        return Err(ApiError::validation_code(
            "JOB_NOT_OPEN",
            "job is not accepting applications",
        ));
    }

    let existing = application::Entity::find()
        .filter(application::Column::JobId.eq(job_id))
        .filter(application::Column::CandidateId.eq(current.user_id))
        .one(state.db.as_ref())
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict(
            "ALREADY_APPLIED",
            "you have already applied to this job",
        ));
    }

    let now = Utc::now();
    let record = application::ActiveModel {
        id: Set(Uuid::new_v4()),
        job_id: Set(job_id),
        candidate_id: Set(current.user_id),
        status: Set(application::Status::Submitted),
        resume_path: Set(input.resume_path.clone()),
        note: Set(input.note.clone()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(state.db.as_ref())
    .await?;

    // The application stands even if the employer ping cannot be written.
    if let Some(employer) = employer_profile::Entity::find_by_id(target.employer_id)
        .one(state.db.as_ref())
        .await?
    {
        let title = format!("New application for {}", target.title);
        let body = format!("{} applied to {}", current.display_name, target.title);
        if let Err(err) = notify::push(
            state.db.as_ref(),
            employer.user_id,
            notification::Kind::Application,
            &title,
            &body,
        )
        .await
        {
            warn!(error = %err, job_id = %job_id, "failed to notify employer of application");
        }
    }

    Ok((
        StatusCode::CREATED,
        Envelope::ok("application submitted", ApplicationNode::new(record, Some(target))),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationListPayload {
    pub applications: Vec<ApplicationNode>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

async fn list_applications_handler(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Envelope<ApplicationListPayload>>> {
    require_candidate(&current)?;
    let (offset, limit) = paging(query.page, query.limit, 100)?;
    let select = application::Entity::find()
        .filter(application::Column::CandidateId.eq(current.user_id));
    let total = select.clone().count(state.db.as_ref()).await?;
    let rows = select
        .find_also_related(job::Entity)
        .order_by_desc(application::Column::CreatedAt)
        .offset(offset)
        .limit(limit)
        .all(state.db.as_ref())
        .await?;
    Ok(Envelope::ok(
        "ok",
        ApplicationListPayload {
            applications: rows
                .into_iter()
                .map(|(model, job)| ApplicationNode::new(model, job))
                .collect(),
            total,
            page: offset / limit + 1,
            limit,
        },
    ))
}

async fn save_job_handler(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Path(job_id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<Envelope<()>>)> {
    require_candidate(&current)?;
    job::Entity::find_by_id(job_id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("job"))?;
    let existing = saved_job::Entity::find_by_id((job_id, current.user_id))
        .one(state.db.as_ref())
        .await?;
    if existing.is_some() {
        // Saving twice is a no-op, not an error.
        return Ok((StatusCode::OK, Envelope::message("job already saved")));
    }
    saved_job::ActiveModel {
        job_id: Set(job_id),
        candidate_id: Set(current.user_id),
        created_at: Set(Utc::now().into()),
    }
    .insert(state.db.as_ref())
    .await?;
    Ok((StatusCode::CREATED, Envelope::message("job saved")))
}

async fn unsave_job_handler(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Path(job_id): Path<Uuid>,
) -> ApiResult<Json<Envelope<()>>> {
    require_candidate(&current)?;
    let record = saved_job::Entity::find_by_id((job_id, current.user_id))
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("saved job"))?;
    record.delete(state.db.as_ref()).await?;
    Ok(Envelope::message("job unsaved"))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedJobListPayload {
    pub jobs: Vec<JobNode>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

async fn list_saved_jobs_handler(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Envelope<SavedJobListPayload>>> {
    require_candidate(&current)?;
    let (offset, limit) = paging(query.page, query.limit, 100)?;
    let select = saved_job::Entity::find()
        .filter(saved_job::Column::CandidateId.eq(current.user_id));
    let total = select.clone().count(state.db.as_ref()).await?;
    let rows = select
        .find_also_related(job::Entity)
        .order_by_desc(saved_job::Column::CreatedAt)
        .offset(offset)
        .limit(limit)
        .all(state.db.as_ref())
        .await?;
    Ok(Envelope::ok(
        "ok",
        SavedJobListPayload {
            jobs: rows
                .into_iter()
                .filter_map(|(_, job)| job.map(JobNode::from))
                .collect(),
            total,
            page: offset / limit + 1,
            limit,
        },
    ))
}
