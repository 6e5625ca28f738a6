use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use entity::{employer_profile, job, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use sea_orm::sea_query::{Expr, Func};
use serde::{Deserialize, Serialize};
use tracing::info_span;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    extract::AuthUser,
    geo,
    response::Envelope,
    routes::employers::require_employer_profile,
    state::AppState,
    validate::{paging, require_trimmed, sanitize_optional_filter},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_jobs_handler).post(create_job_handler))
        .route("/nearby", get(nearby_jobs_handler))
        .route(
            "/{id}",
            get(get_job_handler)
                .put(update_job_handler)
                .delete(delete_job_handler),
        )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobNode {
    pub id: Uuid,
    pub employer_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub job_type: String,
    pub status: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub salary_min_cents: Option<i64>,
    pub salary_max_cents: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<job::Model> for JobNode {
    fn from(model: job::Model) -> Self {
        Self {
            id: model.id,
            employer_id: model.employer_id,
            title: model.title,
            description: model.description,
            job_type: job_type_as_str(model.job_type).to_string(),
            status: status_as_str(model.status).to_string(),
            city: model.city,
            state: model.state,
            zip_code: model.zip_code,
            salary_min_cents: model.salary_min_cents,
            salary_max_cents: model.salary_max_cents,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

fn job_type_as_str(value: job::JobType) -> &'static str {
    match value {
        job::JobType::FullTime => "full_time",
        job::JobType::PartTime => "part_time",
        job::JobType::Contract => "contract",
        job::JobType::Temporary => "temporary",
    }
}

fn job_type_from_str(value: &str) -> Option<job::JobType> {
    match value.trim().to_lowercase().as_str() {
        "full_time" => Some(job::JobType::FullTime),
        "part_time" => Some(job::JobType::PartTime),
        "contract" => Some(job::JobType::Contract),
        "temporary" => Some(job::JobType::Temporary),
        _ => None,
    }
}

fn status_as_str(value: job::Status) -> &'static str {
    match value {
        job::Status::Draft => "draft",
        job::Status::Open => "open",
        job::Status::Closed => "closed",
    }
}

fn status_from_str(value: &str) -> Option<job::Status> {
    match value.trim().to_lowercase().as_str() {
        "draft" => Some(job::Status::Draft),
        "open" => Some(job::Status::Open),
        "closed" => Some(job::Status::Closed),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInput {
    pub title: String,
    pub description: Option<String>,
    pub job_type: String,
    pub status: Option<String>,
    pub zip_code: Option<String>,
    pub salary_min_cents: Option<i64>,
    pub salary_max_cents: Option<i64>,
}

struct JobLocation {
    city: Option<String>,
    state: Option<String>,
    zip_code: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

/// A job posts at its own ZIP when one is given, otherwise it inherits
/// the employer's coordinates.
fn resolve_job_location(
    input_zip: Option<&str>,
    employer: &employer_profile::Model,
) -> ApiResult<JobLocation> {
    if let Some(zip) = input_zip.map(str::trim).filter(|z| !z.is_empty()) {
        if !geo::is_valid_zip_format(zip) {
            return Err(ApiError::validation_code(
                "INVALID_ZIP",
                "zipCode must be exactly 5 digits",
            ));
        }
        let record = geo::lookup_zip(zip).ok_or_else(|| {
            ApiError::validation_code("ZIP_NOT_FOUND", format!("unknown ZIP code {zip}"))
        })?;
        return Ok(JobLocation {
            city: Some(record.city.to_string()),
            state: Some(record.state.to_string()),
            zip_code: Some(zip.to_string()),
            latitude: Some(record.latitude),
            longitude: Some(record.longitude),
        });
    }
    Ok(JobLocation {
        city: employer.city.clone(),
        state: employer.state.clone(),
        zip_code: employer.zip_code.clone(),
        latitude: employer.latitude,
        longitude: employer.longitude,
    })
}

fn validate_salary(min: Option<i64>, max: Option<i64>) -> ApiResult<()> {
    if let Some(min) = min {
        if min < 0 {
            return Err(ApiError::validation("salaryMinCents must be non-negative"));
        }
    }
    if let Some(max) = max {
        if max < 0 {
            return Err(ApiError::validation("salaryMaxCents must be non-negative"));
        }
    }
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(ApiError::validation(
                "salaryMinCents cannot exceed salaryMaxCents",
            ));
        }
    }
    Ok(())
}

async fn create_job_handler(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Json(input): Json<JobInput>,
) -> ApiResult<(StatusCode, Json<Envelope<JobNode>>)> {
    let employer = require_employer_profile(&state, &current).await?;
    if !employer.is_approved {
        return Err(ApiError::forbidden(
            "employer account is pending approval",
        ));
    }
    let title = require_trimmed("title", &input.title, 300)?;
    let job_type = job_type_from_str(&input.job_type)
        .ok_or_else(|| ApiError::validation(format!("unknown jobType {}", input.job_type)))?;
    let status = match input.status.as_deref() {
        Some(value) => status_from_str(value)
            .ok_or_else(|| ApiError::validation(format!("unknown status {value}")))?,
        None => job::Status::Open,
    };
    validate_salary(input.salary_min_cents, input.salary_max_cents)?;
    let location = resolve_job_location(input.zip_code.as_deref(), &employer)?;

    let now = Utc::now();
    let record = job::ActiveModel {
        id: Set(Uuid::new_v4()),
        employer_id: Set(employer.id),
        title: Set(title),
        description: Set(input.description.clone()),
        job_type: Set(job_type),
        status: Set(status),
        city: Set(location.city),
        state: Set(location.state),
        zip_code: Set(location.zip_code),
        latitude: Set(location.latitude),
        longitude: Set(location.longitude),
        salary_min_cents: Set(input.salary_min_cents),
        salary_max_cents: Set(input.salary_max_cents),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(state.db.as_ref())
    .await?;

    Ok((StatusCode::CREATED, Envelope::ok("job created", record.into())))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListJobsQuery {
    pub q: Option<String>,
    pub job_type: Option<String>,
    pub status: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListPayload {
    pub jobs: Vec<JobNode>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

async fn list_jobs_handler(
    State(state): State<AppState>,
    Query(query): Query<ListJobsQuery>,
) -> ApiResult<Json<Envelope<JobListPayload>>> {
    let (offset, limit) = paging(query.page, query.limit, 100)?;
    let filter = sanitize_optional_filter(query.q);
    let span = info_span!("jobs.list", has_q = filter.is_some(), limit);
    let _guard = span.enter();

    let mut select = job::Entity::find();
    if let Some(q) = filter {
        let pattern = format!("%{}%", q.to_lowercase());
        let title_expr = Expr::expr(Func::lower(Expr::col(job::Column::Title)));
        select = select.filter(title_expr.like(pattern));
    }
    if let Some(job_type) = query.job_type.as_deref() {
        let parsed = job_type_from_str(job_type)
            .ok_or_else(|| ApiError::validation(format!("unknown jobType {job_type}")))?;
        select = select.filter(job::Column::JobType.eq(parsed));
    }
    // The public listing defaults to open jobs.
    let status = match query.status.as_deref() {
        Some(value) => status_from_str(value)
            .ok_or_else(|| ApiError::validation(format!("unknown status {value}")))?,
        None => job::Status::Open,
    };
    select = select.filter(job::Column::Status.eq(status));

    let total = select.clone().count(state.db.as_ref()).await?;
    let rows = select
        .order_by_desc(job::Column::CreatedAt)
        .offset(offset)
        .limit(limit)
        .all(state.db.as_ref())
        .await?;
    Ok(Envelope::ok(
        "ok",
        JobListPayload {
            jobs: rows.into_iter().map(JobNode::from).collect(),
            total,
            page: offset / limit + 1,
            limit,
        },
    ))
}

async fn get_job_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Envelope<JobNode>>> {
    let record = job::Entity::find_by_id(id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("job"))?;
    Ok(Envelope::ok("ok", record.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub job_type: Option<String>,
    pub status: Option<String>,
    pub zip_code: Option<String>,
    pub salary_min_cents: Option<i64>,
    pub salary_max_cents: Option<i64>,
}

async fn update_job_handler(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateJobRequest>,
) -> ApiResult<Json<Envelope<JobNode>>> {
    let employer = require_employer_profile(&state, &current).await?;
    let record = job::Entity::find_by_id(id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("job"))?;
    if record.employer_id != employer.id {
        return Err(ApiError::forbidden("job belongs to another employer"));
    }

    let min = input.salary_min_cents.or(record.salary_min_cents);
    let max = input.salary_max_cents.or(record.salary_max_cents);
    validate_salary(min, max)?;

    let mut active: job::ActiveModel = record.into();
    if let Some(title) = &input.title {
        active.title = Set(require_trimmed("title", title, 300)?);
    }
    if let Some(description) = &input.description {
        active.description = Set(sanitize_optional_filter(Some(description.clone())));
    }
    if let Some(job_type) = input.job_type.as_deref() {
        let parsed = job_type_from_str(job_type)
            .ok_or_else(|| ApiError::validation(format!("unknown jobType {job_type}")))?;
        active.job_type = Set(parsed);
    }
    if let Some(status) = input.status.as_deref() {
        let parsed = status_from_str(status)
            .ok_or_else(|| ApiError::validation(format!("unknown status {status}")))?;
        active.status = Set(parsed);
    }
    if input.zip_code.is_some() {
        let location = resolve_job_location(input.zip_code.as_deref(), &employer)?;
        active.city = Set(location.city);
        active.state = Set(location.state);
        active.zip_code = Set(location.zip_code);
        active.latitude = Set(location.latitude);
        active.longitude = Set(location.longitude);
    }
    active.salary_min_cents = Set(min);
    active.salary_max_cents = Set(max);
    active.updated_at = Set(Utc::now().into());

    let updated = active.update(state.db.as_ref()).await?;
    Ok(Envelope::ok("job updated", updated.into()))
}

async fn delete_job_handler(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Envelope<()>>> {
    let record = job::Entity::find_by_id(id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("job"))?;
    let allowed = match current.role {
        user::Role::Admin | user::Role::SubAdmin => true,
        user::Role::Employer => {
            let employer = require_employer_profile(&state, &current).await?;
            record.employer_id == employer.id
        }
        user::Role::RecruitmentPartner | user::Role::Candidate => false,
    };
    if !allowed {
        return Err(ApiError::forbidden("cannot delete this job"));
    }
    job::Entity::delete_by_id(id).exec(state.db.as_ref()).await?;
    Ok(Envelope::message("job deleted"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyQuery {
    pub zip_code: String,
    pub radius: Option<f64>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyJobNode {
    #[serde(flatten)]
    pub job: JobNode,
    pub distance: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyPayload {
    pub jobs: Vec<NearbyJobNode>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub radius_miles: f64,
}

async fn nearby_jobs_handler(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> ApiResult<Json<Envelope<NearbyPayload>>> {
    let zip = query.zip_code.trim();
    if !geo::is_valid_zip_format(zip) {
        return Err(ApiError::validation_code(
            "INVALID_ZIP",
            "zipCode must be exactly 5 digits",
        ));
    }
    let origin = geo::lookup_zip(zip).ok_or_else(|| {
        ApiError::validation_code("ZIP_NOT_FOUND", format!("unknown ZIP code {zip}"))
    })?;
    let radius = query.radius.unwrap_or(state.settings.nearby_radius_miles);
    if !(0.1..=500.0).contains(&radius) {
        return Err(ApiError::validation("radius must be between 0.1 and 500"));
    }
    let (offset, limit) = paging(query.page, query.limit, 100)?;
    let span = info_span!("jobs.nearby", zip, radius);
    let _guard = span.enter();

    // Open jobs with known coordinates, bucketed in memory. The job
    // table is the working set of a staffing firm, not a search index.
    let rows = job::Entity::find()
        .filter(job::Column::Status.eq(job::Status::Open))
        .filter(job::Column::Latitude.is_not_null())
        .filter(job::Column::Longitude.is_not_null())
        .all(state.db.as_ref())
        .await?;

    let mut hits: Vec<NearbyJobNode> = rows
        .into_iter()
        .filter_map(|row| {
            let (lat, lon) = (row.latitude?, row.longitude?);
            let miles = geo::haversine_miles(origin.latitude, origin.longitude, lat, lon);
            if miles <= radius {
                Some(NearbyJobNode {
                    job: JobNode::from(row),
                    distance: geo::round_miles(miles),
                })
            } else {
                None
            }
        })
        .collect();
    hits.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let total = hits.len() as u64;
    let page_rows: Vec<NearbyJobNode> = hits
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect();
    Ok(Envelope::ok(
        "ok",
        NearbyPayload {
            jobs: page_rows,
            total,
            page: offset / limit + 1,
            limit,
            radius_miles: radius,
        },
    ))
}
