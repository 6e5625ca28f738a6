use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use entity::{employer_profile, notification, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use sea_orm::sea_query::{Expr, Func};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::{is_admin, CurrentUser},
    error::{ApiError, ApiResult},
    extract::AuthUser,
    geo, notify,
    response::Envelope,
    state::AppState,
    validate::{paging, require_trimmed, sanitize_optional_filter},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile_handler).put(update_profile_handler))
        .route("/", get(list_employers_handler))
        .route("/{id}/approve", post(approve_handler))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerNode {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_name: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub address_line1: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

impl From<employer_profile::Model> for EmployerNode {
    fn from(model: employer_profile::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            company_name: model.company_name,
            industry: model.industry,
            website: model.website,
            phone: model.phone,
            address_line1: model.address_line1,
            city: model.city,
            state: model.state,
            zip_code: model.zip_code,
            country: model.country,
            latitude: model.latitude,
            longitude: model.longitude,
            is_approved: model.is_approved,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

/// Loads the employer profile for the current user, rejecting other roles.
pub async fn require_employer_profile(
    state: &AppState,
    current: &CurrentUser,
) -> ApiResult<employer_profile::Model> {
    match current.role {
        user::Role::Employer => {}
        user::Role::Admin
        | user::Role::SubAdmin
        | user::Role::RecruitmentPartner
        | user::Role::Candidate => {
            return Err(ApiError::forbidden("employer account required"));
        }
    }
    employer_profile::Entity::find()
        .filter(employer_profile::Column::UserId.eq(current.user_id))
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("employer profile"))
}

async fn get_profile_handler(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
) -> ApiResult<Json<Envelope<EmployerNode>>> {
    let profile = require_employer_profile(&state, &current).await?;
    Ok(Envelope::ok("ok", profile.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub address_line1: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

async fn update_profile_handler(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Json(input): Json<UpdateProfileRequest>,
) -> ApiResult<Json<Envelope<EmployerNode>>> {
    let profile = require_employer_profile(&state, &current).await?;
    let mut active: employer_profile::ActiveModel = profile.into();

    if let Some(company_name) = &input.company_name {
        active.company_name = Set(require_trimmed("companyName", company_name, 256)?);
    }
    if let Some(industry) = &input.industry {
        active.industry = Set(sanitize_optional_filter(Some(industry.clone())));
    }
    if let Some(website) = &input.website {
        active.website = Set(sanitize_optional_filter(Some(website.clone())));
    }
    if let Some(phone) = &input.phone {
        active.phone = Set(sanitize_optional_filter(Some(phone.clone())));
    }
    if let Some(address) = &input.address_line1 {
        active.address_line1 = Set(sanitize_optional_filter(Some(address.clone())));
    }
    if let Some(country) = &input.country {
        if !geo::is_us_country(country) {
            return Err(ApiError::validation_code(
                "COUNTRY_NOT_SUPPORTED",
                "only US-based employers are supported",
            ));
        }
    }
    // Address change re-derives coordinates from the new ZIP.
    if let Some(zip) = input.zip_code.as_deref().map(str::trim) {
        if !geo::is_valid_zip_format(zip) {
            return Err(ApiError::validation_code(
                "INVALID_ZIP",
                "zipCode must be exactly 5 digits",
            ));
        }
        let record = geo::lookup_zip(zip).ok_or_else(|| {
            ApiError::validation_code("ZIP_NOT_FOUND", format!("unknown ZIP code {zip}"))
        })?;
        active.zip_code = Set(Some(zip.to_string()));
        active.city = Set(Some(record.city.to_string()));
        active.state = Set(Some(record.state.to_string()));
        active.latitude = Set(Some(record.latitude));
        active.longitude = Set(Some(record.longitude));
    }
    active.updated_at = Set(Utc::now().into());

    let updated = active.update(state.db.as_ref()).await?;
    Ok(Envelope::ok("profile updated", updated.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEmployersQuery {
    pub q: Option<String>,
    pub approved: Option<bool>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerListPayload {
    pub employers: Vec<EmployerNode>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

async fn list_employers_handler(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Query(query): Query<ListEmployersQuery>,
) -> ApiResult<Json<Envelope<EmployerListPayload>>> {
    if !is_admin(current.role) {
        return Err(ApiError::forbidden("admin account required"));
    }
    let (offset, limit) = paging(query.page, query.limit, 100)?;
    let mut select = employer_profile::Entity::find();
    if let Some(filter) = sanitize_optional_filter(query.q) {
        let pattern = format!("%{}%", filter.to_lowercase());
        let name_expr = Expr::expr(Func::lower(Expr::col(
            employer_profile::Column::CompanyName,
        )));
        select = select.filter(name_expr.like(pattern));
    }
    if let Some(approved) = query.approved {
        select = select.filter(employer_profile::Column::IsApproved.eq(approved));
    }
    let total = select.clone().count(state.db.as_ref()).await?;
    let rows = select
        .order_by_asc(employer_profile::Column::CompanyName)
        .offset(offset)
        .limit(limit)
        .all(state.db.as_ref())
        .await?;
    Ok(Envelope::ok(
        "ok",
        EmployerListPayload {
            employers: rows.into_iter().map(EmployerNode::from).collect(),
            total,
            page: offset / limit + 1,
            limit,
        },
    ))
}

async fn approve_handler(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Envelope<EmployerNode>>> {
    if !is_admin(current.role) {
        return Err(ApiError::forbidden("admin account required"));
    }
    let profile = employer_profile::Entity::find_by_id(id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("employer profile"))?;
    if profile.is_approved {
        return Ok(Envelope::ok("already approved", profile.into()));
    }
    let owner_id = profile.user_id;
    let company = profile.company_name.clone();
    let mut active: employer_profile::ActiveModel = profile.into();
    active.is_approved = Set(true);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(state.db.as_ref()).await?;

    notify::push(
        state.db.as_ref(),
        owner_id,
        notification::Kind::System,
        "Account approved",
        &format!("{company} has been approved and can now post jobs."),
    )
    .await?;

    Ok(Envelope::ok("employer approved", updated.into()))
}
