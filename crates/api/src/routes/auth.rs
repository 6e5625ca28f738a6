use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use entity::{employer_profile, user, user_secret};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::{is_admin, issue_token, role_as_str, role_from_str, CurrentUser},
    error::{ApiError, ApiResult},
    extract::AuthUser,
    geo,
    response::Envelope,
    state::AppState,
    validate::{normalize_email, require_trimmed, validate_length},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/me", get(me_handler))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub role: String,
    pub phone: Option<String>,
    // Employer-only fields.
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub address_line1: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    #[serde(default)]
    pub location_detected: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserNode {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub role: &'static str,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserNode {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            display_name: model.display_name,
            phone: model.phone,
            role: role_as_str(model.role),
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub token: String,
    pub user: UserNode,
}

/// Resolved coordinates for an employer address, either from the ZIP
/// centroid table or from client-detected coordinates.
struct ResolvedLocation {
    latitude: f64,
    longitude: f64,
    city: Option<String>,
    state: Option<String>,
}

fn resolve_employer_location(input: &RegisterRequest) -> ApiResult<ResolvedLocation> {
    let country = input
        .country
        .as_deref()
        .ok_or_else(|| ApiError::validation("country is required"))?;
    if !geo::is_us_country(country) {
        return Err(ApiError::validation_code(
            "COUNTRY_NOT_SUPPORTED",
            "only US-based employers are supported",
        ));
    }

    if let Some(zip) = input.zip_code.as_deref().map(str::trim).filter(|z| !z.is_empty()) {
        if !geo::is_valid_zip_format(zip) {
            return Err(ApiError::validation_code(
                "INVALID_ZIP",
                "zipCode must be exactly 5 digits",
            ));
        }
        let record = geo::lookup_zip(zip).ok_or_else(|| {
            ApiError::validation_code("ZIP_NOT_FOUND", format!("unknown ZIP code {zip}"))
        })?;
        return Ok(ResolvedLocation {
            latitude: record.latitude,
            longitude: record.longitude,
            city: Some(record.city.to_string()),
            state: Some(record.state.to_string()),
        });
    }

    if input.location_detected {
        let (latitude, longitude) = match (input.latitude, input.longitude) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => {
                return Err(ApiError::validation(
                    "latitude and longitude are required when location is detected",
                ))
            }
        };
        if !geo::within_us_bounds(latitude, longitude) {
            return Err(ApiError::validation_code(
                "COORDINATES_OUT_OF_RANGE",
                "detected coordinates are outside the US",
            ));
        }
        return Ok(ResolvedLocation {
            latitude,
            longitude,
            city: input.city.clone(),
            state: input.state.clone(),
        });
    }

    Err(ApiError::validation_code(
        "ZIP_REQUIRED",
        "zipCode is required when location is not detected",
    ))
}

async fn register_handler(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<Envelope<AuthPayload>>)> {
    let email = normalize_email(&input.email)?;
    let display_name = require_trimmed("displayName", &input.display_name, 128)?;
    if input.password.chars().count() < 8 {
        return Err(ApiError::validation("password must be at least 8 characters"));
    }
    let role = role_from_str(&input.role)
        .ok_or_else(|| ApiError::validation(format!("unknown role {}", input.role)))?;
    if is_admin(role) {
        return Err(ApiError::forbidden("admin accounts cannot self-register"));
    }

    // Employer location rules are enforced before any row is written.
    let employer_fields = match role {
        user::Role::Employer => {
            let company_name = require_trimmed(
                "companyName",
                input.company_name.as_deref().unwrap_or(""),
                256,
            )?;
            let location = resolve_employer_location(&input)?;
            Some((company_name, location))
        }
        user::Role::RecruitmentPartner | user::Role::Candidate => None,
        user::Role::Admin | user::Role::SubAdmin => unreachable!("rejected above"),
    };

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(email.clone()))
        .one(state.db.as_ref())
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict(
            "EMAIL_TAKEN",
            "an account with this email already exists",
        ));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(input.password.as_bytes(), &salt)
        .map_err(|err| ApiError::Internal(anyhow::anyhow!("password hashing failed: {err}")))?
        .to_string();

    let now = Utc::now();
    let user_id = Uuid::new_v4();
    let txn = state.db.begin().await?;
    let record = user::ActiveModel {
        id: Set(user_id),
        email: Set(email),
        display_name: Set(display_name),
        phone: Set(input.phone.clone()),
        role: Set(role),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;
    user_secret::ActiveModel {
        user_id: Set(user_id),
        password_hash: Set(password_hash),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    if let Some((company_name, location)) = employer_fields {
        if let Some(website) = input.website.as_deref() {
            validate_length("website", website, 512)?;
        }
        employer_profile::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            company_name: Set(company_name),
            industry: Set(input.industry.clone()),
            website: Set(input.website.clone()),
            phone: Set(input.phone.clone()),
            address_line1: Set(input.address_line1.clone()),
            city: Set(location.city),
            state: Set(location.state),
            zip_code: Set(input.zip_code.as_deref().map(|z| z.trim().to_string())),
            country: Set("US".to_string()),
            latitude: Set(Some(location.latitude)),
            longitude: Set(Some(location.longitude)),
            is_approved: Set(false),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;
    }
    txn.commit().await?;

    let token = issue_token(user_id, role, &state.auth)
        .map_err(|err| ApiError::Internal(anyhow::anyhow!("token issue failed: {err}")))?;
    tracing::info!(%user_id, role = role_as_str(role), "user registered");
    Ok((
        StatusCode::CREATED,
        Envelope::ok(
            "registration successful",
            AuthPayload {
                token,
                user: record.into(),
            },
        ),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

async fn login_handler(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> ApiResult<Json<Envelope<AuthPayload>>> {
    let email = normalize_email(&input.email)?;
    let invalid = || ApiError::unauthorized("invalid credentials");

    let record = user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(state.db.as_ref())
        .await?
        .ok_or_else(invalid)?;
    if !record.is_active {
        return Err(ApiError::forbidden("account disabled"));
    }
    let secret = user_secret::Entity::find_by_id(record.id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(invalid)?;
    let parsed_hash = PasswordHash::new(&secret.password_hash)
        .map_err(|_| ApiError::Internal(anyhow::anyhow!("stored password hash is invalid")))?;
    if Argon2::default()
        .verify_password(input.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(invalid());
    }

    let token = issue_token(record.id, record.role, &state.auth)
        .map_err(|err| ApiError::Internal(anyhow::anyhow!("token issue failed: {err}")))?;
    Ok(Envelope::ok(
        "login successful",
        AuthPayload {
            token,
            user: record.into(),
        },
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MePayload {
    pub user: MeNode,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeNode {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: &'static str,
}

async fn me_handler(AuthUser(current): AuthUser) -> ApiResult<Json<Envelope<MePayload>>> {
    let CurrentUser {
        user_id,
        role,
        display_name,
        email,
    } = current;
    Ok(Envelope::ok(
        "ok",
        MePayload {
            user: MeNode {
                id: user_id,
                email,
                display_name,
                role: role_as_str(role),
            },
        },
    ))
}
