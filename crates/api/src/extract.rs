use axum::{extract::FromRequestParts, http::request::Parts};
use entity::user;
use sea_orm::EntityTrait;

use crate::{
    auth::{decode_token, CurrentUser, SESSION_COOKIE},
    error::ApiError,
    state::AppState,
};

/// Extractor that verifies the bearer token (or session cookie) and
/// loads the active user behind it.
pub struct AuthUser(pub CurrentUser);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts)
            .ok_or_else(|| ApiError::unauthorized("authentication required"))?;
        let claims = decode_token(&token, &state.auth)
            .map_err(|_| ApiError::unauthorized("invalid or expired session"))?;
        let record = user::Entity::find_by_id(claims.sub)
            .one(state.db.as_ref())
            .await?
            .ok_or_else(|| ApiError::unauthorized("user no longer exists"))?;
        if !record.is_active {
            return Err(ApiError::forbidden("account disabled"));
        }
        Ok(AuthUser(CurrentUser {
            user_id: record.id,
            role: record.role,
            display_name: record.display_name,
            email: record.email,
        }))
    }
}

fn extract_token(parts: &Parts) -> Option<String> {
    if let Some(value) = parts.headers.get(axum::http::header::AUTHORIZATION) {
        if let Ok(text) = value.to_str() {
            if let Some(rest) = text.strip_prefix("Bearer ") {
                return Some(rest.trim().to_string());
            }
        }
    }
    if let Some(cookie) = parts.headers.get(axum::http::header::COOKIE) {
        if let Ok(text) = cookie.to_str() {
            for part in text.split(';') {
                let trimmed = part.trim();
                if let Some(rest) = trimmed.strip_prefix(SESSION_COOKIE) {
                    if let Some(value) = rest.strip_prefix('=') {
                        return Some(value.trim().to_string());
                    }
                }
            }
        }
    }
    None
}
