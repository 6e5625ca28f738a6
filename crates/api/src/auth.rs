use chrono::{Duration, Utc};
use entity::user::Role;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "th_session";

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub session_ttl_minutes: i64,
}

impl AuthConfig {
    pub fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.jwt_secret.as_bytes())
    }

    pub fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.jwt_secret.as_bytes())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub role: String,
    pub exp: usize,
    pub iat: usize,
}

/// Authenticated caller attached to a request after token verification.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub role: Role,
    pub display_name: String,
    pub email: String,
}

pub fn role_as_str(role: Role) -> &'static str {
    match role {
        Role::Employer => "employer",
        Role::RecruitmentPartner => "recruitment_partner",
        Role::Admin => "admin",
        Role::SubAdmin => "sub_admin",
        Role::Candidate => "candidate",
    }
}

pub fn role_from_str(value: &str) -> Option<Role> {
    match value.trim().to_lowercase().as_str() {
        "employer" => Some(Role::Employer),
        "recruitment_partner" => Some(Role::RecruitmentPartner),
        "admin" => Some(Role::Admin),
        "sub_admin" => Some(Role::SubAdmin),
        "candidate" => Some(Role::Candidate),
        _ => None,
    }
}

/// True for roles allowed to administer platform-wide resources.
pub fn is_admin(role: Role) -> bool {
    match role {
        Role::Admin | Role::SubAdmin => true,
        Role::Employer | Role::RecruitmentPartner | Role::Candidate => false,
    }
}

/// True for roles allowed to work the sales client book.
pub fn is_sales_agent(role: Role) -> bool {
    match role {
        Role::RecruitmentPartner | Role::Admin | Role::SubAdmin => true,
        Role::Employer | Role::Candidate => false,
    }
}

pub fn issue_token(
    user_id: Uuid,
    role: Role,
    config: &AuthConfig,
) -> jsonwebtoken::errors::Result<String> {
    let now = Utc::now();
    let exp = now
        .checked_add_signed(Duration::minutes(config.session_ttl_minutes))
        .unwrap_or(now)
        .timestamp() as usize;
    let claims = SessionClaims {
        sub: user_id,
        role: role_as_str(role).to_string(),
        exp,
        iat: now.timestamp() as usize,
    };
    jsonwebtoken::encode(&Header::default(), &claims, &config.encoding_key())
}

pub fn decode_token(
    token: &str,
    config: &AuthConfig,
) -> jsonwebtoken::errors::Result<SessionClaims> {
    jsonwebtoken::decode::<SessionClaims>(token, &config.decoding_key(), &Validation::default())
        .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trip() {
        for role in [
            Role::Employer,
            Role::RecruitmentPartner,
            Role::Admin,
            Role::SubAdmin,
            Role::Candidate,
        ] {
            assert_eq!(role_from_str(role_as_str(role)), Some(role));
        }
        assert_eq!(role_from_str("superuser"), None);
    }

    #[test]
    fn issued_token_decodes() {
        let config = AuthConfig {
            jwt_secret: "test-secret".into(),
            session_ttl_minutes: 60,
        };
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, Role::Candidate, &config).unwrap();
        let claims = decode_token(&token, &config).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, "candidate");
    }
}
