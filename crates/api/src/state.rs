use std::{path::PathBuf, sync::Arc};

use sea_orm::DatabaseConnection;

use crate::auth::AuthConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub auth: Arc<AuthConfig>,
    pub settings: Arc<ApiSettings>,
}

/// Tunables that do not belong in the auth config.
#[derive(Clone, Debug)]
pub struct ApiSettings {
    pub upload_dir: PathBuf,
    pub nearby_radius_miles: f64,
    pub invite_ttl_days: i64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            nearby_radius_miles: 25.0,
            invite_ttl_days: 14,
        }
    }
}
