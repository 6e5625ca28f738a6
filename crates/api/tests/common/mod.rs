#![allow(dead_code)]

use std::sync::Arc;

use api::{
    auth::{issue_token, AuthConfig},
    build_router, ApiSettings, AppState,
};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use sea_orm::{
    ColumnTrait, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, EntityTrait,
    QueryFilter, Statement,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;
use uuid::Uuid;

pub struct TestApp {
    pub router: Router,
    pub db: Arc<DatabaseConnection>,
    pub auth: Arc<AuthConfig>,
}

pub async fn setup() -> TestApp {
    let conn = Database::connect("sqlite::memory:").await.unwrap();
    let db = Arc::new(conn);
    bootstrap_sqlite(db.as_ref()).await;
    let auth = Arc::new(AuthConfig {
        jwt_secret: "test-secret".into(),
        session_ttl_minutes: 60,
    });
    let settings = Arc::new(ApiSettings {
        upload_dir: std::env::temp_dir().join(format!("talenthub-test-{}", Uuid::new_v4())),
        ..ApiSettings::default()
    });
    let state = AppState {
        db: db.clone(),
        auth: auth.clone(),
        settings,
    };
    TestApp {
        router: build_router(state),
        db,
        auth,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("GET", path, token, None).await
    }

    pub async fn post(
        &self,
        path: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        self.request("POST", path, token, Some(body)).await
    }

    /// Registers through the public endpoint and returns (user_id, token).
    pub async fn register(&self, body: Value) -> (Uuid, String) {
        let (status, payload) = self.post("/api/auth/register", None, body).await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {payload}");
        let token = payload["data"]["token"].as_str().unwrap().to_string();
        let user_id = payload["data"]["user"]["id"]
            .as_str()
            .unwrap()
            .parse()
            .unwrap();
        (user_id, token)
    }

    pub async fn register_candidate(&self, email: &str) -> (Uuid, String) {
        self.register(json!({
            "email": email,
            "password": "secret-pass",
            "displayName": "Test Candidate",
            "role": "candidate",
        }))
        .await
    }

    /// Registers an approved San Francisco employer and returns
    /// (user_id, employer_profile_id, token).
    pub async fn register_employer(&self, email: &str) -> (Uuid, Uuid, String) {
        let (user_id, token) = self
            .register(json!({
                "email": email,
                "password": "secret-pass",
                "displayName": "Test Employer",
                "role": "employer",
                "companyName": "Golden Gate Staffing",
                "country": "United States",
                "zipCode": "94102",
            }))
            .await;
        let profile = entity::employer_profile::Entity::find()
            .filter(entity::employer_profile::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .unwrap()
            .unwrap();
        self.approve_employer(profile.id).await;
        (user_id, profile.id, token)
    }

    pub async fn approve_employer(&self, profile_id: Uuid) {
        use sea_orm::{ActiveModelTrait, Set};
        let profile = entity::employer_profile::Entity::find_by_id(profile_id)
            .one(self.db.as_ref())
            .await
            .unwrap()
            .unwrap();
        let mut active: entity::employer_profile::ActiveModel = profile.into();
        active.is_approved = Set(true);
        active.update(self.db.as_ref()).await.unwrap();
    }

    /// Mints an admin session directly; admins cannot self-register.
    pub async fn admin_token(&self) -> String {
        use chrono::Utc;
        use sea_orm::{ActiveModelTrait, Set};
        let now = Utc::now();
        let id = Uuid::new_v4();
        entity::user::ActiveModel {
            id: Set(id),
            email: Set(format!("admin-{id}@talenthub.test")),
            display_name: Set("Admin".into()),
            phone: Set(None),
            role: Set(entity::user::Role::Admin),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(self.db.as_ref())
        .await
        .unwrap();
        issue_token(id, entity::user::Role::Admin, &self.auth).unwrap()
    }
}

async fn bootstrap_sqlite(db: &DatabaseConnection) {
    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        "PRAGMA foreign_keys = ON;",
    ))
    .await
    .unwrap();

    let tables = [
        r#"
        CREATE TABLE "user" (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            display_name TEXT NOT NULL,
            phone TEXT,
            role TEXT NOT NULL,
            is_active INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
        r#"
        CREATE TABLE user_secret (
            user_id TEXT PRIMARY KEY REFERENCES "user"(id) ON DELETE CASCADE,
            password_hash TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
        r#"
        CREATE TABLE employer_profile (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL UNIQUE REFERENCES "user"(id) ON DELETE CASCADE,
            company_name TEXT NOT NULL,
            industry TEXT,
            website TEXT,
            phone TEXT,
            address_line1 TEXT,
            city TEXT,
            state TEXT,
            zip_code TEXT,
            country TEXT NOT NULL,
            latitude REAL,
            longitude REAL,
            is_approved INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
        r#"
        CREATE TABLE job (
            id TEXT PRIMARY KEY,
            employer_id TEXT NOT NULL REFERENCES employer_profile(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            description TEXT,
            job_type TEXT NOT NULL,
            status TEXT NOT NULL,
            city TEXT,
            state TEXT,
            zip_code TEXT,
            latitude REAL,
            longitude REAL,
            salary_min_cents INTEGER,
            salary_max_cents INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
        r#"
        CREATE TABLE application (
            id TEXT PRIMARY KEY,
            job_id TEXT NOT NULL REFERENCES job(id) ON DELETE CASCADE,
            candidate_id TEXT NOT NULL REFERENCES "user"(id) ON DELETE CASCADE,
            status TEXT NOT NULL,
            resume_path TEXT,
            note TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (job_id, candidate_id)
        );
        "#,
        r#"
        CREATE TABLE saved_job (
            job_id TEXT NOT NULL REFERENCES job(id) ON DELETE CASCADE,
            candidate_id TEXT NOT NULL REFERENCES "user"(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL,
            PRIMARY KEY (job_id, candidate_id)
        );
        "#,
        r#"
        CREATE TABLE sales_client (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL REFERENCES "user"(id) ON DELETE CASCADE,
            company_name TEXT NOT NULL,
            contact_name TEXT,
            email TEXT,
            phone TEXT,
            address_line1 TEXT,
            city TEXT,
            state TEXT,
            zip_code TEXT,
            call_status TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
        r#"
        CREATE TABLE client_remark (
            id TEXT PRIMARY KEY,
            client_id TEXT NOT NULL REFERENCES sales_client(id) ON DELETE CASCADE,
            author_name TEXT NOT NULL,
            message TEXT NOT NULL,
            category TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
        r#"
        CREATE TABLE availability_slot (
            id TEXT PRIMARY KEY,
            employer_id TEXT NOT NULL REFERENCES employer_profile(id) ON DELETE CASCADE,
            slot_date TEXT NOT NULL,
            start_minute INTEGER NOT NULL,
            end_minute INTEGER NOT NULL,
            timezone TEXT NOT NULL,
            max_candidates INTEGER NOT NULL,
            booked_count INTEGER NOT NULL,
            is_available INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            CHECK (booked_count >= 0 AND booked_count <= max_candidates)
        );
        "#,
        r#"
        CREATE TABLE interview_invite (
            id TEXT PRIMARY KEY,
            token TEXT NOT NULL UNIQUE,
            job_id TEXT NOT NULL REFERENCES job(id) ON DELETE CASCADE,
            candidate_name TEXT NOT NULL,
            candidate_email TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            used_at TEXT,
            created_at TEXT NOT NULL
        );
        "#,
        r#"
        CREATE TABLE interview_booking (
            id TEXT PRIMARY KEY,
            slot_id TEXT NOT NULL REFERENCES availability_slot(id) ON DELETE CASCADE,
            invite_id TEXT NOT NULL REFERENCES interview_invite(id) ON DELETE CASCADE,
            candidate_name TEXT NOT NULL,
            candidate_email TEXT NOT NULL,
            notes TEXT,
            created_at TEXT NOT NULL
        );
        "#,
        r#"
        CREATE TABLE notification (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES "user"(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            message TEXT NOT NULL,
            kind TEXT NOT NULL,
            is_read INTEGER NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    ];
    for sql in tables {
        db.execute(Statement::from_string(DatabaseBackend::Sqlite, sql))
            .await
            .unwrap();
    }
}
