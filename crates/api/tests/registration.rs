mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn canadian_employer_registration_is_rejected() {
    let app = common::setup().await;
    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({
                "email": "maple@jobs.test",
                "password": "secret-pass",
                "displayName": "Maple Staffing",
                "role": "employer",
                "companyName": "Maple Staffing",
                "country": "Canada",
                "zipCode": "94102",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "COUNTRY_NOT_SUPPORTED");
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn employer_without_zip_or_detected_location_is_rejected() {
    let app = common::setup().await;
    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({
                "email": "nozip@jobs.test",
                "password": "secret-pass",
                "displayName": "No Zip Inc",
                "role": "employer",
                "companyName": "No Zip Inc",
                "country": "United States",
                "locationDetected": false,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "ZIP_REQUIRED");
}

#[tokio::test]
async fn employer_with_detected_us_coordinates_registers() {
    let app = common::setup().await;
    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({
                "email": "detected@jobs.test",
                "password": "secret-pass",
                "displayName": "Detected Inc",
                "role": "employer",
                "companyName": "Detected Inc",
                "country": "US",
                "locationDetected": true,
                "latitude": 37.7813,
                "longitude": -122.4167,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["user"]["role"], "employer");
}

#[tokio::test]
async fn detected_coordinates_outside_us_are_rejected() {
    let app = common::setup().await;
    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({
                "email": "paris@jobs.test",
                "password": "secret-pass",
                "displayName": "Paris Inc",
                "role": "employer",
                "companyName": "Paris Inc",
                "country": "US",
                "locationDetected": true,
                "latitude": 48.8566,
                "longitude": 2.3522,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "COORDINATES_OUT_OF_RANGE");
}

#[tokio::test]
async fn zip_registration_fills_profile_from_centroid_table() {
    let app = common::setup().await;
    let (_, _, token) = app.register_employer("sf@jobs.test").await;
    let (status, body) = app.get("/api/employer/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let profile = &body["data"];
    assert_eq!(profile["city"], "San Francisco");
    assert_eq!(profile["state"], "CA");
    assert_eq!(profile["zipCode"], "94102");
    assert!(profile["latitude"].as_f64().is_some());
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let app = common::setup().await;
    app.register_candidate("dupe@jobs.test").await;
    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({
                "email": "dupe@jobs.test",
                "password": "secret-pass",
                "displayName": "Second Account",
                "role": "candidate",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "EMAIL_TAKEN");
}

#[tokio::test]
async fn admin_role_cannot_self_register() {
    let app = common::setup().await;
    let (status, _) = app
        .post(
            "/api/auth/register",
            None,
            json!({
                "email": "root@jobs.test",
                "password": "secret-pass",
                "displayName": "Root",
                "role": "admin",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn login_rejects_wrong_password_and_accepts_right_one() {
    let app = common::setup().await;
    app.register_candidate("login@jobs.test").await;

    let (status, _) = app
        .post(
            "/api/auth/login",
            None,
            json!({"email": "login@jobs.test", "password": "wrong-pass"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .post(
            "/api/auth/login",
            None,
            json!({"email": "LOGIN@jobs.test", "password": "secret-pass"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let token = body["data"]["token"].as_str().unwrap();

    let (status, body) = app.get("/api/auth/me", Some(token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["email"], "login@jobs.test");
}

#[tokio::test]
async fn requests_without_token_are_unauthorized() {
    let app = common::setup().await;
    let (status, _) = app.get("/api/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.get("/api/notifications", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
