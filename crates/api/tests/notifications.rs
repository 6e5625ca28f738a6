mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

/// Registers an approved employer, posts `count` jobs, and has a
/// candidate apply to each so the employer accumulates notifications.
async fn employer_with_notifications(app: &common::TestApp, count: usize) -> (String, String) {
    let (_, _, employer_token) = app.register_employer("inbox@jobs.test").await;
    let (_, candidate_token) = app.register_candidate("applicant@cand.test").await;
    for n in 0..count {
        let (status, body) = app
            .post(
                "/api/jobs",
                Some(&employer_token),
                json!({"title": format!("Role {n}"), "jobType": "contract"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let job_id = body["data"]["id"].as_str().unwrap();
        let (status, body) = app
            .post(
                &format!("/api/candidates/jobs/{job_id}/apply"),
                Some(&candidate_token),
                json!({}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }
    (employer_token, candidate_token)
}

fn notification_ids(body: &Value) -> Vec<String> {
    body["data"]["notifications"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn mark_as_read_flips_the_flag_and_is_idempotent() {
    let app = common::setup().await;
    let (employer_token, _) = employer_with_notifications(&app, 1).await;

    let (_, body) = app.get("/api/notifications", Some(&employer_token)).await;
    let list = body["data"]["notifications"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["isRead"], false);
    assert_eq!(list[0]["kind"], "application");
    let id = list[0]["id"].as_str().unwrap();

    let (status, body) = app
        .request(
            "PATCH",
            &format!("/api/notifications/{id}/read"),
            Some(&employer_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isRead"], true);

    // Marking twice is fine.
    let (status, body) = app
        .request(
            "PATCH",
            &format!("/api/notifications/{id}/read"),
            Some(&employer_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isRead"], true);

    let (_, body) = app
        .get("/api/notifications/unread-count", Some(&employer_token))
        .await;
    assert_eq!(body["data"]["unread"], 0);
}

#[tokio::test]
async fn mark_all_as_read_clears_every_unread_notification() {
    let app = common::setup().await;
    let (employer_token, _) = employer_with_notifications(&app, 3).await;

    let (_, body) = app
        .get("/api/notifications/unread-count", Some(&employer_token))
        .await;
    assert_eq!(body["data"]["unread"], 3);

    let (status, body) = app
        .post("/api/notifications/read-all", Some(&employer_token), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["updated"], 3);

    let (_, body) = app
        .get("/api/notifications?unreadOnly=true", Some(&employer_token))
        .await;
    assert_eq!(notification_ids(&body).len(), 0);

    // Already-read inbox: a second sweep touches nothing.
    let (_, body) = app
        .post("/api/notifications/read-all", Some(&employer_token), json!({}))
        .await;
    assert_eq!(body["data"]["updated"], 0);
}

#[tokio::test]
async fn notifications_are_scoped_to_their_owner() {
    let app = common::setup().await;
    let (employer_token, candidate_token) = employer_with_notifications(&app, 1).await;

    let (_, body) = app.get("/api/notifications", Some(&employer_token)).await;
    let id = notification_ids(&body).remove(0);

    // Another user's notification reads as missing.
    let (status, _) = app
        .request(
            "PATCH",
            &format!("/api/notifications/{id}/read"),
            Some(&candidate_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get("/api/notifications", Some(&candidate_token)).await;
    assert_eq!(notification_ids(&body).len(), 0);
}

#[tokio::test]
async fn employer_approval_sends_a_system_notification() {
    let app = common::setup().await;
    let (_, token) = app
        .register(json!({
            "email": "pending@jobs.test",
            "password": "secret-pass",
            "displayName": "Pending Inc",
            "role": "employer",
            "companyName": "Pending Inc",
            "country": "US",
            "zipCode": "10001",
        }))
        .await;
    let (_, body) = app.get("/api/employer/profile", Some(&token)).await;
    let profile_id = body["data"]["id"].as_str().unwrap().to_string();

    let admin = app.admin_token().await;
    let (status, body) = app
        .post(
            &format!("/api/employer/{profile_id}/approve"),
            Some(&admin),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["isApproved"], true);

    let (_, body) = app.get("/api/notifications", Some(&token)).await;
    let list = body["data"]["notifications"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["kind"], "system");
    assert_eq!(list[0]["title"], "Account approved");
}
