mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::{json, Value};

fn future_date(days: i64) -> String {
    (Utc::now() + Duration::days(days)).date_naive().to_string()
}

async fn employer_with_job(app: &common::TestApp, email: &str) -> (String, String) {
    let (_, _, token) = app.register_employer(email).await;
    let (status, body) = app
        .post(
            "/api/jobs",
            Some(&token),
            json!({"title": "Line Cook", "jobType": "full_time"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let job_id = body["data"]["id"].as_str().unwrap().to_string();
    (token, job_id)
}

async fn set_slots(app: &common::TestApp, token: &str, slots: Value) -> Value {
    let (status, body) = app
        .request(
            "PUT",
            "/api/interviews/availability",
            Some(token),
            Some(json!({ "slots": slots })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"]["slots"].clone()
}

async fn invite_token(app: &common::TestApp, token: &str, job_id: &str, email: &str) -> String {
    let (status, body) = app
        .post(
            "/api/interviews/invites",
            Some(token),
            json!({"jobId": job_id, "candidateName": "Sam Okafor", "candidateEmail": email}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn slot_with_capacity_one_accepts_exactly_one_booking() {
    let app = common::setup().await;
    let (token, job_id) = employer_with_job(&app, "cap@jobs.test").await;

    let slots = set_slots(
        &app,
        &token,
        json!([{
            "date": future_date(7),
            "startTime": "09:00",
            "endTime": "09:30",
            "maxCandidates": 1,
        }]),
    )
    .await;
    let slot_id = slots[0]["id"].as_str().unwrap().to_string();

    let first = invite_token(&app, &token, &job_id, "one@cand.test").await;
    let second = invite_token(&app, &token, &job_id, "two@cand.test").await;

    let (status, body) = app
        .get(&format!("/api/interviews/slots?token={first}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["slots"][0]["remaining"], 1);
    assert_eq!(body["data"]["companyName"], "Golden Gate Staffing");

    let (status, body) = app
        .post(
            "/api/interviews/book",
            None,
            json!({"token": first, "slotId": slot_id}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["slot"]["remaining"], 0);

    let (status, body) = app
        .post(
            "/api/interviews/book",
            None,
            json!({"token": second, "slotId": slot_id}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "SLOT_FULL");

    // A full slot no longer shows up for later invitees.
    let third = invite_token(&app, &token, &job_id, "three@cand.test").await;
    let (status, body) = app
        .get(&format!("/api/interviews/slots?token={third}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["slots"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn used_unknown_and_expired_tokens_are_rejected() {
    let app = common::setup().await;
    let (token, job_id) = employer_with_job(&app, "tok@jobs.test").await;
    let slots = set_slots(
        &app,
        &token,
        json!([{
            "date": future_date(7),
            "startTime": "10:00",
            "endTime": "10:30",
            "maxCandidates": 2,
        }]),
    )
    .await;
    let slot_id = slots[0]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .get("/api/interviews/slots?token=not-a-real-token", None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_TOKEN");

    let invite = invite_token(&app, &token, &job_id, "reuse@cand.test").await;
    let (status, _) = app
        .post(
            "/api/interviews/book",
            None,
            json!({"token": invite, "slotId": slot_id}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // The invite is single-use.
    let (status, body) = app
        .post(
            "/api/interviews/book",
            None,
            json!({"token": invite, "slotId": slot_id}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_TOKEN");

    // A lapsed invite behaves like an unknown token.
    let expired = invite_token(&app, &token, &job_id, "late@cand.test").await;
    {
        use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
        let invite = entity::interview_invite::Entity::find()
            .filter(entity::interview_invite::Column::Token.eq(expired.clone()))
            .one(app.db.as_ref())
            .await
            .unwrap()
            .unwrap();
        let mut active: entity::interview_invite::ActiveModel = invite.into();
        active.expires_at = Set((Utc::now() - Duration::days(1)).into());
        active.update(app.db.as_ref()).await.unwrap();
    }

    let (status, body) = app
        .get(&format!("/api/interviews/slots?token={expired}"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_TOKEN");

    let (status, body) = app
        .post(
            "/api/interviews/book",
            None,
            json!({"token": expired, "slotId": slot_id}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn overlapping_windows_for_the_same_candidate_are_rejected() {
    let app = common::setup().await;
    let (token, job_id) = employer_with_job(&app, "ovl@jobs.test").await;
    let slots = set_slots(
        &app,
        &token,
        json!([
            {"date": future_date(7), "startTime": "09:00", "endTime": "10:00", "maxCandidates": 2},
            {"date": future_date(7), "startTime": "09:30", "endTime": "10:30", "maxCandidates": 2},
            {"date": future_date(7), "startTime": "11:00", "endTime": "11:30", "maxCandidates": 2},
        ]),
    )
    .await;
    let first_id = slots[0]["id"].as_str().unwrap().to_string();
    let second_id = slots[1]["id"].as_str().unwrap().to_string();
    let disjoint_id = slots[2]["id"].as_str().unwrap().to_string();

    let invite_a = invite_token(&app, &token, &job_id, "same@cand.test").await;
    let invite_b = invite_token(&app, &token, &job_id, "same@cand.test").await;
    let invite_c = invite_token(&app, &token, &job_id, "same@cand.test").await;

    let (status, _) = app
        .post(
            "/api/interviews/book",
            None,
            json!({"token": invite_a, "slotId": first_id}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .post(
            "/api/interviews/book",
            None,
            json!({"token": invite_b, "slotId": second_id}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "OVERLAPPING_BOOKING");

    let (status, _) = app
        .post(
            "/api/interviews/book",
            None,
            json!({"token": invite_c, "slotId": disjoint_id}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn availability_validation_rejects_missing_or_inverted_times() {
    let app = common::setup().await;
    let (_, _, token) = app.register_employer("val@jobs.test").await;

    let (status, _) = app
        .request(
            "PUT",
            "/api/interviews/availability",
            Some(&token),
            Some(json!({"slots": [{"date": future_date(7), "endTime": "10:00"}]})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            "PUT",
            "/api/interviews/availability",
            Some(&token),
            Some(json!({"slots": [{
                "date": future_date(7),
                "startTime": "11:00",
                "endTime": "10:00",
            }]})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn replacing_availability_preserves_booked_slots() {
    let app = common::setup().await;
    let (token, job_id) = employer_with_job(&app, "keep@jobs.test").await;
    let slots = set_slots(
        &app,
        &token,
        json!([
            {"date": future_date(7), "startTime": "09:00", "endTime": "09:30", "maxCandidates": 1},
            {"date": future_date(7), "startTime": "14:00", "endTime": "14:30", "maxCandidates": 1},
        ]),
    )
    .await;
    let booked_id = slots[0]["id"].as_str().unwrap().to_string();

    let invite = invite_token(&app, &token, &job_id, "keep@cand.test").await;
    let (status, _) = app
        .post(
            "/api/interviews/book",
            None,
            json!({"token": invite, "slotId": booked_id}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let replaced = set_slots(
        &app,
        &token,
        json!([{
            "date": future_date(14),
            "startTime": "10:00",
            "endTime": "10:30",
            "maxCandidates": 3,
        }]),
    )
    .await;
    let ids: Vec<&str> = replaced
        .as_array()
        .unwrap()
        .iter()
        .map(|slot| slot["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids.len(), 2, "booked slot survives, empty one is dropped");
    assert!(ids.contains(&booked_id.as_str()));
}

#[tokio::test]
async fn notifications_are_sent_to_the_employer_on_booking() {
    let app = common::setup().await;
    let (token, job_id) = employer_with_job(&app, "notif@jobs.test").await;
    let slots = set_slots(
        &app,
        &token,
        json!([{
            "date": future_date(7),
            "startTime": "09:00",
            "endTime": "09:30",
            "maxCandidates": 1,
        }]),
    )
    .await;
    let slot_id = slots[0]["id"].as_str().unwrap().to_string();
    let invite = invite_token(&app, &token, &job_id, "booker@cand.test").await;
    app.post(
        "/api/interviews/book",
        None,
        json!({"token": invite, "slotId": slot_id}),
    )
    .await;

    let (status, body) = app.get("/api/notifications", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let list = body["data"]["notifications"].as_array().unwrap();
    assert!(list
        .iter()
        .any(|n| n["kind"] == "interview" && n["isRead"] == false));
}
