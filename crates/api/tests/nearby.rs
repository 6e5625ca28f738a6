mod common;

use axum::http::StatusCode;
use serde_json::json;

async fn post_job(app: &common::TestApp, token: &str, title: &str, zip: &str, status: &str) {
    let (code, body) = app
        .post(
            "/api/jobs",
            Some(token),
            json!({"title": title, "jobType": "full_time", "zipCode": zip, "status": status}),
        )
        .await;
    assert_eq!(code, StatusCode::CREATED, "{body}");
}

#[tokio::test]
async fn nearby_search_returns_only_in_radius_jobs_with_distance() {
    let app = common::setup().await;
    let (_, _, token) = app.register_employer("geo@jobs.test").await;

    post_job(&app, &token, "SoMa Barista", "94107", "open").await;
    post_job(&app, &token, "Oakland Prep Cook", "94607", "open").await;
    post_job(&app, &token, "San Jose Cashier", "95113", "open").await;
    post_job(&app, &token, "Hidden Draft", "94103", "draft").await;

    let (status, body) = app.get("/api/jobs/nearby?zipCode=94102", None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let jobs = body["data"]["jobs"].as_array().unwrap();
    let titles: Vec<&str> = jobs.iter().map(|j| j["title"].as_str().unwrap()).collect();

    // San Jose is ~40 miles out, past the default 25-mile radius; draft
    // jobs never appear.
    assert_eq!(titles, vec!["SoMa Barista", "Oakland Prep Cook"]);

    let first = jobs[0]["distance"].as_f64().unwrap();
    let second = jobs[1]["distance"].as_f64().unwrap();
    assert!(first < second, "results are sorted nearest first");
    assert!(first < 3.0, "94107 is within a few miles of 94102");
    assert!((5.0..15.0).contains(&second), "94607 is across the bay");
}

#[tokio::test]
async fn nearby_radius_is_adjustable() {
    let app = common::setup().await;
    let (_, _, token) = app.register_employer("radius@jobs.test").await;
    post_job(&app, &token, "San Jose Cashier", "95113", "open").await;

    let (_, body) = app.get("/api/jobs/nearby?zipCode=94102&radius=5", None).await;
    assert_eq!(body["data"]["jobs"].as_array().unwrap().len(), 0);

    let (_, body) = app
        .get("/api/jobs/nearby?zipCode=94102&radius=100", None)
        .await;
    let jobs = body["data"]["jobs"].as_array().unwrap();
    assert_eq!(jobs.len(), 1);
    assert!((30.0..60.0).contains(&jobs[0]["distance"].as_f64().unwrap()));
}

#[tokio::test]
async fn nearby_search_validates_the_origin_zip() {
    let app = common::setup().await;

    let (status, body) = app.get("/api/jobs/nearby?zipCode=9410", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_ZIP");

    let (status, body) = app.get("/api/jobs/nearby?zipCode=00000", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "ZIP_NOT_FOUND");
}

#[tokio::test]
async fn public_job_listing_filters_by_title_and_type() {
    let app = common::setup().await;
    let (_, _, token) = app.register_employer("list@jobs.test").await;
    post_job(&app, &token, "Line Cook", "94102", "open").await;
    post_job(&app, &token, "Prep Cook", "94102", "open").await;
    post_job(&app, &token, "Dishwasher", "94102", "open").await;

    let (status, body) = app.get("/api/jobs?q=cook", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);

    let (_, body) = app.get("/api/jobs?q=cook&limit=1", None).await;
    assert_eq!(body["data"]["jobs"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["total"], 2);

    let (_, body) = app.get("/api/jobs?jobType=part_time", None).await;
    assert_eq!(body["data"]["total"], 0);
}
