mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn zip_10001_resolves_to_new_york() {
    let app = common::setup().await;
    let (status, body) = app
        .get("/api/location/lookup-zipcode?zipCode=10001", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["city"], "New York");
    assert_eq!(body["data"]["state"], "NY");
}

#[tokio::test]
async fn unknown_zip_is_not_found() {
    let app = common::setup().await;
    let (status, body) = app
        .get("/api/location/lookup-zipcode?zipCode=00000", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "ZIP_NOT_FOUND");
}

#[tokio::test]
async fn malformed_zip_is_a_validation_error() {
    let app = common::setup().await;
    let (status, body) = app
        .get("/api/location/lookup-zipcode?zipCode=123ab", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_ZIP");
}

#[tokio::test]
async fn address_validation_checks_country_zip_and_state() {
    let app = common::setup().await;

    let (status, body) = app
        .post(
            "/api/location/validate",
            None,
            json!({"country": "Canada", "zipCode": "10001"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "COUNTRY_NOT_SUPPORTED");

    let (status, body) = app
        .post(
            "/api/location/validate",
            None,
            json!({"country": "US", "zipCode": "10001", "state": "CA"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "STATE_MISMATCH");

    let (status, body) = app
        .post(
            "/api/location/validate",
            None,
            json!({"country": "United States", "zipCode": "10001", "state": "ny"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["city"], "New York");
    assert_eq!(body["data"]["valid"], true);
}

#[tokio::test]
async fn coordinate_validation_uses_us_bounds() {
    let app = common::setup().await;

    let (status, body) = app
        .post(
            "/api/location/validate-coordinates",
            None,
            json!({"latitude": 37.7813, "longitude": -122.4167}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["valid"], true);

    // Anchorage sits outside the continental box but inside the Alaska box.
    let (status, _) = app
        .post(
            "/api/location/validate-coordinates",
            None,
            json!({"latitude": 61.2181, "longitude": -149.9003}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post(
            "/api/location/validate-coordinates",
            None,
            json!({"latitude": 51.5074, "longitude": -0.1278}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "COORDINATES_OUT_OF_RANGE");
}
