use axum::{
    extract::Query,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, ApiResult},
    geo,
    response::Envelope,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/lookup-zipcode", get(lookup_zipcode_handler))
        .route("/validate", post(validate_address_handler))
        .route("/validate-coordinates", post(validate_coordinates_handler))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupQuery {
    pub zip_code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZipPayload {
    pub zip_code: String,
    pub city: String,
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&'static geo::ZipRecord> for ZipPayload {
    fn from(record: &'static geo::ZipRecord) -> Self {
        Self {
            zip_code: record.zip.to_string(),
            city: record.city.to_string(),
            state: record.state.to_string(),
            latitude: record.latitude,
            longitude: record.longitude,
        }
    }
}

async fn lookup_zipcode_handler(
    Query(query): Query<LookupQuery>,
) -> ApiResult<Json<Envelope<ZipPayload>>> {
    let zip = query.zip_code.trim();
    if !geo::is_valid_zip_format(zip) {
        return Err(ApiError::validation_code(
            "INVALID_ZIP",
            "zipCode must be exactly 5 digits",
        ));
    }
    // An unknown ZIP is a missing resource, not a malformed request.
    let record = geo::lookup_zip(zip)
        .ok_or_else(|| ApiError::not_found_code("ZIP_NOT_FOUND", "zip code"))?;
    Ok(Envelope::ok("ok", record.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateAddressRequest {
    pub country: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedAddressPayload {
    pub valid: bool,
    pub city: String,
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
}

async fn validate_address_handler(
    Json(input): Json<ValidateAddressRequest>,
) -> ApiResult<Json<Envelope<ValidatedAddressPayload>>> {
    let country = input
        .country
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::validation_code("COUNTRY_REQUIRED", "country is required"))?;
    if !geo::is_us_country(country) {
        return Err(ApiError::validation_code(
            "COUNTRY_NOT_SUPPORTED",
            "only United States addresses are supported",
        ));
    }
    let zip = input
        .zip_code
        .as_deref()
        .map(str::trim)
        .filter(|z| !z.is_empty())
        .ok_or_else(|| ApiError::validation_code("ZIP_REQUIRED", "zipCode is required"))?;
    if !geo::is_valid_zip_format(zip) {
        return Err(ApiError::validation_code(
            "INVALID_ZIP",
            "zipCode must be exactly 5 digits",
        ));
    }
    let record = geo::lookup_zip(zip).ok_or_else(|| {
        ApiError::validation_code("ZIP_NOT_FOUND", format!("unknown ZIP code {zip}"))
    })?;
    if let Some(state) = input.state.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        if !state.eq_ignore_ascii_case(record.state) {
            return Err(ApiError::validation_code(
                "STATE_MISMATCH",
                format!("ZIP {zip} is in {}, not {state}", record.state),
            ));
        }
    }
    Ok(Envelope::ok(
        "address is valid",
        ValidatedAddressPayload {
            valid: true,
            city: record.city.to_string(),
            state: record.state.to_string(),
            latitude: record.latitude,
            longitude: record.longitude,
        },
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCoordinatesRequest {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedCoordinatesPayload {
    pub valid: bool,
}

async fn validate_coordinates_handler(
    Json(input): Json<ValidateCoordinatesRequest>,
) -> ApiResult<Json<Envelope<ValidatedCoordinatesPayload>>> {
    if !geo::within_us_bounds(input.latitude, input.longitude) {
        return Err(ApiError::validation_code(
            "COORDINATES_OUT_OF_RANGE",
            "coordinates fall outside the United States",
        ));
    }
    Ok(Envelope::ok(
        "coordinates are valid",
        ValidatedCoordinatesPayload { valid: true },
    ))
}
