//! HTTP request and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use concierge_core::{serialize_tracking_query, TaskReference};

use crate::delivery::DeliveryRequest;
use crate::ride::RideDetails;

// ============================================================================
// Request types
// ============================================================================

/// Request body for the create delivery endpoint.
///
/// Fields are optional here so a missing one is reported as a 400 with a
/// readable message rather than a body rejection.
#[derive(Debug, Default, Deserialize)]
pub struct CreateDeliveryRequest {
    pub pickup_address: Option<String>,
    pub dropoff_address: Option<String>,
    pub items: Option<String>,
}

impl TryFrom<CreateDeliveryRequest> for DeliveryRequest {
    type Error = ApiError;

    fn try_from(req: CreateDeliveryRequest) -> Result<Self, Self::Error> {
        Ok(DeliveryRequest {
            pickup_address: required(req.pickup_address, "pickup_address")?,
            dropoff_address: required(req.dropoff_address, "dropoff_address")?,
            items: required(req.items, "items")?,
        })
    }
}

/// Request body for the ride request endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct RideRequest {
    pub pickup: Option<String>,
    pub dropoff: Option<String>,
    pub ride_type: Option<String>,
}

impl TryFrom<RideRequest> for RideDetails {
    type Error = ApiError;

    fn try_from(req: RideRequest) -> Result<Self, Self::Error> {
        Ok(RideDetails {
            pickup: Some(required(req.pickup, "pickup")?),
            dropoff: Some(required(req.dropoff, "dropoff")?),
            ride_type: req.ride_type.filter(|t| !t.trim().is_empty()),
            vehicle: None,
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::MissingField(field.to_string()))
}

// ============================================================================
// Tracked responses
// ============================================================================

/// An entity plus the URL the client should poll next.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedResponse<T> {
    #[serde(flatten)]
    pub entity: T,
    pub status_url: String,
}

/// Percent-encode `id` for use as a single path segment.
pub fn path_segment(id: &str) -> String {
    // form encoding writes spaces as '+', which a path would keep literally
    url::form_urlencoded::byte_serialize(id.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Build a poll URL from a path, extra query pairs, and a tracking reference.
pub fn status_url(path: &str, pairs: &[(&str, &str)], tracking: Option<&TaskReference>) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        query.append_pair(key, value);
    }
    let mut query = query.finish();

    let tracking = serialize_tracking_query(tracking);
    if !tracking.is_empty() {
        if !query.is_empty() {
            query.push('&');
        }
        query.push_str(&tracking);
    }

    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}

// ============================================================================
// Error types
// ============================================================================

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing required field: {0}")]
    MissingField(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::MissingField(_) => StatusCode::BAD_REQUEST,
        };
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
