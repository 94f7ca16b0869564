//! Ride handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, RawQuery, State},
    Json,
};
use chrono::Utc;
use tracing::info;

use concierge_core::RideId;

use super::query_params;
use crate::http::responses::{
    path_segment, status_url, ApiError, RideRequest, TrackedResponse,
};
use crate::ride::{self, Ride, RideDetails};
use crate::state::AppState;
use crate::tracking::tracking_from_params;

/// Ride details are echoed into the poll URL so a later poll can rebuild
/// the same ride without server-side state.
fn respond(ride: Ride) -> Json<TrackedResponse<Ride>> {
    let url = status_url(
        &format!("/api/uber/status/{}", path_segment(ride.id.as_str())),
        &[
            ("pickup", ride.pickup.as_str()),
            ("dropoff", ride.dropoff.as_str()),
            ("rideType", ride.ride_type.as_str()),
            ("vehicle", ride.vehicle.as_str()),
        ],
        ride.tracking.as_ref(),
    );
    Json(TrackedResponse {
        entity: ride,
        status_url: url,
    })
}

/// Book a ride and start its delay simulation.
pub async fn request_ride(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RideRequest>,
) -> Result<Json<TrackedResponse<Ride>>, ApiError> {
    let details = RideDetails::try_from(req)?;
    let ride = ride::book_ride(&state, details, Utc::now()).await;

    info!(ride_id = %ride.id, ride_type = %ride.ride_type, "Ride requested");
    Ok(respond(ride))
}

/// Poll a ride, reconciling it with the tracking reference in the query.
pub async fn ride_status(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<String>,
    RawQuery(query): RawQuery,
) -> Json<TrackedResponse<Ride>> {
    let mut params = query_params(query.as_deref());
    let tracking = tracking_from_params(&params);
    let details = RideDetails {
        pickup: params.remove("pickup"),
        dropoff: params.remove("dropoff"),
        ride_type: params.remove("rideType"),
        vehicle: params.remove("vehicle"),
    };

    let ride = ride::ride_status(&state, RideId::new(trip_id), &details, tracking, Utc::now()).await;
    respond(ride)
}
