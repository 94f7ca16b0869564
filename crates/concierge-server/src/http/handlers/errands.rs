//! Errand (delivery) handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, RawQuery, State},
    Json,
};
use chrono::Utc;
use tracing::info;

use concierge_core::DeliveryId;

use super::query_params;
use crate::delivery::DeliveryRequest;
use crate::errand::{self, Errand};
use crate::http::responses::{
    path_segment, status_url, ApiError, CreateDeliveryRequest, TrackedResponse,
};
use crate::state::AppState;
use crate::tracking::tracking_from_params;

fn respond(errand: Errand) -> Json<TrackedResponse<Errand>> {
    let url = status_url(
        &format!("/api/doordash/status/{}", path_segment(errand.id.as_str())),
        &[],
        errand.tracking.as_ref(),
    );
    Json(TrackedResponse {
        entity: errand,
        status_url: url,
    })
}

/// Create a delivery and start watching it.
pub async fn create_delivery(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateDeliveryRequest>,
) -> Result<Json<TrackedResponse<Errand>>, ApiError> {
    let request = DeliveryRequest::try_from(req)?;
    let errand = errand::create_errand(&state, request, Utc::now()).await;

    info!(
        delivery_id = %errand.id,
        provider = %errand.tracking.as_ref().map_or("none", |t| t.provider().as_str()),
        "Errand created"
    );
    Ok(respond(errand))
}

/// Poll a delivery, reconciling it with the tracking reference in the query.
pub async fn delivery_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    RawQuery(query): RawQuery,
) -> Json<TrackedResponse<Errand>> {
    let params = query_params(query.as_deref());
    let tracking = tracking_from_params(&params);

    let errand =
        errand::errand_status(&state, &DeliveryId::new(id), tracking, Utc::now()).await;
    respond(errand)
}
