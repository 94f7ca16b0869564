//! HTTP request handlers.

use std::collections::HashMap;

mod errands;
mod health;
mod rides;

pub use errands::{create_delivery, delivery_status};
pub use health::health_check;
pub use rides::{request_ride, ride_status};

/// Decode a raw query string into last-wins pairs.
///
/// Never fails: undecodable bytes are replaced, so a mangled tracking
/// parameter can only make the reference absent, never reject the request.
fn query_params(query: Option<&str>) -> HashMap<String, String> {
    query
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}
