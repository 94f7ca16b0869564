//! Delivery provider collaborator.
//!
//! Errands are fulfilled by DoorDash Drive when credentials are configured,
//! and by a canned simulation otherwise.

mod doordash;
mod simulated;

use async_trait::async_trait;
use thiserror::Error;

use concierge_core::DeliveryId;

use crate::errand::Errand;

pub use doordash::{map_doordash_status, DoorDashClient, DoorDashConfig};
pub use simulated::{canned_errand, SimulatedDeliveryProvider};

/// Errors from a delivery provider.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Transport failure, including timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("delivery provider returned {0}")]
    Status(reqwest::StatusCode),

    /// Credentials could not be turned into a token.
    #[error("invalid credentials: {0}")]
    Credentials(String),

    /// The configured URL is unusable.
    #[error("invalid URL: {0}")]
    Url(String),
}

/// A validated request to create a delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRequest {
    pub pickup_address: String,
    pub dropoff_address: String,
    pub items: String,
}

/// Something that can create deliveries and report on them.
#[async_trait]
pub trait DeliveryProvider: Send + Sync {
    /// True when statuses come from a real courier rather than a simulation.
    fn is_live(&self) -> bool;

    async fn create_delivery(&self, request: &DeliveryRequest) -> Result<Errand, DeliveryError>;

    async fn delivery_status(&self, id: &DeliveryId) -> Result<Errand, DeliveryError>;
}
