//! Simulated delivery provider used when DoorDash is not configured.

use async_trait::async_trait;

use concierge_core::{DeliveryId, ErrandStage};

use super::{DeliveryError, DeliveryProvider, DeliveryRequest};
use crate::errand::Errand;

/// The errand shown when no live delivery data is available.
pub fn canned_errand(id: DeliveryId) -> Errand {
    Errand {
        id,
        pickup_address: "CVS Pharmacy, 200 Varick St".to_string(),
        dropoff_address: "David Geffen Hall, 10 Lincoln Center Plaza".to_string(),
        items: "Phone charger, Advil, water bottle".to_string(),
        dasher_name: Some("James".to_string()),
        status: ErrandStage::PickingUp,
        eta_minutes: 35,
        tracking: None,
    }
}

/// Delivery provider that never leaves the process.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedDeliveryProvider;

#[async_trait]
impl DeliveryProvider for SimulatedDeliveryProvider {
    fn is_live(&self) -> bool {
        false
    }

    async fn create_delivery(&self, request: &DeliveryRequest) -> Result<Errand, DeliveryError> {
        let mut errand = canned_errand(DeliveryId::generate()).for_request(request);
        errand.status = ErrandStage::Assigned;
        errand.eta_minutes = ErrandStage::Assigned.eta_minutes();
        Ok(errand)
    }

    async fn delivery_status(&self, id: &DeliveryId) -> Result<Errand, DeliveryError> {
        Ok(canned_errand(id.clone()))
    }
}
