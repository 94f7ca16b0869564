//! Errand (delivery) status assembly.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use concierge_core::{
    DeliveryId, ErrandStage, Stage, StageSchedule, TaskKind, TaskReference, TaskStatus,
};

use crate::delivery::{canned_errand, DeliveryRequest};
use crate::state::AppState;
use crate::tracking::{TaskTracker, TrackedEntity};

/// How often the remote watch job polls DoorDash.
const WATCH_POLL_INTERVAL_SECS: u32 = 30;

/// How many polls the remote watch job makes before giving up.
const WATCH_MAX_POLLS: u32 = 40;

/// Simulated progression of a delivery when no courier reports on it.
const DELIVERY_STAGES: [Stage<ErrandStage>; 4] = [
    Stage::new(ErrandStage::Assigned, 0),
    Stage::new(ErrandStage::PickingUp, 20),
    Stage::new(ErrandStage::EnRoute, 60),
    Stage::new(ErrandStage::Delivered, 120),
];

pub fn delivery_schedule() -> StageSchedule<ErrandStage> {
    StageSchedule::new(DELIVERY_STAGES.to_vec()).expect("delivery schedule is non-empty")
}

/// An errand as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Errand {
    pub id: DeliveryId,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub items: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dasher_name: Option<String>,
    pub status: ErrandStage,
    pub eta_minutes: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking: Option<TaskReference>,
}

impl Errand {
    /// Replace addresses and items with those of `request`.
    pub fn for_request(mut self, request: &DeliveryRequest) -> Self {
        self.pickup_address = request.pickup_address.clone();
        self.dropoff_address = request.dropoff_address.clone();
        self.items = request.items.clone();
        self
    }

    fn set_stage(&mut self, stage: ErrandStage) {
        self.status = stage;
        self.eta_minutes = stage.eta_minutes();
    }

    /// Derive the stage from time elapsed since tracking started.
    fn simulate(mut self, tracking: &TaskReference, now: DateTime<Utc>) -> Self {
        self.set_stage(delivery_schedule().stage_at(tracking.elapsed(now)));
        self
    }
}

impl TrackedEntity for Errand {
    fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    fn reconcile(&mut self, tracking: &TaskReference) {
        if tracking.is_local() && tracking.status() == TaskStatus::Success {
            self.set_stage(ErrandStage::Delivered);
        }
    }

    fn set_tracking(&mut self, tracking: TaskReference) {
        self.tracking = Some(tracking);
    }
}

/// Create a delivery and start watching it.
pub async fn create_errand(
    state: &AppState,
    request: DeliveryRequest,
    now: DateTime<Utc>,
) -> Errand {
    let errand = match state.delivery.create_delivery(&request).await {
        Ok(errand) => errand,
        Err(e) => {
            warn!(error = %e, "Delivery provider failed, using canned errand");
            canned_errand(DeliveryId::generate()).for_request(&request)
        }
    };

    let payload = json!({
        "delivery_id": errand.id,
        "poll_interval_seconds": WATCH_POLL_INTERVAL_SECS,
        "max_polls": WATCH_MAX_POLLS,
    });
    let tracking = state
        .tracker
        .start_tracking(TaskKind::DeliveryWatch, payload, now)
        .await;

    let errand = if state.delivery.is_live() {
        errand
    } else {
        errand.simulate(&tracking, now)
    };
    TaskTracker::bind(errand, tracking)
}

/// Current status of a delivery, reconciled with its tracking reference.
pub async fn errand_status(
    state: &AppState,
    id: &DeliveryId,
    tracking: Option<TaskReference>,
    now: DateTime<Utc>,
) -> Errand {
    let errand = match state.delivery.delivery_status(id).await {
        Ok(errand) => errand,
        Err(e) => {
            warn!(delivery_id = %id, error = %e, "Delivery status unavailable, using canned errand");
            canned_errand(id.clone())
        }
    };

    let Some(tracking) = tracking else {
        return errand;
    };

    let errand = if state.delivery.is_live() {
        errand
    } else {
        errand.simulate(&tracking, now)
    };
    state.tracker.attach_tracking(errand, tracking).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::{DeliveryError, DeliveryProvider, SimulatedDeliveryProvider};
    use crate::tracking::testing::FakeRunner;
    use async_trait::async_trait;
    use chrono::Duration;
    use concierge_core::TaskProvider;
    use std::sync::Arc;

    fn request() -> DeliveryRequest {
        DeliveryRequest {
            pickup_address: "Duane Reade, 250 Broadway".to_string(),
            dropoff_address: "10 Lincoln Center Plaza".to_string(),
            items: "Umbrella".to_string(),
        }
    }

    fn simulated_state() -> Arc<AppState> {
        AppState::new(FakeRunner::unconfigured(), Arc::new(SimulatedDeliveryProvider))
    }

    /// Live provider stand-in that reports a fixed stage or fails.
    struct StaticCourier(Option<ErrandStage>);

    #[async_trait]
    impl DeliveryProvider for StaticCourier {
        fn is_live(&self) -> bool {
            true
        }

        async fn create_delivery(&self, request: &DeliveryRequest) -> Result<Errand, DeliveryError> {
            let id = DeliveryId::new("concierge-1");
            self.delivery_status(&id).await.map(|e| e.for_request(request))
        }

        async fn delivery_status(&self, id: &DeliveryId) -> Result<Errand, DeliveryError> {
            let stage = self
                .0
                .ok_or(DeliveryError::Status(reqwest::StatusCode::BAD_GATEWAY))?;
            let mut errand = canned_errand(id.clone());
            errand.status = stage;
            Ok(errand)
        }
    }

    #[tokio::test]
    async fn test_create_simulated_errand_is_tracked_locally() {
        let state = simulated_state();
        let now = Utc::now();
        let errand = create_errand(&state, request(), now).await;

        assert_eq!(errand.status, ErrandStage::Assigned);
        assert_eq!(errand.items, "Umbrella");
        let tracking = errand.tracking.unwrap();
        assert_eq!(tracking.kind(), TaskKind::DeliveryWatch);
        assert_eq!(tracking.provider(), TaskProvider::Local);
        assert_eq!(tracking.status(), TaskStatus::Running);
    }

    #[tokio::test]
    async fn test_simulated_errand_progresses_with_time() {
        let state = simulated_state();
        let start = Utc::now();
        let tracking = TaskReference::local(TaskKind::DeliveryWatch, start);
        let id = DeliveryId::new("errand-1");

        let errand =
            errand_status(&state, &id, Some(tracking.clone()), start + Duration::seconds(30)).await;
        assert_eq!(errand.status, ErrandStage::PickingUp);
        assert_eq!(errand.tracking.unwrap().status(), TaskStatus::Running);

        let errand =
            errand_status(&state, &id, Some(tracking), start + Duration::seconds(150)).await;
        assert_eq!(errand.status, ErrandStage::Delivered);
        assert_eq!(errand.eta_minutes, 0);
        assert_eq!(errand.tracking.unwrap().status(), TaskStatus::Success);
    }

    #[tokio::test]
    async fn test_untracked_status_is_plain_provider_data() {
        let state = simulated_state();
        let errand = errand_status(&state, &DeliveryId::new("errand-9"), None, Utc::now()).await;

        assert_eq!(errand.status, ErrandStage::PickingUp);
        assert!(errand.tracking.is_none());
    }

    #[tokio::test]
    async fn test_live_delivery_completes_local_tracking() {
        let state = AppState::new(
            FakeRunner::unconfigured(),
            Arc::new(StaticCourier(Some(ErrandStage::Delivered))),
        );
        let tracking = TaskReference::local(TaskKind::DeliveryWatch, Utc::now());

        let errand =
            errand_status(&state, &DeliveryId::new("concierge-1"), Some(tracking), Utc::now())
                .await;
        assert_eq!(errand.tracking.unwrap().status(), TaskStatus::Success);
    }

    #[tokio::test]
    async fn test_provider_failure_degrades_to_canned_errand() {
        let state = AppState::new(FakeRunner::unconfigured(), Arc::new(StaticCourier(None)));

        let errand = create_errand(&state, request(), Utc::now()).await;
        assert_eq!(errand.pickup_address, "Duane Reade, 250 Broadway");
        assert!(errand.tracking.is_some());

        let errand = errand_status(&state, &DeliveryId::new("concierge-1"), None, Utc::now()).await;
        assert_eq!(errand.id.as_str(), "concierge-1");
    }
}
