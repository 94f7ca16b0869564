//! Ride status assembly for the mock ride service.
//!
//! There is no live ride provider: a ride's stage is a pure function of the
//! time since its tracking reference was created, so every poll (from any
//! server instance) computes the same answer.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::json;

use concierge_core::{RideId, RideStage, Stage, StageSchedule, TaskKind, TaskReference, TaskStatus};

use crate::state::AppState;
use crate::tracking::{TaskTracker, TrackedEntity};

const RIDE_STAGES: [Stage<RideStage>; 4] = [
    Stage::new(RideStage::DriverAssigned, 0),
    Stage::new(RideStage::EnRoute, 25),
    Stage::new(RideStage::Arriving, 55),
    Stage::new(RideStage::Complete, 80),
];

const ROUTE_COORDINATES: [[f64; 2]; 7] = [
    [-73.9976, 40.7243],
    [-74.006, 40.7258],
    [-74.0099, 40.731],
    [-74.0089, 40.742],
    [-74.002, 40.756],
    [-73.987, 40.768],
    [-73.9835, 40.7725],
];

const DRIVER_PATH: [[f64; 2]; 8] = [
    [-74.006, 40.726],
    [-74.0052, 40.731],
    [-74.0038, 40.737],
    [-74.002, 40.742],
    [-73.998, 40.749],
    [-73.9915, 40.759],
    [-73.987, 40.768],
    [-73.9838, 40.7715],
];

const DEFAULT_PICKUP: &str = "Broadway & Spring St";
const DEFAULT_DROPOFF: &str = "David Geffen Hall";
const DEFAULT_RIDE_TYPE: &str = "UberX";
const DEFAULT_VEHICLE: &str = "Black Tesla Model Y";
const DEFAULT_FARE: &str = "$24";
const DRIVER_NAME: &str = "Marcus";
const LICENSE_PLATE: &str = "T649-82C";

pub fn ride_schedule() -> StageSchedule<RideStage> {
    StageSchedule::new(RIDE_STAGES.to_vec()).expect("ride schedule is non-empty")
}

/// A ride as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    pub id: RideId,
    pub driver_name: String,
    pub vehicle: String,
    pub license_plate: String,
    pub eta_minutes: u32,
    pub fare: String,
    pub status: RideStage,
    pub pickup: String,
    pub dropoff: String,
    pub ride_type: String,
    pub route_coordinates: Vec<[f64; 2]>,
    pub driver_location: [f64; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking: Option<TaskReference>,
}

impl TrackedEntity for Ride {
    fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    fn reconcile(&mut self, tracking: &TaskReference) {
        if tracking.status() == TaskStatus::Success {
            self.status = RideStage::Complete;
            self.eta_minutes = RideStage::Complete.eta_minutes();
        }
    }

    fn set_tracking(&mut self, tracking: TaskReference) {
        self.tracking = Some(tracking);
    }
}

/// What the client remembers about a ride between polls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RideDetails {
    pub pickup: Option<String>,
    pub dropoff: Option<String>,
    pub ride_type: Option<String>,
    pub vehicle: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Vehicle for a ride type, keeping one already shown to the user.
pub fn pick_vehicle(ride_type: Option<&str>, existing: Option<&str>) -> String {
    if let Some(vehicle) = non_blank(existing) {
        return vehicle.to_string();
    }
    match ride_type {
        Some("UberXL") => "White Chevrolet Suburban",
        Some("UberBlack") => "Black Mercedes S-Class",
        Some("UberComfort") => "Blue Tesla Model 3",
        _ => DEFAULT_VEHICLE,
    }
    .to_string()
}

/// Driver position along the fixed path after `elapsed`.
pub fn driver_location(schedule: &StageSchedule<RideStage>, elapsed: Duration) -> [f64; 2] {
    let progress = schedule.progress(elapsed);
    let index = ((progress * DRIVER_PATH.len() as f64).floor() as usize).min(DRIVER_PATH.len() - 1);
    DRIVER_PATH[index]
}

/// Assemble a ride snapshot `elapsed` after it was booked.
fn build_ride(id: RideId, details: &RideDetails, elapsed: Duration) -> Ride {
    let schedule = ride_schedule();
    let status = schedule.stage_at(elapsed);
    let ride_type = non_blank(details.ride_type.as_deref());

    Ride {
        id,
        driver_name: DRIVER_NAME.to_string(),
        vehicle: pick_vehicle(ride_type, details.vehicle.as_deref()),
        license_plate: LICENSE_PLATE.to_string(),
        eta_minutes: status.eta_minutes(),
        fare: DEFAULT_FARE.to_string(),
        status,
        pickup: non_blank(details.pickup.as_deref())
            .unwrap_or(DEFAULT_PICKUP)
            .to_string(),
        dropoff: non_blank(details.dropoff.as_deref())
            .unwrap_or(DEFAULT_DROPOFF)
            .to_string(),
        ride_type: ride_type.unwrap_or(DEFAULT_RIDE_TYPE).to_string(),
        route_coordinates: ROUTE_COORDINATES.to_vec(),
        driver_location: driver_location(&schedule, elapsed),
        tracking: None,
    }
}

/// Book a ride and start its delay simulation.
pub async fn book_ride(state: &AppState, details: RideDetails, now: DateTime<Utc>) -> Ride {
    let id = RideId::generate();
    let ride = build_ride(id, &details, Duration::zero());

    let payload = json!({
        "ride_id": ride.id,
        "pickup": ride.pickup,
        "dropoff": ride.dropoff,
        "ride_type": ride.ride_type,
        "stage_schedule": ride_schedule(),
    });
    let tracking = state
        .tracker
        .start_tracking(TaskKind::RideDelaySimulation, payload, now)
        .await;

    TaskTracker::bind(ride, tracking)
}

/// Current status of a ride, reconciled with its tracking reference.
///
/// Untracked polls have no start time and read as just booked.
pub async fn ride_status(
    state: &AppState,
    id: RideId,
    details: &RideDetails,
    tracking: Option<TaskReference>,
    now: DateTime<Utc>,
) -> Ride {
    let elapsed = tracking
        .as_ref()
        .map_or_else(Duration::zero, |tracking| tracking.elapsed(now));
    let ride = build_ride(id, details, elapsed);

    match tracking {
        Some(tracking) => state.tracker.attach_tracking(ride, tracking).await,
        None => ride,
    }
}
