//! User-visible stages of the tracked domain entities.

use serde::Serialize;

/// Stage of an errand (delivery) as shown to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrandStage {
    #[default]
    Assigned,
    PickingUp,
    EnRoute,
    Delivered,
}

impl ErrandStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// Minutes until drop-off shown for this stage when no live ETA exists.
    pub fn eta_minutes(&self) -> i64 {
        match self {
            Self::Assigned => 35,
            Self::PickingUp => 28,
            Self::EnRoute => 12,
            Self::Delivered => 0,
        }
    }
}

/// Stage of a ride as shown to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RideStage {
    #[default]
    DriverAssigned,
    EnRoute,
    Arriving,
    Complete,
}

impl RideStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Minutes until pickup (or arrival) shown for this stage.
    pub fn eta_minutes(&self) -> u32 {
        match self {
            Self::DriverAssigned => 4,
            Self::EnRoute => 3,
            Self::Arriving => 1,
            Self::Complete => 0,
        }
    }
}
