//! Shared application state.

use std::sync::Arc;

use concierge_jobs::JobRunner;

use crate::delivery::DeliveryProvider;
use crate::tracking::TaskTracker;

/// Shared application state.
///
/// Holds only collaborators. Tracking state is never kept here: every task
/// reference travels with the client.
pub struct AppState {
    /// Starts and reconciles long-running tasks.
    pub tracker: TaskTracker,

    /// Courier backing errands.
    pub delivery: Arc<dyn DeliveryProvider>,
}

impl AppState {
    /// Create a new AppState wrapped in Arc.
    pub fn new(runner: Arc<dyn JobRunner>, delivery: Arc<dyn DeliveryProvider>) -> Arc<Self> {
        Arc::new(Self {
            tracker: TaskTracker::new(runner),
            delivery,
        })
    }
}
