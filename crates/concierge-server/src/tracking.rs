//! Task tracking protocol.
//!
//! Ties a domain action (create a delivery, book a ride) to a
//! [`TaskReference`]: start the long-running task, attach the reference to the
//! entity, and on each poll refresh it and reconcile the two statuses.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info};

use concierge_core::{
    decode_tracking_params, has_tracking_params, TaskKind, TaskReference, TaskStatus,
};
use concierge_jobs::JobRunner;

/// A domain entity that can carry a task reference.
pub trait TrackedEntity {
    /// True once the entity's own status has reached its final value.
    fn is_finished(&self) -> bool;

    /// Let the tracking status drive the entity's own status.
    fn reconcile(&mut self, tracking: &TaskReference);

    /// Store the reference on the entity.
    fn set_tracking(&mut self, tracking: TaskReference);
}

/// Starts and reconciles tracked tasks.
#[derive(Clone)]
pub struct TaskTracker {
    runner: Arc<dyn JobRunner>,
}

impl TaskTracker {
    pub fn new(runner: Arc<dyn JobRunner>) -> Self {
        Self { runner }
    }

    /// Start tracking a task of `kind`.
    ///
    /// Tries the remote job runner first and falls back to a local reference
    /// when it is unconfigured or unavailable, so a reference is always returned.
    pub async fn start_tracking(
        &self,
        kind: TaskKind,
        payload: Value,
        now: DateTime<Utc>,
    ) -> TaskReference {
        if let Some(reference) = self.runner.start(kind, payload).await {
            return reference;
        }

        let reference = TaskReference::local(kind, now);
        info!(
            kind = %kind,
            execution_id = %reference.execution_id(),
            "Tracking locally"
        );
        reference
    }

    /// Refresh `reference` and attach it to `entity`.
    pub async fn attach_tracking<E: TrackedEntity>(
        &self,
        entity: E,
        reference: TaskReference,
    ) -> E {
        let reference = self.runner.refresh(reference).await;
        Self::bind(entity, reference)
    }

    /// Attach a reference without refreshing it (e.g. one that was just started).
    ///
    /// A local reference is forced to success once the entity has finished on
    /// its own, so polling stops even though nothing ever completes the
    /// simulation.
    pub fn bind<E: TrackedEntity>(mut entity: E, mut reference: TaskReference) -> E {
        entity.reconcile(&reference);
        if reference.is_local() && entity.is_finished() {
            reference.observe(TaskStatus::Success);
        }
        entity.set_tracking(reference);
        entity
    }
}

/// Decode a tracking reference from request query parameters.
///
/// Missing or tampered parameters yield `None`: the request is then served as
/// untracked rather than rejected.
pub fn tracking_from_params(params: &HashMap<String, String>) -> Option<TaskReference> {
    if !has_tracking_params(params) {
        return None;
    }

    match decode_tracking_params(params) {
        Ok(reference) => Some(reference),
        Err(e) => {
            debug!(error = %e, "Ignoring malformed tracking parameters");
            None
        }
    }
}
