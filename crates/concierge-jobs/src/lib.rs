//! Remote job runner client for Concierge.
//!
//! Starts long-running jobs on the Blaxel job-execution API and reads back
//! their latest execution snapshot. Every operation here degrades instead of
//! failing: a start that cannot reach the runner yields `None` so the caller
//! can fall back to local simulation, and a refresh that cannot find the
//! execution yields the reference unchanged.

pub mod client;
pub mod config;
pub mod error;
pub mod snapshot;

use async_trait::async_trait;
use concierge_core::{TaskKind, TaskReference};

pub use client::BlaxelClient;
pub use config::JobRunnerConfig;
pub use error::JobClientError;
pub use snapshot::ExecutionSnapshot;

/// A backend able to start and refresh tracked jobs.
#[async_trait]
pub trait JobRunner: Send + Sync {
    /// True if a credential and a job definition exist for `kind`.
    fn is_configured(&self, kind: TaskKind) -> bool;

    /// Start a job of `kind` carrying `payload` as its single task.
    ///
    /// Returns `None` when unconfigured or when the runner could not be
    /// reached; never an error.
    async fn start(&self, kind: TaskKind, payload: serde_json::Value) -> Option<TaskReference>;

    /// Fetch the latest status for `reference`.
    ///
    /// Local and terminal references are returned untouched, and so is any
    /// remote reference whose execution cannot be found right now.
    async fn refresh(&self, reference: TaskReference) -> TaskReference;
}
