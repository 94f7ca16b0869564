//! Concierge Core Tracking Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Network/HTTP
//! - Job runner APIs
//! - Runtime specifics
//!
//! Everything needed to describe, encode and advance a long-running task
//! reference lives here, so the server and the job client agree on one model.

pub mod error;
pub mod ids;
pub mod query;
pub mod schedule;
pub mod stage;
pub mod status;
pub mod task;

// Re-export commonly used types
pub use error::CoreError;
pub use ids::{DeliveryId, ExecutionId, JobId, RideId};
pub use query::{
    decode_tracking_params, has_tracking_params, parse_tracking_params, parse_tracking_query,
    serialize_tracking_query,
};
pub use schedule::{Stage, StageSchedule};
pub use stage::{ErrandStage, RideStage};
pub use status::{normalize_status, TaskStatus};
pub use task::{TaskKind, TaskProvider, TaskReference};
