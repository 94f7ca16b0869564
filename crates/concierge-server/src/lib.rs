//! Concierge Server Library
//!
//! HTTP surface for errands (deliveries) and rides, plus the task tracking
//! protocol that hands long-running work to a remote job runner (or a local
//! time-based simulation) and reconciles it on every client poll. The server
//! keeps no tracking state: the client carries each task reference between
//! requests.

pub mod config;
pub mod delivery;
pub mod errand;
pub mod http;
pub mod ride;
pub mod shutdown;
pub mod state;
pub mod tracking;

pub use config::{Args, ServerConfig};
pub use errand::Errand;
pub use ride::Ride;
pub use state::AppState;
pub use tracking::{TaskTracker, TrackedEntity};
