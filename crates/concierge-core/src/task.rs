//! Task references: the client-carried handle for one long-running operation.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::{CoreError, ExecutionId, JobId, TaskStatus};

/// The two kinds of long-running work Concierge tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TaskKind {
    /// Watch a DoorDash delivery until it is delivered or cancelled.
    #[serde(rename = "doordash_delivery_watch")]
    DeliveryWatch,
    /// Walk a mock ride through its stage schedule.
    #[serde(rename = "mock_uber_delay")]
    RideDelaySimulation,
}

impl TaskKind {
    /// All kinds, in wire order.
    pub const ALL: [TaskKind; 2] = [Self::DeliveryWatch, Self::RideDelaySimulation];

    /// Wire literal for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeliveryWatch => "doordash_delivery_watch",
            Self::RideDelaySimulation => "mock_uber_delay",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CoreError::UnknownKind(s.to_string()))
    }
}

/// Backend that resolves a reference's status on refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TaskProvider {
    /// Remote job runner (Blaxel).
    #[serde(rename = "blaxel")]
    Remote,
    /// In-process, time-based simulation.
    #[serde(rename = "local")]
    Local,
}

impl TaskProvider {
    /// All providers, in wire order.
    pub const ALL: [TaskProvider; 2] = [Self::Remote, Self::Local];

    /// Wire literal for this provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Remote => "blaxel",
            Self::Local => "local",
        }
    }
}

impl fmt::Display for TaskProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskProvider {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|provider| provider.as_str() == s)
            .ok_or_else(|| CoreError::UnknownProvider(s.to_string()))
    }
}

/// Handle identifying one long-running operation and its last known status.
///
/// Invariants, enforced by every constructor:
/// - a `Remote` reference always has a non-empty job id,
/// - a `Local` reference never has one,
/// - the execution id is non-empty and never changes,
/// - the status never regresses (see [`TaskStatus::advance`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskReference {
    kind: TaskKind,
    provider: TaskProvider,
    execution_id: ExecutionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    job_id: Option<JobId>,
    status: TaskStatus,
    created_at: DateTime<Utc>,
}

impl TaskReference {
    /// Reference for an execution started on the remote job runner.
    pub fn remote(
        kind: TaskKind,
        job_id: JobId,
        execution_id: ExecutionId,
        status: TaskStatus,
        created_at: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        Self::from_parts(
            kind,
            TaskProvider::Remote,
            execution_id,
            Some(job_id),
            status,
            created_at,
        )
    }

    /// Reference for a locally simulated task, already running.
    ///
    /// The execution id is synthesized as `local-<kind>-<millis>`.
    pub fn local(kind: TaskKind, now: DateTime<Utc>) -> Self {
        let created_at = now.trunc_subsecs(3);
        Self {
            kind,
            provider: TaskProvider::Local,
            execution_id: ExecutionId::new(format!(
                "local-{}-{}",
                kind,
                created_at.timestamp_millis()
            )),
            job_id: None,
            status: TaskStatus::Running,
            created_at,
        }
    }

    /// Assemble a reference from its parts, checking every invariant.
    pub fn from_parts(
        kind: TaskKind,
        provider: TaskProvider,
        execution_id: ExecutionId,
        job_id: Option<JobId>,
        status: TaskStatus,
        created_at: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        if execution_id.as_str().is_empty() {
            return Err(CoreError::InvalidInput("empty execution id".to_string()));
        }

        match (provider, &job_id) {
            (TaskProvider::Remote, Some(job)) if !job.as_str().is_empty() => {}
            (TaskProvider::Remote, _) => {
                return Err(CoreError::InvalidInput(
                    "remote reference requires a job id".to_string(),
                ));
            }
            (TaskProvider::Local, None) => {}
            (TaskProvider::Local, Some(_)) => {
                return Err(CoreError::InvalidInput(
                    "local reference cannot carry a job id".to_string(),
                ));
            }
        }

        Ok(Self {
            kind,
            provider,
            execution_id,
            job_id,
            status,
            created_at,
        })
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    pub fn provider(&self) -> TaskProvider {
        self.provider
    }

    pub fn execution_id(&self) -> &ExecutionId {
        &self.execution_id
    }

    pub fn job_id(&self) -> Option<&JobId> {
        self.job_id.as_ref()
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_local(&self) -> bool {
        self.provider == TaskProvider::Local
    }

    /// Check if the referenced task has finished.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Time since the task was created, never negative.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        (now - self.created_at).max(Duration::zero())
    }

    /// Fold an observed status into the reference without regressing it.
    pub fn observe(&mut self, observed: TaskStatus) {
        self.status = self.status.advance(observed);
    }

    /// Builder form of [`observe`](Self::observe).
    pub fn with_observed(mut self, observed: TaskStatus) -> Self {
        self.observe(observed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_760_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_local_reference() {
        let reference = TaskReference::local(TaskKind::RideDelaySimulation, at(0));

        assert_eq!(reference.provider(), TaskProvider::Local);
        assert_eq!(reference.status(), TaskStatus::Running);
        assert!(reference.job_id().is_none());
        assert_eq!(
            reference.execution_id().as_str(),
            "local-mock_uber_delay-1760000000000"
        );
    }

    #[test]
    fn test_remote_requires_job_id() {
        let err = TaskReference::from_parts(
            TaskKind::DeliveryWatch,
            TaskProvider::Remote,
            ExecutionId::new("E1"),
            None,
            TaskStatus::Queued,
            at(0),
        );
        assert!(err.is_err());

        let err = TaskReference::remote(
            TaskKind::DeliveryWatch,
            JobId::new(""),
            ExecutionId::new("E1"),
            TaskStatus::Queued,
            at(0),
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_local_rejects_job_id() {
        let err = TaskReference::from_parts(
            TaskKind::RideDelaySimulation,
            TaskProvider::Local,
            ExecutionId::new("local-mock_uber_delay-1"),
            Some(JobId::new("job")),
            TaskStatus::Running,
            at(0),
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_observe_never_regresses() {
        let mut reference = TaskReference::local(TaskKind::DeliveryWatch, at(0));
        reference.observe(TaskStatus::Queued);
        assert_eq!(reference.status(), TaskStatus::Running);

        reference.observe(TaskStatus::Success);
        reference.observe(TaskStatus::Failed);
        assert_eq!(reference.status(), TaskStatus::Success);
    }

    #[test]
    fn test_elapsed_clamps_clock_skew() {
        let reference = TaskReference::local(TaskKind::RideDelaySimulation, at(10));
        assert_eq!(reference.elapsed(at(40)), Duration::seconds(30));
        assert_eq!(reference.elapsed(at(0)), Duration::zero());
    }

    #[test]
    fn test_json_shape() {
        let reference = TaskReference::local(TaskKind::RideDelaySimulation, at(0));
        let json = serde_json::to_value(&reference).unwrap();

        assert_eq!(json["kind"], "mock_uber_delay");
        assert_eq!(json["provider"], "local");
        assert_eq!(json["status"], "running");
        assert!(json.get("jobId").is_none());
        assert!(json["executionId"].as_str().unwrap().starts_with("local-"));
    }
}
