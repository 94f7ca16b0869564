//! Job runner configuration.

use std::time::Duration;

use concierge_core::{JobId, TaskKind};

/// Default Blaxel control API.
pub const DEFAULT_API_URL: &str = "https://api.blaxel.ai/v0";

/// Bound on every call to the job runner.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Job runner configuration.
#[derive(Debug, Clone)]
pub struct JobRunnerConfig {
    /// Base URL of the job-execution API.
    pub api_url: String,

    /// Bearer credential. Remote tracking is disabled without one.
    pub api_key: Option<String>,

    /// Workspace sent as `X-Blaxel-Workspace`, if any.
    pub workspace: Option<String>,

    /// Job definition for [`TaskKind::DeliveryWatch`].
    pub delivery_watch_job_id: Option<JobId>,

    /// Job definition for [`TaskKind::RideDelaySimulation`].
    pub ride_delay_job_id: Option<JobId>,

    /// Request timeout.
    pub timeout: Duration,
}

impl JobRunnerConfig {
    /// Job definition id for `kind`, if one is configured.
    pub fn job_id(&self, kind: TaskKind) -> Option<&JobId> {
        let job_id = match kind {
            TaskKind::DeliveryWatch => self.delivery_watch_job_id.as_ref(),
            TaskKind::RideDelaySimulation => self.ride_delay_job_id.as_ref(),
        };
        job_id.filter(|id| !id.as_str().trim().is_empty())
    }

    /// Credential, if one is configured.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// True iff both a credential and a job definition exist for `kind`.
    pub fn is_configured(&self, kind: TaskKind) -> bool {
        self.api_key().is_some() && self.job_id(kind).is_some()
    }
}

impl Default for JobRunnerConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            workspace: None,
            delivery_watch_job_id: None,
            ride_delay_job_id: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_by_default() {
        let config = JobRunnerConfig::default();
        assert!(!config.is_configured(TaskKind::DeliveryWatch));
        assert!(!config.is_configured(TaskKind::RideDelaySimulation));
    }

    #[test]
    fn test_configured_per_kind() {
        let config = JobRunnerConfig {
            api_key: Some("secret".to_string()),
            ride_delay_job_id: Some(JobId::new("mock-uber-delay")),
            ..Default::default()
        };
        assert!(config.is_configured(TaskKind::RideDelaySimulation));
        assert!(!config.is_configured(TaskKind::DeliveryWatch));
    }

    #[test]
    fn test_blank_values_count_as_absent() {
        let config = JobRunnerConfig {
            api_key: Some("  ".to_string()),
            delivery_watch_job_id: Some(JobId::new("doordash-watch-ts")),
            ride_delay_job_id: Some(JobId::new("")),
            ..Default::default()
        };
        assert!(!config.is_configured(TaskKind::DeliveryWatch));
        assert!(config.job_id(TaskKind::RideDelaySimulation).is_none());
    }
}
