//! Server configuration.

use std::time::Duration;

use clap::Parser;

use concierge_core::JobId;
use concierge_jobs::config::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
use concierge_jobs::JobRunnerConfig;

use crate::delivery::DoorDashConfig;

/// Concierge server with long-running task tracking.
#[derive(Parser, Debug, Clone)]
#[command(name = "concierge-server", about = "Concierge HTTP server")]
pub struct Args {
    /// HTTP server address
    #[arg(long, env = "CONCIERGE_HTTP_ADDR", default_value = "127.0.0.1:3000")]
    pub http_addr: String,

    /// Blaxel API base URL
    #[arg(long, env = "BLAXEL_API_URL", default_value = DEFAULT_API_URL)]
    pub blaxel_api_url: String,

    /// Blaxel API key
    #[arg(long, env = "BLAXEL_API_KEY", hide_env_values = true)]
    pub blaxel_api_key: Option<String>,

    /// Blaxel workspace
    #[arg(long, env = "BLAXEL_WORKSPACE")]
    pub blaxel_workspace: Option<String>,

    /// Job definition watching DoorDash deliveries
    #[arg(long, env = "BLAXEL_DOORDASH_WATCH_JOB_ID")]
    pub doordash_watch_job_id: Option<String>,

    /// Job definition simulating ride delays
    #[arg(long, env = "BLAXEL_MOCK_UBER_DELAY_JOB_ID")]
    pub uber_delay_job_id: Option<String>,

    /// DoorDash developer id
    #[arg(long, env = "DOORDASH_DEVELOPER_ID")]
    pub doordash_developer_id: Option<String>,

    /// DoorDash key id
    #[arg(long, env = "DOORDASH_KEY_ID")]
    pub doordash_key_id: Option<String>,

    /// DoorDash signing secret (base64)
    #[arg(long, env = "DOORDASH_SIGNING_SECRET", hide_env_values = true)]
    pub doordash_signing_secret: Option<String>,

    /// Timeout for every upstream call, in seconds
    #[arg(long, env = "CONCIERGE_UPSTREAM_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub upstream_timeout_secs: u64,
}

/// Resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP server bind address.
    pub http_addr: String,

    /// Remote job runner settings.
    pub jobs: JobRunnerConfig,

    /// DoorDash Drive settings.
    pub doordash: DoorDashConfig,
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        let timeout = Duration::from_secs(args.upstream_timeout_secs);

        Self {
            http_addr: args.http_addr,
            jobs: JobRunnerConfig {
                api_url: args.blaxel_api_url,
                api_key: present(args.blaxel_api_key),
                workspace: present(args.blaxel_workspace),
                delivery_watch_job_id: present(args.doordash_watch_job_id).map(JobId::new),
                ride_delay_job_id: present(args.uber_delay_job_id).map(JobId::new),
                timeout,
            },
            doordash: DoorDashConfig {
                developer_id: present(args.doordash_developer_id),
                key_id: present(args.doordash_key_id),
                signing_secret: present(args.doordash_signing_secret),
                timeout,
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_core::TaskKind;

    #[test]
    fn test_defaults_run_fully_local() {
        let args = Args::try_parse_from(["concierge-server"]).unwrap();
        let config = ServerConfig::from(args);

        assert_eq!(config.jobs.timeout, Duration::from_secs(30));
        assert!(!config.doordash.is_configured());
    }

    #[test]
    fn test_blank_flags_are_absent() {
        let args = Args::try_parse_from([
            "concierge-server",
            "--blaxel-api-key",
            "key",
            "--uber-delay-job-id",
            "mock-uber-delay",
            "--doordash-watch-job-id",
            " ",
        ])
        .unwrap();
        let config = ServerConfig::from(args);

        assert!(config.jobs.is_configured(TaskKind::RideDelaySimulation));
        assert!(!config.jobs.is_configured(TaskKind::DeliveryWatch));
    }
}
