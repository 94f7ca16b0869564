//! HTTP client for the Blaxel job-execution API.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Method, RequestBuilder};
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use url::Url;

use concierge_core::{
    normalize_status, ExecutionId, JobId, TaskKind, TaskProvider, TaskReference,
};

use crate::config::JobRunnerConfig;
use crate::error::JobClientError;
use crate::snapshot::{ExecutionListing, ExecutionSnapshot};
use crate::JobRunner;

/// Page size used when scanning an execution listing.
const LIST_LIMIT: &str = "100";

/// Client for the Blaxel jobs API.
pub struct BlaxelClient {
    inner: reqwest::Client,
    base_url: Url,
    config: JobRunnerConfig,
}

impl BlaxelClient {
    /// Create a new client. Every request is bounded by `config.timeout`.
    pub fn new(config: JobRunnerConfig) -> Result<Self, JobClientError> {
        let inner = reqwest::Client::builder().timeout(config.timeout).build()?;
        let base_url = Url::parse(config.api_url.trim_end_matches('/'))?;
        if base_url.cannot_be_a_base() {
            return Err(JobClientError::Url(config.api_url.clone()));
        }

        Ok(Self {
            inner,
            base_url,
            config,
        })
    }

    /// `{base}/jobs/{job_id}/executions[/{execution_id}]`
    fn executions_url(
        &self,
        job_id: &JobId,
        execution_id: Option<&ExecutionId>,
    ) -> Result<Url, JobClientError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| JobClientError::Url(self.config.api_url.clone()))?;
            segments
                .pop_if_empty()
                .extend(["jobs", job_id.as_str(), "executions"]);
            if let Some(execution_id) = execution_id {
                segments.push(execution_id.as_str());
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mut builder = self.inner.request(method, url);
        if let Some(api_key) = self.config.api_key() {
            builder = builder.bearer_auth(api_key);
        }
        if let Some(workspace) = self.config.workspace.as_deref() {
            builder = builder.header("X-Blaxel-Workspace", workspace);
        }
        builder
    }

    async fn send_json(&self, builder: RequestBuilder) -> Result<Value, JobClientError> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(JobClientError::Status {
                status,
                url: response.url().to_string(),
            });
        }
        Ok(response.json().await?)
    }

    /// Create one execution of the job definition configured for `kind`.
    pub async fn create_execution(
        &self,
        kind: TaskKind,
        payload: Value,
    ) -> Result<TaskReference, JobClientError> {
        let job_id = match (self.config.api_key(), self.config.job_id(kind)) {
            (Some(_), Some(job_id)) => job_id.clone(),
            _ => return Err(JobClientError::NotConfigured(kind)),
        };

        let url = self.executions_url(&job_id, None)?;
        debug!(url = %url, kind = %kind, "Creating execution");

        let body = json!({ "tasks": [payload] });
        let value = self
            .send_json(self.request(Method::POST, url).json(&body))
            .await?;

        let snapshot = ExecutionSnapshot::from_value(&value).ok_or_else(|| {
            JobClientError::UnrecognizedResponse("no execution id in create response".to_string())
        })?;
        let status = normalize_status(snapshot.status.as_deref().unwrap_or_default());

        TaskReference::remote(kind, job_id, snapshot.execution_id, status, Utc::now())
            .map_err(|e| JobClientError::UnrecognizedResponse(e.to_string()))
    }

    /// Fetch one execution directly by id.
    pub async fn fetch_execution(
        &self,
        job_id: &JobId,
        execution_id: &ExecutionId,
    ) -> Result<ExecutionSnapshot, JobClientError> {
        let url = self.executions_url(job_id, Some(execution_id))?;
        debug!(url = %url, "Fetching execution");

        let value = self.send_json(self.request(Method::GET, url)).await?;
        ExecutionSnapshot::from_value(&value)
            .filter(|snapshot| &snapshot.execution_id == execution_id)
            .ok_or_else(|| JobClientError::ExecutionNotFound(execution_id.to_string()))
    }

    /// List the most recent executions of a job.
    pub async fn list_executions(&self, job_id: &JobId) -> Result<ExecutionListing, JobClientError> {
        let mut url = self.executions_url(job_id, None)?;
        url.query_pairs_mut()
            .append_pair("limit", LIST_LIMIT)
            .append_pair("offset", "0");
        debug!(url = %url, "Listing executions");

        let value = self.send_json(self.request(Method::GET, url)).await?;
        ExecutionListing::from_value(value).ok_or_else(|| {
            JobClientError::UnrecognizedResponse("unknown execution listing shape".to_string())
        })
    }

    /// Find an execution, falling back to the listing when the direct fetch fails.
    ///
    /// A freshly created execution may not be addressable by id yet.
    pub async fn find_execution(
        &self,
        job_id: &JobId,
        execution_id: &ExecutionId,
    ) -> Result<ExecutionSnapshot, JobClientError> {
        match self.fetch_execution(job_id, execution_id).await {
            Ok(snapshot) => return Ok(snapshot),
            Err(e) => {
                debug!(
                    execution_id = %execution_id,
                    error = %e,
                    "Direct execution fetch failed, scanning listing"
                );
            }
        }

        self.list_executions(job_id)
            .await?
            .find(execution_id)
            .ok_or_else(|| JobClientError::ExecutionNotFound(execution_id.to_string()))
    }
}

#[async_trait]
impl JobRunner for BlaxelClient {
    fn is_configured(&self, kind: TaskKind) -> bool {
        self.config.is_configured(kind)
    }

    async fn start(&self, kind: TaskKind, payload: Value) -> Option<TaskReference> {
        if !self.is_configured(kind) {
            debug!(kind = %kind, "Job runner not configured");
            return None;
        }

        match self.create_execution(kind, payload).await {
            Ok(reference) => {
                info!(
                    kind = %kind,
                    execution_id = %reference.execution_id(),
                    status = %reference.status(),
                    "Remote job started"
                );
                Some(reference)
            }
            Err(e) => {
                warn!(kind = %kind, error = %e, "Failed to start remote job");
                None
            }
        }
    }

    async fn refresh(&self, reference: TaskReference) -> TaskReference {
        if reference.provider() != TaskProvider::Remote || reference.is_terminal() {
            return reference;
        }
        let Some(job_id) = reference.job_id().cloned() else {
            return reference;
        };

        match self.find_execution(&job_id, reference.execution_id()).await {
            Ok(ExecutionSnapshot {
                status: Some(raw), ..
            }) => reference.with_observed(normalize_status(&raw)),
            Ok(_) => reference,
            Err(e) => {
                warn!(
                    execution_id = %reference.execution_id(),
                    error = %e,
                    "Execution status unavailable, keeping last known status"
                );
                reference
            }
        }
    }
}
