//! Query-string codec for task references.
//!
//! The server keeps no tracking state between requests. Every response that
//! carries a [`TaskReference`] also hands the client a query string, and the
//! next poll sends it back. Anything that fails to decode is treated as
//! "not tracked" by callers, never as a request error.

use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::HashMap;
use url::form_urlencoded;

use crate::{CoreError, ExecutionId, JobId, TaskKind, TaskProvider, TaskReference, TaskStatus};

pub const PARAM_KIND: &str = "trackingKind";
pub const PARAM_PROVIDER: &str = "trackingProvider";
pub const PARAM_EXECUTION_ID: &str = "trackingExecutionId";
pub const PARAM_STATUS: &str = "trackingStatus";
pub const PARAM_CREATED_AT: &str = "trackingCreatedAt";
pub const PARAM_JOB_ID: &str = "trackingJobId";

/// Every parameter name owned by the tracking codec.
pub const TRACKING_PARAMS: [&str; 6] = [
    PARAM_KIND,
    PARAM_PROVIDER,
    PARAM_EXECUTION_ID,
    PARAM_STATUS,
    PARAM_CREATED_AT,
    PARAM_JOB_ID,
];

/// Encode a reference as `trackingKind=...&trackingProvider=...`.
///
/// Returns an empty string when there is nothing to track.
pub fn serialize_tracking_query(tracking: Option<&TaskReference>) -> String {
    let Some(tracking) = tracking else {
        return String::new();
    };

    let mut query = form_urlencoded::Serializer::new(String::new());
    query
        .append_pair(PARAM_KIND, tracking.kind().as_str())
        .append_pair(PARAM_PROVIDER, tracking.provider().as_str())
        .append_pair(PARAM_EXECUTION_ID, tracking.execution_id().as_str())
        .append_pair(PARAM_STATUS, tracking.status().as_str())
        .append_pair(
            PARAM_CREATED_AT,
            &tracking
                .created_at()
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
        );

    if let Some(job_id) = tracking.job_id() {
        query.append_pair(PARAM_JOB_ID, job_id.as_str());
    }

    query.finish()
}

/// Decode a reference from a raw query string (without the leading `?`).
pub fn parse_tracking_query(query: &str) -> Option<TaskReference> {
    let params: HashMap<String, String> = form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();
    parse_tracking_params(&params)
}

/// Decode a reference from already-split query parameters.
pub fn parse_tracking_params(params: &HashMap<String, String>) -> Option<TaskReference> {
    decode_tracking_params(params).ok()
}

/// Returns true if any tracking parameter is present at all.
pub fn has_tracking_params(params: &HashMap<String, String>) -> bool {
    TRACKING_PARAMS.iter().any(|name| params.contains_key(*name))
}

/// Decode a reference, reporting why decoding failed.
pub fn decode_tracking_params(
    params: &HashMap<String, String>,
) -> Result<TaskReference, CoreError> {
    let kind: TaskKind = required(params, PARAM_KIND)?.parse()?;
    let provider: TaskProvider = required(params, PARAM_PROVIDER)?.parse()?;
    let execution_id = ExecutionId::new(required(params, PARAM_EXECUTION_ID)?);
    let status: TaskStatus = required(params, PARAM_STATUS)?.parse()?;
    let created_at = parse_created_at(required(params, PARAM_CREATED_AT)?)?;
    let job_id = optional(params, PARAM_JOB_ID).map(JobId::new);

    TaskReference::from_parts(kind, provider, execution_id, job_id, status, created_at)
}

fn optional<'a>(params: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

fn required<'a>(params: &'a HashMap<String, String>, name: &str) -> Result<&'a str, CoreError> {
    optional(params, name).ok_or_else(|| CoreError::InvalidInput(format!("missing {name}")))
}

fn parse_created_at(raw: &str) -> Result<DateTime<Utc>, CoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CoreError::InvalidInput(format!("{PARAM_CREATED_AT}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn local_ref() -> TaskReference {
        TaskReference::local(
            TaskKind::RideDelaySimulation,
            Utc.with_ymd_and_hms(2026, 2, 14, 19, 30, 0).unwrap(),
        )
    }

    fn remote_ref() -> TaskReference {
        TaskReference::remote(
            TaskKind::DeliveryWatch,
            JobId::new("doordash-watch-ts"),
            ExecutionId::new("exec/with spaces&symbols"),
            TaskStatus::Queued,
            Utc.timestamp_millis_opt(1_771_097_400_123).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_round_trip() {
        for reference in [local_ref(), remote_ref()] {
            let query = serialize_tracking_query(Some(&reference));
            assert_eq!(parse_tracking_query(&query), Some(reference));
        }
    }

    #[test]
    fn test_round_trip_preserves_sub_millisecond_timestamps() {
        let created_at = Utc.timestamp_nanos(1_771_097_400_123_456_789);
        let reference = TaskReference::remote(
            TaskKind::RideDelaySimulation,
            JobId::new("mock-uber-delay"),
            ExecutionId::new("E1"),
            TaskStatus::Running,
            created_at,
        )
        .unwrap();

        let query = serialize_tracking_query(Some(&reference));
        assert_eq!(parse_tracking_query(&query), Some(reference));
    }

    #[test]
    fn test_serialize_none_is_empty() {
        assert_eq!(serialize_tracking_query(None), "");
    }

    #[test]
    fn test_job_id_only_for_remote() {
        let query = serialize_tracking_query(Some(&local_ref()));
        assert!(!query.contains(PARAM_JOB_ID));

        let query = serialize_tracking_query(Some(&remote_ref()));
        assert!(query.contains("trackingJobId=doordash-watch-ts"));
    }

    #[test]
    fn test_rejects_each_missing_required_field() {
        let query = serialize_tracking_query(Some(&local_ref()));
        for name in [
            PARAM_KIND,
            PARAM_PROVIDER,
            PARAM_EXECUTION_ID,
            PARAM_STATUS,
            PARAM_CREATED_AT,
        ] {
            let mut params: HashMap<String, String> = form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect();
            params.remove(name);
            assert!(parse_tracking_params(&params).is_none(), "missing {name}");
        }
    }

    #[test]
    fn test_rejects_unknown_provider() {
        let query = serialize_tracking_query(Some(&local_ref()))
            .replace("trackingProvider=local", "trackingProvider=carrier-pigeon");
        assert!(parse_tracking_query(&query).is_none());
    }

    #[test]
    fn test_rejects_bad_enums_and_timestamps() {
        let base = serialize_tracking_query(Some(&local_ref()));
        let tampered = [
            base.replace("trackingKind=mock_uber_delay", "trackingKind=lyft"),
            base.replace("trackingStatus=running", "trackingStatus=RUNNING"),
            base.replace("trackingCreatedAt=", "trackingCreatedAt=yesterday"),
        ];
        for query in tampered {
            assert!(parse_tracking_query(&query).is_none(), "{query}");
        }
    }

    #[test]
    fn test_rejects_remote_without_job_id() {
        let query = serialize_tracking_query(Some(&remote_ref()))
            .replace("&trackingJobId=doordash-watch-ts", "");
        assert!(parse_tracking_query(&query).is_none());
    }

    #[test]
    fn test_has_tracking_params() {
        let mut params = HashMap::new();
        params.insert("pickup".to_string(), "Broadway".to_string());
        assert!(!has_tracking_params(&params));

        params.insert(PARAM_STATUS.to_string(), "running".to_string());
        assert!(has_tracking_params(&params));
    }
}
