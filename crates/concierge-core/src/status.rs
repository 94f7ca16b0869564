//! Canonical task status and the status normalizer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// Raw statuses reported by job runners that mean the execution finished well.
const SUCCESS_TOKENS: &[&str] = &["SUCCESS", "SUCCEEDED", "COMPLETED", "DONE"];

/// Raw statuses that mean the execution ended without success.
const FAILURE_TOKENS: &[&str] = &["FAILED", "CANCELED", "CANCELLED", "TIMED_OUT", "ERROR"];

/// Raw statuses that mean the execution is actively progressing.
const RUNNING_TOKENS: &[&str] = &["RUNNING", "IN_PROGRESS", "PROCESSING"];

/// Status of a tracked task, shared by every provider.
///
/// Statuses only move forward: `Queued -> Running -> Success | Failed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Accepted but not yet observed running.
    #[default]
    Queued,
    /// Actively executing.
    Running,
    /// Finished successfully.
    Success,
    /// Finished unsuccessfully.
    Failed,
}

impl TaskStatus {
    /// All statuses, in wire order.
    pub const ALL: [TaskStatus; 4] = [Self::Queued, Self::Running, Self::Success, Self::Failed];

    /// Wire literal for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }

    /// Returns true if the task is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Queued => 0,
            Self::Running => 1,
            Self::Success | Self::Failed => 2,
        }
    }

    /// Merge a newly observed status into this one without regressing.
    ///
    /// A terminal status never changes. Otherwise the observation wins only if
    /// it is further along than the current status.
    pub fn advance(self, observed: TaskStatus) -> TaskStatus {
        if self.is_terminal() || observed.rank() <= self.rank() {
            self
        } else {
            observed
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::UnknownStatus(s.to_string()))
    }
}

/// Map a job runner's raw status vocabulary onto [`TaskStatus`].
///
/// Matching is case-insensitive. Anything unrecognized, including the empty
/// string, maps to [`TaskStatus::Queued`] so completion is never claimed on
/// input we do not understand.
pub fn normalize_status(raw: &str) -> TaskStatus {
    let token = raw.trim().to_ascii_uppercase();
    let token = token.as_str();

    if SUCCESS_TOKENS.contains(&token) {
        TaskStatus::Success
    } else if FAILURE_TOKENS.contains(&token) {
        TaskStatus::Failed
    } else if RUNNING_TOKENS.contains(&token) {
        TaskStatus::Running
    } else {
        TaskStatus::Queued
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_known_vocabularies() {
        assert_eq!(normalize_status("SUCCEEDED"), TaskStatus::Success);
        assert_eq!(normalize_status("completed"), TaskStatus::Success);
        assert_eq!(normalize_status("Done"), TaskStatus::Success);
        assert_eq!(normalize_status("cancelled"), TaskStatus::Failed);
        assert_eq!(normalize_status("TIMED_OUT"), TaskStatus::Failed);
        assert_eq!(normalize_status("error"), TaskStatus::Failed);
        assert_eq!(normalize_status("in_progress"), TaskStatus::Running);
        assert_eq!(normalize_status("PROCESSING"), TaskStatus::Running);
    }

    #[test]
    fn test_normalize_unrecognized_is_queued() {
        for raw in ["", "   ", "null", "undefined", "PENDING", "carrier-pigeon", "🚀"] {
            assert_eq!(normalize_status(raw), TaskStatus::Queued, "raw = {raw:?}");
        }
    }

    #[test]
    fn test_advance_is_monotonic() {
        assert_eq!(TaskStatus::Queued.advance(TaskStatus::Running), TaskStatus::Running);
        assert_eq!(TaskStatus::Running.advance(TaskStatus::Queued), TaskStatus::Running);
        assert_eq!(TaskStatus::Running.advance(TaskStatus::Failed), TaskStatus::Failed);

        for observed in TaskStatus::ALL {
            assert_eq!(TaskStatus::Success.advance(observed), TaskStatus::Success);
            assert_eq!(TaskStatus::Failed.advance(observed), TaskStatus::Failed);
        }
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert_eq!("running".parse::<TaskStatus>(), Ok(TaskStatus::Running));
        assert!("RUNNING".parse::<TaskStatus>().is_err());
        assert!("paused".parse::<TaskStatus>().is_err());
    }
}
