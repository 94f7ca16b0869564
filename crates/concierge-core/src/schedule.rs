//! Time-based stage progression.
//!
//! A stage schedule turns "how long since this started" into "which stage are
//! we in" with no stored state, so any number of polls (from any server
//! instance) agree on the answer.

use chrono::Duration;
use serde::Serialize;

use crate::CoreError;

/// One entry of a stage schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stage<S> {
    pub status: S,
    pub delay_seconds: u32,
}

impl<S> Stage<S> {
    pub const fn new(status: S, delay_seconds: u32) -> Self {
        Self {
            status,
            delay_seconds,
        }
    }
}

/// Ordered list of stages, sorted ascending by delay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StageSchedule<S> {
    stages: Vec<Stage<S>>,
}

impl<S: Copy> StageSchedule<S> {
    /// Build a schedule. Stages are sorted by delay; at least one is required.
    pub fn new(mut stages: Vec<Stage<S>>) -> Result<Self, CoreError> {
        if stages.is_empty() {
            return Err(CoreError::InvalidInput("empty stage schedule".to_string()));
        }
        stages.sort_by_key(|stage| stage.delay_seconds);
        Ok(Self { stages })
    }

    pub fn stages(&self) -> &[Stage<S>] {
        &self.stages
    }

    /// The stage reached after `elapsed`.
    ///
    /// This is the last stage whose delay is at or below `elapsed`. Before the
    /// first threshold the first stage applies.
    pub fn stage_at(&self, elapsed: Duration) -> S {
        let elapsed_secs = elapsed.num_seconds();
        self.stages
            .iter()
            .take_while(|stage| i64::from(stage.delay_seconds) <= elapsed_secs)
            .last()
            .unwrap_or(&self.stages[0])
            .status
    }

    /// Delay of the final stage, i.e. when the schedule completes.
    pub fn total(&self) -> Duration {
        let last = self.stages.last().map_or(0, |stage| stage.delay_seconds);
        Duration::seconds(i64::from(last))
    }

    /// Fraction of the schedule covered after `elapsed`, clamped to `0.0..=1.0`.
    pub fn progress(&self, elapsed: Duration) -> f64 {
        let total = self.total().num_milliseconds();
        if total <= 0 {
            return 1.0;
        }
        (elapsed.num_milliseconds() as f64 / total as f64).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ride() -> StageSchedule<&'static str> {
        StageSchedule::new(vec![
            Stage::new("assigned", 0),
            Stage::new("en_route", 25),
            Stage::new("arriving", 55),
            Stage::new("complete", 80),
        ])
        .unwrap()
    }

    #[test]
    fn test_stage_selection() {
        let schedule = ride();
        assert_eq!(schedule.stage_at(Duration::seconds(0)), "assigned");
        assert_eq!(schedule.stage_at(Duration::seconds(24)), "assigned");
        assert_eq!(schedule.stage_at(Duration::seconds(25)), "en_route");
        assert_eq!(schedule.stage_at(Duration::seconds(40)), "en_route");
        assert_eq!(schedule.stage_at(Duration::seconds(79)), "arriving");
        assert_eq!(schedule.stage_at(Duration::seconds(90)), "complete");
    }

    #[test]
    fn test_before_first_threshold_uses_first_stage() {
        let schedule =
            StageSchedule::new(vec![Stage::new("late", 30), Stage::new("later", 60)]).unwrap();
        assert_eq!(schedule.stage_at(Duration::seconds(5)), "late");
        assert_eq!(schedule.stage_at(Duration::seconds(-5)), "late");
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let schedule =
            StageSchedule::new(vec![Stage::new("b", 10), Stage::new("a", 0)]).unwrap();
        assert_eq!(schedule.stages()[0].status, "a");
        assert_eq!(schedule.stage_at(Duration::seconds(12)), "b");
    }

    #[test]
    fn test_empty_schedule_rejected() {
        assert!(StageSchedule::<&str>::new(Vec::new()).is_err());
    }

    #[test]
    fn test_progress() {
        let schedule = ride();
        assert_eq!(schedule.progress(Duration::seconds(40)), 0.5);
        assert_eq!(schedule.progress(Duration::seconds(500)), 1.0);
    }

    #[test]
    fn test_serializes_with_delay_seconds() {
        let json = serde_json::to_value(ride()).unwrap();
        assert_eq!(json[1]["status"], "en_route");
        assert_eq!(json[1]["delay_seconds"], 25);
    }
}
