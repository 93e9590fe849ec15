//! Tagged events emitted during a run, and the terminal verdict they carry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;
use crate::timestamp::Timestamp;
use crate::Value;

/// Terminal classification of a run. Exactly one is ever reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Success,
    Failure,
    InterventionNeeded,
    Cancelled,
}

/// Why a step was skipped. `run_if` is the only guard that skips a step
/// today; the variant still exists so a future guard kind has somewhere to
/// go without widening `Event::StepSkipped`'s shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    RunIf,
}

/// One event in the run's ordered, single-pass stream. Every variant
/// carries a UTC timestamp; `Start` precedes everything else and exactly
/// one `Finish` terminates the stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Start {
        timestamp: Timestamp,
        plan_id: Option<String>,
        step_count: usize,
    },
    StepStart {
        timestamp: Timestamp,
        step_id: String,
        tool: String,
        resolved_args: Value,
        description: Option<String>,
        key_finding: bool,
    },
    StepComplete {
        timestamp: Timestamp,
        step_id: String,
        output: Value,
        duration_ms: i64,
    },
    StepSkipped {
        timestamp: Timestamp,
        step_id: String,
        reason: SkipReason,
        expression: String,
    },
    InterventionNeeded {
        timestamp: Timestamp,
        step_id: String,
        expression: String,
        output: Value,
    },
    Error {
        timestamp: Timestamp,
        step_id: Option<String>,
        kind: ErrorKind,
        message: String,
        cause: Option<String>,
    },
    Finish {
        timestamp: Timestamp,
        verdict: Verdict,
        context_snapshot: HashMap<String, Value>,
        key_findings: Vec<String>,
        total_duration_ms: i64,
        first_error: Option<String>,
        intervention_trigger: Option<String>,
    },
}

impl Event {
    /// The step this event pertains to, if any. `Start` and run-level
    /// `Error`/`Finish` events have no single step.
    pub fn step_id(&self) -> Option<&str> {
        match self {
            Event::Start { .. } => None,
            Event::StepStart { step_id, .. }
            | Event::StepComplete { step_id, .. }
            | Event::StepSkipped { step_id, .. }
            | Event::InterventionNeeded { step_id, .. } => Some(step_id),
            Event::Error { step_id, .. } => step_id.as_deref(),
            Event::Finish { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_serializes_with_type_tag() {
        let event = Event::Start {
            timestamp: Timestamp::now(),
            plan_id: Some("p1".into()),
            step_count: 2,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], json!("start"));
        assert_eq!(json["step_count"], json!(2));
    }

    #[test]
    fn step_id_extracts_for_step_scoped_variants() {
        let event = Event::StepComplete {
            timestamp: Timestamp::now(),
            step_id: "s1".into(),
            output: json!(null),
            duration_ms: 3,
        };
        assert_eq!(event.step_id(), Some("s1"));
    }

    #[test]
    fn step_id_is_none_for_start_and_finish() {
        let start = Event::Start {
            timestamp: Timestamp::now(),
            plan_id: None,
            step_count: 1,
        };
        assert_eq!(start.step_id(), None);
    }

    #[test]
    fn verdict_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Verdict::InterventionNeeded).unwrap(),
            "\"intervention_needed\""
        );
    }
}
