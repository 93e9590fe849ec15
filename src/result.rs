//! The terminal aggregate handed to callers who want a single value rather
//! than the live stream.

use std::collections::HashMap;

use crate::event::{Event, Verdict};
use crate::Value;

/// Materialized outcome of one run: the `Finish` event's payload, plus every
/// event observed along the way for callers who want the full trace.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub verdict: Verdict,
    pub context_snapshot: HashMap<String, Value>,
    pub key_findings: Vec<String>,
    pub total_duration_ms: i64,
    pub first_error: Option<String>,
    pub intervention_trigger: Option<String>,
    pub events: Vec<Event>,
}

impl RunResult {
    /// Builds a result from a fully-drained event stream.
    ///
    /// # Panics
    ///
    /// Panics if `events` does not end with exactly one `Finish` event —
    /// which the executor guarantees for every run it drives.
    pub fn from_events(events: Vec<Event>) -> Self {
        let (verdict, context_snapshot, key_findings, total_duration_ms, first_error, intervention_trigger) = events
            .iter()
            .rev()
            .find_map(|event| match event {
                Event::Finish {
                    verdict,
                    context_snapshot,
                    key_findings,
                    total_duration_ms,
                    first_error,
                    intervention_trigger,
                    ..
                } => Some((
                    *verdict,
                    context_snapshot.clone(),
                    key_findings.clone(),
                    *total_duration_ms,
                    first_error.clone(),
                    intervention_trigger.clone(),
                )),
                _ => None,
            })
            .expect("event stream must end with exactly one Finish event");

        Self {
            verdict,
            context_snapshot,
            key_findings,
            total_duration_ms,
            first_error,
            intervention_trigger,
            events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::Timestamp;
    use serde_json::json;

    #[test]
    fn builds_from_a_minimal_event_trace() {
        let events = vec![
            Event::Start {
                timestamp: Timestamp::now(),
                plan_id: None,
                step_count: 1,
            },
            Event::StepStart {
                timestamp: Timestamp::now(),
                step_id: "s1".into(),
                tool: "scan_hull".into(),
                resolved_args: json!({}),
                description: None,
                key_finding: false,
            },
            Event::StepComplete {
                timestamp: Timestamp::now(),
                step_id: "s1".into(),
                output: json!({"integrity": 98}),
                duration_ms: 1,
            },
            Event::Finish {
                timestamp: Timestamp::now(),
                verdict: Verdict::Success,
                context_snapshot: HashMap::from([("s1".to_string(), json!({"integrity": 98}))]),
                key_findings: vec![],
                total_duration_ms: 5,
                first_error: None,
                intervention_trigger: None,
            },
        ];

        let result = RunResult::from_events(events);
        assert_eq!(result.verdict, Verdict::Success);
        assert_eq!(result.events.len(), 4);
        assert_eq!(result.context_snapshot.len(), 1);
    }

    #[test]
    #[should_panic(expected = "Finish")]
    fn panics_when_no_finish_event_present() {
        let events = vec![Event::Start {
            timestamp: Timestamp::now(),
            plan_id: None,
            step_count: 1,
        }];
        RunResult::from_events(events);
    }
}
