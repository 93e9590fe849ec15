//! The streaming interpreter that drives a validated plan to completion.

use std::time::Instant;

use async_stream::stream;
use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::context::Context;
use crate::error::ErrorKind;
use crate::event::{Event, SkipReason, Verdict};
use crate::expr::{eval_guard, resolve_args};
use crate::plan::Plan;
use crate::registry::ToolRegistry;
use crate::result::RunResult;
use crate::timestamp::Timestamp;
use crate::Value;

/// Drives one run of a validated plan against a registry, producing the
/// event stream described in the data model.
///
/// `plan` must already have passed [`crate::plan::validate_plan`] — the
/// executor trusts that every tool name resolves and every reference names
/// a step declared earlier in the document. It does not re-validate.
pub struct Executor;

impl Executor {
    /// Runs `plan` to completion (or cancellation), yielding events one at a
    /// time. The stream is lazy: no step past the one currently yielded has
    /// been dispatched, and the body never races ahead of the consumer.
    pub fn run<'a>(
        plan: &'a Plan,
        registry: &'a ToolRegistry,
        cancellation: CancellationToken,
    ) -> impl Stream<Item = Event> + 'a {
        stream! {
            let run_start = Instant::now();
            let mut ctx = Context::new();
            let mut key_findings: Vec<String> = Vec::new();

            info!("run started");
            yield Event::Start {
                timestamp: Timestamp::now(),
                plan_id: plan.id.clone(),
                step_count: plan.steps.len(),
            };

            for step in &plan.steps {
                if cancellation.is_cancelled() {
                    debug!("cancellation observed at step boundary");
                    yield Event::Error {
                        timestamp: Timestamp::now(),
                        step_id: None,
                        kind: ErrorKind::Cancelled,
                        message: "run cancelled".to_string(),
                        cause: None,
                    };
                    yield Event::Finish {
                        timestamp: Timestamp::now(),
                        verdict: Verdict::Cancelled,
                        context_snapshot: ctx.snapshot(),
                        key_findings,
                        total_duration_ms: run_start.elapsed().as_millis() as i64,
                        first_error: None,
                        intervention_trigger: None,
                    };
                    return;
                }

                if let Some(run_if) = &step.run_if {
                    match eval_guard(run_if, &ctx) {
                        Ok(true) => {}
                        Ok(false) => {
                            debug!(step_id = %step.id, "step skipped by run_if");
                            yield Event::StepSkipped {
                                timestamp: Timestamp::now(),
                                step_id: step.id.clone(),
                                reason: SkipReason::RunIf,
                                expression: run_if.clone(),
                            };
                            continue;
                        }
                        Err(err) => {
                            yield Event::Error {
                                timestamp: Timestamp::now(),
                                step_id: Some(step.id.clone()),
                                kind: ErrorKind::Expression,
                                message: err.to_string(),
                                cause: None,
                            };
                            yield Event::Finish {
                                timestamp: Timestamp::now(),
                                verdict: Verdict::Failure,
                                context_snapshot: ctx.snapshot(),
                                key_findings,
                                total_duration_ms: run_start.elapsed().as_millis() as i64,
                                first_error: Some(step.id.clone()),
                                intervention_trigger: None,
                            };
                            return;
                        }
                    }
                }

                let raw_args = step.args.clone().unwrap_or_else(|| Value::Object(Default::default()));
                let resolved_args = match resolve_args(&raw_args, &ctx) {
                    Ok(resolved) => resolved,
                    Err(err) => {
                        yield Event::Error {
                            timestamp: Timestamp::now(),
                            step_id: Some(step.id.clone()),
                            kind: ErrorKind::Expression,
                            message: err.to_string(),
                            cause: None,
                        };
                        yield Event::Finish {
                            timestamp: Timestamp::now(),
                            verdict: Verdict::Failure,
                            context_snapshot: ctx.snapshot(),
                            key_findings,
                            total_duration_ms: run_start.elapsed().as_millis() as i64,
                            first_error: Some(step.id.clone()),
                            intervention_trigger: None,
                        };
                        return;
                    }
                };

                debug!(step_id = %step.id, tool = %step.tool, "dispatching step");
                yield Event::StepStart {
                    timestamp: Timestamp::now(),
                    step_id: step.id.clone(),
                    tool: step.tool.clone(),
                    resolved_args: resolved_args.clone(),
                    description: step.description.clone(),
                    key_finding: step.key_finding,
                };

                let step_start = Instant::now();
                let tool = registry
                    .get(&step.tool)
                    .expect("validated plan references only tools present in the registry");
                let output = match tool.invoke(resolved_args).await {
                    Ok(output) => output,
                    Err(err) => {
                        yield Event::Error {
                            timestamp: Timestamp::now(),
                            step_id: Some(step.id.clone()),
                            kind: ErrorKind::Tool,
                            message: err.message.clone(),
                            cause: err.cause.clone(),
                        };
                        yield Event::Finish {
                            timestamp: Timestamp::now(),
                            verdict: Verdict::Failure,
                            context_snapshot: ctx.snapshot(),
                            key_findings,
                            total_duration_ms: run_start.elapsed().as_millis() as i64,
                            first_error: Some(step.id.clone()),
                            intervention_trigger: None,
                        };
                        return;
                    }
                };

                ctx.record(step.id.clone(), output.clone());
                if step.key_finding {
                    key_findings.push(step.id.clone());
                }

                if let Some(intervention_if) = &step.intervention_if {
                    match eval_guard(intervention_if, &ctx) {
                        Ok(false) => {}
                        Ok(true) => {
                            debug!(step_id = %step.id, "intervention triggered");
                            yield Event::InterventionNeeded {
                                timestamp: Timestamp::now(),
                                step_id: step.id.clone(),
                                expression: intervention_if.clone(),
                                output: output.clone(),
                            };
                            yield Event::Finish {
                                timestamp: Timestamp::now(),
                                verdict: Verdict::InterventionNeeded,
                                context_snapshot: ctx.snapshot(),
                                key_findings,
                                total_duration_ms: run_start.elapsed().as_millis() as i64,
                                first_error: None,
                                intervention_trigger: Some(step.id.clone()),
                            };
                            return;
                        }
                        Err(err) => {
                            yield Event::Error {
                                timestamp: Timestamp::now(),
                                step_id: Some(step.id.clone()),
                                kind: ErrorKind::Expression,
                                message: err.to_string(),
                                cause: None,
                            };
                            yield Event::Finish {
                                timestamp: Timestamp::now(),
                                verdict: Verdict::Failure,
                                context_snapshot: ctx.snapshot(),
                                key_findings,
                                total_duration_ms: run_start.elapsed().as_millis() as i64,
                                first_error: Some(step.id.clone()),
                                intervention_trigger: None,
                            };
                            return;
                        }
                    }
                }

                yield Event::StepComplete {
                    timestamp: Timestamp::now(),
                    step_id: step.id.clone(),
                    output,
                    duration_ms: step_start.elapsed().as_millis() as i64,
                };
            }

            info!("run finished");
            yield Event::Finish {
                timestamp: Timestamp::now(),
                verdict: Verdict::Success,
                context_snapshot: ctx.snapshot(),
                key_findings,
                total_duration_ms: run_start.elapsed().as_millis() as i64,
                first_error: None,
                intervention_trigger: None,
            };
        }
    }

    /// Convenience for callers who only want the terminal outcome: drains
    /// the stream and materializes it into a [`RunResult`].
    pub async fn run_to_result(plan: &Plan, registry: &ToolRegistry, cancellation: CancellationToken) -> RunResult {
        let stream = Self::run(plan, registry, cancellation);
        futures::pin_mut!(stream);

        let mut events = Vec::new();
        while let Some(event) = stream.next().await {
            events.push(event);
        }
        RunResult::from_events(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use crate::plan::Step;
    use crate::registry::Tool;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;

    struct ScanHull;

    #[async_trait]
    impl Tool for ScanHull {
        async fn invoke(&self, _args: Value) -> Result<Value, ToolError> {
            Ok(json!({"integrity": 98, "breach": false}))
        }
    }

    struct CheckOxygen;

    #[async_trait]
    impl Tool for CheckOxygen {
        async fn invoke(&self, _args: Value) -> Result<Value, ToolError> {
            Ok(json!({"level": 21.0, "status": "NORMAL"}))
        }
    }

    struct FailingSensor;

    #[async_trait]
    impl Tool for FailingSensor {
        async fn invoke(&self, _args: Value) -> Result<Value, ToolError> {
            Err(ToolError::new("sensor offline"))
        }
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::new()
            .with_tool("scan_hull", Arc::new(ScanHull))
            .with_tool("check_oxygen", Arc::new(CheckOxygen))
    }

    #[tokio::test]
    async fn linear_plan_succeeds_with_both_outputs_in_context() {
        let plan = Plan::new(vec![Step::new("s1", "scan_hull"), Step::new("s2", "check_oxygen")]).unwrap();
        let result = Executor::run_to_result(&plan, &registry(), CancellationToken::new()).await;

        assert_eq!(result.verdict, Verdict::Success);
        assert_eq!(result.context_snapshot.len(), 2);
        assert_eq!(result.context_snapshot["s1"], json!({"integrity": 98, "breach": false}));
    }

    #[tokio::test]
    async fn guard_skips_a_step_without_entering_context() {
        let plan = Plan::new(vec![
            Step::new("s1", "scan_hull"),
            Step::new("s2", "check_oxygen").with_run_if("$s1.breach"),
        ])
        .unwrap();
        let result = Executor::run_to_result(&plan, &registry(), CancellationToken::new()).await;

        assert_eq!(result.verdict, Verdict::Success);
        assert!(result.context_snapshot.contains_key("s1"));
        assert!(!result.context_snapshot.contains_key("s2"));
        assert!(result
            .events
            .iter()
            .any(|e| matches!(e, Event::StepSkipped { step_id, .. } if step_id == "s2")));
    }

    #[tokio::test]
    async fn intervention_halts_the_run_with_output_visible() {
        let plan = Plan::new(vec![Step::new("s1", "check_oxygen").with_intervention_if("$s1.level < 25")]).unwrap();
        let result = Executor::run_to_result(&plan, &registry(), CancellationToken::new()).await;

        assert_eq!(result.verdict, Verdict::InterventionNeeded);
        assert_eq!(result.intervention_trigger.as_deref(), Some("s1"));
        assert!(result.context_snapshot.contains_key("s1"));
    }

    #[tokio::test]
    async fn tool_failure_halts_the_run_and_skips_later_steps() {
        let failing_registry = ToolRegistry::new()
            .with_tool("scan_hull", Arc::new(FailingSensor))
            .with_tool("check_oxygen", Arc::new(CheckOxygen));
        let plan = Plan::new(vec![Step::new("s1", "scan_hull"), Step::new("s2", "check_oxygen")]).unwrap();
        let result = Executor::run_to_result(&plan, &failing_registry, CancellationToken::new()).await;

        assert_eq!(result.verdict, Verdict::Failure);
        assert_eq!(result.first_error.as_deref(), Some("s1"));
        assert!(!result.context_snapshot.contains_key("s2"));
    }

    #[tokio::test]
    async fn reference_into_a_skipped_step_is_a_failure() {
        let plan = Plan::new(vec![
            Step::new("s1", "scan_hull").with_run_if("false"),
            Step::new("s2", "check_oxygen").with_run_if("$s1.breach"),
        ])
        .unwrap();

        let result = Executor::run_to_result(&plan, &registry(), CancellationToken::new()).await;
        assert_eq!(result.verdict, Verdict::Failure);
        assert_eq!(result.first_error.as_deref(), Some("s2"));
    }

    #[tokio::test]
    async fn cancellation_observed_before_the_next_step_starts() {
        let plan = Plan::new(vec![Step::new("s1", "scan_hull"), Step::new("s2", "check_oxygen")]).unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let result = Executor::run_to_result(&plan, &registry(), token).await;
        assert_eq!(result.verdict, Verdict::Cancelled);
        assert!(result.context_snapshot.is_empty());
    }
}
