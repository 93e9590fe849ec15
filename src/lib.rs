//! planrunner — a streaming executor for declarative tool-chain plans.
//!
//! A [`Plan`](plan::Plan) describes an ordered sequence of named tool
//! invocations with data dependencies between steps.
//! [`validate_plan`](plan::validate_plan) checks a plan's shape against a
//! [`ToolRegistry`](registry::ToolRegistry)
//! once, up front; [`Executor`](executor::Executor) then drives the plan
//! step by step, resolving `$step.path` references through the accumulated
//! [`Context`](context::Context), evaluating guard/escalation expressions,
//! dispatching tools, and yielding a live [`Event`](event::Event) stream that
//! terminates in exactly one [`Finish`](event::Event::Finish).
//!
//! The engine has no CLI, no environment configuration, and no persisted
//! state of its own — those are the concern of whatever embeds it.

pub mod context;
pub mod error;
pub mod event;
pub mod executor;
pub mod expr;
pub mod plan;
pub mod registry;
pub mod result;
pub mod timestamp;

pub use context::Context;
pub use error::{ErrorKind, EvalError, ExpressionError, ReferenceError, ToolError, ValidationError};
pub use event::{Event, SkipReason, Verdict};
pub use executor::Executor;
pub use plan::{validate_plan, Plan, Step};
pub use registry::{Tool, ToolRegistry};
pub use result::RunResult;
pub use timestamp::Timestamp;

/// The JSON-shaped value universe shared by tool arguments, tool outputs,
/// and context entries: null, bool, number, string, ordered sequence, and
/// string-keyed mapping.
pub type Value = serde_json::Value;
