//! Error taxonomy for the engine.
//!
//! Every error variant here corresponds to exactly one row of the error
//! taxonomy table: `ValidationError` is raised before a run starts and never
//! reaches the event stream; `ExpressionError`, `ReferenceError`, and
//! `ToolError` each end a run with a `Failure` verdict after exactly one
//! `Error` event; cancellation ends a run with `Cancelled`.

use thiserror::Error;

/// Shape/reference problems found while validating a plan, before any event
/// is emitted. A plan that fails validation never starts a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A plan must declare at least one step.
    #[error("plan has no steps")]
    EmptyPlan,

    /// Step ids are the reference namespace; duplicates make references
    /// ambiguous and are rejected outright.
    #[error("duplicate step id: {0}")]
    DuplicateStepId(String),

    /// A step's `tool` field does not resolve in the registry handed to the
    /// validator.
    #[error("step {step_id} references unknown tool: {tool}")]
    UnknownTool { step_id: String, tool: String },

    /// A reference inside `args`, `run_if`, or `intervention_if` names a
    /// step id that either doesn't exist or doesn't appear earlier in the
    /// document.
    #[error("step {step_id} references unknown or forward step: {referenced}")]
    UnknownReference { step_id: String, referenced: String },

    /// A guard/escalation expression, or a `$`-reference inside `args`,
    /// failed to parse.
    #[error("step {step_id} has an unparseable expression {expression:?}: {reason}")]
    UnparseableExpression {
        step_id: String,
        expression: String,
        reason: String,
    },
}

/// Failures evaluating the restricted guard/escalation grammar: parse
/// failures and type violations on ordered comparisons.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error("could not parse expression {expression:?}: {reason}")]
    ParseError { expression: String, reason: String },

    #[error(
        "cannot compare {left} and {right} with operator {op} in expression {expression:?}"
    )]
    TypeMismatch {
        expression: String,
        op: String,
        left: String,
        right: String,
    },
}

/// Failures resolving a `$step.path` reference against the run's context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    /// The referenced step has not completed — either it hasn't run yet
    /// (impossible in a validated plan) or it was skipped, in which case it
    /// never entered the context at all.
    #[error("step {0:?} has not completed and cannot be referenced")]
    StepNotAvailable(String),

    /// The referenced step completed, but the dotted path walks off the
    /// edge of its output (a missing map key, or indexing into a scalar).
    #[error("path {path:?} is not present on step {step_id:?}'s output")]
    MissingField { step_id: String, path: String },
}

/// Union of the two non-terminal evaluation failure kinds. Both are reported
/// on the wire as `ErrorKind::Expression` (see [`ErrorKind`]); this type
/// keeps their distinct `Display` text and `From` conversions while the
/// executor only needs to know "evaluation failed, here's why."
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("expression error: {0}")]
    Expression(#[from] ExpressionError),

    #[error("reference error: {0}")]
    Reference(#[from] ReferenceError),
}

/// Raised by a tool body. Carried into the run-ending `Error` event and
/// terminates the run with a `Failure` verdict; never retried or swallowed.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ToolError {
    pub message: String,
    pub cause: Option<String>,
}

impl ToolError {
    /// Creates a tool error with no further cause detail.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    /// Creates a tool error carrying an additional cause (e.g. the
    /// underlying error this tool body caught and wrapped).
    pub fn with_cause(message: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: Some(cause.into()),
        }
    }
}

/// The four error categories carried on [`crate::Event::Error`]. `Validation`
/// never actually appears on the wire (validation happens before the stream
/// starts and is reported as a plain `Result::Err`), but is kept in the enum
/// because the original error taxonomy names it alongside the three that do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Expression,
    Tool,
    Cancelled,
}
