//! A single step within a [`super::Plan`].

use serde::{Deserialize, Serialize};

use crate::Value;

/// One tool invocation in a plan.
///
/// `id` is the reference namespace other steps use to address this step's
/// output; it is never parsed for structure by the engine. `args`, `run_if`,
/// and `intervention_if` are independently optional — a step with none of
/// them runs unconditionally with empty arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    pub tool: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_if: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intervention_if: Option<String>,
    #[serde(default)]
    pub key_finding: bool,
}

impl Step {
    /// Creates a step with only its required fields set.
    pub fn new(id: impl Into<String>, tool: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tool: tool.into(),
            description: None,
            args: None,
            run_if: None,
            intervention_if: None,
            key_finding: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_args(mut self, args: Value) -> Self {
        self.args = Some(args);
        self
    }

    pub fn with_run_if(mut self, expression: impl Into<String>) -> Self {
        self.run_if = Some(expression.into());
        self
    }

    pub fn with_intervention_if(mut self, expression: impl Into<String>) -> Self {
        self.intervention_if = Some(expression.into());
        self
    }

    pub fn with_key_finding(mut self, key_finding: bool) -> Self {
        self.key_finding = key_finding;
        self
    }
}
