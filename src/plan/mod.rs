//! The declarative plan document: an ordered sequence of steps, plus the
//! validator that checks it as a whole before any event is emitted.

mod step;
mod validate;

pub use step::Step;
pub use validate::validate_plan;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A document with an optional identifier, optional name/description, and
/// an ordered, non-empty sequence of steps. Step order in the document is
/// authoritative — the engine never reorders it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub steps: Vec<Step>,
}

impl Plan {
    /// Builds a plan from a non-empty step list. This only checks the local
    /// shape a plan can verify in isolation (non-empty steps); cross-step
    /// checks (duplicate ids, unknown tools, forward references) are
    /// [`validate_plan`]'s job, since they need the whole ordered list and a
    /// registry to check against.
    pub fn new(steps: Vec<Step>) -> Result<Self, ValidationError> {
        if steps.is_empty() {
            return Err(ValidationError::EmptyPlan);
        }
        Ok(Self {
            id: None,
            name: None,
            description: None,
            steps,
        })
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
