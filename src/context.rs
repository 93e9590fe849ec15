//! The run's accumulating record of completed step outputs.

use std::collections::HashMap;

use crate::Value;

/// An append-only mapping from completed step id to that step's output.
///
/// Owned exclusively by one [`crate::Executor`] run. Tools never receive the
/// context itself — only their own fully-resolved arguments — and callers
/// only ever see a cloned snapshot, handed out at the terminal
/// [`crate::Event::Finish`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    outputs: HashMap<String, Value>,
}

impl Context {
    /// Creates an empty context at the start of a run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the output of a newly-completed step.
    ///
    /// Steps are unique within a validated plan, so this always inserts a
    /// fresh key; it never overwrites an existing entry.
    pub fn record(&mut self, step_id: impl Into<String>, output: Value) {
        self.outputs.insert(step_id.into(), output);
    }

    /// Returns the output of a completed step, if any.
    pub fn get(&self, step_id: &str) -> Option<&Value> {
        self.outputs.get(step_id)
    }

    /// Returns true if the given step has completed and is present in the
    /// context. A skipped step is never present.
    pub fn contains(&self, step_id: &str) -> bool {
        self.outputs.contains_key(step_id)
    }

    /// A snapshot of every completed output at this point in the run, for
    /// embedding in [`crate::Event::Finish`].
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.outputs.clone()
    }
}
