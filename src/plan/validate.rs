//! Cross-step validation: the checks that need the whole ordered step list
//! and therefore can't live on `Plan`/`Step`'s own constructors.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::expr::{self, try_parse_full, Expr, RefPath};
use crate::registry::ToolRegistry;
use crate::Value;

use super::Plan;

/// Runs once, before any event is emitted. Rejects a plan if the step list
/// is empty, a step id repeats, a step names a tool absent from `registry`,
/// a reference names a step id that doesn't appear earlier in the document,
/// or a guard/escalation expression fails to parse.
///
/// Does not evaluate any expression — only their shape and the step ids
/// they name. A plan that passes validation cannot produce reference-shape
/// or unknown-tool errors at runtime; tool-body errors remain possible.
pub fn validate_plan(plan: &Plan, registry: &ToolRegistry) -> Result<(), ValidationError> {
    if plan.steps.is_empty() {
        return Err(ValidationError::EmptyPlan);
    }

    let mut seen = HashSet::new();

    for step in &plan.steps {
        if seen.contains(&step.id) {
            return Err(ValidationError::DuplicateStepId(step.id.clone()));
        }

        if !registry.contains(&step.tool) {
            return Err(ValidationError::UnknownTool {
                step_id: step.id.clone(),
                tool: step.tool.clone(),
            });
        }

        // args and run_if are evaluated *before* this step runs, so their
        // references may only name a strictly earlier step. intervention_if
        // runs against the context *after* this step has committed its own
        // output, so it alone may also reference the step's own id (Scenario
        // D: `s1` escalating on `$s1.level`).
        let mut refs_before = Vec::new();
        let mut refs_after = Vec::new();

        if let Some(args) = &step.args {
            collect_value_refs(args, &mut refs_before);
        }
        if let Some(run_if) = &step.run_if {
            let parsed = parse_expression(&step.id, run_if)?;
            collect_expr_refs(&parsed, &mut refs_before);
        }
        if let Some(intervention_if) = &step.intervention_if {
            let parsed = parse_expression(&step.id, intervention_if)?;
            collect_expr_refs(&parsed, &mut refs_after);
        }

        for reference in &refs_before {
            if !seen.contains(&reference.step_id) {
                return Err(ValidationError::UnknownReference {
                    step_id: step.id.clone(),
                    referenced: reference.display(),
                });
            }
        }

        seen.insert(step.id.clone());

        for reference in &refs_after {
            if !seen.contains(&reference.step_id) {
                return Err(ValidationError::UnknownReference {
                    step_id: step.id.clone(),
                    referenced: reference.display(),
                });
            }
        }
    }

    Ok(())
}

fn parse_expression(step_id: &str, expression: &str) -> Result<Expr, ValidationError> {
    expr::parse(expression).map_err(|err| ValidationError::UnparseableExpression {
        step_id: step_id.to_string(),
        expression: expression.to_string(),
        reason: err.to_string(),
    })
}

fn collect_value_refs(value: &Value, out: &mut Vec<RefPath>) {
    match value {
        Value::String(s) => {
            if let Some(path) = try_parse_full(s) {
                out.push(path);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_value_refs(item, out);
            }
        }
        Value::Object(map) => {
            for v in map.values() {
                collect_value_refs(v, out);
            }
        }
        _ => {}
    }
}

fn collect_expr_refs(expr: &Expr, out: &mut Vec<RefPath>) {
    match expr {
        Expr::Ref(path) => out.push(path.clone()),
        Expr::Lit(_) => {}
        Expr::Not(inner) => collect_expr_refs(inner, out),
        Expr::And(l, r) | Expr::Or(l, r) => {
            collect_expr_refs(l, out);
            collect_expr_refs(r, out);
        }
        Expr::Cmp(_, l, r) => {
            collect_expr_refs(l, out);
            collect_expr_refs(r, out);
        }
    }
}
