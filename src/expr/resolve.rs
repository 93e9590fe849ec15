//! Resolution of a step's `args` value against the run context.
//!
//! `args` is an arbitrary JSON value. Any string that is, in its entirety, a
//! `$step.path` reference is replaced by the referenced value; every other
//! scalar, array, and object is walked recursively and otherwise passed
//! through unchanged.

use super::eval::resolve_path;
use super::reference::try_parse_full;
use crate::context::Context;
use crate::error::ReferenceError;
use crate::Value;

/// Recursively resolves every `$step.path` reference inside `args`.
///
/// Objects and arrays are walked member-by-member; a string is substituted
/// only when the *whole* string is a reference. Numbers, bools, and null
/// pass through untouched.
pub fn resolve_args(args: &Value, ctx: &Context) -> Result<Value, ReferenceError> {
    match args {
        Value::String(s) => match try_parse_full(s) {
            Some(path) => resolve_path(ctx, &path),
            None => Ok(args.clone()),
        },
        Value::Array(items) => {
            let resolved = items
                .iter()
                .map(|item| resolve_args(item, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(resolved))
        }
        Value::Object(map) => {
            let mut resolved = serde_json::Map::with_capacity(map.len());
            for (key, value) in map {
                resolved.insert(key.clone(), resolve_args(value, ctx)?);
            }
            Ok(Value::Object(resolved))
        }
        other => Ok(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx_with(step: &str, value: Value) -> Context {
        let mut ctx = Context::new();
        ctx.record(step, value);
        ctx
    }

    #[test]
    fn bare_reference_substitutes_full_value() {
        let ctx = ctx_with("s1", json!({"level": 12}));
        let resolved = resolve_args(&json!("$s1.level"), &ctx).unwrap();
        assert_eq!(resolved, json!(12));
    }

    #[test]
    fn non_reference_string_passes_through() {
        let ctx = Context::new();
        let resolved = resolve_args(&json!("scan the hull"), &ctx).unwrap();
        assert_eq!(resolved, json!("scan the hull"));
    }

    #[test]
    fn mixed_dollar_string_is_kept_literal() {
        let ctx = Context::new();
        let resolved = resolve_args(&json!("cost is $s1.level"), &ctx).unwrap();
        assert_eq!(resolved, json!("cost is $s1.level"));
    }

    #[test]
    fn object_is_resolved_member_by_member() {
        let ctx = ctx_with("s1", json!({"level": 12}));
        let args = json!({"threshold": "$s1.level", "label": "static"});
        let resolved = resolve_args(&args, &ctx).unwrap();
        assert_eq!(resolved, json!({"threshold": 12, "label": "static"}));
    }

    #[test]
    fn array_elements_are_each_resolved() {
        let ctx = ctx_with("s1", json!({"level": 12}));
        let args = json!(["$s1.level", "static"]);
        let resolved = resolve_args(&args, &ctx).unwrap();
        assert_eq!(resolved, json!([12, "static"]));
    }

    #[test]
    fn missing_step_propagates_reference_error() {
        let ctx = Context::new();
        let err = resolve_args(&json!("$missing.field"), &ctx).unwrap_err();
        assert!(matches!(err, ReferenceError::StepNotAvailable(_)));
    }

    #[test]
    fn nested_structures_resolve_recursively() {
        let ctx = ctx_with("s1", json!({"level": 12}));
        let args = json!({"inner": {"values": ["$s1.level"]}});
        let resolved = resolve_args(&args, &ctx).unwrap();
        assert_eq!(resolved, json!({"inner": {"values": [12]}}));
    }
}
