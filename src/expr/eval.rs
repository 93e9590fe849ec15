//! Evaluation of a parsed [`Expr`] against a run's [`Context`].

use super::ast::{CmpOp, Expr};
use super::reference::RefPath;
use crate::context::Context;
use crate::error::{EvalError, ExpressionError, ReferenceError};
use crate::Value;

/// Walks a reference's dotted path against the context. The step itself
/// must be present (a skipped or not-yet-run step is a
/// [`ReferenceError::StepNotAvailable`]); each subsequent segment must find
/// a matching key or index, else [`ReferenceError::MissingField`].
pub(super) fn resolve_path(ctx: &Context, path: &RefPath) -> Result<Value, ReferenceError> {
    let root = ctx
        .get(&path.step_id)
        .ok_or_else(|| ReferenceError::StepNotAvailable(path.step_id.clone()))?;

    let mut current = root;
    for (i, segment) in path.segments.iter().enumerate() {
        current = current.get(segment).ok_or_else(|| ReferenceError::MissingField {
            step_id: path.step_id.clone(),
            path: path.segments[..=i].join("."),
        })?;
    }
    Ok(current.clone())
}

/// Evaluates an expression to its resolved [`Value`] — a bare reference or
/// literal evaluates to itself; `and`/`or`/`not`/comparisons evaluate to a
/// JSON boolean.
pub fn eval_expr(expr: &Expr, ctx: &Context) -> Result<Value, EvalError> {
    match expr {
        Expr::Ref(path) => Ok(resolve_path(ctx, path)?),
        Expr::Lit(value) => Ok(value.clone()),
        Expr::Not(inner) => {
            let v = eval_expr(inner, ctx)?;
            Ok(Value::Bool(!is_truthy(&v)))
        }
        Expr::And(left, right) => {
            // Short-circuit: don't evaluate the right side unless needed.
            if !is_truthy(&eval_expr(left, ctx)?) {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(is_truthy(&eval_expr(right, ctx)?)))
        }
        Expr::Or(left, right) => {
            if is_truthy(&eval_expr(left, ctx)?) {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(is_truthy(&eval_expr(right, ctx)?)))
        }
        Expr::Cmp(op, left, right) => {
            let l = eval_expr(left, ctx)?;
            let r = eval_expr(right, ctx)?;
            Ok(Value::Bool(compare(*op, &l, &r, &describe(expr))?))
        }
    }
}

/// Truthiness: non-empty, non-zero, non-false, non-null. Arrays and objects
/// extend the rule naturally — empty is falsy, non-empty is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Numeric equality must go through `as_f64()` rather than derived
/// structural equality: `serde_json::Number`'s `PartialEq` is
/// representation-sensitive, so an integer-valued tool output (`json!(98)`)
/// and an `f64` guard literal (every number `lex_number` produces) that are
/// mathematically equal would otherwise compare unequal.
fn values_equal(l: &Value, r: &Value) -> bool {
    if let (Some(a), Some(b)) = (l.as_f64(), r.as_f64()) {
        a == b
    } else if let (Some(a), Some(b)) = (l.as_str(), r.as_str()) {
        a == b
    } else {
        l == r
    }
}

fn compare(op: CmpOp, l: &Value, r: &Value, expr_text: &str) -> Result<bool, ExpressionError> {
    match op {
        CmpOp::Eq => Ok(values_equal(l, r)),
        CmpOp::Ne => Ok(!values_equal(l, r)),
        CmpOp::Lt | CmpOp::Le | CmpOp::Gt | CmpOp::Ge => {
            if let (Some(a), Some(b)) = (l.as_f64(), r.as_f64()) {
                Ok(match op {
                    CmpOp::Lt => a < b,
                    CmpOp::Le => a <= b,
                    CmpOp::Gt => a > b,
                    CmpOp::Ge => a >= b,
                    _ => unreachable!(),
                })
            } else if let (Some(a), Some(b)) = (l.as_str(), r.as_str()) {
                Ok(match op {
                    CmpOp::Lt => a < b,
                    CmpOp::Le => a <= b,
                    CmpOp::Gt => a > b,
                    CmpOp::Ge => a >= b,
                    _ => unreachable!(),
                })
            } else {
                Err(ExpressionError::TypeMismatch {
                    expression: expr_text.to_string(),
                    op: op.to_string(),
                    left: describe_value(l),
                    right: describe_value(r),
                })
            }
        }
    }
}

fn describe_value(v: &Value) -> String {
    match v {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "bool".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::String(_) => "string".to_string(),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

fn describe(expr: &Expr) -> String {
    match expr {
        Expr::Cmp(op, l, r) => format!("{} {} {}", describe(l), op, describe(r)),
        Expr::Ref(path) => path.display(),
        Expr::Lit(v) => v.to_string(),
        Expr::Not(inner) => format!("not {}", describe(inner)),
        Expr::And(l, r) => format!("{} and {}", describe(l), describe(r)),
        Expr::Or(l, r) => format!("{} or {}", describe(l), describe(r)),
    }
}

/// Parses and evaluates a guard/escalation expression in one step, reducing
/// the result to plain truthiness — the contract `run_if`/`intervention_if`
/// need.
pub fn eval_guard(expression: &str, ctx: &Context) -> Result<bool, EvalError> {
    let expr = super::parse(expression)?;
    let value = eval_expr(&expr, ctx)?;
    Ok(is_truthy(&value))
}
