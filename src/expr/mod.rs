//! The restricted expression sub-language shared by `$step.path` argument
//! references and `run_if`/`intervention_if` guard expressions.
//!
//! One lexer and one recursive-descent parser back both surfaces, per the
//! design note that "two surfaces share one parser": a bare reference is a
//! valid [`Expr`] all by itself (evaluated for truthiness), and the same
//! `ref` production is what an `args` value resolves through when its
//! entire string is a `$`-path.

mod ast;
mod eval;
mod lexer;
mod parser;
mod reference;
mod resolve;

pub use ast::{CmpOp, Expr};
pub use eval::{eval_guard, eval_expr};
pub use reference::{try_parse_full, RefPath};
pub use resolve::resolve_args;

use crate::error::ExpressionError;

/// Parses a guard/escalation expression against the full grammar.
pub fn parse(expression: &str) -> Result<Expr, ExpressionError> {
    let tokens = lexer::lex(expression).map_err(|reason| ExpressionError::ParseError {
        expression: expression.to_string(),
        reason,
    })?;
    parser::parse_tokens(&tokens).map_err(|reason| ExpressionError::ParseError {
        expression: expression.to_string(),
        reason,
    })
}
