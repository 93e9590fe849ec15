//! Recursive-descent parser over the token stream produced by [`super::lexer`].
//!
//! One function per grammar production, each named for the nonterminal it
//! parses, mirroring the guard grammar line for line.

use serde_json::json;

use super::ast::{CmpOp, Expr};
use super::lexer::Token;

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

pub(super) fn parse_tokens(tokens: &[Token]) -> Result<Expr, String> {
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(format!(
            "unexpected trailing tokens starting at position {}",
            parser.pos
        ));
    }
    Ok(expr)
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    /// expr := or
    fn expr(&mut self) -> Result<Expr, String> {
        self.or()
    }

    /// or := and ('or' and)*
    fn or(&mut self) -> Result<Expr, String> {
        let mut left = self.and()?;
        while matches!(self.peek(), Some(Token::Or)) {
            self.advance();
            let right = self.and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    /// and := not ('and' not)*
    fn and(&mut self) -> Result<Expr, String> {
        let mut left = self.not()?;
        while matches!(self.peek(), Some(Token::And)) {
            self.advance();
            let right = self.not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    /// not := 'not' not | cmp
    fn not(&mut self) -> Result<Expr, String> {
        if matches!(self.peek(), Some(Token::Not)) {
            self.advance();
            let inner = self.not()?;
            Ok(Expr::Not(Box::new(inner)))
        } else {
            self.cmp()
        }
    }

    /// cmp := atom (cmp_op atom)?
    fn cmp(&mut self) -> Result<Expr, String> {
        let left = self.atom()?;
        let op = match self.peek() {
            Some(Token::Eq) => CmpOp::Eq,
            Some(Token::Ne) => CmpOp::Ne,
            Some(Token::Lt) => CmpOp::Lt,
            Some(Token::Le) => CmpOp::Le,
            Some(Token::Gt) => CmpOp::Gt,
            Some(Token::Ge) => CmpOp::Ge,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.atom()?;
        Ok(Expr::Cmp(op, Box::new(left), Box::new(right)))
    }

    /// atom := ref | number | string | 'true' | 'false' | 'null' | '(' expr ')'
    fn atom(&mut self) -> Result<Expr, String> {
        match self.advance() {
            Some(Token::Ref(path)) => Ok(Expr::Ref(path.clone())),
            Some(Token::Number(n)) => Ok(Expr::Lit(json!(n))),
            Some(Token::Str(s)) => Ok(Expr::Lit(json!(s))),
            Some(Token::True) => Ok(Expr::Lit(json!(true))),
            Some(Token::False) => Ok(Expr::Lit(json!(false))),
            Some(Token::Null) => Ok(Expr::Lit(serde_json::Value::Null)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err("expected closing ')'".to_string()),
                }
            }
            Some(other) => Err(format!("unexpected token {other:?}")),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}
