//! # Expression Parsing
//!
//! Precedence ladder for the OpenSCAD-style dialect:
//!
//! ```text
//! ||  →  &&  →  == !=  →  < <= > >=  →  + -  →  * / %  →  ^  →  prefix
//! ```
//!
//! `^` is right associative. Brackets build vectors (`[1, 2, 3]`) or ranges
//! (`[lo:hi]`, `[lo:step:hi]`). The ternary operator is not part of this
//! grammar.

use super::ScadParser;
use crate::ast::{ScadExpression, ScadInfixOp, ScadPrefixOp};
use crate::lexer::{ScadKeyword, ScadTokenKind};
use shape_parser::ParseError;

impl ScadParser {
    /// Parse a full expression.
    pub(super) fn parse_expression(&mut self) -> Result<ScadExpression, ParseError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<ScadExpression, ParseError> {
        let mut lhs = self.parse_and()?;
        while self.match_token(&ScadTokenKind::PipePipe) {
            let rhs = self.parse_and()?;
            lhs = Self::infix(lhs, ScadInfixOp::Or, rhs);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<ScadExpression, ParseError> {
        let mut lhs = self.parse_equality()?;
        while self.match_token(&ScadTokenKind::AmpAmp) {
            let rhs = self.parse_equality()?;
            lhs = Self::infix(lhs, ScadInfixOp::And, rhs);
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> Result<ScadExpression, ParseError> {
        let mut lhs = self.parse_relational()?;
        loop {
            let op = match &self.peek().kind {
                ScadTokenKind::EqEq => ScadInfixOp::Equal,
                ScadTokenKind::BangEq => ScadInfixOp::NotEqual,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_relational()?;
            lhs = Self::infix(lhs, op, rhs);
        }
        Ok(lhs)
    }

    fn parse_relational(&mut self) -> Result<ScadExpression, ParseError> {
        let mut lhs = self.parse_sum()?;
        loop {
            let op = match &self.peek().kind {
                ScadTokenKind::Lt => ScadInfixOp::Less,
                ScadTokenKind::LtEq => ScadInfixOp::LessEqual,
                ScadTokenKind::Gt => ScadInfixOp::Greater,
                ScadTokenKind::GtEq => ScadInfixOp::GreaterEqual,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_sum()?;
            lhs = Self::infix(lhs, op, rhs);
        }
        Ok(lhs)
    }

    fn parse_sum(&mut self) -> Result<ScadExpression, ParseError> {
        let mut lhs = self.parse_product()?;
        loop {
            let op = match &self.peek().kind {
                ScadTokenKind::Plus => ScadInfixOp::Add,
                ScadTokenKind::Minus => ScadInfixOp::Subtract,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_product()?;
            lhs = Self::infix(lhs, op, rhs);
        }
        Ok(lhs)
    }

    fn parse_product(&mut self) -> Result<ScadExpression, ParseError> {
        let mut lhs = self.parse_power()?;
        loop {
            let op = match &self.peek().kind {
                ScadTokenKind::Star => ScadInfixOp::Multiply,
                ScadTokenKind::Slash => ScadInfixOp::Divide,
                ScadTokenKind::Percent => ScadInfixOp::Modulo,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_power()?;
            lhs = Self::infix(lhs, op, rhs);
        }
        Ok(lhs)
    }

    /// `^` is right associative: `2 ^ 3 ^ 2` is `2 ^ (3 ^ 2)`.
    fn parse_power(&mut self) -> Result<ScadExpression, ParseError> {
        let lhs = self.parse_prefix()?;
        if self.match_token(&ScadTokenKind::Caret) {
            let rhs = self.parse_power()?;
            return Ok(Self::infix(lhs, ScadInfixOp::Power, rhs));
        }
        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<ScadExpression, ParseError> {
        let op = match &self.peek().kind {
            ScadTokenKind::Minus => ScadPrefixOp::Negate,
            ScadTokenKind::Plus => ScadPrefixOp::Plus,
            ScadTokenKind::Bang => ScadPrefixOp::Not,
            _ => return self.parse_postfix(),
        };
        let start = self.peek().span;
        self.advance();
        let expr = self.parse_prefix()?;
        let span = self.span_from(start);
        Ok(ScadExpression::Prefix {
            op,
            expr: Box::new(expr),
            span,
        })
    }

    /// Parse call and member postfixes.
    fn parse_postfix(&mut self) -> Result<ScadExpression, ParseError> {
        let mut expr = self.parse_atom()?;
        loop {
            match &self.peek().kind {
                // Calls require a name; a parenthesized identifier (from the
                // lexer's synthetic parens) still qualifies.
                ScadTokenKind::LParen => {
                    let name = match &expr {
                        ScadExpression::Identifier(name, _) => name.clone(),
                        _ => return Err(self.unexpected("operator")),
                    };
                    self.advance();
                    let args = self.parse_arguments()?;
                    self.expect(&ScadTokenKind::RParen, "')' after arguments")?;
                    let span = self.span_from(expr.span());
                    expr = ScadExpression::Call { name, args, span };
                }
                ScadTokenKind::Dot => {
                    self.advance();
                    let (name, name_span) = self.expect_identifier("member name")?;
                    let span = expr.span().merge(&name_span);
                    expr = ScadExpression::Member {
                        expr: Box::new(expr),
                        name,
                        span,
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_atom(&mut self) -> Result<ScadExpression, ParseError> {
        let span = self.peek().span;
        match &self.peek().kind {
            ScadTokenKind::Number(value) => {
                let value = *value;
                self.advance();
                Ok(ScadExpression::Number(value, span))
            }
            ScadTokenKind::String(value) => {
                let value = value.clone();
                self.advance();
                Ok(ScadExpression::String(value, span))
            }
            ScadTokenKind::Keyword(ScadKeyword::True) => {
                self.advance();
                Ok(ScadExpression::Boolean(true, span))
            }
            ScadTokenKind::Keyword(ScadKeyword::False) => {
                self.advance();
                Ok(ScadExpression::Boolean(false, span))
            }
            ScadTokenKind::Keyword(ScadKeyword::Undef) => {
                self.advance();
                Ok(ScadExpression::Undefined(span))
            }
            ScadTokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(ScadExpression::Identifier(name, span))
            }
            ScadTokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(&ScadTokenKind::RParen, "')'")?;
                Ok(inner)
            }
            ScadTokenKind::LBracket => self.parse_vector_or_range(),
            _ => Err(self.unexpected("expression")),
        }
    }

    /// Parse `[a, b, c]` vectors and `[lo:hi]` / `[lo:step:hi]` ranges.
    fn parse_vector_or_range(&mut self) -> Result<ScadExpression, ParseError> {
        let start = self.peek().span;
        self.advance(); // '['

        if self.match_token(&ScadTokenKind::RBracket) {
            return Ok(ScadExpression::Vector(Vec::new(), self.span_from(start)));
        }

        let first = self.parse_expression()?;

        if self.match_token(&ScadTokenKind::Colon) {
            let second = self.parse_expression()?;
            let (step, end) = if self.match_token(&ScadTokenKind::Colon) {
                (Some(second), self.parse_expression()?)
            } else {
                (None, second)
            };
            self.expect(&ScadTokenKind::RBracket, "']' after range")?;
            return Ok(ScadExpression::Range {
                start: Box::new(first),
                step: step.map(Box::new),
                end: Box::new(end),
                span: self.span_from(start),
            });
        }

        let mut items = vec![first];
        while self.match_token(&ScadTokenKind::Comma) {
            if self.check(&ScadTokenKind::RBracket) {
                break; // trailing comma
            }
            items.push(self.parse_expression()?);
        }
        self.expect(&ScadTokenKind::RBracket, "']' after vector")?;
        Ok(ScadExpression::Vector(items, self.span_from(start)))
    }

    fn infix(lhs: ScadExpression, op: ScadInfixOp, rhs: ScadExpression) -> ScadExpression {
        let span = lhs.span().merge(&rhs.span());
        ScadExpression::Infix {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
            span,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ScadStatement;
    use crate::lexer::ScadLexer;

    fn expr(source: &str) -> ScadExpression {
        let tokens = ScadLexer::new(&format!("x = {source};"))
            .tokenize()
            .unwrap();
        match ScadParser::new(tokens).parse().unwrap().remove(0) {
            ScadStatement::Assignment { value, .. } => value,
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_precedence_ladder() {
        match expr("1 + 2 * 3 == 7 && true") {
            ScadExpression::Infix { op, lhs, .. } => {
                assert_eq!(op, ScadInfixOp::And);
                assert!(matches!(
                    *lhs,
                    ScadExpression::Infix {
                        op: ScadInfixOp::Equal,
                        ..
                    }
                ));
            }
            other => panic!("expected &&, got {other:?}"),
        }
    }

    #[test]
    fn test_power_right_associative() {
        match expr("2 ^ 3 ^ 2") {
            ScadExpression::Infix { op, rhs, .. } => {
                assert_eq!(op, ScadInfixOp::Power);
                assert!(matches!(
                    *rhs,
                    ScadExpression::Infix {
                        op: ScadInfixOp::Power,
                        ..
                    }
                ));
            }
            other => panic!("expected ^, got {other:?}"),
        }
    }

    #[test]
    fn test_vector_literal() {
        match expr("[1, 2, 3]") {
            ScadExpression::Vector(items, _) => assert_eq!(items.len(), 3),
            other => panic!("expected vector, got {other:?}"),
        }
    }

    #[test]
    fn test_range_two_part() {
        match expr("[0:10]") {
            ScadExpression::Range { step, .. } => assert!(step.is_none()),
            other => panic!("expected range, got {other:?}"),
        }
    }

    #[test]
    fn test_range_three_part() {
        match expr("[0:2:10]") {
            ScadExpression::Range { step, .. } => assert!(step.is_some()),
            other => panic!("expected range, got {other:?}"),
        }
    }

    #[test]
    fn test_call_with_named_args() {
        match expr("cylinder(h = 2, r = 1)") {
            ScadExpression::Call { name, args, .. } => {
                assert_eq!(name, "cylinder");
                assert_eq!(args.len(), 2);
                assert!(args.iter().all(|a| a.name.is_some()));
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn test_call_after_operator_with_synthetic_parens() {
        match expr("1 + cos(0)") {
            ScadExpression::Infix { op, rhs, .. } => {
                assert_eq!(op, ScadInfixOp::Add);
                assert!(matches!(*rhs, ScadExpression::Call { .. }));
            }
            other => panic!("expected sum, got {other:?}"),
        }
    }

    #[test]
    fn test_member_access() {
        match expr("v.x") {
            ScadExpression::Member { name, .. } => assert_eq!(name, "x"),
            other => panic!("expected member, got {other:?}"),
        }
    }

    #[test]
    fn test_unary_not() {
        match expr("!done") {
            ScadExpression::Prefix { op, .. } => assert_eq!(op, ScadPrefixOp::Not),
            other => panic!("expected prefix, got {other:?}"),
        }
    }
}
