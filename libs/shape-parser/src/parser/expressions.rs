//! # Expression Parsing
//!
//! Precedence-climbing expression parser.
//!
//! ## Precedence (loosest to tightest)
//!
//! ```text
//! range      :=  logic ("to" logic)? ("step" logic)?
//! logic      :=  equality (("and" | "or") equality)*
//! equality   :=  sum (("=" | "<>" | "<" | "<=" | ">" | ">=") sum)*
//! sum        :=  term (("+" | "-") term)*
//! term       :=  factor (("*" | "/") factor)*
//! factor     :=  ("-" | "+" | "not") factor | member
//! member     :=  atom ("." name)*
//! ```
//!
//! A `step` clause without `to` re-steps an existing range value, as in
//! `print range step 2`.

use super::Parser;
use crate::error::ParseError;
use crate::lexer::{Keyword, TokenKind};
use shape_ast::{Expression, ExpressionKind, Identifier, InfixOp, PrefixOp};

impl Parser {
    /// Parse one or more juxtaposed expressions into a single expression.
    ///
    /// Two or more adjacent expressions form an implicit tuple, which is how
    /// `color 1 0 0` carries three arguments.
    pub(super) fn parse_juxtaposed(&mut self) -> Result<Expression, ParseError> {
        let first = self.parse_expression()?;
        if !Self::starts_expression(&self.peek().kind) {
            return Ok(first);
        }
        let start = first.span;
        let mut items = vec![first];
        while Self::starts_expression(&self.peek().kind) {
            items.push(self.parse_expression()?);
        }
        let span = self.span_from(start);
        Ok(Expression::new(ExpressionKind::Tuple(items), span))
    }

    /// Parse a full expression (range precedence level).
    pub(super) fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        let from = self.parse_logic()?;
        let to = if self.match_keyword(Keyword::To) {
            Some(Box::new(self.parse_logic()?))
        } else {
            None
        };
        let step = if self.match_keyword(Keyword::Step) {
            Some(Box::new(self.parse_logic()?))
        } else {
            None
        };
        if to.is_none() && step.is_none() {
            return Ok(from);
        }
        let span = self.span_from(from.span);
        Ok(Expression::new(
            ExpressionKind::Range {
                from: Box::new(from),
                to,
                step,
            },
            span,
        ))
    }

    /// Parse `and`/`or` chains.
    fn parse_logic(&mut self) -> Result<Expression, ParseError> {
        let mut lhs = self.parse_equality()?;
        loop {
            let op = match &self.peek().kind {
                TokenKind::Keyword(Keyword::And) => InfixOp::And,
                TokenKind::Keyword(Keyword::Or) => InfixOp::Or,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_equality()?;
            let span = lhs.span.merge(&rhs.span);
            lhs = Expression::new(
                ExpressionKind::Infix {
                    lhs: Box::new(lhs),
                    op,
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
        Ok(lhs)
    }

    /// Parse equality and relational chains (left associative).
    fn parse_equality(&mut self) -> Result<Expression, ParseError> {
        let mut lhs = self.parse_sum()?;
        loop {
            let op = match &self.peek().kind {
                TokenKind::Assign => InfixOp::Equal,
                TokenKind::Infix(op @ (InfixOp::NotEqual
                | InfixOp::Less
                | InfixOp::LessEqual
                | InfixOp::Greater
                | InfixOp::GreaterEqual)) => *op,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_sum()?;
            let span = lhs.span.merge(&rhs.span);
            lhs = Expression::new(
                ExpressionKind::Infix {
                    lhs: Box::new(lhs),
                    op,
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
        Ok(lhs)
    }

    /// Parse `+`/`-` chains.
    fn parse_sum(&mut self) -> Result<Expression, ParseError> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match &self.peek().kind {
                TokenKind::Infix(op @ (InfixOp::Add | InfixOp::Subtract)) => *op,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_term()?;
            let span = lhs.span.merge(&rhs.span);
            lhs = Expression::new(
                ExpressionKind::Infix {
                    lhs: Box::new(lhs),
                    op,
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
        Ok(lhs)
    }

    /// Parse `*`/`/` chains.
    fn parse_term(&mut self) -> Result<Expression, ParseError> {
        let mut lhs = self.parse_factor()?;
        loop {
            let op = match &self.peek().kind {
                TokenKind::Infix(op @ (InfixOp::Multiply | InfixOp::Divide)) => *op,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_factor()?;
            let span = lhs.span.merge(&rhs.span);
            lhs = Expression::new(
                ExpressionKind::Infix {
                    lhs: Box::new(lhs),
                    op,
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
        Ok(lhs)
    }

    /// Parse prefix operators.
    fn parse_factor(&mut self) -> Result<Expression, ParseError> {
        let op = match &self.peek().kind {
            TokenKind::Prefix(op) => *op,
            _ => return self.parse_member(),
        };
        let start = self.peek().span;
        self.advance();
        let rhs = self.parse_factor()?;
        let span = self.span_from(start);
        Ok(Expression::new(
            ExpressionKind::Prefix {
                op,
                rhs: Box::new(rhs),
            },
            span,
        ))
    }

    /// Parse member access chains, the tightest binding.
    fn parse_member(&mut self) -> Result<Expression, ParseError> {
        let mut expr = self.parse_atom()?;
        while self.match_token(&TokenKind::Dot) {
            let name = self.expect_member_name()?;
            let span = expr.span.merge(&name.span);
            expr = Expression::new(
                ExpressionKind::Member {
                    lhs: Box::new(expr),
                    name,
                },
                span,
            );
        }
        Ok(expr)
    }

    /// Member names may collide with keywords (`range.step`).
    fn expect_member_name(&mut self) -> Result<Identifier, ParseError> {
        let token = self.peek();
        let name = match &token.kind {
            TokenKind::Identifier(name) => name.clone(),
            TokenKind::Keyword(keyword) => keyword.display().to_string(),
            _ => return Err(self.unexpected("member name")),
        };
        let span = token.span;
        self.advance();
        Ok(Identifier::new(name, span))
    }

    /// Parse an atomic expression.
    fn parse_atom(&mut self) -> Result<Expression, ParseError> {
        let span = self.peek().span;
        match &self.peek().kind {
            TokenKind::Number(value) => {
                let value = *value;
                self.advance();
                Ok(Expression::new(ExpressionKind::Number(value), span))
            }
            TokenKind::String(value) => {
                let value = value.clone();
                self.advance();
                Ok(Expression::new(ExpressionKind::String(value), span))
            }
            TokenKind::HexColor(digits) => {
                let digits = digits.clone();
                self.advance();
                Ok(Expression::new(ExpressionKind::HexColor(digits), span))
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                Ok(Expression::new(
                    ExpressionKind::Identifier("true".to_string()),
                    span,
                ))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                Ok(Expression::new(
                    ExpressionKind::Identifier("false".to_string()),
                    span,
                ))
            }
            TokenKind::Identifier(name) => {
                let name = Identifier::new(name.clone(), span);
                self.advance();
                if self.block_atoms_allowed() && self.check(&TokenKind::LBrace) {
                    let block = self.parse_block()?;
                    let span = self.span_from(name.span);
                    Ok(Expression::new(
                        ExpressionKind::Block { name, block },
                        span,
                    ))
                } else {
                    let name_span = name.span;
                    Ok(Expression::new(
                        ExpressionKind::Identifier(name.name),
                        name_span,
                    ))
                }
            }
            TokenKind::LParen => self.parse_paren(),
            _ => Err(self.unexpected("expression")),
        }
    }

    /// Parse a parenthesized expression or tuple.
    ///
    /// A single inner expression is grouping; two or more (juxtaposed or
    /// comma separated) form a tuple.
    fn parse_paren(&mut self) -> Result<Expression, ParseError> {
        let start = self.peek().span;
        self.advance(); // '('

        // Parens re-enable block invocation atoms even inside if/for headers.
        let saved = self.block_atoms;
        self.block_atoms = true;
        let result = self.parse_paren_items(start);
        self.block_atoms = saved;
        result
    }

    fn parse_paren_items(
        &mut self,
        start: shape_ast::Span,
    ) -> Result<Expression, ParseError> {
        let mut items = Vec::new();
        loop {
            if self.check(&TokenKind::RParen) {
                if items.is_empty() {
                    return Err(self.unexpected("expression"));
                }
                break;
            }
            items.push(self.parse_expression()?);
            self.match_token(&TokenKind::Comma);
            if !Self::starts_expression(&self.peek().kind) && !self.check(&TokenKind::RParen) {
                return Err(self.unexpected("')'"));
            }
        }
        self.advance(); // ')'
        let span = self.span_from(start);

        if items.len() == 1 {
            let mut only = items.pop().expect("one element");
            // Grouping keeps the inner expression but widens its span to the
            // parens, so diagnostics underline what the user wrote.
            only.span = span;
            Ok(only)
        } else {
            Ok(Expression::new(ExpressionKind::Tuple(items), span))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
