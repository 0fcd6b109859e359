//! # OpenSCAD-style Parser
//!
//! Recursive descent parser for the secondary dialect.
//!
//! ## Grammar
//!
//! ```text
//! statement = module_def | function_def | for | if | let | block
//!           | assignment | module_call
//! module_call = identifier "(" arguments ")" (";" | statement | block)
//! ```
//!
//! A module call may chain a single trailing statement, which is how
//! `translate(...) rotate(...) cube();` nests transforms.

mod expressions;
mod statements;

use crate::ast::ScadStatement;
use crate::lexer::{ScadKeyword, ScadToken, ScadTokenKind};
use shape_ast::Span;
use shape_parser::ParseError;

// =============================================================================
// PARSER
// =============================================================================

/// Recursive descent parser for the OpenSCAD-style dialect.
///
/// ## Example
///
/// ```rust
/// use scad_parser::{lexer::ScadLexer, parser::ScadParser};
///
/// let tokens = ScadLexer::new("cube(10);").tokenize().unwrap();
/// let statements = ScadParser::new(tokens).parse().unwrap();
/// assert_eq!(statements.len(), 1);
/// ```
pub struct ScadParser {
    /// Token stream, ending with EOF.
    tokens: Vec<ScadToken>,
    /// Current token index.
    current: usize,
}

impl ScadParser {
    /// Create a new parser over a token stream.
    pub fn new(tokens: Vec<ScadToken>) -> Self {
        Self { tokens, current: 0 }
    }

    /// Parse the entire token stream into a statement list.
    pub fn parse(mut self) -> Result<Vec<ScadStatement>, ParseError> {
        let mut statements = Vec::new();
        while !self.at_eof() {
            // Stray semicolons are empty statements.
            if self.match_token(&ScadTokenKind::Semicolon) {
                continue;
            }
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    // =========================================================================
    // TOKEN ACCESS
    // =========================================================================

    /// Get current token.
    pub(super) fn peek(&self) -> &ScadToken {
        self.tokens
            .get(self.current)
            .unwrap_or_else(|| self.tokens.last().expect("token stream ends with EOF"))
    }

    /// Look `offset` tokens past the current one.
    pub(super) fn peek_at(&self, offset: usize) -> &ScadToken {
        self.tokens
            .get(self.current + offset)
            .unwrap_or_else(|| self.tokens.last().expect("token stream ends with EOF"))
    }

    /// Check if the current token matches a kind exactly.
    pub(super) fn check(&self, kind: &ScadTokenKind) -> bool {
        &self.peek().kind == kind
    }

    /// Check if the current token is the given keyword.
    pub(super) fn check_keyword(&self, keyword: ScadKeyword) -> bool {
        matches!(&self.peek().kind, ScadTokenKind::Keyword(k) if *k == keyword)
    }

    /// Check if at end of file.
    pub(super) fn at_eof(&self) -> bool {
        self.peek().is_eof()
    }

    /// Advance to the next token and return the consumed one.
    pub(super) fn advance(&mut self) -> &ScadToken {
        if !self.at_eof() {
            self.current += 1;
        }
        &self.tokens[self.current.saturating_sub(1)]
    }

    /// Consume the current token if it matches.
    pub(super) fn match_token(&mut self, kind: &ScadTokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume the current token if it is the given keyword.
    pub(super) fn match_keyword(&mut self, keyword: ScadKeyword) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Require a specific token, or fail with an unexpected-token error.
    pub(super) fn expect(
        &mut self,
        kind: &ScadTokenKind,
        expected: &str,
    ) -> Result<Span, ParseError> {
        if self.check(kind) {
            Ok(self.advance().span)
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// Require an identifier and return its text.
    pub(super) fn expect_identifier(&mut self, expected: &str) -> Result<(String, Span), ParseError> {
        match &self.peek().kind {
            ScadTokenKind::Identifier(name) => {
                let name = name.clone();
                let span = self.peek().span;
                self.advance();
                Ok((name, span))
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    /// Build an unexpected-token error at the current token.
    pub(super) fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.peek();
        ParseError::unexpected_token(token.kind.display(), Some(expected), token.span)
    }

    /// Span helper for nodes built from a start span up to the previous
    /// token.
    pub(super) fn span_from(&self, start: Span) -> Span {
        let end = self.tokens[self.current.saturating_sub(1)].span;
        start.merge(&end)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::ScadLexer;

    fn parse(source: &str) -> Vec<ScadStatement> {
        let tokens = ScadLexer::new(source).tokenize().unwrap();
        ScadParser::new(tokens).parse().unwrap()
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse("").is_empty());
        assert!(parse(";;;").is_empty());
    }

    #[test]
    fn test_parse_multiple_statements() {
        let statements = parse("cube(10); sphere(5);");
        assert_eq!(statements.len(), 2);
    }

    #[test]
    fn test_parse_does_not_recover() {
        let tokens = ScadLexer::new("cube(; sphere(5);").tokenize().unwrap();
        assert!(ScadParser::new(tokens).parse().is_err());
    }
}
