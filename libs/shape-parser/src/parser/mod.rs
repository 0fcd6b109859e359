//! # ShapeScript Parser
//!
//! Recursive descent parser producing the `shape-ast` syntax tree.
//!
//! ## Grammar
//!
//! ```text
//! program    := statement*
//! statement  := define | option | forloop | ifelse | import | command | block
//! command    := identifier expression*            // args form an implicit tuple
//! block      := "{" statement* "}"
//! ```
//!
//! Statements are separated by terminators (linebreaks or `;`). The parser
//! stops at the first error; there is no recovery mode.

mod expressions;
mod statements;

use crate::error::ParseError;
use crate::lexer::{Keyword, Token, TokenKind};
use shape_ast::{Block, Span, Statement};

// =============================================================================
// PARSER
// =============================================================================

/// Recursive descent parser for ShapeScript.
///
/// ## Example
///
/// ```rust
/// use shape_parser::{lexer::Lexer, parser::Parser};
///
/// let tokens = Lexer::new("cube { size 2 }").tokenize().unwrap();
/// let statements = Parser::new(tokens).parse().unwrap();
/// assert_eq!(statements.len(), 1);
/// ```
pub struct Parser {
    /// Token stream, ending with EOF.
    tokens: Vec<Token>,
    /// Current token index.
    current: usize,
    /// Whether `identifier {` parses as a block invocation at this point.
    ///
    /// Disabled while parsing `if` conditions and `for` sequences so the
    /// brace that follows reads as the statement body.
    block_atoms: bool,
}

impl Parser {
    /// Create a new parser over a token stream.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            block_atoms: true,
        }
    }

    /// Parse the entire token stream into a statement list.
    pub fn parse(mut self) -> Result<Vec<Statement>, ParseError> {
        let mut statements = Vec::new();
        self.skip_terminators();
        while !self.at_eof() {
            statements.push(self.parse_statement()?);
            self.expect_statement_end(false)?;
        }
        Ok(statements)
    }

    // =========================================================================
    // TOKEN ACCESS
    // =========================================================================

    /// Get current token.
    pub(super) fn peek(&self) -> &Token {
        self.tokens
            .get(self.current)
            .unwrap_or_else(|| self.tokens.last().expect("token stream ends with EOF"))
    }

    /// Look `offset` tokens past the current one.
    pub(super) fn peek_at(&self, offset: usize) -> &Token {
        self.tokens
            .get(self.current + offset)
            .unwrap_or_else(|| self.tokens.last().expect("token stream ends with EOF"))
    }

    /// Check if the current token matches a kind exactly.
    pub(super) fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    /// Check if the current token is the given keyword.
    pub(super) fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(&self.peek().kind, TokenKind::Keyword(k) if *k == keyword)
    }

    /// Check if at end of file.
    pub(super) fn at_eof(&self) -> bool {
        self.peek().is_eof()
    }

    /// Advance to the next token and return the consumed one.
    pub(super) fn advance(&mut self) -> &Token {
        if !self.at_eof() {
            self.current += 1;
        }
        &self.tokens[self.current.saturating_sub(1)]
    }

    /// Consume the current token if it matches.
    pub(super) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume the current token if it is the given keyword.
    pub(super) fn match_keyword(&mut self, keyword: Keyword) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Skip a run of terminator tokens.
    pub(super) fn skip_terminators(&mut self) {
        while self.check(&TokenKind::Terminator) {
            self.advance();
        }
    }

    /// Build an unexpected-token error at the current token.
    pub(super) fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.peek();
        ParseError::unexpected_token(token.kind.display(), Some(expected), token.span)
    }

    // =========================================================================
    // STRUCTURE
    // =========================================================================

    /// Require a terminator (or closing delimiter / EOF) after a statement.
    pub(super) fn expect_statement_end(&mut self, in_block: bool) -> Result<(), ParseError> {
        match &self.peek().kind {
            TokenKind::Terminator => {
                self.skip_terminators();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            TokenKind::RBrace if in_block => Ok(()),
            _ => Err(self.unexpected("end of statement")),
        }
    }

    /// Parse a braced block of statements.
    pub(super) fn parse_block(&mut self) -> Result<Block, ParseError> {
        let start = self.peek().span;
        if !self.match_token(&TokenKind::LBrace) {
            return Err(self.unexpected("'{'"));
        }
        // Statement bodies always allow block invocations again, even when
        // the surrounding `if`/`for` header disabled them.
        let saved = self.block_atoms;
        self.block_atoms = true;

        let mut statements = Vec::new();
        self.skip_terminators();
        while !self.check(&TokenKind::RBrace) {
            if self.at_eof() {
                self.block_atoms = saved;
                return Err(self.unexpected("'}'"));
            }
            statements.push(self.parse_statement()?);
            self.expect_statement_end(true)?;
        }
        let end = self.advance().span; // consume '}'
        self.block_atoms = saved;
        Ok(Block::new(statements, start.merge(&end)))
    }

    /// Run `parse` with block-invocation atoms disabled.
    pub(super) fn without_block_atoms<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let saved = self.block_atoms;
        self.block_atoms = false;
        let result = parse(self);
        self.block_atoms = saved;
        result
    }

    /// Whether a block invocation may start at the current position.
    pub(super) fn block_atoms_allowed(&self) -> bool {
        self.block_atoms
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
    use crate::lexer::Lexer;
    use shape_ast::StatementKind;

    fn parse(source: &str) -> Vec<Statement> {
        let tokens = Lexer::new(source).tokenize().unwrap();
        Parser::new(tokens).parse().unwrap()
    }

    fn parse_err(source: &str) -> ParseError {
        let tokens = Lexer::new(source).tokenize().unwrap();
        Parser::new(tokens).parse().unwrap_err()
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse("").is_empty());
        assert!(parse("\n\n").is_empty());
    }

    #[test]
    fn test_parse_statements_need_separators() {
        let error = parse_err("cube } ");
        assert!(matches!(
            error.kind,
            crate::error::ParseErrorKind::UnexpectedToken { .. }
        ));
    }

    #[test]
    fn test_parse_semicolon_separator() {
        let statements = parse("cube; sphere");
        assert_eq!(statements.len(), 2);
    }

    #[test]
    fn test_parse_unclosed_block() {
        let error = parse_err("group {\ncube\n");
        assert!(error.message().contains("end of file"));
    }

    #[test]
    fn test_statement_spans_cover_source() {
        let source = "color 1 0 0";
        let statements = parse(source);
        assert_eq!(statements[0].span, Span::new(0, source.len()));
        assert!(matches!(
            statements[0].kind,
            StatementKind::Command { .. }
        ));
    }
}
