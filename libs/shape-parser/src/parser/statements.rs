//! # Statement Parsing
//!
//! Parses ShapeScript statements: commands, definitions, loops,
//! conditionals, imports, and bare blocks.

use super::Parser;
use crate::error::ParseError;
use crate::lexer::{Keyword, TokenKind};
use shape_ast::{
    diagnostic, Block, Definition, Expression, ExpressionKind, Identifier, Statement,
    StatementKind,
};

impl Parser {
    /// Parse a single statement.
    pub(super) fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        match &self.peek().kind {
            TokenKind::Keyword(Keyword::Define) => self.parse_define(),
            TokenKind::Keyword(Keyword::Option) => self.parse_option(),
            TokenKind::Keyword(Keyword::For) => self.parse_for(),
            TokenKind::Keyword(Keyword::If) => self.parse_if(),
            TokenKind::Keyword(Keyword::Import) => self.parse_import(),
            TokenKind::LBrace => {
                let block = self.parse_block()?;
                let span = block.span;
                Ok(Statement::new(StatementKind::Block(block), span))
            }
            TokenKind::Identifier(_) => self.parse_command_or_expression(),
            kind if Self::starts_expression(kind) => self.parse_expression_statement(),
            _ => Err(self.unexpected("statement")),
        }
    }

    /// True for tokens that can begin an expression.
    pub(super) fn starts_expression(kind: &TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::Number(_)
                | TokenKind::String(_)
                | TokenKind::HexColor(_)
                | TokenKind::Identifier(_)
                | TokenKind::LParen
                | TokenKind::Prefix(_)
                | TokenKind::Keyword(Keyword::True)
                | TokenKind::Keyword(Keyword::False)
        )
    }

    /// Parse `define name <expression | block>`.
    fn parse_define(&mut self) -> Result<Statement, ParseError> {
        let start = self.peek().span;
        self.advance();
        let name = self.expect_name("name for the definition")?;
        let definition = if self.check(&TokenKind::LBrace) {
            Definition::Block(self.parse_block()?)
        } else {
            Definition::Expression(self.parse_juxtaposed()?)
        };
        let span = self.span_from(start);
        Ok(Statement::new(
            StatementKind::Define { name, definition },
            span,
        ))
    }

    /// Parse `option name <default>`.
    ///
    /// Only meaningful inside a custom block definition; the evaluator
    /// rejects it elsewhere so the parser stays permissive.
    fn parse_option(&mut self) -> Result<Statement, ParseError> {
        let start = self.peek().span;
        self.advance();
        let name = self.expect_name("name for the option")?;
        let default = self.parse_juxtaposed()?;
        let span = self.span_from(start);
        Ok(Statement::new(StatementKind::Option { name, default }, span))
    }

    /// Parse `for (index in)? sequence { body }`.
    fn parse_for(&mut self) -> Result<Statement, ParseError> {
        let start = self.peek().span;
        self.advance();

        let index = if matches!(self.peek().kind, TokenKind::Identifier(_))
            && matches!(self.peek_at(1).kind, TokenKind::Keyword(Keyword::In))
        {
            let token = self.advance();
            let ident = match &token.kind {
                TokenKind::Identifier(name) => Identifier::new(name.clone(), token.span),
                _ => unreachable!("checked above"),
            };
            self.advance(); // `in`
            Some(ident)
        } else {
            None
        };

        let sequence = self.without_block_atoms(|p| p.parse_expression())?;

        if !self.check(&TokenKind::LBrace) {
            // A stray word between the sequence and the body is usually a
            // misspelled `in` or `step`.
            let mut error = self.unexpected("loop body");
            if let TokenKind::Identifier(name) = &self.peek().kind {
                if let Some(hit) =
                    diagnostic::suggest_with_aliases(name, ["in", "to", "step"].into_iter())
                {
                    error = error.with_suggestion(hit);
                }
            }
            return Err(error);
        }
        let body = self.parse_block()?;
        let span = self.span_from(start);
        Ok(Statement::new(
            StatementKind::ForLoop {
                index,
                sequence,
                body,
            },
            span,
        ))
    }

    /// Parse `if condition { body } (else (if ... | { body }))?`.
    ///
    /// `else` must follow the closing brace on the same line; a terminator
    /// ends the statement.
    fn parse_if(&mut self) -> Result<Statement, ParseError> {
        let start = self.peek().span;
        self.advance();

        let condition = self.without_block_atoms(|p| p.parse_expression())?;
        if !self.check(&TokenKind::LBrace) {
            return Err(self.unexpected("condition body"));
        }
        let body = self.parse_block()?;

        let else_body = if self.match_keyword(Keyword::Else) {
            if self.check_keyword(Keyword::If) {
                let nested = self.parse_if()?;
                let span = nested.span;
                Some(Block::new(vec![nested], span))
            } else if self.check(&TokenKind::LBrace) {
                Some(self.parse_block()?)
            } else {
                return Err(self.unexpected("block or 'if' after 'else'"));
            }
        } else {
            None
        };

        let span = self.span_from(start);
        Ok(Statement::new(
            StatementKind::IfElse {
                condition,
                body,
                else_body,
            },
            span,
        ))
    }

    /// Parse `import <expression>`.
    fn parse_import(&mut self) -> Result<Statement, ParseError> {
        let start = self.peek().span;
        self.advance();
        let path = self.parse_expression()?;
        let span = self.span_from(start);
        Ok(Statement::new(StatementKind::Import(path), span))
    }

    /// Parse a statement that starts with an identifier: a command, a block
    /// invocation, or a member expression.
    fn parse_command_or_expression(&mut self) -> Result<Statement, ParseError> {
        let token = self.advance();
        let name = match &token.kind {
            TokenKind::Identifier(name) => Identifier::new(name.clone(), token.span),
            _ => unreachable!("caller checked for identifier"),
        };
        let start = name.span;

        match &self.peek().kind {
            // `cube { ... }` is a block invocation used as a statement.
            TokenKind::LBrace => {
                let block = self.parse_block()?;
                let span = self.span_from(start);
                let expr = Expression::new(ExpressionKind::Block { name, block }, span);
                Ok(Statement::new(StatementKind::Expression(expr), span))
            }
            // `v.x ...` is an expression statement; rewind and reparse.
            TokenKind::Dot => {
                self.current -= 1;
                self.parse_expression_statement()
            }
            // Anything else is a command with zero or more arguments.
            _ => {
                let argument = if Self::starts_expression(&self.peek().kind) {
                    Some(self.parse_juxtaposed()?)
                } else {
                    None
                };
                let span = self.span_from(start);
                Ok(Statement::new(
                    StatementKind::Command { name, argument },
                    span,
                ))
            }
        }
    }

    /// Parse a bare expression statement (juxtaposition forms a tuple).
    fn parse_expression_statement(&mut self) -> Result<Statement, ParseError> {
        let expr = self.parse_juxtaposed()?;
        let span = expr.span;
        Ok(Statement::new(StatementKind::Expression(expr), span))
    }

    /// Expect an identifier and convert it to an AST identifier.
    fn expect_name(&mut self, expected: &str) -> Result<Identifier, ParseError> {
        match &self.peek().kind {
            TokenKind::Identifier(name) => {
                let ident = Identifier::new(name.clone(), self.peek().span);
                self.advance();
                Ok(ident)
            }
            TokenKind::Keyword(keyword) => {
                let keyword = *keyword;
                Err(self
                    .unexpected(expected)
                    .with_hint(format!("'{}' is a reserved word.", keyword.display())))
            }
            _ => Err(self.unexpected(expected)),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(source: &str) -> Vec<Statement> {
        let tokens = Lexer::new(source).tokenize().unwrap();
        Parser::new(tokens).parse().unwrap()
    }

    fn parse_err(source: &str) -> ParseError {
        let tokens = Lexer::new(source).tokenize().unwrap();
        Parser::new(tokens).parse().unwrap_err()
    }

    fn first(source: &str) -> StatementKind {
        parse(source).remove(0).kind
    }

    #[test]
    fn test_parse_define_expression() {
        match first("define x 1 2 3") {
            StatementKind::Define { name, definition } => {
                assert_eq!(name.name, "x");
                assert!(matches!(
                    definition,
                    Definition::Expression(Expression {
                        kind: ExpressionKind::Tuple(_),
                        ..
                    })
                ));
            }
            other => panic!("expected define, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_define_block() {
        match first("define wheel {\n    cylinder\n}") {
            StatementKind::Define { definition, .. } => {
                assert!(matches!(definition, Definition::Block(_)));
            }
            other => panic!("expected define, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_define_rejects_keyword_name() {
        let error = parse_err("define for 1");
        assert!(error.hint.unwrap().contains("reserved word"));
    }

    #[test]
    fn test_parse_command_arguments_form_tuple() {
        match first("color 1 0 0") {
            StatementKind::Command { name, argument } => {
                assert_eq!(name.name, "color");
                match argument.unwrap().kind {
                    ExpressionKind::Tuple(items) => assert_eq!(items.len(), 3),
                    other => panic!("expected tuple, got {other:?}"),
                }
            }
            other => panic!("expected command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_command_without_arguments() {
        match first("cube") {
            StatementKind::Expression(_) => panic!("bare name should be a command"),
            StatementKind::Command { argument, .. } => assert!(argument.is_none()),
            other => panic!("expected command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_block_invocation_statement() {
        match first("cube { size 2 }") {
            StatementKind::Expression(expr) => {
                assert!(matches!(expr.kind, ExpressionKind::Block { .. }));
            }
            other => panic!("expected block invocation, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_for_with_index() {
        match first("for i in 1 to 3 { cube }") {
            StatementKind::ForLoop {
                index, sequence, ..
            } => {
                assert_eq!(index.unwrap().name, "i");
                assert!(matches!(sequence.kind, ExpressionKind::Range { .. }));
            }
            other => panic!("expected for loop, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_for_without_index() {
        match first("for 3 to 1 { cube }") {
            StatementKind::ForLoop { index, .. } => assert!(index.is_none()),
            other => panic!("expected for loop, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_for_misspelled_in_suggests() {
        let error = parse_err("for i inn 1 to 3 { cube }");
        assert_eq!(error.suggestion.as_deref(), Some("in"));
    }

    #[test]
    fn test_parse_if_else_chain() {
        match first("if a { cube } else if b { sphere } else { cone }") {
            StatementKind::IfElse { else_body, .. } => {
                let else_block = else_body.unwrap();
                assert_eq!(else_block.statements.len(), 1);
                assert!(matches!(
                    else_block.statements[0].kind,
                    StatementKind::IfElse { .. }
                ));
            }
            other => panic!("expected if/else, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_if_condition_does_not_eat_body() {
        // The `{` after the condition is the body, not a block invocation.
        match first("if visible { cube }") {
            StatementKind::IfElse {
                condition, body, ..
            } => {
                assert!(matches!(condition.kind, ExpressionKind::Identifier(_)));
                assert_eq!(body.statements.len(), 1);
            }
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_import() {
        match first("import \"lib.shape\"") {
            StatementKind::Import(expr) => {
                assert!(matches!(expr.kind, ExpressionKind::String(_)));
            }
            other => panic!("expected import, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_member_expression_statement() {
        match first("v.x") {
            StatementKind::Expression(expr) => {
                assert!(matches!(expr.kind, ExpressionKind::Member { .. }));
            }
            other => panic!("expected expression, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_option_statement() {
        match first("option radius 1") {
            StatementKind::Option { name, .. } => assert_eq!(name.name, "radius"),
            other => panic!("expected option, got {other:?}"),
        }
    }
}
