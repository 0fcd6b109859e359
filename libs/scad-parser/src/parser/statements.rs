//! # Statement Parsing
//!
//! Parses OpenSCAD-style statements: module calls with chained children,
//! assignments, definitions, and control flow.

use super::ScadParser;
use crate::ast::{ScadArgument, ScadParameter, ScadStatement};
use crate::lexer::{ScadKeyword, ScadTokenKind};
use shape_parser::ParseError;

impl ScadParser {
    /// Parse a single statement.
    pub(super) fn parse_statement(&mut self) -> Result<ScadStatement, ParseError> {
        match &self.peek().kind {
            ScadTokenKind::Keyword(ScadKeyword::Module) => self.parse_module_definition(),
            ScadTokenKind::Keyword(ScadKeyword::Function) => self.parse_function_definition(),
            ScadTokenKind::Keyword(ScadKeyword::For) => self.parse_for(),
            ScadTokenKind::Keyword(ScadKeyword::If) => self.parse_if(),
            ScadTokenKind::Keyword(ScadKeyword::Let) => self.parse_let(),
            ScadTokenKind::LBrace => self.parse_block_statement(),
            ScadTokenKind::Identifier(_) => self.parse_identifier_statement(),
            _ => Err(self.unexpected("statement")),
        }
    }

    /// Parse a statement starting with an identifier: an assignment or a
    /// module call.
    fn parse_identifier_statement(&mut self) -> Result<ScadStatement, ParseError> {
        let (name, start) = self.expect_identifier("statement")?;

        if self.match_token(&ScadTokenKind::Assign) {
            let value = self.parse_expression()?;
            self.expect(&ScadTokenKind::Semicolon, "';' after assignment")?;
            let span = self.span_from(start);
            return Ok(ScadStatement::Assignment { name, value, span });
        }

        self.expect(&ScadTokenKind::LParen, "'(' after module name")?;
        let args = self.parse_arguments()?;
        self.expect(&ScadTokenKind::RParen, "')' after arguments")?;
        let head_span = self.span_from(start);

        // `;` ends the chain; a block or a single statement nests children.
        let children = if self.match_token(&ScadTokenKind::Semicolon) {
            Vec::new()
        } else if self.check(&ScadTokenKind::LBrace) {
            self.parse_braced_statements()?
        } else {
            vec![self.parse_statement()?]
        };

        Ok(ScadStatement::Command {
            name,
            args,
            children,
            span: head_span,
        })
    }

    /// Parse `module name(params) body`.
    fn parse_module_definition(&mut self) -> Result<ScadStatement, ParseError> {
        let start = self.peek().span;
        self.advance();
        let (name, _) = self.expect_identifier("module name")?;
        let params = self.parse_parameters()?;
        let body = self.parse_body()?;
        let span = self.span_from(start);
        Ok(ScadStatement::ModuleDefinition {
            name,
            params,
            body,
            span,
        })
    }

    /// Parse `function name(params) = expression;`.
    fn parse_function_definition(&mut self) -> Result<ScadStatement, ParseError> {
        let start = self.peek().span;
        self.advance();
        let (name, _) = self.expect_identifier("function name")?;
        let params = self.parse_parameters()?;
        self.expect(&ScadTokenKind::Assign, "'=' after function head")?;
        let body = self.parse_expression()?;
        self.expect(&ScadTokenKind::Semicolon, "';' after function body")?;
        let span = self.span_from(start);
        Ok(ScadStatement::FunctionDefinition {
            name,
            params,
            body,
            span,
        })
    }

    /// Parse `for (i = sequence) body`.
    fn parse_for(&mut self) -> Result<ScadStatement, ParseError> {
        let start = self.peek().span;
        self.advance();
        self.expect(&ScadTokenKind::LParen, "'(' after 'for'")?;
        let (variable, _) = self.expect_identifier("loop variable")?;
        self.expect(&ScadTokenKind::Assign, "'=' after loop variable")?;
        let sequence = self.parse_expression()?;
        self.expect(&ScadTokenKind::RParen, "')' after loop range")?;
        let body = self.parse_body()?;
        let span = self.span_from(start);
        Ok(ScadStatement::ForLoop {
            variable,
            sequence,
            body,
            span,
        })
    }

    /// Parse `if (condition) body (else body)?`.
    fn parse_if(&mut self) -> Result<ScadStatement, ParseError> {
        let start = self.peek().span;
        self.advance();
        self.expect(&ScadTokenKind::LParen, "'(' after 'if'")?;
        let condition = self.parse_expression()?;
        self.expect(&ScadTokenKind::RParen, "')' after condition")?;
        let body = self.parse_body()?;
        let else_body = if self.match_keyword(ScadKeyword::Else) {
            Some(self.parse_body()?)
        } else {
            None
        };
        let span = self.span_from(start);
        Ok(ScadStatement::IfElse {
            condition,
            body,
            else_body,
            span,
        })
    }

    /// Parse `let (bindings) body`.
    fn parse_let(&mut self) -> Result<ScadStatement, ParseError> {
        let start = self.peek().span;
        self.advance();
        self.expect(&ScadTokenKind::LParen, "'(' after 'let'")?;
        let mut bindings = Vec::new();
        while !self.check(&ScadTokenKind::RParen) {
            let (name, _) = self.expect_identifier("binding name")?;
            self.expect(&ScadTokenKind::Assign, "'=' after binding name")?;
            let value = self.parse_expression()?;
            bindings.push((name, value));
            if !self.match_token(&ScadTokenKind::Comma) {
                break;
            }
        }
        self.expect(&ScadTokenKind::RParen, "')' after bindings")?;
        let body = self.parse_body()?;
        let span = self.span_from(start);
        Ok(ScadStatement::Let {
            bindings,
            body,
            span,
        })
    }

    /// Parse a braced block statement.
    fn parse_block_statement(&mut self) -> Result<ScadStatement, ParseError> {
        let start = self.peek().span;
        let statements = self.parse_braced_statements()?;
        let span = self.span_from(start);
        Ok(ScadStatement::Block { statements, span })
    }

    /// Parse `{ statement* }` into a statement list.
    pub(super) fn parse_braced_statements(&mut self) -> Result<Vec<ScadStatement>, ParseError> {
        self.expect(&ScadTokenKind::LBrace, "'{'")?;
        let mut statements = Vec::new();
        while !self.check(&ScadTokenKind::RBrace) {
            if self.at_eof() {
                return Err(self.unexpected("'}'"));
            }
            if self.match_token(&ScadTokenKind::Semicolon) {
                continue;
            }
            statements.push(self.parse_statement()?);
        }
        self.advance(); // '}'
        Ok(statements)
    }

    /// Parse a statement body: either a braced block or one statement.
    fn parse_body(&mut self) -> Result<Vec<ScadStatement>, ParseError> {
        if self.check(&ScadTokenKind::LBrace) {
            self.parse_braced_statements()
        } else {
            Ok(vec![self.parse_statement()?])
        }
    }

    /// Parse the parenthesized parameter list of a definition.
    fn parse_parameters(&mut self) -> Result<Vec<ScadParameter>, ParseError> {
        self.expect(&ScadTokenKind::LParen, "'(' after definition name")?;
        let mut params = Vec::new();
        while !self.check(&ScadTokenKind::RParen) {
            let (name, _) = self.expect_identifier("parameter name")?;
            let default = if self.match_token(&ScadTokenKind::Assign) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            params.push(ScadParameter { name, default });
            if !self.match_token(&ScadTokenKind::Comma) {
                break;
            }
        }
        self.expect(&ScadTokenKind::RParen, "')' after parameters")?;
        Ok(params)
    }

    /// Parse a call-site argument list (without the surrounding parens).
    pub(super) fn parse_arguments(&mut self) -> Result<Vec<ScadArgument>, ParseError> {
        let mut args = Vec::new();
        while !self.check(&ScadTokenKind::RParen) {
            // `name = value` is a named argument; a bare `name` is positional.
            let named = matches!(&self.peek().kind, ScadTokenKind::Identifier(_))
                && self.peek_at(1).kind == ScadTokenKind::Assign;
            if named {
                let (name, _) = self.expect_identifier("argument name")?;
                self.advance(); // '='
                let value = self.parse_expression()?;
                args.push(ScadArgument::named(name, value));
            } else {
                args.push(ScadArgument::positional(self.parse_expression()?));
            }
            if !self.match_token(&ScadTokenKind::Comma) {
                break;
            }
        }
        Ok(args)
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

    fn first(source: &str) -> ScadStatement {
        parse(source).remove(0)
    }

    #[test]
    fn test_parse_cube_with_named_argument() {
        match first("cube(10, center = true);") {
            ScadStatement::Command { name, args, children, .. } => {
                assert_eq!(name, "cube");
                assert_eq!(args.len(), 2);
                assert_eq!(args[1].name.as_deref(), Some("center"));
                assert!(children.is_empty());
            }
            other => panic!("expected command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_transform_chain() {
        match first("translate([1, 2, 3]) rotate([0, 0, 90]) cube(5);") {
            ScadStatement::Command { name, children, .. } => {
                assert_eq!(name, "translate");
                assert_eq!(children.len(), 1);
                match &children[0] {
                    ScadStatement::Command { name, children, .. } => {
                        assert_eq!(name, "rotate");
                        assert_eq!(children.len(), 1);
                    }
                    other => panic!("expected nested command, got {other:?}"),
                }
            }
            other => panic!("expected command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_union_block() {
        match first("union() { cube(1); sphere(2); }") {
            ScadStatement::Command { name, children, .. } => {
                assert_eq!(name, "union");
                assert_eq!(children.len(), 2);
            }
            other => panic!("expected command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_assignment() {
        match first("x = 1 + 2;") {
            ScadStatement::Assignment { name, .. } => assert_eq!(name, "x"),
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_module_definition() {
        match first("module wheel(radius, spokes = 5) { cylinder(h = 1, r = radius); }") {
            ScadStatement::ModuleDefinition { name, params, body, .. } => {
                assert_eq!(name, "wheel");
                assert_eq!(params.len(), 2);
                assert!(params[0].default.is_none());
                assert!(params[1].default.is_some());
                assert_eq!(body.len(), 1);
            }
            other => panic!("expected module definition, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_module_with_single_statement_body() {
        match first("module box() cube(1);") {
            ScadStatement::ModuleDefinition { body, .. } => assert_eq!(body.len(), 1),
            other => panic!("expected module definition, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_function_definition() {
        match first("function double(x) = x * 2;") {
            ScadStatement::FunctionDefinition { name, params, .. } => {
                assert_eq!(name, "double");
                assert_eq!(params.len(), 1);
            }
            other => panic!("expected function definition, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_for_loop() {
        match first("for (i = [0:5]) cube(i);") {
            ScadStatement::ForLoop { variable, body, .. } => {
                assert_eq!(variable, "i");
                assert_eq!(body.len(), 1);
            }
            other => panic!("expected for loop, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_if_else() {
        match first("if (x > 1) cube(1); else sphere(1);") {
            ScadStatement::IfElse { else_body, .. } => {
                assert_eq!(else_body.unwrap().len(), 1);
            }
            other => panic!("expected if/else, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_let_bindings() {
        match first("let (a = 1, b = 2) cube(a + b);") {
            ScadStatement::Let { bindings, body, .. } => {
                assert_eq!(bindings.len(), 2);
                assert_eq!(body.len(), 1);
            }
            other => panic!("expected let, got {other:?}"),
        }
    }
}
