//! # OpenSCAD-style Lexer
//!
//! Tokenizes the secondary dialect: C-like syntax with `;` terminators,
//! two-character operators, and `//` / `/* */` comments.
//!
//! One adjacency rule carries over from the reference implementation: when
//! an identifier directly precedes `(` and the previously emitted token is
//! an operator, the lexer injects synthetic parentheses around the
//! identifier. The parser's call postfix accepts a parenthesized callee, so
//! the injection changes nothing semantically while keeping the following
//! call's source ranges intact.
//!
//! ## Example
//!
//! ```rust
//! use scad_parser::lexer::{ScadLexer, ScadTokenKind};
//!
//! let tokens = ScadLexer::new("cube(10);").tokenize().unwrap();
//! assert_eq!(tokens[0].kind, ScadTokenKind::Identifier("cube".to_string()));
//! ```

use shape_ast::Span;
use shape_parser::error::{LexError, LexErrorKind};
use shape_parser::lexer::Cursor;

// =============================================================================
// TOKEN
// =============================================================================

/// A token of the OpenSCAD-style dialect.
#[derive(Debug, Clone, PartialEq)]
pub struct ScadToken {
    /// Token type, with payload for literals.
    pub kind: ScadTokenKind,
    /// Source span.
    pub span: Span,
}

impl ScadToken {
    /// Create a new token.
    pub const fn new(kind: ScadTokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Check if token is EOF.
    pub fn is_eof(&self) -> bool {
        self.kind == ScadTokenKind::Eof
    }
}

/// Types of tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum ScadTokenKind {
    /// Number literal like `10` or `3.14e-2`.
    Number(f64),
    /// String literal with escapes resolved.
    String(String),
    /// Identifier like `cube`; special variables keep their `$` prefix.
    Identifier(String),
    /// Reserved word.
    Keyword(ScadKeyword),
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `^`
    Caret,
    /// `!`
    Bang,
    /// `=`
    Assign,
    /// `==`
    EqEq,
    /// `!=`
    BangEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `&&`
    AmpAmp,
    /// `||`
    PipePipe,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `.`
    Dot,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// End of input (empty span).
    Eof,
}

impl ScadTokenKind {
    /// True for operator tokens; drives the synthetic-paren injection.
    pub fn is_operator(&self) -> bool {
        matches!(
            self,
            Self::Plus
                | Self::Minus
                | Self::Star
                | Self::Slash
                | Self::Percent
                | Self::Caret
                | Self::Bang
                | Self::Assign
                | Self::EqEq
                | Self::BangEq
                | Self::Lt
                | Self::LtEq
                | Self::Gt
                | Self::GtEq
                | Self::AmpAmp
                | Self::PipePipe
        )
    }

    /// Get display text for error messages.
    pub fn display(&self) -> String {
        match self {
            Self::Number(n) => format!("{n}"),
            Self::String(s) => format!("\"{s}\""),
            Self::Identifier(name) => name.clone(),
            Self::Keyword(keyword) => keyword.display().to_string(),
            Self::Plus => "+".to_string(),
            Self::Minus => "-".to_string(),
            Self::Star => "*".to_string(),
            Self::Slash => "/".to_string(),
            Self::Percent => "%".to_string(),
            Self::Caret => "^".to_string(),
            Self::Bang => "!".to_string(),
            Self::Assign => "=".to_string(),
            Self::EqEq => "==".to_string(),
            Self::BangEq => "!=".to_string(),
            Self::Lt => "<".to_string(),
            Self::LtEq => "<=".to_string(),
            Self::Gt => ">".to_string(),
            Self::GtEq => ">=".to_string(),
            Self::AmpAmp => "&&".to_string(),
            Self::PipePipe => "||".to_string(),
            Self::Colon => ":".to_string(),
            Self::Comma => ",".to_string(),
            Self::Semicolon => ";".to_string(),
            Self::Dot => ".".to_string(),
            Self::LParen => "(".to_string(),
            Self::RParen => ")".to_string(),
            Self::LBracket => "[".to_string(),
            Self::RBracket => "]".to_string(),
            Self::LBrace => "{".to_string(),
            Self::RBrace => "}".to_string(),
            Self::Eof => "end of file".to_string(),
        }
    }
}

/// Reserved words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScadKeyword {
    /// `function`
    Function,
    /// `module`
    Module,
    /// `undef`
    Undef,
    /// `for`
    For,
    /// `if`
    If,
    /// `else`
    Else,
    /// `let`
    Let,
    /// `true`
    True,
    /// `false`
    False,
}

impl ScadKeyword {
    /// Look up a keyword from identifier text.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "function" => Self::Function,
            "module" => Self::Module,
            "undef" => Self::Undef,
            "for" => Self::For,
            "if" => Self::If,
            "else" => Self::Else,
            "let" => Self::Let,
            "true" => Self::True,
            "false" => Self::False,
            _ => return None,
        })
    }

    /// Surface text of the keyword.
    pub const fn display(&self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Module => "module",
            Self::Undef => "undef",
            Self::For => "for",
            Self::If => "if",
            Self::Else => "else",
            Self::Let => "let",
            Self::True => "true",
            Self::False => "false",
        }
    }
}

// =============================================================================
// LEXER
// =============================================================================

/// OpenSCAD-style lexer.
pub struct ScadLexer<'a> {
    /// Character cursor.
    cursor: Cursor<'a>,
    /// Collected tokens.
    tokens: Vec<ScadToken>,
}

impl<'a> ScadLexer<'a> {
    /// Create a new lexer for source text.
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            tokens: Vec::new(),
        }
    }

    /// Tokenize the entire source.
    pub fn tokenize(mut self) -> Result<Vec<ScadToken>, LexError> {
        loop {
            self.skip_whitespace_and_comments()?;
            if self.cursor.is_eof() {
                break;
            }
            self.scan_token()?;
        }

        let eof = self.cursor.offset();
        self.tokens
            .push(ScadToken::new(ScadTokenKind::Eof, Span::at(eof)));
        Ok(self.tokens)
    }

    /// Skip whitespace, line comments, and block comments.
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            while self.cursor.advance_if(char::is_whitespace) {}

            if self.cursor.peek() == Some('/') && self.cursor.peek_next() == Some('/') {
                while matches!(self.cursor.peek(), Some(c) if c != '\n') {
                    self.cursor.advance();
                }
                continue;
            }

            if self.cursor.peek() == Some('/') && self.cursor.peek_next() == Some('*') {
                let start = self.cursor.offset();
                self.cursor.advance();
                self.cursor.advance();
                loop {
                    if self.cursor.is_eof() {
                        return Err(LexError::new(
                            LexErrorKind::UnexpectedToken {
                                text: "/*".to_string(),
                            },
                            Span::new(start, start + 2),
                        ));
                    }
                    if self.cursor.peek() == Some('*') && self.cursor.peek_next() == Some('/') {
                        self.cursor.advance();
                        self.cursor.advance();
                        break;
                    }
                    self.cursor.advance();
                }
                continue;
            }

            return Ok(());
        }
    }

    fn push(&mut self, kind: ScadTokenKind, start: usize) {
        let span = Span::new(start, self.cursor.offset());
        self.tokens.push(ScadToken::new(kind, span));
    }

    /// Consume a second character and select the two-character token kind.
    fn two_char(
        &mut self,
        second: char,
        double: ScadTokenKind,
        single: ScadTokenKind,
    ) -> ScadTokenKind {
        if self.cursor.peek() == Some(second) {
            self.cursor.advance();
            double
        } else {
            single
        }
    }

    /// Scan a single token.
    fn scan_token(&mut self) -> Result<(), LexError> {
        let start = self.cursor.offset();
        let c = match self.cursor.advance() {
            Some(c) => c,
            None => return Ok(()),
        };

        let kind = match c {
            '(' => ScadTokenKind::LParen,
            ')' => ScadTokenKind::RParen,
            '[' => ScadTokenKind::LBracket,
            ']' => ScadTokenKind::RBracket,
            '{' => ScadTokenKind::LBrace,
            '}' => ScadTokenKind::RBrace,
            ';' => ScadTokenKind::Semicolon,
            ',' => ScadTokenKind::Comma,
            ':' => ScadTokenKind::Colon,
            '.' => ScadTokenKind::Dot,
            '+' => ScadTokenKind::Plus,
            '-' => ScadTokenKind::Minus,
            '*' => ScadTokenKind::Star,
            '/' => ScadTokenKind::Slash,
            '%' => ScadTokenKind::Percent,
            '^' => ScadTokenKind::Caret,
            '=' => self.two_char('=', ScadTokenKind::EqEq, ScadTokenKind::Assign),
            '!' => self.two_char('=', ScadTokenKind::BangEq, ScadTokenKind::Bang),
            '<' => self.two_char('=', ScadTokenKind::LtEq, ScadTokenKind::Lt),
            '>' => self.two_char('=', ScadTokenKind::GtEq, ScadTokenKind::Gt),
            '&' => {
                if self.cursor.peek() == Some('&') {
                    self.cursor.advance();
                    ScadTokenKind::AmpAmp
                } else {
                    return Err(LexError::new(
                        LexErrorKind::UnexpectedToken {
                            text: "&".to_string(),
                        },
                        Span::new(start, self.cursor.offset()),
                    ));
                }
            }
            '|' => {
                if self.cursor.peek() == Some('|') {
                    self.cursor.advance();
                    ScadTokenKind::PipePipe
                } else {
                    return Err(LexError::new(
                        LexErrorKind::UnexpectedToken {
                            text: "|".to_string(),
                        },
                        Span::new(start, self.cursor.offset()),
                    ));
                }
            }
            '"' => return self.scan_string(start),
            '0'..='9' => return self.scan_number(start),
            'a'..='z' | 'A'..='Z' | '_' | '$' => {
                self.scan_identifier(start);
                return Ok(());
            }
            _ => {
                return Err(LexError::new(
                    LexErrorKind::UnexpectedToken {
                        text: c.to_string(),
                    },
                    Span::new(start, self.cursor.offset()),
                ));
            }
        };

        self.push(kind, start);
        Ok(())
    }

    /// Scan a string literal, resolving escapes.
    fn scan_string(&mut self, start: usize) -> Result<(), LexError> {
        let mut value = String::new();
        loop {
            match self.cursor.peek() {
                None => {
                    return Err(LexError::new(
                        LexErrorKind::UnterminatedString,
                        Span::new(start, self.cursor.offset()),
                    ));
                }
                Some('"') => {
                    self.cursor.advance();
                    break;
                }
                Some('\\') => {
                    let escape_start = self.cursor.offset();
                    self.cursor.advance();
                    match self.cursor.advance() {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some('\\') => value.push('\\'),
                        Some('"') => value.push('"'),
                        other => {
                            let text = match other {
                                Some(c) => format!("\\{c}"),
                                None => "\\".to_string(),
                            };
                            return Err(LexError::new(
                                LexErrorKind::InvalidEscapeSequence { sequence: text },
                                Span::new(escape_start, self.cursor.offset()),
                            ));
                        }
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.cursor.advance();
                }
            }
        }
        self.push(ScadTokenKind::String(value), start);
        Ok(())
    }

    /// Scan a number literal with optional fraction and exponent.
    fn scan_number(&mut self, start: usize) -> Result<(), LexError> {
        while self.cursor.advance_if(|c| c.is_ascii_digit()) {}

        // A dot starts a fraction unless it is the `[a:b]` range colon's
        // neighbour in disguise (`..` never occurs, but member access does).
        if self.cursor.peek() == Some('.')
            && matches!(self.cursor.peek_next(), Some(c) if c.is_ascii_digit())
        {
            self.cursor.advance();
            while self.cursor.advance_if(|c| c.is_ascii_digit()) {}
        }

        if matches!(self.cursor.peek(), Some('e') | Some('E')) {
            self.cursor.advance();
            if matches!(self.cursor.peek(), Some('+') | Some('-')) {
                self.cursor.advance();
            }
            while self.cursor.advance_if(|c| c.is_ascii_digit()) {}
        }

        let text = self.cursor.slice_from(start);
        match text.parse::<f64>() {
            Ok(value) => {
                self.push(ScadTokenKind::Number(value), start);
                Ok(())
            }
            Err(_) => Err(LexError::new(
                LexErrorKind::InvalidNumber {
                    text: text.to_string(),
                },
                Span::new(start, self.cursor.offset()),
            )),
        }
    }

    /// Scan an identifier, keyword, or `$` special variable.
    fn scan_identifier(&mut self, start: usize) {
        while self
            .cursor
            .advance_if(|c| c.is_ascii_alphanumeric() || c == '_')
        {}
        let text = self.cursor.slice_from(start).to_string();
        let end = self.cursor.offset();

        match ScadKeyword::from_name(&text) {
            Some(keyword) => self.push(ScadTokenKind::Keyword(keyword), start),
            None => {
                // Disambiguation: `op ident(` wraps the identifier in
                // synthetic parens so the call's ranges stay attached to it.
                let after_operator = self
                    .tokens
                    .last()
                    .map(|t| t.kind.is_operator())
                    .unwrap_or(false);
                if after_operator && self.cursor.peek() == Some('(') {
                    self.tokens
                        .push(ScadToken::new(ScadTokenKind::LParen, Span::at(start)));
                    self.tokens.push(ScadToken::new(
                        ScadTokenKind::Identifier(text),
                        Span::new(start, end),
                    ));
                    self.tokens
                        .push(ScadToken::new(ScadTokenKind::RParen, Span::at(end)));
                } else {
                    self.push(ScadTokenKind::Identifier(text), start);
                }
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<ScadTokenKind> {
        ScadLexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_tokenize_cube() {
        assert_eq!(
            lex("cube(10);"),
            vec![
                ScadTokenKind::Identifier("cube".to_string()),
                ScadTokenKind::LParen,
                ScadTokenKind::Number(10.0),
                ScadTokenKind::RParen,
                ScadTokenKind::Semicolon,
                ScadTokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_comments() {
        assert_eq!(
            lex("// line\ncube /* block\nstill */ (1);"),
            vec![
                ScadTokenKind::Identifier("cube".to_string()),
                ScadTokenKind::LParen,
                ScadTokenKind::Number(1.0),
                ScadTokenKind::RParen,
                ScadTokenKind::Semicolon,
                ScadTokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_two_char_operators() {
        assert_eq!(
            lex("== != <= >= && ||"),
            vec![
                ScadTokenKind::EqEq,
                ScadTokenKind::BangEq,
                ScadTokenKind::LtEq,
                ScadTokenKind::GtEq,
                ScadTokenKind::AmpAmp,
                ScadTokenKind::PipePipe,
                ScadTokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_special_variable() {
        assert_eq!(
            lex("$fn = 32;"),
            vec![
                ScadTokenKind::Identifier("$fn".to_string()),
                ScadTokenKind::Assign,
                ScadTokenKind::Number(32.0),
                ScadTokenKind::Semicolon,
                ScadTokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_exponent_number() {
        assert_eq!(lex("1.5e-3"), vec![ScadTokenKind::Number(0.0015), ScadTokenKind::Eof]);
    }

    #[test]
    fn test_synthetic_parens_after_operator() {
        // `1 + foo(2)` injects parens around `foo`.
        let kinds = lex("1 + foo(2)");
        assert_eq!(
            kinds,
            vec![
                ScadTokenKind::Number(1.0),
                ScadTokenKind::Plus,
                ScadTokenKind::LParen,
                ScadTokenKind::Identifier("foo".to_string()),
                ScadTokenKind::RParen,
                ScadTokenKind::LParen,
                ScadTokenKind::Number(2.0),
                ScadTokenKind::RParen,
                ScadTokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_synthetic_parens_have_empty_spans() {
        let tokens = ScadLexer::new("1+f(2)").tokenize().unwrap();
        assert!(tokens[2].span.is_empty());
        assert_eq!(tokens[3].span, Span::new(2, 3));
        assert!(tokens[4].span.is_empty());
    }

    #[test]
    fn test_single_ampersand_is_error() {
        assert!(ScadLexer::new("a & b").tokenize().is_err());
    }

    #[test]
    fn test_unterminated_block_comment() {
        assert!(ScadLexer::new("/* oops").tokenize().is_err());
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            lex("module function undef let"),
            vec![
                ScadTokenKind::Keyword(ScadKeyword::Module),
                ScadTokenKind::Keyword(ScadKeyword::Function),
                ScadTokenKind::Keyword(ScadKeyword::Undef),
                ScadTokenKind::Keyword(ScadKeyword::Let),
                ScadTokenKind::Eof,
            ]
        );
    }
}
