//! # ShapeScript Lexer
//!
//! Tokenizes ShapeScript source code into tokens.
//!
//! Linebreaks are statement terminators, so the lexer emits them as tokens
//! rather than skipping them. A handful of rules depend on adjacency:
//!
//! - `-`/`+` are prefix only when they do not follow an operand and hug the
//!   next character (`-1` vs `a - 1`);
//! - `.` is a member-access dot only when it hugs an identifier on the
//!   right (`v.x`), never a standalone token;
//! - a trailing `.` after digits is rewound when a letter follows, so
//!   `2.foo` lexes as `2` `.` `foo`.
//!
//! ## Example
//!
//! ```rust
//! use shape_parser::lexer::{Lexer, TokenKind};
//!
//! let tokens = Lexer::new("cube 10").tokenize().unwrap();
//! assert_eq!(tokens[0].kind, TokenKind::Identifier("cube".to_string()));
//! ```

mod cursor;
mod token;

pub use cursor::Cursor;
pub use token::{Keyword, Token, TokenKind};

use crate::error::{LexError, LexErrorKind};
use shape_ast::{InfixOp, PrefixOp, Span};

/// Characters that may form operators.
const OPERATOR_CHARS: &str = "+-*/<>=!?&|%^~:";

// =============================================================================
// LEXER
// =============================================================================

/// ShapeScript lexer.
///
/// Converts source text into a stream of tokens ending with `Eof`.
///
/// ## Example
///
/// ```rust
/// use shape_parser::lexer::Lexer;
///
/// let tokens = Lexer::new("print 1").tokenize().unwrap();
/// assert!(tokens.last().unwrap().is_eof());
/// ```
pub struct Lexer<'a> {
    /// Character cursor.
    cursor: Cursor<'a>,
    /// Collected tokens.
    tokens: Vec<Token>,
    /// Whether whitespace (or start of input) precedes the current token.
    space_before: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for source text.
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            tokens: Vec::new(),
            space_before: true,
        }
    }

    /// Tokenize the entire source.
    ///
    /// ## Returns
    ///
    /// Vector of tokens including the final EOF token, or the first lex
    /// error encountered.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        while !self.cursor.is_eof() {
            let before = self.cursor.offset();
            self.skip_whitespace();
            if self.cursor.is_eof() {
                break;
            }
            self.space_before = self.cursor.offset() > before || before == 0;
            self.scan_token()?;
        }

        let eof = self.cursor.offset();
        self.tokens.push(Token::new(TokenKind::Eof, Span::at(eof)));
        Ok(self.tokens)
    }

    /// Skip spaces and tabs. Linebreaks are significant and not skipped.
    fn skip_whitespace(&mut self) {
        while self.cursor.advance_if(|c| c == ' ' || c == '\t') {}
    }

    /// True when the previously emitted token ends an operand.
    fn after_operand(&self) -> bool {
        self.tokens
            .last()
            .map(|t| t.kind.ends_operand())
            .unwrap_or(false)
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        let span = Span::new(start, self.cursor.offset());
        self.tokens.push(Token::new(kind, span));
    }

    /// Scan a single token.
    fn scan_token(&mut self) -> Result<(), LexError> {
        let start = self.cursor.offset();
        let c = match self.cursor.peek() {
            Some(c) => c,
            None => return Ok(()),
        };

        match c {
            '\n' | '\r' => {
                self.scan_terminator();
                Ok(())
            }
            ';' => {
                self.cursor.advance();
                self.push(TokenKind::Terminator, start);
                Ok(())
            }
            '{' | '}' | '(' | ')' | '[' | ']' | ',' => {
                self.cursor.advance();
                let kind = match c {
                    '{' => TokenKind::LBrace,
                    '}' => TokenKind::RBrace,
                    '(' => TokenKind::LParen,
                    ')' => TokenKind::RParen,
                    '[' => TokenKind::LBracket,
                    ']' => TokenKind::RBracket,
                    _ => TokenKind::Comma,
                };
                self.push(kind, start);
                Ok(())
            }
            '.' => self.scan_dot(start),
            '"' => self.scan_string(start),
            '#' => self.scan_hex_color(start),
            '0'..='9' => self.scan_number(start),
            'a'..='z' | 'A'..='Z' | '_' => {
                self.scan_identifier(start);
                Ok(())
            }
            c if OPERATOR_CHARS.contains(c) => self.scan_operator(start),
            _ => {
                self.cursor.advance();
                Err(LexError::new(
                    LexErrorKind::UnexpectedToken {
                        text: c.to_string(),
                    },
                    Span::new(start, self.cursor.offset()),
                ))
            }
        }
    }

    /// Collapse a run of linebreaks into a single terminator token.
    fn scan_terminator(&mut self) {
        let start = self.cursor.offset();
        loop {
            match self.cursor.peek() {
                Some('\n') => {
                    self.cursor.advance();
                }
                Some('\r') => {
                    self.cursor.advance();
                    self.cursor.advance_if(|c| c == '\n');
                }
                Some(' ') | Some('\t') => {
                    self.cursor.advance();
                }
                _ => break,
            }
        }
        self.push(TokenKind::Terminator, start);
    }

    /// A dot is member access only when it hugs an identifier start.
    fn scan_dot(&mut self, start: usize) -> Result<(), LexError> {
        self.cursor.advance();
        match self.cursor.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                self.push(TokenKind::Dot, start);
                Ok(())
            }
            _ => Err(LexError::new(
                LexErrorKind::UnexpectedToken {
                    text: ".".to_string(),
                },
                Span::new(start, self.cursor.offset()),
            )),
        }
    }

    /// Scan a string literal, resolving escapes.
    fn scan_string(&mut self, start: usize) -> Result<(), LexError> {
        self.cursor.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.cursor.peek() {
                None | Some('\n') | Some('\r') => {
                    return Err(LexError::new(
                        LexErrorKind::UnterminatedString,
                        Span::new(start, self.cursor.offset()),
                    ));
                }
                Some('"') => {
                    self.cursor.advance();
                    // A doubled quote is a common escaping mistake from other
                    // languages; flag it rather than starting a new string.
                    if self.cursor.peek() == Some('"') {
                        let at = self.cursor.offset();
                        self.cursor.advance();
                        return Err(LexError::new(
                            LexErrorKind::InvalidEscapeSequence {
                                sequence: "\"\"".to_string(),
                            },
                            Span::new(at - 1, self.cursor.offset()),
                        ));
                    }
                    break;
                }
                Some('\\') => {
                    let escape_start = self.cursor.offset();
                    self.cursor.advance();
                    match self.cursor.advance() {
                        Some('n') => value.push('\n'),
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
        self.push(TokenKind::String(value), start);
        Ok(())
    }

    /// Scan a `#rgb`/`#rgba`/`#rrggbb`/`#rrggbbaa` color literal.
    fn scan_hex_color(&mut self, start: usize) -> Result<(), LexError> {
        self.cursor.advance(); // '#'
        let digits_start = self.cursor.offset();
        while self.cursor.advance_if(|c| c.is_ascii_hexdigit()) {}
        let digits = self.cursor.slice_from(digits_start).to_string();
        if matches!(digits.len(), 3 | 4 | 6 | 8) {
            self.push(TokenKind::HexColor(digits), start);
            Ok(())
        } else {
            Err(LexError::new(
                LexErrorKind::UnexpectedToken {
                    text: format!("#{digits}"),
                },
                Span::new(start, self.cursor.offset()),
            ))
        }
    }

    /// Scan a number literal.
    ///
    /// Greedy over digits and dots, except that a trailing dot followed by
    /// a letter is rewound for member access (`2.foo`).
    fn scan_number(&mut self, start: usize) -> Result<(), LexError> {
        while self.cursor.advance_if(|c| c.is_ascii_digit()) {}
        while self.cursor.peek() == Some('.') {
            match self.cursor.peek_next() {
                Some(c) if c.is_ascii_digit() => {
                    self.cursor.advance();
                    while self.cursor.advance_if(|c| c.is_ascii_digit()) {}
                }
                Some(c) if c.is_ascii_alphabetic() || c == '_' => break,
                _ => {
                    // Trailing dot with nothing to attach to.
                    self.cursor.advance();
                    break;
                }
            }
        }

        let text = self.cursor.slice_from(start);
        match text.parse::<f64>() {
            Ok(value) if !text.ends_with('.') && text.matches('.').count() <= 1 => {
                self.push(TokenKind::Number(value), start);
                Ok(())
            }
            _ => Err(LexError::new(
                LexErrorKind::InvalidNumber {
                    text: text.to_string(),
                },
                Span::new(start, self.cursor.offset()),
            )),
        }
    }

    /// Scan an identifier or keyword.
    fn scan_identifier(&mut self, start: usize) {
        while self
            .cursor
            .advance_if(|c| c.is_ascii_alphanumeric() || c == '_')
        {}
        let text = self.cursor.slice_from(start);
        let kind = match Keyword::from_name(text) {
            Some(Keyword::Not) => TokenKind::Prefix(PrefixOp::Not),
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Identifier(text.to_string()),
        };
        self.push(kind, start);
    }

    /// Scan an operator: greedy over operator characters, then classified.
    ///
    /// `+` and `-` always stand alone so that `1<-2` splits as `<` `-2`
    /// rather than an unknown `<-`.
    fn scan_operator(&mut self, start: usize) -> Result<(), LexError> {
        if matches!(self.cursor.peek(), Some('+') | Some('-')) {
            self.cursor.advance();
        } else {
            while self
                .cursor
                .advance_if(|c| OPERATOR_CHARS.contains(c) && c != '+' && c != '-')
            {}
        }

        let text = self.cursor.slice_from(start).to_string();
        let span = Span::new(start, self.cursor.offset());

        let kind = match text.as_str() {
            "+" | "-" => {
                // Prefix when the sign hugs its operand: either nothing
                // operand-like precedes it, or whitespace separates it from
                // the previous operand (`translate -1` vs `a - 1` / `a-1`).
                let hugs_operand = matches!(
                    self.cursor.peek(),
                    Some(c) if c != ' ' && c != '\t' && c != '\n' && c != '\r'
                );
                let prefix_position = !self.after_operand() || self.space_before;
                if prefix_position && hugs_operand {
                    TokenKind::Prefix(if text == "+" {
                        PrefixOp::Plus
                    } else {
                        PrefixOp::Minus
                    })
                } else {
                    TokenKind::Infix(if text == "+" {
                        InfixOp::Add
                    } else {
                        InfixOp::Subtract
                    })
                }
            }
            "*" => TokenKind::Infix(InfixOp::Multiply),
            "/" => TokenKind::Infix(InfixOp::Divide),
            "<" => TokenKind::Infix(InfixOp::Less),
            "<=" => TokenKind::Infix(InfixOp::LessEqual),
            ">" => TokenKind::Infix(InfixOp::Greater),
            ">=" => TokenKind::Infix(InfixOp::GreaterEqual),
            "<>" => TokenKind::Infix(InfixOp::NotEqual),
            "=" => TokenKind::Assign,
            ":" => TokenKind::Colon,
            _ => {
                return Err(LexError::new(
                    LexErrorKind::UnexpectedToken { text },
                    span,
                ));
            }
        };
        self.tokens.push(Token::new(kind, span));
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn lex_err(source: &str) -> LexError {
        Lexer::new(source).tokenize().unwrap_err()
    }

    #[test]
    fn test_tokenize_command() {
        assert_eq!(
            lex("cube 10"),
            vec![
                TokenKind::Identifier("cube".to_string()),
                TokenKind::Number(10.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_linebreaks_collapse() {
        assert_eq!(
            lex("a\n\n\nb"),
            vec![
                TokenKind::Identifier("a".to_string()),
                TokenKind::Terminator,
                TokenKind::Identifier("b".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_keywords() {
        assert_eq!(
            lex("define for in to step"),
            vec![
                TokenKind::Keyword(Keyword::Define),
                TokenKind::Keyword(Keyword::For),
                TokenKind::Keyword(Keyword::In),
                TokenKind::Keyword(Keyword::To),
                TokenKind::Keyword(Keyword::Step),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_minus_prefix_vs_infix() {
        assert_eq!(
            lex("1 -2"),
            vec![
                TokenKind::Number(1.0),
                TokenKind::Prefix(shape_ast::PrefixOp::Minus),
                TokenKind::Number(2.0),
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            lex("1 - 2"),
            vec![
                TokenKind::Number(1.0),
                TokenKind::Infix(shape_ast::InfixOp::Subtract),
                TokenKind::Number(2.0),
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            lex("1-2"),
            vec![
                TokenKind::Number(1.0),
                TokenKind::Infix(shape_ast::InfixOp::Subtract),
                TokenKind::Number(2.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_minus_after_command_name_is_prefix() {
        // `translate -1` passes a negative argument, not a subtraction.
        assert_eq!(
            lex("translate -1"),
            vec![
                TokenKind::Identifier("translate".to_string()),
                TokenKind::Prefix(shape_ast::PrefixOp::Minus),
                TokenKind::Number(1.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_minus_after_open_paren_is_prefix() {
        assert_eq!(
            lex("(-1)"),
            vec![
                TokenKind::LParen,
                TokenKind::Prefix(shape_ast::PrefixOp::Minus),
                TokenKind::Number(1.0),
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_number_rewinds_trailing_dot_before_letter() {
        assert_eq!(
            lex("2.foo"),
            vec![
                TokenKind::Number(2.0),
                TokenKind::Dot,
                TokenKind::Identifier("foo".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_number_with_fraction() {
        assert_eq!(lex("1.25"), vec![TokenKind::Number(1.25), TokenKind::Eof]);
    }

    #[test]
    fn test_invalid_number_two_dots() {
        let error = lex_err("1.2.3");
        assert!(matches!(error.kind, LexErrorKind::InvalidNumber { .. }));
    }

    #[test]
    fn test_invalid_number_trailing_dot() {
        let error = lex_err("2. ");
        assert!(matches!(error.kind, LexErrorKind::InvalidNumber { .. }));
    }

    #[test]
    fn test_dot_requires_member() {
        let error = lex_err("v. x");
        assert!(matches!(error.kind, LexErrorKind::UnexpectedToken { .. }));
    }

    #[test]
    fn test_string_with_escapes() {
        assert_eq!(
            lex(r#""a\nb\"c\\d""#),
            vec![
                TokenKind::String("a\nb\"c\\d".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_string_unterminated_at_newline() {
        let error = lex_err("\"abc\ndef\"");
        assert_eq!(error.kind, LexErrorKind::UnterminatedString);
    }

    #[test]
    fn test_string_invalid_escape() {
        let error = lex_err(r#""a\qb""#);
        assert!(matches!(
            error.kind,
            LexErrorKind::InvalidEscapeSequence { .. }
        ));
    }

    #[test]
    fn test_string_doubled_quote_is_invalid_escape() {
        let error = lex_err(r#""a""b""#);
        assert!(matches!(
            error.kind,
            LexErrorKind::InvalidEscapeSequence { .. }
        ));
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(
            lex("#fff #ff000080"),
            vec![
                TokenKind::HexColor("fff".to_string()),
                TokenKind::HexColor("ff000080".to_string()),
                TokenKind::Eof,
            ]
        );
        let error = lex_err("#ff00f");
        assert!(matches!(error.kind, LexErrorKind::UnexpectedToken { .. }));
    }

    #[test]
    fn test_unknown_operator_run() {
        let error = lex_err("a && b");
        assert_eq!(
            error.kind,
            LexErrorKind::UnexpectedToken {
                text: "&&".to_string()
            }
        );
        assert_eq!(error.suggestion(), Some("and"));
    }

    #[test]
    fn test_double_equals_suggests_single() {
        let error = lex_err("a == b");
        assert_eq!(error.suggestion(), Some("="));
    }

    #[test]
    fn test_eof_span_is_empty() {
        let tokens = Lexer::new("cube").tokenize().unwrap();
        let eof = tokens.last().unwrap();
        assert!(eof.is_eof());
        assert!(eof.span.is_empty());
        assert_eq!(eof.span.start(), 4);
    }

    #[test]
    fn test_round_trip_single_tokens() {
        // Each token's source slice lexes back to a single token of the
        // same kind.
        let source = "define foo 1.5 \"hi\" #abc (1) <= <>";
        let tokens = Lexer::new(source).tokenize().unwrap();
        for token in &tokens {
            if token.is_eof() || token.kind == TokenKind::Terminator {
                continue;
            }
            let slice = &source[token.span.start()..token.span.end()];
            let relexed = Lexer::new(slice).tokenize().unwrap();
            assert_eq!(relexed.len(), 2, "slice {slice:?}");
            assert_eq!(
                std::mem::discriminant(&relexed[0].kind),
                std::mem::discriminant(&token.kind),
                "slice {slice:?}"
            );
        }
    }
}
