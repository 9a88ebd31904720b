use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

use super::error::LexError;

/// The closed set of token kinds the parser is allowed to see. Adding a
/// variant here is a breaking change for every `match` in the parser and
/// generator — that exhaustiveness is deliberate (see the AST visitor
/// contract in `parser::ast`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Number,
    String,
    Identifier,

    True,
    False,
    Var,
    Print,
    Func,
    Return,
    End,

    Plus,
    Minus,
    Multiply,
    Divide,

    Equal,
    PlusEqual,
    MinusEqual,
    PlusPlus,
    MinusMinus,

    LeftParen,
    RightParen,
    Comma,
    Dot,

    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Decoded value carried by NUMBER and STRING tokens. Unused for every other
/// kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    String(String),
    Bool(bool),
    Nil,
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{n}"),
            Literal::String(s) => write!(f, "{s}"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Nil => write!(f, "nil"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub literal: Literal,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: String, literal: Literal, line: usize) -> Self {
        Self {
            kind,
            lexeme,
            literal,
            line,
        }
    }

    /// A token with no literal payload, for kinds where `literal` is unused.
    fn bare(kind: TokenKind, lexeme: String, line: usize) -> Self {
        Self::new(kind, lexeme, Literal::Nil, line)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.kind, self.lexeme, self.literal)
    }
}

static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("var", TokenKind::Var);
    m.insert("print", TokenKind::Print);
    m.insert("func", TokenKind::Func);
    m.insert("return", TokenKind::Return);
    m.insert("end", TokenKind::End);
    m.insert("true", TokenKind::True);
    m.insert("false", TokenKind::False);
    m
});

/// Scans SrcLang source text into the `Token[]` the parser consumes.
///
/// This is ambient scaffolding around the CORE pipeline, not part of it —
/// the parser only ever depends on the `Token` shape, never on this type.
/// It exists so the crate is runnable end to end.
pub struct Lexer {
    source: Vec<char>,
    tokens: Vec<Token>,
    errors: Vec<LexError>,
    start: usize,
    current: usize,
    line: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            tokens: Vec::new(),
            errors: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
        }
    }

    /// Scans the whole source. Lexical errors are accumulated rather than
    /// aborting the scan (so a source file with several bad characters is
    /// reported all at once); on any error the token stream is discarded.
    pub fn scan_tokens(mut self) -> Result<Vec<Token>, Vec<LexError>> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }
        self.tokens
            .push(Token::bare(TokenKind::Eof, String::new(), self.line));

        if self.errors.is_empty() {
            Ok(self.tokens)
        } else {
            Err(self.errors)
        }
    }

    fn scan_token(&mut self) {
        let ch = self.advance();
        match ch {
            '(' => self.add(TokenKind::LeftParen),
            ')' => self.add(TokenKind::RightParen),
            ',' => self.add(TokenKind::Comma),
            '.' => self.add(TokenKind::Dot),
            '*' => self.add(TokenKind::Multiply),
            '+' => {
                let kind = if self.match_char('+') {
                    TokenKind::PlusPlus
                } else if self.match_char('=') {
                    TokenKind::PlusEqual
                } else {
                    TokenKind::Plus
                };
                self.add(kind);
            }
            '-' => {
                let kind = if self.match_char('-') {
                    TokenKind::MinusMinus
                } else if self.match_char('=') {
                    TokenKind::MinusEqual
                } else {
                    TokenKind::Minus
                };
                self.add(kind);
            }
            '=' => self.add(TokenKind::Equal),
            '/' => {
                if self.match_char('/') {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else {
                    self.add(TokenKind::Divide);
                }
            }
            ' ' | '\r' | '\t' => {}
            '\n' => self.line += 1,
            '"' => self.string(),
            c if c.is_ascii_digit() => self.number(),
            c if is_alpha(c) => self.identifier(),
            c => {
                self.errors.push(LexError::UnexpectedCharacter {
                    line: self.line,
                    character: c,
                });
            }
        }
    }

    fn string(&mut self) {
        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            self.errors
                .push(LexError::UnterminatedString { line: self.line });
            return;
        }

        self.advance(); // closing quote
        let value: String = self.source[self.start + 1..self.current - 1]
            .iter()
            .collect();
        let lexeme: String = self.source[self.start..self.current].iter().collect();
        self.tokens.push(Token::new(
            TokenKind::String,
            lexeme,
            Literal::String(value),
            self.line,
        ));
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let lexeme: String = self.source[self.start..self.current].iter().collect();
        let value: f64 = lexeme.parse().expect("scanned number lexeme must parse");
        self.tokens.push(Token::new(
            TokenKind::Number,
            lexeme,
            Literal::Number(value),
            self.line,
        ));
    }

    fn identifier(&mut self) {
        while is_alphanumeric(self.peek()) {
            self.advance();
        }
        let lexeme: String = self.source[self.start..self.current].iter().collect();
        let kind = KEYWORDS
            .get(lexeme.as_str())
            .copied()
            .unwrap_or(TokenKind::Identifier);
        self.add(kind);
    }

    fn add(&mut self, kind: TokenKind) {
        let lexeme: String = self.source[self.start..self.current].iter().collect();
        self.tokens.push(Token::bare(kind, lexeme, self.line));
    }

    fn advance(&mut self) -> char {
        let ch = self.source[self.current];
        self.current += 1;
        ch
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            return false;
        }
        self.current += 1;
        true
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.source[self.current]
        }
    }

    fn peek_next(&self) -> char {
        if self.current + 1 >= self.source.len() {
            '\0'
        } else {
            self.source[self.current + 1]
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_alphanumeric(c: char) -> bool {
    is_alpha(c) || c.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src)
            .scan_tokens()
            .expect("lexing should succeed")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn scans_var_decl_with_arithmetic() {
        assert_eq!(
            kinds("var x = 1 + 2"),
            vec![
                TokenKind::Var,
                TokenKind::Identifier,
                TokenKind::Equal,
                TokenKind::Number,
                TokenKind::Plus,
                TokenKind::Number,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn scans_compound_and_incdec_operators() {
        assert_eq!(
            kinds("x += 1 y-- ++z"),
            vec![
                TokenKind::Identifier,
                TokenKind::PlusEqual,
                TokenKind::Number,
                TokenKind::Identifier,
                TokenKind::MinusMinus,
                TokenKind::PlusPlus,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keywords_and_booleans_are_not_identifiers() {
        assert_eq!(
            kinds("func end return var print true false"),
            vec![
                TokenKind::Func,
                TokenKind::End,
                TokenKind::Return,
                TokenKind::Var,
                TokenKind::Print,
                TokenKind::True,
                TokenKind::False,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn strings_keep_raw_contents() {
        let tokens = Lexer::new("\"hi there\"")
            .scan_tokens()
            .expect("lexing should succeed");
        match &tokens[0].literal {
            Literal::String(s) => assert_eq!(s, "hi there"),
            other => panic!("expected string literal, got {other:?}"),
        }
    }

    #[test]
    fn unterminated_string_is_reported() {
        let errs = Lexer::new("\"oops").scan_tokens().unwrap_err();
        assert_eq!(errs, vec![LexError::UnterminatedString { line: 1 }]);
    }

    #[test]
    fn line_comment_is_skipped() {
        assert_eq!(
            kinds("var x // trailing comment\n"),
            vec![TokenKind::Var, TokenKind::Identifier, TokenKind::Eof]
        );
    }
}
