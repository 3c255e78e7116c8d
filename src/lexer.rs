// Lexer - source text to token stream.
//
// Comments (`#` to end of line) are stripped here, so the reader never
// sees them.

use crate::types::Loc;
use std::iter::Peekable;
use std::str::Chars;

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    LParen,
    RParen,
    Dot,
    Quote,
    Int(i64),
    Sym(String),
    Str(String),
    Eof,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub loc: Loc,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LexError {
    UnterminatedString(Loc),
}

impl LexError {
    pub fn loc(&self) -> Loc {
        match self {
            Self::UnterminatedString(loc) => *loc,
        }
    }
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnterminatedString(_) => write!(f, "unterminated string literal"),
        }
    }
}

pub struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
    line: u32,
    col: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.chars().peekable(),
            line: 1,
            col: 1,
        }
    }

    /// Tokenize a whole source text.
    pub fn tokenize(input: &'a str) -> Result<Vec<Token>, LexError> {
        let mut lexer = Self::new(input);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.input.next()?;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn here(&self) -> Loc {
        Loc::new(self.line, self.col)
    }

    fn skip_blanks(&mut self) {
        while let Some(&c) = self.input.peek() {
            if c.is_whitespace() {
                self.advance();
            } else if c == '#' {
                while let Some(c) = self.advance() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    /// Characters that end a symbol run. The dot is excluded from symbols
    /// entirely; a lone `.` is the dotted-pair separator.
    fn is_delimiter(c: char) -> bool {
        c.is_whitespace() || matches!(c, '(' | ')' | '\'' | '.' | '"' | '#')
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_blanks();
        let loc = self.here();

        let Some(&c) = self.input.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                loc,
            });
        };

        let kind = match c {
            '(' => {
                self.advance();
                TokenKind::LParen
            }
            ')' => {
                self.advance();
                TokenKind::RParen
            }
            '\'' => {
                self.advance();
                TokenKind::Quote
            }
            '.' => {
                self.advance();
                TokenKind::Dot
            }
            '"' => {
                self.advance();
                let mut s = String::new();
                loop {
                    match self.advance() {
                        None => return Err(LexError::UnterminatedString(loc)),
                        Some('"') => break,
                        Some(c) => s.push(c),
                    }
                }
                TokenKind::Str(s)
            }
            _ => {
                let mut atom = String::new();
                while let Some(&c) = self.input.peek() {
                    if Self::is_delimiter(c) {
                        break;
                    }
                    atom.push(c);
                    self.advance();
                }
                classify_atom(atom)
            }
        };

        Ok(Token { kind, loc })
    }
}

/// An atom run is an integer when it is an optionally signed run of
/// decimal digits; anything else is a symbol.
fn classify_atom(atom: String) -> TokenKind {
    let digits = atom.strip_prefix(['+', '-']).unwrap_or(&atom);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = atom.parse::<i64>() {
            return TokenKind::Int(n);
        }
    }
    TokenKind::Sym(atom)
}
