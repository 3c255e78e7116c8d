// Reader - token stream to value trees.
//
// One call to `read` consumes exactly one expression. The same cells
// represent source programs, runtime data, and quoted literals, so the
// reader's output goes straight to the evaluator.

use crate::arena::Arena;
use crate::lexer::{Token, TokenKind};
use crate::symbol::SymbolTable;
use crate::types::{Loc, ValueId};

#[derive(Clone, Debug, PartialEq)]
pub enum ReadError {
    UnexpectedEof(Loc),
    StrayRParen(Loc),
    UnterminatedList(Loc),
    MalformedDot(Loc),
}

impl ReadError {
    pub fn loc(&self) -> Loc {
        match self {
            Self::UnexpectedEof(loc)
            | Self::StrayRParen(loc)
            | Self::UnterminatedList(loc)
            | Self::MalformedDot(loc) => *loc,
        }
    }
}

impl std::fmt::Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedEof(_) => write!(f, "unexpected end of input"),
            Self::StrayRParen(_) => write!(f, "stray `)'"),
            Self::UnterminatedList(_) => write!(f, "unterminated list"),
            Self::MalformedDot(_) => write!(f, "malformed dotted form"),
        }
    }
}

pub struct Reader<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Reader<'a> {
    /// `tokens` must end with an `Eof` token, as produced by
    /// `Lexer::tokenize`.
    pub fn new(tokens: &'a [Token]) -> Self {
        debug_assert!(matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)));
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    pub fn at_eof(&self) -> bool {
        matches!(self.tokens[self.pos].kind, TokenKind::Eof)
    }

    fn next(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn peek(&self) -> Token {
        self.tokens[self.pos].clone()
    }

    /// Read one expression.
    pub fn read(
        &mut self,
        arena: &mut Arena,
        symbols: &mut SymbolTable,
    ) -> Result<ValueId, ReadError> {
        let token = self.next();
        match token.kind {
            TokenKind::Eof => Err(ReadError::UnexpectedEof(token.loc)),
            TokenKind::RParen => Err(ReadError::StrayRParen(token.loc)),
            TokenKind::Dot => Err(ReadError::MalformedDot(token.loc)),
            TokenKind::LParen => {
                self.depth += 1;
                self.read_list(arena, symbols, token.loc)
            }
            TokenKind::Quote => {
                // 'x reads as (quote x)
                let expr = self.read(arena, symbols)?;
                let quote = symbols.intern("quote");
                let quote = arena.sym(quote, token.loc);
                let nil = arena.nil(token.loc);
                let tail = arena.cons(expr, nil, token.loc);
                Ok(arena.cons(quote, tail, token.loc))
            }
            TokenKind::Int(n) => Ok(arena.int(n, token.loc)),
            TokenKind::Sym(name) => match name.as_str() {
                // The two singletons read directly as values.
                "nil" => Ok(arena.nil(token.loc)),
                "t" => Ok(arena.t(token.loc)),
                _ => {
                    let sym = symbols.intern(&name);
                    Ok(arena.sym(sym, token.loc))
                }
            },
            TokenKind::Str(s) => Ok(arena.string(s, token.loc)),
        }
    }

    fn read_list(
        &mut self,
        arena: &mut Arena,
        symbols: &mut SymbolTable,
        open_loc: Loc,
    ) -> Result<ValueId, ReadError> {
        let mut elements = Vec::new();
        let tail;

        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Eof => return Err(ReadError::UnterminatedList(open_loc)),
                TokenKind::RParen => {
                    self.next();
                    self.depth -= 1;
                    tail = arena.nil(token.loc);
                    break;
                }
                TokenKind::Dot => {
                    self.next();
                    // `(. x)` has no cell to hang the cdr on.
                    if elements.is_empty() {
                        return Err(ReadError::MalformedDot(token.loc));
                    }
                    tail = self.read(arena, symbols)?;
                    let close = self.peek();
                    match close.kind {
                        TokenKind::RParen => {
                            self.next();
                            self.depth -= 1;
                            break;
                        }
                        TokenKind::Eof => return Err(ReadError::UnterminatedList(open_loc)),
                        // e.g. (a . b c)
                        _ => return Err(ReadError::MalformedDot(close.loc)),
                    }
                }
                _ => elements.push(self.read(arena, symbols)?),
            }
        }

        let mut result = tail;
        for &elem in elements.iter().rev() {
            let at = arena.loc(elem);
            result = arena.cons(elem, result, at);
        }
        Ok(result)
    }

    /// After a read error, skip past the remainder of the malformed form
    /// so the caller can continue with the next top-level expression.
    pub fn recover(&mut self) {
        while self.depth > 0 {
            let token = self.next();
            match token.kind {
                TokenKind::Eof => return,
                TokenKind::LParen => self.depth += 1,
                TokenKind::RParen => self.depth -= 1,
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::printer::print_to_string;
    use crate::types::ValueKind;

    fn read_one(input: &str) -> (Arena, SymbolTable, ValueId) {
        let tokens = Lexer::tokenize(input).unwrap();
        let mut arena = Arena::new();
        let mut symbols = SymbolTable::new();
        let id = Reader::new(&tokens).read(&mut arena, &mut symbols).unwrap();
        (arena, symbols, id)
    }

    fn read_err(input: &str) -> ReadError {
        let tokens = Lexer::tokenize(input).unwrap();
        let mut arena = Arena::new();
        let mut symbols = SymbolTable::new();
        Reader::new(&tokens)
            .read(&mut arena, &mut symbols)
            .unwrap_err()
    }

    fn printed(input: &str) -> String {
        let (arena, symbols, id) = read_one(input);
        print_to_string(&arena, &symbols, id)
    }

    #[test]
    fn read_integer() {
        let (arena, _, id) = read_one("42");
        assert_eq!(*arena.kind(id), ValueKind::Int(42));
    }

    #[test]
    fn read_symbol() {
        let (arena, symbols, id) = read_one("foo");
        let ValueKind::Sym(sym) = *arena.kind(id) else {
            panic!("expected symbol");
        };
        assert_eq!(symbols.name(sym), "foo");
    }

    #[test]
    fn read_empty_list_as_nil() {
        let (arena, _, id) = read_one("()");
        assert!(arena.is_nil(id));
    }

    #[test]
    fn read_singletons() {
        let (arena, _, id) = read_one("nil");
        assert!(arena.is_nil(id));
        let (arena, _, id) = read_one("t");
        assert!(arena.is_true(id));
    }

    #[test]
    fn read_proper_list() {
        assert_eq!(printed("(1 2 3)"), "(1 2 3)");
    }

    #[test]
    fn read_dotted_pair() {
        assert_eq!(printed("(1 . 2)"), "(1 . 2)");
        assert_eq!(printed("(1 2 . 3)"), "(1 2 . 3)");
    }

    #[test]
    fn quote_reads_as_two_element_list() {
        assert_eq!(printed("'x"), "(quote x)");
        assert_eq!(printed("''x"), "(quote (quote x))");
    }

    #[test]
    fn read_stray_rparen() {
        assert_eq!(read_err(")"), ReadError::StrayRParen(Loc::new(1, 1)));
    }

    #[test]
    fn read_unterminated_list() {
        assert_eq!(read_err("(1 2"), ReadError::UnterminatedList(Loc::new(1, 1)));
    }

    #[test]
    fn read_malformed_dotted_forms() {
        assert_eq!(read_err("(a . b c)"), ReadError::MalformedDot(Loc::new(1, 8)));
        assert_eq!(read_err("(. a)"), ReadError::MalformedDot(Loc::new(1, 2)));
        assert_eq!(read_err("."), ReadError::MalformedDot(Loc::new(1, 1)));
    }

    #[test]
    fn read_sequential_forms() {
        let tokens = Lexer::tokenize("1 (2 3) x").unwrap();
        let mut arena = Arena::new();
        let mut symbols = SymbolTable::new();
        let mut reader = Reader::new(&tokens);

        let mut forms = Vec::new();
        while !reader.at_eof() {
            forms.push(reader.read(&mut arena, &mut symbols).unwrap());
        }
        assert_eq!(forms.len(), 3);
        assert_eq!(print_to_string(&arena, &symbols, forms[1]), "(2 3)");
    }

    #[test]
    fn recover_skips_to_next_top_level_form() {
        let tokens = Lexer::tokenize("(a . b c) (+ 1 2)").unwrap();
        let mut arena = Arena::new();
        let mut symbols = SymbolTable::new();
        let mut reader = Reader::new(&tokens);

        assert!(reader.read(&mut arena, &mut symbols).is_err());
        reader.recover();
        let next = reader.read(&mut arena, &mut symbols).unwrap();
        assert_eq!(print_to_string(&arena, &symbols, next), "(+ 1 2)");
    }
}
