// cellisp: a small Lisp interpreter built on cons cells.
//
// Source text is lexed into tokens, read into cell trees, and evaluated
// against a chain of lexical frames. Evaluation errors are values that
// propagate without unwinding the interpreter, so one failed top-level
// form never takes down the session.

pub mod arena;
pub mod env;
pub mod eval;
pub mod lexer;
pub mod primitives;
pub mod printer;
pub mod reader;
pub mod symbol;
pub mod types;
