// Shared test harness: an interpreter session with captured output.

use cellisp::eval::Interpreter;
use cellisp::lexer::Lexer;
use cellisp::printer::print_to_string;
use cellisp::reader::Reader;
use cellisp::types::ValueKind;
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

/// A `Write` sink the test can read back after handing a clone to the
/// interpreter.
#[derive(Clone, Default)]
pub struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).expect("non-utf8 output")
    }
}

pub struct Session {
    pub interp: Interpreter,
    out: SharedBuf,
}

impl Session {
    pub fn new() -> Self {
        let out = SharedBuf::default();
        let interp = Interpreter::with_output(Box::new(out.clone()));
        Self { interp, out }
    }

    /// Evaluate every top-level form, collecting each form's outcome:
    /// the printed result value, or the error message.
    pub fn run(&mut self, source: &str) -> Vec<Result<String, String>> {
        let tokens = Lexer::tokenize(source).expect("lex error");
        let mut reader = Reader::new(&tokens);
        let mut results = Vec::new();

        while !reader.at_eof() {
            let expr = reader
                .read(&mut self.interp.arena, &mut self.interp.symbols)
                .expect("read error");
            match self.interp.eval(self.interp.global, expr) {
                Ok(value) => results.push(Ok(print_to_string(
                    &self.interp.arena,
                    &self.interp.symbols,
                    value,
                ))),
                Err(err) => match self.interp.arena.kind(err) {
                    ValueKind::Error(msg) => results.push(Err(msg.clone())),
                    other => panic!("non-error on the error channel: {:?}", other),
                },
            }
        }
        results
    }

    /// Evaluate and return the last form's outcome.
    pub fn last(&mut self, source: &str) -> Result<String, String> {
        self.run(source).pop().expect("no forms in input")
    }

    #[allow(dead_code)]
    pub fn stdout(&self) -> String {
        self.out.contents()
    }
}

/// One-shot: evaluate `source` in a fresh session and return the last
/// form's outcome.
#[allow(dead_code)]
pub fn eval_last(source: &str) -> Result<String, String> {
    Session::new().last(source)
}

/// One-shot: evaluate `source` in a fresh session and return what it
/// wrote to standard output.
#[allow(dead_code)]
pub fn eval_stdout(source: &str) -> String {
    let mut session = Session::new();
    session.run(source);
    session.stdout()
}
