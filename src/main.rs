// cellisp driver - script runner and REPL.
//
// With a file argument, every top-level form is read and evaluated in
// order; a diagnostic on one form never stops the next. Without
// arguments, a line-edited REPL accumulates input until the parentheses
// balance and echoes each form's result.

use cellisp::eval::Interpreter;
use cellisp::lexer::Lexer;
use cellisp::printer::print_to_string;
use cellisp::reader::Reader;
use cellisp::types::ValueId;
use cellisp::types::ValueKind;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io;

fn main() -> io::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if let Some(path) = args.get(1) {
        let source = std::fs::read_to_string(path)?;
        let mut interp = Interpreter::new();
        run_source(&mut interp, path, &source, false);
        Ok(())
    } else {
        repl()
    }
}

/// Evaluate every top-level form in `source` against the interpreter's
/// global environment. Read and eval diagnostics go to stderr and the
/// loop continues with the next form. With `echo` set, each form's
/// result is printed (the REPL).
fn run_source(interp: &mut Interpreter, file: &str, source: &str, echo: bool) {
    let tokens = match Lexer::tokenize(source) {
        Ok(tokens) => tokens,
        Err(e) => {
            eprintln!("{}:{}: {}", file, e.loc(), e);
            return;
        }
    };

    let mut reader = Reader::new(&tokens);
    while !reader.at_eof() {
        match reader.read(&mut interp.arena, &mut interp.symbols) {
            Ok(expr) => match interp.eval(interp.global, expr) {
                Ok(value) => {
                    if echo {
                        println!("{}", print_to_string(&interp.arena, &interp.symbols, value));
                    }
                }
                Err(err) => report(file, interp, err),
            },
            Err(e) => {
                eprintln!("{}:{}: {}", file, e.loc(), e);
                reader.recover();
            }
        }
    }
}

fn report(file: &str, interp: &Interpreter, err: ValueId) {
    let loc = interp.arena.loc(err);
    if let ValueKind::Error(msg) = interp.arena.kind(err) {
        eprintln!("{}:{}: {}", file, loc, msg);
    }
}

fn repl() -> io::Result<()> {
    let mut interp = Interpreter::new();
    let mut rl = DefaultEditor::new().expect("failed to initialize line editor");
    let history = ".cellisp_history";
    let _ = rl.load_history(history);

    println!("cellisp - type (quit) or Ctrl-D to exit");

    let mut buffer = String::new();
    loop {
        let prompt = if buffer.is_empty() { "> " } else { "..... " };
        match rl.readline(prompt) {
            Ok(line) => {
                if buffer.is_empty() && line.trim() == "(quit)" {
                    break;
                }
                buffer.push_str(&line);
                buffer.push('\n');
                if is_balanced(&buffer) {
                    let source = std::mem::take(&mut buffer);
                    if !source.trim().is_empty() {
                        let _ = rl.add_history_entry(source.trim());
                        run_source(&mut interp, "<repl>", &source, true);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                buffer.clear();
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("readline error: {:?}", err);
                break;
            }
        }
    }

    let _ = rl.save_history(history);
    Ok(())
}

/// Whether `s` holds only complete forms, so the REPL can evaluate
/// instead of prompting for more. Strings and comments hide parentheses.
fn is_balanced(s: &str) -> bool {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut in_comment = false;

    for c in s.chars() {
        if in_comment {
            if c == '\n' {
                in_comment = false;
            }
            continue;
        }

        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => in_comment = true,
            '(' if !in_string => depth += 1,
            ')' if !in_string => depth -= 1,
            _ => {}
        }
    }

    depth <= 0 && !in_string
}
