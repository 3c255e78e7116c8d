// Printer - rendering values back to source-like text.
//
// `print`/`println`, the REPL echo, and the tests all share this walker.

use crate::arena::Arena;
use crate::symbol::SymbolTable;
use crate::types::{ValueId, ValueKind};

pub struct Printer<'a> {
    arena: &'a Arena,
    symbols: &'a SymbolTable,
    output: String,
}

impl<'a> Printer<'a> {
    pub fn new(arena: &'a Arena, symbols: &'a SymbolTable) -> Self {
        Self {
            arena,
            symbols,
            output: String::new(),
        }
    }

    pub fn print(mut self, id: ValueId) -> String {
        self.print_value(id);
        self.output
    }

    fn print_value(&mut self, id: ValueId) {
        match self.arena.kind(id) {
            ValueKind::Int(n) => self.output.push_str(&n.to_string()),
            ValueKind::Sym(sym) => self.output.push_str(self.symbols.name(*sym)),
            ValueKind::Str(s) => self.output.push_str(s),
            ValueKind::Nil => self.output.push_str("nil"),
            ValueKind::True => self.output.push('t'),
            ValueKind::Cell(_, _) => self.print_list(id),
            ValueKind::Builtin { name, .. } => {
                self.output.push_str("<builtin:");
                self.output.push_str(name);
                self.output.push('>');
            }
            ValueKind::Lambda { params, body, .. } => {
                let (params, body) = (*params, *body);
                self.print_function("fn", params, body);
            }
            ValueKind::Macro { params, body, .. } => {
                let (params, body) = (*params, *body);
                self.print_function("macro", params, body);
            }
            // Errors are surfaced through the diagnostic channel, never
            // printed as values; this form only shows up in debugging.
            ValueKind::Error(msg) => {
                self.output.push_str("<error: ");
                self.output.push_str(msg);
                self.output.push('>');
            }
        }
    }

    fn print_list(&mut self, id: ValueId) {
        self.output.push('(');
        let mut current = id;
        let mut first = true;

        loop {
            match *self.arena.kind(current) {
                ValueKind::Cell(car, cdr) => {
                    if !first {
                        self.output.push(' ');
                    }
                    first = false;
                    self.print_value(car);
                    current = cdr;
                }
                ValueKind::Nil => break,
                _ => {
                    self.output.push_str(" . ");
                    self.print_value(current);
                    break;
                }
            }
        }

        self.output.push(')');
    }

    fn print_function(&mut self, tag: &str, params: ValueId, body: ValueId) {
        self.output.push('(');
        self.output.push_str(tag);
        self.output.push(' ');
        self.print_value(params);
        let mut current = body;
        while let ValueKind::Cell(car, cdr) = *self.arena.kind(current) {
            self.output.push(' ');
            self.print_value(car);
            current = cdr;
        }
        self.output.push(')');
    }
}

pub fn print_to_string(arena: &Arena, symbols: &SymbolTable, id: ValueId) -> String {
    Printer::new(arena, symbols).print(id)
}
