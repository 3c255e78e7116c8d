// Evaluator.
//
// Atoms self-evaluate, symbols resolve through the environment, and a
// cell applies its evaluated head: builtins receive the raw argument
// list, functions receive evaluated arguments in a frame over their
// captured environment, and macros expand before the caller's
// environment evaluates the expansion.

use crate::arena::Arena;
use crate::env::{EnvId, EnvTable};
use crate::primitives::register_primitives;
use crate::symbol::{SymbolId, SymbolTable};
use crate::types::{Loc, ValueId, ValueKind};
use std::io::{self, Write};

/// Result of evaluation. The `Err` payload is the id of an Error value,
/// so `?` propagates the identical error, message and location intact,
/// up any call depth.
pub type EvalResult = Result<ValueId, ValueId>;

/// A primitive operation. It receives the raw, unevaluated argument
/// list and decides for itself what to evaluate; a special form is just
/// a builtin that declines to.
pub type BuiltinFn = fn(&mut Interpreter, EnvId, ValueId) -> EvalResult;

pub struct Interpreter {
    pub arena: Arena,
    pub symbols: SymbolTable,
    pub envs: EnvTable,
    /// The long-lived global frame every top-level form evaluates in.
    pub global: EnvId,
    out: Box<dyn Write>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Build an interpreter whose `print`/`println` write to `out`.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        let mut envs = EnvTable::new();
        let global = envs.root();
        let mut interp = Self {
            arena: Arena::new(),
            symbols: SymbolTable::new(),
            envs,
            global,
            out,
        };
        register_primitives(&mut interp);
        interp
    }

    pub fn out(&mut self) -> &mut dyn Write {
        &mut *self.out
    }

    /// Allocate an Error value and return it on the error channel.
    pub fn error(&mut self, loc: Loc, message: impl Into<String>) -> EvalResult {
        Err(self.arena.error(message.into(), loc))
    }

    pub fn as_cell(&self, id: ValueId) -> Option<(ValueId, ValueId)> {
        match *self.arena.kind(id) {
            ValueKind::Cell(car, cdr) => Some((car, cdr)),
            _ => None,
        }
    }

    pub fn as_sym(&self, id: ValueId) -> Option<SymbolId> {
        match *self.arena.kind(id) {
            ValueKind::Sym(sym) => Some(sym),
            _ => None,
        }
    }

    pub fn as_int(&self, id: ValueId) -> Option<i64> {
        match *self.arena.kind(id) {
            ValueKind::Int(n) => Some(n),
            _ => None,
        }
    }

    /// Collect the elements of a list without evaluating them, stopping
    /// at the first non-cell cdr.
    pub fn list_items(&self, list: ValueId) -> Vec<ValueId> {
        let mut items = Vec::new();
        let mut current = list;
        while let Some((car, cdr)) = self.as_cell(current) {
            items.push(car);
            current = cdr;
        }
        items
    }

    pub fn eval(&mut self, env: EnvId, expr: ValueId) -> EvalResult {
        let kind = self.arena.kind(expr).clone();
        match kind {
            ValueKind::Sym(sym) => match self.envs.lookup(env, sym) {
                Some(value) => Ok(value),
                None => {
                    let loc = self.arena.loc(expr);
                    let name = self.symbols.name(sym).to_string();
                    self.error(loc, format!("undeclared identifier: {}", name))
                }
            },
            ValueKind::Cell(head, args) => self.eval_application(env, head, args),
            // Everything else self-evaluates, errors included.
            _ => Ok(expr),
        }
    }

    fn eval_application(&mut self, env: EnvId, head_expr: ValueId, args: ValueId) -> EvalResult {
        let head = self.eval(env, head_expr)?;
        let kind = self.arena.kind(head).clone();
        match kind {
            ValueKind::Builtin { func, .. } => func(self, env, args),
            ValueKind::Lambda {
                params,
                body,
                env: captured,
            } => {
                let values = self.eval_list(env, args)?;
                let call_loc = self.arena.loc(head_expr);
                let frame = self.bind_params(params, &values, captured, call_loc)?;
                self.progn(frame, body)
            }
            ValueKind::Macro {
                params,
                body,
                env: captured,
            } => {
                let raw = self.list_items(args);
                let call_loc = self.arena.loc(head_expr);
                let frame = self.bind_params(params, &raw, captured, call_loc)?;
                let expansion = self.progn(frame, body)?;
                self.eval(env, expansion)
            }
            other => {
                let loc = self.arena.loc(head_expr);
                self.error(
                    loc,
                    format!("attempt to call non-function (`{}')", other.type_name()),
                )
            }
        }
    }

    /// Evaluate every element of `list` left to right, short-circuiting
    /// on the first error.
    pub fn eval_list(&mut self, env: EnvId, list: ValueId) -> Result<Vec<ValueId>, ValueId> {
        let mut values = Vec::new();
        let mut current = list;
        while let Some((car, cdr)) = self.as_cell(current) {
            values.push(self.eval(env, car)?);
            current = cdr;
        }
        Ok(values)
    }

    /// Evaluate each expression in sequence and return the last value,
    /// or Nil when the list is empty.
    pub fn progn(&mut self, env: EnvId, list: ValueId) -> EvalResult {
        let mut result = None;
        let mut current = list;
        while let Some((car, cdr)) = self.as_cell(current) {
            result = Some(self.eval(env, car)?);
            current = cdr;
        }
        match result {
            Some(value) => Ok(value),
            None => {
                let loc = self.arena.loc(list);
                Ok(self.arena.nil(loc))
            }
        }
    }

    /// Bind a parameter list to argument values in a fresh frame chained
    /// to `parent`. An improper tail symbol captures the surplus
    /// arguments as a fresh list.
    pub fn bind_params(
        &mut self,
        params: ValueId,
        args: &[ValueId],
        parent: EnvId,
        call_loc: Loc,
    ) -> Result<EnvId, ValueId> {
        let frame = self.envs.child(parent);
        let mut param = params;
        let mut next = 0;

        loop {
            if let Some((car, cdr)) = self.as_cell(param) {
                let Some(sym) = self.as_sym(car) else {
                    return Err(self.param_error(car));
                };
                if next >= args.len() {
                    return Err(self
                        .arena
                        .error("too few arguments to function".into(), call_loc));
                }
                self.envs.define(frame, sym, args[next]);
                next += 1;
                param = cdr;
            } else if self.arena.is_nil(param) {
                if next < args.len() {
                    return Err(self
                        .arena
                        .error("too many arguments to function".into(), call_loc));
                }
                break;
            } else if let Some(sym) = self.as_sym(param) {
                let rest = self.arena.list(&args[next..], call_loc);
                self.envs.define(frame, sym, rest);
                break;
            } else {
                return Err(self.param_error(param));
            }
        }

        Ok(frame)
    }

    fn param_error(&mut self, param: ValueId) -> ValueId {
        let kind = self.arena.kind(param);
        let message = format!(
            "parameter name must be a symbol (this is {} {})",
            kind.article(),
            kind.type_name()
        );
        let loc = self.arena.loc(param);
        self.arena.error(message, loc)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
