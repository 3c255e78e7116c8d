// Builtins.
//
// Every operation receives the raw argument list and decides for itself
// what to evaluate, so special forms need no dispatch category of their
// own.

use crate::env::EnvId;
use crate::eval::{BuiltinFn, EvalResult, Interpreter};
use crate::printer::print_to_string;
use crate::types::{Loc, ValueId, ValueKind};
use std::io::Write;

fn bind(interp: &mut Interpreter, name: &'static str, func: BuiltinFn) {
    let sym = interp.symbols.intern(name);
    let value = interp
        .arena
        .alloc(ValueKind::Builtin { name, func }, Loc::default());
    let global = interp.global;
    interp.envs.define(global, sym, value);
}

/// Bind the fixed builtin set into the global frame.
pub fn register_primitives(interp: &mut Interpreter) {
    bind(interp, "progn", prim_progn);
    bind(interp, "macro", prim_macro);
    bind(interp, "println", prim_println);
    bind(interp, "print", prim_print);
    bind(interp, "while", prim_while);
    bind(interp, "quote", prim_quote);
    bind(interp, "cons", prim_cons);
    bind(interp, "setq", prim_setq);
    bind(interp, "set", prim_set);
    bind(interp, "car", prim_car);
    bind(interp, "cdr", prim_cdr);
    bind(interp, "fn", prim_fn);
    bind(interp, "if", prim_if);
    bind(interp, "+", prim_add);
    bind(interp, "-", prim_sub);
    bind(interp, "*", prim_mul);
    bind(interp, "/", prim_div);
    bind(interp, "=", prim_num_eq);
    bind(interp, "<", prim_less);
}

// ============================================================================
// Arithmetic
// ============================================================================

/// Fold evaluated integer arguments. The first argument seeds the
/// accumulator; `op` returning None reports division by zero.
fn numeric_fold(
    interp: &mut Interpreter,
    env: EnvId,
    args: ValueId,
    name: &'static str,
    op: fn(i64, i64) -> Option<i64>,
) -> EvalResult {
    let values = interp.eval_list(env, args)?;
    let loc = interp.arena.loc(args);
    if values.is_empty() {
        return interp.error(loc, format!("builtin `{}' takes at least one argument", name));
    }

    let mut acc = None;
    for &value in &values {
        let Some(n) = interp.as_int(value) else {
            return numeric_type_error(interp, name, value);
        };
        acc = Some(match acc {
            None => n,
            Some(a) => match op(a, n) {
                Some(r) => r,
                None => {
                    let at = interp.arena.loc(value);
                    return interp.error(at, "division by zero");
                }
            },
        });
    }

    Ok(interp.arena.int(acc.unwrap_or(0), loc))
}

fn numeric_type_error(
    interp: &mut Interpreter,
    name: &'static str,
    value: ValueId,
) -> EvalResult {
    let got = interp.arena.kind(value).type_name();
    let at = interp.arena.loc(value);
    interp.error(
        at,
        format!(
            "builtin `{}' takes only numeric arguments (got `{}')",
            name, got
        ),
    )
}

fn prim_add(interp: &mut Interpreter, env: EnvId, args: ValueId) -> EvalResult {
    numeric_fold(interp, env, args, "+", |a, b| Some(a.wrapping_add(b)))
}

fn prim_sub(interp: &mut Interpreter, env: EnvId, args: ValueId) -> EvalResult {
    numeric_fold(interp, env, args, "-", |a, b| Some(a.wrapping_sub(b)))
}

fn prim_mul(interp: &mut Interpreter, env: EnvId, args: ValueId) -> EvalResult {
    numeric_fold(interp, env, args, "*", |a, b| Some(a.wrapping_mul(b)))
}

fn prim_div(interp: &mut Interpreter, env: EnvId, args: ValueId) -> EvalResult {
    numeric_fold(interp, env, args, "/", |a, b| {
        if b == 0 {
            None
        } else {
            Some(a.wrapping_div(b))
        }
    })
}

// ============================================================================
// Comparison
// ============================================================================

fn prim_num_eq(interp: &mut Interpreter, env: EnvId, args: ValueId) -> EvalResult {
    let values = interp.eval_list(env, args)?;
    let loc = interp.arena.loc(args);
    if values.is_empty() {
        return interp.error(loc, "builtin `=' takes at least one argument");
    }

    let mut first = None;
    for &value in &values {
        let Some(n) = interp.as_int(value) else {
            return numeric_type_error(interp, "=", value);
        };
        match first {
            None => first = Some(n),
            Some(f) if n != f => return Ok(interp.arena.nil(loc)),
            Some(_) => {}
        }
    }

    Ok(interp.arena.t(loc))
}

/// True iff the arguments are strictly monotonically decreasing: each
/// new argument is rejected when it is `>=` the previous one.
fn prim_less(interp: &mut Interpreter, env: EnvId, args: ValueId) -> EvalResult {
    let values = interp.eval_list(env, args)?;
    let loc = interp.arena.loc(args);
    if values.is_empty() {
        return interp.error(loc, "builtin `<' takes at least one argument");
    }

    let mut prev = None;
    for &value in &values {
        let Some(n) = interp.as_int(value) else {
            return numeric_type_error(interp, "<", value);
        };
        if let Some(p) = prev {
            if n >= p {
                return Ok(interp.arena.nil(loc));
            }
        }
        prev = Some(n);
    }

    Ok(interp.arena.t(loc))
}

// ============================================================================
// Lists
// ============================================================================

fn prim_cons(interp: &mut Interpreter, env: EnvId, args: ValueId) -> EvalResult {
    let items = interp.list_items(args);
    if items.len() != 2 {
        let loc = interp.arena.loc(args);
        return interp.error(loc, "builtin `cons' takes exactly two arguments");
    }
    let car = interp.eval(env, items[0])?;
    let cdr = interp.eval(env, items[1])?;
    let loc = interp.arena.loc(args);
    Ok(interp.arena.cons(car, cdr, loc))
}

fn prim_car(interp: &mut Interpreter, env: EnvId, args: ValueId) -> EvalResult {
    let items = interp.list_items(args);
    if items.len() != 1 {
        let loc = interp.arena.loc(args);
        return interp.error(loc, "builtin `car' takes exactly one argument");
    }
    let value = interp.eval(env, items[0])?;
    match interp.as_cell(value) {
        Some((car, _)) => Ok(car),
        // An atom has no car; nil stands in for the missing field.
        None => {
            let loc = interp.arena.loc(value);
            Ok(interp.arena.nil(loc))
        }
    }
}

fn prim_cdr(interp: &mut Interpreter, env: EnvId, args: ValueId) -> EvalResult {
    let items = interp.list_items(args);
    if items.len() != 1 {
        let loc = interp.arena.loc(args);
        return interp.error(loc, "builtin `cdr' takes exactly one argument");
    }
    let value = interp.eval(env, items[0])?;
    match interp.as_cell(value) {
        Some((_, cdr)) => Ok(cdr),
        None => {
            let loc = interp.arena.loc(value);
            Ok(interp.arena.nil(loc))
        }
    }
}

// ============================================================================
// Quotation and bindings
// ============================================================================

fn prim_quote(interp: &mut Interpreter, _env: EnvId, args: ValueId) -> EvalResult {
    let items = interp.list_items(args);
    if items.len() != 1 {
        let loc = interp.arena.loc(args);
        return interp.error(loc, "builtin `quote' takes exactly one argument");
    }
    Ok(items[0])
}

fn prim_set(interp: &mut Interpreter, env: EnvId, args: ValueId) -> EvalResult {
    let items = interp.list_items(args);
    if items.len() != 2 {
        let loc = interp.arena.loc(args);
        return interp.error(loc, "builtin `set' takes exactly two arguments");
    }
    let name = interp.eval(env, items[0])?;
    let Some(sym) = interp.as_sym(name) else {
        let got = interp.arena.kind(name).type_name();
        let loc = interp.arena.loc(name);
        return interp.error(
            loc,
            format!("builtin `set' takes a symbol as its first argument (got `{}')", got),
        );
    };
    let value = interp.eval(env, items[1])?;
    interp.envs.assign(env, sym, value);
    Ok(value)
}

/// `(setq sym value)` is `(set 'sym value)`: the symbol is taken
/// unevaluated.
fn prim_setq(interp: &mut Interpreter, env: EnvId, args: ValueId) -> EvalResult {
    let items = interp.list_items(args);
    if items.len() != 2 {
        let loc = interp.arena.loc(args);
        return interp.error(loc, "builtin `setq' takes exactly two arguments");
    }
    let Some(sym) = interp.as_sym(items[0]) else {
        let got = interp.arena.kind(items[0]).type_name();
        let loc = interp.arena.loc(items[0]);
        return interp.error(
            loc,
            format!("builtin `setq' takes a symbol as its first argument (got `{}')", got),
        );
    };
    let value = interp.eval(env, items[1])?;
    interp.envs.assign(env, sym, value);
    Ok(value)
}

// ============================================================================
// Functions and macros
// ============================================================================

/// Verify that `def` is a well-formed `(params . body)` and build a
/// function value from it.
fn make_function(
    interp: &mut Interpreter,
    env: EnvId,
    def: ValueId,
    is_macro: bool,
) -> EvalResult {
    let Some((params, body)) = interp.as_cell(def) else {
        let loc = interp.arena.loc(def);
        return interp.error(loc, "malformed function definition");
    };
    if !is_list(interp, params) || !is_list(interp, body) {
        let loc = interp.arena.loc(def);
        return interp.error(loc, "malformed function definition");
    }

    // Fixed parameters must be symbols; a symbol tail is the rest
    // parameter.
    let mut param = params;
    loop {
        if let Some((car, cdr)) = interp.as_cell(param) {
            if interp.as_sym(car).is_none() {
                return param_name_error(interp, car);
            }
            param = cdr;
        } else if interp.arena.is_nil(param) || interp.as_sym(param).is_some() {
            break;
        } else {
            return param_name_error(interp, param);
        }
    }

    let loc = interp.arena.loc(body);
    let kind = if is_macro {
        ValueKind::Macro { params, body, env }
    } else {
        ValueKind::Lambda { params, body, env }
    };
    Ok(interp.arena.alloc(kind, loc))
}

fn param_name_error(interp: &mut Interpreter, param: ValueId) -> EvalResult {
    let kind = interp.arena.kind(param);
    let message = format!(
        "parameter name must be a symbol (this is {} {})",
        kind.article(),
        kind.type_name()
    );
    let loc = interp.arena.loc(param);
    interp.error(loc, message)
}

fn is_list(interp: &Interpreter, id: ValueId) -> bool {
    matches!(interp.arena.kind(id), ValueKind::Nil | ValueKind::Cell(_, _))
}

/// Builds both named and anonymous functions.
fn prim_fn(interp: &mut Interpreter, env: EnvId, args: ValueId) -> EvalResult {
    let Some((first, rest)) = interp.as_cell(args) else {
        let loc = interp.arena.loc(args);
        return interp.error(loc, "missing list of parameters");
    };
    if interp.as_cell(rest).is_none() {
        let loc = interp.arena.loc(args);
        return interp.error(loc, "missing list of parameters");
    }

    // A leading symbol names the function and binds it in the current
    // environment; anything else makes the whole form anonymous.
    match interp.as_sym(first) {
        Some(sym) => {
            let func = make_function(interp, env, rest, false)?;
            interp.envs.define(env, sym, func);
            Ok(func)
        }
        None => make_function(interp, env, args, false),
    }
}

fn prim_macro(interp: &mut Interpreter, env: EnvId, args: ValueId) -> EvalResult {
    make_function(interp, env, args, true)
}

// ============================================================================
// Control
// ============================================================================

fn prim_if(interp: &mut Interpreter, env: EnvId, args: ValueId) -> EvalResult {
    let arity_err = |interp: &mut Interpreter| {
        let loc = interp.arena.loc(args);
        interp.error(loc, "builtin `if' takes at least two arguments")
    };
    let Some((test, rest)) = interp.as_cell(args) else {
        return arity_err(interp);
    };
    let Some((then_branch, else_branch)) = interp.as_cell(rest) else {
        return arity_err(interp);
    };

    // Only the exact t singleton selects the consequent.
    let cond = interp.eval(env, test)?;
    if interp.arena.is_true(cond) {
        interp.eval(env, then_branch)
    } else {
        interp.progn(env, else_branch)
    }
}

fn prim_while(interp: &mut Interpreter, env: EnvId, args: ValueId) -> EvalResult {
    let Some((test, body)) = interp.as_cell(args) else {
        let loc = interp.arena.loc(args);
        return interp.error(loc, "builtin `while' takes at least one argument");
    };

    let mut result = None;
    loop {
        let cond = interp.eval(env, test)?;
        if !interp.arena.is_true(cond) {
            break;
        }
        result = Some(interp.progn(env, body)?);
    }
    match result {
        Some(value) => Ok(value),
        // The body never ran.
        None => {
            let loc = interp.arena.loc(args);
            Ok(interp.arena.nil(loc))
        }
    }
}

fn prim_progn(interp: &mut Interpreter, env: EnvId, args: ValueId) -> EvalResult {
    interp.progn(env, args)
}

// ============================================================================
// Output
// ============================================================================

/// Evaluates each argument and writes its printed form, separated by
/// single spaces. Returns nil.
fn prim_print(interp: &mut Interpreter, env: EnvId, args: ValueId) -> EvalResult {
    let values = interp.eval_list(env, args)?;
    let mut text = String::new();
    for (i, &value) in values.iter().enumerate() {
        if i > 0 {
            text.push(' ');
        }
        text.push_str(&print_to_string(&interp.arena, &interp.symbols, value));
    }
    let _ = write!(interp.out(), "{}", text);
    let loc = interp.arena.loc(args);
    Ok(interp.arena.nil(loc))
}

fn prim_println(interp: &mut Interpreter, env: EnvId, args: ValueId) -> EvalResult {
    let result = prim_print(interp, env, args)?;
    let _ = writeln!(interp.out());
    Ok(result)
}
