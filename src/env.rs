// Lexical environments.
//
// An environment is a chain of frames. Frames live in their own arena and
// are linked by ids rather than ownership: a closure may be bound inside
// the very frame it captures, and id edges make that cycle inert.

use crate::types::{SymbolId, ValueId};

/// Index of a frame in the environment table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct EnvId(pub u32);

/// One scope's bindings, in insertion order, plus the enclosing frame.
#[derive(Debug)]
struct Frame {
    bindings: Vec<(SymbolId, ValueId)>,
    parent: Option<EnvId>,
}

/// Session-lifetime frame storage.
#[derive(Debug, Default)]
pub struct EnvTable {
    frames: Vec<Frame>,
}

impl EnvTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a frame with no parent (the global frame).
    pub fn root(&mut self) -> EnvId {
        self.push(None)
    }

    /// Create a frame chained to `parent`.
    pub fn child(&mut self, parent: EnvId) -> EnvId {
        self.push(Some(parent))
    }

    fn push(&mut self, parent: Option<EnvId>) -> EnvId {
        let id = EnvId(self.frames.len() as u32);
        self.frames.push(Frame {
            bindings: Vec::new(),
            parent,
        });
        id
    }

    /// Walk frames from `env` outward, returning the value of the first
    /// binding for `sym`.
    pub fn lookup(&self, env: EnvId, sym: SymbolId) -> Option<ValueId> {
        let mut current = Some(env);
        while let Some(id) = current {
            let frame = &self.frames[id.0 as usize];
            if let Some(&(_, val)) = frame.bindings.iter().find(|(s, _)| *s == sym) {
                return Some(val);
            }
            current = frame.parent;
        }
        None
    }

    /// Insert or overwrite a binding in the innermost frame.
    pub fn define(&mut self, env: EnvId, sym: SymbolId, val: ValueId) {
        let frame = &mut self.frames[env.0 as usize];
        match frame.bindings.iter_mut().find(|(s, _)| *s == sym) {
            Some(binding) => binding.1 = val,
            None => frame.bindings.push((sym, val)),
        }
    }

    /// Mutate the binding nearest to the use site. An unbound symbol is
    /// defined at the innermost frame instead, which is the observable
    /// behavior of both `set` and `setq`.
    pub fn assign(&mut self, env: EnvId, sym: SymbolId, val: ValueId) {
        let mut current = Some(env);
        while let Some(id) = current {
            let frame = &mut self.frames[id.0 as usize];
            if let Some(binding) = frame.bindings.iter_mut().find(|(s, _)| *s == sym) {
                binding.1 = val;
                return;
            }
            current = frame.parent;
        }
        self.define(env, sym, val);
    }
}
