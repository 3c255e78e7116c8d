// Symbol interning.
//
// Symbols are compared constantly during lookup and application, so names
// are interned once and compared as dense ids.

use std::collections::HashMap;

/// Unique identifier for a symbol (index into the symbol table).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SymbolId(pub u32);

/// The interner. Names are case-sensitive and live in a single flat
/// namespace.
#[derive(Debug, Default)]
pub struct SymbolTable {
    names: Vec<String>,
    ids: HashMap<String, SymbolId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `name`, returning the existing id if it was seen before.
    pub fn intern(&mut self, name: &str) -> SymbolId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = SymbolId(self.names.len() as u32);
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        id
    }

    pub fn name(&self, id: SymbolId) -> &str {
        &self.names[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_idempotent() {
        let mut table = SymbolTable::new();
        let a = table.intern("foo");
        let b = table.intern("foo");
        assert_eq!(a, b);

        let c = table.intern("bar");
        assert_ne!(a, c);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn names_round_trip() {
        let mut table = SymbolTable::new();
        let id = table.intern("counter");
        assert_eq!(table.name(id), "counter");
    }

    #[test]
    fn interning_is_case_sensitive() {
        let mut table = SymbolTable::new();
        assert_ne!(table.intern("Foo"), table.intern("foo"));
    }
}
