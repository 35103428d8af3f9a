//! The environment stack: a scoped symbol table, modeled on a `tb::Table<K,V>`
//! (a stack of maps supporting `enter`/`exit`/`insert`/`find`/`find_top`).

use std::hash::Hash;

use indexmap::IndexMap;

pub struct Scope<K, V> {
    frames: Vec<IndexMap<K, V>>,
}

impl<K: Eq + Hash, V> Scope<K, V> {
    pub fn new() -> Self {
        Scope {
            frames: vec![IndexMap::new()],
        }
    }

    pub fn enter(&mut self) {
        self.frames.push(IndexMap::new());
    }

    pub fn exit(&mut self) {
        self.frames.pop();
        debug_assert!(!self.frames.is_empty(), "popped the global scope");
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.frames
            .last_mut()
            .expect("scope stack is never empty")
            .insert(key, value);
    }

    /// Looks up `key` from the innermost scope outward.
    pub fn lookup(&self, key: &K) -> Option<&V> {
        self.frames.iter().rev().find_map(|frame| frame.get(key))
    }

    /// Looks up `key` only in the innermost scope — used to detect
    /// redeclaration within the same block.
    pub fn lookup_top(&self, key: &K) -> Option<&V> {
        self.frames.last().and_then(|frame| frame.get(key))
    }
}

impl<K: Eq + Hash, V> Default for Scope<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_through_outer_scopes() {
        let mut scope: Scope<&str, i32> = Scope::new();
        scope.insert("x", 1);
        scope.enter();
        assert_eq!(scope.lookup(&"x"), Some(&1));
        scope.insert("y", 2);
        assert_eq!(scope.lookup(&"y"), Some(&2));
        scope.exit();
        assert_eq!(scope.lookup(&"y"), None);
    }

    #[test]
    fn lookup_top_only_sees_innermost() {
        let mut scope: Scope<&str, i32> = Scope::new();
        scope.insert("x", 1);
        scope.enter();
        assert_eq!(scope.lookup_top(&"x"), None);
        scope.insert("x", 2);
        assert_eq!(scope.lookup_top(&"x"), Some(&2));
    }

    #[test]
    fn inner_binding_shadows_outer() {
        let mut scope: Scope<&str, i32> = Scope::new();
        scope.insert("x", 1);
        scope.enter();
        scope.insert("x", 2);
        assert_eq!(scope.lookup(&"x"), Some(&2));
        scope.exit();
        assert_eq!(scope.lookup(&"x"), Some(&1));
    }
}
