use std::collections::HashSet;

use tigerc_core::{Arena, Idx, Symbol};

pub type TypeId = Idx<TypeKind>;

#[derive(Debug, Clone)]
pub enum TypeKind {
    Int,
    String,
    Nil,
    Void,
    /// A `type a = b` alias. During preprocessing, before `target` is
    /// patched, it is set equal to the stub's own id as an "unresolved"
    /// sentinel.
    Named { name: Symbol, target: TypeId },
    Array { element: TypeId },
    Record { name: Symbol, fields: Vec<(Symbol, TypeId)> },
}

pub struct TypeArena {
    arena: Arena<TypeKind>,
    pub int: TypeId,
    pub string: TypeId,
    pub nil: TypeId,
    pub void: TypeId,
}

impl TypeArena {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let int = arena.push(TypeKind::Int);
        let string = arena.push(TypeKind::String);
        let nil = arena.push(TypeKind::Nil);
        let void = arena.push(TypeKind::Void);
        TypeArena {
            arena,
            int,
            string,
            nil,
            void,
        }
    }

    pub fn alloc(&mut self, kind: TypeKind) -> TypeId {
        self.arena.push(kind)
    }

    pub fn get(&self, id: TypeId) -> &TypeKind {
        self.arena.get(id)
    }

    pub fn set(&mut self, id: TypeId, kind: TypeKind) {
        *self.arena.get_mut(id) = kind;
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Strips `Named` indirections down to the underlying concrete type,
    /// guarding against a type that resolves to itself.
    pub fn actual(&self, id: TypeId) -> TypeId {
        let mut cur = id;
        loop {
            match self.get(cur) {
                TypeKind::Named { target, .. } if *target != cur => cur = *target,
                _ => return cur,
            }
        }
    }

    /// Assignability: can a value of type `rhs` be used where `lhs` is
    /// expected? `Nil` is assignable to any record type and vice versa;
    /// otherwise types must be identical after stripping `Named`.
    pub fn matches(&self, lhs: TypeId, rhs: TypeId) -> bool {
        let a = self.actual(lhs);
        let b = self.actual(rhs);
        if a == b {
            return true;
        }
        let a_is_record = matches!(self.get(a), TypeKind::Record { .. });
        let b_is_record = matches!(self.get(b), TypeKind::Record { .. });
        let a_is_nil = matches!(self.get(a), TypeKind::Nil);
        let b_is_nil = matches!(self.get(b), TypeKind::Nil);
        (a_is_record && b_is_nil) || (b_is_record && a_is_nil)
    }

    /// Cycle-safe structural equality: two types are deeply equal if they
    /// have the same shape, recursively, tolerating cycles via a
    /// visited-pair worklist.
    pub fn deep_eq(&self, lhs: TypeId, rhs: TypeId) -> bool {
        let mut visited: HashSet<(TypeId, TypeId)> = HashSet::new();
        let mut stack = vec![(lhs, rhs)];
        while let Some((a, b)) = stack.pop() {
            if a == b {
                continue;
            }
            if !visited.insert((a, b)) {
                continue;
            }
            match (self.get(a), self.get(b)) {
                (TypeKind::Named { target, .. }, _) => stack.push((*target, b)),
                (_, TypeKind::Named { target, .. }) => stack.push((a, *target)),
                (TypeKind::Int, TypeKind::Int)
                | (TypeKind::String, TypeKind::String)
                | (TypeKind::Nil, TypeKind::Nil)
                | (TypeKind::Void, TypeKind::Void) => continue,
                (TypeKind::Array { element: e1 }, TypeKind::Array { element: e2 }) => {
                    stack.push((*e1, *e2));
                }
                (
                    TypeKind::Record { fields: f1, .. },
                    TypeKind::Record { fields: f2, .. },
                ) => {
                    if f1.len() != f2.len() {
                        return false;
                    }
                    for ((n1, t1), (n2, t2)) in f1.iter().zip(f2.iter()) {
                        if n1 != n2 {
                            return false;
                        }
                        stack.push((*t1, *t2));
                    }
                }
                _ => return false,
            }
        }
        true
    }
}

impl Default for TypeArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tigerc_core::Interner;

    #[test]
    fn actual_strips_named_indirection() {
        let mut arena = TypeArena::new();
        let named = arena.alloc(TypeKind::Named {
            name: Symbol::from_raw(0),
            target: arena.int,
        });
        assert_eq!(arena.actual(named), arena.int);
    }

    #[test]
    fn actual_guards_self_cycle() {
        let mut arena = TypeArena::new();
        let stub = arena.alloc(TypeKind::Named {
            name: Symbol::from_raw(0),
            target: arena.int, // placeholder, patched below
        });
        arena.set(
            stub,
            TypeKind::Named {
                name: Symbol::from_raw(0),
                target: stub,
            },
        );
        assert_eq!(arena.actual(stub), stub);
    }

    #[test]
    fn nil_matches_record_either_way() {
        let mut arena = TypeArena::new();
        let mut interner = Interner::new();
        let name = interner.intern("point");
        let record = arena.alloc(TypeKind::Record {
            name,
            fields: vec![],
        });
        assert!(arena.matches(record, arena.nil));
        assert!(arena.matches(arena.nil, record));
        assert!(!arena.matches(arena.int, arena.nil));
    }

    #[test]
    fn deep_eq_handles_cyclic_records() {
        let mut arena = TypeArena::new();
        let mut interner = Interner::new();
        let name = interner.intern("node");
        let r1 = arena.alloc(TypeKind::Record {
            name,
            fields: vec![],
        });
        let field_name = interner.intern("next");
        arena.set(
            r1,
            TypeKind::Record {
                name,
                fields: vec![(field_name, r1)],
            },
        );

        let r2 = arena.alloc(TypeKind::Record {
            name,
            fields: vec![],
        });
        arena.set(
            r2,
            TypeKind::Record {
                name,
                fields: vec![(field_name, r2)],
            },
        );

        assert!(arena.deep_eq(r1, r2));
    }

    #[test]
    fn deep_eq_rejects_different_field_names() {
        let mut arena = TypeArena::new();
        let mut interner = Interner::new();
        let name = interner.intern("point");
        let fx = interner.intern("x");
        let fy = interner.intern("y");
        let r1 = arena.alloc(TypeKind::Record {
            name,
            fields: vec![(fx, arena.int)],
        });
        let r2 = arena.alloc(TypeKind::Record {
            name,
            fields: vec![(fy, arena.int)],
        });
        assert!(!arena.deep_eq(r1, r2));
    }
}
