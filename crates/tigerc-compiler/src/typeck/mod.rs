//! The type graph: primitive types, named/array/record types, and the
//! `actual`/`match`/`deep_eq` operations over them.
//!
//! Types live in a single arena (`TypeArena`) and are addressed by
//! `TypeId` rather than a `shared_ptr`-owned graph with raw back-pointers:
//! cyclic `Named`/`Array`/`Record` references become index equality instead
//! of pointer patching.

mod scope;
mod types;

pub use scope::Scope;
pub use types::{TypeArena, TypeId, TypeKind};
