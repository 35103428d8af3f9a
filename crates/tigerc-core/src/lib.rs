//! Shared primitives for the tigerc crates: identifier interning, source
//! positions, and the arena index type used by the type graph and the IR.

mod arena;
mod interner;
mod span;

pub use arena::{Arena, Idx};
pub use interner::{Interner, Symbol};
pub use span::Pos;
