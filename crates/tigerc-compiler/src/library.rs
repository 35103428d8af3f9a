//! The Tiger runtime library: lazy, deduplicated `extern` declarations for
//! the standard library functions plus a few runtime helpers the lowering
//! pass calls directly (`malloc`, `array_initialize`, `string_compare`).
//!
//! Grounded on the original code generator's constructor, which registers
//! each of these as a factory invoked the first time the function is
//! actually referenced, never twice.

use indexmap::IndexMap;
use tigerc_ir::{Builder, FuncId, IrType};

/// `(name, param types, return type)` for every runtime-provided function.
/// The first ten are Tiger-callable; `malloc`, `array_initialize`, and
/// `string_compare` are internal and never bound into the value scope.
const SIGNATURES: &[(&str, &[IrType], IrType)] = &[
    ("print", &[IrType::Ptr], IrType::Void),
    ("flush", &[], IrType::Void),
    ("getchar", &[], IrType::Ptr),
    ("ord", &[IrType::Ptr], IrType::Int),
    ("chr", &[IrType::Int], IrType::Ptr),
    ("size", &[IrType::Ptr], IrType::Int),
    (
        "substring",
        &[IrType::Ptr, IrType::Int, IrType::Int],
        IrType::Ptr,
    ),
    ("concat", &[IrType::Ptr, IrType::Ptr], IrType::Ptr),
    ("not", &[IrType::Int], IrType::Int),
    ("exit", &[IrType::Int], IrType::Void),
    ("malloc", &[IrType::Int], IrType::Ptr),
    (
        "array_initialize",
        &[IrType::Ptr, IrType::Ptr, IrType::Int, IrType::Int],
        IrType::Void,
    ),
    (
        "string_compare",
        &[IrType::Ptr, IrType::Ptr],
        IrType::Int,
    ),
];

/// Names callable directly from Tiger source via `name(args)`.
pub const USER_VISIBLE: &[&str] = &[
    "print", "flush", "getchar", "ord", "chr", "size", "substring", "concat", "not", "exit",
];

#[derive(Default)]
pub struct LibraryRegistry {
    declared: IndexMap<&'static str, FuncId>,
}

impl LibraryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signature(name: &str) -> Option<(&'static [IrType], IrType)> {
        SIGNATURES
            .iter()
            .find(|(n, ..)| *n == name)
            .map(|(_, params, ret)| (*params, *ret))
    }

    /// Returns the `FuncId` for `name`, declaring it in `builder` the first
    /// time it is requested and reusing the same declaration afterward.
    pub fn get_or_declare(&mut self, builder: &mut Builder, name: &str) -> Option<FuncId> {
        if let Some(&id) = self.declared.get(name) {
            return Some(id);
        }
        let entry = SIGNATURES.iter().find(|(n, ..)| *n == name)?;
        let (static_name, params, ret) = *entry;
        let id = builder.create_function(static_name, params.to_vec(), ret, true);
        self.declared.insert(static_name, id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declares_each_function_once() {
        let mut builder = Builder::new();
        let mut reg = LibraryRegistry::new();
        let a = reg.get_or_declare(&mut builder, "print").unwrap();
        let b = reg.get_or_declare(&mut builder, "print").unwrap();
        assert_eq!(a, b);
        let module = builder.finish();
        assert_eq!(module.functions.len(), 1);
    }

    #[test]
    fn unknown_name_returns_none() {
        let mut builder = Builder::new();
        let mut reg = LibraryRegistry::new();
        assert!(reg.get_or_declare(&mut builder, "nope").is_none());
    }

    #[test]
    fn internal_helpers_are_not_user_visible() {
        assert!(!USER_VISIBLE.contains(&"malloc"));
        assert!(LibraryRegistry::signature("malloc").is_some());
    }
}
