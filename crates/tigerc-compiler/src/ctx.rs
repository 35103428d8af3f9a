//! Mutable state shared by declaration preprocessing and expression
//! lowering: the type graph, the parallel type/value environment stacks,
//! the IR builder, and the library function registry.

use indexmap::IndexMap;

use tigerc_core::{Interner, Symbol};
use tigerc_ir::{BlockId, Builder, FuncId, StructId, Value};

use crate::library::LibraryRegistry;
use crate::typeck::{Scope, TypeArena, TypeId};

/// What a value-level identifier is bound to.
pub enum ValueBinding {
    /// A variable: `ptr` is the address of its `alloca`.
    Var { ty: TypeId, ptr: Value },
    /// A user-defined Tiger function.
    Func {
        params: Vec<TypeId>,
        ret: TypeId,
        ir: FuncId,
    },
    /// A standard library function, declared lazily on first call.
    Library {
        name: &'static str,
        params: Vec<TypeId>,
        ret: TypeId,
    },
}

pub struct LowerCtx<'a> {
    pub interner: &'a mut Interner,
    pub types: TypeArena,
    pub type_scope: Scope<Symbol, TypeId>,
    pub value_scope: Scope<Symbol, ValueBinding>,
    pub builder: Builder,
    pub library: LibraryRegistry,
    /// Maps a `Record` `TypeId` to the IR struct type created for it during
    /// type preprocessing.
    pub struct_of: IndexMap<TypeId, StructId>,
    /// The innermost enclosing loop's exit block, for `break`.
    pub break_stack: Vec<BlockId>,
    mangle_counter: u32,
    string_counter: u32,
}

impl<'a> LowerCtx<'a> {
    pub fn new(interner: &'a mut Interner) -> Self {
        let types = TypeArena::new();
        let mut type_scope = Scope::new();
        type_scope.insert(interner.intern("int"), types.int);
        type_scope.insert(interner.intern("string"), types.string);

        let mut value_scope = Scope::new();
        let mut builder = Builder::new();
        for &name in crate::library::USER_VISIBLE {
            let (ir_params, ir_ret) = LibraryRegistry::signature(name).expect("known name");
            let params = ir_params.iter().map(|t| ir_to_tiger(*t, &types)).collect();
            let ret = ir_to_tiger(ir_ret, &types);
            value_scope.insert(
                interner.intern(name),
                ValueBinding::Library { name, params, ret },
            );
        }
        let _ = &mut builder;

        LowerCtx {
            interner,
            types,
            type_scope,
            value_scope,
            builder,
            library: LibraryRegistry::new(),
            struct_of: IndexMap::new(),
            break_stack: Vec::new(),
            mangle_counter: 0,
            string_counter: 0,
        }
    }

    /// Mints a globally unique name for a user function's IR symbol, so
    /// shadowed/nested Tiger functions sharing a source name never collide
    /// in the emitted module.
    pub fn fresh_mangled_name(&mut self, source_name: &str) -> String {
        let n = self.mangle_counter;
        self.mangle_counter += 1;
        format!("{source_name}${n}")
    }

    /// Mints a unique name for a string literal's backing global.
    pub fn fresh_string_name(&mut self) -> String {
        let n = self.string_counter;
        self.string_counter += 1;
        format!(".str{n}")
    }
}

fn ir_to_tiger(ir: tigerc_ir::IrType, types: &TypeArena) -> TypeId {
    match ir {
        tigerc_ir::IrType::Int => types.int,
        tigerc_ir::IrType::Ptr => types.string,
        tigerc_ir::IrType::Void => types.void,
        tigerc_ir::IrType::Struct(_) => unreachable!("library functions have no struct types"),
    }
}
