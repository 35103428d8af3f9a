//! The declaration preprocessor: resolves a `let` block's declarations in
//! two passes per maximal run of same-kind declarations, so that
//! mutually-recursive types and functions can refer to each other.
//!
//! Grounded on the original code generator's `preprocessTypeDecs` /
//! `preprocessFunctionDecs` (stub-then-patch type resolution with deferred
//! injection by name; forward-declared function signatures before any
//! body is lowered).

use tigerc_core::{Pos, Symbol};
use tigerc_ir::IrType;

use crate::ast::{Dec, Field, TypeSpec};
use crate::ctx::{LowerCtx, ValueBinding};
use crate::diagnostics::{Result, fatal};
use crate::typeck::TypeId;
use crate::typeck::TypeKind;

/// Resolves every declaration in `decs`, installing type and value
/// bindings into the current (innermost) scope. Does not lower function
/// bodies; callers do that afterward, once every sibling signature in the
/// block is visible.
pub fn process_decs(ctx: &mut LowerCtx, decs: &[Dec]) -> Result<Vec<FuncToLower>> {
    let mut to_lower = Vec::new();
    let mut i = 0;
    while i < decs.len() {
        match &decs[i] {
            Dec::Type(_) => {
                let j = run_end(decs, i, |d| matches!(d, Dec::Type(_)));
                process_type_group(ctx, &decs[i..j])?;
                i = j;
            }
            Dec::Function(_) => {
                let j = run_end(decs, i, |d| matches!(d, Dec::Function(_)));
                to_lower.extend(process_function_group(ctx, &decs[i..j])?);
                i = j;
            }
            Dec::Var(var_dec) => {
                process_var_dec(ctx, var_dec)?;
                i += 1;
            }
        }
    }
    Ok(to_lower)
}

fn run_end(decs: &[Dec], start: usize, pred: impl Fn(&Dec) -> bool) -> usize {
    let mut j = start;
    while j < decs.len() && pred(&decs[j]) {
        j += 1;
    }
    j
}

/// A function whose signature has been installed but whose body still
/// needs lowering, handed back to the caller (the lowering pass) once the
/// whole declaration block's signatures are visible.
pub struct FuncToLower {
    pub name: Symbol,
    pub params: Vec<Field>,
    pub param_types: Vec<TypeId>,
    pub ret: TypeId,
    pub ir: tigerc_ir::FuncId,
    pub body: Box<crate::ast::Exp>,
    pub pos: Pos,
}

fn resolve_type_name(ctx: &LowerCtx, name: Symbol, pos: Pos) -> Result<TypeId> {
    ctx.type_scope
        .lookup(&name)
        .copied()
        .ok_or_else(|| fatal(pos, format!("undefined type '{}'", ctx.interner.resolve(name))))
}

fn process_type_group(ctx: &mut LowerCtx, group: &[Dec]) -> Result<()> {
    let type_decs: Vec<_> = group
        .iter()
        .map(|d| match d {
            Dec::Type(t) => t,
            _ => unreachable!(),
        })
        .collect();

    // Pass 1: create a stub for every type in the group, and bind it in
    // scope immediately so siblings can refer to each other.
    let mut stubs = Vec::with_capacity(type_decs.len());
    for dec in &type_decs {
        if ctx.type_scope.lookup_top(&dec.name).is_some() {
            return Err(fatal(
                dec.pos,
                format!(
                    "type '{}' is already declared in this scope",
                    ctx.interner.resolve(dec.name)
                ),
            ));
        }
        let stub = match &dec.spec {
            TypeSpec::Named { .. } => {
                // self-referential sentinel, patched below
                let id = ctx.types.alloc(TypeKind::Named {
                    name: dec.name,
                    target: TypeId::from_raw(0),
                });
                ctx.types.set(
                    id,
                    TypeKind::Named {
                        name: dec.name,
                        target: id,
                    },
                );
                id
            }
            TypeSpec::Array { .. } => ctx.types.alloc(TypeKind::Array {
                element: TypeId::from_raw(0),
            }),
            TypeSpec::Record { .. } => ctx.types.alloc(TypeKind::Record {
                name: dec.name,
                fields: Vec::new(),
            }),
        };
        ctx.type_scope.insert(dec.name, stub);
        stubs.push(stub);
    }

    // Pass 2: patch each stub to its resolved target.
    for (dec, &stub) in type_decs.iter().zip(&stubs) {
        match &dec.spec {
            TypeSpec::Named { name, pos } => {
                let target = resolve_type_name(ctx, *name, *pos)?;
                ctx.types.set(
                    stub,
                    TypeKind::Named {
                        name: dec.name,
                        target,
                    },
                );
            }
            TypeSpec::Array { element, pos } => {
                let element = resolve_type_name(ctx, *element, *pos)?;
                ctx.types.set(stub, TypeKind::Array { element });
            }
            TypeSpec::Record { fields, .. } => {
                let mut resolved = Vec::with_capacity(fields.len());
                for f in fields {
                    let ty = resolve_type_name(ctx, f.type_name, f.pos)?;
                    resolved.push((f.name, ty));
                }
                ctx.types.set(
                    stub,
                    TypeKind::Record {
                        name: dec.name,
                        fields: resolved,
                    },
                );
                // Per the resolution of the original's ordering hazard,
                // the IR struct type is created now, before any
                // expression is lowered.
                let field_ir_types: Vec<_> = ctx
                    .types
                    .get(stub)
                    .clone_fields()
                    .into_iter()
                    .map(|(_, ty)| type2ir(ctx, ty))
                    .collect();
                let struct_id = ctx
                    .builder
                    .create_struct(ctx.interner.resolve(dec.name).to_string(), field_ir_types);
                ctx.struct_of.insert(stub, struct_id);
            }
        }
    }

    check_named_cycles(ctx, &type_decs, &stubs)?;
    Ok(())
}

fn check_named_cycles(
    ctx: &LowerCtx,
    type_decs: &[&crate::ast::TypeDec],
    stubs: &[TypeId],
) -> Result<()> {
    let bound = ctx.types.len() + 1;
    for (dec, &stub) in type_decs.iter().zip(stubs) {
        if !matches!(dec.spec, TypeSpec::Named { .. }) {
            continue;
        }
        let mut cur = stub;
        let mut steps = 0;
        loop {
            match ctx.types.get(cur) {
                TypeKind::Named { target, .. } => {
                    if *target == cur {
                        break;
                    }
                    if steps > bound {
                        return Err(fatal(
                            dec.pos,
                            format!(
                                "illegal cycle in declaration of type '{}'",
                                ctx.interner.resolve(dec.name)
                            ),
                        ));
                    }
                    cur = *target;
                    steps += 1;
                }
                _ => break,
            }
        }
    }
    Ok(())
}

fn process_function_group(ctx: &mut LowerCtx, group: &[Dec]) -> Result<Vec<FuncToLower>> {
    let func_decs: Vec<_> = group
        .iter()
        .map(|d| match d {
            Dec::Function(f) => f,
            _ => unreachable!(),
        })
        .collect();

    let mut result = Vec::with_capacity(func_decs.len());
    for dec in &func_decs {
        if ctx.value_scope.lookup_top(&dec.name).is_some() {
            return Err(fatal(
                dec.pos,
                format!(
                    "function '{}' is already declared in this scope",
                    ctx.interner.resolve(dec.name)
                ),
            ));
        }

        let mut param_types = Vec::with_capacity(dec.params.len());
        for p in &dec.params {
            param_types.push(resolve_type_name(ctx, p.type_name, p.pos)?);
        }
        let ret = match dec.return_type {
            Some(name) => resolve_type_name(ctx, name, dec.pos)?,
            None => ctx.types.void,
        };

        let mangled = ctx.fresh_mangled_name(ctx.interner.resolve(dec.name));
        let ir_param_types: Vec<_> = param_types.iter().map(|&t| type2ir(ctx, t)).collect();
        let ir_ret = type2ir(ctx, ret);
        let ir_func = ctx
            .builder
            .create_function(mangled, ir_param_types, ir_ret, false);

        ctx.value_scope.insert(
            dec.name,
            ValueBinding::Func {
                params: param_types.clone(),
                ret,
                ir: ir_func,
            },
        );

        result.push(FuncToLower {
            name: dec.name,
            params: dec.params.clone(),
            param_types,
            ret,
            ir: ir_func,
            body: dec.body.clone(),
            pos: dec.pos,
        });
    }
    Ok(result)
}

fn process_var_dec(ctx: &mut LowerCtx, dec: &crate::ast::VarDec) -> Result<()> {
    if ctx.value_scope.lookup_top(&dec.name).is_some() {
        return Err(fatal(
            dec.pos,
            format!(
                "'{}' is already declared in this scope",
                ctx.interner.resolve(dec.name)
            ),
        ));
    }
    let (init_ty, init_value) = crate::lower::lower_exp(ctx, &dec.init)?;

    let declared_ty = match dec.type_name {
        Some(name) => Some(resolve_type_name(ctx, name, dec.pos)?),
        None => None,
    };

    let var_ty = match declared_ty {
        Some(declared) => {
            if !ctx.types.matches(declared, init_ty) {
                return Err(fatal(dec.pos, "initializer does not match declared type"));
            }
            declared
        }
        None => {
            if ctx.types.actual(init_ty) == ctx.types.nil {
                return Err(fatal(
                    dec.pos,
                    "cannot initialize an untyped variable with nil",
                ));
            }
            init_ty
        }
    };

    let ir_ty = type2ir(ctx, var_ty);
    let ptr = ctx.builder.emit_alloca(ir_ty);
    ctx.builder.emit_store(ptr, init_value);
    ctx.value_scope
        .insert(dec.name, ValueBinding::Var { ty: var_ty, ptr });
    Ok(())
}

/// Maps a Tiger type to the IR's type system: `int` -> `i64`, everything
/// else reference-shaped (`string`, `nil`, arrays, records) -> `ptr`,
/// except records, which get their own struct type, and `void`.
pub fn type2ir(ctx: &LowerCtx, ty: TypeId) -> IrType {
    let actual = ctx.types.actual(ty);
    match ctx.types.get(actual) {
        TypeKind::Int => IrType::Int,
        TypeKind::Void => IrType::Void,
        // string, nil, arrays, and records are all reference-shaped; a
        // record's own struct layout is tracked separately in
        // `struct_of` for `alloca`/`gep` sizing, not in the value's type.
        _ => IrType::Ptr,
    }
}

impl TypeKind {
    fn clone_fields(&self) -> Vec<(Symbol, TypeId)> {
        match self {
            TypeKind::Record { fields, .. } => fields.clone(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use crate::diagnostics::CompileError;
    use crate::lower::compile;

    #[test]
    fn mutually_recursive_functions_see_each_other_regardless_of_order() {
        let src = indoc! {"
            let
                function f(x: int): int = g(x)
                function g(x: int): int = x + 1
            in
                f(41)
            end
        "};
        let module = compile(src).unwrap_or_else(|e| panic!("expected to compile: {e}"));
        assert!(module.functions.len() >= 3);
    }

    #[test]
    fn redeclaring_a_function_in_the_same_let_is_rejected() {
        let src = indoc! {"
            let
                function f(x: int): int = x
                function f(x: int): int = x + 1
            in
                f(0)
            end
        "};
        let err = compile(src).unwrap_err();
        assert!(matches!(err, CompileError::Semantic(_)));
    }

    #[test]
    fn redeclaring_a_type_in_the_same_let_is_rejected() {
        let src = indoc! {"
            let
                type a = int
                type a = string
            in
                0
            end
        "};
        let err = compile(src).unwrap_err();
        assert!(matches!(err, CompileError::Semantic(_)));
    }

    #[test]
    fn a_purely_cyclic_type_alias_chain_is_a_fatal_error() {
        let src = indoc! {"
            let
                type a = b
                type b = a
            in
                0
            end
        "};
        let err = compile(src).unwrap_err();
        assert!(matches!(err, CompileError::Semantic(_)));
    }

    #[test]
    fn mutually_recursive_record_types_resolve() {
        let src = indoc! {"
            let
                type tree = { value: int, left: tree, right: tree }
                var leaf := tree { value = 0, left = nil, right = nil }
            in
                leaf.value
            end
        "};
        let module = compile(src).unwrap_or_else(|e| panic!("expected to compile: {e}"));
        assert!(!module.functions.is_empty());
    }
}
