//! Textual rendering of a [`Module`], used by `--emit-ir` and by the
//! lowering tests to assert on readable output instead of raw structs.

use std::fmt::Write as _;

use crate::ir::{BinOp, CmpOp, GepIndex, Inst, IrType, Module, Terminator, Value};

pub fn print_module(module: &Module) -> String {
    let mut out = String::new();
    for (id, s) in module.structs.iter() {
        let _ = writeln!(out, "%{} = type {{ {} }}", s.name, fmt_types(&s.fields, module));
        let _ = id; // struct ids aren't referenced by name in the dump
    }
    if !module.structs.is_empty() {
        out.push('\n');
    }
    for (id, g) in module.globals.iter() {
        let _ = writeln!(out, "@{} = constant {:?}", g.name, g.value);
        let _ = id;
    }
    if !module.globals.is_empty() {
        out.push('\n');
    }
    for (id, func) in module.functions.iter() {
        let params = func
            .params
            .iter()
            .map(|(v, ty)| format!("{} %{v}", fmt_type(*ty, module)))
            .collect::<Vec<_>>()
            .join(", ");
        if func.is_extern {
            let _ = writeln!(
                out,
                "declare {} @{}({})",
                fmt_type(func.ret_ty, module),
                func.name,
                params
            );
            continue;
        }
        let _ = writeln!(
            out,
            "define {} @{}({}) {{",
            fmt_type(func.ret_ty, module),
            func.name,
            params
        );
        for (_, block) in func.blocks.iter() {
            let _ = writeln!(out, "{}:", block.label);
            for inst in &block.instructions {
                let _ = writeln!(out, "  {}", fmt_inst(inst, module, func));
            }
            if let Some(term) = &block.terminator {
                let _ = writeln!(out, "  {}", fmt_terminator(term, module, func));
            }
        }
        out.push_str("}\n\n");
        let _ = id;
    }
    out
}

fn fmt_types(tys: &[IrType], module: &Module) -> String {
    tys.iter()
        .map(|t| fmt_type(*t, module))
        .collect::<Vec<_>>()
        .join(", ")
}

fn fmt_type(ty: IrType, module: &Module) -> String {
    match ty {
        IrType::Int => "i64".to_string(),
        IrType::Ptr => "ptr".to_string(),
        IrType::Void => "void".to_string(),
        IrType::Struct(id) => format!("%{}", module.structs.get(id).name),
    }
}

fn fmt_value(v: Value, module: &Module) -> String {
    match v {
        Value::ConstInt(n) => n.to_string(),
        Value::ConstNullPtr => "null".to_string(),
        Value::Global(id) => format!("@{}", module.globals.get(id).name),
        Value::Reg(id) => format!("%{id}"),
    }
}

fn fmt_binop(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "add",
        BinOp::Sub => "sub",
        BinOp::Mul => "mul",
        BinOp::Div => "div",
    }
}

fn fmt_cmpop(op: CmpOp) -> &'static str {
    match op {
        CmpOp::Eq => "eq",
        CmpOp::Ne => "ne",
        CmpOp::Lt => "lt",
        CmpOp::Le => "le",
        CmpOp::Gt => "gt",
        CmpOp::Ge => "ge",
    }
}

fn fmt_inst(inst: &Inst, module: &Module, func: &crate::ir::Function) -> String {
    let _ = func;
    match inst {
        Inst::BinOp {
            result,
            op,
            lhs,
            rhs,
        } => format!(
            "%{result} = {} {}, {}",
            fmt_binop(*op),
            fmt_value(*lhs, module),
            fmt_value(*rhs, module)
        ),
        Inst::Cmp {
            result,
            op,
            lhs,
            rhs,
        } => format!(
            "%{result} = cmp {} {}, {}",
            fmt_cmpop(*op),
            fmt_value(*lhs, module),
            fmt_value(*rhs, module)
        ),
        Inst::Alloca { result, ty } => format!("%{result} = alloca {}", fmt_type(*ty, module)),
        Inst::Load { result, ty, ptr } => format!(
            "%{result} = load {}, {}",
            fmt_type(*ty, module),
            fmt_value(*ptr, module)
        ),
        Inst::Store { ptr, value } => {
            format!("store {}, {}", fmt_value(*value, module), fmt_value(*ptr, module))
        }
        Inst::Gep { result, base, index } => match index {
            GepIndex::Field(i) => format!("%{result} = gep {}, field {i}", fmt_value(*base, module)),
            GepIndex::Index(idx) => format!(
                "%{result} = gep {}, index {}",
                fmt_value(*base, module),
                fmt_value(*idx, module)
            ),
        },
        Inst::Call { result, func: callee, args } => {
            let name = &module.functions.get(*callee).name;
            let args = args
                .iter()
                .map(|a| fmt_value(*a, module))
                .collect::<Vec<_>>()
                .join(", ");
            match result {
                Some(r) => format!("%{r} = call @{name}({args})"),
                None => format!("call @{name}({args})"),
            }
        }
        Inst::Phi {
            result,
            ty,
            incoming,
        } => {
            let incoming = incoming
                .iter()
                .map(|(b, v)| format!("[{}, {}]", fmt_value(*v, module), b.as_u32()))
                .collect::<Vec<_>>()
                .join(", ");
            format!("%{result} = phi {} {incoming}", fmt_type(*ty, module))
        }
    }
}

fn fmt_terminator(term: &Terminator, module: &Module, func: &crate::ir::Function) -> String {
    match term {
        Terminator::Br(target) => format!("br {}", func.blocks.get(*target).label),
        Terminator::CondBr {
            cond,
            then_block,
            else_block,
        } => format!(
            "condbr {}, {}, {}",
            fmt_value(*cond, module),
            func.blocks.get(*then_block).label,
            func.blocks.get(*else_block).label
        ),
        Terminator::Ret(None) => "ret void".to_string(),
        Terminator::Ret(Some(v)) => format!("ret {}", fmt_value(*v, module)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Builder;

    #[test]
    fn prints_a_trivial_function() {
        let mut b = Builder::new();
        let func = b.create_function("main", vec![], IrType::Int, false);
        b.enter_function(func);
        let entry = b.create_block(None);
        b.set_current_block(entry);
        b.terminate_ret(Some(Value::ConstInt(7)));
        let module = b.finish();

        let text = print_module(&module);
        assert!(text.contains("define i64 @main() {"));
        assert!(text.contains("L0:"));
    }

    #[test]
    fn prints_extern_declarations() {
        let mut b = Builder::new();
        b.create_function("print", vec![IrType::Ptr], IrType::Void, true);
        let module = b.finish();
        let text = print_module(&module);
        assert!(text.contains("declare void @print(ptr %0)"));
    }
}
