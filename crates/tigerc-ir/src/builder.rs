//! The IR builder façade. Lowering code never touches `Module` directly;
//! it creates functions and blocks and emits instructions through here,
//! the way the original code generator wraps an LLVM `IRBuilder`.

use crate::ir::{
    BasicBlock, BinOp, BlockId, CmpOp, FuncId, Function, GepIndex, Global, GlobalId, Inst,
    IrType, Module, StructId, StructType, Terminator, Value, ValueId,
};

pub struct Builder {
    module: Module,
    label_counter: u32,
    value_counter: ValueId,
    current_func: Option<FuncId>,
    current_block: Option<BlockId>,
}

impl Builder {
    pub fn new() -> Self {
        Builder {
            module: Module::new(),
            label_counter: 0,
            value_counter: 0,
            current_func: None,
            current_block: None,
        }
    }

    pub fn finish(self) -> Module {
        self.module
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Declares a new function. `is_extern` marks a library function with no
    /// body: callers still get a `FuncId` to reference, but no blocks are
    /// ever created for it.
    pub fn create_function(
        &mut self,
        name: impl Into<String>,
        params: Vec<IrType>,
        ret_ty: IrType,
        is_extern: bool,
    ) -> FuncId {
        let param_values = params
            .into_iter()
            .map(|ty| (self.fresh_value(), ty))
            .collect();
        self.module.functions.push(Function {
            name: name.into(),
            params: param_values,
            ret_ty,
            blocks: Default::default(),
            entry: None,
            is_extern,
        })
    }

    pub fn function_params(&self, func: FuncId) -> &[(ValueId, IrType)] {
        &self.module.functions.get(func).params
    }

    pub fn create_struct(&mut self, name: impl Into<String>, fields: Vec<IrType>) -> StructId {
        self.module.structs.push(StructType {
            name: name.into(),
            fields,
        })
    }

    pub fn global_string(&mut self, name: impl Into<String>, value: impl Into<String>) -> Value {
        let id = self.module.globals.push(Global {
            name: name.into(),
            value: value.into(),
        });
        Value::Global(id)
    }

    /// Enters `func`'s body, so subsequent `create_block` calls append to it.
    pub fn enter_function(&mut self, func: FuncId) {
        self.current_func = Some(func);
    }

    /// Creates a new block in the current function, named `L<n>` or, with a
    /// topic, `L<n>_<topic>` (e.g. `L3_then`, `L6_loop`).
    pub fn create_block(&mut self, topic: Option<&str>) -> BlockId {
        let n = self.label_counter;
        self.label_counter += 1;
        let label = match topic {
            Some(topic) => format!("L{n}_{topic}"),
            None => format!("L{n}"),
        };
        let func = self.current_function_mut();
        let id = func.blocks.push(BasicBlock::new(label));
        if func.entry.is_none() {
            func.entry = Some(id);
        }
        id
    }

    pub fn set_current_block(&mut self, block: BlockId) {
        self.current_block = Some(block);
    }

    pub fn current_block_id(&self) -> BlockId {
        self.current_block.expect("no current block")
    }

    /// The current (function, block) cursor, saved before lowering a
    /// nested function body and restored afterward.
    pub fn position(&self) -> (Option<FuncId>, Option<BlockId>) {
        (self.current_func, self.current_block)
    }

    pub fn set_position(&mut self, pos: (Option<FuncId>, Option<BlockId>)) {
        self.current_func = pos.0;
        self.current_block = pos.1;
    }

    fn current_function_mut(&mut self) -> &mut Function {
        let func = self.current_func.expect("no current function");
        self.module.functions.get_mut(func)
    }

    fn current_block_mut(&mut self) -> &mut BasicBlock {
        let block = self.current_block_id();
        self.current_function_mut().blocks.get_mut(block)
    }

    fn fresh_value(&mut self) -> ValueId {
        let v = self.value_counter;
        self.value_counter += 1;
        v
    }

    fn push(&mut self, inst: Inst) -> Option<Value> {
        let result = inst.result().map(Value::Reg);
        self.current_block_mut().instructions.push(inst);
        result
    }

    pub fn emit_binop(&mut self, op: BinOp, lhs: Value, rhs: Value) -> Value {
        let result = self.fresh_value();
        self.push(Inst::BinOp {
            result,
            op,
            lhs,
            rhs,
        })
        .unwrap()
    }

    pub fn emit_cmp(&mut self, op: CmpOp, lhs: Value, rhs: Value) -> Value {
        let result = self.fresh_value();
        self.push(Inst::Cmp {
            result,
            op,
            lhs,
            rhs,
        })
        .unwrap()
    }

    pub fn emit_alloca(&mut self, ty: IrType) -> Value {
        let result = self.fresh_value();
        self.push(Inst::Alloca { result, ty }).unwrap()
    }

    pub fn emit_load(&mut self, ty: IrType, ptr: Value) -> Value {
        let result = self.fresh_value();
        self.push(Inst::Load { result, ty, ptr }).unwrap()
    }

    pub fn emit_store(&mut self, ptr: Value, value: Value) {
        self.push(Inst::Store { ptr, value });
    }

    pub fn emit_gep(&mut self, base: Value, index: GepIndex) -> Value {
        let result = self.fresh_value();
        self.push(Inst::Gep {
            result,
            base,
            index,
        })
        .unwrap()
    }

    /// Emits a call. Returns `None` for a void-returning callee.
    pub fn emit_call(&mut self, func: FuncId, args: Vec<Value>) -> Option<Value> {
        let ret_ty = self.module.functions.get(func).ret_ty;
        let result = if matches!(ret_ty, IrType::Void) {
            None
        } else {
            Some(self.fresh_value())
        };
        self.push(Inst::Call { result, func, args })
    }

    pub fn emit_phi(&mut self, ty: IrType, incoming: Vec<(BlockId, Value)>) -> Value {
        let result = self.fresh_value();
        self.push(Inst::Phi {
            result,
            ty,
            incoming,
        })
        .unwrap()
    }

    pub fn terminate_br(&mut self, target: BlockId) {
        self.current_block_mut().terminator = Some(Terminator::Br(target));
    }

    pub fn terminate_condbr(&mut self, cond: Value, then_block: BlockId, else_block: BlockId) {
        self.current_block_mut().terminator = Some(Terminator::CondBr {
            cond,
            then_block,
            else_block,
        });
    }

    pub fn terminate_ret(&mut self, value: Option<Value>) {
        self.current_block_mut().terminator = Some(Terminator::Ret(value));
    }

    /// Whether the current block already has a terminator (dead code after
    /// `break`/`return` should not emit past this).
    pub fn current_block_terminated(&self) -> bool {
        self.module.functions.get(self.current_func.expect("no current function"))
            .blocks
            .get(self.current_block_id())
            .terminator
            .is_some()
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_trivial_function() {
        let mut b = Builder::new();
        let func = b.create_function("main", vec![], IrType::Int, false);
        b.enter_function(func);
        let entry = b.create_block(None);
        b.set_current_block(entry);
        b.terminate_ret(Some(Value::ConstInt(42)));

        let module = b.finish();
        let f = module.functions.get(func);
        assert_eq!(f.name, "main");
        assert_eq!(f.blocks.len(), 1);
        assert_eq!(f.blocks.get(entry).label, "L0");
    }

    #[test]
    fn block_topics_suffix_the_label() {
        let mut b = Builder::new();
        let func = b.create_function("f", vec![], IrType::Void, false);
        b.enter_function(func);
        let then_block = b.create_block(Some("then"));
        let module = b.finish();
        assert_eq!(module.functions.get(func).blocks.get(then_block).label, "L0_then");
    }

    #[test]
    fn position_round_trips_across_a_nested_function() {
        let mut b = Builder::new();
        let outer = b.create_function("outer", vec![], IrType::Void, false);
        b.enter_function(outer);
        let outer_block = b.create_block(None);
        b.set_current_block(outer_block);
        let saved = b.position();

        let inner = b.create_function("inner", vec![], IrType::Void, false);
        b.enter_function(inner);
        let inner_block = b.create_block(None);
        b.set_current_block(inner_block);
        b.terminate_ret(None);

        b.set_position(saved);
        assert_eq!(b.current_block_id(), outer_block);
    }

    #[test]
    fn extern_function_has_no_blocks() {
        let mut b = Builder::new();
        let print_fn = b.create_function("print", vec![IrType::Ptr], IrType::Void, true);
        let module = b.finish();
        assert!(module.functions.get(print_fn).blocks.is_empty());
        assert!(module.functions.get(print_fn).is_extern);
    }
}
