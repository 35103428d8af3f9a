//! A small SSA-form intermediate representation, standing in for the
//! external IR builder the front end targets: functions of basic blocks,
//! each block ending in a terminator, with φ-nodes at merge points.
//!
//! The lowering pass never constructs blocks or instructions directly; it
//! goes through [`Builder`], which owns label/value numbering the way the
//! front end's label generator owns block-name numbering.

mod builder;
mod ir;
mod printer;

pub use builder::Builder;
pub use ir::{
    BasicBlock, BinOp, BlockId, CmpOp, FuncId, Function, GepIndex, Global, GlobalId, Inst,
    IrType, Module, StructId, StructType, Terminator, Value, ValueId,
};
pub use printer::print_module;
