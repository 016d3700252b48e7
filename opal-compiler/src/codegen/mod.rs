//! AST to LLVM IR lowering.
//!
//! This module handles the translation of the typed AST into an LLVM module
//! through the `inkwell` builder API.

pub mod context;
pub mod emit;
pub mod expr;
pub mod scope;
pub mod stmt;

use crate::ast::Program;
use inkwell::context::Context;
use inkwell::module::Module;

pub use context::CodeGen;

/// Entry point for lowering a Program into an LLVM module.
pub fn lower<'ctx>(context: &'ctx Context, program: &Program) -> Module<'ctx> {
    let mut g = CodeGen::new(context);
    g.lower_program(program);
    g.finish()
}
