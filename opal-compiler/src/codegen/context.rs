//! The codegen context: module, builder, struct registry and scope stack.

use crate::codegen::scope::ScopeStack;
use crate::types::Type;
use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::types::{BasicType, BasicTypeEnum, FunctionType, IntType, StructType};
use inkwell::values::{BasicValueEnum, PointerValue};
use inkwell::AddressSpace;
use std::collections::HashMap;

/// Registered body and backend handle of a named struct.
pub struct StructInfo<'ctx> {
    pub ty: StructType<'ctx>,
    pub fields: Vec<(Type, String)>,
}

/// Name-keyed struct registry. Registration happens once per name; the first
/// registration wins.
#[derive(Default)]
pub struct StructRegistry<'ctx> {
    entries: HashMap<String, StructInfo<'ctx>>,
}

impl<'ctx> StructRegistry<'ctx> {
    pub fn register(&mut self, name: &str, fields: Vec<(Type, String)>, ty: StructType<'ctx>) {
        self.entries
            .entry(name.to_string())
            .or_insert(StructInfo { ty, fields });
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&StructInfo<'ctx>> {
        self.entries.get(name)
    }

    /// Index of a field by its declared name.
    pub fn field_index(&self, struct_name: &str, field: &str) -> Option<u32> {
        let info = self.entries.get(struct_name)?;
        info.fields
            .iter()
            .position(|(_, name)| name == field)
            .map(|i| i as u32)
    }
}

pub struct CodeGen<'ctx> {
    pub context: &'ctx Context,
    pub module: Module<'ctx>,
    pub builder: Builder<'ctx>,
    pub structs: StructRegistry<'ctx>,
    pub scopes: ScopeStack<'ctx>,
}

impl<'ctx> CodeGen<'ctx> {
    pub fn new(context: &'ctx Context) -> Self {
        Self {
            context,
            module: context.create_module("opal"),
            builder: context.create_builder(),
            structs: StructRegistry::default(),
            scopes: ScopeStack::new(),
        }
    }

    pub fn finish(self) -> Module<'ctx> {
        self.module
    }

    /// Map a source type onto an LLVM type. Total except for unresolved
    /// struct names and `void` in value position.
    pub fn lower_basic_type(&self, ty: &Type) -> Option<BasicTypeEnum<'ctx>> {
        Some(match ty {
            Type::Int(width) => self.int_type(*width).into(),
            Type::Float(16) => self.context.f16_type().into(),
            Type::Float(32) => self.context.f32_type().into(),
            Type::Float(64) => self.context.f64_type().into(),
            Type::Float(_) => return None,
            Type::Pointer(elem) => {
                let pointee = self.lower_basic_type(elem)?;
                pointee.ptr_type(AddressSpace::default()).into()
            }
            Type::Array(len, elem) => self.lower_basic_type(elem)?.array_type(*len as u32).into(),
            Type::Struct(name) => self.structs.get(name)?.ty.into(),
            Type::Void => return None,
        })
    }

    pub fn int_type(&self, width: u32) -> IntType<'ctx> {
        self.context.custom_width_int_type(width)
    }

    /// Signature for a function or extern declaration; `None` when any
    /// parameter or return type fails to lower.
    pub fn function_type(
        &self,
        params: &[crate::ast::Param],
        return_type: &Type,
    ) -> Option<FunctionType<'ctx>> {
        let mut param_types = Vec::with_capacity(params.len());
        for param in params {
            param_types.push(self.lower_basic_type(&param.ty)?.into());
        }
        Some(match return_type {
            Type::Void => self.context.void_type().fn_type(&param_types, false),
            other => self.lower_basic_type(other)?.fn_type(&param_types, false),
        })
    }

    /// Insert an alloca at the top of the current function's entry block, so
    /// that the allocation dominates every use regardless of where the `let`
    /// appears in control flow.
    pub fn create_entry_alloca(
        &self,
        name: &str,
        ty: BasicTypeEnum<'ctx>,
    ) -> Option<PointerValue<'ctx>> {
        let function = self.builder.get_insert_block()?.get_parent()?;
        let entry = function.get_first_basic_block()?;

        let tmp = self.context.create_builder();
        match entry.get_first_instruction() {
            Some(first) => tmp.position_before(&first),
            None => tmp.position_at_end(entry),
        }
        tmp.build_alloca(ty, name).ok()
    }

    pub fn zero_value(&self, ty: BasicTypeEnum<'ctx>) -> BasicValueEnum<'ctx> {
        ty.const_zero()
    }

    pub fn current_block_terminated(&self) -> bool {
        self.builder
            .get_insert_block()
            .and_then(|block| block.get_terminator())
            .is_some()
    }
}
