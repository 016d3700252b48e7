//! Lexically scoped symbol environment.
//!
//! Two parallel stacks of frames, pushed and popped together: one maps names
//! to addressable stack slots, the other to by-value SSA handles (used for
//! field extraction on struct parameters). Lookup walks top-down and the
//! first hit wins; inner declarations silently shadow outer ones.

use crate::types::Type;
use inkwell::types::BasicTypeEnum;
use inkwell::values::{BasicValueEnum, PointerValue};
use std::collections::HashMap;

/// Stack storage for an addressable local or parameter.
///
/// Carries both the LLVM type (opaque pointers no longer do) and the source
/// type, which member and dereference lowering consult.
#[derive(Debug, Clone)]
pub struct Slot<'ctx> {
    pub ptr: PointerValue<'ctx>,
    pub ty: BasicTypeEnum<'ctx>,
    pub src: Type,
}

pub struct ScopeStack<'ctx> {
    slots: Vec<HashMap<String, Slot<'ctx>>>,
    values: Vec<HashMap<String, BasicValueEnum<'ctx>>>,
}

impl<'ctx> ScopeStack<'ctx> {
    pub fn new() -> Self {
        Self {
            slots: vec![HashMap::new()],
            values: vec![HashMap::new()],
        }
    }

    pub fn enter(&mut self) {
        self.slots.push(HashMap::new());
        self.values.push(HashMap::new());
    }

    pub fn exit(&mut self) {
        self.slots.pop();
        self.values.pop();
    }

    pub fn insert_slot(&mut self, name: String, slot: Slot<'ctx>) {
        if let Some(frame) = self.slots.last_mut() {
            frame.insert(name, slot);
        }
    }

    pub fn insert_value(&mut self, name: String, value: BasicValueEnum<'ctx>) {
        if let Some(frame) = self.values.last_mut() {
            frame.insert(name, value);
        }
    }

    pub fn slot(&self, name: &str) -> Option<&Slot<'ctx>> {
        self.slots.iter().rev().find_map(|frame| frame.get(name))
    }

    pub fn value(&self, name: &str) -> Option<BasicValueEnum<'ctx>> {
        self.values
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
            .copied()
    }
}

impl<'ctx> Default for ScopeStack<'ctx> {
    fn default() -> Self {
        Self::new()
    }
}
