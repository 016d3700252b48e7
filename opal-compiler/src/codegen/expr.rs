//! Expression lowering.
//!
//! Every function here returns `Option<BasicValueEnum>`; `None` is the "no
//! value" sentinel for malformed input. It propagates through consumers and
//! leaves the module in a state that verification rejects — lowering itself
//! never fails loudly.

use super::context::CodeGen;
use crate::ast::{BinOp, Expr, UnOp};
use crate::types::Type;
use inkwell::types::{ArrayType, BasicTypeEnum, StructType};
use inkwell::values::{BasicValueEnum, IntValue, PointerValue};
use inkwell::{FloatPredicate, IntPredicate};

impl<'ctx> CodeGen<'ctx> {
    pub fn lower_expr(&mut self, expr: &Expr) -> Option<BasicValueEnum<'ctx>> {
        match expr {
            // Integer literals are i32; width inference is deliberately absent
            Expr::Int(value) => Some(self.context.i32_type().const_int(*value as u64, true).into()),
            Expr::Float(value) => Some(self.context.f64_type().const_float(*value).into()),
            Expr::Bool(value) => Some(
                self.context
                    .bool_type()
                    .const_int(*value as u64, false)
                    .into(),
            ),
            Expr::Str(value) => {
                let global = self.builder.build_global_string_ptr(value, "str").ok()?;
                Some(global.as_pointer_value().into())
            }
            Expr::Identifier(name) => {
                let slot = self.scopes.slot(name)?.clone();
                self.builder.build_load(slot.ptr, name).ok()
            }
            Expr::Binary { op, left, right } => self.lower_binary(*op, left, right),
            Expr::Unary { op, operand } => self.lower_unary(*op, operand),
            Expr::Call { callee, args } => self.lower_call(callee, args),
            Expr::Member { object, field } => self.lower_member(object, field),
            Expr::Index { array, index } => self.lower_index(array, index),
            Expr::Assign { target, value } => self.lower_assignment(target, value),
        }
    }

    /// The lowered left operand picks the instruction family: ordered FP ops
    /// for floats, signed ops for integers. Mixed operand types produce no
    /// value.
    fn lower_binary(&mut self, op: BinOp, left: &Expr, right: &Expr) -> Option<BasicValueEnum<'ctx>> {
        let left = self.lower_expr(left)?;
        let right = self.lower_expr(right)?;

        use BasicValueEnum::{FloatValue, IntValue};
        match (left, right) {
            (FloatValue(l), FloatValue(r)) => {
                let b = &self.builder;
                Some(match op {
                    BinOp::Add => b.build_float_add(l, r, "addtmp").ok()?.into(),
                    BinOp::Sub => b.build_float_sub(l, r, "subtmp").ok()?.into(),
                    BinOp::Mul => b.build_float_mul(l, r, "multmp").ok()?.into(),
                    BinOp::Div => b.build_float_div(l, r, "divtmp").ok()?.into(),
                    BinOp::Eq => b
                        .build_float_compare(FloatPredicate::OEQ, l, r, "eqtmp")
                        .ok()?
                        .into(),
                    BinOp::Ne => b
                        .build_float_compare(FloatPredicate::ONE, l, r, "netmp")
                        .ok()?
                        .into(),
                    BinOp::Lt => b
                        .build_float_compare(FloatPredicate::OLT, l, r, "lttmp")
                        .ok()?
                        .into(),
                    BinOp::Gt => b
                        .build_float_compare(FloatPredicate::OGT, l, r, "gttmp")
                        .ok()?
                        .into(),
                    BinOp::Le => b
                        .build_float_compare(FloatPredicate::OLE, l, r, "letmp")
                        .ok()?
                        .into(),
                    BinOp::Ge => b
                        .build_float_compare(FloatPredicate::OGE, l, r, "getmp")
                        .ok()?
                        .into(),
                    // No FP remainder or FP logical ops in the source language
                    BinOp::Mod | BinOp::And | BinOp::Or => return None,
                })
            }
            (IntValue(l), IntValue(r)) => {
                let b = &self.builder;
                Some(match op {
                    BinOp::Add => b.build_int_add(l, r, "addtmp").ok()?.into(),
                    BinOp::Sub => b.build_int_sub(l, r, "subtmp").ok()?.into(),
                    BinOp::Mul => b.build_int_mul(l, r, "multmp").ok()?.into(),
                    BinOp::Div => b.build_int_signed_div(l, r, "divtmp").ok()?.into(),
                    BinOp::Mod => b.build_int_signed_rem(l, r, "modtmp").ok()?.into(),
                    BinOp::Eq => b
                        .build_int_compare(IntPredicate::EQ, l, r, "eqtmp")
                        .ok()?
                        .into(),
                    BinOp::Ne => b
                        .build_int_compare(IntPredicate::NE, l, r, "netmp")
                        .ok()?
                        .into(),
                    BinOp::Lt => b
                        .build_int_compare(IntPredicate::SLT, l, r, "lttmp")
                        .ok()?
                        .into(),
                    BinOp::Gt => b
                        .build_int_compare(IntPredicate::SGT, l, r, "gttmp")
                        .ok()?
                        .into(),
                    BinOp::Le => b
                        .build_int_compare(IntPredicate::SLE, l, r, "letmp")
                        .ok()?
                        .into(),
                    BinOp::Ge => b
                        .build_int_compare(IntPredicate::SGE, l, r, "getmp")
                        .ok()?
                        .into(),
                    // Bitwise on the language's i1 booleans; not short-circuit
                    BinOp::And => b.build_and(l, r, "andtmp").ok()?.into(),
                    BinOp::Or => b.build_or(l, r, "ortmp").ok()?.into(),
                })
            }
            _ => None,
        }
    }

    fn lower_unary(&mut self, op: UnOp, operand: &Expr) -> Option<BasicValueEnum<'ctx>> {
        match op {
            UnOp::Not => {
                let BasicValueEnum::IntValue(value) = self.lower_expr(operand)? else {
                    return None;
                };
                Some(self.builder.build_not(value, "nottmp").ok()?.into())
            }
            UnOp::Neg => match self.lower_expr(operand)? {
                BasicValueEnum::IntValue(value) => {
                    Some(self.builder.build_int_neg(value, "negtmp").ok()?.into())
                }
                BasicValueEnum::FloatValue(value) => {
                    Some(self.builder.build_float_neg(value, "negtmp").ok()?.into())
                }
                _ => None,
            },
            UnOp::Deref => {
                let BasicValueEnum::PointerValue(ptr) = self.lower_expr(operand)? else {
                    return None;
                };
                // The declared slot type supplies the pointee when the
                // operand is a bare identifier; otherwise fall back to i32
                // (expressions are not pointer-typed beyond that).
                let pointee = match operand {
                    Expr::Identifier(name) => match self.scopes.slot(name).map(|s| s.src.clone()) {
                        Some(Type::Pointer(elem)) => self.lower_basic_type(&elem),
                        _ => None,
                    },
                    _ => None,
                }
                .unwrap_or_else(|| self.context.i32_type().into());
                let _ = pointee;
                self.builder.build_load(ptr, "dereftmp").ok()
            }
            // Address-of is only meaningful on addressable names
            UnOp::Addr => match operand {
                Expr::Identifier(name) => Some(self.scopes.slot(name)?.ptr.into()),
                _ => None,
            },
        }
    }

    fn lower_call(&mut self, callee: &str, args: &[Expr]) -> Option<BasicValueEnum<'ctx>> {
        let function = self.module.get_function(callee)?;

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.lower_expr(arg)?.into());
        }

        let name = if function.get_type().get_return_type().is_none() {
            ""
        } else {
            "calltmp"
        };
        let call = self.builder.build_call(function, &values, name).ok()?;
        call.try_as_basic_value().left()
    }

    fn lower_member(&mut self, object: &Expr, field: &str) -> Option<BasicValueEnum<'ctx>> {
        // identifier.field over an addressable struct slot, or a by-value
        // struct parameter
        if let Expr::Identifier(name) = object {
            if let Some(slot) = self.scopes.slot(name).cloned() {
                if let BasicTypeEnum::StructType(struct_type) = slot.ty {
                    let (index, field_type) = self.field_info(struct_type, field)?;
                    let ptr = self
                        .builder
                        .build_struct_gep(slot.ptr, index, field)
                        .ok()?;
                    let _ = field_type;
                    return self.builder.build_load(ptr, field).ok();
                }
            } else if let Some(BasicValueEnum::StructValue(value)) = self.scopes.value(name) {
                let (index, _) = self.field_info(value.get_type(), field)?;
                return self.builder.build_extract_value(value, index, field).ok();
            }
        }

        // identifier[index].field
        if let Expr::Index { array, index } = object {
            if let Some((element_ptr, element_type)) = self.named_element_ptr(array, index) {
                if let BasicTypeEnum::StructType(struct_type) = element_type {
                    let (field_index, field_type) = self.field_info(struct_type, field)?;
                    let ptr = self
                        .builder
                        .build_struct_gep(element_ptr, field_index, field)
                        .ok()?;
                    let _ = field_type;
                    return self.builder.build_load(ptr, field).ok();
                }
            }
        }

        // Anything else that lowers to a struct aggregate: extract directly
        let BasicValueEnum::StructValue(value) = self.lower_expr(object)? else {
            return None;
        };
        let (index, _) = self.field_info(value.get_type(), field)?;
        self.builder.build_extract_value(value, index, field).ok()
    }

    fn lower_index(&mut self, array: &Expr, index: &Expr) -> Option<BasicValueEnum<'ctx>> {
        let (element_ptr, element_type) = self.named_element_ptr(array, index)?;
        let _ = element_type;
        self.builder.build_load(element_ptr, "arrayload").ok()
    }

    /// Assignment dispatches on the shape of the left-hand side: a bare
    /// identifier stores to its slot, `name[i]` to an array element,
    /// `name.f` / `name[i].f` to a struct field. The assigned value is the
    /// result.
    fn lower_assignment(&mut self, target: &Expr, value: &Expr) -> Option<BasicValueEnum<'ctx>> {
        let rhs = self.lower_expr(value)?;

        match target {
            Expr::Identifier(name) => {
                let ptr = self.scopes.slot(name)?.ptr;
                self.builder.build_store(ptr, rhs).ok()?;
                Some(rhs)
            }
            Expr::Index { array, index } => {
                let (element_ptr, _) = self.named_element_ptr(array, index)?;
                self.builder.build_store(element_ptr, rhs).ok()?;
                Some(rhs)
            }
            Expr::Member { object, field } => {
                let field_ptr = self.field_ptr(object, field)?;
                self.builder.build_store(field_ptr, rhs).ok()?;
                Some(rhs)
            }
            _ => None,
        }
    }

    /// Pointer to `name.field` or `name[i].field` for assignment.
    fn field_ptr(&mut self, object: &Expr, field: &str) -> Option<PointerValue<'ctx>> {
        if let Expr::Identifier(name) = object {
            let slot = self.scopes.slot(name)?.clone();
            let BasicTypeEnum::StructType(struct_type) = slot.ty else {
                return None;
            };
            let (index, _) = self.field_info(struct_type, field)?;
            return self
                .builder
                .build_struct_gep(slot.ptr, index, field)
                .ok();
        }

        if let Expr::Index { array, index } = object {
            let (element_ptr, element_type) = self.named_element_ptr(array, index)?;
            let BasicTypeEnum::StructType(struct_type) = element_type else {
                return None;
            };
            let (field_index, _) = self.field_info(struct_type, field)?;
            return self
                .builder
                .build_struct_gep(element_ptr, field_index, field)
                .ok();
        }

        None
    }

    /// Element pointer for `name[index]` where `name` is an addressable
    /// array slot: a `{0, index}` GEP through the array type. Returns the
    /// element type alongside for the ensuing load or store.
    fn named_element_ptr(
        &mut self,
        array: &Expr,
        index: &Expr,
    ) -> Option<(PointerValue<'ctx>, BasicTypeEnum<'ctx>)> {
        let Expr::Identifier(name) = array else {
            return None;
        };
        let slot = self.scopes.slot(name)?.clone();
        let BasicTypeEnum::ArrayType(array_type) = slot.ty else {
            return None;
        };
        let ptr = self.element_ptr(array_type, slot.ptr, index)?;
        Some((ptr, array_type.get_element_type()))
    }

    fn element_ptr(
        &mut self,
        array_type: ArrayType<'ctx>,
        ptr: PointerValue<'ctx>,
        index: &Expr,
    ) -> Option<PointerValue<'ctx>> {
        let BasicValueEnum::IntValue(index) = self.lower_expr(index)? else {
            return None;
        };
        let zero = self.context.i32_type().const_zero();
        let indices: [IntValue<'ctx>; 2] = [zero, index];
        unsafe {
            self.builder
                .build_gep(ptr, &indices, "arrayidx")
                .ok()
        }
    }

    /// Field index and type by declared field name, through the registry.
    fn field_info(
        &self,
        struct_type: StructType<'ctx>,
        field: &str,
    ) -> Option<(u32, BasicTypeEnum<'ctx>)> {
        let name = struct_type.get_name()?.to_str().ok()?;
        let index = self.structs.field_index(name, field)?;
        let field_type = struct_type.get_field_type_at_index(index)?;
        Some((index, field_type))
    }
}
