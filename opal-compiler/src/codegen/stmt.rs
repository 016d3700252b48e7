//! Declaration and statement lowering.

use super::context::CodeGen;
use crate::ast::{Decl, Expr, Param, Program, Stmt};
use crate::codegen::scope::Slot;
use crate::types::Type;
use inkwell::module::Linkage;
use inkwell::values::BasicValueEnum;

impl<'ctx> CodeGen<'ctx> {
    /// Struct declarations first so later references resolve, then externs,
    /// then function bodies.
    pub fn lower_program(&mut self, program: &Program) {
        for decl in &program.declarations {
            if let Decl::Struct { name, fields } = decl {
                self.declare_struct(name, fields);
            }
        }
        for decl in &program.declarations {
            if let Decl::Extern {
                name,
                params,
                return_type,
            } = decl
            {
                self.declare_extern(name, params, return_type);
            }
        }
        for decl in &program.declarations {
            if let Decl::Function {
                name,
                params,
                return_type,
                body,
                exported,
            } = decl
            {
                self.lower_function(name, params, return_type, body, *exported);
            }
        }
    }

    fn declare_struct(&mut self, name: &str, fields: &[(Type, String)]) {
        if self.structs.contains(name) {
            return;
        }
        let field_types = fields
            .iter()
            .map(|(ty, _)| self.lower_basic_type(ty))
            .collect::<Option<Vec<_>>>();
        let Some(field_types) = field_types else {
            return;
        };

        let struct_type = self.context.opaque_struct_type(name);
        struct_type.set_body(&field_types, false);
        self.structs.register(name, fields.to_vec(), struct_type);
    }

    fn declare_extern(&mut self, name: &str, params: &[Param], return_type: &Type) {
        let Some(fn_type) = self.function_type(params, return_type) else {
            return;
        };
        self.module
            .add_function(name, fn_type, Some(Linkage::External));
    }

    fn lower_function(
        &mut self,
        name: &str,
        params: &[Param],
        return_type: &Type,
        body: &[Stmt],
        exported: bool,
    ) {
        let Some(fn_type) = self.function_type(params, return_type) else {
            return;
        };
        let linkage = if exported {
            Linkage::External
        } else {
            Linkage::Internal
        };
        let function = self.module.add_function(name, fn_type, Some(linkage));

        let entry = self.context.append_basic_block(function, "entry");
        self.builder.position_at_end(entry);

        self.scopes.enter();

        // Copy each parameter into an addressable slot; the raw SSA value is
        // kept as well so struct parameters can be read by field extraction.
        for (param, value) in params.iter().zip(function.get_param_iter()) {
            let Some(ty) = self.lower_basic_type(&param.ty) else {
                continue;
            };
            let Some(ptr) = self.create_entry_alloca(&param.name, ty) else {
                continue;
            };
            let _ = self.builder.build_store(ptr, value);
            self.scopes.insert_slot(
                param.name.clone(),
                Slot {
                    ptr,
                    ty,
                    src: param.ty.clone(),
                },
            );
            self.scopes.insert_value(param.name.clone(), value);
        }

        for stmt in body {
            self.lower_stmt(stmt);
        }

        // Fell off the end of the body: synthesize a default return for
        // void, integer and float functions. Anything else stays
        // unterminated and is rejected by verification.
        if !self.current_block_terminated() {
            match return_type {
                Type::Void => {
                    let _ = self.builder.build_return(None);
                }
                Type::Int(width) => {
                    let zero = self.int_type(*width).const_zero();
                    let _ = self.builder.build_return(Some(&zero));
                }
                Type::Float(_) => {
                    if let Some(ty) = self.lower_basic_type(return_type) {
                        let zero = self.zero_value(ty);
                        let _ = self.builder.build_return(Some(&zero));
                    }
                }
                _ => {}
            }
        }

        self.scopes.exit();
    }

    pub fn lower_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Let { ty, name, value } => self.lower_let(ty, name, value),
            Stmt::Return(expr) => self.lower_return(expr.as_ref()),
            Stmt::Expr(expr) => {
                // Lowered for side effects only
                let _ = self.lower_expr(expr);
            }
            Stmt::If {
                condition,
                then_body,
                else_body,
            } => self.lower_if(condition, then_body, else_body.as_deref()),
            Stmt::While { condition, body } => self.lower_while(condition, body),
        }
    }

    fn lower_let(&mut self, ty: &Type, name: &str, value: &Expr) {
        let Some(llvm_ty) = self.lower_basic_type(ty) else {
            return;
        };
        let Some(ptr) = self.create_entry_alloca(name, llvm_ty) else {
            return;
        };
        self.scopes.insert_slot(
            name.to_string(),
            Slot {
                ptr,
                ty: llvm_ty,
                src: ty.clone(),
            },
        );

        // Array and struct "initializers" are placeholders in the surface
        // syntax; the slot is zeroed instead.
        if ty.is_aggregate() {
            let _ = self.builder.build_store(ptr, self.zero_value(llvm_ty));
        } else if let Some(value) = self.lower_expr(value) {
            let _ = self.builder.build_store(ptr, value);
        }
    }

    fn lower_return(&mut self, expr: Option<&Expr>) {
        match expr {
            Some(expr) => {
                if let Some(value) = self.lower_expr(expr) {
                    let _ = self.builder.build_return(Some(&value));
                }
            }
            None => {
                let _ = self.builder.build_return(None);
            }
        }
    }

    fn lower_if(&mut self, condition: &Expr, then_body: &[Stmt], else_body: Option<&[Stmt]>) {
        let Some(BasicValueEnum::IntValue(cond)) = self.lower_expr(condition) else {
            return;
        };
        let Some(function) = self
            .builder
            .get_insert_block()
            .and_then(|block| block.get_parent())
        else {
            return;
        };

        let then_block = self.context.append_basic_block(function, "then");
        let else_block = self.context.append_basic_block(function, "else");
        let merge_block = self.context.append_basic_block(function, "merge");

        let _ = self
            .builder
            .build_conditional_branch(cond, then_block, else_block);

        self.builder.position_at_end(then_block);
        self.scopes.enter();
        for stmt in then_body {
            self.lower_stmt(stmt);
        }
        self.scopes.exit();
        if !self.current_block_terminated() {
            let _ = self.builder.build_unconditional_branch(merge_block);
        }

        self.builder.position_at_end(else_block);
        match else_body {
            Some(else_body) => {
                self.scopes.enter();
                for stmt in else_body {
                    self.lower_stmt(stmt);
                }
                self.scopes.exit();
                if !self.current_block_terminated() {
                    let _ = self.builder.build_unconditional_branch(merge_block);
                }
            }
            None => {
                let _ = self.builder.build_unconditional_branch(merge_block);
            }
        }

        // The merge block only survives if something branches to it; when
        // both arms returned, the insertion point stays on the terminated
        // else path.
        if merge_block.get_first_use().is_some() {
            self.builder.position_at_end(merge_block);
        } else {
            let _ = merge_block.remove_from_function();
        }
    }

    fn lower_while(&mut self, condition: &Expr, body: &[Stmt]) {
        let Some(function) = self
            .builder
            .get_insert_block()
            .and_then(|block| block.get_parent())
        else {
            return;
        };

        let cond_block = self.context.append_basic_block(function, "while_cond");
        let body_block = self.context.append_basic_block(function, "while_body");
        let end_block = self.context.append_basic_block(function, "while_end");

        let _ = self.builder.build_unconditional_branch(cond_block);

        self.builder.position_at_end(cond_block);
        let Some(BasicValueEnum::IntValue(cond)) = self.lower_expr(condition) else {
            return;
        };
        let _ = self
            .builder
            .build_conditional_branch(cond, body_block, end_block);

        self.builder.position_at_end(body_block);
        self.scopes.enter();
        for stmt in body {
            self.lower_stmt(stmt);
        }
        self.scopes.exit();
        if !self.current_block_terminated() {
            let _ = self.builder.build_unconditional_branch(cond_block);
        }

        self.builder.position_at_end(end_block);
    }
}
