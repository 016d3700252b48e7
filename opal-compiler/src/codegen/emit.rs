//! IR-text and object-file emission.

use crate::CompileError;
use inkwell::module::Module;
use inkwell::targets::{
    CodeModel, FileType, InitializationConfig, RelocMode, Target, TargetMachine, TargetTriple,
};
use inkwell::OptimizationLevel;
use std::path::Path;

/// Write the module as textual LLVM IR.
pub fn write_ir(module: &Module, path: &Path) -> Result<(), CompileError> {
    module
        .print_to_file(path)
        .map_err(|e| CompileError::Emit(e.to_string()))
}

/// Emit a native object file for the given triple, or the host triple when
/// none is given. The module's data layout is set from the target machine
/// before emission.
pub fn emit_object(
    module: &Module,
    triple: Option<&str>,
    path: &Path,
) -> Result<(), CompileError> {
    Target::initialize_all(&InitializationConfig::default());

    let triple = match triple {
        Some(t) => TargetTriple::create(t),
        None => TargetMachine::get_default_triple(),
    };
    module.set_triple(&triple);

    let target = Target::from_triple(&triple).map_err(|e| CompileError::Emit(e.to_string()))?;
    let machine = target
        .create_target_machine(
            &triple,
            "generic",
            "",
            OptimizationLevel::Default,
            RelocMode::PIC,
            CodeModel::Default,
        )
        .ok_or_else(|| {
            CompileError::Emit(format!(
                "no target machine for {}",
                triple.as_str().to_string_lossy()
            ))
        })?;

    module.set_data_layout(&machine.get_target_data().get_data_layout());

    machine
        .write_to_file(module, FileType::Object, path)
        .map_err(|e| CompileError::Emit(e.to_string()))
}
