pub mod ast;
pub mod codegen;
pub mod frontend;
pub mod preprocess;
pub mod types;

use inkwell::context::Context;
use inkwell::module::Module;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Lexical error: {0}")]
    Lexical(#[from] frontend::lexer::LexicalError),

    #[error("Parse error at position {location}: {message}")]
    Parse { location: usize, message: String },

    #[error("Cannot read '{path}': {message}")]
    Input { path: String, message: String },

    #[error("Module verification failed:\n{0}")]
    Verify(String),

    #[error("Emission failed: {0}")]
    Emit(String),
}

/// Compile (already preprocessed) source text into an LLVM module.
///
/// The module is not verified here; malformed programs surface as
/// verification failures at the driver, never as panics.
pub fn compile_to_module<'ctx>(
    context: &'ctx Context,
    source: &str,
) -> Result<Module<'ctx>, CompileError> {
    let program = ast::parse_to_ast(source)?;
    Ok(codegen::lower(context, &program))
}
