use clap::Parser;
use inkwell::context::Context;
use inkwell::targets::TargetTriple;
use opal_compiler::codegen::emit;
use opal_compiler::preprocess::preprocess;
use opal_compiler::{compile_to_module, CompileError};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "opalc")]
#[command(about = "Compiler for the Opal language")]
struct Args {
    /// Path to the source file to compile
    file: PathBuf,

    /// Write textual LLVM IR instead of an object file
    #[arg(long)]
    emit_llvm: bool,

    /// Output path (default: input base + .ll or .o)
    #[arg(short = 'o')]
    output: Option<PathBuf>,

    /// Override the target triple
    #[arg(long)]
    target: Option<String>,

    /// Additionally print the IR to stdout
    #[arg(long)]
    print_ir: bool,
}

fn main() {
    let args = Args::parse();

    let source = preprocess(&args.file).unwrap_or_else(|e| {
        eprintln!("{}", e);
        process::exit(1);
    });

    let context = Context::create();
    let module = compile_to_module(&context, &source).unwrap_or_else(|e| {
        eprintln!("{}", e);
        process::exit(1);
    });

    if let Some(triple) = &args.target {
        module.set_triple(&TargetTriple::create(triple));
    }

    if args.print_ir {
        print!("{}", module.print_to_string().to_string());
    }

    if let Err(e) = module.verify() {
        eprintln!("{}", CompileError::Verify(e.to_string()));
        process::exit(1);
    }

    let output = args.output.unwrap_or_else(|| {
        args.file
            .with_extension(if args.emit_llvm { "ll" } else { "o" })
    });

    if args.emit_llvm {
        if let Err(e) = emit::write_ir(&module, &output) {
            eprintln!("{}", e);
            process::exit(1);
        }
        if !args.print_ir {
            println!("LLVM IR written to: {}", output.display());
        }
    } else {
        if let Err(e) = emit::emit_object(&module, args.target.as_deref(), &output) {
            eprintln!("{}", e);
            process::exit(1);
        }
        println!("Object file written to: {}", output.display());
    }
}
