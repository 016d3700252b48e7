use inkwell::context::Context;
use opal_compiler::ast::parse_to_ast;
use opal_compiler::{compile_to_module, CompileError};

// ── Parse and lexical errors ─────────────────────────────────────────────

#[test]
fn missing_name_is_a_parse_error() {
    let result = parse_to_ast("export fn (): i32 { return 0; }");
    assert!(matches!(result, Err(CompileError::Parse { .. })));
}

#[test]
fn call_on_computed_callee_is_a_parse_error() {
    // No first-class function values: the callee must be a bare identifier
    let result = parse_to_ast("export fn f(): i32 { return (g)(); }");
    assert!(matches!(result, Err(CompileError::Parse { .. })));
}

#[test]
fn unknown_character_is_a_lexical_error() {
    let result = parse_to_ast("export fn f(): i32 { return 1 $ 2; }");
    match result {
        Err(CompileError::Lexical(e)) => {
            assert_eq!(e.unexpected_char, '$');
            assert_eq!(e.line, 1);
        }
        other => panic!("expected a lexical error, got {:?}", other.err()),
    }
}

#[test]
fn parse_error_reports_position_and_expectations() {
    let result = parse_to_ast("fn f() { let = 3; }");
    match result {
        Err(CompileError::Parse { location, message }) => {
            assert!(location > 0);
            assert!(message.contains("Expected"), "message was: {}", message);
        }
        other => panic!("expected a parse error, got {:?}", other.err()),
    }
}

// ── Lowering failures are sentinels, not panics ──────────────────────────

#[test]
fn call_to_undeclared_function_produces_no_value() {
    // The return is dropped, so the epilogue default-return takes over and
    // the module still verifies.
    let context = Context::create();
    let module = compile_to_module(&context, "export fn f(): i32 { return ghost(); }")
        .expect("source should parse");
    module.verify().expect("module should verify");
    let ir = module.print_to_string().to_string();
    assert!(ir.contains("ret i32 0"));
    assert!(!ir.contains("ghost"));
}

#[test]
fn unresolved_struct_type_skips_the_declaration() {
    let context = Context::create();
    let module = compile_to_module(&context, "export fn f(Ghost g): i32 { return 0; }")
        .expect("source should parse");
    module.verify().expect("module should verify");
    assert!(module.get_function("f").is_none());
}

#[test]
fn mixed_operand_types_produce_no_value() {
    let context = Context::create();
    let module = compile_to_module(
        &context,
        "export fn f(i32 a, f64 b): f64 { return a + b; }",
    )
    .expect("source should parse");
    module.verify().expect("module should verify");
    let ir = module.print_to_string().to_string();
    // The addition was dropped; the default return filled in
    assert!(!ir.contains("fadd"));
    assert!(ir.contains("ret double"));
}

#[test]
fn unknown_identifier_produces_no_value() {
    let context = Context::create();
    let module = compile_to_module(&context, "export fn f(): i32 { return nope; }")
        .expect("source should parse");
    module.verify().expect("module should verify");
    let ir = module.print_to_string().to_string();
    assert!(ir.contains("ret i32 0"));
}

#[test]
fn unknown_field_name_produces_no_value() {
    let context = Context::create();
    let module = compile_to_module(
        &context,
        r#"
        struct V { i32 x; i32 y; i32 z; }
        export fn f(V v): i32 { return v.w; }
    "#,
    )
    .expect("source should parse");
    module.verify().expect("module should verify");
    let ir = module.print_to_string().to_string();
    assert!(ir.contains("ret i32 0"));
}
