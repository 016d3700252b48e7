use opal_compiler::preprocess::preprocess;
use opal_compiler::CompileError;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Fresh scratch directory per test.
fn scratch_dir(name: &str) -> PathBuf {
    let n = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("opal-pp-{}-{}-{}", std::process::id(), n, name));
    fs::create_dir_all(&dir).expect("scratch dir should be creatable");
    dir
}

#[test]
fn include_is_replaced_by_marked_block() {
    let dir = scratch_dir("basic");
    fs::write(dir.join("lib.opal"), "fn one(): i32 { return 1; }\n").unwrap();
    fs::write(
        dir.join("main.opal"),
        "include \"lib.opal\";\nexport fn main(): i32 { return one(); }\n",
    )
    .unwrap();

    let text = preprocess(&dir.join("main.opal")).unwrap();
    assert!(text.contains("// begin include \"lib.opal\""));
    assert!(text.contains("fn one(): i32"));
    assert!(text.contains("// end include \"lib.opal\""));
    assert!(!text.contains("include \"lib.opal\";"));
}

#[test]
fn includes_resolve_relative_to_the_including_file() {
    let dir = scratch_dir("relative");
    fs::create_dir_all(dir.join("sub")).unwrap();
    fs::write(dir.join("sub/inner.opal"), "fn inner(): i32 { return 2; }\n").unwrap();
    fs::write(dir.join("sub/mid.opal"), "include \"inner.opal\";\n").unwrap();
    fs::write(dir.join("main.opal"), "include \"sub/mid.opal\";\n").unwrap();

    let text = preprocess(&dir.join("main.opal")).unwrap();
    assert!(text.contains("fn inner(): i32"));
}

#[test]
fn mutual_includes_terminate_and_content_appears_once() {
    // A and B include C and each other; C's body must appear exactly once.
    let dir = scratch_dir("cycle");
    fs::write(dir.join("c.opal"), "fn shared(): i32 { return 3; }\n").unwrap();
    fs::write(
        dir.join("a.opal"),
        "include \"c.opal\";\ninclude \"b.opal\";\nfn a(): i32 { return 1; }\n",
    )
    .unwrap();
    fs::write(
        dir.join("b.opal"),
        "include \"c.opal\";\ninclude \"a.opal\";\nfn b(): i32 { return 2; }\n",
    )
    .unwrap();

    let text = preprocess(&dir.join("a.opal")).unwrap();
    assert_eq!(
        text.matches("fn shared(): i32").count(),
        1,
        "C's body should appear exactly once:\n{}",
        text
    );
    assert_eq!(text.matches("fn a(): i32").count(), 1);
    assert_eq!(text.matches("fn b(): i32").count(), 1);
}

#[test]
fn missing_include_expands_to_nothing() {
    let dir = scratch_dir("missing");
    fs::write(
        dir.join("main.opal"),
        "include \"nope.opal\";\nfn f(): i32 { return 0; }\n",
    )
    .unwrap();

    let text = preprocess(&dir.join("main.opal")).unwrap();
    assert!(!text.contains("begin include"));
    assert!(text.contains("fn f(): i32"));
}

#[test]
fn malformed_directive_expands_to_nothing() {
    let dir = scratch_dir("malformed");
    fs::write(
        dir.join("main.opal"),
        "include lib.opal;\nfn f(): i32 { return 0; }\n",
    )
    .unwrap();

    let text = preprocess(&dir.join("main.opal")).unwrap();
    assert!(!text.contains("lib.opal"));
    assert!(text.contains("fn f(): i32"));
}

#[test]
fn identifier_starting_with_include_is_not_a_directive() {
    let dir = scratch_dir("lookalike");
    fs::write(
        dir.join("main.opal"),
        "fn f(): i32 {\n    let i32 included = 1;\n    included = included + 1;\n    return included;\n}\n",
    )
    .unwrap();

    let text = preprocess(&dir.join("main.opal")).unwrap();
    assert!(text.contains("included = included + 1;"));
    assert!(text.contains("return included;"));
}

#[test]
fn unreadable_root_is_a_fatal_input_error() {
    let dir = scratch_dir("fatal");
    let result = preprocess(&dir.join("absent.opal"));
    assert!(matches!(result, Err(CompileError::Input { .. })));
}
