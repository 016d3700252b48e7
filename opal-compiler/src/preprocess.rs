//! Textual `include` expansion.
//!
//! `include "path";` lines are replaced by a comment-marked block wrapping
//! the included file, resolved relative to the including file. Canonical
//! absolute paths key the already-seen set, so every file's content appears
//! at most once and include cycles terminate. Missing files and malformed
//! directives expand to nothing, with a diagnostic on stderr.

use crate::CompileError;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub fn preprocess(root: &Path) -> Result<String, CompileError> {
    let canonical = fs::canonicalize(root).map_err(|e| CompileError::Input {
        path: root.display().to_string(),
        message: e.to_string(),
    })?;
    let text = fs::read_to_string(root).map_err(|e| CompileError::Input {
        path: root.display().to_string(),
        message: e.to_string(),
    })?;

    let mut included = HashSet::new();
    included.insert(canonical);

    let dir = root.parent().unwrap_or(Path::new("."));
    Ok(expand(&text, dir, &mut included))
}

fn expand(text: &str, dir: &Path, included: &mut HashSet<PathBuf>) -> String {
    let mut out = String::with_capacity(text.len());

    for line in text.lines() {
        let trimmed = line.trim_start();
        if let Some(rest) = directive_rest(trimmed) {
            match parse_include_path(rest) {
                Some(path) => out.push_str(&expand_include(&path, dir, included)),
                None => eprintln!("warning: malformed include directive: {}", line.trim()),
            }
            continue;
        }
        out.push_str(line);
        out.push('\n');
    }

    out
}

/// The remainder of an `include` directive line, or `None` when the line is
/// ordinary source (e.g. an identifier merely starting with "include").
fn directive_rest(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("include")?;
    if rest.starts_with(|c: char| c.is_whitespace() || c == '"') {
        Some(rest)
    } else {
        None
    }
}

/// Parse `"relative/path";` with nothing else on the line.
fn parse_include_path(rest: &str) -> Option<String> {
    let rest = rest.trim_start();
    let rest = rest.strip_prefix('"')?;
    let end = rest.find('"')?;
    let path = &rest[..end];
    let tail = rest[end + 1..].trim();
    if tail != ";" {
        return None;
    }
    Some(path.to_string())
}

fn expand_include(path: &str, dir: &Path, included: &mut HashSet<PathBuf>) -> String {
    let full = dir.join(path);

    let canonical = match fs::canonicalize(&full) {
        Ok(canonical) => canonical,
        Err(e) => {
            eprintln!("warning: cannot open include \"{}\": {}", full.display(), e);
            return String::new();
        }
    };

    // Seen before: the directive expands to nothing
    if !included.insert(canonical) {
        return String::new();
    }

    let text = match fs::read_to_string(&full) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("warning: cannot read include \"{}\": {}", full.display(), e);
            return String::new();
        }
    };

    let inner_dir = full.parent().unwrap_or(dir);
    let inner = expand(&text, inner_dir, included);

    format!("// begin include \"{path}\"\n{inner}// end include \"{path}\"\n")
}
