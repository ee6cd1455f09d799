//! Lint: no panicking shortcuts in engine code.
//!
//! The reducer is total: every failure is a `Rejection` or a `LoadError`.
//! This test scans every file under `src/` up to its first `#[cfg(test)]`
//! and flags `.unwrap()`, `.expect(` and `panic!(` outside comments.

use std::fs;
use std::path::Path;

const FORBIDDEN: &[&str] = &[".unwrap()", ".expect(", "panic!("];

/// Scan the non-test part of `source`. Returns (line number, line).
fn find_panics(source: &str) -> Vec<(usize, String)> {
    let mut violations = Vec::new();

    for (line_num_0, line) in source.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.starts_with("#[cfg(test)]") {
            break;
        }
        if trimmed.starts_with("//") {
            continue;
        }
        if FORBIDDEN.iter().any(|f| trimmed.contains(f)) {
            violations.push((line_num_0 + 1, trimmed.to_string()));
        }
    }

    violations
}

#[test]
fn no_panicking_shortcuts_in_src() {
    let src_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
    let mut all_violations = Vec::new();

    visit_sources(&src_dir, &mut all_violations);

    if !all_violations.is_empty() {
        let mut msg = String::from(
            "Found panicking calls in engine code.\n\
             Return a Rejection or LoadError instead.\n\n",
        );
        for (file, line_num, line) in &all_violations {
            msg.push_str(&format!("  {}:{}: {}\n", file, line_num, line));
        }
        panic!("{}", msg);
    }
}

fn visit_sources(dir: &Path, violations: &mut Vec<(String, usize, String)>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            visit_sources(&path, violations);
        } else if path.extension().map(|e| e == "rs").unwrap_or(false) {
            let Ok(source) = fs::read_to_string(&path) else {
                continue;
            };
            let display_path = path.display().to_string();
            for (line_num, line) in find_panics(&source) {
                violations.push((display_path.clone(), line_num, line));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_unwrap() {
        let source = "let x = map.get(id).unwrap();";
        assert_eq!(find_panics(source).len(), 1);
    }

    #[test]
    fn allows_unwrap_or() {
        let source = "let x = map.get(id).unwrap_or(&0);\nlet y = z.unwrap_or_else(f);";
        assert!(find_panics(source).is_empty());
    }

    #[test]
    fn ignores_comments() {
        let source = "// state.generator(id).unwrap()";
        assert!(find_panics(source).is_empty());
    }

    #[test]
    fn stops_at_test_module() {
        let source = "fn f() {}\n#[cfg(test)]\nmod tests { fn g() { x.unwrap(); } }";
        assert!(find_panics(source).is_empty());
    }
}
