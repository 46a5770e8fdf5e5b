#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Textual pattern scans for the C++ dialect, which has no parser.

use std::sync::LazyLock;

use regex::Regex;

/// Builds a regex from a pattern literal known to be valid.
fn pattern(re: &str) -> Regex {
    Regex::new(re).unwrap_or_else(|e| panic!("invalid built-in pattern {re}: {e}"))
}

/// A return type, a name, a parameter list and an opening brace.
static FUNCTION_DECL: LazyLock<Regex> = LazyLock::new(|| pattern(r"\w+\s+\w+\s*\([^)]*\)\s*\{"));

/// `class Name`.
static CLASS_DECL: LazyLock<Regex> = LazyLock::new(|| pattern(r"class\s+\w+"));

/// A `/* ... */` block, possibly spanning lines.
static BLOCK_COMMENT: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?s)/\*.*?\*/"));

/// `if (`, `for (`, `while (` or `switch (`.
static CONTROL_FLOW: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"\b(?:if|for|while|switch)\s*\("));

/// Counts function-like declarations.
pub fn function_count(code: &str) -> usize {
    FUNCTION_DECL.find_iter(code).count()
}

/// Counts class declarations.
pub fn class_count(code: &str) -> usize {
    CLASS_DECL.find_iter(code).count()
}

/// Counts comments: lines containing `//` plus `/* */` blocks.
pub fn comment_count(code: &str) -> usize {
    let line_comments = code.lines().filter(|line| line.contains("//")).count();
    line_comments + BLOCK_COMMENT.find_iter(code).count()
}

/// Counts branch and loop headers.
pub fn control_flow_count(code: &str) -> usize {
    CONTROL_FLOW.find_iter(code).count()
}

/// Returns true if the code opens or qualifies a namespace.
pub fn uses_namespaces(code: &str) -> bool {
    code.contains("namespace") || code.contains("std::")
}

/// Returns true if the code carries an `#ifndef`/`#define` include guard.
pub fn has_include_guard(code: &str) -> bool {
    code.contains("#ifndef") && code.contains("#define")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"#include <iostream>
// entry point
/* multi
   line */
class Stack {};
int add(int a, int b) {
    if (a > b) { return a; }
    for (int i = 0; i < b; i++) {}
    return a + b;
}
"#;

    #[test]
    fn counts_declarations_and_comments() {
        assert_eq!(function_count(SAMPLE), 1);
        assert_eq!(class_count(SAMPLE), 1);
        assert_eq!(comment_count(SAMPLE), 2);
        assert_eq!(control_flow_count(SAMPLE), 2);
        assert!(!uses_namespaces(SAMPLE));
        assert!(!has_include_guard(SAMPLE));
    }
}
