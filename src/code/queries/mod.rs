//! Tree-sitter query strings used by the code analyzer on Python sources.

/// Tree-sitter query that returns function and class definitions.
/// * `definition`: the whole definition node
pub const DEFINITION_QUERY: &str = include_str!("definitions.scm");

/// Tree-sitter query that returns plain `name = value` assignments. Annotated
/// forms such as `x: int` or `x: int = 1` do not match.
/// * `assignment`: the assignment node
pub const ASSIGNMENT_QUERY: &str = include_str!("assignments.scm");

/// Tree-sitter query that returns branches and loops (`if`, `elif`, `for`,
/// `while`).
/// * `control`: the statement node
pub const CONTROL_FLOW_QUERY: &str = include_str!("control_flow.scm");

/// Tree-sitter query that returns Python 2 `print` and `exec` statements,
/// which the grammar accepts but Python 3 rejects.
/// * `legacy`: the statement node
pub const LEGACY_STATEMENT_QUERY: &str = include_str!("legacy_statements.scm");
