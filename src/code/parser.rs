#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Tree-sitter parser wrapper for Python submissions.

use std::fmt::Formatter;

use anyhow::{Context, Result, anyhow};
use tree_sitter::{Language, Node, Query, QueryCursor, StreamingIterator, Tree};

/// A struct that wraps a tree-sitter parse tree and the source it came from.
#[derive(Clone)]
pub struct Parser {
    /// The source code being parsed.
    code: String,
    /// The parse tree.
    tree: Tree,
    /// The tree-sitter Python grammar language.
    lang: Language,
}

/// Returns the compiled tree-sitter Python language.
fn python_language() -> Language {
    tree_sitter_python::LANGUAGE.into()
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("lines", &self.line_count())
            .field("has_syntax_errors", &self.has_syntax_errors())
            .finish()
    }
}

impl Parser {
    /// Parses `source_code` with the Python grammar.
    ///
    /// Tree-sitter always produces a tree; malformed input shows up as error
    /// nodes, see [`Parser::has_syntax_errors`].
    pub fn new(source_code: impl Into<String>) -> Result<Self> {
        let source_code = source_code.into();
        let mut parser = tree_sitter::Parser::new();
        let language = python_language();

        parser
            .set_language(&language)
            .with_context(|| "Failed to load Python grammar")?;
        let tree = parser
            .parse(source_code.as_str(), None)
            .ok_or_else(|| anyhow!("Error parsing Python code"))?;

        Ok(Self {
            code: source_code,
            tree,
            lang: language,
        })
    }

    /// Returns the parse tree's root node.
    pub fn root_node(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Returns true if the tree contains error or missing nodes.
    pub fn has_syntax_errors(&self) -> bool {
        self.root_node().has_error()
    }

    /// Returns the 1-based line of the first syntax error, if any.
    pub fn first_error_line(&self) -> Option<usize> {
        let mut cursor = self.tree.walk();
        let mut node = self.root_node();
        if !node.has_error() {
            return None;
        }

        // Descend into the first child that carries the error.
        loop {
            if node.is_error() || node.is_missing() {
                return Some(node.start_position().row + 1);
            }
            let next = node
                .children(&mut cursor)
                .find(|child| child.has_error());
            match next {
                Some(child) => node = child,
                None => return Some(node.start_position().row + 1),
            }
        }
    }

    /// Counts the matches of a tree-sitter query.
    ///
    /// * `q`: the tree-sitter query to be applied
    pub fn count_matches(&self, q: &str) -> Result<usize> {
        let query = Query::new(&self.lang, q)
            .with_context(|| format!("Failed to compile tree-sitter query: {q}"))?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, self.root_node(), self.code.as_bytes());

        let mut count = 0;
        while matches.next().is_some() {
            count += 1;
        }

        Ok(count)
    }

    /// Returns the total number of lines in the source code.
    pub fn line_count(&self) -> usize {
        self.code.lines().count()
    }
}
