#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Binary code-dialect switch.

use std::{fmt::Display, path::Path};

use serde::{Deserialize, Serialize};

/// Extensions treated as C++ sources or headers.
const CPP_EXTENSIONS: [&str; 5] = ["cpp", "cc", "cxx", "h", "hpp"];

/// The two code dialects the analyzer understands.
///
/// Python is the scripting dialect and is inspected through its syntax tree.
/// C++ is the systems dialect and is inspected with textual pattern scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Scripting dialect.
    Python,
    /// Systems dialect.
    Cpp,
}

impl Dialect {
    /// Maps a file extension (without the dot, any case) to a dialect.
    pub fn from_extension(ext: &str) -> Option<Dialect> {
        let ext = ext.to_ascii_lowercase();
        if ext == "py" {
            Some(Dialect::Python)
        } else if CPP_EXTENSIONS.contains(&ext.as_str()) {
            Some(Dialect::Cpp)
        } else {
            None
        }
    }

    /// Picks the dialect of a submission.
    ///
    /// A recognised filename extension wins. Otherwise include directives or
    /// `std::` qualified names mark C++, and anything else is Python.
    pub fn detect(filename: Option<&str>, code: &str) -> Dialect {
        let from_name = filename
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .and_then(Dialect::from_extension);

        match from_name {
            Some(dialect) => dialect,
            None if code.contains("#include") || code.contains("std::") => Dialect::Cpp,
            None => Dialect::Python,
        }
    }

    /// Returns true if a trimmed line is a whole-line comment in this dialect.
    pub fn is_comment_line(self, trimmed: &str) -> bool {
        match self {
            Dialect::Python => trimmed.starts_with('#'),
            Dialect::Cpp => trimmed.starts_with("//"),
        }
    }

    /// Returns the lowercase dialect name.
    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Python => "python",
            Dialect::Cpp => "cpp",
        }
    }
}

impl Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
