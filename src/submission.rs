#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Submission records and loading them from a folder.

use std::{
    collections::BTreeMap,
    fs,
    io,
    path::Path,
};

use glob::{Pattern, glob};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    code::Dialect,
    constants::STUDENT_ID_SUFFIX,
    error::GradingError,
    types::SubmissionKind,
};

/// Extensions of plain-text submissions.
pub const TEXT_EXTENSIONS: [&str; 2] = ["txt", "md"];

/// Derives the student identifier from a file name: its stem plus
/// [`STUDENT_ID_SUFFIX`].
pub fn student_id(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    format!("{stem}{STUDENT_ID_SUFFIX}")
}

/// Normalises line endings to `\n` and trims surrounding whitespace.
pub fn clean_text(raw: &str) -> String {
    raw.replace("\r\n", "\n").replace('\r', "\n").trim().to_string()
}

/// Lowercase extension of a file name, if it has one.
fn extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

/// Classifies a file name by extension. Unsupported files yield `None`.
pub fn kind_of(filename: &str) -> Option<SubmissionKind> {
    let ext = extension(filename)?;
    if Dialect::from_extension(&ext).is_some() {
        Some(SubmissionKind::Code)
    } else if TEXT_EXTENSIONS.contains(&ext.as_str()) {
        Some(SubmissionKind::Content)
    } else {
        None
    }
}

/// One student file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Student identifier derived from the file name.
    pub identifier:    String,
    /// File name without directories.
    pub filename:      String,
    /// Cleaned file content.
    pub content:       String,
    /// Whether this is code or written content.
    pub kind:          SubmissionKind,
    /// Dialect implied by the extension, for code files.
    pub language_hint: Option<Dialect>,
}

impl Submission {
    /// Builds a submission from a file name and its raw content.
    ///
    /// Returns `None` if the extension is not supported.
    pub fn new(filename: impl Into<String>, raw: &str) -> Option<Self> {
        let filename = filename.into();
        let kind = kind_of(&filename)?;
        let language_hint = match kind {
            SubmissionKind::Code => {
                extension(&filename).and_then(|ext| Dialect::from_extension(&ext))
            }
            SubmissionKind::Content => None,
        };

        Some(Self {
            identifier: student_id(&filename),
            content: clean_text(raw),
            filename,
            kind,
            language_hint,
        })
    }
}

/// Loads every supported file directly inside `folder`, sorted by file name.
///
/// Unsupported files are skipped silently; unreadable ones are skipped with a
/// warning. Invalid UTF-8 is replaced rather than rejected.
pub fn load_folder(folder: impl AsRef<Path>) -> Result<Vec<Submission>, GradingError> {
    let folder = folder.as_ref();
    if !folder.is_dir() {
        return Err(GradingError::Io {
            path:   folder.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "folder not found"),
        });
    }

    let pattern = format!(
        "{}{}*",
        Pattern::escape(&folder.display().to_string()),
        std::path::MAIN_SEPARATOR
    );
    debug!(%pattern, "Scanning for submissions");

    let paths = glob(&pattern).map_err(|e| GradingError::Io {
        path:   folder.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, e.to_string()),
    })?;

    let mut submissions: Vec<Submission> = paths
        .filter_map(Result::ok)
        .filter(|path| path.is_file())
        .filter_map(|path| read_submission(&path))
        .collect();
    submissions.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(submissions)
}

/// Reads one file, or logs and returns `None`.
fn read_submission(path: &Path) -> Option<Submission> {
    let filename = path.file_name()?.to_str()?.to_string();
    kind_of(&filename)?;

    match fs::read(path) {
        Ok(bytes) => Submission::new(filename, &String::from_utf8_lossy(&bytes)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Skipping unreadable submission");
            None
        }
    }
}

/// Submissions keyed by file name, split into code and text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitSubmissions {
    /// Code files.
    pub code: BTreeMap<String, String>,
    /// Text files.
    pub text: BTreeMap<String, String>,
}

/// Splits submissions by kind into file-name keyed maps.
pub fn split_by_kind(submissions: impl IntoIterator<Item = Submission>) -> SplitSubmissions {
    let mut split = SplitSubmissions::default();
    for submission in submissions {
        match submission.kind {
            SubmissionKind::Code => split.code.insert(submission.filename, submission.content),
            SubmissionKind::Content => split.text.insert(submission.filename, submission.content),
        };
    }
    split
}
