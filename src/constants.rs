#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Tunable scoring constants and fixed word lists.
//!
//! The thresholds below were chosen empirically. They are kept exactly so
//! that grades stay comparable between runs, but nothing else in the crate
//! depends on their particular values.

/// Tolerance allowed when checking that dimension weights sum to 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Suffix appended to a file stem to form a student identifier.
pub const STUDENT_ID_SUFFIX: &str = "_Result";

/// Minimum length of a word token considered a concept.
pub const MIN_CONCEPT_LEN: usize = 4;

/// Lines longer than this (after trimming) hurt readability.
pub const MAX_LINE_LEN: usize = 100;

// Code relevance gate.

/// Keyword ratio at or above which an oracle-approved submission earns the
/// top approach band.
pub const ORACLE_HIGH_RATIO: f64 = 0.30;
/// Keyword ratio at or above which an oracle-approved submission earns the
/// middle approach band.
pub const ORACLE_MID_RATIO: f64 = 0.15;
/// Matched-concept count that earns the top approach band regardless of ratio.
pub const ORACLE_HIGH_MATCHES: usize = 3;
/// Keyword ratio needed to pass the gate when no oracle verdict is available.
pub const FALLBACK_RATIO: f64 = 0.25;
/// Matched-concept count needed to pass the gate when no oracle verdict is
/// available.
pub const FALLBACK_MATCHES: usize = 2;
/// Approach score awarded by the keyword-only fallback.
pub const FALLBACK_APPROACH: f64 = 75.0;
/// Approach score at which dependent criteria earn full credit.
pub const RELEVANCE_SATURATION: f64 = 60.0;
/// Cap applied to readability when the approach score is zero.
pub const IRRELEVANT_READABILITY_CAP: f64 = 10.0;

// Content analyzer.

/// Similarity ratio above which a submission is treated as a copied prompt.
pub const COPY_SIMILARITY_THRESHOLD: f32 = 0.6;
/// Score cap applied to copied-prompt submissions.
pub const COPY_SCORE_CAP: f64 = 20.0;
/// Coverage score used when there are no key concepts to compare against.
pub const NO_CONCEPTS_COVERAGE: f64 = 60.0;
/// Maximum number of reference-text tokens used as concepts.
pub const MAX_REFERENCE_CONCEPTS: usize = 10;
/// Maximum number of concepts auto-extracted from a problem statement.
pub const MAX_TASK_CONCEPTS: usize = 12;
/// Fraction of required sections that must be present for alignment credit.
pub const REQUIRED_SECTION_RATIO: f64 = 0.7;

/// Weight of concept coverage in the content total.
pub const COVERAGE_WEIGHT: f64 = 0.60;
/// Weight of rubric alignment in the content total.
pub const ALIGNMENT_WEIGHT: f64 = 0.25;
/// Weight of logical flow in the content total.
pub const FLOW_WEIGHT: f64 = 0.08;
/// Weight of completeness in the content total.
pub const COMPLETENESS_WEIGHT: f64 = 0.07;

// Aggregation curve.

/// Scores below this are boosted by [`LOW_CURVE_FACTOR`] and capped here.
pub const LOW_CURVE_CEILING: f64 = 40.0;
/// Boost applied to scores below [`LOW_CURVE_CEILING`].
pub const LOW_CURVE_FACTOR: f64 = 1.1;
/// Scores below this (and at least [`LOW_CURVE_CEILING`]) get
/// [`MID_CURVE_FACTOR`].
pub const MID_CURVE_CEILING: f64 = 60.0;
/// Boost applied to scores in the middle band.
pub const MID_CURVE_FACTOR: f64 = 1.05;

// Oracle.

/// Attempts made against the oracle before falling back.
pub const ORACLE_MAX_ATTEMPTS: usize = 2;
/// Default per-attempt oracle timeout in seconds.
pub const DEFAULT_ORACLE_TIMEOUT_SECS: u64 = 30;
/// Characters of the problem statement sent with a relevance request.
pub const RELEVANCE_PROBLEM_TRUNCATE: usize = 1_500;
/// Characters of the submission sent with a relevance request.
pub const RELEVANCE_SUBMISSION_TRUNCATE: usize = 3_000;
/// Characters of the submission sent with an elaboration request.
pub const ELABORATION_SUBMISSION_TRUNCATE: usize = 4_000;

/// Generic programming and task words that never count as problem concepts
/// for code submissions.
pub const CODE_STOPWORDS: &[&str] = &[
    "write", "program", "function", "functions", "method", "methods", "class", "classes",
    "code", "implement", "implementation", "return", "returns", "input", "output", "print",
    "prints", "read", "reads", "given", "take", "takes", "should", "must", "that", "this",
    "with", "from", "into", "will", "which", "each", "then", "than", "when", "where",
    "your", "their", "have", "using", "use", "uses", "make", "create", "value", "values",
    "number", "numbers", "string", "strings", "list", "lists", "array", "arrays", "data",
    "result", "results", "test", "tests", "case", "cases", "example", "examples", "task",
    "problem", "solution", "solve", "following", "above", "below", "also", "only", "some",
    "more", "most", "very", "such", "them", "they", "what", "there", "these", "those",
    "true", "false", "none", "null", "void", "main", "include", "std", "int", "char",
    "bool", "float", "double", "long", "const", "static", "public", "private", "while",
    "else", "break", "continue", "import", "self", "user", "users", "file",
    "files", "line", "lines",
];

/// Generic and task-boilerplate words removed before auto-extracting content
/// concepts from a problem statement.
pub const TASK_STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "from",
    "by", "as", "is", "was", "are", "were", "be", "been", "being", "have", "has", "had", "do",
    "does", "did", "will", "would", "should", "could", "may", "might", "must", "can", "this",
    "that", "these", "those", "your", "their", "our", "its", "his", "her", "make", "create",
    "provide", "include", "ensure", "allow", "enable", "support", "help", "need", "want",
    "give", "take", "show", "tell", "huge", "large", "small", "good", "bad", "best", "better",
    "more", "less", "most", "least", "very", "much", "many", "some", "all", "each", "every",
    "both", "either", "neither", "other", "another", "such", "same", "different", "new", "old",
    "first", "last", "next", "previous", "following", "above", "below", "between", "among",
    "expert", "hours", "challenge", "statement", "detailed", "report", "proposed", "solution",
    "plan", "problem",
];

/// Suffixes that usually mark a verb or adjective rather than a concept.
pub const WEAK_CONCEPT_SUFFIXES: &[&str] = &["ing", "ed", "ly", "tion", "ment", "ness"];

/// Technical nouns kept even though they carry a weak suffix.
pub const TECHNICAL_CONCEPT_ALLOWLIST: &[&str] =
    &["indexing", "embedding", "processing", "generation", "retrieval"];

/// Words and phrases that signal transitions between ideas.
pub const TRANSITION_WORDS: &[&str] = &[
    "therefore",
    "however",
    "additionally",
    "moreover",
    "furthermore",
    "in conclusion",
    "as a result",
    "for example",
    "similarly",
    "in contrast",
    "meanwhile",
    "next",
    "finally",
];

/// Phrases that signal concrete examples.
pub const EXAMPLE_INDICATORS: &[&str] = &[
    "example",
    "for instance",
    "such as",
    "specifically",
    "in particular",
    "illustration",
    "case study",
];

/// Words that signal reasoning or evidence.
pub const REASONING_INDICATORS: &[&str] = &[
    "because",
    "reason",
    "evidence",
    "research",
    "study",
    "proven",
    "demonstrated",
    "support",
    "justify",
];
