#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Optional semantic oracle: relevance verdicts and prose elaboration.
//!
//! The oracle is advisory. Analyzers talk to it only through [`OracleGate`],
//! which bounds every call with a timeout, makes at most
//! [`ORACLE_MAX_ATTEMPTS`] attempts, and turns every failure into
//! [`Verdict::Uncertain`] or an empty elaboration. Nothing an oracle does can
//! fail an evaluation.

/// OpenAI-compatible chat completion oracle.
pub mod openai;

use std::{
    collections::HashMap,
    fmt::Debug,
    future::Future,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::Result;
use bon::Builder;
use futures::future::BoxFuture;
use tracing::{debug, warn};

pub use self::openai::OpenAiOracle;
use crate::{
    constants::{DEFAULT_ORACLE_TIMEOUT_SECS, ORACLE_MAX_ATTEMPTS},
    types::{SubmissionKind, Verdict},
};

/// Everything an oracle needs to explain a deterministic evaluation.
#[derive(Debug, Clone, Default, PartialEq, Builder)]
#[builder(on(String, into))]
pub struct ElaborationRequest {
    /// Whether the submission is code or written content.
    #[builder(default)]
    pub kind:              SubmissionKind,
    /// The assignment prompt.
    #[builder(default)]
    pub problem_statement: String,
    /// The student's submission.
    #[builder(default)]
    pub submission:        String,
    /// Human-readable summary of the rubric criteria in play.
    #[builder(default)]
    pub rubric_context:    String,
    /// Deterministic findings (strength, improvement and issue lines).
    #[builder(default)]
    pub findings:          Vec<String>,
    /// Concepts the submission did not mention.
    #[builder(default)]
    pub missing_concepts:  Vec<String>,
    /// Relevance verdict the analyzer scored under.
    #[builder(default)]
    pub relevance:         Verdict,
}

/// An external semantic service.
///
/// Implementations report failures as errors; [`OracleGate`] decides what a
/// failure means for grading.
pub trait SemanticOracle: Send + Sync {
    /// Judges whether `submission` genuinely attempts `problem_statement`.
    fn check_relevance<'a>(
        &'a self,
        problem_statement: &'a str,
        submission: &'a str,
        kind: SubmissionKind,
    ) -> BoxFuture<'a, Result<Verdict>>;

    /// Turns deterministic findings into explanatory prose, one line per item.
    fn elaborate<'a>(
        &'a self,
        request: &'a ElaborationRequest,
    ) -> BoxFuture<'a, Result<Vec<String>>>;
}

/// Cache key: problem statement, submission, findings.
type CacheKey = (String, String, Vec<String>);

/// In-memory cache of elaborations for repeated identical requests.
///
/// Only prose is cached. Scores are always recomputed.
#[derive(Debug, Clone, Default)]
pub struct ElaborationCache {
    /// Cached elaborations.
    entries: Arc<Mutex<HashMap<CacheKey, Vec<String>>>>,
}

impl ElaborationCache {
    /// Builds the cache key of a request.
    fn key(request: &ElaborationRequest) -> CacheKey {
        (
            request.problem_statement.clone(),
            request.submission.clone(),
            request.findings.clone(),
        )
    }

    /// Returns a cached elaboration, if any.
    pub fn get(&self, request: &ElaborationRequest) -> Option<Vec<String>> {
        let entries = self.entries.lock().ok()?;
        entries.get(&Self::key(request)).cloned()
    }

    /// Stores an elaboration. A poisoned lock skips the insert.
    pub fn insert(&self, request: &ElaborationRequest, lines: Vec<String>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(Self::key(request), lines);
        }
    }

    /// Number of cached elaborations.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bounded, failure-absorbing access to an optional [`SemanticOracle`].
///
/// Cloning is cheap; clones share the oracle and the cache.
#[derive(Clone, Builder)]
pub struct OracleGate {
    /// The oracle, or `None` when semantic checks are disabled.
    oracle:  Option<Arc<dyn SemanticOracle>>,
    /// Per-attempt timeout.
    #[builder(default = Duration::from_secs(DEFAULT_ORACLE_TIMEOUT_SECS))]
    timeout: Duration,
    /// Optional elaboration cache.
    cache:   Option<ElaborationCache>,
}

impl Default for OracleGate {
    fn default() -> Self {
        Self::disabled()
    }
}

impl Debug for OracleGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleGate")
            .field("enabled", &self.is_enabled())
            .field("timeout", &self.timeout)
            .field("cached", &self.cache.as_ref().map(ElaborationCache::len))
            .finish()
    }
}

impl OracleGate {
    /// A gate with no oracle: every verdict is `UNCERTAIN` and every
    /// elaboration is empty.
    pub fn disabled() -> Self {
        Self {
            oracle:  None,
            timeout: Duration::from_secs(DEFAULT_ORACLE_TIMEOUT_SECS),
            cache:   None,
        }
    }

    /// A gate around `oracle` with the default timeout and no cache.
    pub fn new(oracle: Arc<dyn SemanticOracle>) -> Self {
        Self {
            oracle: Some(oracle),
            ..Self::disabled()
        }
    }

    /// Returns true if an oracle is configured.
    pub fn is_enabled(&self) -> bool {
        self.oracle.is_some()
    }

    /// Returns the elaboration cache, if one is configured.
    pub fn cache(&self) -> Option<&ElaborationCache> {
        self.cache.as_ref()
    }

    /// Asks the oracle for a relevance verdict.
    ///
    /// Returns `UNCERTAIN` without calling anything when disabled, and after
    /// every attempt has failed or timed out.
    pub async fn check_relevance(
        &self,
        problem_statement: &str,
        submission: &str,
        kind: SubmissionKind,
    ) -> Verdict {
        let Some(oracle) = self.oracle.as_ref() else {
            return Verdict::Uncertain;
        };

        let verdict = self
            .attempt("relevance check", || {
                oracle.check_relevance(problem_statement, submission, kind)
            })
            .await
            .unwrap_or_default();
        debug!(%kind, %verdict, "Oracle relevance verdict");
        verdict
    }

    /// Asks the oracle to elaborate on deterministic findings.
    ///
    /// Returns an empty list when disabled or after every attempt has failed.
    /// Non-empty answers are cached when a cache is configured.
    pub async fn elaborate(&self, request: &ElaborationRequest) -> Vec<String> {
        let Some(oracle) = self.oracle.as_ref() else {
            return Vec::new();
        };

        if let Some(lines) = self.cache.as_ref().and_then(|cache| cache.get(request)) {
            debug!(kind = %request.kind, "Elaboration served from cache");
            return lines;
        }

        let lines = self
            .attempt("elaboration", || oracle.elaborate(request))
            .await
            .unwrap_or_default();

        if !lines.is_empty()
            && let Some(cache) = self.cache.as_ref()
        {
            cache.insert(request, lines.clone());
        }
        lines
    }

    /// Runs `call` up to [`ORACLE_MAX_ATTEMPTS`] times, each bounded by the
    /// gate's timeout. Returns `None` if no attempt succeeded.
    async fn attempt<T, F, Fut>(&self, what: &str, mut call: F) -> Option<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        for attempt in 1..=ORACLE_MAX_ATTEMPTS {
            match tokio::time::timeout(self.timeout, call()).await {
                Ok(Ok(value)) => return Some(value),
                Ok(Err(e)) => {
                    warn!(attempt, error = %e, "Oracle {what} failed");
                }
                Err(_) => {
                    warn!(attempt, timeout = ?self.timeout, "Oracle {what} timed out");
                }
            }
        }
        None
    }
}
