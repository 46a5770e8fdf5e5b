//! Oracle doubles shared by the integration tests.

#![allow(dead_code)]

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use anyhow::{Result, anyhow};
use futures::{FutureExt, future::BoxFuture};
use rubricate::{
    OracleGate, SemanticOracle, Verdict,
    oracle::{ElaborationCache, ElaborationRequest},
    types::SubmissionKind,
};

/// Answers every call with fixed values and counts the calls.
#[derive(Debug)]
pub struct ScriptedOracle {
    pub verdict:           Verdict,
    pub elaboration:       Vec<String>,
    pub relevance_calls:   AtomicUsize,
    pub elaboration_calls: AtomicUsize,
}

impl ScriptedOracle {
    pub fn new(verdict: Verdict, elaboration: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            verdict,
            elaboration: elaboration.iter().map(|s| s.to_string()).collect(),
            relevance_calls: AtomicUsize::new(0),
            elaboration_calls: AtomicUsize::new(0),
        })
    }

    pub fn relevance_calls(&self) -> usize {
        self.relevance_calls.load(Ordering::SeqCst)
    }

    pub fn elaboration_calls(&self) -> usize {
        self.elaboration_calls.load(Ordering::SeqCst)
    }
}

impl SemanticOracle for ScriptedOracle {
    fn check_relevance<'a>(
        &'a self,
        _problem_statement: &'a str,
        _submission: &'a str,
        _kind: SubmissionKind,
    ) -> BoxFuture<'a, Result<Verdict>> {
        self.relevance_calls.fetch_add(1, Ordering::SeqCst);
        let verdict = self.verdict;
        async move { Ok::<_, anyhow::Error>(verdict) }.boxed()
    }

    fn elaborate<'a>(
        &'a self,
        _request: &'a ElaborationRequest,
    ) -> BoxFuture<'a, Result<Vec<String>>> {
        self.elaboration_calls.fetch_add(1, Ordering::SeqCst);
        let lines = self.elaboration.clone();
        async move { Ok::<_, anyhow::Error>(lines) }.boxed()
    }
}

/// Fails every call and counts the attempts.
#[derive(Debug, Default)]
pub struct FailingOracle {
    pub calls: AtomicUsize,
}

impl FailingOracle {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SemanticOracle for FailingOracle {
    fn check_relevance<'a>(
        &'a self,
        _problem_statement: &'a str,
        _submission: &'a str,
        _kind: SubmissionKind,
    ) -> BoxFuture<'a, Result<Verdict>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result: Result<Verdict> = Err(anyhow!("connection refused"));
        async move { result }.boxed()
    }

    fn elaborate<'a>(
        &'a self,
        _request: &'a ElaborationRequest,
    ) -> BoxFuture<'a, Result<Vec<String>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result: Result<Vec<String>> = Err(anyhow!("connection refused"));
        async move { result }.boxed()
    }
}

/// Never answers within any reasonable timeout.
#[derive(Debug, Default)]
pub struct SlowOracle {
    pub calls: AtomicUsize,
}

impl SemanticOracle for SlowOracle {
    fn check_relevance<'a>(
        &'a self,
        _problem_statement: &'a str,
        _submission: &'a str,
        _kind: SubmissionKind,
    ) -> BoxFuture<'a, Result<Verdict>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, anyhow::Error>(Verdict::Relevant)
        }
        .boxed()
    }

    fn elaborate<'a>(
        &'a self,
        _request: &'a ElaborationRequest,
    ) -> BoxFuture<'a, Result<Vec<String>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, anyhow::Error>(vec!["too late".to_string()])
        }
        .boxed()
    }
}

/// A gate around `oracle` with a short timeout.
pub fn gate(oracle: Arc<dyn SemanticOracle>) -> OracleGate {
    OracleGate::builder()
        .oracle(oracle)
        .timeout(Duration::from_millis(50))
        .build()
}

/// A gate around `oracle` with an elaboration cache.
pub fn cached_gate(oracle: Arc<dyn SemanticOracle>, cache: ElaborationCache) -> OracleGate {
    OracleGate::builder()
        .oracle(oracle)
        .timeout(Duration::from_millis(50))
        .cache(cache)
        .build()
}
