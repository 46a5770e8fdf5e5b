//! Tests for the oracle gate: retries, timeouts and the elaboration cache.

mod common;

use std::sync::Arc;

use common::{FailingOracle, ScriptedOracle, SlowOracle, cached_gate, gate};
use rubricate::{
    OracleGate, Verdict,
    oracle::{ElaborationCache, ElaborationRequest},
    types::SubmissionKind,
};

fn request(findings: &[&str]) -> ElaborationRequest {
    ElaborationRequest::builder()
        .kind(SubmissionKind::Code)
        .problem_statement("Reverse a linked list")
        .submission("def reverse(head): ...")
        .findings(findings.iter().map(|f| f.to_string()).collect())
        .build()
}

#[tokio::test]
async fn disabled_gate_never_answers() {
    let gate = OracleGate::disabled();
    assert!(!gate.is_enabled());
    assert_eq!(
        gate.check_relevance("problem", "answer", SubmissionKind::Content).await,
        Verdict::Uncertain
    );
    assert!(gate.elaborate(&request(&["✓ Works."])).await.is_empty());
}

#[tokio::test]
async fn verdicts_pass_through() {
    let oracle = ScriptedOracle::new(Verdict::Partial, &[]);
    let gate = gate(oracle.clone());
    assert_eq!(
        gate.check_relevance("problem", "answer", SubmissionKind::Code).await,
        Verdict::Partial
    );
    assert_eq!(oracle.relevance_calls(), 1);
}

#[tokio::test]
async fn failures_are_retried_once_then_absorbed() {
    let oracle = Arc::new(FailingOracle::default());
    let gate = gate(oracle.clone());

    let verdict = gate
        .check_relevance("problem", "answer", SubmissionKind::Code)
        .await;
    assert_eq!(verdict, Verdict::Uncertain);
    assert_eq!(oracle.calls(), 2);

    assert!(gate.elaborate(&request(&["→ Add tests."])).await.is_empty());
    assert_eq!(oracle.calls(), 4);
}

#[tokio::test]
async fn slow_answers_time_out() {
    let oracle = Arc::new(SlowOracle::default());
    let gate = gate(oracle);

    let verdict = gate
        .check_relevance("problem", "answer", SubmissionKind::Content)
        .await;
    assert_eq!(verdict, Verdict::Uncertain);
    assert!(gate.elaborate(&request(&["✓ Works."])).await.is_empty());
}

#[tokio::test]
async fn identical_requests_hit_the_cache() {
    let oracle = ScriptedOracle::new(Verdict::Relevant, &["Nicely done."]);
    let cache = ElaborationCache::default();
    let gate = cached_gate(oracle.clone(), cache.clone());

    let first = gate.elaborate(&request(&["✓ Works."])).await;
    let second = gate.elaborate(&request(&["✓ Works."])).await;
    assert_eq!(first, vec!["Nicely done."]);
    assert_eq!(second, first);
    assert_eq!(oracle.elaboration_calls(), 1);
    assert_eq!(cache.len(), 1);

    gate.elaborate(&request(&["→ Add tests."])).await;
    assert_eq!(oracle.elaboration_calls(), 2);
    assert_eq!(cache.len(), 2);
}

#[tokio::test]
async fn empty_elaborations_are_not_cached() {
    let oracle = ScriptedOracle::new(Verdict::Relevant, &[]);
    let cache = ElaborationCache::default();
    let gate = cached_gate(oracle.clone(), cache.clone());

    gate.elaborate(&request(&["✓ Works."])).await;
    gate.elaborate(&request(&["✓ Works."])).await;
    assert_eq!(oracle.elaboration_calls(), 2);
    assert!(cache.is_empty());
}
