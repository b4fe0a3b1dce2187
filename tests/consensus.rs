//! Consensus verification against fake endpoints.

use std::sync::Arc;
use std::time::Duration;
use tracing_test::traced_test;

use batch_sender::chain::Signature;
use batch_sender::config::ConsensusConfig;
use batch_sender::consensus::{ConsensusVerifier, VerificationStatus};
use batch_sender::lifecycle::StopSignal;
use batch_sender::sender::{InMemoryLedger, ProgressLedger, SendRequest};

mod common;
use common::{FakeChain, FakeStatusSource, Reply, MINT};

fn config(query_timeout_secs: u64, delay_ms: u64) -> ConsensusConfig {
    ConsensusConfig {
        query_timeout_secs,
        delay_ms,
    }
}

fn verifier(status: FakeStatusSource, endpoints: usize, threshold: usize) -> ConsensusVerifier {
    ConsensusVerifier::new(
        common::registry(endpoints, threshold),
        Arc::new(status),
        &config(10, 0),
    )
}

#[tokio::test]
async fn test_quorum_math() {
    let expected = [(0, false), (1, false), (2, true), (3, true), (5, true)];

    for (finalized, reached) in expected {
        let mut status = FakeStatusSource::new();
        for i in finalized..5 {
            status = status.reply(&format!("ep-{}", i), Reply::Tier("confirmed"));
        }
        let outcome = verifier(status, 5, 2)
            .verify(&Signature::from("sig-1"))
            .await;

        assert_eq!(outcome.confirmed_count, finalized);
        assert_eq!(outcome.consensus_reached, reached, "finalized={}", finalized);
        assert_eq!(outcome.total_count, 5);
    }
}

#[tokio::test(start_paused = true)]
async fn test_fan_out_survives_failing_endpoints() {
    let status = FakeStatusSource::new()
        .reply("ep-0", Reply::Hang)
        .reply("ep-1", Reply::NotFound)
        .reply("ep-2", Reply::Tier("finalized"));
    let verifier = ConsensusVerifier::new(common::registry(3, 2), Arc::new(status), &config(1, 0));

    let outcome = verifier.verify(&Signature::from("sig-1")).await;

    assert_eq!(outcome.results.len(), 3);
    assert_eq!(outcome.confirmed_count, 1);
    assert!(!outcome.consensus_reached);

    // Results keep registry order
    let labels: Vec<_> = outcome.results.iter().map(|r| r.endpoint_label.as_str()).collect();
    assert_eq!(labels, vec!["Endpoint 0", "Endpoint 1", "Endpoint 2"]);

    let timed_out = &outcome.results[0];
    assert_eq!(timed_out.status, VerificationStatus::Error);
    assert!(!timed_out.success);
    assert!(timed_out.error.as_deref().unwrap().contains("timeout"));
    assert_eq!(outcome.results[1].status, VerificationStatus::NotFound);
    assert_eq!(outcome.results[2].status, VerificationStatus::Finalized);
}

#[tokio::test]
async fn test_errors_become_results() {
    let status = FakeStatusSource::new()
        .reply("ep-0", Reply::Fail("connection refused".into()))
        .reply("ep-1", Reply::ExecutionError)
        .reply("ep-2", Reply::Tier("rooted"));

    let outcome = verifier(status, 3, 1).verify(&Signature::from("sig-1")).await;

    let statuses: Vec<_> = outcome.results.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            VerificationStatus::Error,
            VerificationStatus::Error,
            VerificationStatus::Unknown,
        ]
    );
    assert!(outcome.results[0].error.as_deref().unwrap().contains("connection refused"));
    assert!(outcome.results[1].error.as_deref().unwrap().contains("InvalidAccountData"));
    assert!(!outcome.consensus_reached);
}

#[tokio::test]
async fn test_no_endpoints_issues_no_queries() {
    let status = Arc::new(FakeStatusSource::new());
    let verifier = ConsensusVerifier::new(common::registry(0, 2), status.clone(), &config(10, 0));

    let outcome = verifier.verify(&Signature::from("sig-1")).await;

    assert!(!outcome.consensus_reached);
    assert_eq!(outcome.confirmed_count, 0);
    assert_eq!(outcome.total_count, 0);
    assert!(outcome.results.is_empty());
    assert_eq!(status.query_count(), 0);
}

#[tokio::test]
#[traced_test]
async fn test_threshold_above_endpoint_count() {
    let single = verifier(FakeStatusSource::new(), 1, 2);
    assert!(!single.quorum_reachable());

    let outcome = single.verify(&Signature::from("sig-1")).await;
    assert_eq!(outcome.confirmed_count, 1);
    assert!(!outcome.consensus_reached);

    // Warned on its own, ahead of the verdict
    logs_assert(|lines: &[&str]| {
        let warning = lines
            .iter()
            .position(|l| l.contains("WARN") && l.contains("Fewer enabled endpoints than the consensus threshold"))
            .ok_or("missing threshold warning")?;
        let verdict = lines
            .iter()
            .position(|l| l.contains("Consensus not reached"))
            .ok_or("missing verdict")?;
        if warning < verdict {
            Ok(())
        } else {
            Err("threshold warning logged after the verdict".to_string())
        }
    });

    assert!(verifier(FakeStatusSource::new(), 2, 2).quorum_reachable());
}

#[tokio::test(start_paused = true)]
async fn test_delay_before_queries() {
    let verifier = ConsensusVerifier::new(
        common::registry(2, 2),
        Arc::new(FakeStatusSource::new()),
        &config(10, 3_000),
    );

    let started = tokio::time::Instant::now();
    let outcome = verifier.verify(&Signature::from("sig-1")).await;

    assert!(started.elapsed() >= Duration::from_millis(3_000));
    assert!(outcome.consensus_reached);
}

#[tokio::test]
async fn test_verification_never_changes_ledger() {
    let chain = Arc::new(FakeChain::landing());
    let session = common::session(chain);
    let mut ledger = InMemoryLedger::new();
    let request = SendRequest {
        mint: Some(MINT.to_string()),
        recipients: common::recipients_text(3),
        batch_size: 3,
    };

    let outcome = session
        .send(&request, &mut ledger, &StopSignal::new())
        .await
        .unwrap();
    let signature = outcome.batches[0].landed[0].signature.clone();
    let before: Vec<_> = (1..=3).map(|line| ledger.state(line)).collect();

    let first = session.verifier().verify(&signature).await;
    let second = session.verifier().verify(&signature).await;

    assert_eq!(first, second);
    assert!(first.consensus_reached);
    let after: Vec<_> = (1..=3).map(|line| ledger.state(line)).collect();
    assert_eq!(before, after);
}
