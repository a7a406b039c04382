use payrail::application::orchestrator::PayoutOrchestrator;
use payrail::domain::event::{EventStatus, Stage};
use payrail::domain::outcome::PayoutOutcome;
use payrail::domain::ports::EventSink;
use payrail::domain::request::{Amount, Chain, PayoutRequest, Urgency};
use payrail::infrastructure::simulated::SimulatedPaymentExecutor;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

mod common;

#[tokio::test]
async fn test_successful_payout_end_to_end() {
    let h = common::harness(&common::fast_config(5), Arc::new(SimulatedPaymentExecutor::new(0)));

    let outcome = h.orchestrator.process(common::request(&common::zero_wallet())).await;

    match &outcome {
        PayoutOutcome::Success {
            rail,
            converted_amount,
            rate,
            ..
        } => {
            assert_eq!(rail, "standard rail");
            assert_eq!(*converted_amount, dec!(14200.00));
            assert_eq!(*rate, dec!(142.00));
        }
        other => panic!("expected success, got {other:?}"),
    }
    assert_eq!(outcome.status_code(), 200);

    let trail: Vec<(Stage, EventStatus)> = h
        .events
        .events_for(outcome.transaction_id())
        .await
        .into_iter()
        .map(|e| (e.stage, e.status))
        .collect();
    assert_eq!(
        trail,
        vec![
            (Stage::Received, EventStatus::Start),
            (Stage::Fx, EventStatus::Success),
            (Stage::Routing, EventStatus::Selected),
            (Stage::Payout, EventStatus::Success),
        ]
    );
}

#[tokio::test]
async fn test_invalid_wallet_records_only_received_and_validation() {
    let h = common::harness(&common::fast_config(5), Arc::new(SimulatedPaymentExecutor::new(0)));

    let outcome = h.orchestrator.process(common::request("not-a-wallet")).await;

    assert!(matches!(outcome, PayoutOutcome::ValidationFailed { .. }));
    assert_eq!(outcome.status_code(), 400);

    let events = h.events.events_for(outcome.transaction_id()).await;
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].stage, Stage::Received);
    assert_eq!(events[0].detail["wallet_address"], "not-a-wallet");
    assert_eq!(events[1].stage, Stage::Validation);
    assert_eq!(events[1].status, EventStatus::Fail);
    assert_eq!(h.events.len().await, 2);
}

#[tokio::test]
async fn test_blocked_wallet_is_forbidden() {
    let mut config = common::fast_config(5);
    let blocked = format!("0x{}", "b".repeat(40));
    config.compliance.blocked_wallets.push(blocked.clone());
    let h = common::harness(&config, Arc::new(SimulatedPaymentExecutor::new(0)));

    let outcome = h.orchestrator.process(common::request(&blocked)).await;

    assert!(matches!(outcome, PayoutOutcome::ComplianceBlocked { .. }));
    assert_eq!(outcome.status_code(), 403);
    let last = &h.events.list_recent(1).await.unwrap()[0];
    assert_eq!(last.stage, Stage::Compliance);
    assert_eq!(last.status, EventStatus::Blocked);
    assert!(last.detail["rule"].as_str().unwrap().contains(&blocked));
}

#[tokio::test]
async fn test_tron_wallet_on_tron_chain() {
    let h = common::harness(&common::fast_config(5), Arc::new(SimulatedPaymentExecutor::new(0)));
    let request = PayoutRequest::new(
        "TLa2f6VPqDgRE67v1736s7bJ8Ray5wYjU7",
        Amount::new(dec!(2.5)).unwrap(),
        "USDC",
        "KE",
        Urgency::High,
    )
    .with_chain(Chain::Tron);

    let outcome = h.orchestrator.process(request).await;

    match outcome {
        PayoutOutcome::Success {
            rail,
            converted_amount,
            ..
        } => {
            assert_eq!(rail, "expedited rail");
            assert_eq!(converted_amount, dec!(355.00));
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn test_exhausted_retries_surface_execution_failed() {
    let h = common::harness(&common::fast_config(3), Arc::new(common::AlwaysFailingExecutor));

    let outcome = h.orchestrator.process(common::request(&common::zero_wallet())).await;

    match &outcome {
        PayoutOutcome::ExecutionFailed {
            attempts, reason, ..
        } => {
            assert_eq!(*attempts, 3);
            assert_eq!(reason, "rail timeout");
        }
        other => panic!("expected execution failure, got {other:?}"),
    }
    assert_eq!(outcome.status_code(), 502);

    let events = h.events.events_for(outcome.transaction_id()).await;
    let retries = events
        .iter()
        .filter(|e| e.status == EventStatus::Retry)
        .count();
    assert_eq!(retries, 2);
    let last = events.last().unwrap();
    assert_eq!(last.stage, Stage::Payout);
    assert_eq!(last.status, EventStatus::Fail);
    assert_eq!(last.detail["attempts"], 3);
}

#[tokio::test]
async fn test_broken_sink_does_not_abort_pipeline() {
    let config = common::fast_config(5);
    let sink = Arc::new(common::BrokenSink);
    let orchestrator = PayoutOrchestrator::from_config(
        &config,
        Arc::new(SimulatedPaymentExecutor::new(2)),
        sink.clone(),
        sink,
    );

    let outcome = orchestrator.process(common::request(&common::zero_wallet())).await;

    assert!(outcome.is_success());
}

#[tokio::test]
async fn test_overflowing_amount_fails_fx_without_panicking() {
    let executor = Arc::new(SimulatedPaymentExecutor::new(0));
    let h = common::harness(&common::fast_config(5), executor.clone());
    let request = PayoutRequest::new(
        common::zero_wallet(),
        Amount::new(Decimal::MAX).unwrap(),
        "USDC",
        "KE",
        Urgency::Normal,
    );

    let orchestrator = h.orchestrator.clone();
    let outcome = tokio::spawn(async move { orchestrator.process(request).await })
        .await
        .expect("payout task must not panic");

    match &outcome {
        PayoutOutcome::ConversionUnavailable { reason, .. } => {
            assert_eq!(reason, "Converted amount out of range")
        }
        other => panic!("expected conversion failure, got {other:?}"),
    }
    assert_eq!(outcome.status_code(), 400);

    let events = h.events.events_for(outcome.transaction_id()).await;
    let last = events.last().unwrap();
    assert_eq!((last.stage, last.status), (Stage::Fx, EventStatus::Fail));
    assert_eq!(executor.attempts(outcome.transaction_id()), 0);
}

#[tokio::test]
async fn test_amount_rounding_to_zero_is_not_paid() {
    let executor = Arc::new(SimulatedPaymentExecutor::new(0));
    let h = common::harness(&common::fast_config(5), executor.clone());
    let request = PayoutRequest::new(
        common::zero_wallet(),
        Amount::new(dec!(0.00001)).unwrap(),
        "USDC",
        "KE",
        Urgency::Normal,
    );

    let outcome = h.orchestrator.process(request).await;

    assert!(matches!(outcome, PayoutOutcome::ConversionUnavailable { .. }));
    let last = &h.events.list_recent(1).await.unwrap()[0];
    assert_eq!((last.stage, last.status), (Stage::Fx, EventStatus::Fail));
    assert_eq!(executor.attempts(outcome.transaction_id()), 0);
}
