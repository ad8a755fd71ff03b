//! Contract Test: Source Failure Suppression
//!
//! Verifies that a run of consecutive status source failures is reported
//! exactly once, and that the run ends as soon as any cycle ends differently.
//!
//! If this test fails, the notification channel can be spammed with the
//! same outage every retry interval.

mod common;

use common::*;
use hwbot_core::error::SourceErrorReason;
use hwbot_core::{CycleOutcome, EngineEvent, ErrorKind, PollEngine};

const SOURCE_FAILED: CycleOutcome = CycleOutcome::Failed {
    kind: ErrorKind::Source,
};

#[tokio::test]
async fn consecutive_unauthorized_reported_once() {
    let source = ScriptedSource::new([unauthorized(), unauthorized(), unauthorized()]);
    let notifier = RecordingNotifier::new();

    let (engine, mut events) = PollEngine::new(
        Box::new(source.clone()),
        Box::new(notifier.clone()),
        minimal_config(),
    )
    .unwrap();
    let mut engine = engine.with_initial_cursor(1000);

    for _ in 0..3 {
        assert_eq!(engine.run_cycle().await, SOURCE_FAILED);
    }

    assert_eq!(source.fetch_count(), 3);
    assert_eq!(
        notifier.messages(),
        vec!["API is unreachable: authorization rejected: code=bad_token".to_string()]
    );
    assert_eq!(engine.cursor(), 1000);

    let mut suppressed = 0;
    while let Ok(event) = events.try_recv() {
        if event == (EngineEvent::ErrorSuppressed { kind: ErrorKind::Source }) {
            suppressed += 1;
        }
    }
    assert_eq!(suppressed, 2);
}

#[tokio::test]
async fn success_resets_the_run() {
    let source = ScriptedSource::new([
        unauthorized(),
        unauthorized(),
        no_changes(2000),
        Step::Fail(SourceErrorReason::Timeout, "30s"),
        Step::Fail(SourceErrorReason::Connectivity, "refused"),
    ]);
    let notifier = RecordingNotifier::new();

    let (engine, _events) = PollEngine::new(
        Box::new(source),
        Box::new(notifier.clone()),
        minimal_config(),
    )
    .unwrap();
    let mut engine = engine.with_initial_cursor(1000);

    for _ in 0..5 {
        engine.run_cycle().await;
    }

    assert_eq!(
        notifier.messages(),
        vec![
            "API is unreachable: authorization rejected: code=bad_token".to_string(),
            "API is unreachable: timeout: 30s".to_string(),
        ],
        "one report per failure run, regardless of reason"
    );
}

#[tokio::test]
async fn other_failure_kinds_end_the_run() {
    let source = ScriptedSource::new([
        unauthorized(),
        one_homework("X", "on_hold", 1000),
        unauthorized(),
    ]);
    let notifier = RecordingNotifier::new();

    let (engine, _events) = PollEngine::new(
        Box::new(source),
        Box::new(notifier.clone()),
        minimal_config(),
    )
    .unwrap();
    let mut engine = engine.with_initial_cursor(500);

    for _ in 0..3 {
        engine.run_cycle().await;
    }

    let messages = notifier.messages();
    assert_eq!(messages.len(), 3);
    assert!(messages[0].starts_with("API is unreachable"));
    assert!(messages[1].starts_with("Undocumented homework status"));
    assert!(messages[2].starts_with("API is unreachable"));
}

#[tokio::test]
async fn undelivered_report_is_retried() {
    let source = ScriptedSource::new([unauthorized(), unauthorized(), unauthorized()]);
    let notifier = RecordingNotifier::new();
    notifier.set_failing(true);

    let (engine, _events) = PollEngine::new(
        Box::new(source),
        Box::new(notifier.clone()),
        minimal_config(),
    )
    .unwrap();
    let mut engine = engine.with_initial_cursor(500);

    engine.run_cycle().await;
    assert_eq!(notifier.attempts(), 1);

    notifier.set_failing(false);
    engine.run_cycle().await;
    engine.run_cycle().await;

    assert_eq!(notifier.attempts(), 2);
    assert_eq!(notifier.messages().len(), 1);
}

#[tokio::test]
async fn unexpected_can_be_made_suppressible() {
    let source = ScriptedSource::new([Step::Unexpected("boom"), Step::Unexpected("boom")]);
    let notifier = RecordingNotifier::new();

    let mut config = minimal_config();
    config.engine.suppressible_kinds.insert(ErrorKind::Unexpected);

    let (engine, _events) =
        PollEngine::new(Box::new(source), Box::new(notifier.clone()), config).unwrap();
    let mut engine = engine.with_initial_cursor(500);

    engine.run_cycle().await;
    engine.run_cycle().await;

    assert_eq!(notifier.messages(), vec!["Program failure: boom".to_string()]);
}

#[tokio::test]
async fn repeated_undecodable_bodies_reported_once() {
    let maintenance_page = || {
        Step::Fail(
            SourceErrorReason::Transport,
            "undecodable body: expected value at line 1 column 1",
        )
    };
    let source = ScriptedSource::new([maintenance_page(), maintenance_page(), maintenance_page()]);
    let notifier = RecordingNotifier::new();

    let (engine, _events) = PollEngine::new(
        Box::new(source),
        Box::new(notifier.clone()),
        minimal_config(),
    )
    .unwrap();
    let mut engine = engine.with_initial_cursor(500);

    for _ in 0..3 {
        assert_eq!(engine.run_cycle().await, SOURCE_FAILED);
    }

    assert_eq!(
        notifier.messages(),
        vec![
            "API is unreachable: transport: undecodable body: expected value at line 1 column 1"
                .to_string()
        ]
    );
}
