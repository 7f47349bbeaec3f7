//! Scheduling behavior of the probe engine over an in-memory transport

mod common;

use common::{Reply, StubTransport};
use sessionprobe::error::ProbeError;
use sessionprobe::probe::ProbeEngine;
use sessionprobe::report::text;
use std::sync::Arc;
use std::time::Duration;

fn urls(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("https://app.example.com/page/{i:02}"))
        .collect()
}

#[tokio::test]
async fn test_in_flight_never_exceeds_limit() {
    for limit in [1, 4] {
        let transport = Arc::new(StubTransport::new(Duration::from_millis(20)));
        let engine = ProbeEngine::new(transport.clone()).with_concurrency(limit);

        let report = engine
            .run(&common::targets(&urls(12)))
            .await
            .expect("Probe run failed");

        assert_eq!(report.total(), 12);
        assert_eq!(transport.calls().len(), 12);
        assert!(
            transport.peak() <= limit,
            "peak {} exceeded limit {limit}",
            transport.peak()
        );
        assert!(transport.peak() >= 1);
    }
}

#[tokio::test]
async fn test_limit_is_used_when_work_is_available() {
    let transport = Arc::new(StubTransport::new(Duration::from_millis(50)));
    let engine = ProbeEngine::new(transport.clone()).with_concurrency(4);

    engine
        .run(&common::targets(&urls(8)))
        .await
        .expect("Probe run failed");

    assert!(transport.peak() > 1, "probes should overlap");
}

#[tokio::test]
async fn test_report_independent_of_completion_order() {
    let targets = urls(6);

    let fast_first = StubTransport::new(Duration::from_millis(1))
        .reply(&targets[0], Reply::Respond(404, "nope"))
        .reply(&targets[3], Reply::Respond(500, "fail"))
        .delay(&targets[5], Duration::from_millis(40));

    let slow_first = StubTransport::new(Duration::from_millis(30))
        .reply(&targets[0], Reply::Respond(404, "nope"))
        .reply(&targets[3], Reply::Respond(500, "fail"))
        .delay(&targets[0], Duration::from_millis(1))
        .delay(&targets[1], Duration::from_millis(60));

    let first = ProbeEngine::new(Arc::new(fast_first))
        .with_concurrency(6)
        .run(&common::targets(&targets))
        .await
        .expect("Probe run failed");
    let second = ProbeEngine::new(Arc::new(slow_first))
        .with_concurrency(2)
        .run(&common::targets(&targets))
        .await
        .expect("Probe run failed");

    assert_eq!(text::render(&first), text::render(&second));
    assert_eq!(first.status_codes(), vec![200, 404, 500]);

    let ok: Vec<&str> = first
        .group(200)
        .expect("200 group")
        .iter()
        .map(|o| o.url.as_str())
        .collect();
    assert_eq!(ok, vec![&targets[1], &targets[2], &targets[4], &targets[5]]);
}

#[tokio::test]
async fn test_failed_probes_do_not_abort_run() {
    let targets = urls(4);
    let transport = StubTransport::new(Duration::from_millis(5))
        .reply(&targets[1], Reply::FailSend)
        .reply(&targets[2], Reply::FailBody(200));

    let report = ProbeEngine::new(Arc::new(transport))
        .with_concurrency(2)
        .run(&common::targets(&targets))
        .await
        .expect("Per-probe failures must not fail the run");

    let ok: Vec<&str> = report
        .group(200)
        .expect("200 group")
        .iter()
        .map(|o| o.url.as_str())
        .collect();
    assert_eq!(ok, vec![&targets[0], &targets[3]]);
}

#[tokio::test]
async fn test_every_method_target_pair_is_probed() {
    let transport = Arc::new(StubTransport::new(Duration::from_millis(1)));
    let engine = ProbeEngine::new(transport.clone())
        .with_methods(common::methods(&["GET", "POST", "OPTIONS"]))
        .with_concurrency(3);
    let targets = common::targets(&urls(5));

    assert_eq!(engine.total_tasks(&targets), 15);

    let report = engine.run(&targets).await.expect("Probe run failed");

    assert_eq!(report.total(), 15);
    assert!(report.show_method());

    let mut calls = transport.calls();
    calls.sort();
    calls.dedup();
    assert_eq!(calls.len(), 15, "each pair exactly once");
}

#[tokio::test]
async fn test_empty_target_set_yields_empty_report() {
    let transport = Arc::new(StubTransport::new(Duration::from_millis(1)));
    let report = ProbeEngine::new(transport.clone())
        .run(&common::targets::<&str>(&[]))
        .await
        .expect("Probe run failed");

    assert!(report.is_empty());
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_zero_concurrency_is_rejected() {
    let transport = Arc::new(StubTransport::new(Duration::from_millis(1)));
    let result = ProbeEngine::new(transport)
        .with_concurrency(0)
        .run(&common::targets(&urls(1)))
        .await;

    assert!(matches!(result, Err(ProbeError::ConfigError(_))));
}
