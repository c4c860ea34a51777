//! Readiness gate tests against a mock inference server.
#![cfg(unix)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use vllm_launcher::config::ReadinessMode;
use vllm_launcher::health::{ReadinessError, ReadinessGate, ReadinessOutcome};
use vllm_launcher::process::{inference_command, ManagedChild};
use vllm_launcher::Shutdown;

mod common;

fn poll_config(port: u16, delay_secs: u64) -> vllm_launcher::LauncherConfig {
    let mut config = common::scripted_config("sleep 30", "exit 0");
    config.inference.port = port;
    config.readiness.mode = ReadinessMode::Poll;
    config.readiness.startup_delay_secs = delay_secs;
    config.readiness.poll_interval_ms = 50;
    config.readiness.max_poll_interval_ms = 200;
    config.readiness.probe_timeout_ms = 500;
    config
}

#[tokio::test]
async fn ready_after_backend_recovers() {
    let port = common::free_port();
    let calls = Arc::new(AtomicU32::new(0));
    let c = calls.clone();
    common::start_programmable_backend(format!("127.0.0.1:{}", port).parse().unwrap(), move || {
        let c = c.clone();
        async move {
            if c.fetch_add(1, Ordering::SeqCst) < 2 {
                (503, "loading".to_string())
            } else {
                (200, "ok".to_string())
            }
        }
    })
    .await;

    let config = poll_config(port, 20);
    let gate = ReadinessGate::new(&config).unwrap();
    let mut inference = ManagedChild::spawn(&inference_command(&config)).unwrap();
    let shutdown = Shutdown::new();
    let mut listener = shutdown.subscribe();

    let outcome = gate.wait(&mut inference, &mut listener).await.unwrap();
    match outcome {
        ReadinessOutcome::Ready { probes, .. } => assert_eq!(probes, 3),
        other => panic!("expected ready, got {:?}", other),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn unbounded_delay_still_polls() {
    let port = common::free_port();
    common::start_programmable_backend(format!("127.0.0.1:{}", port).parse().unwrap(), || async {
        (200, "ok".to_string())
    })
    .await;

    let config = poll_config(port, u64::MAX);
    let gate = ReadinessGate::new(&config).unwrap();
    let mut inference = ManagedChild::spawn(&inference_command(&config)).unwrap();
    let shutdown = Shutdown::new();
    let mut listener = shutdown.subscribe();

    let outcome = gate.wait(&mut inference, &mut listener).await.unwrap();
    assert!(matches!(outcome, ReadinessOutcome::Ready { probes: 1, .. }));
}

#[tokio::test]
async fn times_out_when_nothing_listens() {
    let config = poll_config(common::free_port(), 1);
    let gate = ReadinessGate::new(&config).unwrap();
    let mut inference = ManagedChild::spawn(&inference_command(&config)).unwrap();
    let shutdown = Shutdown::new();
    let mut listener = shutdown.subscribe();

    let outcome = gate.wait(&mut inference, &mut listener).await.unwrap();
    match outcome {
        ReadinessOutcome::TimedOut { probes, elapsed } => {
            assert!(probes >= 2);
            assert!(elapsed >= Duration::from_secs(1));
            assert!(elapsed < Duration::from_secs(5));
        }
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn fixed_mode_waits_full_delay_without_probing() {
    let mut config = poll_config(common::free_port(), 1);
    config.readiness.mode = ReadinessMode::Fixed;
    let gate = ReadinessGate::new(&config).unwrap();
    let mut inference = ManagedChild::spawn(&inference_command(&config)).unwrap();
    let shutdown = Shutdown::new();
    let mut listener = shutdown.subscribe();

    let outcome = gate.wait(&mut inference, &mut listener).await.unwrap();
    assert_eq!(outcome, ReadinessOutcome::Waited(Duration::from_secs(1)));
}

#[tokio::test]
async fn shutdown_interrupts_polling() {
    let config = poll_config(common::free_port(), 60);
    let gate = ReadinessGate::new(&config).unwrap();
    let mut inference = ManagedChild::spawn(&inference_command(&config)).unwrap();
    let shutdown = Shutdown::new();
    let mut listener = shutdown.subscribe();

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.trigger(vllm_launcher::lifecycle::ShutdownReason::Terminate);
    });

    let err = gate.wait(&mut inference, &mut listener).await.unwrap_err();
    assert!(matches!(err, ReadinessError::Interrupted(_)));
}
