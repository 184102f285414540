//! Tests for the polling controller lifecycle and publication semantics.
//!
//! Verifies:
//! - Idle -> Running -> Stopping -> Idle transitions, with idempotent
//!   start/stop
//! - One snapshot published per successful refresh; the last good
//!   snapshot survives failed iterations
//! - Failure messages surface as status lines and the loop keeps going
//! - A stop during the interval sleep takes effect without waiting the
//!   interval out; a stop during an in-flight query lets that iteration
//!   finish and publish before `"Stopped"`
//!
//! All tests run on a paused clock, so intervals are virtual and each
//! status transition is observed deterministically.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{watch, Notify};
use tokio::time::timeout;

use canopy_monitor::poller::{
    MonitorError, PollState, PollerConfig, PollingController, STATUS_GENERATED, STATUS_STARTING,
    STATUS_STOPPED,
};
use canopy_protocol::{ManagerDescription, NetworkAddress};
use canopy_topology::{StaticSource, TopologyError, TopologySource};

/// Bound on every awaited transition; on the paused clock this only
/// elapses if the controller genuinely stalls.
const STEP_TIMEOUT: Duration = Duration::from_secs(600);

/// Outcome of one scripted query.
#[derive(Clone)]
enum Outcome {
    Leader(&'static str),
    Unreachable,
}

/// Topology source whose answer depends on how many queries it has
/// served; the last scripted outcome repeats forever.
struct SequencedSource {
    script: Vec<Outcome>,
    queries: Arc<AtomicUsize>,
}

impl SequencedSource {
    fn new(script: Vec<Outcome>) -> Self {
        Self {
            script,
            queries: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn query_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.queries)
    }
}

#[async_trait]
impl TopologySource for SequencedSource {
    async fn query(
        &self,
        bootstrap: &[NetworkAddress],
    ) -> Result<ManagerDescription, TopologyError> {
        let n = self.queries.fetch_add(1, Ordering::SeqCst);
        let outcome = self.script.get(n).or_else(|| self.script.last()).cloned();
        match outcome {
            Some(Outcome::Leader(id)) => Ok(ManagerDescription::leader(id).with_members(vec![
                ManagerDescription::member(format!("{id}-m1")),
                ManagerDescription::member(format!("{id}-m2")),
            ])),
            _ => Err(TopologyError::Unreachable {
                attempted: bootstrap.len(),
            }),
        }
    }
}

/// Topology source whose query never completes.
struct HangingSource;

#[async_trait]
impl TopologySource for HangingSource {
    async fn query(
        &self,
        _bootstrap: &[NetworkAddress],
    ) -> Result<ManagerDescription, TopologyError> {
        std::future::pending().await
    }
}

/// Topology source that blocks inside `query` until released, reporting
/// when a query is underway.
struct GatedSource {
    entered_tx: watch::Sender<bool>,
    release: Arc<Notify>,
}

impl GatedSource {
    fn new() -> (Self, watch::Receiver<bool>, Arc<Notify>) {
        let (entered_tx, entered_rx) = watch::channel(false);
        let release = Arc::new(Notify::new());
        let source = Self {
            entered_tx,
            release: Arc::clone(&release),
        };
        (source, entered_rx, release)
    }
}

#[async_trait]
impl TopologySource for GatedSource {
    async fn query(
        &self,
        _bootstrap: &[NetworkAddress],
    ) -> Result<ManagerDescription, TopologyError> {
        self.entered_tx.send_replace(true);
        self.release.notified().await;
        Ok(ManagerDescription::leader("gl-0"))
    }
}

/// Await the scripted source reaching its query, failing the test if it
/// never does.
async fn await_query_entered(entered: &mut watch::Receiver<bool>) {
    timeout(STEP_TIMEOUT, entered.changed())
        .await
        .expect("no query observed")
        .expect("source dropped");
}

fn controller_with(source: impl TopologySource + 'static) -> PollingController {
    PollingController::new(Arc::new(source), PollerConfig::default())
}

/// Await the next status line, failing the test if none arrives.
async fn next_status(status: &mut watch::Receiver<String>) -> String {
    timeout(STEP_TIMEOUT, status.changed())
        .await
        .expect("no status transition observed")
        .expect("status channel closed");
    status.borrow().clone()
}

/// Await status lines until the expected one arrives.
async fn await_status(status: &mut watch::Receiver<String>, expected: &str) {
    loop {
        if next_status(status).await == expected {
            return;
        }
    }
}

// =====================================================================
// Lifecycle
// =====================================================================

#[tokio::test(start_paused = true)]
async fn start_transitions_idle_to_running() {
    let controller = controller_with(SequencedSource::new(vec![Outcome::Leader("gl-0")]));
    let mut status = controller.status();

    assert_eq!(controller.state(), PollState::Idle);
    controller.start(3).unwrap();
    assert_eq!(controller.state(), PollState::Running);

    assert_eq!(next_status(&mut status).await, STATUS_STARTING);
    // Nothing published until the first refresh completes.
    assert!(controller.latest().is_none());

    assert_eq!(next_status(&mut status).await, STATUS_GENERATED);
    assert_eq!(controller.latest().unwrap().tree.root().id, "gl-0");

    controller.stop();
    await_status(&mut status, STATUS_STOPPED).await;
    assert_eq!(controller.state(), PollState::Idle);
}

#[tokio::test(start_paused = true)]
async fn start_while_running_is_a_noop() {
    let source = SequencedSource::new(vec![Outcome::Leader("gl-0")]);
    let queries = source.query_counter();
    let controller = controller_with(source);
    let mut status = controller.status();

    controller.start(3).unwrap();
    assert_eq!(next_status(&mut status).await, STATUS_STARTING);
    assert_eq!(next_status(&mut status).await, STATUS_GENERATED);

    // A second start must not spawn a second loop or republish
    // "Starting...".
    controller.start(3).unwrap();
    assert_eq!(controller.state(), PollState::Running);
    assert_eq!(*status.borrow(), STATUS_GENERATED);

    assert_eq!(next_status(&mut status).await, STATUS_GENERATED);
    // Two observed ticks, two queries: a second loop would have added
    // its own.
    assert_eq!(queries.load(Ordering::SeqCst), 2);

    controller.stop();
    await_status(&mut status, STATUS_STOPPED).await;
}

#[tokio::test(start_paused = true)]
async fn zero_interval_is_rejected() {
    let controller = controller_with(SequencedSource::new(vec![Outcome::Leader("gl-0")]));
    let status = controller.status();

    assert!(matches!(
        controller.start(0),
        Err(MonitorError::InvalidInterval)
    ));
    assert_eq!(controller.state(), PollState::Idle);
    assert!(!status.has_changed().unwrap());
}

#[tokio::test(start_paused = true)]
async fn stop_while_idle_is_a_noop() {
    let controller = controller_with(SequencedSource::new(vec![Outcome::Leader("gl-0")]));
    let status = controller.status();

    controller.stop();
    assert_eq!(controller.state(), PollState::Idle);
    assert!(!status.has_changed().unwrap());
    assert_eq!(*status.borrow(), STATUS_STOPPED);
}

#[tokio::test(start_paused = true)]
async fn controller_can_restart_after_a_full_stop() {
    let controller = controller_with(SequencedSource::new(vec![Outcome::Leader("gl-0")]));
    let mut status = controller.status();

    controller.start(3).unwrap();
    await_status(&mut status, STATUS_GENERATED).await;
    controller.stop();
    await_status(&mut status, STATUS_STOPPED).await;
    assert_eq!(controller.state(), PollState::Idle);

    controller.start(3).unwrap();
    assert_eq!(next_status(&mut status).await, STATUS_STARTING);
    assert_eq!(next_status(&mut status).await, STATUS_GENERATED);
    controller.stop();
    await_status(&mut status, STATUS_STOPPED).await;
}

#[tokio::test(start_paused = true)]
async fn stop_mid_sleep_does_not_wait_out_the_interval() {
    let source = SequencedSource::new(vec![Outcome::Leader("gl-0")]);
    let queries = source.query_counter();
    let controller = controller_with(source);
    let mut status = controller.status();

    let started_at = tokio::time::Instant::now();
    controller.start(3600).unwrap();
    assert_eq!(next_status(&mut status).await, STATUS_STARTING);

    controller.stop();
    await_status(&mut status, STATUS_STOPPED).await;

    // The hour-long sleep was cancelled, not waited out, and no query
    // ever ran.
    assert!(started_at.elapsed() < Duration::from_secs(3600));
    assert_eq!(controller.state(), PollState::Idle);
    assert_eq!(queries.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn stop_mid_query_lets_the_iteration_finish() {
    let (source, mut entered, release) = GatedSource::new();
    let controller = controller_with(source);
    let mut status = controller.status();

    controller.start(1).unwrap();
    assert_eq!(next_status(&mut status).await, STATUS_STARTING);

    // Stop while the query is blocked mid-flight.
    await_query_entered(&mut entered).await;
    controller.stop();
    assert_eq!(controller.state(), PollState::Stopping);
    assert!(controller.latest().is_none());

    // The in-flight iteration runs to completion and its snapshot is
    // published before the loop winds down.
    release.notify_one();
    await_status(&mut status, STATUS_STOPPED).await;
    assert_eq!(controller.latest().unwrap().tree.root().id, "gl-0");
    assert_eq!(controller.state(), PollState::Idle);
}

#[tokio::test(start_paused = true)]
async fn restart_status_never_regresses_to_stopped() {
    let (source, mut entered, release) = GatedSource::new();
    let controller = controller_with(source);
    let mut status = controller.status();

    controller.start(1).unwrap();
    assert_eq!(next_status(&mut status).await, STATUS_STARTING);
    await_query_entered(&mut entered).await;
    controller.stop();

    // A start during Stopping changes neither the state nor the status.
    controller.start(1).unwrap();
    assert_eq!(controller.state(), PollState::Stopping);
    assert_eq!(*status.borrow(), STATUS_STARTING);

    release.notify_one();
    await_status(&mut status, STATUS_STOPPED).await;
    assert_eq!(controller.state(), PollState::Idle);

    // A restart is accepted only after the Idle re-entry, so its
    // "Starting..." strictly follows the old loop's "Stopped".
    controller.start(1).unwrap();
    assert_eq!(next_status(&mut status).await, STATUS_STARTING);
    assert_eq!(controller.state(), PollState::Running);

    controller.stop();
    await_status(&mut status, STATUS_STOPPED).await;
}

// =====================================================================
// Publication and failure semantics
// =====================================================================

#[tokio::test(start_paused = true)]
async fn failed_iteration_keeps_last_snapshot_and_recovers() {
    let source = SequencedSource::new(vec![
        Outcome::Leader("gl-0"),
        Outcome::Unreachable,
        Outcome::Leader("gl-1"),
    ]);
    let controller = controller_with(source);
    let snapshots = controller.snapshots();
    let mut status = controller.status();

    controller.start(3).unwrap();
    assert_eq!(next_status(&mut status).await, STATUS_STARTING);

    // Iteration 1 publishes a snapshot.
    assert_eq!(next_status(&mut status).await, STATUS_GENERATED);
    assert_eq!(snapshots.borrow().as_ref().unwrap().tree.root().id, "gl-0");

    // Iteration 2 fails: the error becomes the status line, the old
    // snapshot stays readable.
    let line = next_status(&mut status).await;
    assert!(
        line.contains("No bootstrap node reachable"),
        "unexpected status: {line}"
    );
    assert_eq!(snapshots.borrow().as_ref().unwrap().tree.root().id, "gl-0");

    // Iteration 3 recovers with a fresh snapshot.
    assert_eq!(next_status(&mut status).await, STATUS_GENERATED);
    assert_eq!(snapshots.borrow().as_ref().unwrap().tree.root().id, "gl-1");

    controller.stop();
    await_status(&mut status, STATUS_STOPPED).await;
}

#[tokio::test(start_paused = true)]
async fn malformed_hierarchy_surfaces_as_status() {
    let description = ManagerDescription::leader("gl-0").with_members(vec![
        ManagerDescription::member("gm-1")
            .with_members(vec![ManagerDescription::member("gm-dup")]),
        ManagerDescription::member("gm-dup"),
    ]);
    let controller = controller_with(StaticSource::new(description));
    let mut status = controller.status();

    controller.start(3).unwrap();
    assert_eq!(next_status(&mut status).await, STATUS_STARTING);

    let line = next_status(&mut status).await;
    assert!(
        line.contains("Malformed hierarchy"),
        "unexpected status: {line}"
    );
    assert!(controller.latest().is_none());

    // The loop survives the failure and reports it again next tick.
    let line = next_status(&mut status).await;
    assert!(line.contains("Malformed hierarchy"));

    controller.stop();
    await_status(&mut status, STATUS_STOPPED).await;
}

#[tokio::test(start_paused = true)]
async fn hanging_query_times_out_when_configured() {
    let controller = PollingController::new(
        Arc::new(HangingSource),
        PollerConfig {
            query_timeout: Some(Duration::from_secs(5)),
            ..Default::default()
        },
    );
    let mut status = controller.status();

    controller.start(1).unwrap();
    assert_eq!(next_status(&mut status).await, STATUS_STARTING);

    assert_eq!(
        next_status(&mut status).await,
        "Topology query timed out after 5s"
    );
    assert!(controller.latest().is_none());

    controller.stop();
    await_status(&mut status, STATUS_STOPPED).await;
}
