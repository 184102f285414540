//! The polling controller: canopy's refresh state machine.
//!
//! One controller owns one repeating task. Each tick it sleeps for the
//! configured interval, queries the topology source, builds the tree,
//! computes the radial layout, and publishes a fresh `Snapshot`. Iteration
//! failures become status lines and the loop carries on; only `stop()`
//! ends it.
//!
//! Lifecycle: `Idle -> Running` on `start()`, `Running -> Stopping` on
//! `stop()`, back to `Idle` once the loop has wound down. `start()` while
//! Running or Stopping is a no-op, so a new loop can begin only after the
//! previous one has fully returned to Idle.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::time::sleep;

use canopy_hierarchy::HierarchyError;
use canopy_protocol::{NetworkAddress, DEFAULT_CANVAS_SIZE};
use canopy_topology::{TopologyError, TopologySource};

use crate::snapshot::Snapshot;

/// Status line published when the controller starts.
pub const STATUS_STARTING: &str = "Starting...";
/// Status line published after each successful refresh.
pub const STATUS_GENERATED: &str = "System graph generated!";
/// Status line published once the controller has fully stopped; also the
/// initial value before the first start.
pub const STATUS_STOPPED: &str = "Stopped";

/// Lifecycle state of the polling controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// No loop running.
    Idle,
    /// The repeating task is active.
    Running,
    /// A stop was requested; the loop is finishing its current iteration.
    Stopping,
}

/// Errors returned by controller operations.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Polling interval must be at least one second")]
    InvalidInterval,
}

/// Settings for one controller instance.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Bootstrap addresses handed to the topology source on every query.
    pub bootstrap: Vec<NetworkAddress>,
    /// Canvas size the radial layout scales to.
    pub canvas_size: f64,
    /// Optional bound on a single topology query. `None` leaves the query
    /// unbounded; a hanging query then stalls its iteration (but a stop
    /// request still cancels the sleep that follows).
    pub query_timeout: Option<Duration>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            bootstrap: Vec::new(),
            canvas_size: DEFAULT_CANVAS_SIZE,
            query_timeout: None,
        }
    }
}

/// A single refresh iteration failure. Folded into the status line by the
/// loop, which then continues to the next tick.
#[derive(Error, Debug)]
enum IterationError {
    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    #[error("Topology query timed out after {}s", .0.as_secs())]
    QueryTimeout(Duration),
}

/// State shared between the control surface and the running loop. The
/// only mutable state in the controller; everything published goes
/// through the watch channels.
struct Control {
    state: PollState,
    stop_tx: Option<watch::Sender<bool>>,
}

struct Inner {
    source: Arc<dyn TopologySource>,
    config: PollerConfig,
    control: Mutex<Control>,
    snapshot_tx: watch::Sender<Option<Arc<Snapshot>>>,
    status_tx: watch::Sender<String>,
}

/// Owns the refresh loop and publishes its results.
///
/// Cloning yields another handle to the same controller; `start()` and
/// `stop()` are safe to call from any task, concurrently with the loop.
#[derive(Clone)]
pub struct PollingController {
    inner: Arc<Inner>,
}

impl PollingController {
    pub fn new(source: Arc<dyn TopologySource>, config: PollerConfig) -> Self {
        let (snapshot_tx, _) = watch::channel(None);
        let (status_tx, _) = watch::channel(STATUS_STOPPED.to_string());
        Self {
            inner: Arc::new(Inner {
                source,
                config,
                control: Mutex::new(Control {
                    state: PollState::Idle,
                    stop_tx: None,
                }),
                snapshot_tx,
                status_tx,
            }),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PollState {
        self.inner.control.lock().expect("control lock poisoned").state
    }

    /// Subscribe to published snapshots. The slot holds `None` until the
    /// first successful poll, then always the latest snapshot; a slow
    /// reader never blocks the loop.
    pub fn snapshots(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.inner.snapshot_tx.subscribe()
    }

    /// Subscribe to status lines. Carries the latest of `"Starting..."`,
    /// `"System graph generated!"`, iteration failure messages, and
    /// `"Stopped"`; intermediate values may be skipped by a slow reader.
    pub fn status(&self) -> watch::Receiver<String> {
        self.inner.status_tx.subscribe()
    }

    /// The most recently published snapshot, if any poll has succeeded.
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.inner.snapshot_tx.borrow().clone()
    }

    /// Start the refresh loop with the given interval.
    ///
    /// Fails for a zero interval. A no-op when already Running or still
    /// Stopping: the existing loop and its interval are left untouched.
    pub fn start(&self, interval_secs: u64) -> Result<(), MonitorError> {
        if interval_secs == 0 {
            return Err(MonitorError::InvalidInterval);
        }

        let stop_rx = {
            let mut control = self.inner.control.lock().expect("control lock poisoned");
            if control.state != PollState::Idle {
                tracing::debug!(state = ?control.state, "Start ignored, controller not idle");
                return Ok(());
            }
            let (stop_tx, stop_rx) = watch::channel(false);
            control.state = PollState::Running;
            control.stop_tx = Some(stop_tx);
            stop_rx
        };

        self.inner
            .status_tx
            .send_replace(STATUS_STARTING.to_string());
        tracing::info!(interval_secs, "Polling started");

        let inner = Arc::clone(&self.inner);
        tokio::spawn(inner.run_loop(Duration::from_secs(interval_secs), stop_rx));
        Ok(())
    }

    /// Request the loop to stop. Returns immediately.
    ///
    /// An iteration already underway finishes and publishes its result;
    /// a loop mid-sleep wakes up at once. Either way the loop then
    /// publishes `"Stopped"` and the controller returns to Idle. A no-op
    /// unless the controller is Running.
    pub fn stop(&self) {
        let mut control = self.inner.control.lock().expect("control lock poisoned");
        if control.state != PollState::Running {
            return;
        }
        control.state = PollState::Stopping;
        if let Some(stop_tx) = &control.stop_tx {
            stop_tx.send_replace(true);
        }
        tracing::info!("Polling stop requested");
    }
}

impl Inner {
    async fn run_loop(self: Arc<Self>, interval: Duration, mut stop_rx: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                _ = sleep(interval) => {}
                _ = stop_rx.changed() => break,
            }
            // A stop that lands after the sleep but before the query
            // still prevents a new iteration from starting.
            if self.state() == PollState::Stopping {
                break;
            }

            match self.poll_once().await {
                Ok(snapshot) => {
                    let nodes = snapshot.tree.node_count();
                    self.snapshot_tx.send_replace(Some(Arc::new(snapshot)));
                    self.status_tx.send_replace(STATUS_GENERATED.to_string());
                    tracing::info!(nodes, "System graph generated");
                }
                Err(err) => {
                    self.status_tx.send_replace(err.to_string());
                    tracing::warn!(error = %err, "Refresh failed, keeping last snapshot");
                }
            }

            if self.state() == PollState::Stopping {
                break;
            }
        }

        {
            let mut control = self.control.lock().expect("control lock poisoned");
            control.state = PollState::Idle;
            control.stop_tx = None;
            // Published while Idle is still invisible to start(): a restart
            // wins the control lock only after this send, so its
            // "Starting..." always lands after the final "Stopped".
            self.status_tx.send_replace(STATUS_STOPPED.to_string());
        }
        tracing::info!("Polling stopped");
    }

    /// One refresh: query, build, lay out.
    async fn poll_once(&self) -> Result<Snapshot, IterationError> {
        let query = self.source.query(&self.config.bootstrap);
        let description = match self.config.query_timeout {
            Some(limit) => tokio::time::timeout(limit, query)
                .await
                .map_err(|_| IterationError::QueryTimeout(limit))??,
            None => query.await?,
        };

        let tree = canopy_hierarchy::build(&description)?;
        let points = canopy_hierarchy::layout(&tree, self.config.canvas_size);
        Ok(Snapshot::new(tree, points))
    }

    fn state(&self) -> PollState {
        self.control.lock().expect("control lock poisoned").state
    }
}
