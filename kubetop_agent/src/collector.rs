//! The polling loop: fetch pods, publish, fetch nodes, publish, sleep. Repeat until stopped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::bus::Publisher;
use crate::report::{log_rejected, parse_node_report_detailed, parse_pod_report_detailed};
use crate::source::{ReportKind, ReportSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorState {
    /// Doing the work of the current tick.
    Polling,
    /// Waiting for the next tick.
    Idle,
    Stopped,
}

/// What one tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub pods_published: usize,
    pub nodes_published: usize,
    pub rows_rejected: usize,
    pub pod_fetch_failed: bool,
    pub node_fetch_failed: bool,
}

pub struct Collector {
    source: Arc<dyn ReportSource>,
    interval: Duration,
    pods: Publisher,
    nodes: Publisher,
}

impl Collector {
    pub fn new(
        source: Arc<dyn ReportSource>,
        interval: Duration,
        pods: Publisher,
        nodes: Publisher,
    ) -> Self {
        Self {
            source,
            interval,
            pods,
            nodes,
        }
    }

    // The tool call blocks; run it on the blocking pool and wait for it in full.
    async fn fetch(&self, kind: ReportKind) -> Option<String> {
        let source = self.source.clone();
        match tokio::task::spawn_blocking(move || source.fetch(kind)).await {
            Ok(Ok(text)) => Some(text),
            Ok(Err(e)) => {
                error!("error getting {} metrics: {e}", kind.label());
                None
            }
            Err(e) => {
                error!("{} metrics fetch task failed: {e}", kind.label());
                None
            }
        }
    }

    /// Run a single tick. Fetch failures skip that report's publish step and nothing more.
    pub async fn tick(&self) -> TickSummary {
        let mut summary = TickSummary::default();

        match self.fetch(ReportKind::Pods).await {
            Some(text) => {
                let parsed = parse_pod_report_detailed(&text);
                log_rejected("pod", &parsed.rejected);
                summary.rows_rejected += parsed.rejected.len();
                for sample in parsed.samples {
                    let msg = sample.to_string();
                    info!("Pod Metric: {msg}");
                    self.pods.publish(msg);
                    summary.pods_published += 1;
                }
            }
            None => summary.pod_fetch_failed = true,
        }

        match self.fetch(ReportKind::Nodes).await {
            Some(text) => {
                let parsed = parse_node_report_detailed(&text);
                log_rejected("node", &parsed.rejected);
                summary.rows_rejected += parsed.rejected.len();
                for sample in parsed.samples {
                    let msg = sample.to_string();
                    info!("Node Metric: {msg}");
                    self.nodes.publish(msg);
                    summary.nodes_published += 1;
                }
            }
            None => summary.node_fetch_failed = true,
        }

        summary
    }

    /// Loop until `stop` flips to true (or its sender goes away).
    /// Stop requests are honoured between ticks; a tick in progress always completes.
    pub async fn run(self, mut stop: watch::Receiver<bool>, state: watch::Sender<CollectorState>) {
        info!(
            "collector started: interval={:?} pods={} nodes={}",
            self.interval,
            self.pods.name(),
            self.nodes.name()
        );
        loop {
            if *stop.borrow() {
                break;
            }
            state.send_replace(CollectorState::Polling);
            let summary = self.tick().await;
            debug!("tick done: {summary:?}");
            state.send_replace(CollectorState::Idle);

            // Fixed sleep after the work; drift is fine at this cadence.
            tokio::select! {
                _ = sleep(self.interval) => {}
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
            }
        }
        state.send_replace(CollectorState::Stopped);
        info!("collector stopped");
    }

    /// Spawn the loop on the runtime. The first tick starts immediately.
    pub fn start(self) -> CollectorHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(CollectorState::Polling);
        let join = tokio::spawn(self.run(stop_rx, state_tx));
        CollectorHandle {
            stop: stop_tx,
            state: state_rx,
            join,
        }
    }
}

/// Owner of a running collector. Dropping it also stops the loop at the next tick boundary.
pub struct CollectorHandle {
    stop: watch::Sender<bool>,
    state: watch::Receiver<CollectorState>,
    join: JoinHandle<()>,
}

impl CollectorHandle {
    /// A receiver that can be awaited for state transitions.
    pub fn watch_state(&self) -> watch::Receiver<CollectorState> {
        self.state.clone()
    }

    /// Request a stop and wait for the loop to finish its current tick.
    pub async fn stop(self) {
        self.stop.send_replace(true);
        if let Err(e) = self.join.await {
            error!("collector task ended abnormally: {e}");
        }
    }
}
