//! Fixed-interval snapshot polling

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::Result;

/// Something a [`Poller`] can fetch a fresh snapshot from.
#[async_trait]
pub trait SnapshotSource: Send + Sync + 'static {
    type Snapshot: Clone + Send + Sync + 'static;

    /// Label used in log lines.
    fn name(&self) -> String;

    async fn fetch(&self) -> Result<Self::Snapshot>;
}

/// Latest state of one poll loop. `data` always holds the last successful
/// fetch, even after later failures.
#[derive(Debug, Clone)]
pub struct PollState<T> {
    pub data: Option<T>,
    pub error: Option<String>,
    pub loading: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

impl<T> Default for PollState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            loading: false,
            last_updated: None,
        }
    }
}

pub struct Poller<S> {
    source: Arc<S>,
    period: Duration,
}

impl<S: SnapshotSource> Poller<S> {
    pub fn new(source: S, period: Duration) -> Self {
        Self {
            source: Arc::new(source),
            period,
        }
    }

    /// Start polling. The first fetch is issued immediately.
    pub fn spawn(self) -> PollerHandle<S::Snapshot> {
        let name = self.source.name();
        let (state_tx, state_rx) = watch::channel(PollState::default());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(run(self.source, self.period, state_tx, shutdown_rx));

        PollerHandle {
            name,
            state: state_rx,
            shutdown: shutdown_tx,
            task,
        }
    }
}

/// Owner of a running poll loop. Dropping the handle stops the loop as
/// well; [`PollerHandle::stop`] additionally waits for it to finish.
pub struct PollerHandle<T> {
    name: String,
    state: watch::Receiver<PollState<T>>,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl<T: Clone> PollerHandle<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subscribe(&self) -> watch::Receiver<PollState<T>> {
        self.state.clone()
    }

    pub fn state(&self) -> PollState<T> {
        self.state.borrow().clone()
    }

    pub async fn stop(self) {
        let PollerHandle {
            name,
            shutdown,
            task,
            ..
        } = self;

        let _ = shutdown.send(());
        if let Err(e) = task.await {
            warn!("{}: poll task ended abnormally: {}", name, e);
        }
    }
}

async fn run<S: SnapshotSource>(
    source: Arc<S>,
    period: Duration,
    state_tx: watch::Sender<PollState<S::Snapshot>>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let name = source.name();
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // At most one request in flight; a new tick drops (and so cancels) it.
    let mut in_flight: Option<BoxFuture<'_, Result<S::Snapshot>>> = None;

    info!("{}: polling every {:?}", name, period);

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                if in_flight.take().is_some() {
                    debug!("{}: cancelled in-flight request", name);
                }
                break;
            }
            result = next_result(&mut in_flight) => {
                in_flight = None;
                match result {
                    Ok(snapshot) => {
                        state_tx.send_modify(|state| {
                            state.data = Some(snapshot);
                            state.error = None;
                            state.loading = false;
                            state.last_updated = Some(Utc::now());
                        });
                    }
                    Err(e) => {
                        warn!("{}: fetch failed: {}", name, e);
                        state_tx.send_modify(|state| {
                            state.error = Some(e.to_string());
                            state.loading = false;
                        });
                    }
                }
            }
            _ = ticker.tick() => {
                if in_flight.is_some() {
                    debug!("{}: superseding in-flight request", name);
                }
                state_tx.send_modify(|state| state.loading = true);
                in_flight = Some(source.fetch());
            }
        }
    }

    info!("{}: polling stopped", name);
}

async fn next_result<T>(in_flight: &mut Option<BoxFuture<'_, Result<T>>>) -> Result<T> {
    match in_flight {
        Some(fut) => fut.await,
        None => std::future::pending().await,
    }
}
