use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use dashmap::DashSet;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::config::PruneConfig;
use crate::error::Result;
use crate::index::StateIdIndex;

/// Background worker that drops every scratch entry of a runtime id once
/// that id has been resolved through the lazy path.
pub struct Pruner {
    tx: Option<Sender<u32>>,
    requested: DashSet<u32>,
    queued: Arc<AtomicUsize>,
    inflight: Arc<AtomicUsize>,
    /// Holds at most one wake-up, sent whenever a job finishes.
    idle_tx: Sender<()>,
    idle_rx: Receiver<()>,
    _pool: Option<ThreadPool>,
}

impl Pruner {
    pub fn spawn(config: &PruneConfig, index: StateIdIndex) -> Result<Self> {
        let (tx, rx) = unbounded::<u32>();
        let name = config.thread_name.clone();
        let pool = ThreadPoolBuilder::new()
            .num_threads(1)
            .thread_name(move |i| format!("{name}-{i}"))
            .build()?;
        let queued = Arc::new(AtomicUsize::new(0));
        let inflight = Arc::new(AtomicUsize::new(0));
        let (idle_tx, idle_rx) = bounded::<()>(1);
        {
            let queued = queued.clone();
            let inflight = inflight.clone();
            let idle_tx = idle_tx.clone();
            pool.spawn(move || {
                while let Ok(runtime_id) = rx.recv() {
                    inflight.fetch_add(1, Ordering::SeqCst);
                    queued.fetch_sub(1, Ordering::SeqCst);
                    let before = index.len();
                    index.retain(|_, r| r.runtime_id != runtime_id);
                    log::trace!(
                        target: "prune",
                        "runtime id {runtime_id}: dropped {} state id(s)",
                        before.saturating_sub(index.len())
                    );
                    inflight.fetch_sub(1, Ordering::SeqCst);
                    // full means a wake-up is already pending
                    let _ = idle_tx.try_send(());
                }
            });
        }
        Ok(Self {
            tx: Some(tx),
            requested: DashSet::new(),
            queued,
            inflight,
            idle_tx,
            idle_rx,
            _pool: Some(pool),
        })
    }

    /// A pruner that drops every request.
    pub fn disabled() -> Self {
        let (idle_tx, idle_rx) = bounded(1);
        Self {
            tx: None,
            requested: DashSet::new(),
            queued: Arc::new(AtomicUsize::new(0)),
            inflight: Arc::new(AtomicUsize::new(0)),
            idle_tx,
            idle_rx,
            _pool: None,
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Fire-and-forget. Each runtime id is queued at most once.
    pub fn request(&self, runtime_id: u32) {
        let Some(tx) = &self.tx else {
            return;
        };
        if !self.requested.insert(runtime_id) {
            return;
        }
        self.queued.fetch_add(1, Ordering::SeqCst);
        if tx.send(runtime_id).is_err() {
            self.queued.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// Jobs queued or running.
    pub fn pending(&self) -> usize {
        self.queued.load(Ordering::SeqCst) + self.inflight.load(Ordering::SeqCst)
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    /// Blocks on job completions until idle or `timeout` elapses; returns
    /// whether it went idle.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.is_idle() {
            if self.idle_rx.recv_deadline(deadline).is_err() {
                return self.is_idle();
            }
        }
        // hand the wake-up on to any other waiter
        let _ = self.idle_tx.try_send(());
        true
    }
}
