//! Background arrangement.
//!
//! An interface that must stay responsive hands passes to an [`ArrangeWorker`]. The
//! pass runs on its own thread and its outcome comes back over a channel. Only one
//! pass may be in flight at a time.

use crate::file_organizer::{ArrangeReport, ArrangeRequest, ArrangeResult, Arranger};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Returned by [`ArrangeWorker::submit`] while a pass is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerBusy;

impl std::fmt::Display for WorkerBusy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "An arrangement is already running")
    }
}

impl std::error::Error for WorkerBusy {}

/// Clears the busy flag when the pass ends, including by panic.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs arrangement passes off the calling thread, one at a time.
pub struct ArrangeWorker {
    arranger: Arc<Arranger>,
    busy: Arc<AtomicBool>,
    tx: Sender<ArrangeResult<ArrangeReport>>,
    rx: Receiver<ArrangeResult<ArrangeReport>>,
}

impl ArrangeWorker {
    /// Creates an idle worker.
    pub fn new(arranger: Arranger) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            arranger: Arc::new(arranger),
            busy: Arc::new(AtomicBool::new(false)),
            tx,
            rx,
        }
    }

    /// Starts a pass on a new thread.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerBusy`] if the previous pass has not finished.
    pub fn submit(&self, request: ArrangeRequest) -> Result<JoinHandle<()>, WorkerBusy> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(WorkerBusy);
        }

        let guard = BusyGuard(Arc::clone(&self.busy));
        let arranger = Arc::clone(&self.arranger);
        let tx = self.tx.clone();

        Ok(thread::spawn(move || {
            let outcome = arranger.arrange(&request);
            drop(guard);
            if tx.send(outcome).is_err() {
                tracing::warn!("Arrangement finished after its worker was dropped");
            }
        }))
    }

    /// True while a pass is running.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Blocks until the next pass finishes.
    ///
    /// Call only after a successful [`submit`](Self::submit): the worker holds a
    /// sender itself, so with nothing in flight this waits forever.
    pub fn recv(&self) -> Option<ArrangeResult<ArrangeReport>> {
        self.rx.recv().ok()
    }

    /// Returns a finished outcome if one is waiting.
    pub fn try_recv(&self) -> Option<ArrangeResult<ArrangeReport>> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Waits up to `timeout` for a finished outcome.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ArrangeResult<ArrangeReport>> {
        match self.rx.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}
