//! The single background-operation slot.
//!
//! Fetch and archive runs both mutate the store and the selection, so only
//! one may be active at a time. Every state change goes through
//! [`RunState::next`]:
//!
//! ```text
//! Idle ──Start──▶ Running ──Complete──▶ Completed ──Reset──▶ Idle
//!                    │ ├────Fail──────▶ Failed    ──Reset──▶ Idle
//!                    │ └────Cancel────▶ Cancelled ──Reset──▶ Idle
//! ```
//!
//! Cancellation aborts the tokio task; whatever the step in flight had
//! written stays on disk. A task caught mid-poll on another worker cannot be
//! stopped there, so every run carries a generation number and a cancelled
//! run can no longer settle the state, notify, or commit through its
//! [`RunTicket`].

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::error::{NewsError, Result};
use crate::events::Observer;
use crate::models::ArticleRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Fetch,
    Archive,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Fetch => f.write_str("fetch"),
            OperationKind::Archive => f.write_str("archive"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running(OperationKind),
    Completed(OperationKind),
    Cancelled(OperationKind),
    Failed(OperationKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Start(OperationKind),
    Complete,
    Fail,
    Cancel,
    Reset,
}

impl RunState {
    /// The transition table.
    pub fn next(self, transition: Transition) -> Result<RunState> {
        use RunState::*;
        match (self, transition) {
            (Idle, Transition::Start(kind)) => Ok(Running(kind)),
            (Running(kind), Transition::Start(_)) => Err(NewsError::Busy(kind)),
            (Running(kind), Transition::Complete) => Ok(Completed(kind)),
            (Running(kind), Transition::Fail) => Ok(Failed(kind)),
            (Running(kind), Transition::Cancel) => Ok(Cancelled(kind)),
            (Completed(_) | Failed(_) | Cancelled(_), Transition::Reset) => Ok(Idle),
            (from, transition) => Err(NewsError::InvalidTransition { from, transition }),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running(_))
    }
}

#[derive(Debug, Default)]
struct Slot {
    state: RunState,
    /// Bumped on every start and every cancel; a run only acts while its
    /// generation is still current.
    generation: u64,
}

impl Slot {
    fn apply(&mut self, transition: Transition) -> Result<RunState> {
        let next = self.state.next(transition)?;
        debug!(from = ?self.state, to = ?next, generation = self.generation, "Run state changed");
        self.state = next;
        Ok(next)
    }

    /// Move a finished run to its terminal state and straight back to idle.
    fn settle(&mut self, transition: Transition) -> Result<RunState> {
        let terminal = self.apply(transition)?;
        self.apply(Transition::Reset)?;
        Ok(terminal)
    }
}

#[derive(Debug, Clone, Default)]
struct SharedState(Arc<Mutex<Slot>>);

impl SharedState {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn get(&self) -> RunState {
        self.lock().state
    }

    fn start(&self, kind: OperationKind) -> Result<u64> {
        let mut slot = self.lock();
        slot.apply(Transition::Start(kind))?;
        slot.generation += 1;
        Ok(slot.generation)
    }

    /// Settle the run tagged `generation`; `None` if it was cancelled.
    fn finish(&self, generation: u64, transition: Transition) -> Option<RunState> {
        let mut slot = self.lock();
        if slot.generation != generation {
            return None;
        }
        slot.settle(transition).ok()
    }

    /// Invalidate whatever run is current and return to idle.
    fn cancel(&self) -> RunState {
        let mut slot = self.lock();
        slot.generation += 1;
        slot.settle(Transition::Cancel).unwrap_or(RunState::Idle)
    }
}

/// Handle a background operation holds on its own run.
///
/// Once the run is cancelled the ticket goes stale and everything gated on
/// it is skipped.
#[derive(Debug, Clone)]
pub struct RunTicket {
    state: SharedState,
    generation: u64,
}

impl RunTicket {
    pub fn is_current(&self) -> bool {
        self.state.lock().generation == self.generation
    }

    /// Run `f` only if this run has not been cancelled.
    ///
    /// The run slot stays locked while `f` runs, so a concurrent cancel
    /// either happens before (and `f` is skipped) or after it. `f` must not
    /// touch the [`Runner`].
    pub fn if_current<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        let slot = self.state.lock();
        if slot.generation != self.generation {
            return None;
        }
        let out = f();
        drop(slot);
        Some(out)
    }
}

/// Forwards to an inner observer for as long as its run is current.
pub struct RunObserver {
    ticket: RunTicket,
    inner: Arc<dyn Observer>,
}

impl RunObserver {
    pub fn new(ticket: RunTicket, inner: Arc<dyn Observer>) -> Self {
        Self { ticket, inner }
    }
}

impl Observer for RunObserver {
    fn on_progress(&self, percent: u8) {
        self.ticket.if_current(|| self.inner.on_progress(percent));
    }

    fn on_status(&self, message: &str) {
        self.ticket.if_current(|| self.inner.on_status(message));
    }

    fn on_articles_ready(&self, records: &[ArticleRecord]) {
        self.ticket.if_current(|| self.inner.on_articles_ready(records));
    }

    fn on_no_connection(&self) {
        self.ticket.if_current(|| self.inner.on_no_connection());
    }

    fn on_terminated(&self) {
        self.ticket.if_current(|| self.inner.on_terminated());
    }

    fn on_no_results(&self) {
        self.ticket.if_current(|| self.inner.on_no_results());
    }

    fn on_no_articles(&self) {
        self.ticket.if_current(|| self.inner.on_no_articles());
    }

    fn on_missing_api_key(&self) {
        self.ticket.if_current(|| self.inner.on_missing_api_key());
    }
}

struct ActiveRun {
    kind: OperationKind,
    generation: u64,
    handle: JoinHandle<RunState>,
}

pub struct Runner {
    state: SharedState,
    active: Option<ActiveRun>,
    observer: Arc<dyn Observer>,
}

impl fmt::Debug for Runner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field("state", &self.state.get())
            .field("active", &self.active.as_ref().map(|run| run.kind))
            .finish()
    }
}

impl Runner {
    pub fn new(observer: Arc<dyn Observer>) -> Self {
        Self {
            state: SharedState::default(),
            active: None,
            observer,
        }
    }

    pub fn state(&self) -> RunState {
        self.state.get()
    }

    pub fn is_busy(&self) -> bool {
        self.state().is_running()
    }

    /// Start the future built by `op` as the active background operation.
    ///
    /// `op` receives the run's [`RunTicket`] so it can gate side effects
    /// that must not outlive a cancel.
    ///
    /// # Errors
    ///
    /// [`NewsError::Busy`] if another operation is still running.
    pub fn spawn<F, Fut>(&mut self, kind: OperationKind, op: F) -> Result<()>
    where
        F: FnOnce(RunTicket) -> Fut,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let generation = self.state.start(kind)?;
        info!(%kind, generation, "Background operation started");

        let ticket = RunTicket {
            state: self.state.clone(),
            generation,
        };
        let fut = op(ticket.clone());
        let state = self.state.clone();
        let observer = Arc::clone(&self.observer);
        let handle = tokio::spawn(async move {
            let outcome = match fut.await {
                Ok(()) => Transition::Complete,
                Err(e) => {
                    error!(%kind, error = %e, "Background operation failed");
                    ticket.if_current(|| observer.on_status(&format!("Error: {e}")));
                    Transition::Fail
                }
            };
            match state.finish(generation, outcome) {
                Some(terminal) => {
                    info!(%kind, state = ?terminal, "Background operation finished");
                    observer.on_terminated();
                    terminal
                }
                None => {
                    debug!(%kind, generation, "Cancelled run finished; outcome dropped");
                    RunState::Cancelled(kind)
                }
            }
        });
        self.active = Some(ActiveRun {
            kind,
            generation,
            handle,
        });
        Ok(())
    }

    /// Stop whatever is running, zero progress, and return to idle.
    ///
    /// Returns the state the run ended in (`Idle` if nothing was running).
    /// A run that cannot be aborted mid-poll keeps executing, but its ticket
    /// is stale from here on.
    pub fn cancel(&mut self) -> RunState {
        if let Some(run) = self.active.take() {
            run.handle.abort();
        }
        let ended = self.state.cancel();
        info!(state = ?ended, "Background operation terminated");
        self.observer.on_progress(0);
        self.observer.on_status("");
        self.observer.on_terminated();
        ended
    }

    /// Wait for the active operation to end and return its terminal state.
    ///
    /// `None` when nothing was started since the last wait or cancel.
    pub async fn wait(&mut self) -> Option<RunState> {
        let run = self.active.as_mut()?;
        let (kind, generation) = (run.kind, run.generation);
        let joined = (&mut run.handle).await;
        self.active = None;
        match joined {
            Ok(terminal) => Some(terminal),
            Err(e) if e.is_cancelled() => Some(RunState::Cancelled(kind)),
            Err(e) => {
                error!(%kind, error = %e, "Background operation panicked");
                if self.state.finish(generation, Transition::Fail).is_some() {
                    self.observer.on_terminated();
                }
                Some(RunState::Failed(kind))
            }
        }
    }
}

impl Drop for Runner {
    fn drop(&mut self) {
        if let Some(run) = self.active.take() {
            run.handle.abort();
        }
    }
}
