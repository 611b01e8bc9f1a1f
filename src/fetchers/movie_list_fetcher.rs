use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::{sync::watch, task::JoinHandle};
use tokio_retry::strategy::FixedInterval;

use crate::{
    clients::movie_client::MovieSource,
    error::MovieClientError,
    model::movie::{sort_by_episode, Movie},
};

pub const RETRYING_MESSAGE: &str = "Something went wrong ....Retrying";
pub const FAILED_MESSAGE: &str = "Something went wrong";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Loaded(Vec<Movie>),
    /// A retry is scheduled and may still be cancelled.
    RetryingError(String),
    /// No retry is scheduled; only a manual load leaves this state.
    TerminalError(String),
}

impl LoadState {
    pub fn movies(&self) -> Option<&[Movie]> {
        match self {
            LoadState::Loaded(movies) => Some(movies),
            _ => None,
        }
    }
}

struct PendingRetry {
    generation: u64,
    timer: JoinHandle<()>,
}

struct RetrySlot {
    pending: Option<PendingRetry>,
    generation: u64,
    /// Id of the newest load attempt. Older attempts finish silently.
    attempt: u64,
    schedule: FixedInterval,
    disposed: bool,
}

struct Inner<S> {
    source: Arc<S>,
    state: watch::Sender<LoadState>,
    retry: Mutex<RetrySlot>,
}

/// Loads the movie collection and keeps retrying after failures until it
/// succeeds, the retry is cancelled, or the fetcher is dropped.
///
/// Dropping the fetcher cancels a pending retry. A request that was already
/// sent is allowed to finish, but its failure no longer schedules anything.
pub struct MovieListFetcher<S: MovieSource> {
    inner: Arc<Inner<S>>,
}

impl<S: MovieSource> MovieListFetcher<S> {
    pub fn new(source: Arc<S>, retry_delay: Duration) -> Self {
        let (state, _) = watch::channel(LoadState::Loading);
        let retry = RetrySlot {
            pending: None,
            generation: 0,
            attempt: 0,
            schedule: FixedInterval::new(retry_delay),
            disposed: false,
        };

        MovieListFetcher {
            inner: Arc::new(Inner {
                source,
                state,
                retry: Mutex::new(retry),
            }),
        }
    }

    pub fn state(&self) -> LoadState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.inner.state.subscribe()
    }

    pub fn has_pending_retry(&self) -> bool {
        self.inner.retry_slot().pending.is_some()
    }

    /// Runs one load attempt to completion. Preempts any pending retry and
    /// supersedes an attempt still in flight, whose result is then dropped.
    pub async fn load(&self) {
        Arc::clone(&self.inner).load().await
    }

    /// Starts a load attempt in the background.
    pub fn reload(&self) -> JoinHandle<()> {
        tokio::spawn(Arc::clone(&self.inner).load())
    }

    /// Stops a scheduled retry. Leaves the fetcher in a terminal error when
    /// it was waiting to retry; other states are untouched.
    pub fn cancel_retry(&self) {
        if self.inner.cancel_pending_retry() {
            log::info!("Cancelled scheduled retry");
        }

        self.inner.state.send_if_modified(|state| match state {
            LoadState::RetryingError(_) => {
                *state = LoadState::TerminalError(FAILED_MESSAGE.to_string());
                true
            }
            _ => false,
        });
    }
}

impl<S: MovieSource> Drop for MovieListFetcher<S> {
    fn drop(&mut self) {
        let mut slot = self.inner.retry_slot();
        slot.disposed = true;
        if let Some(pending) = slot.pending.take() {
            log::debug!("Dropping scheduled retry {}", pending.generation);
            pending.timer.abort();
        }
    }
}

impl<S> Inner<S> {
    fn retry_slot(&self) -> MutexGuard<'_, RetrySlot> {
        self.retry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: MovieSource> Inner<S> {
    // Boxed so the retry timer can spawn a load from inside a load.
    fn load(self: Arc<Self>) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(async move {
            let attempt = self.begin_attempt();

            let guard = LoadingGuard {
                inner: self.as_ref(),
                attempt,
                armed: true,
            };
            let result = self.source.fetch_movies().await;
            guard.disarm();

            self.finish_attempt(attempt, result);
        })
    }

    fn begin_attempt(&self) -> u64 {
        let mut slot = self.retry_slot();
        if let Some(pending) = slot.pending.take() {
            pending.timer.abort();
        }
        slot.attempt += 1;
        self.state.send_replace(LoadState::Loading);
        slot.attempt
    }

    fn finish_attempt(
        self: &Arc<Self>,
        attempt: u64,
        result: Result<Vec<Movie>, MovieClientError>,
    ) {
        let mut slot = self.retry_slot();
        if slot.attempt != attempt {
            log::debug!("Load attempt {} was superseded, dropping its result", attempt);
            return;
        }

        match result {
            Ok(mut movies) => {
                sort_by_episode(&mut movies);
                log::info!("Loaded {} movies", movies.len());
                self.state.send_replace(LoadState::Loaded(movies));
            }
            Err(e) => {
                log::warn!("Failed to load movies: {}", e);
                self.state
                    .send_replace(LoadState::RetryingError(RETRYING_MESSAGE.to_string()));
                self.schedule_retry(&mut slot);
            }
        }
    }

    fn schedule_retry(self: &Arc<Self>, slot: &mut RetrySlot) {
        if slot.disposed {
            log::debug!("Fetcher dropped, not scheduling a retry");
            return;
        }

        let Some(delay) = slot.schedule.next() else {
            log::warn!("Retry schedule exhausted, giving up");
            return;
        };
        slot.generation += 1;
        let generation = slot.generation;

        let inner = Arc::clone(self);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if inner.take_fired_retry(generation) {
                inner.load().await;
            }
        });

        if let Some(previous) = slot.pending.replace(PendingRetry { generation, timer }) {
            previous.timer.abort();
        }
        log::info!("Retrying in {} seconds", delay.as_secs_f32());
    }

    /// Claims the pending retry for a timer that just fired. Returns false
    /// when the retry was cancelled or replaced in the meantime.
    fn take_fired_retry(&self, generation: u64) -> bool {
        let mut slot = self.retry_slot();
        let fired = slot
            .pending
            .as_ref()
            .is_some_and(|pending| pending.generation == generation);
        if fired {
            slot.pending = None;
        }
        fired
    }

    fn cancel_pending_retry(&self) -> bool {
        match self.retry_slot().pending.take() {
            Some(pending) => {
                pending.timer.abort();
                true
            }
            None => false,
        }
    }
}

/// Leaves `Loading` for a terminal error if the newest load is dropped
/// before it finishes, so the view never waits on an attempt that no longer
/// exists.
struct LoadingGuard<'a, S> {
    inner: &'a Inner<S>,
    attempt: u64,
    armed: bool,
}

impl<S> LoadingGuard<'_, S> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<S> Drop for LoadingGuard<'_, S> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let slot = self.inner.retry_slot();
        if slot.attempt != self.attempt {
            return;
        }
        self.inner.state.send_if_modified(|state| {
            if matches!(state, LoadState::Loading) {
                *state = LoadState::TerminalError(FAILED_MESSAGE.to_string());
                true
            } else {
                false
            }
        });
    }
}
