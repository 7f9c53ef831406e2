//! Query Dispatcher
//!
//! Runs query jobs on tokio's blocking thread pool, bounded by a semaphore, and hands
//! each outcome back exactly once: either as the output of [`QueryDispatcher::run`] or
//! through the callback given to [`QueryDispatcher::submit`].
//!
//! # Example
//!
//! ```ignore
//! let dispatcher = QueryDispatcher::new(4);
//! let rows = dispatcher.run(move || search_triples(&ctx, &pattern, page)).await?;
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use crate::error::{Error, Result};

/// Bounded pool of blocking query workers. Clones share the same permits.
#[derive(Clone)]
pub struct QueryDispatcher {
    permits: Arc<Semaphore>,
    max_concurrent: usize,
}

impl QueryDispatcher {
    /// Pool allowing `max_concurrent` jobs at once, at least one.
    pub fn new(max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self { permits: Arc::new(Semaphore::new(max_concurrent)), max_concurrent }
    }

    /// Size of the pool.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Queries currently holding a worker slot.
    pub fn in_flight(&self) -> usize {
        self.max_concurrent - self.permits.available_permits()
    }

    /// Runs `job` off the async executor and returns its outcome.
    ///
    /// A job that panics is reported as [`Error::Dispatch`].
    pub async fn run<T, F>(&self, job: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| Error::Dispatch("query worker pool is shut down".to_string()))?;

        let outcome = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        })
        .await;

        match outcome {
            Ok(result) => result,
            Err(e) => {
                error!("query worker failed: {}", e);
                Err(Error::Dispatch(format!("query worker failed: {}", e)))
            }
        }
    }

    /// Schedules `job` and calls `on_complete` exactly once with its outcome.
    ///
    /// Without a tokio runtime on the current thread nothing can be scheduled; the
    /// callback then receives [`Error::Dispatch`] immediately.
    pub fn submit<T, F, C>(&self, job: F, on_complete: C)
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
        C: FnOnce(Result<T>) + Send + 'static,
    {
        let completion = Completion::new(on_complete);
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!("cannot schedule query: {}", e);
                completion.complete(Err(Error::Dispatch(format!("cannot schedule query: {}", e))));
                return;
            }
        };

        let dispatcher = self.clone();
        runtime.spawn(async move {
            let outcome = dispatcher.run(job).await;
            debug!(ok = outcome.is_ok(), "query completed");
            completion.complete(outcome);
        });
    }

    /// Stops accepting work. Queued and future jobs fail with [`Error::Dispatch`];
    /// running jobs finish.
    pub fn shutdown(&self) {
        self.permits.close();
    }
}

/// Owns a completion callback until it has fired.
///
/// A task dropped by a shutting-down runtime never reaches `complete`; the callback is
/// then called from `Drop` with [`Error::Dispatch`].
struct Completion<T, C>
where
    C: FnOnce(Result<T>),
{
    callback: Option<C>,
    _outcome: PhantomData<fn(T)>,
}

impl<T, C> Completion<T, C>
where
    C: FnOnce(Result<T>),
{
    fn new(callback: C) -> Self {
        Completion { callback: Some(callback), _outcome: PhantomData }
    }

    fn complete(mut self, outcome: Result<T>) {
        if let Some(callback) = self.callback.take() {
            callback(outcome);
        }
    }
}

impl<T, C> Drop for Completion<T, C>
where
    C: FnOnce(Result<T>),
{
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            warn!("query dropped before completion");
            callback(Err(Error::Dispatch("runtime shut down before the query completed".to_string())));
        }
    }
}
