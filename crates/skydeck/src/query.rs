//! Loading/error/data state for backend fetches.
//!
//! A [`Query<T>`] wraps one kind of fetch (say, "list cloud accounts") and
//! exposes its state to views. Failures are caught and stored as
//! [`QueryState::Error`]; they never propagate to the caller.
//!
//! A query tracks at most one outstanding fetch. Starting a new run
//! supersedes the previous one: if the older fetch finishes later, its
//! result is discarded.
//!
//! ```ignore
//! let accounts: Query<Vec<CloudAccount>> = Query::new("cloud_accounts");
//! accounts.state_changed().connect(|state| render(state));
//! accounts.run(api.list_cloud_accounts()).await;
//! ```

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use skydeck_core::Signal;
use skydeck_core::logging::targets;
use skydeck_net::NetworkError;

/// State of a [`Query`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum QueryState<T> {
    /// Never run, or reset.
    #[default]
    Idle,
    /// A fetch is outstanding.
    Loading,
    /// The last fetch succeeded.
    Success(T),
    /// The last fetch failed.
    Error(NetworkError),
}

impl<T> QueryState<T> {
    /// Whether a fetch is outstanding.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// The data of a successful fetch.
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    /// The error of a failed fetch.
    pub fn error(&self) -> Option<&NetworkError> {
        match self {
            Self::Error(err) => Some(err),
            _ => None,
        }
    }
}

struct QueryInner<T> {
    name: &'static str,
    state: Mutex<QueryState<T>>,
    generation: AtomicU64,
    state_changed: Signal<QueryState<T>>,
}

/// Observable state of one kind of backend fetch.
///
/// Cheap to clone; clones share state, so a spawned fetch can update the
/// same query a view is watching.
pub struct Query<T: Clone + Send + Sync + 'static> {
    inner: Arc<QueryInner<T>>,
}

impl<T: Clone + Send + Sync + 'static> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Query<T> {
    /// Create an idle query. `name` only appears in logs.
    pub fn new(name: &'static str) -> Self {
        Self {
            inner: Arc::new(QueryInner {
                name,
                state: Mutex::new(QueryState::Idle),
                generation: AtomicU64::new(0),
                state_changed: Signal::new(),
            }),
        }
    }

    /// Name used in logs.
    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// Emitted with the new state on every transition.
    pub fn state_changed(&self) -> &Signal<QueryState<T>> {
        &self.inner.state_changed
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> QueryState<T> {
        self.inner.state.lock().clone()
    }

    /// Data of the last successful fetch, if the query is in that state.
    pub fn data(&self) -> Option<T> {
        self.inner.state.lock().data().cloned()
    }

    /// Error of the last failed fetch, if the query is in that state.
    pub fn error(&self) -> Option<NetworkError> {
        self.inner.state.lock().error().cloned()
    }

    /// Whether a fetch is outstanding.
    pub fn is_loading(&self) -> bool {
        self.inner.state.lock().is_loading()
    }

    /// Await `fetch` and record its outcome.
    ///
    /// Returns the state after the fetch. If another run started while this
    /// one was in flight, the outcome is dropped and the newer state is
    /// returned unchanged.
    pub async fn run<F>(&self, fetch: F) -> QueryState<T>
    where
        F: Future<Output = skydeck_net::Result<T>>,
    {
        let generation = {
            let mut state = self.inner.state.lock();
            let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = QueryState::Loading;
            generation
        };
        tracing::debug!(target: targets::QUERY, query = self.inner.name, generation, "fetch started");
        self.inner.state_changed.emit(QueryState::Loading);

        let state = match fetch.await {
            Ok(data) => QueryState::Success(data),
            Err(err) => QueryState::Error(err),
        };

        // The generation check and the write happen under one lock, so a
        // newer run can never be overwritten by this one.
        {
            let mut current = self.inner.state.lock();
            if self.inner.generation.load(Ordering::SeqCst) != generation {
                tracing::debug!(target: targets::QUERY, query = self.inner.name, generation, "discarding stale result");
                return current.clone();
            }
            *current = state.clone();
        }

        if let QueryState::Error(err) = &state {
            tracing::warn!(target: targets::QUERY, query = self.inner.name, "fetch failed: {err}");
        }
        self.inner.state_changed.emit(state.clone());
        state
    }

    /// Run `fetch` on the tokio runtime without waiting for it.
    pub fn spawn<F>(&self, fetch: F) -> tokio::task::JoinHandle<()>
    where
        F: Future<Output = skydeck_net::Result<T>> + Send + 'static,
    {
        let query = self.clone();
        tokio::spawn(async move {
            query.run(fetch).await;
        })
    }

    /// Return to `Idle`, discarding any outstanding fetch.
    pub fn reset(&self) {
        {
            let mut state = self.inner.state.lock();
            self.inner.generation.fetch_add(1, Ordering::SeqCst);
            *state = QueryState::Idle;
        }
        self.inner.state_changed.emit(QueryState::Idle);
    }
}

impl<T: Clone + Send + Sync + std::fmt::Debug + 'static> std::fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("name", &self.inner.name)
            .field("state", &*self.inner.state.lock())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_success_and_error() {
        let query: Query<u32> = Query::new("numbers");
        assert_eq!(query.state(), QueryState::Idle);

        let state = query.run(async { Ok(7) }).await;
        assert_eq!(state, QueryState::Success(7));
        assert_eq!(query.data(), Some(7));

        let state = query
            .run(async { Err(NetworkError::Server { status: 500 }) })
            .await;
        assert!(state.error().is_some_and(NetworkError::is_server_error));
        assert_eq!(query.data(), None);
    }

    #[tokio::test]
    async fn test_transitions_emitted() {
        let query: Query<u32> = Query::new("numbers");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        query
            .state_changed()
            .connect(move |state| seen_clone.lock().push(state.clone()));

        query.run(async { Ok(1) }).await;
        query.reset();

        assert_eq!(
            *seen.lock(),
            vec![QueryState::Loading, QueryState::Success(1), QueryState::Idle]
        );
    }

    #[tokio::test]
    async fn test_stale_result_discarded() {
        let query: Query<&'static str> = Query::new("stale");
        let (slow_tx, slow_rx) = oneshot::channel::<()>();

        let slow = {
            let query = query.clone();
            tokio::spawn(async move {
                query
                    .run(async move {
                        let _ = slow_rx.await;
                        Ok("old")
                    })
                    .await
            })
        };

        // Let the slow run register before the fast one starts.
        while !query.is_loading() {
            tokio::task::yield_now().await;
        }

        let fast = query.run(async { Ok("new") }).await;
        assert_eq!(fast, QueryState::Success("new"));

        slow_tx.send(()).unwrap();
        let slow_state = slow.await.unwrap();
        assert_eq!(slow_state, QueryState::Success("new"));
        assert_eq!(query.data(), Some("new"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_latest_run_wins_when_results_race() {
        for _ in 0..50 {
            let query: Query<usize> = Query::new("racing");
            let started = Arc::new(std::sync::atomic::AtomicUsize::new(0));
            let started_clone = started.clone();
            query.state_changed().connect(move |state| {
                if state.is_loading() {
                    started_clone.fetch_add(1, Ordering::SeqCst);
                }
            });

            let (release_tx, release_rx) = tokio::sync::watch::channel(false);
            let mut handles = Vec::new();
            for i in 0..8 {
                let mut release = release_rx.clone();
                handles.push(query.spawn(async move {
                    let _ = release.wait_for(|go| *go).await;
                    Ok(i)
                }));
                // Start runs strictly in order so run 7 is the newest.
                while started.load(Ordering::SeqCst) < i + 1 {
                    tokio::task::yield_now().await;
                }
            }

            // Let every fetch finish at once, racing to record a result.
            release_tx.send(true).unwrap();
            for handle in handles {
                handle.await.unwrap();
            }
            assert_eq!(query.data(), Some(7));
        }
    }

    #[tokio::test]
    async fn test_spawn_updates_shared_state() {
        let query: Query<u32> = Query::new("spawned");
        query.spawn(async { Ok(42) }).await.unwrap();
        assert_eq!(query.data(), Some(42));
    }
}
