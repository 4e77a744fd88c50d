//! # Composable Pokedex Runtime
//!
//! The Store runtime that coordinates reducer execution and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: Owns the state, runs the reducer and executes effects
//! - **Effect execution**: Spawns async effects and feeds produced actions back
//! - **Cancellation**: Keeps at most one effect per [`EffectId`] in flight
//!
//! ## Example
//!
//! ```ignore
//! use composable_pokedex_runtime::Store;
//!
//! let store = Store::new(AppState::default(), RootReducer::new(), environment);
//!
//! store.send(AppAction::Pokemon(PokemonAction::FetchPokemons(Filters::default()))).await?;
//! store.wait_idle(Duration::from_secs(5)).await?;
//!
//! let pokemons = store.state(|s| s.pokemon.data.clone()).await;
//! ```

use composable_pokedex_core::effect::{Effect, EffectId};
use composable_pokedex_core::reducer::Reducer;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for effects or for a terminal action
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Counts running effects and lets waiters observe when the count hits zero
#[derive(Clone)]
struct Tracker {
    pending: Arc<watch::Sender<usize>>,
}

impl Tracker {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            pending: Arc::new(tx),
        }
    }

    fn start(&self) -> TrackerGuard {
        self.pending.send_modify(|n| *n += 1);
        TrackerGuard(self.clone())
    }

    fn pending(&self) -> usize {
        *self.pending.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<usize> {
        self.pending.subscribe()
    }
}

/// Decrements the tracker when the effect finishes, panics or is aborted
struct TrackerGuard(Tracker);

impl Drop for TrackerGuard {
    fn drop(&mut self) {
        self.0.pending.send_modify(|n| *n = n.saturating_sub(1));
    }
}

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`]. Waiting on it waits for the effects the
/// reducer returned for that one action. Effects started by actions those
/// effects feed back are not included; use [`Store::wait_idle`] for that.
#[derive(Clone)]
pub struct EffectHandle {
    pending: watch::Receiver<usize>,
}

impl EffectHandle {
    fn new() -> (Self, Tracker) {
        let tracker = Tracker::new();
        (
            Self {
                pending: tracker.subscribe(),
            },
            tracker,
        )
    }

    /// Create a handle that's already complete
    #[must_use]
    pub fn completed() -> Self {
        let (_tx, rx) = watch::channel(0);
        Self { pending: rx }
    }

    /// Number of effects still running for this action
    #[must_use]
    pub fn pending(&self) -> usize {
        *self.pending.borrow()
    }

    /// Wait for all effects of this action to complete
    pub async fn wait(&mut self) {
        // An error means every tracker is gone, so nothing is running anymore.
        let _ = self.pending.wait_for(|n| *n == 0).await;
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires first.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.pending())
            .finish()
    }
}

/// Store module - The runtime for reducers
pub mod store {
    use super::{Arc, Duration, Effect, EffectHandle, EffectId, Reducer, StoreError, Tracker};
    use std::collections::HashMap;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::{Mutex, MutexGuard, PoisonError};
    use tokio::sync::{broadcast, RwLock};
    use tokio::task::{AbortHandle, JoinHandle};

    type Task = Pin<Box<dyn Future<Output = ()> + Send>>;

    /// Default capacity of the action broadcast channel
    pub const DEFAULT_BROADCAST_CAPACITY: usize = 16;

    /// A running cancellable effect
    struct Registration {
        token: u64,
        abort: AbortHandle,
    }

    struct Inner<S, E, R, A> {
        state: RwLock<S>,
        reducer: R,
        environment: E,
        shutdown: AtomicBool,
        in_flight: Tracker,
        action_broadcast: broadcast::Sender<A>,
        cancellations: Mutex<HashMap<EffectId, Registration>>,
        next_token: AtomicU64,
    }

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock` for concurrent access)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop and cancellation)
    ///
    /// Cloning a Store is cheap; all clones share the same state.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        inner: Arc<Inner<S, E, R, A>>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Clone + Send + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_broadcast_capacity(initial_state, reducer, environment, DEFAULT_BROADCAST_CAPACITY)
        }

        /// Create a store with a custom action broadcast capacity
        ///
        /// Use a larger capacity when subscribers may fall behind bursts of
        /// effect-produced actions.
        #[must_use]
        pub fn with_broadcast_capacity(
            initial_state: S,
            reducer: R,
            environment: E,
            capacity: usize,
        ) -> Self {
            let (action_broadcast, _) = broadcast::channel(capacity.max(1));

            Self {
                inner: Arc::new(Inner {
                    state: RwLock::new(initial_state),
                    reducer,
                    environment,
                    shutdown: AtomicBool::new(false),
                    in_flight: Tracker::new(),
                    action_broadcast,
                    cancellations: Mutex::new(HashMap::new()),
                    next_token: AtomicU64::new(0),
                }),
            }
        }

        /// The injected environment
        #[must_use]
        pub fn environment(&self) -> &E {
            &self.inner.environment
        }

        /// Send an action to the store
        ///
        /// Runs the reducer under the state write lock, then starts the
        /// returned effects. Returns once the effects are started, not
        /// finished.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
            if self.inner.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            metrics::counter!("store.commands.total").increment(1);

            let (handle, tracking) = EffectHandle::new();

            let effects = {
                let mut state = self.inner.state.write().await;

                let start = std::time::Instant::now();
                let effects = self
                    .inner
                    .reducer
                    .reduce(&mut *state, action, &self.inner.environment);
                metrics::histogram!("store.reducer.duration_seconds")
                    .record(start.elapsed().as_secs_f64());

                effects
            };

            tracing::trace!("Reducer returned {} effects", effects.len());
            for effect in effects {
                self.execute(effect, &tracking);
            }

            Ok(handle)
        }

        /// Send an action and wait for a matching result action
        ///
        /// Subscribes to the action broadcast before sending, so the
        /// terminal action cannot be missed. The matching action has already
        /// been reduced when it is returned.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Timeout`]: Timeout expired before a matching action arrived
        /// - [`StoreError::ChannelClosed`]: Action broadcast channel closed
        /// - [`StoreError::ShutdownInProgress`]: Store is shutting down
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> Result<A, StoreError>
        where
            F: Fn(&A) -> bool,
        {
            let mut rx = self.inner.action_broadcast.subscribe();

            self.send(action).await?;

            tokio::time::timeout(timeout, async {
                loop {
                    match rx.recv().await {
                        Ok(action) if predicate(&action) => return Ok(action),
                        Ok(_) => {},
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Action observer lagged");
                        },
                        Err(broadcast::error::RecvError::Closed) => {
                            return Err(StoreError::ChannelClosed);
                        },
                    }
                }
            })
            .await
            .map_err(|_| StoreError::Timeout)?
        }

        /// Subscribe to every action produced by effects
        ///
        /// Actions passed to [`Store::send`] directly are not broadcast.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.inner.action_broadcast.subscribe()
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let count = store.state(|s| s.counter.value).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.inner.state.read().await;
            f(&*state)
        }

        /// Number of effects currently running in this store
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.inner.in_flight.pending()
        }

        /// Wait until no effect is running anywhere in the store
        ///
        /// Effects started by fed-back actions are included.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::Timeout`] if effects are still running when
        /// the timeout elapses.
        pub async fn wait_idle(&self, timeout: Duration) -> Result<(), StoreError> {
            let mut pending = self.inner.in_flight.subscribe();
            tokio::time::timeout(timeout, async move {
                let _ = pending.wait_for(|n| *n == 0).await;
            })
            .await
            .map_err(|_| StoreError::Timeout)
        }

        /// Cancel the effect registered under `id`
        ///
        /// Returns whether an effect was running.
        pub fn cancel(&self, id: EffectId) -> bool {
            let Some(registration) = self.registry().remove(&id) else {
                return false;
            };

            registration.abort.abort();
            tracing::debug!(effect_id = %id, "Cancelled in-flight effect");
            metrics::counter!("store.effects.cancelled", "id" => id.as_str()).increment(1);
            true
        }

        /// Whether an effect is currently registered under `id`
        #[must_use]
        pub fn is_in_flight(&self, id: EffectId) -> bool {
            self.registry().contains_key(&id)
        }

        /// Initiate graceful shutdown
        ///
        /// New actions are rejected immediately; running effects get
        /// `timeout` to finish.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] with the number of effects
        /// still running when the timeout elapsed.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating store shutdown");
            self.inner.shutdown.store(true, Ordering::Release);

            match self.wait_idle(timeout).await {
                Ok(()) => {
                    tracing::info!("Store shutdown complete");
                    Ok(())
                },
                Err(_) => {
                    let remaining = self.pending_effects();
                    tracing::warn!(remaining, "Store shutdown timed out");
                    Err(StoreError::ShutdownTimeout(remaining))
                },
            }
        }

        fn registry(&self) -> MutexGuard<'_, HashMap<EffectId, Registration>> {
            // The map stays consistent even if a holder panicked.
            self.inner
                .cancellations
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
        }

        /// Start executing an effect
        ///
        /// `None`, `Parallel` and `Cancel` are handled synchronously; every
        /// other variant runs on its own task, counted by `tracking` and by
        /// the store-wide in-flight tracker.
        fn execute(&self, effect: Effect<A>, tracking: &Tracker) {
            match effect {
                Effect::None => {
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Parallel(effects) => {
                    metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);
                    for effect in effects {
                        self.execute(effect, tracking);
                    }
                },
                Effect::Cancel(id) => {
                    metrics::counter!("store.effects.executed", "type" => "cancel").increment(1);
                    self.cancel(id);
                },
                Effect::Cancellable { id, effect } => {
                    metrics::counter!("store.effects.executed", "type" => "cancellable").increment(1);
                    let _ = self.spawn_cancellable(id, *effect, tracking);
                },
                effect => {
                    let kind = match &effect {
                        Effect::Future(_) => "future",
                        Effect::Delay { .. } => "delay",
                        _ => "sequential",
                    };
                    metrics::counter!("store.effects.executed", "type" => kind).increment(1);
                    let task = self.run(effect, tracking.clone());
                    let _ = self.spawn(task, tracking);
                },
            }
        }

        fn spawn(&self, task: Task, tracking: &Tracker) -> JoinHandle<()> {
            let guards = (tracking.start(), self.inner.in_flight.start());
            tokio::spawn(async move {
                let _guards = guards;
                task.await;
            })
        }

        /// Spawn `effect` under `id`, aborting the effect it replaces
        fn spawn_cancellable(&self, id: EffectId, effect: Effect<A>, tracking: &Tracker) -> JoinHandle<()> {
            let token = self.inner.next_token.fetch_add(1, Ordering::Relaxed);
            let work = self.run(effect, tracking.clone());
            let store = self.clone();

            // Hold the registry across spawn + insert so the task cannot
            // unregister itself before it is registered.
            let mut registry = self.registry();
            if let Some(previous) = registry.remove(&id) {
                previous.abort.abort();
                tracing::debug!(effect_id = %id, "Superseded in-flight effect");
                metrics::counter!("store.effects.cancelled", "id" => id.as_str()).increment(1);
            }

            let handle = self.spawn(
                Box::pin(async move {
                    work.await;
                    store.unregister(id, token);
                }),
                tracking,
            );
            registry.insert(
                id,
                Registration {
                    token,
                    abort: handle.abort_handle(),
                },
            );

            handle
        }

        fn unregister(&self, id: EffectId, token: u64) {
            let mut registry = self.registry();
            if registry.get(&id).is_some_and(|r| r.token == token) {
                registry.remove(&id);
            }
        }

        /// Drive an effect to completion on the current task
        fn run(&self, effect: Effect<A>, tracking: Tracker) -> Task {
            let store = self.clone();

            Box::pin(async move {
                match effect {
                    Effect::None => {},
                    Effect::Future(future) => {
                        if let Some(action) = future.await {
                            store.feed_back(action).await;
                        } else {
                            tracing::trace!("Effect::Future completed with no action");
                        }
                    },
                    Effect::Delay { duration, action } => {
                        tokio::time::sleep(duration).await;
                        store.feed_back(*action).await;
                    },
                    Effect::Parallel(effects) => {
                        let tasks = effects
                            .into_iter()
                            .map(|effect| store.run(effect, tracking.clone()));
                        futures::future::join_all(tasks).await;
                    },
                    Effect::Sequential(effects) => {
                        let count = effects.len();
                        for (idx, effect) in effects.into_iter().enumerate() {
                            tracing::trace!("Executing sequential effect {} of {}", idx + 1, count);
                            store.run(effect, tracking.clone()).await;
                        }
                    },
                    Effect::Cancellable { id, effect } => {
                        // Cancelled tasks resolve with a JoinError, which is expected here.
                        let _ = store.spawn_cancellable(id, *effect, &tracking).await;
                    },
                    Effect::Cancel(id) => {
                        store.cancel(id);
                    },
                }
            })
        }

        /// Reduce an effect-produced action, then broadcast it
        async fn feed_back(&self, action: A) {
            let observed = action.clone();
            match self.send(action).await {
                Ok(_) => {
                    let _ = self.inner.action_broadcast.send(observed);
                },
                Err(error) => {
                    tracing::warn!(%error, "Dropped action produced by effect");
                },
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                inner: Arc::clone(&self.inner),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;
