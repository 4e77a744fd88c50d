//! Counter feature
//!
//! A value that can be bumped by a typed amount, or by one after a piece of
//! asynchronous work completes. Async increments are never cancelled: every
//! `IncrementAsync` runs to completion and reports back on its own.

use crate::root::AppState;
use composable_pokedex_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Message carried by [`CounterAction::IncrementAsyncError`]
pub const INCREMENT_ASYNC_ERROR: &str = "error occurred";

/// Default duration of [`TimerWork`]
pub const DEFAULT_WORK_DELAY: Duration = Duration::from_secs(3);

/// Where the async increment currently is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CounterStatus {
    /// No increment in progress, or the last one succeeded
    #[default]
    Idle,
    /// An async increment was started
    Loading,
    /// The last async increment failed
    Failed,
}

/// Counter state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterState {
    /// Current value
    pub value: i64,
    /// Async increment status
    pub status: CounterStatus,
}

/// Counter actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterAction {
    /// Add an amount to the value
    IncrementByAmount(i64),
    /// Run the async work, then increment by one
    IncrementAsync,
    /// The async work finished
    IncrementAsyncSuccess,
    /// The async work failed
    IncrementAsyncError(String),
}

impl CounterAction {
    /// Stable action name, used in logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::IncrementByAmount(_) => "counter/incrementByAmount",
            Self::IncrementAsync => "counter/incrementAsync",
            Self::IncrementAsyncSuccess => "counter/incrementAsyncSuccess",
            Self::IncrementAsyncError(_) => "counter/incrementAsyncError",
        }
    }
}

/// Failure of the async work
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkError {
    /// The work did not complete
    #[error("Async work failed: {0}")]
    Failed(String),
}

/// The asynchronous work behind [`CounterAction::IncrementAsync`]
pub trait AsyncWork: Send + Sync + 'static {
    /// Perform the work
    ///
    /// # Errors
    ///
    /// Returns [`WorkError`] if the work fails.
    fn run(&self) -> impl Future<Output = Result<(), WorkError>> + Send;
}

/// Work that just waits
#[derive(Debug, Clone, Copy)]
pub struct TimerWork {
    delay: Duration,
}

impl TimerWork {
    /// Wait for `delay` before succeeding
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for TimerWork {
    fn default() -> Self {
        Self::new(DEFAULT_WORK_DELAY)
    }
}

impl AsyncWork for TimerWork {
    async fn run(&self) -> Result<(), WorkError> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

/// Counter environment
#[derive(Debug)]
pub struct CounterEnvironment<W> {
    /// Work run by `IncrementAsync`
    pub work: Arc<W>,
}

impl<W> CounterEnvironment<W> {
    /// Create an environment around `work`
    #[must_use]
    pub fn new(work: W) -> Self {
        Self { work: Arc::new(work) }
    }
}

impl<W> Clone for CounterEnvironment<W> {
    fn clone(&self) -> Self {
        Self {
            work: Arc::clone(&self.work),
        }
    }
}

/// Counter reducer
#[derive(Debug, Clone, Copy)]
pub struct CounterReducer<W> {
    _work: PhantomData<W>,
}

impl<W> CounterReducer<W> {
    /// Create a new counter reducer
    #[must_use]
    pub const fn new() -> Self {
        Self { _work: PhantomData }
    }
}

impl<W> Default for CounterReducer<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: AsyncWork> Reducer for CounterReducer<W> {
    type State = CounterState;
    type Action = CounterAction;
    type Environment = CounterEnvironment<W>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        tracing::debug!(action = action.name(), "Reducing counter action");

        match action {
            CounterAction::IncrementByAmount(amount) => {
                state.value = state.value.saturating_add(amount);
            },
            CounterAction::IncrementAsync => {
                state.status = CounterStatus::Loading;

                let work = Arc::clone(&env.work);
                return smallvec![Effect::future(async move {
                    match work.run().await {
                        Ok(()) => Some(CounterAction::IncrementAsyncSuccess),
                        Err(error) => {
                            tracing::warn!(%error, "Async increment failed");
                            Some(CounterAction::IncrementAsyncError(INCREMENT_ASYNC_ERROR.to_string()))
                        },
                    }
                })];
            },
            CounterAction::IncrementAsyncSuccess => {
                state.status = CounterStatus::Idle;
                state.value = state.value.saturating_add(1);
            },
            CounterAction::IncrementAsyncError(_) => {
                state.status = CounterStatus::Failed;
            },
        }

        SmallVec::new()
    }
}

/// Amount typed by the user; anything that is not an integer counts as 0
#[must_use]
pub fn parse_increment_amount(text: &str) -> i64 {
    text.trim().parse().unwrap_or(0)
}

/// Current counter value
#[must_use]
pub const fn select_count(state: &AppState) -> i64 {
    state.counter.value
}
