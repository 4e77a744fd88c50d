//! Reducer composition utilities
//!
//! - **`combine_reducers`**: Run multiple reducers on the same state/action
//! - **`scope_reducer`**: Run a feature reducer inside a larger application,
//!   translating state, actions and environment in both directions
//!
//! A typical application state is a struct with one field per feature, and
//! the application action is an enum with one variant per feature. Each
//! feature reducer is scoped into the application and the scoped reducers are
//! combined:
//!
//! ```
//! use composable_pokedex_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//! use composable_pokedex_core::composition::{combine_reducers, scope_reducer};
//!
//! #[derive(Clone, Debug, Default)]
//! struct CounterState { value: i64 }
//!
//! #[derive(Clone, Debug)]
//! enum CounterAction { Add(i64) }
//!
//! struct CounterReducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &mut CounterState, action: CounterAction, _env: &()) -> SmallVec<[Effect<CounterAction>; 4]> {
//!         let CounterAction::Add(n) = action;
//!         state.value += n;
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! #[derive(Clone, Debug, Default)]
//! struct AppState { counter: CounterState }
//!
//! #[derive(Clone, Debug)]
//! enum AppAction { Counter(CounterAction), Logout }
//!
//! let counter = scope_reducer(
//!     CounterReducer,
//!     |state: &mut AppState| &mut state.counter,
//!     |action: AppAction| match action {
//!         AppAction::Counter(action) => Some(action),
//!         AppAction::Logout => None,
//!     },
//!     AppAction::Counter,
//!     |env: &()| env,
//! );
//! let app = combine_reducers(vec![Box::new(counter)]);
//!
//! let mut state = AppState::default();
//! let _ = app.reduce(&mut state, AppAction::Counter(CounterAction::Add(2)), &());
//! let _ = app.reduce(&mut state, AppAction::Logout, &());
//! assert_eq!(state.counter.value, 2);
//! ```

use crate::effect::Effect;
use crate::reducer::Reducer;
use smallvec::SmallVec;

/// Boxed reducer that can be shared with the Store runtime
pub type BoxedReducer<S, A, E> = Box<dyn Reducer<State = S, Action = A, Environment = E> + Send + Sync>;

/// Combines multiple reducers that operate on the same state and action types.
///
/// Each reducer is run in order, and all effects are collected and
/// concatenated.
#[must_use]
pub fn combine_reducers<S, A, E>(reducers: Vec<BoxedReducer<S, A, E>>) -> CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    CombinedReducer { reducers }
}

/// A combined reducer that runs multiple reducers in sequence.
///
/// Created by [`combine_reducers`].
pub struct CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    reducers: Vec<BoxedReducer<S, A, E>>,
}

impl<S, A, E> CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    /// Number of reducers combined
    #[must_use]
    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    /// Whether no reducer was combined
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }
}

impl<S, A, E> Reducer for CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let mut all_effects = SmallVec::new();

        for reducer in &self.reducers {
            all_effects.extend(reducer.reduce(state, action.clone(), env));
        }

        all_effects
    }
}

/// Scopes a feature reducer into a parent state, action and environment.
///
/// # Arguments
///
/// - `reducer`: The feature reducer
/// - `state`: Focuses the parent state on the feature state
/// - `extract`: Returns the feature action carried by a parent action, if any
/// - `embed`: Wraps a feature action (produced by a feature effect) into a parent action
/// - `environment`: Focuses the parent environment on the feature environment
///
/// Parent actions for which `extract` returns `None` leave the state
/// untouched and produce no effects.
pub fn scope_reducer<S, A, E, R>(
    reducer: R,
    state: fn(&mut S) -> &mut R::State,
    extract: fn(A) -> Option<R::Action>,
    embed: fn(R::Action) -> A,
    environment: fn(&E) -> &R::Environment,
) -> ScopedReducer<S, A, E, R>
where
    R: Reducer,
{
    ScopedReducer {
        reducer,
        state,
        extract,
        embed,
        environment,
    }
}

/// A feature reducer running inside a parent.
///
/// Created by [`scope_reducer`].
pub struct ScopedReducer<S, A, E, R>
where
    R: Reducer,
{
    reducer: R,
    state: fn(&mut S) -> &mut R::State,
    extract: fn(A) -> Option<R::Action>,
    embed: fn(R::Action) -> A,
    environment: fn(&E) -> &R::Environment,
}

impl<S, A, E, R> Reducer for ScopedReducer<S, A, E, R>
where
    R: Reducer,
    R::Action: Send + 'static,
    A: Send + 'static,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let Some(action) = (self.extract)(action) else {
            return SmallVec::new();
        };

        let effects = self
            .reducer
            .reduce((self.state)(state), action, (self.environment)(env));

        effects
            .into_iter()
            .map(|effect| effect.map(self.embed))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{smallvec, SmallVec};
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct TestState {
        counter: i32,
        name: String,
    }

    #[derive(Clone)]
    enum TestAction {
        Increment,
        Decrement,
        SetName(String),
    }

    struct CounterReducer;

    impl Reducer for CounterReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TestAction::Increment => state.counter += 1,
                TestAction::Decrement => state.counter -= 1,
                TestAction::SetName(_) => {},
            }
            smallvec![Effect::None]
        }
    }

    struct NameReducer;

    impl Reducer for NameReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            if let TestAction::SetName(name) = action {
                state.name = name;
            }
            smallvec![Effect::None]
        }
    }

    #[test]
    fn combined_reducers_all_see_every_action() {
        let combined = combine_reducers(vec![Box::new(CounterReducer), Box::new(NameReducer)]);
        assert_eq!(combined.len(), 2);

        let mut state = TestState::default();

        let effects = combined.reduce(&mut state, TestAction::Increment, &());
        assert_eq!(state.counter, 1);
        assert_eq!(effects.len(), 2);

        let _ = combined.reduce(&mut state, TestAction::SetName("Ash".to_string()), &());
        let _ = combined.reduce(&mut state, TestAction::Decrement, &());
        assert_eq!(state.counter, 0);
        assert_eq!(state.name, "Ash");
    }

    #[derive(Clone, Debug, Default)]
    struct TimerState {
        ticks: u32,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum TimerAction {
        Start,
        Tick,
    }

    struct TimerEnv {
        interval: Duration,
    }

    struct TimerReducer;

    impl Reducer for TimerReducer {
        type State = TimerState;
        type Action = TimerAction;
        type Environment = TimerEnv;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TimerAction::Start => smallvec![Effect::Delay {
                    duration: env.interval,
                    action: Box::new(TimerAction::Tick),
                }],
                TimerAction::Tick => {
                    state.ticks += 1;
                    SmallVec::new()
                },
            }
        }
    }

    #[derive(Default)]
    struct ParentState {
        timer: TimerState,
        other: String,
    }

    #[derive(Debug, PartialEq)]
    enum ParentAction {
        Timer(TimerAction),
        Unrelated,
    }

    struct ParentEnv {
        timer: TimerEnv,
    }

    fn scoped_timer() -> ScopedReducer<ParentState, ParentAction, ParentEnv, TimerReducer> {
        scope_reducer(
            TimerReducer,
            |parent: &mut ParentState| &mut parent.timer,
            |action: ParentAction| match action {
                ParentAction::Timer(action) => Some(action),
                ParentAction::Unrelated => None,
            },
            ParentAction::Timer,
            |env: &ParentEnv| &env.timer,
        )
    }

    #[test]
    fn scoped_reducer_updates_only_its_slice() {
        let scoped = scoped_timer();
        let env = ParentEnv {
            timer: TimerEnv {
                interval: Duration::from_millis(10),
            },
        };
        let mut state = ParentState {
            timer: TimerState { ticks: 4 },
            other: "kept".to_string(),
        };

        let effects = scoped.reduce(&mut state, ParentAction::Timer(TimerAction::Tick), &env);

        assert_eq!(state.timer.ticks, 5);
        assert_eq!(state.other, "kept");
        assert!(effects.is_empty());
    }

    #[test]
    fn scoped_reducer_ignores_foreign_actions() {
        let scoped = scoped_timer();
        let env = ParentEnv {
            timer: TimerEnv {
                interval: Duration::ZERO,
            },
        };
        let mut state = ParentState::default();

        let effects = scoped.reduce(&mut state, ParentAction::Unrelated, &env);

        assert_eq!(state.timer.ticks, 0);
        assert!(effects.is_empty());
    }

    #[test]
    fn scoped_reducer_lifts_effect_actions_into_parent() {
        let scoped = scoped_timer();
        let env = ParentEnv {
            timer: TimerEnv {
                interval: Duration::from_millis(25),
            },
        };
        let mut state = ParentState::default();

        let mut effects = scoped.reduce(&mut state, ParentAction::Timer(TimerAction::Start), &env);

        assert_eq!(effects.len(), 1);
        match effects.remove(0) {
            Effect::Delay { duration, action } => {
                assert_eq!(duration, Duration::from_millis(25));
                assert_eq!(*action, ParentAction::Timer(TimerAction::Tick));
            },
            other => unreachable!("unexpected effect {other:?}"),
        }
    }
}
