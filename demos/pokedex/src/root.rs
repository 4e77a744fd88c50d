//! Root state, actions and reducer
//!
//! Feature reducers are scoped into [`AppState`] and combined. `Logout` is
//! handled here: it restores the initial state and cancels the in-flight
//! Pokemon fetches so nothing from the old session lands afterwards.

use crate::features::counter::{
    AsyncWork, CounterAction, CounterEnvironment, CounterReducer, CounterState,
};
use crate::features::pokemon::{
    PokemonAction, PokemonApi, PokemonEnvironment, PokemonReducer, PokemonState, FETCH_POKEMONS,
    FETCH_SINGLE_POKEMON,
};
use composable_pokedex_core::composition::{
    combine_reducers, scope_reducer, BoxedReducer, CombinedReducer,
};
use composable_pokedex_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use composable_pokedex_runtime::Store;

/// Whole application state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    /// Counter slice
    pub counter: CounterState,
    /// Pokemon slice
    pub pokemon: PokemonState,
}

/// Every action the application handles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Counter feature action
    Counter(CounterAction),
    /// Pokemon feature action
    Pokemon(PokemonAction),
    /// End the session and return to the initial state
    Logout,
}

impl AppAction {
    /// Stable action name, used in logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Counter(action) => action.name(),
            Self::Pokemon(action) => action.name(),
            Self::Logout => "user/logout",
        }
    }
}

impl From<CounterAction> for AppAction {
    fn from(action: CounterAction) -> Self {
        Self::Counter(action)
    }
}

impl From<PokemonAction> for AppAction {
    fn from(action: PokemonAction) -> Self {
        Self::Pokemon(action)
    }
}

/// Dependencies of every feature
#[derive(Debug)]
pub struct AppEnvironment<W, P> {
    /// Counter dependencies
    pub counter: CounterEnvironment<W>,
    /// Pokemon dependencies
    pub pokemon: PokemonEnvironment<P>,
}

impl<W, P> AppEnvironment<W, P> {
    /// Create the environment from the async work and the Pokemon API
    #[must_use]
    pub fn new(work: W, api: P) -> Self {
        Self {
            counter: CounterEnvironment::new(work),
            pokemon: PokemonEnvironment::new(api),
        }
    }
}

impl<W, P> Clone for AppEnvironment<W, P> {
    fn clone(&self) -> Self {
        Self {
            counter: self.counter.clone(),
            pokemon: self.pokemon.clone(),
        }
    }
}

fn counter_state(state: &mut AppState) -> &mut CounterState {
    &mut state.counter
}

fn counter_action(action: AppAction) -> Option<CounterAction> {
    match action {
        AppAction::Counter(action) => Some(action),
        _ => None,
    }
}

fn counter_environment<W, P>(env: &AppEnvironment<W, P>) -> &CounterEnvironment<W> {
    &env.counter
}

fn pokemon_state(state: &mut AppState) -> &mut PokemonState {
    &mut state.pokemon
}

fn pokemon_action(action: AppAction) -> Option<PokemonAction> {
    match action {
        AppAction::Pokemon(action) => Some(action),
        _ => None,
    }
}

fn pokemon_environment<W, P>(env: &AppEnvironment<W, P>) -> &PokemonEnvironment<P> {
    &env.pokemon
}

/// Root reducer
pub struct AppReducer<W: 'static, P: 'static> {
    features: CombinedReducer<AppState, AppAction, AppEnvironment<W, P>>,
}

impl<W: AsyncWork, P: PokemonApi> AppReducer<W, P> {
    /// Create the root reducer with every feature scoped in
    #[must_use]
    pub fn new() -> Self {
        let counter: BoxedReducer<AppState, AppAction, AppEnvironment<W, P>> =
            Box::new(scope_reducer::<AppState, AppAction, AppEnvironment<W, P>, _>(
                CounterReducer::<W>::new(),
                counter_state,
                counter_action,
                AppAction::Counter,
                counter_environment::<W, P>,
            ));
        let pokemon: BoxedReducer<AppState, AppAction, AppEnvironment<W, P>> =
            Box::new(scope_reducer::<AppState, AppAction, AppEnvironment<W, P>, _>(
                PokemonReducer::<P>::new(),
                pokemon_state,
                pokemon_action,
                AppAction::Pokemon,
                pokemon_environment::<W, P>,
            ));

        Self {
            features: combine_reducers(vec![counter, pokemon]),
        }
    }
}

impl<W: AsyncWork, P: PokemonApi> Default for AppReducer<W, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: AsyncWork, P: PokemonApi> Reducer for AppReducer<W, P> {
    type State = AppState;
    type Action = AppAction;
    type Environment = AppEnvironment<W, P>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        if matches!(action, AppAction::Logout) {
            tracing::info!("Logging out, resetting application state");
            *state = AppState::default();
            return smallvec![Effect::merge(vec![
                Effect::Cancel(FETCH_POKEMONS),
                Effect::Cancel(FETCH_SINGLE_POKEMON),
            ])];
        }

        self.features.reduce(state, action, env)
    }
}

/// Store running the whole application
pub type AppStore<W, P> = Store<AppState, AppAction, AppEnvironment<W, P>, AppReducer<W, P>>;

/// Create a store in the initial state
#[must_use]
pub fn app_store<W: AsyncWork, P: PokemonApi>(env: AppEnvironment<W, P>) -> AppStore<W, P> {
    Store::new(AppState::default(), AppReducer::new(), env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::counter::{CounterStatus, TimerWork};
    use crate::features::pokemon::{FetchError, Filters, PokemonDetails, PokemonPage};
    use composable_pokedex_testing::{assertions, ReducerTest};
    use std::time::Duration;

    struct NoApi;

    impl PokemonApi for NoApi {
        async fn fetch_pokemons(&self, _filters: &Filters) -> Result<PokemonPage, FetchError> {
            Err(FetchError {
                status: 0,
                message: "offline".to_string(),
            })
        }

        async fn fetch_pokemon(&self, _name: &str) -> Result<PokemonDetails, FetchError> {
            Err(FetchError {
                status: 0,
                message: "offline".to_string(),
            })
        }
    }

    fn env() -> AppEnvironment<TimerWork, NoApi> {
        AppEnvironment::new(TimerWork::new(Duration::ZERO), NoApi)
    }

    fn reducer() -> AppReducer<TimerWork, NoApi> {
        AppReducer::new()
    }

    #[test]
    fn feature_actions_reach_their_slice() {
        ReducerTest::new(reducer())
            .with_env(env())
            .given_state(AppState::default())
            .when_action(AppAction::Counter(CounterAction::IncrementByAmount(3)))
            .when_action(AppAction::Pokemon(PokemonAction::FetchPokemons(Filters::default())))
            .then_state(|state| {
                assert_eq!(state.counter.value, 3);
                assert!(state.pokemon.is_fetching);
            })
            .then_effects(|effects| assertions::assert_has_cancellable_effect(effects, FETCH_POKEMONS))
            .run();
    }

    #[test]
    fn counter_effects_are_lifted_into_app_actions() {
        ReducerTest::new(reducer())
            .with_env(env())
            .given_state(AppState::default())
            .when_action(AppAction::Counter(CounterAction::IncrementAsync))
            .then_state(|state| assert_eq!(state.counter.status, CounterStatus::Loading))
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn logout_resets_state_and_cancels_fetches() {
        let mut dirty = AppState::default();
        dirty.counter.value = 42;
        dirty.pokemon.is_fetching = true;
        dirty.pokemon.filters.page = 9;

        ReducerTest::new(reducer())
            .with_env(env())
            .given_state(dirty)
            .when_action(AppAction::Logout)
            .then_state(|state| assert_eq!(*state, AppState::default()))
            .then_effects(|effects| {
                assertions::assert_cancels(effects, FETCH_POKEMONS);
                assertions::assert_cancels(effects, FETCH_SINGLE_POKEMON);
            })
            .run();
    }

    #[test]
    fn action_names_follow_slice_prefixes() {
        assert_eq!(AppAction::Logout.name(), "user/logout");
        assert_eq!(
            AppAction::from(CounterAction::IncrementByAmount(1)).name(),
            "counter/incrementByAmount"
        );
        assert_eq!(
            AppAction::from(PokemonAction::FetchSinglePokemon { name: None }).name(),
            "pokemon/fetchSinglePokemonStart"
        );
    }
}
