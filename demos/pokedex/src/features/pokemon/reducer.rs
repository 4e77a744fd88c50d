//! Pokemon state machine
//!
//! Both fetches are cancellable effects: a new fetch replaces the one in
//! flight, so only the latest request can land in state.

use super::api::PokemonApi;
use super::types::{FetchError, FilterUpdate, Filters, Pokemon, PokemonDetails, PokemonPage};
use composable_pokedex_core::effect::{Effect, EffectId};
use composable_pokedex_core::{reducer::Reducer, smallvec, switch_effect, SmallVec};
use std::marker::PhantomData;
use std::sync::Arc;

/// Name fetched when `FetchSinglePokemon` carries none
pub const DEFAULT_POKEMON_NAME: &str = "ditto";

/// Effect id of the list fetch
pub const FETCH_POKEMONS: EffectId = EffectId::new("pokemon/fetchPokemons");

/// Effect id of the single Pokemon fetch
pub const FETCH_SINGLE_POKEMON: EffectId = EffectId::new("pokemon/fetchSinglePokemon");

/// Pokemon feature state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PokemonState {
    /// Entries of the last fetched page
    pub data: Option<Vec<Pokemon>>,
    /// A list fetch is in flight
    pub is_fetching: bool,
    /// Last fetch failure
    pub error: Option<FetchError>,
    /// Current list query
    pub filters: Filters,
    /// Last fetched single Pokemon
    pub single: Option<PokemonDetails>,
    /// A single Pokemon fetch is in flight
    pub is_fetching_single: bool,
}

/// Pokemon feature actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PokemonAction {
    /// Forget the fetched list
    ResetData,
    /// Fetch a list page
    FetchPokemons(Filters),
    /// The list page arrived
    FetchPokemonsSuccess(PokemonPage),
    /// The list fetch failed
    FetchPokemonsError(FetchError),
    /// Change some of the list filters
    UpdateFetchParams(FilterUpdate),
    /// Fetch one Pokemon, `ditto` when no name is given
    FetchSinglePokemon {
        /// Pokemon name
        name: Option<String>,
    },
    /// The Pokemon details arrived
    FetchSinglePokemonSuccess(PokemonDetails),
    /// The single fetch failed
    FetchSinglePokemonError(FetchError),
}

impl PokemonAction {
    /// Stable action name, used in logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ResetData => "pokemon/resetData",
            Self::FetchPokemons(_) => "pokemon/fetchPokemons",
            Self::FetchPokemonsSuccess(_) => "pokemon/fetchPokemonsSuccess",
            Self::FetchPokemonsError(_) => "pokemon/fetchPokemonsError",
            Self::UpdateFetchParams(_) => "pokemon/updateFetchParams",
            Self::FetchSinglePokemon { .. } => "pokemon/fetchSinglePokemonStart",
            Self::FetchSinglePokemonSuccess(_) => "pokemon/fetchSinglePokemonSuccess",
            Self::FetchSinglePokemonError(_) => "pokemon/fetchSinglePokemonError",
        }
    }
}

/// Pokemon feature environment
#[derive(Debug)]
pub struct PokemonEnvironment<P> {
    /// Where Pokemon come from
    pub api: Arc<P>,
}

impl<P> PokemonEnvironment<P> {
    /// Create an environment around `api`
    #[must_use]
    pub fn new(api: P) -> Self {
        Self { api: Arc::new(api) }
    }
}

impl<P> Clone for PokemonEnvironment<P> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
        }
    }
}

/// Pokemon reducer
#[derive(Debug, Clone, Copy)]
pub struct PokemonReducer<P> {
    _api: PhantomData<P>,
}

impl<P> PokemonReducer<P> {
    /// Create a new Pokemon reducer
    #[must_use]
    pub const fn new() -> Self {
        Self { _api: PhantomData }
    }
}

impl<P> Default for PokemonReducer<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PokemonApi> Reducer for PokemonReducer<P> {
    type State = PokemonState;
    type Action = PokemonAction;
    type Environment = PokemonEnvironment<P>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        tracing::debug!(action = action.name(), "Reducing pokemon action");

        match action {
            PokemonAction::ResetData => {
                state.data = None;
            },
            PokemonAction::FetchPokemons(filters) => {
                state.is_fetching = true;

                let api = Arc::clone(&env.api);
                return smallvec![switch_effect! {
                    id: FETCH_POKEMONS,
                    match api.fetch_pokemons(&filters).await {
                        Ok(page) => Some(PokemonAction::FetchPokemonsSuccess(page)),
                        Err(error) => {
                            tracing::warn!(status = error.status, message = %error.message, "Pokemon list fetch failed");
                            Some(PokemonAction::FetchPokemonsError(error))
                        },
                    }
                }];
            },
            PokemonAction::FetchPokemonsSuccess(page) => {
                state.data = Some(page.results);
                state.is_fetching = false;
            },
            PokemonAction::FetchPokemonsError(error) => {
                state.data = None;
                state.is_fetching = false;
                state.error = Some(error);
            },
            PokemonAction::UpdateFetchParams(update) => {
                update.apply(&mut state.filters);
            },
            PokemonAction::FetchSinglePokemon { name } => {
                state.is_fetching_single = true;

                let api = Arc::clone(&env.api);
                let name = name
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| DEFAULT_POKEMON_NAME.to_string());
                return smallvec![switch_effect! {
                    id: FETCH_SINGLE_POKEMON,
                    match api.fetch_pokemon(&name).await {
                        Ok(details) => Some(PokemonAction::FetchSinglePokemonSuccess(details)),
                        Err(error) => {
                            tracing::warn!(%name, status = error.status, "Pokemon fetch failed");
                            Some(PokemonAction::FetchSinglePokemonError(error))
                        },
                    }
                }];
            },
            PokemonAction::FetchSinglePokemonSuccess(details) => {
                state.single = Some(details);
                state.is_fetching_single = false;
            },
            PokemonAction::FetchSinglePokemonError(error) => {
                state.single = None;
                state.is_fetching_single = false;
                state.error = Some(error);
            },
        }

        SmallVec::new()
    }
}
