//! Pokemon browser feature
//!
//! Lists Pokemon page by page and shows the details of a single one. Data
//! comes from a [`PokemonApi`], normally [`HttpPokemonApi`] talking to PokeAPI.

pub mod api;
pub mod reducer;
pub mod types;

pub use api::{HttpPokemonApi, PokemonApi};
pub use reducer::{
    PokemonAction, PokemonEnvironment, PokemonReducer, PokemonState, DEFAULT_POKEMON_NAME,
    FETCH_POKEMONS, FETCH_SINGLE_POKEMON,
};
pub use types::{
    FetchError, FilterUpdate, Filters, NamedResource, Pokemon, PokemonDetails, PokemonPage,
    PokemonTypeSlot, SortDirection,
};

use crate::root::AppState;

/// Entries of the last fetched page
#[must_use]
pub fn select_data(state: &AppState) -> Option<&[Pokemon]> {
    state.pokemon.data.as_deref()
}

/// Whether a list fetch is in flight
#[must_use]
pub const fn select_is_fetching(state: &AppState) -> bool {
    state.pokemon.is_fetching
}

/// Last fetched single Pokemon
#[must_use]
pub const fn select_single_pokemon(state: &AppState) -> Option<&PokemonDetails> {
    state.pokemon.single.as_ref()
}

/// Whether a single Pokemon fetch is in flight
#[must_use]
pub const fn select_is_fetching_single(state: &AppState) -> bool {
    state.pokemon.is_fetching_single
}
