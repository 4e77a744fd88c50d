//! # Pokedex
//!
//! A counter and a Pokemon browser on the Composable Pokedex store.
//!
//! - [`features::counter`]: synchronous and asynchronous increments
//! - [`features::pokemon`]: paged list and single Pokemon fetches against PokeAPI,
//!   latest request wins
//! - [`root`]: the combined state and reducer, and `Logout`
//! - [`routes`]: which action each screen dispatches when entered
//! - [`clients`]: the public PokeAPI client and the authenticated backend client
//!
//! ## Example
//!
//! ```no_run
//! use composable_pokedex_http::AjaxClient;
//! use pokedex::features::counter::TimerWork;
//! use pokedex::features::pokemon::{Filters, HttpPokemonApi, PokemonAction};
//! use pokedex::root::{app_store, AppAction, AppEnvironment};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = HttpPokemonApi::new(AjaxClient::new("https://pokeapi.co/api/v2"));
//! let store = app_store(AppEnvironment::new(TimerWork::default(), api));
//!
//! let done = store
//!     .send_and_wait_for(
//!         AppAction::Pokemon(PokemonAction::FetchPokemons(Filters::default())),
//!         |a| matches!(a, AppAction::Pokemon(PokemonAction::FetchPokemonsSuccess(_) | PokemonAction::FetchPokemonsError(_))),
//!         Duration::from_secs(10),
//!     )
//!     .await?;
//! println!("{done:?}");
//! # Ok(())
//! # }
//! ```

pub mod clients;
pub mod config;
pub mod features;
pub mod root;
pub mod routes;

pub use config::Config;
pub use root::{app_store, AppAction, AppEnvironment, AppReducer, AppState, AppStore};
pub use routes::Route;
