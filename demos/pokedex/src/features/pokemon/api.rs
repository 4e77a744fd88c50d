//! Pokemon API access

use super::types::{FetchError, Filters, PokemonDetails, PokemonPage};
use composable_pokedex_http::{HttpError, RequestMethods, Transport};
use std::future::Future;

/// Source of Pokemon data
pub trait PokemonApi: Send + Sync + 'static {
    /// Fetch one page of the Pokemon list
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the request fails or the page cannot be decoded.
    fn fetch_pokemons(&self, filters: &Filters) -> impl Future<Output = Result<PokemonPage, FetchError>> + Send;

    /// Fetch a single Pokemon by name
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the request fails or the details cannot be decoded.
    fn fetch_pokemon(&self, name: &str) -> impl Future<Output = Result<PokemonDetails, FetchError>> + Send;
}

/// [`PokemonApi`] over any HTTP [`Transport`]
///
/// Works with the plain `AjaxClient` rooted at the PokeAPI base url, or with a
/// `SecuredClient` wrapping one.
#[derive(Debug, Clone)]
pub struct HttpPokemonApi<T> {
    transport: T,
}

impl<T: Transport + 'static> HttpPokemonApi<T> {
    /// Create an API client sending requests through `transport`
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Underlying transport
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport + 'static> PokemonApi for HttpPokemonApi<T> {
    async fn fetch_pokemons(&self, filters: &Filters) -> Result<PokemonPage, FetchError> {
        let url = format!("/pokemon?{}", filters.query());
        let page = self.transport.get(&url).await?.json()?;
        Ok(page)
    }

    async fn fetch_pokemon(&self, name: &str) -> Result<PokemonDetails, FetchError> {
        let url = format!("/pokemon/{}", urlencoding::encode(name));
        let details = self.transport.get(&url).await?.json()?;
        Ok(details)
    }
}

impl From<HttpError> for FetchError {
    fn from(error: HttpError) -> Self {
        Self {
            status: error.status(),
            message: error.to_string(),
        }
    }
}
