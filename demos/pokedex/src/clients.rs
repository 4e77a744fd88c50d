//! HTTP clients built from [`Config`]
//!
//! PokeAPI is public and only ever sees the plain client. Credentials go to
//! the authenticated backend (`API_URL`) alone, which also serves the
//! refresh endpoint.

use crate::config::Config;
use composable_pokedex_http::{AjaxClient, Navigator, SecuredClient, TokenStore};

/// Authenticated backend client
pub type BackendClient<T, N> = SecuredClient<AjaxClient, T, N>;

/// Unauthenticated client rooted at the Pokemon API
#[must_use]
pub fn pokeapi_client(config: &Config) -> AjaxClient {
    AjaxClient::new(config.pokeapi_url.clone()).with_timeout(config.request_timeout)
}

/// Bearer-authenticated client rooted at the backend
#[must_use]
pub fn backend_client<T, N>(config: &Config, tokens: T, navigator: N) -> BackendClient<T, N>
where
    T: TokenStore,
    N: Navigator,
{
    let inner = AjaxClient::new(config.api_url.clone()).with_timeout(config.request_timeout);
    SecuredClient::new(inner, tokens, navigator)
}
