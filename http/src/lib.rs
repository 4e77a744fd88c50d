//! # Composable Pokedex HTTP
//!
//! HTTP plumbing for the Pokedex effects.
//!
//! - [`AjaxClient`]: plain transport resolving paths against a base url
//! - [`SecuredClient`]: bearer authentication with a single refresh-and-retry on 401
//! - [`TokenStore`]: where the access and refresh tokens live
//! - [`Navigator`]: the client location, used for the logout redirect
//!
//! ## Example
//!
//! ```no_run
//! use composable_pokedex_http::{
//!     AjaxClient, FileTokenStore, MemoryNavigator, RequestMethods, SecuredClient,
//! };
//!
//! # async fn run() -> Result<(), composable_pokedex_http::HttpError> {
//! let client = SecuredClient::new(
//!     AjaxClient::new("http://localhost:3000"),
//!     FileTokenStore::new("tokens.json"),
//!     MemoryNavigator::new("/pokemons"),
//! );
//!
//! let response = client.get("/cms/me").await?;
//! println!("{}", response.body);
//! # Ok(())
//! # }
//! ```

pub mod ajax;
pub mod error;
pub mod navigator;
pub mod request;
pub mod secured;
pub mod tokens;

pub use ajax::AjaxClient;
pub use error::{HttpError, TokenError};
pub use navigator::{logout_location, strip_query, MemoryNavigator, Navigator};
pub use request::{ApiRequest, ApiResponse, Method, RequestMethods, Transport};
pub use secured::{SecuredClient, DEFAULT_REFRESH_PATH};
pub use tokens::{is_token_expired, FileTokenStore, MemoryTokenStore, TokenStore, Tokens};
