//! Bearer-authenticated transport with one-shot token refresh.
//!
//! Every request carries the stored access token. When the server answers
//! 401, the client exchanges the refresh token for a new access token and
//! replays the request once. If the refresh is rejected the user is sent to
//! the logout route and the original 401 is returned. A failed replay also
//! logs out, returning the replay's error.
//!
//! ```text
//! request ──► inner ──► 2xx ─────────────────────────────► Ok
//!                  ├──► 4xx/5xx (not 401) ───────────────► Err (unchanged)
//!                  └──► 401 ──► POST refresh ──► ok ──► save ──► retry ──► Ok
//!                                         │                           └──► Err ──► redirect /logout ──► Err(retry)
//!                                         └──► fail ──► redirect /logout ──► Err(401)
//! ```

use crate::error::{HttpError, Result};
use crate::navigator::{logout_location, strip_query, Navigator};
use crate::request::{ApiRequest, ApiResponse, Method, Transport};
use crate::tokens::{TokenStore, Tokens};
use serde::{Deserialize, Serialize};

/// Default path of the token refresh endpoint
pub const DEFAULT_REFRESH_PATH: &str = "/cms/refresh-token";

const AUTHORIZATION: &str = "Authorization";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
}

/// Transport wrapper that authenticates requests and refreshes expired tokens
///
/// `inner` carries both the authenticated requests and the refresh call, so
/// relative urls resolve against the same API base.
#[derive(Clone, Debug)]
pub struct SecuredClient<I, T, N> {
    inner: I,
    tokens: T,
    navigator: N,
    refresh_path: String,
}

impl<I, T, N> SecuredClient<I, T, N>
where
    I: Transport,
    T: TokenStore,
    N: Navigator,
{
    /// Wrap `inner`, reading credentials from `tokens`
    #[must_use]
    pub fn new(inner: I, tokens: T, navigator: N) -> Self {
        Self {
            inner,
            tokens,
            navigator,
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
        }
    }

    /// Use a different refresh endpoint
    #[must_use]
    pub fn with_refresh_path(mut self, refresh_path: impl Into<String>) -> Self {
        self.refresh_path = refresh_path.into();
        self
    }

    /// Wrapped transport
    #[must_use]
    pub const fn inner(&self) -> &I {
        &self.inner
    }

    /// Token storage
    #[must_use]
    pub const fn tokens(&self) -> &T {
        &self.tokens
    }

    /// Navigator used for the logout redirect
    #[must_use]
    pub const fn navigator(&self) -> &N {
        &self.navigator
    }

    async fn refresh(&self, tokens: &Tokens) -> Result<Tokens> {
        let body = serde_json::to_value(RefreshRequest {
            refresh_token: &tokens.refresh_token,
        })
        .map_err(|e| HttpError::Decode(e.to_string()))?;

        let response = self
            .inner
            .execute(ApiRequest::new(Method::POST, self.refresh_path.as_str()).json(body))
            .await?;
        let refreshed: RefreshResponse = response.json()?;

        // The refresh endpoint may rotate the refresh token; the stored one is kept.
        let tokens = Tokens::new(refreshed.access_token, tokens.refresh_token.clone());
        self.tokens.save_tokens(tokens.clone()).await?;
        Ok(tokens)
    }

    fn redirect_to_logout(&self) {
        let location = self.navigator.current_location();
        let target = logout_location(strip_query(&location));
        self.navigator.redirect(&target);
    }
}

/// Copy `request` with the bearer header first and the caller's headers after it
fn authorize(request: &ApiRequest, tokens: Option<&Tokens>) -> ApiRequest {
    let mut authorized = ApiRequest {
        headers: Vec::with_capacity(request.headers.len() + 1),
        ..request.clone()
    };
    if let Some(tokens) = tokens {
        authorized = authorized.header(AUTHORIZATION, format!("Bearer {}", tokens.access_token));
    }
    authorized.headers(request.headers.iter().cloned())
}

impl<I, T, N> Transport for SecuredClient<I, T, N>
where
    I: Transport,
    T: TokenStore,
    N: Navigator,
{
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let tokens = self.tokens.get_tokens().await?;

        let error = match self.inner.execute(authorize(&request, tokens.as_ref())).await {
            Err(error) if error.is_unauthorized() => error,
            outcome => return outcome,
        };

        tracing::warn!(method = %request.method, url = %request.url, "Request unauthorized, refreshing access token");

        let refreshed = match tokens {
            Some(tokens) => self.refresh(&tokens).await,
            None => Err(error.clone()),
        };

        match refreshed {
            Ok(tokens) => {
                tracing::debug!(url = %request.url, "Access token refreshed, retrying request");
                match self.inner.execute(authorize(&request, Some(&tokens))).await {
                    Err(retry_error) => {
                        tracing::error!(error = %retry_error, "Retry after refresh failed, logging out");
                        self.redirect_to_logout();
                        Err(retry_error)
                    },
                    outcome => outcome,
                }
            },
            Err(refresh_error) => {
                tracing::error!(error = %refresh_error, "Token refresh failed, logging out");
                self.redirect_to_logout();
                Err(error)
            },
        }
    }
}
