//! Access and refresh token persistence.

use crate::error::TokenError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// The token pair issued by the API
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tokens {
    /// Bearer credential attached to requests
    pub access_token: String,
    /// Credential exchanged for a new access token
    pub refresh_token: String,
}

impl Tokens {
    /// Create a token pair
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

impl std::fmt::Debug for Tokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokens")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Storage for the current token pair
pub trait TokenStore: Send + Sync {
    /// Read the stored tokens, `None` when nothing is stored
    ///
    /// # Errors
    ///
    /// Returns error if the storage cannot be read or holds invalid data.
    fn get_tokens(&self) -> impl Future<Output = Result<Option<Tokens>, TokenError>> + Send;

    /// Replace the stored tokens
    ///
    /// # Errors
    ///
    /// Returns error if the storage cannot be written.
    fn save_tokens(&self, tokens: Tokens) -> impl Future<Output = Result<(), TokenError>> + Send;

    /// Forget the stored tokens
    ///
    /// # Errors
    ///
    /// Returns error if the storage cannot be written.
    fn remove_tokens(&self) -> impl Future<Output = Result<(), TokenError>> + Send;
}

/// In-process token store
#[derive(Clone, Debug, Default)]
pub struct MemoryTokenStore {
    tokens: Arc<Mutex<Option<Tokens>>>,
}

impl MemoryTokenStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `tokens`
    #[must_use]
    pub fn with_tokens(tokens: Tokens) -> Self {
        Self {
            tokens: Arc::new(Mutex::new(Some(tokens))),
        }
    }

    /// Current tokens, without going through the async API
    #[must_use]
    pub fn snapshot(&self) -> Option<Tokens> {
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace(&self, tokens: Option<Tokens>) {
        *self.tokens.lock().unwrap_or_else(PoisonError::into_inner) = tokens;
    }
}

impl TokenStore for MemoryTokenStore {
    async fn get_tokens(&self) -> Result<Option<Tokens>, TokenError> {
        Ok(self.snapshot())
    }

    async fn save_tokens(&self, tokens: Tokens) -> Result<(), TokenError> {
        self.replace(Some(tokens));
        Ok(())
    }

    async fn remove_tokens(&self) -> Result<(), TokenError> {
        self.replace(None);
        Ok(())
    }
}

/// Token store backed by a JSON file
///
/// A missing or empty file means no tokens are stored.
#[derive(Clone, Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store tokens at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File the tokens are kept in
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    async fn get_tokens(&self) -> Result<Option<Tokens>, TokenError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if contents.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&contents)?))
    }

    async fn save_tokens(&self, tokens: Tokens) -> Result<(), TokenError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let contents = serde_json::to_string(&tokens)?;
        tokio::fs::write(&self.path, contents).await?;
        tracing::debug!(path = %self.path.display(), "Tokens saved");
        Ok(())
    }

    async fn remove_tokens(&self) -> Result<(), TokenError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// Whether the JWT `token` has expired at `now`
///
/// Only the payload is decoded; the signature is not checked. A token
/// without an `exp` claim counts as expired.
///
/// # Errors
///
/// Returns [`TokenError::MalformedJwt`] if the token has no payload segment,
/// or the payload is not base64url-encoded JSON.
pub fn is_token_expired(token: &str, now: DateTime<Utc>) -> Result<bool, TokenError> {
    let payload = token
        .split('.')
        .nth(1)
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| TokenError::MalformedJwt("missing payload segment".to_string()))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| TokenError::MalformedJwt(e.to_string()))?;

    let claims: Claims =
        serde_json::from_slice(&bytes).map_err(|e| TokenError::MalformedJwt(e.to_string()))?;

    Ok(claims.exp.is_none_or(|exp| {
        i128::from(exp) * 1000 < i128::from(now.timestamp_millis())
    }))
}
