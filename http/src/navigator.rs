//! Client location and redirects.

use std::sync::{Arc, Mutex, PoisonError};

/// Path of the logout route
pub const LOGOUT_PATH: &str = "/logout";

/// `reason` sent to the logout route when the refresh token is rejected
pub const REFRESH_TOKEN_EXPIRED: &str = "refreshtokenexpired";

/// Where the client currently is, and how to send it elsewhere
pub trait Navigator: Send + Sync {
    /// Current location: path, query and fragment, without the origin
    fn current_location(&self) -> String;

    /// Move the client to `location`
    fn redirect(&self, location: &str);
}

/// Navigator that keeps its history in memory
#[derive(Clone, Debug)]
pub struct MemoryNavigator {
    history: Arc<Mutex<Vec<String>>>,
}

impl MemoryNavigator {
    /// Start at `location`; an origin prefix is stripped
    #[must_use]
    pub fn new(location: &str) -> Self {
        Self {
            history: Arc::new(Mutex::new(vec![strip_origin(location).to_string()])),
        }
    }

    /// Every location visited, starting with the initial one
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Locations reached through [`Navigator::redirect`]
    #[must_use]
    pub fn redirects(&self) -> Vec<String> {
        self.history().into_iter().skip(1).collect()
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn current_location(&self) -> String {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
            .unwrap_or_else(|| "/".to_string())
    }

    fn redirect(&self, location: &str) {
        tracing::info!(location, "Redirecting");
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(strip_origin(location).to_string());
    }
}

/// Drop the `scheme://host[:port]` prefix of an absolute url
#[must_use]
pub fn strip_origin(href: &str) -> &str {
    let Some(scheme_end) = href.find("://") else {
        return href;
    };
    let rest = &href[scheme_end + 3..];
    match rest.find(['/', '?', '#']) {
        Some(path_start) => &rest[path_start..],
        None => "/",
    }
}

/// Cut `location` at its first `?`, unless the `?` is the first character
#[must_use]
pub fn strip_query(location: &str) -> &str {
    match location.find('?') {
        Some(index) if index > 0 => &location[..index],
        _ => location,
    }
}

/// Logout route telling the user their session expired while at `from`
#[must_use]
pub fn logout_location(from: &str) -> String {
    format!(
        "{LOGOUT_PATH}?reason={REFRESH_TOKEN_EXPIRED}&from={}",
        urlencoding::encode(from)
    )
}
