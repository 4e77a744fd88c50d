//! Route table
//!
//! | Path                           | Route      | Dispatched on enter               |
//! |--------------------------------|------------|-----------------------------------|
//! | `/`                            | `Home`     | nothing                           |
//! | `/pokemons`                    | `Pokemons` | `FetchPokemons(Filters::default)` |
//! | `/pokemons/:name`              | `Pokemon`  | `FetchSinglePokemon { name }`     |
//! | `/logout?reason=..&from=..`    | `Logout`   | `Logout`                          |

use crate::features::pokemon::{Filters, PokemonAction};
use crate::root::AppAction;
use std::borrow::Cow;
use std::fmt;

/// A screen of the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The counter
    Home,
    /// The Pokemon list
    Pokemons,
    /// One Pokemon
    Pokemon {
        /// Pokemon name
        name: String,
    },
    /// The logout screen
    Logout {
        /// Why the user was logged out
        reason: Option<String>,
        /// Where the user was when it happened
        from: Option<String>,
    },
    /// Anything else
    NotFound(String),
}

impl Route {
    /// Match a location (path, optional query and fragment) against the table
    #[must_use]
    pub fn parse(location: &str) -> Self {
        let location = location.split('#').next().unwrap_or_default();
        let (path, query) = location.split_once('?').unwrap_or((location, ""));
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Self::Home,
            ["pokemons"] => Self::Pokemons,
            ["pokemons", name] => Self::Pokemon {
                name: decode(name).into_owned(),
            },
            ["logout"] => Self::Logout {
                reason: query_param(query, "reason"),
                from: query_param(query, "from"),
            },
            _ => Self::NotFound(path.to_string()),
        }
    }

    /// The action a screen dispatches when it is entered
    #[must_use]
    pub fn on_enter(&self) -> Option<AppAction> {
        match self {
            Self::Home | Self::NotFound(_) => None,
            Self::Pokemons => Some(AppAction::Pokemon(PokemonAction::FetchPokemons(Filters::default()))),
            Self::Pokemon { name } => Some(AppAction::Pokemon(PokemonAction::FetchSinglePokemon {
                name: Some(name.clone()),
            })),
            Self::Logout { .. } => Some(AppAction::Logout),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => f.write_str("/"),
            Self::Pokemons => f.write_str("/pokemons"),
            Self::Pokemon { name } => write!(f, "/pokemons/{}", urlencoding::encode(name)),
            Self::Logout { reason, from } => {
                f.write_str("/logout")?;
                let params: Vec<String> = [("reason", reason), ("from", from)]
                    .into_iter()
                    .filter_map(|(key, value)| {
                        value
                            .as_ref()
                            .map(|v| format!("{key}={}", urlencoding::encode(v)))
                    })
                    .collect();
                if !params.is_empty() {
                    write!(f, "?{}", params.join("&"))?;
                }
                Ok(())
            },
            Self::NotFound(path) => f.write_str(path),
        }
    }
}

fn decode(raw: &str) -> Cow<'_, str> {
    urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}

fn query_param(query: &str, key: &str) -> Option<String> {
    query
        .split('&')
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(k, _)| *k == key)
        .map(|(_, value)| decode(&value.replace('+', " ")).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_route_table() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/pokemons/"), Route::Pokemons);
        assert_eq!(Route::parse("/pokemons?page=2"), Route::Pokemons);
        assert_eq!(
            Route::parse("/pokemons/mr%20mime#stats"),
            Route::Pokemon {
                name: "mr mime".to_string()
            }
        );
        assert_eq!(
            Route::parse("/pokemons/a/b"),
            Route::NotFound("/pokemons/a/b".to_string())
        );
    }

    #[test]
    fn parses_logout_redirect_target() {
        assert_eq!(
            Route::parse("/logout?reason=refreshtokenexpired&from=%2Fpokemons%2Fpikachu"),
            Route::Logout {
                reason: Some("refreshtokenexpired".to_string()),
                from: Some("/pokemons/pikachu".to_string()),
            }
        );
        assert_eq!(
            Route::parse("/logout"),
            Route::Logout {
                reason: None,
                from: None
            }
        );
    }

    #[test]
    fn on_enter_dispatches_mount_actions() {
        assert_eq!(Route::Home.on_enter(), None);
        assert_eq!(
            Route::Pokemons.on_enter(),
            Some(AppAction::Pokemon(PokemonAction::FetchPokemons(Filters::default())))
        );
        assert_eq!(
            Route::parse("/pokemons/eevee").on_enter(),
            Some(AppAction::Pokemon(PokemonAction::FetchSinglePokemon {
                name: Some("eevee".to_string())
            }))
        );
        assert_eq!(Route::parse("/logout").on_enter(), Some(AppAction::Logout));
    }

    #[test]
    fn display_round_trips_through_parse() {
        let routes = [
            Route::Home,
            Route::Pokemons,
            Route::Pokemon {
                name: "mr mime".to_string(),
            },
            Route::Logout {
                reason: Some("refreshtokenexpired".to_string()),
                from: Some("/pokemons".to_string()),
            },
        ];

        for route in routes {
            assert_eq!(Route::parse(&route.to_string()), route);
        }
    }
}
