//! Pokemon domain types and list filters.

use serde::{Deserialize, Serialize};

/// A Pokemon entry in a list page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pokemon {
    /// Pokemon name
    pub name: String,
    /// Detail resource url
    pub url: String,
}

/// One page of the Pokemon list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonPage {
    /// Total number of Pokemon
    pub count: u32,
    /// Url of the next page
    pub next: Option<String>,
    /// Url of the previous page
    pub previous: Option<String>,
    /// Entries on this page
    pub results: Vec<Pokemon>,
}

/// A named reference to another resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedResource {
    /// Resource name
    pub name: String,
    /// Resource url
    pub url: String,
}

/// One of a Pokemon's types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonTypeSlot {
    /// Position of the type (1 = primary)
    pub slot: u8,
    /// The type itself
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

/// Details of a single Pokemon
///
/// Fields the API returns beyond these are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonDetails {
    /// National dex number
    pub id: u32,
    /// Pokemon name
    pub name: String,
    /// Height in decimetres
    pub height: u32,
    /// Weight in hectograms
    pub weight: u32,
    /// Experience gained for defeating it
    #[serde(default)]
    pub base_experience: Option<u32>,
    /// Types, primary first
    #[serde(default)]
    pub types: Vec<PokemonTypeSlot>,
}

/// A failed fetch, as stored in state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchError {
    /// HTTP status, `0` when no response was received
    pub status: u16,
    /// Human readable cause
    pub message: String,
}

/// List sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending
    #[default]
    Asc,
    /// Descending
    Dsc,
}

/// Pokemon list query
///
/// Only `page` and `page_size` reach the API; sorting and search are kept
/// for the list screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    /// 1-based page number
    pub page: u32,
    /// Entries per page
    pub page_size: u32,
    /// Sort field
    pub sort_by: String,
    /// Sort direction
    pub sort_direction: SortDirection,
    /// Free text search
    pub search: Option<String>,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
            sort_by: "createdAt".to_string(),
            sort_direction: SortDirection::Asc,
            search: None,
        }
    }
}

impl Filters {
    /// Index of the first entry on the page
    #[must_use]
    pub const fn offset(&self) -> u32 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// `offset`/`limit` query string for the list endpoint
    #[must_use]
    pub fn query(&self) -> String {
        format!("offset={}&limit={}", self.offset(), self.page_size)
    }
}

/// Partial [`Filters`] update
///
/// Unset values, zero numbers and empty strings leave the current value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterUpdate {
    /// New page number
    pub page: Option<u32>,
    /// New page size
    pub page_size: Option<u32>,
    /// New sort field
    pub sort_by: Option<String>,
    /// New sort direction
    pub sort_direction: Option<SortDirection>,
    /// New search text
    pub search: Option<String>,
}

impl FilterUpdate {
    /// Copy the provided values into `filters`
    pub fn apply(&self, filters: &mut Filters) {
        if let Some(page) = self.page.filter(|p| *p > 0) {
            filters.page = page;
        }
        if let Some(page_size) = self.page_size.filter(|s| *s > 0) {
            filters.page_size = page_size;
        }
        if let Some(sort_by) = self.sort_by.as_ref().filter(|s| !s.is_empty()) {
            filters.sort_by.clone_from(sort_by);
        }
        if let Some(sort_direction) = self.sort_direction {
            filters.sort_direction = sort_direction;
        }
        if let Some(search) = self.search.as_ref().filter(|s| !s.is_empty()) {
            filters.search = Some(search.clone());
        }
    }
}
