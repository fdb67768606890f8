//! Filter pipeline over the loaded pokemon
//!
//! Filtering is a pure derivation: the result is always an order-preserving
//! subset of the input, and every active criterion must hold (AND semantics).

use serde::{Deserialize, Serialize};

use crate::favorites::FavoritesSet;
use crate::pokemon::Pokemon;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Selected type names in selection order. Empty means no restriction.
    pub selected_types: Vec<String>,
    pub query: String,
    pub favorites_only: bool,
}

impl FilterCriteria {
    /// True when any criterion restricts the list
    pub fn is_active(&self) -> bool {
        !self.selected_types.is_empty() || !self.normalized_query().is_empty() || self.favorites_only
    }

    /// Select the type if absent, deselect it if present
    pub fn toggle_type(&mut self, name: &str) {
        if let Some(pos) = self.selected_types.iter().position(|t| t == name) {
            self.selected_types.remove(pos);
        } else {
            self.selected_types.push(name.to_string());
        }
    }

    pub fn is_type_selected(&self, name: &str) -> bool {
        self.selected_types.iter().any(|t| t == name)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn normalized_query(&self) -> String {
        self.query.trim().to_lowercase()
    }

    /// Whether a single pokemon passes every active criterion
    pub fn matches(&self, pokemon: &Pokemon, favorites: &FavoritesSet) -> bool {
        if !self.selected_types.is_empty()
            && !pokemon
                .types
                .iter()
                .any(|t| self.is_type_selected(&t.kind.name))
        {
            return false;
        }

        let query = self.normalized_query();
        if !query.is_empty()
            && !pokemon.name.to_lowercase().contains(&query)
            && !pokemon.id.to_string().contains(&query)
        {
            return false;
        }

        !self.favorites_only || favorites.contains(pokemon.id)
    }
}

/// Keep the pokemon matching `criteria`, in their original order
pub fn apply_filters<'a>(
    items: &'a [Pokemon],
    criteria: &FilterCriteria,
    favorites: &FavoritesSet,
) -> Vec<&'a Pokemon> {
    items
        .iter()
        .filter(|p| criteria.matches(p, favorites))
        .collect()
}

/// Slice of the filtered list that is actually shown.
///
/// Incremental paging only applies to unfiltered browsing; as soon as a
/// filter is active every match loaded so far is visible.
pub fn visible_window<'a, T>(
    filtered: &'a [T],
    criteria: &FilterCriteria,
    display_count: usize,
) -> &'a [T] {
    if criteria.is_active() {
        filtered
    } else {
        &filtered[..display_count.min(filtered.len())]
    }
}
