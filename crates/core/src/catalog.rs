//! Catalog state machine
//!
//! All session state lives in [`CatalogState`] and only changes through
//! [`reduce`], which takes the current state plus an [`Action`] (a user
//! [`Intent`] or the outcome of a request) and returns the [`Effect`]s the
//! shell has to run. Effects that hit the network carry a token; their
//! outcome is only applied while that token is still the outstanding one.

use serde::{Deserialize, Serialize};

use crate::evolution::EvolutionStage;
use crate::favorites::FavoritesSet;
use crate::filter::{apply_filters, visible_window, FilterCriteria};
use crate::pokemon::{detail, summarize, NamedResource, Pokemon, PokemonDetail, PokemonSummary};
use crate::types::type_color;

pub const DEFAULT_PAGE_SIZE: usize = 24;

/// Remaining scroll distance (in pixels) under which the next page is requested
pub const SCROLL_THRESHOLD_PX: f64 = 300.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Phase {
    Uninitialized,
    Loading,
    Ready,
    LoadingMore,
    Failed { error: String },
}

/// Something the user asked for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    SetQuery {
        query: String,
    },
    ToggleType {
        name: String,
    },
    ToggleFavorite {
        id: u32,
    },
    ToggleFavoritesOnly,
    ClearFilters,
    SelectItem {
        id: u32,
    },
    CloseDetail,
    RequestLoadMore,
    /// Scroll position report; loads the next page when close to the bottom
    Scrolled {
        scroll_top: f64,
        viewport_height: f64,
        document_height: f64,
    },
    Retry,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Start,
    Intent(Intent),
    InitialLoaded {
        token: u64,
        types: Vec<NamedResource>,
        items: Vec<Pokemon>,
        has_more: bool,
    },
    InitialFailed {
        token: u64,
        error: String,
    },
    PageLoaded {
        token: u64,
        items: Vec<Pokemon>,
        has_more: bool,
    },
    PageFailed {
        token: u64,
        error: String,
    },
    EvolutionLoaded {
        item_id: u32,
        stages: Vec<EvolutionStage>,
    },
    EvolutionFailed {
        item_id: u32,
        error: String,
    },
}

/// Work the shell must perform on behalf of the reducer
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Fetch the type list and the first page
    LoadInitial { token: u64, limit: usize },
    LoadPage {
        token: u64,
        limit: usize,
        offset: usize,
    },
    LoadEvolution { item_id: u32, species_id: u32 },
    PersistFavorites { ids: Vec<u32> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EvolutionStatus {
    Loading,
    Loaded { stages: Vec<EvolutionStage> },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub item_id: u32,
    pub evolution: EvolutionStatus,
}

#[derive(Debug, Clone)]
pub struct CatalogState {
    pub phase: Phase,
    pub page_size: usize,
    /// Every pokemon loaded so far, in page order
    pub items: Vec<Pokemon>,
    pub types: Vec<NamedResource>,
    pub criteria: FilterCriteria,
    pub favorites: FavoritesSet,
    /// Offset of the next page to request
    pub offset: usize,
    pub has_more: bool,
    /// Size of the visible window while browsing unfiltered
    pub display_count: usize,
    pub generation: u64,
    /// Token of the list request currently outstanding
    pub in_flight: Option<u64>,
    pub selection: Option<Selection>,
    pub last_error: Option<String>,
}

impl CatalogState {
    pub fn new(page_size: usize, favorites: FavoritesSet) -> Self {
        let page_size = page_size.max(1);
        Self {
            phase: Phase::Uninitialized,
            page_size,
            items: Vec::new(),
            types: Vec::new(),
            criteria: FilterCriteria::default(),
            favorites,
            offset: 0,
            has_more: true,
            display_count: page_size,
            generation: 0,
            in_flight: None,
            selection: None,
            last_error: None,
        }
    }

    pub fn filtered(&self) -> Vec<&Pokemon> {
        apply_filters(&self.items, &self.criteria, &self.favorites)
    }

    pub fn visible(&self) -> Vec<&Pokemon> {
        let filtered = self.filtered();
        visible_window(&filtered, &self.criteria, self.display_count).to_vec()
    }

    pub fn find(&self, id: u32) -> Option<&Pokemon> {
        self.items.iter().find(|p| p.id == id)
    }

    fn issue_token(&mut self) -> u64 {
        self.generation += 1;
        self.in_flight = Some(self.generation);
        self.generation
    }

    /// Consume the outstanding token if `token` is it
    fn accept(&mut self, token: u64) -> bool {
        if self.in_flight == Some(token) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }
}

/// Apply `action` to `state` and return the effects to run
pub fn reduce(state: &mut CatalogState, action: Action) -> Vec<Effect> {
    match action {
        Action::Start => start_loading(state),
        Action::Intent(intent) => apply_intent(state, intent),
        Action::InitialLoaded {
            token,
            types,
            items,
            has_more,
        } => {
            if state.phase != Phase::Loading || !state.accept(token) {
                return vec![];
            }
            state.types = types;
            state.items = items;
            state.offset = state.page_size;
            state.display_count = state.page_size;
            state.has_more = has_more;
            state.last_error = None;
            state.phase = Phase::Ready;
            vec![]
        }
        Action::InitialFailed { token, error } => {
            if state.phase == Phase::Loading && state.accept(token) {
                state.phase = Phase::Failed { error };
            }
            vec![]
        }
        Action::PageLoaded {
            token,
            items,
            has_more,
        } => {
            if state.phase != Phase::LoadingMore || !state.accept(token) {
                return vec![];
            }
            state.items.extend(items);
            state.offset += state.page_size;
            state.display_count += state.page_size;
            state.has_more = has_more;
            state.last_error = None;
            state.phase = Phase::Ready;
            vec![]
        }
        Action::PageFailed { token, error } => {
            if state.phase == Phase::LoadingMore && state.accept(token) {
                state.last_error = Some(error);
                state.phase = Phase::Ready;
            }
            vec![]
        }
        Action::EvolutionLoaded { item_id, stages } => {
            set_evolution(state, item_id, EvolutionStatus::Loaded { stages });
            vec![]
        }
        Action::EvolutionFailed { item_id, error } => {
            set_evolution(state, item_id, EvolutionStatus::Failed { error });
            vec![]
        }
    }
}

fn start_loading(state: &mut CatalogState) -> Vec<Effect> {
    match state.phase {
        Phase::Uninitialized | Phase::Failed { .. } => {
            state.phase = Phase::Loading;
            let token = state.issue_token();
            vec![Effect::LoadInitial {
                token,
                limit: state.page_size,
            }]
        }
        _ => vec![],
    }
}

fn apply_intent(state: &mut CatalogState, intent: Intent) -> Vec<Effect> {
    match intent {
        Intent::SetQuery { query } => {
            if state.criteria.query != query {
                state.criteria.query = query;
                filter_changed(state);
            }
            vec![]
        }
        Intent::ToggleType { name } => {
            state.criteria.toggle_type(&name);
            filter_changed(state);
            vec![]
        }
        Intent::ToggleFavoritesOnly => {
            state.criteria.favorites_only = !state.criteria.favorites_only;
            filter_changed(state);
            vec![]
        }
        Intent::ClearFilters => {
            if state.criteria != FilterCriteria::default() {
                state.criteria.clear();
                filter_changed(state);
            }
            vec![]
        }
        Intent::ToggleFavorite { id } => {
            state.favorites.toggle(id);
            vec![Effect::PersistFavorites {
                ids: state.favorites.ids(),
            }]
        }
        Intent::SelectItem { id } => {
            let Some(species_id) = state.find(id).map(Pokemon::species_id) else {
                return vec![];
            };
            state.selection = Some(Selection {
                item_id: id,
                evolution: EvolutionStatus::Loading,
            });
            vec![Effect::LoadEvolution {
                item_id: id,
                species_id,
            }]
        }
        Intent::CloseDetail => {
            state.selection = None;
            vec![]
        }
        Intent::RequestLoadMore => load_more(state),
        Intent::Scrolled {
            scroll_top,
            viewport_height,
            document_height,
        } => {
            if state.criteria.is_active() {
                return vec![];
            }
            if scroll_top + viewport_height >= document_height - SCROLL_THRESHOLD_PX {
                load_more(state)
            } else {
                vec![]
            }
        }
        Intent::Retry => start_loading(state),
    }
}

/// Reset paging after a criteria change and abandon any page still in flight
fn filter_changed(state: &mut CatalogState) {
    state.generation += 1;
    state.display_count = state.page_size;
    if state.phase == Phase::LoadingMore {
        state.in_flight = None;
        state.phase = Phase::Ready;
    }
}

fn load_more(state: &mut CatalogState) -> Vec<Effect> {
    if state.phase != Phase::Ready {
        return vec![];
    }

    // Pages already loaded but hidden by a window reset are revealed first
    if !state.criteria.is_active() && state.display_count < state.items.len() {
        state.display_count += state.page_size;
        return vec![];
    }

    if !state.has_more {
        return vec![];
    }

    state.phase = Phase::LoadingMore;
    let token = state.issue_token();
    vec![Effect::LoadPage {
        token,
        limit: state.page_size,
        offset: state.offset,
    }]
}

fn set_evolution(state: &mut CatalogState, item_id: u32, status: EvolutionStatus) {
    if let Some(selection) = state.selection.as_mut() {
        if selection.item_id == item_id {
            selection.evolution = status;
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeOption {
    pub name: String,
    pub color: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailView {
    #[serde(flatten)]
    pub pokemon: PokemonDetail,
    pub is_favorite: bool,
    pub evolution: EvolutionStatus,
}

/// Read-only view model handed to the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct CatalogView {
    pub phase: Phase,
    pub items: Vec<PokemonSummary>,
    pub filtered_count: usize,
    pub loaded_count: usize,
    pub types: Vec<TypeOption>,
    pub query: String,
    pub selected_types: Vec<String>,
    pub favorites_only: bool,
    pub favorites: Vec<u32>,
    pub loading: bool,
    pub loading_more: bool,
    pub has_more: bool,
    pub show_load_more: bool,
    pub last_error: Option<String>,
    pub detail: Option<DetailView>,
}

pub fn view(state: &CatalogState) -> CatalogView {
    let filtered = state.filtered();
    let visible = visible_window(&filtered, &state.criteria, state.display_count);
    let filter_active = state.criteria.is_active();

    let detail = state.selection.as_ref().and_then(|selection| {
        state.find(selection.item_id).map(|pokemon| DetailView {
            pokemon: detail(pokemon),
            is_favorite: state.favorites.contains(pokemon.id),
            evolution: selection.evolution.clone(),
        })
    });

    CatalogView {
        items: visible.iter().map(|p| summarize(p)).collect(),
        filtered_count: filtered.len(),
        loaded_count: state.items.len(),
        types: state
            .types
            .iter()
            .map(|t| TypeOption {
                name: t.name.clone(),
                color: type_color(&t.name).to_string(),
                selected: state.criteria.is_type_selected(&t.name),
            })
            .collect(),
        query: state.criteria.query.clone(),
        selected_types: state.criteria.selected_types.clone(),
        favorites_only: state.criteria.favorites_only,
        favorites: state.favorites.ids(),
        loading: matches!(state.phase, Phase::Uninitialized | Phase::Loading),
        loading_more: state.phase == Phase::LoadingMore,
        has_more: state.has_more,
        show_load_more: !filter_active
            && state.phase == Phase::Ready
            && (state.has_more || visible.len() < state.items.len()),
        last_error: state.last_error.clone(),
        detail,
        phase: state.phase.clone(),
    }
}
