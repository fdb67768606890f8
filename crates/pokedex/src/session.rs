use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use pokedex_core::catalog::{reduce, view, Action, CatalogState, CatalogView, Effect, Intent, Phase};
use pokedex_core::favorites::{load_favorites, save_favorites, FavoritesSet};
use tokio::sync::Mutex;

use crate::api::{load_page, CatalogSource};
use crate::evolution::evolution_for_species;

/// Drives a [`CatalogState`] against a [`CatalogSource`].
///
/// The state lock is only held while reducing, never across a request, so
/// intents arriving while a page is loading see the in-flight phase.
/// Favorites writes are serialized on their own lock.
pub struct CatalogSession<S> {
    source: S,
    state: Mutex<CatalogState>,
    favorites_path: Option<PathBuf>,
    persist_lock: Mutex<()>,
}

impl<S: CatalogSource> CatalogSession<S> {
    pub fn new(source: S, page_size: usize, favorites_path: Option<PathBuf>) -> Self {
        let favorites = match &favorites_path {
            Some(path) => load_favorites(path).unwrap_or_else(|e| {
                log::warn!("Ignoring favorites at {}: {}", path.display(), e);
                FavoritesSet::default()
            }),
            None => FavoritesSet::default(),
        };

        Self {
            source,
            state: Mutex::new(CatalogState::new(page_size, favorites)),
            favorites_path,
            persist_lock: Mutex::new(()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn view(&self) -> CatalogView {
        view(&*self.state.lock().await)
    }

    /// Run the initial load unless it already ran
    pub async fn ensure_started(&self) -> CatalogView {
        let uninitialized = self.state.lock().await.phase == Phase::Uninitialized;
        if uninitialized {
            self.apply(Action::Start).await
        } else {
            self.view().await
        }
    }

    pub async fn dispatch(&self, intent: Intent) -> CatalogView {
        self.apply(Action::Intent(intent)).await
    }

    /// Reduce `action` and run every effect it leads to
    pub async fn apply(&self, action: Action) -> CatalogView {
        let mut pending: VecDeque<Effect> = self.reduce(action).await.into();

        while let Some(effect) = pending.pop_front() {
            if let Some(outcome) = self.run(effect).await {
                pending.extend(self.reduce(outcome).await);
            }
        }

        self.view().await
    }

    async fn reduce(&self, action: Action) -> Vec<Effect> {
        let mut state = self.state.lock().await;
        reduce(&mut state, action)
    }

    /// Write the favorites as they are now, not as the effect saw them.
    /// Whichever writer goes last holds the latest set.
    async fn persist_favorites(&self, path: &Path) {
        let _guard = self.persist_lock.lock().await;
        let favorites = self.state.lock().await.favorites.clone();
        log::debug!("Saving {} favorites to {}", favorites.len(), path.display());
        if let Err(e) = save_favorites(path, &favorites) {
            log::error!("Failed to save favorites to {}: {}", path.display(), e);
        }
    }

    async fn run(&self, effect: Effect) -> Option<Action> {
        match effect {
            Effect::LoadInitial { token, limit } => {
                let result = tokio::try_join!(
                    self.source.get_types(),
                    load_page(&self.source, limit, 0)
                );
                Some(match result {
                    Ok((types, (items, has_more))) => Action::InitialLoaded {
                        token,
                        types,
                        items,
                        has_more,
                    },
                    Err(e) => {
                        log::error!("Error loading initial data: {}", e);
                        Action::InitialFailed {
                            token,
                            error: e.to_string(),
                        }
                    }
                })
            }
            Effect::LoadPage {
                token,
                limit,
                offset,
            } => Some(match load_page(&self.source, limit, offset).await {
                Ok((items, has_more)) => Action::PageLoaded {
                    token,
                    items,
                    has_more,
                },
                Err(e) => {
                    log::error!("Error loading more pokemon at offset {}: {}", offset, e);
                    Action::PageFailed {
                        token,
                        error: e.to_string(),
                    }
                }
            }),
            Effect::LoadEvolution {
                item_id,
                species_id,
            } => Some(match evolution_for_species(&self.source, species_id).await {
                Ok(stages) => Action::EvolutionLoaded { item_id, stages },
                Err(e) => {
                    log::warn!("Error loading evolution chain for {}: {}", item_id, e);
                    Action::EvolutionFailed {
                        item_id,
                        error: e.to_string(),
                    }
                }
            }),
            Effect::PersistFavorites { .. } => {
                if let Some(path) = &self.favorites_path {
                    self.persist_favorites(path).await;
                }
                None
            }
        }
    }
}
