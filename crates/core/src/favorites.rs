//! Favorites storage and retrieval functions
//!
//! The favorites set is persisted as a JSON array of pokemon ids in a single
//! file. It is read once when a session starts and rewritten on every change.
//! Writes go to a sibling temp file that is then renamed over the target, so a
//! reader never sees a half-written array.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Error type for favorites operations
#[derive(Debug)]
pub enum FavoritesError {
    IoError(String),
    InvalidFormat(String),
}

impl std::fmt::Display for FavoritesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FavoritesError::IoError(msg) => write!(f, "IO error: {}", msg),
            FavoritesError::InvalidFormat(msg) => {
                write!(f, "Favorites file is not a JSON array of ids: {}", msg)
            }
        }
    }
}

impl std::error::Error for FavoritesError {}

impl From<std::io::Error> for FavoritesError {
    fn from(err: std::io::Error) -> Self {
        FavoritesError::IoError(err.to_string())
    }
}

/// Set of favorite pokemon ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoritesSet(BTreeSet<u32>);

impl FavoritesSet {
    pub fn contains(&self, id: u32) -> bool {
        self.0.contains(&id)
    }

    /// Add the id if absent, remove it if present. Returns whether it is now a favorite.
    pub fn toggle(&mut self, id: u32) -> bool {
        if self.0.remove(&id) {
            false
        } else {
            self.0.insert(id);
            true
        }
    }

    pub fn insert(&mut self, id: u32) -> bool {
        self.0.insert(id)
    }

    pub fn remove(&mut self, id: u32) -> bool {
        self.0.remove(&id)
    }

    /// Ids in ascending order
    pub fn ids(&self) -> Vec<u32> {
        self.0.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<u32> for FavoritesSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Load the favorites set from `path`
///
/// A missing file is an empty set.
pub fn load_favorites(path: &Path) -> Result<FavoritesSet, FavoritesError> {
    if !path.exists() {
        return Ok(FavoritesSet::default());
    }

    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(FavoritesSet::default());
    }

    let ids: Vec<u32> = serde_json::from_str(&content)
        .map_err(|e| FavoritesError::InvalidFormat(e.to_string()))?;

    Ok(ids.into_iter().collect())
}

/// Save the favorites set to `path`, creating parent directories as needed
pub fn save_favorites(path: &Path, favorites: &FavoritesSet) -> Result<(), FavoritesError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string(&favorites.ids())
        .map_err(|e| FavoritesError::InvalidFormat(e.to_string()))?;

    let temp_path = temp_path_for(path);
    if let Err(e) = fs::write(&temp_path, content).and_then(|_| fs::rename(&temp_path, path)) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    Ok(())
}

/// Unique sibling of `path` so the final rename stays on the same filesystem
fn temp_path_for(path: &Path) -> PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "favorites".to_string());
    let suffix = COUNTER.fetch_add(1, Ordering::Relaxed);

    path.with_file_name(format!(".{}.{}.{}.tmp", file_name, std::process::id(), suffix))
}
