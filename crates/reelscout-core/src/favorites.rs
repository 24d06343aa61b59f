//! Persisted favorites collection.

use std::collections::HashSet;

use reelscout_api::omdb::MovieSummary;
use reelscout_db::KeyValueStore;

/// Storage key holding the serialized collection.
pub const FAVORITES_KEY: &str = "reelscout.favorites";

/// Favorites keyed by id, kept in insertion order and written through to
/// `S` after every mutation.
///
/// Storage failures never surface to callers: a failed read starts from an
/// empty collection and a failed write leaves memory ahead of storage.
/// Both are logged at warn.
#[derive(Debug)]
pub struct FavoritesStore<S> {
    store: S,
    items: Vec<MovieSummary>,
    ids: HashSet<String>,
}

impl<S: KeyValueStore> FavoritesStore<S> {
    /// Loads the collection from `store`.
    pub fn load(store: S) -> Self {
        let items = match store.get(FAVORITES_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<Vec<MovieSummary>>(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "stored favorites are unreadable, starting empty");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load favorites, starting empty");
                Vec::new()
            }
        };

        // First occurrence wins if the stored list carries duplicates.
        let mut ids = HashSet::with_capacity(items.len());
        let items = items
            .into_iter()
            .filter(|m| ids.insert(m.id.clone()))
            .collect();

        Self { store, items, ids }
    }

    /// Favorites in insertion order.
    #[must_use]
    pub fn items(&self) -> &[MovieSummary] {
        &self.items
    }

    /// Number of favorites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether an entry with `id` is saved.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Appends `movie` unless its id is already saved.
    /// Returns `true` when the collection changed.
    pub fn add(&mut self, movie: MovieSummary) -> bool {
        if !self.ids.insert(movie.id.clone()) {
            return false;
        }
        self.items.push(movie);
        self.flush();
        true
    }

    /// Removes the entry with `id`. Returns `true` when the collection changed.
    pub fn remove(&mut self, id: &str) -> bool {
        if !self.ids.remove(id) {
            return false;
        }
        self.items.retain(|m| m.id != id);
        self.flush();
        true
    }

    /// Adds `movie` if absent, removes it otherwise.
    /// Returns whether it is saved afterwards.
    pub fn toggle(&mut self, movie: &MovieSummary) -> bool {
        if self.contains(&movie.id) {
            self.remove(&movie.id);
            false
        } else {
            self.add(movie.clone());
            true
        }
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.items.clear();
        self.ids.clear();
        self.flush();
    }

    fn flush(&self) {
        let result = serde_json::to_string(&self.items)
            .map_err(anyhow::Error::from)
            .and_then(|json| self.store.set(FAVORITES_KEY, &json));
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to persist favorites");
        }
    }
}
