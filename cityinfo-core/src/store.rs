//! In-process recipe storage.
//!
//! Identifiers start at 1, are strictly increasing in submission order and
//! are never reused. Nothing survives a restart.

use parking_lot::Mutex;
use std::collections::HashMap;

use crate::model::Recipe;

#[derive(Debug, Default)]
pub struct RecipeStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    last_id: u64,
    by_city: HashMap<String, Vec<Recipe>>,
}

impl RecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recipes for `city_id` in submission order; empty if none were submitted.
    pub fn list_for_city(&self, city_id: &str) -> Vec<Recipe> {
        self.inner.lock().by_city.get(city_id).cloned().unwrap_or_default()
    }

    /// Allocate the next id and append the recipe under one lock acquisition.
    pub fn append(&self, city_id: &str, content: impl Into<String>) -> Recipe {
        let mut inner = self.inner.lock();
        inner.last_id += 1;

        let recipe = Recipe { id: inner.last_id, content: content.into() };
        inner
            .by_city
            .entry(city_id.to_string())
            .or_default()
            .push(recipe.clone());

        recipe
    }

    /// Total number of recipes across all cities.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner.lock().by_city.values().map(Vec::len).sum()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{collections::HashSet, sync::Arc};

    #[test]
    fn unknown_city_lists_empty() {
        let store = RecipeStore::new();
        assert!(store.list_for_city("nowhere").is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn ids_increase_across_cities() {
        let store = RecipeStore::new();

        let a = store.append("paris", "Croque monsieur, buttered.");
        let b = store.append("lyon", "Quenelles with sauce Nantua.");
        let c = store.append("paris", "Soupe a l'oignon gratinee.");

        assert_eq!((a.id, b.id, c.id), (1, 2, 3));
        assert_eq!(store.list_for_city("paris"), vec![a, c]);
        assert_eq!(store.list_for_city("lyon"), vec![b]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn city_keys_are_exact() {
        let store = RecipeStore::new();
        store.append("Paris", "Capitalised city key.");

        assert!(store.list_for_city("paris").is_empty());
        assert_eq!(store.list_for_city("Paris").len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_get_distinct_ids() {
        const N: usize = 200;
        let store = Arc::new(RecipeStore::new());

        let handles: Vec<_> = (0..N)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.append("paris", format!("Recipe number {i:04}")) })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            let recipe = handle.await.expect("task panicked");
            assert!(ids.insert(recipe.id), "duplicate id {}", recipe.id);
        }

        let listed = store.list_for_city("paris");
        assert_eq!(listed.len(), N);
        assert!(listed.windows(2).all(|w| w[0].id < w[1].id));
        assert_eq!(ids, (1..=N as u64).collect::<HashSet<_>>());
    }
}
