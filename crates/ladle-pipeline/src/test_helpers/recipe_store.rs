//! Mock relational store that records inserts in memory

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ladle_core::models::{PersistedRecipe, RecipeId};
use ladle_db::RecipeStore;

/// In-memory [`RecipeStore`] with switchable fault injection.
#[derive(Clone)]
pub struct MockRecipeStore {
    recipes: Arc<Mutex<Vec<PersistedRecipe>>>,
    associations: Arc<Mutex<Vec<(RecipeId, String)>>>,
    insert_recipe_calls: Arc<AtomicUsize>,
    association_calls: Arc<AtomicUsize>,
    fail_recipe_insert: Arc<AtomicBool>,
    stall_recipe_insert: Arc<AtomicBool>,
    fail_association_substrings: Arc<Mutex<Vec<String>>>,
}

impl MockRecipeStore {
    pub fn new() -> Self {
        Self {
            recipes: Arc::new(Mutex::new(Vec::new())),
            associations: Arc::new(Mutex::new(Vec::new())),
            insert_recipe_calls: Arc::new(AtomicUsize::new(0)),
            association_calls: Arc::new(AtomicUsize::new(0)),
            fail_recipe_insert: Arc::new(AtomicBool::new(false)),
            stall_recipe_insert: Arc::new(AtomicBool::new(false)),
            fail_association_substrings: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make every recipe insert fail.
    pub fn fail_recipe_inserts(&self) {
        self.fail_recipe_insert.store(true, Ordering::SeqCst);
    }

    /// Make every recipe insert pend until its future is dropped.
    pub fn stall_recipe_inserts(&self) {
        self.stall_recipe_insert.store(true, Ordering::SeqCst);
    }

    /// Make every association insert whose URL contains `needle` fail.
    pub fn fail_associations_containing(&self, needle: &str) {
        self.fail_association_substrings
            .lock()
            .unwrap()
            .push(needle.to_string());
    }

    pub fn insert_recipe_call_count(&self) -> usize {
        self.insert_recipe_calls.load(Ordering::SeqCst)
    }

    pub fn association_call_count(&self) -> usize {
        self.association_calls.load(Ordering::SeqCst)
    }

    /// Recipe rows committed so far.
    pub fn recipes(&self) -> Vec<PersistedRecipe> {
        self.recipes.lock().unwrap().clone()
    }

    /// Association rows committed so far, in insertion order.
    pub fn associations(&self) -> Vec<(RecipeId, String)> {
        self.associations.lock().unwrap().clone()
    }

    /// URLs of committed associations, sorted for stable assertions.
    pub fn association_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self
            .associations
            .lock()
            .unwrap()
            .iter()
            .map(|(_, url)| url.clone())
            .collect();
        urls.sort();
        urls
    }
}

#[async_trait]
impl RecipeStore for MockRecipeStore {
    async fn insert_recipe(&self, recipe: &PersistedRecipe) -> Result<()> {
        self.insert_recipe_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_recipe_insert.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("injected recipe insert failure"));
        }
        if self.stall_recipe_insert.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.recipes.lock().unwrap().push(recipe.clone());
        Ok(())
    }

    async fn insert_asset_association(&self, recipe_id: RecipeId, url: &str) -> Result<()> {
        self.association_calls.fetch_add(1, Ordering::SeqCst);
        let blocked = self
            .fail_association_substrings
            .lock()
            .unwrap()
            .iter()
            .any(|needle| url.contains(needle));
        if blocked {
            return Err(anyhow::anyhow!("injected association failure for {url}"));
        }
        self.associations
            .lock()
            .unwrap()
            .push((recipe_id, url.to_string()));
        Ok(())
    }
}

impl Default for MockRecipeStore {
    fn default() -> Self {
        Self::new()
    }
}
