//! In-memory bookmark session.
//!
//! Owns the flat collections for one session: created from the host's tree
//! snapshot, mutated in place by the optimistic mutation operations and the
//! categorization merge, destroyed when the session ends. All views are
//! re-derived from the collections on demand.

use crate::classify::{merge_categories, sample_for_classification, Classifier};
use crate::host::BookmarkHost;
use crate::model::{Bookmark, CategoryCount, Folder};
use crate::query;
use crate::tree::{flatten, FlattenConfig};
use std::collections::HashMap;

pub struct BookmarkSession<H: BookmarkHost> {
    host: H,
    bookmarks: Vec<Bookmark>,
    folders: Vec<Folder>,
}

impl<H: BookmarkHost> BookmarkSession<H> {
    /// Fetch the host's tree snapshot and flatten it into a new session.
    pub async fn load(host: H, config: &FlattenConfig) -> Result<Self, String> {
        let tree = host.fetch_tree().await?;
        let (bookmarks, folders) = flatten(&tree, config);
        println!("[Session] loaded {} bookmarks, {} folders", bookmarks.len(), folders.len());
        Ok(Self { host, bookmarks, folders })
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    /// Visible subset for a query and category selection
    pub fn search(&self, query: &str, selected_category: &str) -> Vec<&Bookmark> {
        query::filter(&self.bookmarks, query, selected_category)
    }

    /// Category populations, most popular first
    pub fn categories(&self) -> Vec<CategoryCount> {
        query::aggregate(&self.bookmarks)
    }

    /// Delete a bookmark: request the host, drop it from memory immediately.
    ///
    /// No-op if the id is absent. The optimistic removal is not rolled back
    /// if the host call fails; the failure is logged and the in-memory view
    /// may drift from the host until the next full load.
    pub async fn delete(&mut self, id: &str) {
        let before = self.bookmarks.len();
        self.bookmarks.retain(|b| b.id != id);
        if self.bookmarks.len() == before {
            return;
        }

        if let Err(e) = self.host.remove(id).await {
            eprintln!("[Host] remove({}) request failed: {}", id, e);
        }
    }

    /// Move a bookmark to another folder: updates `parent_id` only, never
    /// the category. No-op if the bookmark id is absent; the target folder
    /// id is not validated here (the host is the source of truth for folder
    /// existence). Host failure is logged, not rolled back.
    pub async fn move_bookmark(&mut self, id: &str, new_folder_id: &str) {
        let Some(bookmark) = self.bookmarks.iter_mut().find(|b| b.id == id) else {
            return;
        };
        bookmark.parent_id = Some(new_folder_id.to_string());

        if let Err(e) = self.host.move_node(id, new_folder_id).await {
            eprintln!("[Host] move({} -> {}) request failed: {}", id, new_folder_id, e);
        }
    }

    /// Create a folder under the given parent. The title is trimmed; an
    /// all-whitespace title is rejected (returns None, collection unchanged).
    pub async fn create_folder(&mut self, parent_id: &str, title: &str) -> Option<Folder> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }

        let folder = match self.host.create_folder(parent_id, title).await {
            Ok(folder) => folder,
            Err(e) => {
                // No host-assigned id to reflect; fall back to a local
                // placeholder so the optimistic view still gains the folder.
                eprintln!("[Host] create_folder({:?}) request failed: {}", title, e);
                Folder {
                    id: uuid::Uuid::new_v4().to_string(),
                    title: title.to_string(),
                }
            }
        };

        self.folders.push(folder.clone());
        Some(folder)
    }

    /// Merge an externally produced id -> category mapping into the
    /// collection. Unmatched bookmarks are untouched.
    pub fn apply_categories(&mut self, mapping: &HashMap<String, String>) {
        merge_categories(&mut self.bookmarks, mapping);
    }

    /// Sample the collection, classify it, and merge the result back.
    /// Returns how many bookmarks were recategorized. Classifier failures
    /// degrade to an empty mapping, so this never fails.
    pub async fn organize(&mut self, classifier: &Classifier) -> usize {
        let sample = sample_for_classification(&self.bookmarks, classifier.batch_size());
        if sample.is_empty() {
            return 0;
        }

        println!("[Session] organizing {} of {} bookmarks", sample.len(), self.bookmarks.len());
        let mapping = classifier.classify(&sample).await;
        let updated = self
            .bookmarks
            .iter()
            .filter(|b| mapping.get(&b.id).is_some_and(|c| *c != b.category))
            .count();
        self.apply_categories(&mapping);
        updated
    }
}
