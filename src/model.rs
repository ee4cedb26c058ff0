use serde::{Deserialize, Serialize};

/// Category label assigned when a bookmark has no meaningful folder ancestry
/// (direct child of a synthetic root container, or missing category in
/// imported data).
pub const DEFAULT_CATEGORY: &str = "General";

/// Sentinel category meaning "no category filter".
pub const ALL_CATEGORIES: &str = "All";

/// A flattened bookmark. `id` is host-assigned and stable for the session;
/// `title` may be empty (display fallback is a presentation concern).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(rename = "dateAdded")]
    pub date_added: Option<i64>,
    pub category: String,
    #[serde(rename = "parentId")]
    pub parent_id: Option<String>,
}

/// A user-meaningful folder. Its title doubles as the category label its
/// direct bookmark children inherit during flattening.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Folder {
    pub id: String,
    pub title: String,
}

/// Derived per-category population. Recomputed from the bookmark collection,
/// never stored or mutated directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}
