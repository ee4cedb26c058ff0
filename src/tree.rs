//! Bookmark tree ingestion.
//!
//! Converts the host's nested folder/bookmark tree into a flat bookmark list
//! plus a flat folder list, inheriting category labels from folder ancestry.

use crate::model::{Bookmark, Folder, DEFAULT_CATEGORY};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A node of the host's bookmark tree. The leaf/container distinction is
/// decided once here, at ingestion; downstream code never re-inspects
/// "does this have a url".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTreeNode", into = "RawTreeNode")]
pub enum TreeNode {
    /// A bookmark: has a url.
    Leaf {
        id: String,
        title: String,
        url: String,
        date_added: Option<i64>,
    },
    /// A folder: has children (possibly none).
    Container {
        id: String,
        title: String,
        children: Vec<TreeNode>,
    },
}

impl TreeNode {
    pub fn id(&self) -> &str {
        match self {
            TreeNode::Leaf { id, .. } => id,
            TreeNode::Container { id, .. } => id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            TreeNode::Leaf { title, .. } => title,
            TreeNode::Container { title, .. } => title,
        }
    }
}

/// Wire shape of a host tree node: leaf vs. container is discriminated only
/// by field presence. A node with neither url nor children is treated as an
/// empty container (malformed input is never fatal).
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawTreeNode {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(rename = "dateAdded", skip_serializing_if = "Option::is_none")]
    date_added: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    children: Option<Vec<TreeNode>>,
}

impl From<RawTreeNode> for TreeNode {
    fn from(raw: RawTreeNode) -> Self {
        match raw.url {
            Some(url) => TreeNode::Leaf {
                id: raw.id,
                title: raw.title,
                url,
                date_added: raw.date_added,
            },
            None => TreeNode::Container {
                id: raw.id,
                title: raw.title,
                children: raw.children.unwrap_or_default(),
            },
        }
    }
}

impl From<TreeNode> for RawTreeNode {
    fn from(node: TreeNode) -> Self {
        match node {
            TreeNode::Leaf { id, title, url, date_added } => RawTreeNode {
                id,
                title,
                url: Some(url),
                date_added,
                children: None,
            },
            TreeNode::Container { id, title, children } => RawTreeNode {
                id,
                title,
                url: None,
                date_added: None,
                children: Some(children),
            },
        }
    }
}

/// Flattening configuration.
///
/// `root_ids` names the host's synthetic top-level containers ("Bookmarks
/// Bar", "Other Bookmarks", "Mobile Bookmarks"). They are not user-meaningful
/// folders: their titles are remapped to `default_category` and they are
/// excluded from the emitted folder list.
#[derive(Debug, Clone)]
pub struct FlattenConfig {
    pub root_ids: HashSet<String>,
    pub default_category: String,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        // Chrome's well-known root container ids
        let root_ids = ["0", "1", "2", "3"].iter().map(|s| s.to_string()).collect();
        Self {
            root_ids,
            default_category: DEFAULT_CATEGORY.to_string(),
        }
    }
}

/// Flatten a bookmark tree into flat bookmark and folder lists.
///
/// Depth-first, pre-order, children in host order — this seeds the iteration
/// order of the bookmark list, which callers rely on as the stable default
/// sort. Each leaf takes the title of its nearest enclosing container
/// (root containers remapped per `config`). Duplicate folder ids are
/// tolerated: first occurrence wins.
pub fn flatten(roots: &[TreeNode], config: &FlattenConfig) -> (Vec<Bookmark>, Vec<Folder>) {
    let mut bookmarks = Vec::new();
    let mut folders = Vec::new();
    let mut seen_folders = HashSet::new();

    for node in roots {
        walk(
            node,
            &config.default_category,
            None,
            config,
            &mut bookmarks,
            &mut folders,
            &mut seen_folders,
        );
    }

    (bookmarks, folders)
}

fn walk(
    node: &TreeNode,
    category: &str,
    parent_id: Option<&str>,
    config: &FlattenConfig,
    bookmarks: &mut Vec<Bookmark>,
    folders: &mut Vec<Folder>,
    seen_folders: &mut HashSet<String>,
) {
    match node {
        TreeNode::Leaf { id, title, url, date_added } => {
            bookmarks.push(Bookmark {
                id: id.clone(),
                title: title.clone(),
                url: url.clone(),
                date_added: *date_added,
                category: category.to_string(),
                parent_id: parent_id.map(String::from),
            });
        }
        TreeNode::Container { id, title, children } => {
            let is_root = config.root_ids.contains(id);

            // Untitled folders relabel nothing: their descendants fall back
            // to the default label so every bookmark ends up categorized.
            let effective = if is_root || title.trim().is_empty() {
                config.default_category.as_str()
            } else {
                title.as_str()
            };

            if !is_root && seen_folders.insert(id.clone()) {
                folders.push(Folder {
                    id: id.clone(),
                    title: title.clone(),
                });
            }

            for child in children {
                walk(child, effective, Some(id), config, bookmarks, folders, seen_folders);
            }
        }
    }
}
