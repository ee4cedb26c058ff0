//! Host bookmark provider.
//!
//! The host owns durable bookmark storage; this core only models the
//! resulting data and the requests made to it. Which host backs a session is
//! decided once at startup and injected, never probed ad hoc: `MockHost`
//! serves the canned demo dataset, `FileHost` serves a JSON tree file.
//! `import_chrome_bookmarks` converts a Chrome profile `Bookmarks` file into
//! the host tree shape.

use crate::model::Folder;
use crate::tree::TreeNode;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// The capability a session needs from its host platform.
///
/// All calls are single-shot async operations with no cancellation support.
/// Serialization of concurrent mutations is the host's responsibility.
pub trait BookmarkHost {
    fn fetch_tree(&self) -> impl std::future::Future<Output = Result<Vec<TreeNode>, String>> + Send;
    fn remove(&mut self, id: &str) -> impl std::future::Future<Output = Result<(), String>> + Send;
    fn move_node(
        &mut self,
        id: &str,
        new_parent_id: &str,
    ) -> impl std::future::Future<Output = Result<(), String>> + Send;
    fn create_folder(
        &mut self,
        parent_id: &str,
        title: &str,
    ) -> impl std::future::Future<Output = Result<Folder, String>> + Send;
}

// ==================== Tree editing helpers ====================

/// Detach the node with `id` from the tree, returning it if found.
fn detach_node(nodes: &mut Vec<TreeNode>, id: &str) -> Option<TreeNode> {
    if let Some(pos) = nodes.iter().position(|n| n.id() == id) {
        return Some(nodes.remove(pos));
    }
    for node in nodes.iter_mut() {
        if let TreeNode::Container { children, .. } = node {
            if let Some(found) = detach_node(children, id) {
                return Some(found);
            }
        }
    }
    None
}

/// Append `child` to the container with `parent_id`. Returns false if no
/// such container exists.
fn attach_node(nodes: &mut [TreeNode], parent_id: &str, child: TreeNode) -> bool {
    for node in nodes.iter_mut() {
        if let TreeNode::Container { id, children, .. } = node {
            if id == parent_id {
                children.push(child);
                return true;
            }
            if attach_node(children, parent_id, child.clone()) {
                return true;
            }
        }
    }
    false
}

// ==================== Mock host ====================

/// In-memory host with the demo dataset. Lets the whole pipeline run
/// standalone, without a browser profile or API key.
pub struct MockHost {
    tree: Vec<TreeNode>,
}

impl MockHost {
    pub fn new() -> Self {
        Self { tree: mock_tree() }
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl BookmarkHost for MockHost {
    async fn fetch_tree(&self) -> Result<Vec<TreeNode>, String> {
        Ok(self.tree.clone())
    }

    async fn remove(&mut self, id: &str) -> Result<(), String> {
        detach_node(&mut self.tree, id)
            .map(|_| ())
            .ok_or_else(|| format!("No such bookmark: {}", id))
    }

    async fn move_node(&mut self, id: &str, new_parent_id: &str) -> Result<(), String> {
        let node = detach_node(&mut self.tree, id).ok_or_else(|| format!("No such bookmark: {}", id))?;
        if !attach_node(&mut self.tree, new_parent_id, node) {
            return Err(format!("No such folder: {}", new_parent_id));
        }
        Ok(())
    }

    async fn create_folder(&mut self, parent_id: &str, title: &str) -> Result<Folder, String> {
        let folder = Folder {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
        };
        let node = TreeNode::Container {
            id: folder.id.clone(),
            title: folder.title.clone(),
            children: Vec::new(),
        };
        if !attach_node(&mut self.tree, parent_id, node) {
            return Err(format!("No such folder: {}", parent_id));
        }
        Ok(folder)
    }
}

fn mock_leaf(id: &str, title: &str, url: &str, date_added: i64) -> TreeNode {
    TreeNode::Leaf {
        id: id.to_string(),
        title: title.to_string(),
        url: url.to_string(),
        date_added: Some(date_added),
    }
}

fn mock_folder(id: &str, title: &str, children: Vec<TreeNode>) -> TreeNode {
    TreeNode::Container {
        id: id.to_string(),
        title: title.to_string(),
        children,
    }
}

/// The demo bookmark tree
fn mock_tree() -> Vec<TreeNode> {
    vec![mock_folder(
        "1",
        "Bookmarks Bar",
        vec![
            mock_folder(
                "11",
                "Development",
                vec![
                    mock_leaf("101", "React Documentation", "https://reactjs.org", 1678880000000),
                    mock_leaf("104", "GitHub", "https://github.com", 1678910000000),
                    mock_leaf("108", "MDN Web Docs", "https://developer.mozilla.org", 1678950000000),
                ],
            ),
            mock_folder(
                "12",
                "Design",
                vec![
                    mock_leaf("102", "Tailwind CSS", "https://tailwindcss.com", 1678890000000),
                    mock_leaf("105", "Dribbble", "https://dribbble.com", 1678920000000),
                    mock_leaf("109", "Figma", "https://figma.com", 1678960000000),
                ],
            ),
            mock_folder(
                "13",
                "AI",
                vec![mock_leaf(
                    "103",
                    "Google Gemini",
                    "https://deepmind.google/technologies/gemini/",
                    1678900000000,
                )],
            ),
            mock_folder(
                "14",
                "Entertainment",
                vec![
                    mock_leaf("106", "YouTube", "https://youtube.com", 1678930000000),
                    mock_leaf("107", "Netflix", "https://netflix.com", 1678940000000),
                ],
            ),
            mock_folder(
                "15",
                "Hosting",
                vec![mock_leaf("110", "Vercel", "https://vercel.com", 1678970000000)],
            ),
        ],
    )]
}

// ==================== File host ====================

/// Host backed by a JSON tree file. Each mutation rewrites the file, so the
/// durable copy tracks the requests made of it.
pub struct FileHost {
    path: PathBuf,
    tree: Vec<TreeNode>,
}

impl FileHost {
    /// Open an existing tree file
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, String> {
        let path = path.into();
        let tree = read_tree(&path)?;
        Ok(Self { path, tree })
    }

    /// Create a tree file from an in-memory tree (used by the importer)
    pub fn create(path: impl Into<PathBuf>, tree: Vec<TreeNode>) -> Result<Self, String> {
        let path = path.into();
        write_tree(&path, &tree)?;
        Ok(Self { path, tree })
    }

    fn save(&self) -> Result<(), String> {
        write_tree(&self.path, &self.tree)
    }
}

fn read_tree(path: &Path) -> Result<Vec<TreeNode>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read bookmark tree {:?}: {}", path, e))?;
    serde_json::from_str(&content).map_err(|e| format!("Failed to parse bookmark tree: {}", e))
}

fn write_tree(path: &Path, tree: &[TreeNode]) -> Result<(), String> {
    let content = serde_json::to_string_pretty(tree)
        .map_err(|e| format!("Failed to serialize bookmark tree: {}", e))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create tree directory: {}", e))?;
    }
    fs::write(path, content).map_err(|e| format!("Failed to write bookmark tree {:?}: {}", path, e))
}

impl BookmarkHost for FileHost {
    async fn fetch_tree(&self) -> Result<Vec<TreeNode>, String> {
        Ok(self.tree.clone())
    }

    async fn remove(&mut self, id: &str) -> Result<(), String> {
        detach_node(&mut self.tree, id).ok_or_else(|| format!("No such bookmark: {}", id))?;
        self.save()
    }

    async fn move_node(&mut self, id: &str, new_parent_id: &str) -> Result<(), String> {
        let node = detach_node(&mut self.tree, id).ok_or_else(|| format!("No such bookmark: {}", id))?;
        if !attach_node(&mut self.tree, new_parent_id, node) {
            return Err(format!("No such folder: {}", new_parent_id));
        }
        self.save()
    }

    async fn create_folder(&mut self, parent_id: &str, title: &str) -> Result<Folder, String> {
        let folder = Folder {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
        };
        let node = TreeNode::Container {
            id: folder.id.clone(),
            title: folder.title.clone(),
            children: Vec::new(),
        };
        if !attach_node(&mut self.tree, parent_id, node) {
            return Err(format!("No such folder: {}", parent_id));
        }
        self.save()?;
        Ok(folder)
    }
}

// ==================== Chrome profile import ====================

// Chrome/Edge bookmarks JSON structure
#[derive(Deserialize)]
struct ChromeBookmarks {
    roots: ChromeRoots,
}

#[derive(Deserialize)]
struct ChromeRoots {
    bookmark_bar: ChromeNode,
    other: ChromeNode,
    synced: Option<ChromeNode>,
}

#[derive(Deserialize)]
struct ChromeNode {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    node_type: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    date_added: Option<String>,
    #[serde(default)]
    children: Vec<ChromeNode>,
}

/// Convert Chrome's timestamp (microseconds since 1601-01-01, as a string)
/// to unix milliseconds.
fn chrome_time_to_unix_ms(raw: &str) -> Option<i64> {
    let micros: i64 = raw.parse().ok()?;
    if micros == 0 {
        return None;
    }
    Some((micros / 1000) - 11_644_473_600_000)
}

fn convert_chrome_node(node: &ChromeNode) -> Option<TreeNode> {
    match node.node_type.as_str() {
        "url" if !node.url.is_empty() => Some(TreeNode::Leaf {
            id: node.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string()),
            title: node.name.clone(),
            url: node.url.clone(),
            date_added: node.date_added.as_deref().and_then(chrome_time_to_unix_ms),
        }),
        "folder" => Some(TreeNode::Container {
            id: node.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string()),
            title: node.name.clone(),
            children: node.children.iter().filter_map(convert_chrome_node).collect(),
        }),
        _ => None,
    }
}

fn convert_chrome_root(node: &ChromeNode, root_id: &str, title: &str) -> TreeNode {
    TreeNode::Container {
        id: root_id.to_string(),
        title: title.to_string(),
        children: node.children.iter().filter_map(convert_chrome_node).collect(),
    }
}

/// Read a Chrome profile `Bookmarks` file and convert it into the host tree
/// shape, with the well-known root container ids.
pub fn import_chrome_bookmarks(path: &Path) -> Result<Vec<TreeNode>, String> {
    let data = fs::read_to_string(path).map_err(|e| format!("Failed to read bookmarks: {}", e))?;
    let parsed: ChromeBookmarks =
        serde_json::from_str(&data).map_err(|e| format!("Failed to parse bookmarks: {}", e))?;

    let mut roots = vec![
        convert_chrome_root(&parsed.roots.bookmark_bar, "1", "Bookmarks Bar"),
        convert_chrome_root(&parsed.roots.other, "2", "Other Bookmarks"),
    ];
    if let Some(synced) = &parsed.roots.synced {
        roots.push(convert_chrome_root(synced, "3", "Mobile Bookmarks"));
    }
    Ok(roots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{flatten, FlattenConfig};

    #[tokio::test]
    async fn test_mock_host_serves_demo_data() {
        let host = MockHost::new();
        let tree = host.fetch_tree().await.unwrap();
        let (bookmarks, folders) = flatten(&tree, &FlattenConfig::default());
        assert_eq!(bookmarks.len(), 10);
        assert_eq!(folders.len(), 5);
        assert!(bookmarks.iter().any(|b| b.title == "GitHub" && b.category == "Development"));
    }

    #[tokio::test]
    async fn test_mock_host_remove_and_move() {
        let mut host = MockHost::new();
        host.remove("107").await.unwrap();
        assert!(host.remove("107").await.is_err());

        // Move YouTube into the Design folder
        host.move_node("106", "12").await.unwrap();
        let tree = host.fetch_tree().await.unwrap();
        let (bookmarks, _) = flatten(&tree, &FlattenConfig::default());
        let youtube = bookmarks.iter().find(|b| b.id == "106").unwrap();
        assert_eq!(youtube.parent_id.as_deref(), Some("12"));
    }

    #[tokio::test]
    async fn test_mock_host_create_folder() {
        let mut host = MockHost::new();
        let folder = host.create_folder("1", "Reading List").await.unwrap();
        let tree = host.fetch_tree().await.unwrap();
        let (_, folders) = flatten(&tree, &FlattenConfig::default());
        assert!(folders.iter().any(|f| f.id == folder.id && f.title == "Reading List"));
    }

    #[tokio::test]
    async fn test_file_host_persists_mutations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.json");

        let mut host = FileHost::create(&path, mock_tree()).unwrap();
        host.remove("110").await.unwrap();

        // Reopen from disk: the mutation must have been written through
        let reopened = FileHost::open(&path).unwrap();
        let tree = reopened.fetch_tree().await.unwrap();
        let (bookmarks, _) = flatten(&tree, &FlattenConfig::default());
        assert_eq!(bookmarks.len(), 9);
        assert!(!bookmarks.iter().any(|b| b.id == "110"));
    }

    #[test]
    fn test_import_chrome_bookmarks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Bookmarks");
        fs::write(
            &path,
            r#"{
                "roots": {
                    "bookmark_bar": {
                        "name": "Bookmarks bar", "type": "folder",
                        "children": [
                            {"id": "5", "name": "Dev", "type": "folder", "children": [
                                {"id": "6", "name": "GitHub", "type": "url",
                                 "url": "https://github.com", "date_added": "13390000000000000"}
                            ]}
                        ]
                    },
                    "other": {"name": "Other bookmarks", "type": "folder", "children": []}
                }
            }"#,
        )
        .unwrap();

        let tree = import_chrome_bookmarks(&path).unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].id(), "1");

        let (bookmarks, folders) = flatten(&tree, &FlattenConfig::default());
        assert_eq!(bookmarks.len(), 1);
        assert_eq!(bookmarks[0].title, "GitHub");
        assert_eq!(bookmarks[0].category, "Dev");
        assert!(bookmarks[0].date_added.is_some());
        assert_eq!(folders.len(), 1);
    }

    #[test]
    fn test_chrome_time_conversion() {
        // 0 and garbage both map to None
        assert_eq!(chrome_time_to_unix_ms("0"), None);
        assert_eq!(chrome_time_to_unix_ms("not a number"), None);
        // 11644473600000000 us is the unix epoch in Chrome time
        assert_eq!(chrome_time_to_unix_ms("11644473600000000"), Some(0));
    }

    #[test]
    fn test_detach_and_attach() {
        let mut tree = mock_tree();
        let node = detach_node(&mut tree, "103").unwrap();
        assert_eq!(node.title(), "Google Gemini");
        assert!(detach_node(&mut tree, "103").is_none());
        assert!(attach_node(&mut tree, "11", node));
        assert!(!attach_node(
            &mut tree,
            "nonexistent",
            TreeNode::Container { id: "x".into(), title: "x".into(), children: vec![] }
        ));
    }
}
