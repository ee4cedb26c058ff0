//! Cosmos — bookmark ingestion, search, and AI categorization core.
//!
//! Flattens a host-supplied bookmark/folder tree into a flat queryable
//! collection, derives search and category-count views from it, merges
//! AI-assigned categories back in, and applies optimistic delete / move /
//! create-folder mutations against an injected host capability.

pub mod classify;
pub mod host;
pub mod model;
pub mod query;
pub mod session;
pub mod settings;
pub mod tree;

pub use model::{Bookmark, CategoryCount, Folder, ALL_CATEGORIES, DEFAULT_CATEGORY};
pub use session::BookmarkSession;
pub use tree::{FlattenConfig, TreeNode};
