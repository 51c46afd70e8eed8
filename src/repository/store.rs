//! Tree store trait for persistence abstraction
//!
//! Decouples the caching policy from the artifact format, so the policy can
//! be tested without touching SQLite.

use std::path::Path;

use crate::error::CacheError;
use crate::model::TreeNode;

/// Facts recorded next to a cached tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeMeta {
    /// Unix timestamp of the build
    pub built_at: i64,
    /// Whether names were lower-cased during the build
    pub fold_case: bool,
}

/// A tree read back from a store
#[derive(Debug, Clone)]
pub struct StoredTree {
    pub root: TreeNode,
    pub meta: TreeMeta,
}

/// Persistence layer for built trees, keyed by artifact path
#[allow(async_fn_in_trait)]
pub trait TreeStore {
    /// Load the tree stored under `key`.
    ///
    /// `Ok(None)` means nothing is stored there. Any error means the artifact
    /// exists but cannot be used.
    async fn load(&self, key: &Path) -> Result<Option<StoredTree>, CacheError>;

    /// Store `root` under `key`, replacing whatever was there
    async fn save(&self, key: &Path, root: &TreeNode, meta: TreeMeta) -> Result<(), CacheError>;
}
