// Shared test fixtures for integration tests
// Functions here are used across different test files
#![allow(dead_code)]

use indexdu::error::CacheError;
use indexdu::model::TreeNode;
use indexdu::repository::{StoredTree, TreeMeta, TreeStore};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// The three-record index used throughout: /a/x=10, /a/y=20, /b/z=5
pub const SAMPLE_INDEX: &str = "\t/a\n10\t/a/x\n20\t/a/y\n\t/b\n5\t/b/z\n";

/// Write an index file into a fresh temp directory
pub fn write_index(content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("account.ls");
    std::fs::write(&path, content).unwrap();
    (dir, path)
}

/// Sum of all file sizes below `node`, walked independently of the stored totals
pub fn sum_of_files(node: &TreeNode) -> u64 {
    let mut total = 0;
    node.visit_files(|_, file| total += file.size);
    if !node.is_dir() {
        total = node.size;
    }
    total
}

/// Check the aggregation invariant on every directory of a tree
pub fn assert_aggregates(root: &TreeNode) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if let Some(children) = node.children() {
            let direct: u64 = children.values().map(|c| c.size).sum();
            assert_eq!(node.size, direct, "directory {:?}", node.name);
            assert_eq!(node.size, sum_of_files(node), "directory {:?}", node.name);
            stack.extend(children.values());
        }
    }
}

/// In-memory TreeStore that counts calls, for exercising the cache policy
#[derive(Default)]
pub struct MemoryStore {
    pub trees: RefCell<HashMap<PathBuf, StoredTree>>,
    pub corrupt: RefCell<Vec<PathBuf>>,
    pub fail_saves: Cell<bool>,
    pub saves: Cell<usize>,
}

impl TreeStore for MemoryStore {
    async fn load(&self, key: &Path) -> Result<Option<StoredTree>, CacheError> {
        if self.corrupt.borrow().iter().any(|p| p == key) {
            return Err(CacheError::Corrupt {
                path: key.to_path_buf(),
                reason: "test corruption".to_string(),
            });
        }
        Ok(self.trees.borrow().get(key).cloned())
    }

    async fn save(&self, key: &Path, root: &TreeNode, meta: TreeMeta) -> Result<(), CacheError> {
        self.saves.set(self.saves.get() + 1);
        if self.fail_saves.get() {
            return Err(CacheError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )));
        }
        self.corrupt.borrow_mut().retain(|p| p != key);
        self.trees
            .borrow_mut()
            .insert(key.to_path_buf(), StoredTree { root: root.clone(), meta });
        Ok(())
    }
}
