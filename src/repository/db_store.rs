//! SQLite implementation of TreeStore
//!
//! One database file per key. Saves go to a sibling temp file that is renamed
//! over the artifact once complete, so a reader never sees half a tree.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::CacheError;
use crate::model::TreeNode;
use crate::repository::Database;

use super::store::{StoredTree, TreeMeta, TreeStore};

/// Stores each tree as its own SQLite file at the key path
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteStore;

fn temp_path(key: &Path) -> PathBuf {
    let mut name = key.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    key.with_file_name(name)
}

impl TreeStore for SqliteStore {
    async fn load(&self, key: &Path) -> Result<Option<StoredTree>, CacheError> {
        if !key.exists() {
            return Ok(None);
        }

        let db = Database::open_read_only(key).await?;
        let loaded = db.load_tree().await;
        db.close().await;

        let (root, meta) = loaded?;
        Ok(Some(StoredTree { root, meta }))
    }

    async fn save(&self, key: &Path, root: &TreeNode, meta: TreeMeta) -> Result<(), CacheError> {
        let tmp = temp_path(key);
        if tmp.exists() {
            std::fs::remove_file(&tmp)?;
        }

        let db = Database::create(&tmp).await?;
        let written = match db.init_schema().await {
            Ok(_) => db.save_tree(root, meta).await,
            Err(e) => Err(e),
        };
        db.close().await;
        if let Err(e) = written {
            let _ = std::fs::remove_file(&tmp);
            return Err(e);
        }

        if std::fs::rename(&tmp, key).is_err() {
            // Some platforms refuse to rename over an existing file
            std::fs::remove_file(key)?;
            std::fs::rename(&tmp, key)?;
        }
        debug!("Wrote tree cache {}", key.display());
        Ok(())
    }
}
