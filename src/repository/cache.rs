//! Tree cache
//!
//! Reuses a previously built tree for the same index unless a rebuild is
//! forced. There is no content-change detection: a modified index keeps
//! hitting the old artifact until `force` is set or the artifact is deleted.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::RecordError;
use crate::model::{PathRecord, TreeNode};
use crate::util::{format_timestamp, now_timestamp};

use super::builder::{BuildStats, TreeBuilder};
use super::db_store::SqliteStore;
use super::store::{TreeMeta, TreeStore};

/// Cache artifact location for an index: `<dir>/<stem>_tree.db`
pub fn artifact_path_for(index: &Path) -> PathBuf {
    let stem = index
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "index".to_string());
    index.with_file_name(format!("{}_tree.db", stem))
}

/// Where a tree came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeOrigin {
    Cache { built_at: i64 },
    Built { stats: BuildStats },
}

#[derive(Debug, Clone)]
pub struct LoadedTree {
    pub root: TreeNode,
    pub origin: TreeOrigin,
}

impl LoadedTree {
    pub fn from_cache(&self) -> bool {
        matches!(self.origin, TreeOrigin::Cache { .. })
    }
}

/// Load-or-build policy over a [`TreeStore`]
pub struct TreeCache<S: TreeStore = SqliteStore> {
    store: S,
}

impl<S: TreeStore> TreeCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Return the tree cached under `key`, or build one from `records` and cache it.
    ///
    /// `records` is only called when building: when `force` is set, when
    /// nothing is cached, or when the cached artifact is unusable (which is
    /// logged, not returned). Errors from `records` are returned as-is.
    /// Failing to write the new artifact is logged and the built tree is
    /// still returned.
    pub async fn load_or_build<F, R>(
        &self,
        key: &Path,
        force: bool,
        builder: &TreeBuilder,
        records: F,
    ) -> Result<LoadedTree>
    where
        F: FnOnce() -> Result<R>,
        R: IntoIterator<Item = Result<PathRecord, RecordError>>,
    {
        if force {
            info!("Forced rebuild, ignoring cached tree {}", key.display());
        } else {
            match self.store.load(key).await {
                Ok(Some(stored)) if stored.meta.fold_case == builder.folds_case() => {
                    info!(
                        "Loaded cached tree from {} (built {})",
                        key.display(),
                        format_timestamp(stored.meta.built_at)
                    );
                    return Ok(LoadedTree {
                        root: stored.root,
                        origin: TreeOrigin::Cache { built_at: stored.meta.built_at },
                    });
                }
                Ok(Some(_)) => {
                    info!("Cached tree {} was built with different case folding, rebuilding", key.display());
                }
                Ok(None) => debug!("No cached tree at {}", key.display()),
                Err(e) => warn!("{}, rebuilding", e),
            }
        }

        let records = records()?;
        let start = Instant::now();
        info!("Building tree from index...");
        let built = builder.build(records);
        info!(
            "Built tree: {} files, {} directories in {:?}",
            built.stats.files,
            built.stats.nodes.saturating_sub(built.stats.files),
            start.elapsed()
        );

        let meta = TreeMeta { built_at: now_timestamp(), fold_case: builder.folds_case() };
        match self.store.save(key, &built.root, meta).await {
            Ok(()) => info!("Saved tree: {}", key.display()),
            Err(e) => warn!("Could not save tree cache {}: {}", key.display(), e),
        }

        Ok(LoadedTree {
            root: built.root,
            origin: TreeOrigin::Built { stats: built.stats },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_sits_next_to_index() {
        assert_eq!(
            artifact_path_for(Path::new("/data/dropbox-root.ls")),
            PathBuf::from("/data/dropbox-root_tree.db")
        );
        assert_eq!(artifact_path_for(Path::new("index")), PathBuf::from("index_tree.db"));
    }

    #[test]
    fn test_artifact_differs_per_index() {
        assert_ne!(
            artifact_path_for(Path::new("/data/a.ls")),
            artifact_path_for(Path::new("/data/b.ls"))
        );
    }
}
