//! Tree builder
//!
//! Turns flat index records into a directory tree. Intermediate segments
//! become directories on demand, the last segment becomes the file (or an
//! empty directory for a marker line). Bad records are skipped and logged;
//! the build itself never fails.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::RecordError;
use crate::model::{NodeKind, PathRecord, RecordKind, TreeNode};
use crate::util::{segment_key, split_path};

use super::progress::{ProgressReporter, VerboseProgress};

/// What happened while building
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub records: usize,
    pub files: usize,
    pub directories: usize,
    pub malformed: usize,
    pub conflicts: usize,
    /// File paths seen more than once (the last size wins)
    pub duplicates: usize,
    pub nodes: usize,
}

impl BuildStats {
    pub fn skipped(&self) -> usize {
        self.malformed + self.conflicts
    }
}

/// A fully aggregated tree together with its build statistics
#[derive(Debug, Clone)]
pub struct BuiltTree {
    pub root: TreeNode,
    pub stats: BuildStats,
}

enum Inserted {
    New,
    Existing,
    Replaced,
}

/// Builds trees from index records
pub struct TreeBuilder {
    verbose: bool,
    fold_case: bool,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self { verbose: true, fold_case: false }
    }

    /// Create a quiet builder (no progress bar, used by tests and benchmarks)
    pub fn quiet() -> Self {
        Self { verbose: false, fold_case: false }
    }

    /// Lower-case every segment, merging names that differ only by case
    pub fn fold_case(mut self, fold_case: bool) -> Self {
        self.fold_case = fold_case;
        self
    }

    pub fn folds_case(&self) -> bool {
        self.fold_case
    }

    /// Build a tree from records, skipping (and logging) the ones that cannot be applied
    pub fn build<I>(&self, records: I) -> BuiltTree
    where
        I: IntoIterator<Item = Result<PathRecord, RecordError>>,
    {
        self.build_with_progress(records, &VerboseProgress::new(self.verbose))
    }

    pub fn build_with_progress<I>(&self, records: I, progress: &dyn ProgressReporter) -> BuiltTree
    where
        I: IntoIterator<Item = Result<PathRecord, RecordError>>,
    {
        let start = Instant::now();
        let records = records.into_iter();
        let (low, high) = records.size_hint();
        let pb = progress.start("Building tree", high.unwrap_or(low) as u64);

        let mut root = TreeNode::root();
        let mut stats = BuildStats::default();

        for record in records {
            pb.inc(1);
            stats.records += 1;
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    warn!("skipping {}", e);
                    stats.malformed += 1;
                    continue;
                }
            };

            match self.insert(&mut root, &record) {
                Ok(Inserted::New) | Ok(Inserted::Existing) => match record.kind {
                    RecordKind::File { .. } => stats.files += 1,
                    RecordKind::Directory => stats.directories += 1,
                },
                Ok(Inserted::Replaced) => {
                    warn!("line {}: duplicate file {}, keeping the later size", record.line, record.path);
                    stats.duplicates += 1;
                }
                Err(e @ RecordError::Malformed { .. }) => {
                    warn!("skipping {}", e);
                    stats.malformed += 1;
                }
                Err(e @ RecordError::KindConflict { .. }) => {
                    warn!("skipping {}", e);
                    stats.conflicts += 1;
                }
            }
        }
        pb.finish();

        root.compute_totals();
        stats.nodes = root.node_count();

        debug!("Built tree of {} nodes in {:?}", stats.nodes, start.elapsed());
        if stats.skipped() > 0 {
            info!(
                "Skipped {} records ({} malformed, {} conflicting)",
                stats.skipped(),
                stats.malformed,
                stats.conflicts
            );
        }

        BuiltTree { root, stats }
    }

    /// Walk from the root to the record's parent, creating directories on
    /// demand, then place the last segment.
    ///
    /// A conflict can only be met on a node that already existed, and once a
    /// segment is missing every later segment is new, so a rejected record
    /// never leaves directories behind.
    fn insert(&self, root: &mut TreeNode, record: &PathRecord) -> Result<Inserted, RecordError> {
        let segments = split_path(&record.path);
        let Some((last, parents)) = segments.split_last() else {
            return match record.kind {
                // "/" itself: the root always exists
                RecordKind::Directory => Ok(Inserted::Existing),
                RecordKind::File { .. } => Err(RecordError::Malformed {
                    line: record.line,
                    reason: "file record has no name".to_string(),
                }),
            };
        };

        let conflict = |existing: &'static str| RecordError::KindConflict {
            line: record.line,
            path: record.path.clone(),
            existing,
        };

        let mut node = root;
        for segment in parents {
            let key = segment_key(segment, self.fold_case);
            let NodeKind::Directory(children) = &mut node.kind else {
                return Err(conflict("file"));
            };
            node = children
                .entry(key.to_string())
                .or_insert_with(|| TreeNode::directory(&key));
        }

        let NodeKind::Directory(children) = &mut node.kind else {
            return Err(conflict("file"));
        };
        let key = segment_key(last, self.fold_case);
        let existing = children.get(key.as_ref()).map(|n| (n.is_dir(), n.kind_label()));

        match (record.kind, existing) {
            (RecordKind::File { size }, None) => {
                children.insert(key.to_string(), TreeNode::file(&key, size));
                Ok(Inserted::New)
            }
            (RecordKind::File { size }, Some((false, _))) => {
                if let Some(existing) = children.get_mut(key.as_ref()) {
                    existing.size = size;
                }
                Ok(Inserted::Replaced)
            }
            (RecordKind::Directory, None) => {
                children.insert(key.to_string(), TreeNode::directory(&key));
                Ok(Inserted::New)
            }
            (RecordKind::Directory, Some((true, _))) => Ok(Inserted::Existing),
            (_, Some((_, label))) => Err(conflict(label)),
        }
    }
}
