mod builder;
mod cache;
mod database;
mod db_store;
mod index;
mod progress;
mod store;

pub use builder::{BuildStats, BuiltTree, TreeBuilder};
pub use cache::{artifact_path_for, LoadedTree, TreeCache, TreeOrigin};
pub use database::{Database, NodeRecord};
pub use db_store::SqliteStore;
pub use index::{parse_line, IndexFile, IndexStats, Records};
pub use progress::{IndicatifProgress, NoopProgress, ProgressHandle, ProgressReporter, VerboseProgress};
pub use store::{StoredTree, TreeMeta, TreeStore};
