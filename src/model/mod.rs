mod tree;
mod record;
mod usage;

pub use tree::{NodeKind, TreeNode};
pub use record::{PathRecord, RecordKind};
pub use usage::{DiskUsage, UsageRow};
