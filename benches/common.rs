// Shared benchmark helpers
// Functions here are used across different benchmark files
#![allow(dead_code)]

use indexdu::model::TreeNode;
use indexdu::repository::{Database, IndexFile, TreeBuilder};

/// Generate index text with N file lines spread over nested directories
pub fn generate_index(num_paths: usize) -> String {
    let dirs = ["Photos", "Documents", "Music", "Backups", "Projects"];
    let mut out = String::with_capacity(num_paths * 48);

    for i in 0..num_paths {
        let depth = (i % 5) + 1;
        let mut path = String::new();
        for dir in &dirs[..depth] {
            path.push_str(&format!("/{}_{}", dir, i / 1000));
        }
        out.push_str(&format!("{}\t{}/file_{}.dat\n", i * 100, path, i));
    }
    out
}

/// Generate a fully aggregated tree with N files
pub fn generate_tree(num_paths: usize) -> TreeNode {
    let index = IndexFile::from_text("bench.ls", generate_index(num_paths));
    TreeBuilder::quiet().build(index.records()).root
}

/// Create in-memory database for benchmarks
pub async fn setup_bench_db() -> Database {
    let db = Database::in_memory().await.unwrap();
    db.init_schema().await.unwrap();
    db
}
