//! Disk usage report
//!
//! Lists the immediate children of a directory with their share of its total,
//! largest first. A file target reports itself as a single row at 100%.

use std::cmp::Ordering;

use crate::error::ReportError;
use crate::model::{DiskUsage, TreeNode, UsageRow};
use crate::util::{format_size, join_path, percent, segment_key, split_path};

/// Walk from the root to `target_path`.
///
/// Fails with `PathNotFound` on a missing segment and `NotADirectory` when a
/// file is reached before the path is exhausted.
pub fn resolve<'a>(root: &'a TreeNode, target_path: &str, fold_case: bool) -> Result<&'a TreeNode, ReportError> {
    let segments = split_path(target_path);
    let mut node = root;

    for (depth, segment) in segments.iter().enumerate() {
        let Some(children) = node.children() else {
            return Err(ReportError::NotADirectory(join_path(&segments[..depth])));
        };
        let key = segment_key(segment, fold_case);
        node = children
            .get(key.as_ref())
            .ok_or_else(|| ReportError::PathNotFound(join_path(&segments[..=depth])))?;
    }

    Ok(node)
}

/// Size descending, then name ascending
fn by_size_then_name(a: &UsageRow, b: &UsageRow) -> Ordering {
    b.size.cmp(&a.size).then_with(|| a.name.cmp(&b.name))
}

fn row(node: &TreeNode, size_percent: f64) -> UsageRow {
    UsageRow {
        name: node.name.clone(),
        is_dir: node.is_dir(),
        size: node.size,
        size_percent,
        size_formatted: format_size(node.size),
        file_count: node.file_count,
    }
}

/// Disk usage of the immediate children of `target_path`
pub fn disk_usage(root: &TreeNode, target_path: &str) -> Result<DiskUsage, ReportError> {
    disk_usage_with(root, target_path, false)
}

/// Like [`disk_usage`], folding the target path's case the way the tree was built
pub fn disk_usage_with(root: &TreeNode, target_path: &str, fold_case: bool) -> Result<DiskUsage, ReportError> {
    let node = resolve(root, target_path, fold_case)?;
    let total = node.size;

    let rows = match node.children() {
        Some(children) => {
            let mut rows: Vec<UsageRow> = children
                .values()
                .map(|child| row(child, percent(child.size, total)))
                .collect();
            rows.sort_by(by_size_then_name);
            rows
        }
        None => vec![row(node, 100.0)],
    };

    Ok(DiskUsage {
        path: join_path(&split_path(target_path)),
        is_dir: node.is_dir(),
        total_size: total,
        total_formatted: format_size(total),
        file_count: node.file_count,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PathRecord;
    use crate::repository::TreeBuilder;

    fn tree(records: &[(&str, u64)]) -> TreeNode {
        let records = records
            .iter()
            .enumerate()
            .map(|(i, (path, size))| Ok(PathRecord::file(*path, *size, i + 1)));
        TreeBuilder::quiet().build(records).root
    }

    fn names(usage: &DiskUsage) -> Vec<String> {
        usage.rows.iter().map(UsageRow::display_name).collect()
    }

    #[test]
    fn test_root_report() {
        let root = tree(&[("/a/x", 10), ("/a/y", 20), ("/b/z", 5)]);
        let usage = disk_usage(&root, "/").unwrap();

        assert_eq!(usage.path, "/");
        assert_eq!(usage.total_size, 35);
        assert_eq!(names(&usage), vec!["a/", "b/"]);
        assert_eq!(usage.rows[0].size, 30);
        assert_eq!(format!("{:.2}", usage.rows[0].size_percent), "85.71");
        assert_eq!(usage.rows[1].size, 5);
        assert_eq!(format!("{:.2}", usage.rows[1].size_percent), "14.29");
    }

    #[test]
    fn test_subdirectory_report() {
        let root = tree(&[("/a/x", 10), ("/a/y", 20), ("/b/z", 5)]);
        let usage = disk_usage(&root, "/a").unwrap();

        assert_eq!(names(&usage), vec!["y", "x"]);
        assert_eq!(usage.rows[0].size_formatted, "20.00 B");
        assert_eq!(usage.file_count, 2);
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let root = tree(&[("/a", 1), ("/b", 2), ("/c/d", 3), ("/c/e", 7), ("/f", 11)]);
        let usage = disk_usage(&root, "/").unwrap();

        let sum: f64 = usage.rows.iter().map(|r| r.size_percent).sum();
        assert!((sum - 100.0).abs() < 1e-9, "sum was {}", sum);
    }

    #[test]
    fn test_ties_are_ordered_by_name() {
        let root = tree(&[("/pear", 5), ("/apple", 5), ("/big", 9), ("/fig", 5)]);
        let usage = disk_usage(&root, "/").unwrap();

        assert_eq!(names(&usage), vec!["big", "apple", "fig", "pear"]);
    }

    #[test]
    fn test_directories_and_files_share_one_ordering() {
        let root = tree(&[("/dir/inner", 50), ("/file", 70), ("/small", 1)]);
        let usage = disk_usage(&root, "/").unwrap();

        assert_eq!(names(&usage), vec!["file", "dir/", "small"]);
    }

    #[test]
    fn test_empty_directory() {
        let records = vec![Ok(PathRecord::directory("/empty", 1))];
        let root = TreeBuilder::quiet().build(records).root;
        let usage = disk_usage(&root, "/empty").unwrap();

        assert_eq!(usage.total_size, 0);
        assert!(usage.rows.is_empty());
    }

    #[test]
    fn test_zero_total_does_not_divide_by_zero() {
        let records = vec![
            Ok(PathRecord::directory("/d/empty", 1)),
            Ok(PathRecord::file("/d/zero", 0, 2)),
        ];
        let root = TreeBuilder::quiet().build(records).root;
        let usage = disk_usage(&root, "/d").unwrap();

        assert_eq!(names(&usage), vec!["empty/", "zero"]);
        for row in &usage.rows {
            assert_eq!(row.size, 0);
            assert_eq!(row.size_percent, 0.0);
        }
    }

    #[test]
    fn test_empty_tree_root() {
        let root = tree(&[]);
        let usage = disk_usage(&root, "/").unwrap();

        assert_eq!(usage.total_size, 0);
        assert!(usage.rows.is_empty());
    }

    #[test]
    fn test_missing_path() {
        let root = tree(&[("/a/x", 10)]);

        assert_eq!(
            disk_usage(&root, "/does/not/exist").unwrap_err(),
            ReportError::PathNotFound("/does".to_string())
        );
        assert_eq!(
            disk_usage(&root, "/a/nope").unwrap_err(),
            ReportError::PathNotFound("/a/nope".to_string())
        );
    }

    #[test]
    fn test_file_target_lists_itself() {
        let root = tree(&[("/a/x", 10), ("/a/y", 20)]);
        let usage = disk_usage(&root, "/a/x").unwrap();

        assert!(!usage.is_dir);
        assert_eq!(usage.total_size, 10);
        assert_eq!(usage.rows.len(), 1);
        assert_eq!(usage.rows[0].name, "x");
        assert_eq!(usage.rows[0].size, 10);
        assert_eq!(usage.rows[0].size_percent, 100.0);
    }

    #[test]
    fn test_path_through_file_is_not_a_directory() {
        let root = tree(&[("/a/x", 10)]);

        assert_eq!(
            disk_usage(&root, "/a/x/deeper").unwrap_err(),
            ReportError::NotADirectory("/a/x".to_string())
        );
    }

    #[test]
    fn test_target_path_is_normalized() {
        let root = tree(&[("/a/x", 10)]);
        let usage = disk_usage(&root, "a//").unwrap();

        assert_eq!(usage.path, "/a");
        assert_eq!(usage.rows.len(), 1);
    }

    #[test]
    fn test_fold_case_resolution() {
        let records = vec![Ok(PathRecord::file("/Photos/A.jpg", 10, 1))];
        let root = TreeBuilder::quiet().fold_case(true).build(records).root;

        let usage = disk_usage_with(&root, "/PHOTOS", true).unwrap();
        assert_eq!(names(&usage), vec!["a.jpg"]);
        assert!(disk_usage(&root, "/PHOTOS").is_err());
    }

    #[test]
    fn test_report_leaves_tree_untouched() {
        let root = tree(&[("/a/x", 10), ("/b", 3)]);
        let before = root.clone();
        let _ = disk_usage(&root, "/a").unwrap();
        assert_eq!(root, before);
    }
}
