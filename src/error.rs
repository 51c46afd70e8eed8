//! Error types for indexdu.
//!
//! Record errors are recovered during a build (the record is skipped and a
//! warning logged). Source and report errors are terminal for the run.
//! Cache errors never reach the user; they trigger a rebuild.

use std::path::PathBuf;

/// A single index record that could not be applied to the tree.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The line could not be parsed as `<size>\t<path>` or `\t<path>`.
    #[error("line {line}: malformed record: {reason}")]
    Malformed { line: usize, reason: String },

    /// The path is used both as a file and as a directory.
    #[error("line {line}: {path} conflicts with an existing {existing}")]
    KindConflict {
        line: usize,
        path: String,
        existing: &'static str,
    },
}

/// The index source itself could not be read.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("cannot read index {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The cache artifact could not be used.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The artifact exists but does not describe a valid tree.
    #[error("corrupt cache artifact {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Sql(#[from] sqlx::Error),
}

/// Resolution of the report target failed.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("path not found: {0}")]
    PathNotFound(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_displays_line_and_reason() {
        let err = RecordError::Malformed {
            line: 7,
            reason: "invalid size \"abc\"".to_string(),
        };
        assert_eq!(err.to_string(), "line 7: malformed record: invalid size \"abc\"");
    }

    #[test]
    fn kind_conflict_displays_path() {
        let err = RecordError::KindConflict {
            line: 3,
            path: "/a/x".to_string(),
            existing: "directory",
        };
        assert_eq!(err.to_string(), "line 3: /a/x conflicts with an existing directory");
    }

    #[test]
    fn unreadable_source_names_path() {
        let err = SourceError::Unreadable {
            path: PathBuf::from("/missing/index.ls"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/missing/index.ls"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn report_errors_name_offending_path() {
        assert_eq!(
            ReportError::PathNotFound("/does/not/exist".to_string()).to_string(),
            "path not found: /does/not/exist"
        );
        assert_eq!(
            ReportError::NotADirectory("/a/x".to_string()).to_string(),
            "not a directory: /a/x"
        );
    }

    #[test]
    fn io_error_converts_into_cache_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err: CacheError = io_err.into();
        assert!(matches!(err, CacheError::Io(_)));
    }
}
