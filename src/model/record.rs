/// What an index line describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    File { size: u64 },
    /// A `\t<path>` line: a directory with no size of its own
    Directory,
}

/// One parsed line of the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRecord {
    pub path: String,
    pub kind: RecordKind,
    /// 1-based line number in the source, for diagnostics
    pub line: usize,
}

impl PathRecord {
    pub fn file(path: impl Into<String>, size: u64, line: usize) -> Self {
        Self { path: path.into(), kind: RecordKind::File { size }, line }
    }

    pub fn directory(path: impl Into<String>, line: usize) -> Self {
        Self { path: path.into(), kind: RecordKind::Directory, line }
    }
}
