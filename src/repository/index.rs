//! Index source
//!
//! Reads the tab-separated listing produced by the remote account lister:
//! `<size>\t<path>` for files and `\t<path>` for directories.

use std::path::{Path, PathBuf};

use crate::error::{RecordError, SourceError};
use crate::model::{PathRecord, RecordKind};

/// Parse one index line.
///
/// Returns `None` for blank lines, which are skipped silently.
pub fn parse_line(raw: &str, line: usize) -> Option<Result<PathRecord, RecordError>> {
    let raw = raw.strip_suffix('\r').unwrap_or(raw);
    if raw.trim().is_empty() {
        return None;
    }

    let malformed = |reason: String| RecordError::Malformed { line, reason };

    let Some((size_field, path)) = raw.split_once('\t') else {
        return Some(Err(malformed("missing tab separator".to_string())));
    };
    if path.is_empty() {
        return Some(Err(malformed("missing path".to_string())));
    }
    if !path.starts_with('/') {
        return Some(Err(malformed(format!("path {:?} is not absolute", path))));
    }

    let size_field = size_field.trim();
    if size_field.is_empty() {
        return Some(Ok(PathRecord::directory(path, line)));
    }

    Some(match size_field.parse::<u64>() {
        Ok(size) => Ok(PathRecord::file(path, size, line)),
        Err(_) => Err(malformed(format!("invalid size {:?}", size_field))),
    })
}

/// Summary of an index, logged before a build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub lines: usize,
    pub files: usize,
    pub directories: usize,
    pub malformed: usize,
    pub total_size: u64,
}

/// An index file loaded into memory
#[derive(Debug)]
pub struct IndexFile {
    path: PathBuf,
    content: String,
}

impl IndexFile {
    /// Read the whole index. A missing or unreadable file is fatal.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        let bytes = std::fs::read(&path).map_err(|source| SourceError::Unreadable {
            path: path.clone(),
            source,
        })?;
        let content = match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        };
        Ok(Self { path, content })
    }

    /// Build an index from in-memory text (tests, benchmarks)
    pub fn from_text(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self { path: path.into(), content: content.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parsed records in file order, one per non-blank line
    pub fn records(&self) -> Records<&str> {
        Records::new(self.content.as_str())
    }

    pub fn stats(&self) -> IndexStats {
        let mut stats = IndexStats::default();
        for record in self.records() {
            stats.lines += 1;
            match record {
                Ok(PathRecord { kind: RecordKind::File { size }, .. }) => {
                    stats.files += 1;
                    stats.total_size = stats.total_size.saturating_add(size);
                }
                Ok(_) => stats.directories += 1,
                Err(_) => stats.malformed += 1,
            }
        }
        stats
    }
}

impl IntoIterator for IndexFile {
    type Item = Result<PathRecord, RecordError>;
    type IntoIter = Records<String>;

    fn into_iter(self) -> Self::IntoIter {
        Records::new(self.content)
    }
}

/// Iterator over the parsed lines of an index, borrowed or owned
pub struct Records<S> {
    content: S,
    pos: usize,
    line: usize,
    remaining: usize,
}

impl<S: AsRef<str>> Records<S> {
    fn new(content: S) -> Self {
        let remaining = content.as_ref().lines().count();
        Self { content, pos: 0, line: 0, remaining }
    }
}

impl<S: AsRef<str>> Iterator for Records<S> {
    type Item = Result<PathRecord, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        let text = self.content.as_ref();
        while self.pos < text.len() {
            let rest = &text[self.pos..];
            let (raw, advance) = match rest.find('\n') {
                Some(i) => (&rest[..i], i + 1),
                None => (rest, rest.len()),
            };
            self.pos += advance;
            self.line += 1;
            self.remaining = self.remaining.saturating_sub(1);
            if let Some(record) = parse_line(raw, self.line) {
                return Some(record);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}
