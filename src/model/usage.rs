use serde::Serialize;

/// One immediate child in a disk usage report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageRow {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
    pub size_percent: f64,
    pub size_formatted: String,
    pub file_count: u64,
}

impl UsageRow {
    /// Name as displayed: directories get a trailing separator
    pub fn display_name(&self) -> String {
        if self.is_dir {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Disk usage of one directory (or a single file), rows sorted by size
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskUsage {
    pub path: String,
    pub is_dir: bool,
    pub total_size: u64,
    pub total_formatted: String,
    pub file_count: u64,
    pub rows: Vec<UsageRow>,
}
