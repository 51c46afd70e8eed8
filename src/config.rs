//! Runtime configuration
//!
//! Resolved once from the command line (and `INDEXDU_CACHE`), then passed
//! explicitly to whatever needs it.

use std::path::PathBuf;

use tracing::Level;

use crate::cli::Cli;
use crate::repository::{artifact_path_for, TreeBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub index_file: PathBuf,
    pub target: String,
    pub cache_path: PathBuf,
    pub force_rebuild: bool,
    pub fold_case: bool,
    pub format: OutputFormat,
    pub log_level: Level,
    pub show_progress: bool,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Self {
        let cache_path = cli
            .cache
            .unwrap_or_else(|| artifact_path_for(&cli.index_file));
        let log_level = if cli.verbose {
            Level::DEBUG
        } else if cli.quiet {
            Level::WARN
        } else {
            Level::INFO
        };

        Self {
            index_file: cli.index_file,
            target: cli.path,
            cache_path,
            force_rebuild: cli.force_rebuild,
            fold_case: cli.ignore_case,
            format: if cli.json { OutputFormat::Json } else { OutputFormat::Table },
            log_level,
            show_progress: !cli.quiet,
        }
    }

    pub fn builder(&self) -> TreeBuilder {
        let builder = if self.show_progress { TreeBuilder::new() } else { TreeBuilder::quiet() };
        builder.fold_case(self.fold_case)
    }
}
