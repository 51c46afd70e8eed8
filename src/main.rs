use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use tracing::info;

use indexdu::cli::Cli;
use indexdu::config::{Config, OutputFormat};
use indexdu::logging;
use indexdu::model::DiskUsage;
use indexdu::report::disk_usage_with;
use indexdu::repository::{IndexFile, SqliteStore, TreeCache};
use indexdu::util::{format_percent, format_size};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = Config::from_cli(Cli::parse());
    logging::init(config.log_level);

    let cache = TreeCache::new(SqliteStore);
    let index_path = config.index_file.clone();
    let loaded = cache
        .load_or_build(&config.cache_path, config.force_rebuild, &config.builder(), || {
            info!("Loading from index: {}", index_path.display());
            let index = IndexFile::open(&index_path)?;
            let stats = index.stats();
            info!(
                "{}: {} lines, {} files, {} directories, {} malformed, total size {}",
                index.path().display(),
                stats.lines,
                stats.files,
                stats.directories,
                stats.malformed,
                format_size(stats.total_size)
            );
            Ok(index)
        })
        .await?;

    let usage = disk_usage_with(&loaded.root, &config.target, config.fold_case)?;

    let mut out = io::stdout().lock();
    match config.format {
        OutputFormat::Table => print_table(&mut out, &usage)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &usage).context("Failed to write JSON report")?;
            writeln!(out)?;
        }
    }

    Ok(())
}

fn print_table(out: &mut impl Write, usage: &DiskUsage) -> io::Result<()> {
    writeln!(out, "Disk usage for: {}", usage.path)?;
    writeln!(out, "Total size: {} ({} files)", usage.total_formatted, usage.file_count)?;
    if usage.rows.is_empty() {
        return Ok(());
    }

    let names: Vec<String> = usage.rows.iter().map(|r| r.display_name()).collect();
    let name_width = names.iter().map(|n| n.chars().count()).max().unwrap_or(0).max(4);

    writeln!(
        out,
        "{:<name_width$}  {:>9}  {:>12}  {:>16}  {:>8}",
        "name", "percent", "size", "bytes", "files"
    )?;
    for (name, row) in names.iter().zip(&usage.rows) {
        writeln!(
            out,
            "{:<name_width$}  {:>9}  {:>12}  {:>16}  {:>8}",
            name,
            format_percent(row.size_percent),
            row.size_formatted,
            row.size,
            row.file_count
        )?;
    }
    Ok(())
}
