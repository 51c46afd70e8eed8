use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "indexdu",
    about = "Disk usage of a remote storage account, from a previously obtained file index"
)]
pub struct Cli {
    /// Index file: one `<size>\t<path>` line per file, `\t<path>` per directory
    pub index_file: PathBuf,

    /// Directory to report on
    #[arg(default_value = "/")]
    pub path: String,

    /// Rebuild the tree from the index even if a cached tree exists
    #[arg(short = 'f', long = "force-rebuild", alias = "force")]
    pub force_rebuild: bool,

    /// Cache artifact to use instead of `<index stem>_tree.db` next to the index
    #[arg(long, env = "INDEXDU_CACHE")]
    pub cache: Option<PathBuf>,

    /// Treat names case-insensitively (lower-cases every path).
    ///
    /// Off by default, so names are shown as listed. Pass this for services
    /// that ignore case, where `/Photos` and `/photos` are the same folder.
    #[arg(short = 'i', long)]
    pub ignore_case: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// More logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only warnings and errors, no progress bar
    #[arg(short, long)]
    pub quiet: bool,
}
