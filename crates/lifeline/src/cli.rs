//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use lifeline_core::types::TagListingFormat;

/// Lifeline - decide which release tags are still in support
#[derive(Parser, Debug)]
#[command(name = "lifeline")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (defaults to ~/.lifeline/config.yaml if present)
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the image references to mirror
    Resolve(ResolveArgs),

    /// Show the support state of every release line
    Status(StatusArgs),

    /// Show version information
    Version(VersionArgs),
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Overrides applied on top of the layered configuration
#[derive(Args, Debug, Default, Clone)]
pub struct SourceArgs {
    /// Release catalog URL
    #[arg(long, value_name = "URL")]
    pub catalog_url: Option<String>,

    /// End-of-life table (JSON)
    #[arg(long, value_name = "PATH")]
    pub eol_table: Option<Utf8PathBuf>,

    /// Minimum days a line stays supported after its first build
    #[arg(long, value_name = "DAYS")]
    pub minimum_support_days: Option<u32>,

    /// Evaluate support as of this timestamp instead of the current time
    #[arg(long, value_name = "TIMESTAMP")]
    pub now: Option<String>,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Registry tag listing URL
    #[arg(long, value_name = "URL")]
    pub registry_tags_url: Option<String>,

    /// Tag listing format (key-map or distribution)
    #[arg(long, value_name = "FORMAT")]
    pub registry_format: Option<TagListingFormat>,

    /// Image the resolved tags belong to (registry/namespace/repo)
    #[arg(long)]
    pub image: Option<String>,

    /// Do not cross-check resolved tags against the registry
    #[arg(long)]
    pub skip_registry_check: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Include lines that are out of support
    #[arg(short, long)]
    pub all: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
