use crate::graph::Granularity;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "neon-graph")]
#[command(about = "Build clustered network graphs from flat result rows")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build a graph from a JSON array of rows
    Build(BuildArgs),

    /// Generate a starter .neon-graph.toml configuration file
    Init(InitArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    /// JSON file holding an array of row objects
    pub rows: PathBuf,

    /// Config file (defaults to .neon-graph.toml next to the rows file)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "json")]
    pub format: OutputFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Keep every leaf node standalone instead of folding it into a cluster
    #[arg(long)]
    pub no_clusters: bool,

    /// Drop nodes with zero links and pairs linked only to each other
    #[arg(long)]
    pub hide_leaves: bool,

    /// Build date buckets with this granularity
    #[arg(short, long)]
    pub granularity: Option<Granularity>,

    /// Reveal only nodes and links dated through this bucket
    #[arg(short, long)]
    pub bucket: Option<usize>,

    /// Log pipeline progress to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Default for BuildArgs {
    fn default() -> Self {
        Self {
            rows: PathBuf::from("rows.json"),
            config: None,
            format: OutputFormat::Json,
            output: None,
            no_clusters: false,
            hide_leaves: false,
            granularity: None,
            bucket: None,
            verbose: false,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Directory where to create .neon-graph.toml (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Replace an existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Markdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_flags() {
        let cli = Cli::try_parse_from([
            "neon-graph",
            "build",
            "rows.json",
            "-f",
            "markdown",
            "--no-clusters",
            "--granularity",
            "month",
            "--bucket",
            "3",
        ])
        .unwrap();

        let Command::Build(args) = cli.command else {
            panic!("expected build command");
        };
        assert_eq!(args.format, OutputFormat::Markdown);
        assert!(args.no_clusters);
        assert!(!args.hide_leaves);
        assert_eq!(args.granularity, Some(Granularity::Month));
        assert_eq!(args.bucket, Some(3));
    }

    #[test]
    fn test_init_defaults_to_current_dir() {
        let cli = Cli::try_parse_from(["neon-graph", "init"]).unwrap();
        let Command::Init(args) = cli.command else {
            panic!("expected init command");
        };
        assert_eq!(args.path, PathBuf::from("."));
        assert!(!args.force);
    }
}
