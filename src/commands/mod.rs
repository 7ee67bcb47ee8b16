mod build;
mod init;

pub use build::{cmd_build, cmd_build_with_fs};
pub use init::{cmd_init, cmd_init_with_fs};

use crate::api::{GraphOptions, resolve_config};
use crate::cli::BuildArgs;
use crate::config::Config;
use crate::fs::FileSystem;
use crate::style;
use std::path::PathBuf;

/// Shared context for command execution, reducing boilerplate across commands.
pub struct CommandContext {
    pub rows: PathBuf,
    pub config: Config,
}

impl CommandContext {
    /// Checks the rows file exists and resolves its configuration with the
    /// CLI overrides applied. Returns Err(exit_code) if setup fails.
    pub fn new(args: &BuildArgs, fs: &dyn FileSystem) -> Result<Self, i32> {
        if !fs.exists(&args.rows) {
            style::error(&format!("Rows file not found: {}", style::path(&args.rows)));
            return Err(1);
        }

        let options = GraphOptions {
            config: args.config.clone(),
            use_node_clusters: args.no_clusters.then_some(false),
            hide_nodes_with_zero_or_one_link: args.hide_leaves.then_some(true),
            granularity: args.granularity,
        };

        let config = match resolve_config(&args.rows, &options) {
            Ok(config) => config,
            Err(e) if args.config.is_some() => {
                style::error(&format!("Failed to load config: {}", e));
                return Err(1);
            }
            Err(e) => {
                style::warning(&format!("Failed to load config: {}. Using defaults.", e));
                let mut config = Config::default();
                options.apply_to(&mut config);
                config
            }
        };

        Ok(Self {
            rows: args.rows.clone(),
            config,
        })
    }
}
