use crate::cli::InitArgs;
use crate::config::{CONFIG_FILE_NAME, generate_config_template};
use crate::fs::{FileSystem, default_fs};
use crate::style;

pub fn cmd_init(args: InitArgs) -> i32 {
    cmd_init_with_fs(args, default_fs())
}

/// Writes the starter config into `args.path`. An existing file is only
/// replaced with `--force`.
pub fn cmd_init_with_fs(args: InitArgs, fs: &dyn FileSystem) -> i32 {
    let target = args.path.join(CONFIG_FILE_NAME);
    let replacing = fs.exists(&target);

    if replacing && !args.force {
        style::error(&format!(
            "{} already has a config, leaving it untouched",
            style::path(&args.path)
        ));
        style::hint("pass --force to replace it with the starter template");
        return 1;
    }

    if let Err(e) = fs.write(&target, &generate_config_template()) {
        style::error(&format!("Cannot write {}: {}", style::path(&target), e));
        return 1;
    }
    tracing::debug!(path = %target.display(), replacing, "wrote starter config");

    let verb = if replacing { "Replaced" } else { "Created" };
    style::success(&format!("{} {}", verb, style::path(&target)));
    style::hint(&format!(
        "map [fields] onto your row keys, then run `neon-graph build <ROWS.json>` from {}",
        style::path(&args.path)
    ));
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::fs::mock::MockFs;
    use std::path::{Path, PathBuf};

    fn args(force: bool) -> InitArgs {
        InitArgs {
            path: PathBuf::from("/project"),
            force,
        }
    }

    #[test]
    fn test_init_writes_template() {
        let fs = MockFs::default();

        assert_eq!(cmd_init_with_fs(args(false), &fs), 0);

        let written = fs.get(Path::new("/project/.neon-graph.toml")).unwrap();
        let config = Config::parse(&written).unwrap();
        assert_eq!(config.fields.node_id, "id");
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let fs = MockFs::with_files([(Path::new("/project/.neon-graph.toml"), "# mine")]);

        assert_eq!(cmd_init_with_fs(args(false), &fs), 1);
        assert_eq!(fs.get(Path::new("/project/.neon-graph.toml")).unwrap(), "# mine");
    }

    #[test]
    fn test_init_force_replaces_existing() {
        let fs = MockFs::with_files([(Path::new("/project/.neon-graph.toml"), "# mine")]);

        assert_eq!(cmd_init_with_fs(args(true), &fs), 0);

        let written = fs.get(Path::new("/project/.neon-graph.toml")).unwrap();
        assert_ne!(written, "# mine");
        assert!(Config::parse(&written).is_ok());
    }
}
