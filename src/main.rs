use clap::Parser;
use neon_graph::cli::{Cli, Command};
use neon_graph::{cmd_build, cmd_init};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

fn main() {
    let cli = Cli::parse();

    let verbose = matches!(&cli.command, Command::Build(args) if args.verbose);
    init_tracing(verbose);

    let exit_code = match cli.command {
        Command::Build(args) => cmd_build(args),
        Command::Init(args) => cmd_init(args),
    };

    std::process::exit(exit_code);
}

/// Logs go to stderr. `RUST_LOG` wins over the default level.
fn init_tracing(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}
