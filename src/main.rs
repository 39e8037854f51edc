use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use firmware_upstream_check::config::ConfigPaths;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let paths = ConfigPaths {
        rules_defs: cli.rules_defs,
        defines: cli.defines,
    };
    commands::handle_check(
        &cli.linux_firmware_dir,
        &cli.directory,
        &paths,
        cli.format,
        cli.output,
    )
}

/// Logs go to stderr so stdout only carries the report. `RUST_LOG` wins over the flags.
fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}
