use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "check-upstream")]
#[command(about = "Report changes or additions in linux-firmware.git that may be suitable\nfor inclusion in firmware-nonfree.")]
#[command(version)]
pub struct Cli {
    /// Checkout of linux-firmware.git
    pub linux_firmware_dir: PathBuf,

    /// Root of the firmware-nonfree packaging tree
    #[arg(short = 'C', long = "directory", default_value = ".")]
    pub directory: PathBuf,

    /// Rules file providing KERNELVERSION, relative to the packaging root
    #[arg(long, default_value = "debian/rules.defs")]
    pub rules_defs: PathBuf,

    /// Package definition file, relative to the packaging root
    #[arg(long, default_value = "defines")]
    pub defines: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
