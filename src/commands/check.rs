use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use crate::cli::OutputFormat;
use firmware_upstream_check::config::{load_config, ConfigPaths};
use firmware_upstream_check::output::{format_json_output, format_text_output};
use firmware_upstream_check::report::build_report;

pub fn handle_check(
    linux_firmware_dir: &Path,
    root: &Path,
    paths: &ConfigPaths,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(root, paths)?;
    log::debug!(
        "Kernel version {}, destinations: {:?}",
        config.kernel_version,
        config.dest_dirs
    );

    let report = build_report(linux_firmware_dir, &config)?;
    log::info!(
        "{} changed, {} could be added",
        report.summary.changed,
        report.summary.could_be_added
    );

    let output_content = match format {
        OutputFormat::Text => format_text_output(&report),
        OutputFormat::Json => format_json_output(&report)?,
    };

    match output {
        Some(path) => fs::write(&path, output_content)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{}", output_content),
    }

    Ok(())
}
