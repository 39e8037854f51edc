use anyhow::{Context, Result};
use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::reconcile::{Finding, FindingStatus, Reconciler};
use crate::whence::WhenceReader;

pub const WHENCE_FILE: &str = "WHENCE";

#[derive(Debug, Serialize, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub changed: usize,
    pub could_be_added: usize,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub kernel_version: String,
    #[serde(serialize_with = "serialize_path")]
    pub upstream_dir: PathBuf,
    pub findings: Vec<Finding>,
    pub summary: ReportSummary,
}

// Paths that are not valid UTF-8 are written lossily instead of failing the report.
fn serialize_path<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&path.display())
}

pub fn create_report(kernel_version: String, upstream_dir: PathBuf, findings: Vec<Finding>) -> Report {
    let changed = findings
        .iter()
        .filter(|f| f.status == FindingStatus::Changed)
        .count();
    let could_be_added = findings.len() - changed;

    Report {
        kernel_version,
        upstream_dir,
        findings,
        summary: ReportSummary {
            changed,
            could_be_added,
        },
    }
}

/// Scan `<upstream_dir>/WHENCE` and reconcile every non-free section against
/// the configured destination directories.
pub fn build_report(upstream_dir: &Path, config: &Config) -> Result<Report> {
    let whence_path = upstream_dir.join(WHENCE_FILE);
    let reader = WhenceReader::open(&whence_path)
        .with_context(|| format!("Failed to open {}", whence_path.display()))?;
    let reconciler = Reconciler::new(upstream_dir, config);

    let mut findings = Vec::new();
    for section in reader {
        let section =
            section.with_context(|| format!("Failed to parse {}", whence_path.display()))?;
        let section_findings = reconciler
            .reconcile_section(&section)
            .with_context(|| format!("Failed to compare files of driver '{}'", section.driver))?;
        findings.extend(section_findings);
    }

    Ok(create_report(
        config.kernel_version.clone(),
        upstream_dir.to_path_buf(),
        findings,
    ))
}
