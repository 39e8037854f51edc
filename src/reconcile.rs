//! Compare non-free upstream files against the packaged copies.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use glob::Pattern;
use log::{debug, warn};
use serde::Serialize;

use crate::config::Config;
use crate::policy::{check_section, DistState};
use crate::whence::Section;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingStatus {
    /// A packaged copy exists but its contents differ from upstream
    Changed,
    /// No destination directory has a copy
    CouldBeAdded,
}

impl fmt::Display for FindingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingStatus::Changed => write!(f, "changed"),
            FindingStatus::CouldBeAdded => write!(f, "could be added"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub name: String,
    pub status: FindingStatus,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.status)
    }
}

/// Compiled `upstream.exclude` patterns. `*` also matches `/`.
#[derive(Debug, Clone, Default)]
pub struct Exclusions {
    patterns: Vec<Pattern>,
}

impl Exclusions {
    pub fn new(patterns: &[String]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|pattern_str| match Pattern::new(&collapse_stars(pattern_str)) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!("Ignoring invalid exclusion pattern '{}': {}", pattern_str, e);
                    None
                }
            })
            .collect();
        Self { patterns }
    }

    pub fn matches(&self, binary: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches(binary))
    }
}

/// `glob` only accepts `**` as a whole path component. Every `*` here
/// already crosses `/`, so a run of stars means the same as one.
fn collapse_stars(pattern: &str) -> String {
    let mut collapsed = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if c == '*' && collapsed.ends_with('*') {
            continue;
        }
        collapsed.push(c);
    }
    collapsed
}

pub struct Reconciler<'a> {
    upstream_dir: &'a Path,
    dest_dirs: &'a [PathBuf],
    exclusions: Exclusions,
}

impl<'a> Reconciler<'a> {
    pub fn new(upstream_dir: &'a Path, config: &'a Config) -> Self {
        Self {
            upstream_dir,
            dest_dirs: &config.dest_dirs,
            exclusions: Exclusions::new(&config.exclusions),
        }
    }

    /// Findings for one section. Only non-free sections are examined.
    pub fn reconcile_section(&self, section: &Section) -> io::Result<Vec<Finding>> {
        let state = check_section(section);
        debug!("{}: {:?}", section.driver, state);
        if state != DistState::NonFree {
            return Ok(Vec::new());
        }

        let mut findings = Vec::new();
        for file_info in section.files.values() {
            if self.exclusions.matches(&file_info.binary) {
                debug!("{}: excluded", file_info.binary);
                continue;
            }
            if let Some(status) = self.check_file(&file_info.binary)? {
                findings.push(Finding {
                    name: file_info.binary.clone(),
                    status,
                });
            }
        }
        Ok(findings)
    }

    /// Compare one upstream file with the first packaged copy found.
    ///
    /// Returns `None` when the file is not shipped upstream or the packaged
    /// copy is identical.
    pub fn check_file(&self, binary: &str) -> io::Result<Option<FindingStatus>> {
        let source_file = self.upstream_dir.join(binary);
        if !source_file.is_file() {
            debug!("{}: not present upstream", binary);
            return Ok(None);
        }

        for dest_dir in self.dest_dirs {
            for dest_file in dest_candidates(dest_dir, binary) {
                if dest_file.is_file() {
                    return if files_match(&source_file, &dest_file)? {
                        debug!("{}: unchanged in {}", binary, dest_file.display());
                        Ok(None)
                    } else {
                        Ok(Some(FindingStatus::Changed))
                    };
                }
            }
        }

        Ok(Some(FindingStatus::CouldBeAdded))
    }
}

/// `<dest>/<binary>` followed by any `<dest>/<binary>-*` variants, sorted.
fn dest_candidates(dest_dir: &Path, binary: &str) -> Vec<PathBuf> {
    let exact = dest_dir.join(binary);
    let variants = format!("{}-*", Pattern::escape(&exact.to_string_lossy()));

    let mut candidates = vec![exact];
    if let Ok(paths) = glob::glob(&variants) {
        candidates.extend(paths.filter_map(Result::ok));
    }
    candidates
}

/// Shallow comparison: regular files with the same size and modification
/// time are taken as equal without reading them.
pub fn files_match(a: &Path, b: &Path) -> io::Result<bool> {
    let meta_a = fs::metadata(a)?;
    let meta_b = fs::metadata(b)?;

    if !meta_a.is_file() || !meta_b.is_file() {
        return Ok(false);
    }
    if meta_a.len() != meta_b.len() {
        return Ok(false);
    }
    if let (Ok(mtime_a), Ok(mtime_b)) = (meta_a.modified(), meta_b.modified()) {
        if mtime_a == mtime_b {
            return Ok(true);
        }
    }

    contents_equal(a, b)
}

fn contents_equal(a: &Path, b: &Path) -> io::Result<bool> {
    let mut reader_a = BufReader::new(File::open(a)?);
    let mut reader_b = BufReader::new(File::open(b)?);

    loop {
        let buf_a = reader_a.fill_buf()?;
        let buf_b = reader_b.fill_buf()?;
        if buf_a.is_empty() || buf_b.is_empty() {
            return Ok(buf_a.is_empty() && buf_b.is_empty());
        }

        let len = buf_a.len().min(buf_b.len());
        if buf_a[..len] != buf_b[..len] {
            return Ok(false);
        }
        reader_a.consume(len);
        reader_b.consume(len);
    }
}
