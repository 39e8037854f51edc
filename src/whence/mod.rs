//! Records read from a linux-firmware `WHENCE` manifest.

use indexmap::IndexMap;
use serde::Serialize;

pub mod reader;

pub use reader::{WhenceError, WhenceReader};

/// One binary listed under a `File:` or `RawFile:` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub binary: String,
    pub description: Option<String>,
    /// `Source:` entries of the file's group. Empty when upstream ships no source.
    pub source: Vec<String>,
    pub version: Option<String>,
}

impl FileInfo {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            description: None,
            source: Vec::new(),
            version: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source.push(source.into());
        self
    }

    /// CIS files are plain-text card information structures, so the binary is its own source.
    pub fn has_source(&self) -> bool {
        !self.source.is_empty() || self.binary.ends_with(".cis")
    }
}

/// One `Driver:` block of the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub driver: String,
    pub licence: String,
    pub files: IndexMap<String, FileInfo>,
    /// `Link:` entries, link name to target. Links are not shipped files.
    pub links: IndexMap<String, String>,
}

impl Section {
    pub fn new(driver: impl Into<String>, licence: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            licence: licence.into(),
            files: IndexMap::new(),
            links: IndexMap::new(),
        }
    }

    pub fn with_file(mut self, file: FileInfo) -> Self {
        self.files.insert(file.binary.clone(), file);
        self
    }
}
