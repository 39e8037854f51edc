use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use thiserror::Error;

pub mod defines;
pub mod rules_defs;

pub use defines::{parse_defines, parse_defines_toml, Defines};
pub use rules_defs::{parse_rules_defs, RulesDefs};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("line {line}: expected 'KEY := value', found '{text}'")]
    MalformedRule { line: usize, text: String },

    #[error("required variable {0} is not set")]
    MissingVariable(String),

    #[error("line {line}: {message}")]
    MalformedDefines { line: usize, message: String },

    #[error("missing required setting '{key}' in section [{section}]")]
    MissingSetting { section: String, key: String },

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

/// Where the packaging tree keeps its settings, relative to the packaging root.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub rules_defs: PathBuf,
    pub defines: PathBuf,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self {
            rules_defs: PathBuf::from("debian/rules.defs"),
            defines: PathBuf::from("defines"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Kernel version the packaging tree is built against
    pub kernel_version: String,

    /// Destination package directories, in search order
    pub dest_dirs: Vec<PathBuf>,

    /// Glob patterns for upstream files that are never reported
    pub exclusions: Vec<String>,
}

/// Load configuration from the packaging tree rooted at `root`
pub fn load_config(root: &Path, paths: &ConfigPaths) -> Result<Config> {
    let rules_path = root.join(&paths.rules_defs);
    let content = fs::read_to_string(&rules_path)
        .with_context(|| format!("Failed to read {}", rules_path.display()))?;
    let rules = parse_rules_defs(&content)
        .with_context(|| format!("Failed to parse {}", rules_path.display()))?;
    let kernel_version = rules
        .kernel_version()
        .with_context(|| format!("Invalid {}", rules_path.display()))?
        .to_string();

    let defines_path = root.join(&paths.defines);
    let content = fs::read_to_string(&defines_path)
        .with_context(|| format!("Failed to read {}", defines_path.display()))?;
    let is_toml = defines_path.extension().map_or(false, |ext| ext == "toml");
    let parsed = if is_toml {
        parse_defines_toml(&content)
    } else {
        parse_defines(&content)
    };
    let defines = parsed.with_context(|| format!("Failed to parse {}", defines_path.display()))?;

    Ok(Config {
        kernel_version,
        dest_dirs: defines
            .base
            .packages
            .iter()
            .map(|package| root.join(package))
            .collect(),
        exclusions: defines.upstream.exclude,
    })
}
