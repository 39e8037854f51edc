use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use super::ConfigError;

pub const KERNEL_VERSION: &str = "KERNELVERSION";

static ASSIGNMENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\w+)\s*:=\s*(.*)$").expect("Invalid rules.defs assignment regex")
});

/// `KEY := value` variables from `debian/rules.defs`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RulesDefs {
    vars: IndexMap<String, String>,
}

impl RulesDefs {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn kernel_version(&self) -> Result<&str, ConfigError> {
        self.get(KERNEL_VERSION)
            .ok_or_else(|| ConfigError::MissingVariable(KERNEL_VERSION.to_string()))
    }
}

/// Parse rules.defs text. Blank lines and `#` comments are skipped, every
/// other line must be an assignment. Later assignments override earlier ones.
pub fn parse_rules_defs(text: &str) -> Result<RulesDefs, ConfigError> {
    let mut vars = IndexMap::new();

    for (index, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let caps = ASSIGNMENT_REGEX
            .captures(line)
            .ok_or_else(|| ConfigError::MalformedRule {
                line: index + 1,
                text: line.to_string(),
            })?;
        vars.insert(caps[1].to_string(), caps[2].trim_end().to_string());
    }

    Ok(RulesDefs { vars })
}
