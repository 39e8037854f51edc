use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Settings read from the package definition file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defines {
    pub base: BaseSettings,
    #[serde(default)]
    pub upstream: UpstreamSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseSettings {
    /// Binary package directories holding already packaged firmware
    pub packages: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamSettings {
    /// Glob patterns for upstream files that are never packaged
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// `[section]` → key → raw value, as written in an INI-style defines file.
#[derive(Debug, Default)]
struct IniDocument {
    sections: IndexMap<String, IndexMap<String, String>>,
}

impl IniDocument {
    fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut doc = IniDocument::default();
        let mut section: Option<String> = None;
        let mut key: Option<String> = None;

        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            if line.starts_with(char::is_whitespace) {
                let (Some(section), Some(key)) = (&section, &key) else {
                    return Err(malformed(line_no, "continuation line without a preceding entry"));
                };
                if let Some(value) = doc
                    .sections
                    .get_mut(section)
                    .and_then(|entries| entries.get_mut(key))
                {
                    value.push('\n');
                    value.push_str(trimmed);
                }
                continue;
            }

            if let Some(header) = trimmed.strip_prefix('[') {
                let name = header
                    .strip_suffix(']')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| malformed(line_no, "invalid section header"))?;
                doc.sections.entry(name.to_string()).or_default();
                section = Some(name.to_string());
                key = None;
                continue;
            }

            let Some(current) = section.as_ref() else {
                return Err(malformed(line_no, "entry before the first section header"));
            };
            let split = trimmed
                .find(|c: char| c == ':' || c == '=')
                .ok_or_else(|| malformed(line_no, "expected 'key: value' or 'key = value'"))?;
            let name = trimmed[..split].trim().to_lowercase();
            if name.is_empty() {
                return Err(malformed(line_no, "entry has no key"));
            }
            let value = trimmed[split + 1..].trim().to_string();

            let entries = doc.sections.entry(current.clone()).or_default();
            if entries.contains_key(&name) {
                return Err(malformed(
                    line_no,
                    &format!("duplicate key '{}' in section [{}]", name, current),
                ));
            }
            entries.insert(name.clone(), value);
            key = Some(name);
        }

        Ok(doc)
    }

    fn list(&self, section: &str, key: &str) -> Option<Vec<String>> {
        self.sections
            .get(section)
            .and_then(|entries| entries.get(key))
            .map(|value| value.split_whitespace().map(str::to_string).collect())
    }
}

fn malformed(line: usize, message: &str) -> ConfigError {
    ConfigError::MalformedDefines {
        line,
        message: message.to_string(),
    }
}

/// Parse an INI-style defines file. List settings are whitespace separated
/// and may continue over indented lines.
pub fn parse_defines(text: &str) -> Result<Defines, ConfigError> {
    let doc = IniDocument::parse(text)?;

    let packages = doc
        .list("base", "packages")
        .ok_or_else(|| ConfigError::MissingSetting {
            section: "base".to_string(),
            key: "packages".to_string(),
        })?;
    let exclude = doc.list("upstream", "exclude").unwrap_or_default();

    Ok(Defines {
        base: BaseSettings { packages },
        upstream: UpstreamSettings { exclude },
    })
}

/// Parse a defines file written as TOML, with the same `[base]` and
/// `[upstream]` tables.
pub fn parse_defines_toml(text: &str) -> Result<Defines, ConfigError> {
    Ok(toml::from_str(text)?)
}
