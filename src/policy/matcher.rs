use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Redistribution verdict for one manifest section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistState {
    Undistributable,
    NonFree,
    Free,
}

// Grants that allow redistribution of the binary as such.
static FREE_GRANT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^BSD\b",
        r"|^GPLv2 or OpenIB\.org BSD\b",
        r"|\bRedistribution\s+and\s+use\s+in(?:\s+source\s+and)?\s+binary\s+forms\b",
        r"|\bPermission\s+is\s+hereby\s+granted\b[^.]+\sto\s+deal\s+in\s+the\s+Software\s+without\s+restriction\b",
        r"|\bredistributable\s+in\s+binary\s+form\b",
    ))
    .expect("Invalid free grant regex")
});
static FIRMWARE_GRANT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\bPermission\s+is\s+hereby\s+granted\s+for\s+the\s+distribution\s+of\s+this\s+firmware\s+(?:data|image)\b",
    )
    .expect("Invalid firmware grant regex")
});
static AS_PART_OF_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s+as\s+part\s+of").expect("Invalid 'as part of' regex")
});
static DISTRIBUTABLE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:D|Red)istributable\b").expect("Invalid distributable regex")
});
static GPL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^GPL(?:v2|\+)?\b").expect("Invalid GPL regex")
});

/// A firmware grant only counts when it is not limited to distribution
/// "as part of" some other product.
fn has_unqualified_firmware_grant(licence: &str) -> bool {
    FIRMWARE_GRANT_REGEX
        .find_iter(licence)
        .any(|m| !AS_PART_OF_REGEX.is_match(&licence[m.end()..]))
}

fn is_free_grant(licence: &str) -> bool {
    FREE_GRANT_REGEX.is_match(licence) || has_unqualified_firmware_grant(licence)
}

fn is_distributable(licence: &str) -> bool {
    DISTRIBUTABLE_REGEX.is_match(licence)
}

fn is_gpl(licence: &str) -> bool {
    GPL_REGEX.is_match(licence)
}

/// What a matching rule decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleVerdict {
    /// `Free` when every file has source, otherwise the given state.
    FreeWithSource { otherwise: DistState },
    Always(DistState),
}

impl RuleVerdict {
    pub fn resolve(self, source_available: bool) -> DistState {
        match self {
            RuleVerdict::FreeWithSource { otherwise } => {
                if source_available {
                    DistState::Free
                } else {
                    otherwise
                }
            }
            RuleVerdict::Always(state) => state,
        }
    }
}

pub struct LicenceRule {
    pub name: &'static str,
    matches: fn(&str) -> bool,
    pub verdict: RuleVerdict,
}

impl LicenceRule {
    pub fn matches(&self, licence: &str) -> bool {
        (self.matches)(licence)
    }
}

/// Evaluated first to last; the first matching rule decides. Broad rules
/// must stay after the specific grants they would otherwise shadow.
pub static LICENCE_RULES: [LicenceRule; 3] = [
    LicenceRule {
        name: "free grant",
        matches: is_free_grant,
        verdict: RuleVerdict::FreeWithSource {
            otherwise: DistState::NonFree,
        },
    },
    LicenceRule {
        name: "distributable",
        matches: is_distributable,
        verdict: RuleVerdict::Always(DistState::NonFree),
    },
    LicenceRule {
        name: "GPL",
        matches: is_gpl,
        verdict: RuleVerdict::FreeWithSource {
            otherwise: DistState::Undistributable,
        },
    },
];

/// First rule matching the licence text, if any.
pub fn find_rule(licence: &str) -> Option<&'static LicenceRule> {
    LICENCE_RULES.iter().find(|rule| rule.matches(licence))
}
