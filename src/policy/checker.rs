use super::matcher::{find_rule, DistState};
use crate::whence::Section;

/// True when every file in the section ships with source (or is a `.cis` file).
pub fn is_source_available(section: &Section) -> bool {
    section.files.values().all(|file| file.has_source())
}

/// Classify a manifest section by its licence text.
///
/// Licences no rule recognises are assumed to be undistributable.
pub fn check_section(section: &Section) -> DistState {
    match find_rule(&section.licence) {
        Some(rule) => rule.verdict.resolve(is_source_available(section)),
        None => DistState::Undistributable,
    }
}
