pub mod matcher;
pub mod checker;

// Re-export main types
pub use matcher::{find_rule, DistState, LicenceRule, RuleVerdict, LICENCE_RULES};
pub use checker::{check_section, is_source_available};
