pub mod config;
pub mod whence;
pub mod policy;
pub mod reconcile;
pub mod report;
pub mod output;

// Re-export main types for easy access
pub use config::{load_config, Config, ConfigPaths};
pub use whence::{FileInfo, Section, WhenceReader};
pub use policy::{check_section, DistState};
pub use reconcile::{Finding, FindingStatus, Reconciler};
pub use report::{build_report, Report};
