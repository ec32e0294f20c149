//! Probing strategies, one per [`DetectionSource`].

mod environment;
mod filesystem;
mod process;
mod records;

pub use environment::{EnvLookup, EnvironmentOverride};
pub use filesystem::FilesystemScan;
pub use process::ProcessModules;
pub use records::{InstallRecord, InstallRecords};

use crate::error::DetectionError;
use hb_domain::{DetectionSource, VersionInfo};
use std::fmt::Debug;

/// One independent way of finding the host.
///
/// `Ok(None)` means "nothing here". Errors are logged by the detector and treated the same way.
pub trait DetectionStrategy: Send + Sync + Debug {
    fn source(&self) -> DetectionSource;

    fn probe(&self) -> Result<Option<VersionInfo>, DetectionError>;
}

pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
