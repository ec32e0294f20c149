use super::{DetectionStrategy, contains_ignore_case};
use crate::error::{DetectionError, DetectionErrorExt};
use crate::parse::parse_version;
use hb_domain::{DetectionSource, HostVersion, VersionInfo};
use std::path::{Path, PathBuf};

const DEFAULT_MODULE_MAP: &str = "/proc/self/maps";

/// Inspects the modules loaded into the current process.
///
/// When the bridge runs inside the host, the host's own libraries show up in the module map.
/// The listing format is one mapping per line with the module path as the last column; paths
/// may contain spaces.
#[derive(Debug, Clone)]
pub struct ProcessModules {
    listing: PathBuf,
    product: String,
}

impl ProcessModules {
    #[must_use]
    pub fn new(product: impl Into<String>) -> Self {
        Self::with_listing(DEFAULT_MODULE_MAP, product)
    }

    #[must_use]
    pub fn with_listing(listing: impl Into<PathBuf>, product: impl Into<String>) -> Self {
        Self { listing: listing.into(), product: product.into() }
    }
}

impl DetectionStrategy for ProcessModules {
    fn source(&self) -> DetectionSource {
        DetectionSource::Process
    }

    fn probe(&self) -> Result<Option<VersionInfo>, DetectionError> {
        if !self.listing.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.listing)
            .context(format!("Reading {}", self.listing.display()))?;

        for module in raw.lines().filter_map(|line| line.find(" /").map(|at| line[at + 1..].trim())) {
            if !contains_ignore_case(module, &self.product) {
                continue;
            }
            let parsed = parse_version(module)?;
            if parsed.version == HostVersion::Unknown {
                continue;
            }
            let install_path = Path::new(module).parent().map(Path::to_path_buf);
            return Ok(Some(VersionInfo {
                version: parsed.version,
                display: parsed.display,
                product: self.product.clone(),
                install_path,
                is_valid_installation: true,
                build: None,
                source: DetectionSource::Process,
            }));
        }

        Ok(None)
    }
}
