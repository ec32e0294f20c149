use super::{DetectionStrategy, contains_ignore_case};
use crate::error::{DetectionError, DetectionErrorExt};
use crate::parse::parse_version;
use hb_domain::{DetectionSource, HostVersion, VersionInfo};
use serde::Deserialize;
use std::path::PathBuf;

/// One entry of an installation-records file.
///
/// ```json
/// [{ "product": "HostApp", "version": "2024.2", "installPath": "/opt/HostApp 2024", "build": "20240612" }]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallRecord {
    pub product: String,
    pub version: String,
    #[serde(default)]
    pub install_path: Option<PathBuf>,
    #[serde(default)]
    pub build: Option<String>,
}

/// Reads installation records, the portable equivalent of an uninstall registry hive.
///
/// The newest record for the product with a parseable version wins.
#[derive(Debug, Clone)]
pub struct InstallRecords {
    path: Option<PathBuf>,
    product: String,
}

impl InstallRecords {
    #[must_use]
    pub fn new(path: Option<PathBuf>, product: impl Into<String>) -> Self {
        Self { path, product: product.into() }
    }
}

impl DetectionStrategy for InstallRecords {
    fn source(&self) -> DetectionSource {
        DetectionSource::Registry
    }

    fn probe(&self) -> Result<Option<VersionInfo>, DetectionError> {
        let Some(path) = self.path.as_deref().filter(|p| p.exists()) else {
            return Ok(None);
        };

        let raw = std::fs::read_to_string(path).context(format!("Reading {}", path.display()))?;
        let records: Vec<InstallRecord> =
            serde_json::from_str(&raw).context(format!("Parsing {}", path.display()))?;

        let mut best: Option<VersionInfo> = None;
        for record in records.into_iter().filter(|r| contains_ignore_case(&r.product, &self.product)) {
            let parsed = parse_version(&record.version)?;
            if parsed.version == HostVersion::Unknown {
                tracing::debug!(version = %record.version, "Skipping record without a supported year");
                continue;
            }
            if best.as_ref().is_some_and(|b| b.version >= parsed.version) {
                continue;
            }
            let is_valid_installation = record.install_path.as_deref().is_some_and(|p| p.is_dir());
            best = Some(VersionInfo {
                version: parsed.version,
                display: parsed.display,
                product: record.product,
                install_path: record.install_path,
                is_valid_installation,
                build: record.build,
                source: DetectionSource::Registry,
            });
        }

        Ok(best)
    }
}
