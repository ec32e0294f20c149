use super::{DetectionStrategy, contains_ignore_case};
use crate::error::DetectionError;
use crate::parse::parse_version;
use hb_domain::{DetectionSource, HostVersion, VersionInfo};
use std::path::PathBuf;
use walkdir::WalkDir;

/// Walks configured install roots looking for `<product> <year>` directories.
#[derive(Debug, Clone)]
pub struct FilesystemScan {
    roots: Vec<PathBuf>,
    product: String,
    depth: usize,
}

impl FilesystemScan {
    #[must_use]
    pub fn new(roots: Vec<PathBuf>, product: impl Into<String>, depth: usize) -> Self {
        Self { roots, product: product.into(), depth: depth.max(1) }
    }
}

impl DetectionStrategy for FilesystemScan {
    fn source(&self) -> DetectionSource {
        DetectionSource::Filesystem
    }

    fn probe(&self) -> Result<Option<VersionInfo>, DetectionError> {
        let mut best: Option<VersionInfo> = None;

        for root in self.roots.iter().filter(|r| r.is_dir()) {
            let walker = WalkDir::new(root).min_depth(1).max_depth(self.depth).follow_links(false);
            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        tracing::trace!(error = %e, "Skipping unreadable entry");
                        continue;
                    },
                };
                if !entry.file_type().is_dir() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy();
                if !contains_ignore_case(&name, &self.product) {
                    continue;
                }
                let parsed = parse_version(&name)?;
                if parsed.version == HostVersion::Unknown
                    || best.as_ref().is_some_and(|b| b.version >= parsed.version)
                {
                    continue;
                }
                let is_valid_installation = std::fs::read_dir(entry.path())
                    .map(|mut entries| entries.next().is_some())
                    .unwrap_or(false);
                best = Some(VersionInfo {
                    version: parsed.version,
                    display: parsed.display,
                    product: self.product.clone(),
                    install_path: Some(entry.path().to_path_buf()),
                    is_valid_installation,
                    build: None,
                    source: DetectionSource::Filesystem,
                });
            }
        }

        Ok(best)
    }
}
