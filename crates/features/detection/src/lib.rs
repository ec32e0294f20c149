//! # Version Detection
//!
//! Determines which host release is present by running [`DetectionStrategy`] probes in a fixed
//! order. The first probe with a plausible answer wins; results are never merged.
//!
//! Default order:
//! 1. [`EnvironmentOverride`]: forces a version and bypasses every other probe.
//! 2. [`InstallRecords`]: installation-records file.
//! 3. [`ProcessModules`]: host libraries loaded into this process.
//! 4. [`FilesystemScan`]: configured install roots.
//!
//! Every probe is failure tolerant. Errors are logged and the next probe runs; when all of them
//! come up empty the detector returns [`VersionInfo::unknown`] instead of failing.

mod error;
pub mod parse;
pub mod strategies;

pub use crate::error::{DetectionError, DetectionErrorExt};
pub use crate::strategies::{
    DetectionStrategy, EnvLookup, EnvironmentOverride, FilesystemScan, InstallRecord,
    InstallRecords, ProcessModules,
};

use hb_domain::VersionInfo;
use hb_domain::config::DetectionConfig;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Runs detection strategies and caches the outcome for the lifetime of the detector.
#[derive(Debug)]
pub struct VersionDetector {
    product: String,
    strategies: Vec<Box<dyn DetectionStrategy>>,
    cached: RwLock<Option<Arc<VersionInfo>>>,
}

impl VersionDetector {
    /// Detector over explicit strategies, tried in the given order.
    #[must_use]
    pub fn new(product: impl Into<String>, strategies: Vec<Box<dyn DetectionStrategy>>) -> Self {
        Self { product: product.into(), strategies, cached: RwLock::new(None) }
    }

    /// Detector with the default strategy order, reading the real process environment.
    #[must_use]
    pub fn from_config(config: &DetectionConfig) -> Self {
        Self::new(config.product_name.clone(), default_strategies(config, None))
    }

    /// Same as [`VersionDetector::from_config`] with an injected environment lookup.
    #[must_use]
    pub fn from_config_with_env(config: &DetectionConfig, lookup: EnvLookup) -> Self {
        Self::new(config.product_name.clone(), default_strategies(config, Some(lookup)))
    }

    /// Returns the cached result, probing on first use.
    pub fn detect(&self) -> Arc<VersionInfo> {
        if let Some(info) = self.cached.read().as_ref() {
            return Arc::clone(info);
        }

        let mut slot = self.cached.write();
        if let Some(info) = slot.as_ref() {
            return Arc::clone(info);
        }
        let info = Arc::new(self.run());
        *slot = Some(Arc::clone(&info));
        info
    }

    /// Discards the cached result and probes again.
    pub fn redetect(&self) -> Arc<VersionInfo> {
        let info = Arc::new(self.run());
        *self.cached.write() = Some(Arc::clone(&info));
        info
    }

    #[must_use]
    pub fn cached(&self) -> Option<Arc<VersionInfo>> {
        self.cached.read().clone()
    }

    #[instrument(skip(self), fields(product = %self.product))]
    fn run(&self) -> VersionInfo {
        for strategy in &self.strategies {
            let source = strategy.source();
            match strategy.probe() {
                Ok(Some(info)) if info.version.is_supported() => {
                    info!(%source, version = %info.version, display = %info.display, "Host detected");
                    return info;
                },
                Ok(Some(info)) => {
                    debug!(%source, display = %info.display, "Ignoring implausible probe result");
                },
                Ok(None) => debug!(%source, "Probe found nothing"),
                Err(e) => warn!(%source, error = %e, "Probe failed"),
            }
        }

        warn!("No host installation detected");
        VersionInfo::unknown(self.product.clone())
    }
}

/// The default strategy order for `config`.
#[must_use]
pub fn default_strategies(
    config: &DetectionConfig,
    lookup: Option<EnvLookup>,
) -> Vec<Box<dyn DetectionStrategy>> {
    let product = config.product_name.as_str();
    let environment = match lookup {
        Some(lookup) => {
            EnvironmentOverride::with_lookup(config.override_variable.clone(), product, lookup)
        },
        None => EnvironmentOverride::new(config.override_variable.clone(), product),
    };

    vec![
        Box::new(environment),
        Box::new(InstallRecords::new(config.records_file.clone(), product)),
        Box::new(ProcessModules::new(product)),
        Box::new(FilesystemScan::new(config.install_roots.clone(), product, config.scan_depth)),
    ]
}
