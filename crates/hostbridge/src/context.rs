use crate::error::{HostBridgeError, HostBridgeErrorExt};
use hb_adapters::{Adapter, AdapterRegistry, HostApplication, StrategyRegistry};
use hb_bridge::{BridgeError, CallBridge};
use hb_catalog::{CompatibilityReport, FeatureCatalog, FeatureResolver};
use hb_detection::{EnvLookup, VersionDetector};
use hb_domain::config::BridgeConfig;
use hb_domain::{LicenseGrant, VersionInfo};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

/// Every bridge component for one process, built once and passed to whoever needs it.
///
/// Nothing here is global: tests build as many independent contexts as they like, each with
/// its own detector, catalog and policy.
#[derive(Debug, Clone)]
pub struct BridgeContext {
    config: BridgeConfig,
    detector: Arc<VersionDetector>,
    resolver: FeatureResolver,
    registry: Arc<AdapterRegistry>,
    bridge: Arc<CallBridge>,
}

impl BridgeContext {
    #[must_use]
    pub fn builder() -> BridgeContextBuilder {
        BridgeContextBuilder::default()
    }

    /// Loads configuration from `path` (plus `HOSTBRIDGE__` environment overrides) and builds a
    /// context with the default components.
    pub fn load(path: Option<&Path>) -> Result<Self, HostBridgeError> {
        let config: BridgeConfig =
            hb_kernel::config::load_config(path).context("Loading bridge configuration")?;
        Self::builder().config(config).build()
    }

    #[must_use]
    pub const fn config(&self) -> &BridgeConfig {
        &self.config
    }

    #[must_use]
    pub fn detector(&self) -> &VersionDetector {
        &self.detector
    }

    #[must_use]
    pub const fn resolver(&self) -> &FeatureResolver {
        &self.resolver
    }

    #[must_use]
    pub const fn registry(&self) -> &Arc<AdapterRegistry> {
        &self.registry
    }

    #[must_use]
    pub const fn bridge(&self) -> &Arc<CallBridge> {
        &self.bridge
    }

    /// The cached detection result, probing on first use.
    #[must_use]
    pub fn detect(&self) -> Arc<VersionInfo> {
        self.detector.detect()
    }

    /// How healthy the detected environment is.
    #[must_use]
    pub fn report(&self) -> CompatibilityReport {
        CompatibilityReport::evaluate(&self.detect(), &self.resolver)
    }

    /// Connects the bridge to `host` using the detected version.
    pub fn connect(&self, host: Arc<dyn HostApplication>) -> Result<Arc<Adapter>, BridgeError> {
        self.bridge.try_connect(host, &self.detect())
    }
}

/// Assembles a [`BridgeContext`]. Anything not supplied is built from the configuration.
#[derive(Default)]
pub struct BridgeContextBuilder {
    config: Option<BridgeConfig>,
    env: Option<EnvLookup>,
    detector: Option<VersionDetector>,
    catalog: Option<FeatureCatalog>,
    license: Option<LicenseGrant>,
    strategies: Option<StrategyRegistry>,
}

impl std::fmt::Debug for BridgeContextBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeContextBuilder")
            .field("config", &self.config)
            .field("detector", &self.detector)
            .field("license", &self.license)
            .finish_non_exhaustive()
    }
}

impl BridgeContextBuilder {
    #[must_use]
    pub fn config(mut self, config: BridgeConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Environment lookup used by the default detector's override probe.
    #[must_use]
    pub fn env_lookup(mut self, lookup: EnvLookup) -> Self {
        self.env = Some(lookup);
        self
    }

    #[must_use]
    pub fn detector(mut self, detector: VersionDetector) -> Self {
        self.detector = Some(detector);
        self
    }

    #[must_use]
    pub fn catalog(mut self, catalog: FeatureCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Overrides the license grant instead of reading the configured license file.
    #[must_use]
    pub fn license(mut self, grant: LicenseGrant) -> Self {
        self.license = Some(grant);
        self
    }

    #[must_use]
    pub fn strategies(mut self, strategies: StrategyRegistry) -> Self {
        self.strategies = Some(strategies);
        self
    }

    #[instrument(skip_all)]
    pub fn build(self) -> Result<BridgeContext, HostBridgeError> {
        let config = self.config.unwrap_or_default();

        let detector = match (self.detector, self.env) {
            (Some(detector), _) => detector,
            (None, Some(lookup)) => VersionDetector::from_config_with_env(&config.detection, lookup),
            (None, None) => VersionDetector::from_config(&config.detection),
        };

        let catalog = match self.catalog {
            Some(catalog) => catalog,
            None => FeatureCatalog::with_defaults().context("Registering built-in features")?,
        };
        let license = self.license.unwrap_or_else(|| hb_licensing::resolve_grant(&config.features));
        let policy = config.features.policy().with_license(license);
        let resolver = FeatureResolver::new(Arc::new(catalog), policy);

        let strategies = self.strategies.unwrap_or_default();
        let registry = Arc::new(AdapterRegistry::with_strategies(resolver.clone(), strategies));
        let bridge = CallBridge::new(&config.bridge, Arc::clone(&registry))
            .context("Creating call bridge")?;

        info!(features = resolver.catalog().len(), "Bridge context ready");
        Ok(BridgeContext {
            config,
            detector: Arc::new(detector),
            resolver,
            registry,
            bridge: Arc::new(bridge),
        })
    }
}
