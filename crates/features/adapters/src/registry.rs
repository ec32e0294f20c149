use crate::adapter::{Adapter, FeatureAdapter};
use crate::error::AdapterError;
use crate::host::HostApplication;
use crate::managers::{
    Binding, ElementManager, FamilyManager, GeometryManager, ParameterManager, SelectionManager,
    TransactionManager, ViewManager,
};
use crate::strategy::StrategyRegistry;
use fxhash::FxHashMap;
use hb_catalog::FeatureResolver;
use hb_domain::features::keys;
use hb_domain::{CapabilitySet, HostVersion};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use strum_macros::{Display, IntoStaticStr};
use tracing::{debug, info, instrument, warn};

/// Modules an adapter cannot work without.
pub const REQUIRED_MODULES: [&str; 1] = ["core"];

/// Capabilities contributed by a loaded host module.
#[must_use]
pub fn module_capabilities(module: &str) -> CapabilitySet {
    match module {
        "core" => CapabilitySet::ELEMENTS | CapabilitySet::PARAMETERS | CapabilitySet::TRANSACTIONS,
        "geometry" => CapabilitySet::GEOMETRY,
        "ui" => CapabilitySet::SELECTION | CapabilitySet::VIEWS,
        "families" => CapabilitySet::FAMILIES,
        _ => CapabilitySet::empty(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AdapterState {
    #[default]
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

/// What an adapter is built against.
#[derive(Clone)]
pub struct AdapterContext {
    host: Option<Arc<dyn HostApplication>>,
    required_modules: Vec<String>,
}

impl fmt::Debug for AdapterContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterContext")
            .field("host", &self.host.as_ref().map(|h| h.product().to_owned()))
            .field("required_modules", &self.required_modules)
            .finish()
    }
}

impl AdapterContext {
    #[must_use]
    pub fn new(host: Arc<dyn HostApplication>) -> Self {
        Self { host: Some(host), ..Self::detached() }
    }

    /// A context without a host handle. Initialization against it always fails.
    #[must_use]
    pub fn detached() -> Self {
        Self { host: None, required_modules: REQUIRED_MODULES.iter().map(|m| (*m).to_owned()).collect() }
    }

    #[must_use]
    pub fn require_module(mut self, module: impl Into<String>) -> Self {
        self.required_modules.push(module.into());
        self
    }

    #[must_use]
    pub fn host(&self) -> Option<&Arc<dyn HostApplication>> {
        self.host.as_ref()
    }
}

#[derive(Debug, Default)]
struct Slot {
    state: AdapterState,
    adapter: Option<Arc<Adapter>>,
    failure: Option<String>,
}

/// Builds and holds at most one adapter per host version.
///
/// Only `Ready` adapters are ever handed out. Building and rebuilding happen under a single
/// initialization lock; readers never wait on it.
#[derive(Debug)]
pub struct AdapterRegistry {
    resolver: FeatureResolver,
    strategies: StrategyRegistry,
    slots: RwLock<FxHashMap<HostVersion, Slot>>,
    init_lock: Mutex<()>,
}

impl AdapterRegistry {
    #[must_use]
    pub fn new(resolver: FeatureResolver) -> Self {
        Self::with_strategies(resolver, StrategyRegistry::default())
    }

    #[must_use]
    pub fn with_strategies(resolver: FeatureResolver, strategies: StrategyRegistry) -> Self {
        Self {
            resolver,
            strategies,
            slots: RwLock::new(FxHashMap::default()),
            init_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub const fn resolver(&self) -> &FeatureResolver {
        &self.resolver
    }

    #[must_use]
    pub fn state(&self, version: HostVersion) -> AdapterState {
        self.slots.read().get(&version).map_or(AdapterState::Uninitialized, |s| s.state)
    }

    /// Why the last initialization for `version` failed.
    #[must_use]
    pub fn last_failure(&self, version: HostVersion) -> Option<String> {
        self.slots.read().get(&version).and_then(|s| s.failure.clone())
    }

    /// The published adapter for `version`, if it is `Ready`.
    #[must_use]
    pub fn get(&self, version: HostVersion) -> Option<Arc<Adapter>> {
        self.slots
            .read()
            .get(&version)
            .filter(|s| s.state == AdapterState::Ready)
            .and_then(|s| s.adapter.clone())
    }

    /// Versions with a published adapter.
    #[must_use]
    pub fn ready_versions(&self) -> Vec<HostVersion> {
        let mut versions: Vec<_> = self
            .slots
            .read()
            .iter()
            .filter(|(_, s)| s.state == AdapterState::Ready)
            .map(|(v, _)| *v)
            .collect();
        versions.sort_unstable();
        versions
    }

    /// Returns the adapter for `version`, building it first if needed.
    ///
    /// A cached adapter bound to a different host handle than `context` carries is replaced.
    /// A `Failed` version is retried. On failure nothing is published.
    pub fn initialize(
        &self,
        version: HostVersion,
        context: &AdapterContext,
    ) -> Result<Arc<Adapter>, AdapterError> {
        let _guard = self.init_lock.lock();
        if let Some(adapter) = self.get(version) {
            match &context.host {
                Some(host) if !std::ptr::addr_eq(Arc::as_ptr(host), Arc::as_ptr(&adapter.host)) => {
                    info!(%version, "Host handle changed, rebuilding adapter");
                    self.slots.write().remove(&version);
                },
                _ => return Ok(adapter),
            }
        }
        self.build_and_publish(version, context)
    }

    /// Discards the adapter for `version` and builds a new one. Callers holding the old adapter
    /// keep using it.
    pub fn reinitialize(
        &self,
        version: HostVersion,
        context: &AdapterContext,
    ) -> Result<Arc<Adapter>, AdapterError> {
        let _guard = self.init_lock.lock();
        self.slots.write().remove(&version);
        self.build_and_publish(version, context)
    }

    /// Forgets the adapter for `version`.
    pub fn reset(&self, version: HostVersion) {
        let _guard = self.init_lock.lock();
        self.slots.write().remove(&version);
    }

    fn build_and_publish(
        &self,
        version: HostVersion,
        context: &AdapterContext,
    ) -> Result<Arc<Adapter>, AdapterError> {
        self.slots.write().insert(version, Slot { state: AdapterState::Initializing, ..Slot::default() });

        match self.build(version, context) {
            Ok(adapter) => {
                let adapter = Arc::new(adapter);
                info!(%version, strategy = adapter.strategy_name(), features = adapter.features.len(), "Adapter ready");
                self.slots.write().insert(
                    version,
                    Slot { state: AdapterState::Ready, adapter: Some(Arc::clone(&adapter)), failure: None },
                );
                Ok(adapter)
            },
            Err(e) => {
                warn!(%version, error = %e, "Adapter initialization failed");
                self.slots.write().insert(
                    version,
                    Slot { state: AdapterState::Failed, adapter: None, failure: Some(e.to_string()) },
                );
                Err(e)
            },
        }
    }

    #[instrument(skip(self, context), fields(%version))]
    fn build(&self, version: HostVersion, context: &AdapterContext) -> Result<Adapter, AdapterError> {
        let strategy = self.strategies.get(version)?;
        let host = context.host.clone().ok_or_else(|| AdapterError::Precondition {
            message: "no host application handle".into(),
            context: None,
        })?;

        // Managers bound to this version.
        let modules = host.loaded_modules();
        let capabilities =
            modules.iter().fold(CapabilitySet::empty(), |caps, m| caps | module_capabilities(m));
        let nesting = strategy.supports_nested_transactions()
            && self.resolver.is_enabled(keys::NESTED_TRANSACTIONS, version);
        let binding = Binding::new(Arc::clone(&host), Arc::clone(&strategy));
        debug!(?capabilities, nesting, "Managers bound");

        // One feature adapter per feature enabled on this version.
        let mut features = BTreeMap::new();
        for def in self.resolver.catalog().snapshot() {
            let status = self.resolver.status(&def.name, version);
            if !status.is_enabled() {
                continue;
            }
            let dependencies = self
                .resolver
                .resolve_dependencies(&def.name, version)
                .map_err(|e| e.to_string());
            if let Err(reason) = &dependencies {
                warn!(feature = %def.name, %reason, "Feature registered with unresolved dependencies");
            }
            features.insert(
                def.name.clone(),
                FeatureAdapter::new(def.name.clone(), status, def.capabilities, capabilities, dependencies),
            );
        }

        validate_preconditions(version, host.as_ref(), &modules, &context.required_modules)?;

        Ok(Adapter {
            version,
            strategy,
            capabilities,
            elements: ElementManager::new(binding.clone()),
            parameters: ParameterManager::new(binding.clone()),
            geometry: GeometryManager::new(binding.clone()),
            selection: SelectionManager::new(binding.clone()),
            views: ViewManager::new(binding.clone()),
            families: FamilyManager::new(binding),
            transactions: TransactionManager::new(Arc::clone(&host), nesting),
            host,
            features,
        })
    }
}

fn validate_preconditions(
    version: HostVersion,
    host: &dyn HostApplication,
    modules: &[String],
    required: &[String],
) -> Result<(), AdapterError> {
    if let Some(missing) = required.iter().find(|r| !modules.contains(r)) {
        return Err(AdapterError::Precondition {
            message: format!("required host module '{missing}' is not loaded").into(),
            context: Some(host.product().to_owned().into()),
        });
    }

    let reported = HostVersion::from_year(host.version_year());
    if reported != version {
        return Err(AdapterError::Precondition {
            message: format!(
                "host reports {} ({reported}) but the adapter targets {version}",
                host.version_year()
            )
            .into(),
            context: Some(host.product().to_owned().into()),
        });
    }
    Ok(())
}
