use crate::error::BridgeError;
use fxhash::FxHashMap;
use hb_adapters::Adapter;
use hb_catalog::FeatureResolver;
use hb_domain::CapabilitySet;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as Json;
use std::fmt;
use std::sync::Arc;

/// Whether a method changes host state. `Write` methods run inside a transaction and take the
/// mutation slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Read,
    Write,
}

/// Everything a handler gets for one call.
#[derive(Debug, Clone)]
pub struct MethodContext {
    pub request_id: String,
    pub adapter: Arc<Adapter>,
    pub resolver: FeatureResolver,
    pub params: Json,
}

impl MethodContext {
    /// Deserializes the call parameters.
    pub fn params<T: DeserializeOwned>(&self) -> Result<T, BridgeError> {
        serde_json::from_value(self.params.clone())
            .map_err(|e| BridgeError::validation(format!("invalid parameters: {e}")))
    }
}

pub type Handler = Arc<dyn Fn(MethodContext) -> Result<Json, BridgeError> + Send + Sync>;

/// Serializes a handler result.
pub fn reply<T: Serialize>(value: T) -> Result<Json, BridgeError> {
    Ok(serde_json::to_value(value)?)
}

#[derive(Clone)]
pub struct MethodSpec {
    name: String,
    access: Access,
    capability: CapabilitySet,
    feature: Option<String>,
    handler: Handler,
}

impl fmt::Debug for MethodSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodSpec")
            .field("name", &self.name)
            .field("access", &self.access)
            .field("capability", &self.capability)
            .field("feature", &self.feature)
            .finish_non_exhaustive()
    }
}

impl MethodSpec {
    pub fn new<F>(name: impl Into<String>, access: Access, handler: F) -> Self
    where
        F: Fn(MethodContext) -> Result<Json, BridgeError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            access,
            capability: CapabilitySet::empty(),
            feature: None,
            handler: Arc::new(handler),
        }
    }

    pub fn read<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(MethodContext) -> Result<Json, BridgeError> + Send + Sync + 'static,
    {
        Self::new(name, Access::Read, handler)
    }

    pub fn write<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(MethodContext) -> Result<Json, BridgeError> + Send + Sync + 'static,
    {
        Self::new(name, Access::Write, handler)
    }

    /// Host capabilities the adapter must expose.
    #[must_use]
    pub const fn requires(mut self, capability: CapabilitySet) -> Self {
        self.capability = capability;
        self
    }

    /// Feature that must be enabled, with its prerequisites, on the connected version.
    #[must_use]
    pub fn feature(mut self, feature: impl Into<String>) -> Self {
        self.feature = Some(feature.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn access(&self) -> Access {
        self.access
    }

    #[must_use]
    pub const fn capability(&self) -> CapabilitySet {
        self.capability
    }

    #[must_use]
    pub fn required_feature(&self) -> Option<&str> {
        self.feature.as_deref()
    }

    #[must_use]
    pub fn handler(&self) -> Handler {
        Arc::clone(&self.handler)
    }
}

/// Method name to spec.
#[derive(Debug, Clone, Default)]
pub struct MethodTable {
    methods: FxHashMap<String, Arc<MethodSpec>>,
}

impl MethodTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `spec`, returning the method it replaced.
    pub fn register(&mut self, spec: MethodSpec) -> Option<Arc<MethodSpec>> {
        self.methods.insert(spec.name.clone(), Arc::new(spec))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<MethodSpec>> {
        self.methods.get(name).cloned()
    }

    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.methods.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}
