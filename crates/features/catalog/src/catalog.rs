use crate::error::CatalogError;
use fxhash::FxHashMap;
use hb_domain::FeatureDefinition;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};

/// Registry of feature definitions, keyed by their stable name.
///
/// Read-mostly: lookups take a shared lock and hand out `Arc`s, so resolvers never hold the lock
/// while evaluating rules.
#[derive(Debug, Default)]
pub struct FeatureCatalog {
    features: RwLock<FxHashMap<String, Arc<FeatureDefinition>>>,
}

impl FeatureCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a definition.
    ///
    /// The range must be ordered and every dependency must already be registered. Replacing an
    /// existing entry logs a warning; registering an identical definition twice is a no-op.
    pub fn register(&self, definition: FeatureDefinition) -> Result<(), CatalogError> {
        validate_range(&definition)?;

        let mut features = self.features.write();

        if let Some(missing) = definition
            .dependencies
            .iter()
            .find(|dep| *dep == &definition.name || !features.contains_key(dep.as_str()))
        {
            return Err(CatalogError::UnknownDependency {
                message: format!("'{}' depends on unregistered '{missing}'", definition.name)
                    .into(),
                context: None,
            });
        }

        match features.get(&definition.name) {
            Some(existing) if **existing == definition => {
                debug!(feature = %definition.name, "Identical feature re-registered");
                return Ok(());
            },
            Some(_) => warn!(feature = %definition.name, "Overwriting feature definition"),
            None => debug!(feature = %definition.name, "Feature registered"),
        }

        features.insert(definition.name.clone(), Arc::new(definition));
        Ok(())
    }

    /// Registers several definitions in order, stopping at the first failure.
    pub fn register_all(
        &self,
        definitions: impl IntoIterator<Item = FeatureDefinition>,
    ) -> Result<(), CatalogError> {
        definitions.into_iter().try_for_each(|d| self.register(d))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<FeatureDefinition>> {
        self.features.read().get(name).cloned()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.features.read().contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.read().is_empty()
    }

    /// All feature names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.features.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// All definitions, sorted by name.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<FeatureDefinition>> {
        let mut defs: Vec<_> = self.features.read().values().cloned().collect();
        defs.sort_unstable_by(|a, b| a.name.cmp(&b.name));
        defs
    }
}

fn validate_range(definition: &FeatureDefinition) -> Result<(), CatalogError> {
    if definition.name.trim().is_empty() {
        return Err(CatalogError::InvalidDefinition {
            message: "feature name cannot be empty".into(),
            context: None,
        });
    }
    if let Some(max) = definition.max_version
        && max < definition.min_version
    {
        return Err(CatalogError::InvalidDefinition {
            message: format!(
                "'{}' has minimum {} above maximum {max}",
                definition.name, definition.min_version
            )
            .into(),
            context: None,
        });
    }
    Ok(())
}
