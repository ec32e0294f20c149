use super::Binding;
use crate::error::{AdapterError, AdapterErrorExt};
use crate::host::HostError;
use crate::model::ElementInfo;

#[derive(Debug, Clone)]
pub struct ElementManager {
    binding: Binding,
}

impl ElementManager {
    pub(crate) const fn new(binding: Binding) -> Self {
        Self { binding }
    }

    pub fn get(&self, id: i64) -> Result<ElementInfo, AdapterError> {
        let native = self.binding.native_id(id)?;
        let element = self.binding.host.element(native).context(format!("element {id}"))?;
        self.binding.element_info(element)
    }

    pub fn exists(&self, id: i64) -> Result<bool, AdapterError> {
        let native = self.binding.native_id(id)?;
        match self.binding.host.element(native) {
            Ok(_) => Ok(true),
            Err(HostError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub fn by_category(&self, category: &str) -> Result<Vec<ElementInfo>, AdapterError> {
        self.binding
            .host
            .elements_by_category(category)
            .context(format!("category '{category}'"))?
            .into_iter()
            .map(|e| self.binding.element_info(e))
            .collect()
    }

    /// Requires an open transaction.
    pub fn create(&self, category: &str, name: &str) -> Result<ElementInfo, AdapterError> {
        let element = self.binding.host.create_element(category, name)?;
        self.binding.element_info(element)
    }

    /// Requires an open transaction.
    pub fn delete(&self, id: i64) -> Result<(), AdapterError> {
        let native = self.binding.native_id(id)?;
        self.binding.host.delete_element(native).context(format!("element {id}"))
    }
}
