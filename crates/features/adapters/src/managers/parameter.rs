use super::Binding;
use crate::error::{AdapterError, AdapterErrorExt};
use hb_domain::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct ParameterManager {
    binding: Binding,
}

impl ParameterManager {
    pub(crate) const fn new(binding: Binding) -> Self {
        Self { binding }
    }

    pub fn get(&self, id: i64, name: &str) -> Result<Value, AdapterError> {
        let native = self.binding.native_id(id)?;
        let value =
            self.binding.host.parameter(native, name).context(format!("parameter '{name}' of {id}"))?;
        self.binding.strategy.to_uniform(&value)
    }

    /// All parameters of an element, by name.
    pub fn all(&self, id: i64) -> Result<BTreeMap<String, Value>, AdapterError> {
        let native = self.binding.native_id(id)?;
        let names = self.binding.host.parameter_names(native).context(format!("element {id}"))?;
        names
            .into_iter()
            .map(|name| {
                let value = self.get(id, &name)?;
                Ok((name, value))
            })
            .collect()
    }

    /// Requires an open transaction.
    pub fn set(&self, id: i64, name: &str, value: &Value) -> Result<(), AdapterError> {
        let native = self.binding.native_id(id)?;
        let converted = self.binding.strategy.to_native(value)?;
        self.binding
            .host
            .set_parameter(native, name, converted)
            .context(format!("parameter '{name}' of {id}"))
    }
}
