use super::Binding;
use crate::error::AdapterError;

#[derive(Debug, Clone)]
pub struct SelectionManager {
    binding: Binding,
}

impl SelectionManager {
    pub(crate) const fn new(binding: Binding) -> Self {
        Self { binding }
    }

    pub fn get(&self) -> Result<Vec<i64>, AdapterError> {
        self.binding.host.selection()?.into_iter().map(|id| self.binding.uniform_id(id)).collect()
    }

    /// Replaces the selection. Unknown identifiers are rejected by the host.
    pub fn set(&self, ids: &[i64]) -> Result<(), AdapterError> {
        let native = ids.iter().map(|id| self.binding.native_id(*id)).collect::<Result<Vec<_>, _>>()?;
        Ok(self.binding.host.set_selection(&native)?)
    }
}
