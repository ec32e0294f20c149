use super::Binding;
use crate::error::{AdapterError, AdapterErrorExt};
use crate::host::NativeView;
use crate::model::ViewInfo;

#[derive(Debug, Clone)]
pub struct ViewManager {
    binding: Binding,
}

impl ViewManager {
    pub(crate) const fn new(binding: Binding) -> Self {
        Self { binding }
    }

    fn info(&self, view: NativeView) -> Result<ViewInfo, AdapterError> {
        Ok(ViewInfo { id: self.binding.uniform_id(view.id)?, name: view.name, kind: view.kind })
    }

    pub fn list(&self) -> Result<Vec<ViewInfo>, AdapterError> {
        self.binding.host.views()?.into_iter().map(|v| self.info(v)).collect()
    }

    pub fn active(&self) -> Result<Option<ViewInfo>, AdapterError> {
        self.binding.host.active_view()?.map(|v| self.info(v)).transpose()
    }

    pub fn activate(&self, id: i64) -> Result<ViewInfo, AdapterError> {
        let native = self.binding.native_id(id)?;
        self.binding.host.activate_view(native).context(format!("view {id}"))?;
        self.active()?.ok_or_else(|| AdapterError::from("activated view is not active"))
    }
}
