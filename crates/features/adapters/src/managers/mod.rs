//! Capability managers. Each one serves a single area of the host API in uniform types and is
//! bound to one host and one version strategy.

mod element;
mod family;
mod geometry;
mod parameter;
mod selection;
mod transaction;
mod view;

pub use element::ElementManager;
pub use family::FamilyManager;
pub use geometry::GeometryManager;
pub use parameter::ParameterManager;
pub use selection::SelectionManager;
pub use transaction::{HostTransactionBackend, TransactionManager};
pub use view::ViewManager;

use crate::error::AdapterError;
use crate::host::{HostApplication, NativeElement, NativeId};
use crate::model::ElementInfo;
use crate::strategy::VersionStrategy;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct Binding {
    pub(crate) host: Arc<dyn HostApplication>,
    pub(crate) strategy: Arc<dyn VersionStrategy>,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("product", &self.host.product())
            .field("strategy", &self.strategy.name())
            .finish()
    }
}

impl Binding {
    pub(crate) fn new(host: Arc<dyn HostApplication>, strategy: Arc<dyn VersionStrategy>) -> Self {
        Self { host, strategy }
    }

    pub(crate) fn native_id(&self, id: i64) -> Result<NativeId, AdapterError> {
        self.strategy.native_id(id)
    }

    pub(crate) fn uniform_id(&self, id: NativeId) -> Result<i64, AdapterError> {
        self.strategy.uniform_id(id)
    }

    pub(crate) fn element_info(&self, element: NativeElement) -> Result<ElementInfo, AdapterError> {
        Ok(ElementInfo {
            id: self.uniform_id(element.id)?,
            name: element.name,
            category: element.category,
        })
    }
}
