//! # Adapters
//!
//! Version-bound access to the host application.
//!
//! * [`HostApplication`] is the host's native API. [`SimulatedHost`] implements it in memory.
//! * [`VersionStrategy`] captures how one release family represents identifiers and units;
//!   [`StrategyRegistry`] selects one per [`HostVersion`](hb_domain::HostVersion).
//! * [`Adapter`] bundles the capability managers for one version plus a [`FeatureAdapter`] for
//!   every feature the resolver enables on it.
//! * [`AdapterRegistry`] builds adapters through `Uninitialized -> Initializing -> Ready | Failed`
//!   and never publishes a half-built one.

mod adapter;
mod error;
pub mod host;
pub mod managers;
mod model;
mod registry;
pub mod simulated;
pub mod strategy;

pub use crate::adapter::{Adapter, FeatureAdapter};
pub use crate::error::{AdapterError, AdapterErrorExt};
pub use crate::host::{HostApplication, HostError, NativeId, NativeValue, Xyz};
pub use crate::model::{ElementInfo, SymbolInfo, ViewInfo};
pub use crate::registry::{
    AdapterContext, AdapterRegistry, AdapterState, REQUIRED_MODULES, module_capabilities,
};
pub use crate::simulated::{Fault, SimulatedHost};
pub use crate::strategy::{StrategyRegistry, VersionStrategy};
