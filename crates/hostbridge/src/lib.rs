//! Facade crate for the host bridge.
//! Re-exports the component crates and builds the [`BridgeContext`] that wires them together.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! ```rust,no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use hostbridge::BridgeContext;
//! use hostbridge::adapters::SimulatedHost;
//! use std::sync::Arc;
//!
//! let context = BridgeContext::builder().build()?;
//! let year = context.detect().version.year().unwrap_or(2025);
//! context.connect(Arc::new(SimulatedHost::new(year)))?;
//! let response = context.bridge().call("host.info", "{}", None).await;
//! # let _ = response;
//! # Ok(())
//! # }
//! ```

mod context;
mod error;

pub use crate::context::{BridgeContext, BridgeContextBuilder};
pub use crate::error::{HostBridgeError, HostBridgeErrorExt};
pub use hb_adapters as adapters;
pub use hb_bridge as bridge;
pub use hb_catalog as catalog;
pub use hb_detection as detection;
pub use hb_domain as domain;
pub use hb_kernel as kernel;
pub use hb_licensing as licensing;
pub use hb_transactions as transactions;

/// The types most front ends need.
pub mod prelude {
    pub use crate::{BridgeContext, HostBridgeError};
    pub use hb_adapters::{HostApplication, SimulatedHost};
    pub use hb_bridge::{BridgeError, CallBridge, CallResponse, MethodSpec};
    pub use hb_domain::features::keys;
    pub use hb_domain::{FeatureStatus, HostVersion, LicenseGrant, VersionInfo};
}
