//! # Domain Models
//!
//! Pure data shared across the bridge: the closed host version enumeration, feature definitions
//! and policies, capability flags, the uniform value representation, and configuration.
//! Keep it lean: no I/O or heavy logic, just data and simple helpers.

pub mod capability;
pub mod config;
pub mod features;
pub mod value;
pub mod version;

pub use capability::CapabilitySet;
pub use features::{
    FeatureCategory, FeatureDefinition, FeaturePolicy, FeatureStatus, LicenseGrant,
    PerformanceProfile, Stability, VersionOverride,
};
pub use value::{Point3, Value};
pub use version::{DetectionSource, HostVersion, VersionInfo};
