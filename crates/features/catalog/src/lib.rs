//! # Feature Catalog
//!
//! Version-gated capability definitions and the resolver that decides their availability.
//!
//! * [`FeatureCatalog`] stores definitions; registration validates ranges and dependencies.
//! * [`FeatureResolver`] evaluates a catalog under a [`FeaturePolicy`](hb_domain::FeaturePolicy).
//!   `is_enabled`, dependency validation, and the [`CompatibilityMatrix`] share one rule set, so
//!   they never disagree.
//! * [`CompatibilityReport`] summarises how healthy a detected environment is.

mod catalog;
mod defaults;
mod error;
mod matrix;
mod report;
mod resolver;

pub use crate::catalog::FeatureCatalog;
pub use crate::defaults::builtin_features;
pub use crate::error::{CatalogError, CatalogErrorExt};
pub use crate::matrix::CompatibilityMatrix;
pub use crate::report::{CompatibilityIssue, CompatibilityReport, IssueCategory, Severity};
pub use crate::resolver::{FeatureResolver, ValidationResult};

impl FeatureCatalog {
    /// A catalog holding the built-in feature vocabulary.
    pub fn with_defaults() -> Result<Self, CatalogError> {
        let catalog = Self::new();
        catalog.register_all(builtin_features())?;
        Ok(catalog)
    }
}
