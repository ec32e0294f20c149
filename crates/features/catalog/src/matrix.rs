use crate::error::CatalogError;
use hb_domain::{FeatureStatus, HostVersion};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Derived feature by version availability table. Never edited by hand; rebuild it from a
/// resolver whenever the catalog or policy changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompatibilityMatrix {
    versions: Vec<HostVersion>,
    features: BTreeMap<String, BTreeMap<HostVersion, FeatureStatus>>,
}

impl CompatibilityMatrix {
    pub(crate) const fn new(versions: Vec<HostVersion>) -> Self {
        Self { versions, features: BTreeMap::new() }
    }

    pub(crate) fn set(&mut self, feature: &str, version: HostVersion, status: FeatureStatus) {
        self.features.entry(feature.to_owned()).or_default().insert(version, status);
    }

    #[must_use]
    pub fn versions(&self) -> &[HostVersion] {
        &self.versions
    }

    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.features.keys().map(String::as_str)
    }

    #[must_use]
    pub fn status(&self, feature: &str, version: HostVersion) -> Option<FeatureStatus> {
        self.features.get(feature).and_then(|row| row.get(&version)).copied()
    }

    /// Features whose status on `version` is enabled, sorted.
    #[must_use]
    pub fn enabled_on(&self, version: HostVersion) -> Vec<&str> {
        self.features
            .iter()
            .filter(|(_, row)| row.get(&version).is_some_and(|s| s.is_enabled()))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn to_json(&self) -> Result<String, CatalogError> {
        serde_json::to_string_pretty(self).map_err(CatalogError::from)
    }

    /// Renders a Markdown table, one row per feature.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::from("| Feature |");
        for version in &self.versions {
            let _ = write!(out, " {version} |");
        }
        out.push_str("\n|---|");
        for _ in &self.versions {
            out.push_str("---|");
        }
        out.push('\n');

        for (name, row) in &self.features {
            let _ = write!(out, "| {name} |");
            for version in &self.versions {
                let cell = row.get(version).map_or("", |s| s.into());
                let _ = write!(out, " {cell} |");
            }
            out.push('\n');
        }
        out
    }
}
