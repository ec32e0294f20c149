use super::DetectionStrategy;
use crate::error::{DetectionError, DetectionErrorExt};
use crate::parse::parse_plausible;
use hb_domain::{DetectionSource, VersionInfo};
use std::fmt;
use std::sync::Arc;

/// Reads one environment variable. Injected so tests never touch the process environment.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Forces a version from an environment variable, e.g. `HOSTBRIDGE_HOST_VERSION=2024`.
pub struct EnvironmentOverride {
    variable: String,
    product: String,
    lookup: EnvLookup,
}

impl EnvironmentOverride {
    #[must_use]
    pub fn new(variable: impl Into<String>, product: impl Into<String>) -> Self {
        Self::with_lookup(variable, product, Arc::new(|name| std::env::var(name).ok()))
    }

    #[must_use]
    pub fn with_lookup(
        variable: impl Into<String>,
        product: impl Into<String>,
        lookup: EnvLookup,
    ) -> Self {
        Self { variable: variable.into(), product: product.into(), lookup }
    }
}

impl fmt::Debug for EnvironmentOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvironmentOverride")
            .field("variable", &self.variable)
            .field("product", &self.product)
            .finish_non_exhaustive()
    }
}

impl DetectionStrategy for EnvironmentOverride {
    fn source(&self) -> DetectionSource {
        DetectionSource::Environment
    }

    fn probe(&self) -> Result<Option<VersionInfo>, DetectionError> {
        let Some(raw) = (self.lookup)(&self.variable).filter(|v| !v.trim().is_empty()) else {
            return Ok(None);
        };

        let parsed = parse_plausible(&raw).context(format!("Override {}", self.variable))?;

        Ok(Some(VersionInfo {
            version: parsed.version,
            display: parsed.display,
            product: self.product.clone(),
            install_path: None,
            is_valid_installation: true,
            build: None,
            source: DetectionSource::Environment,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hb_domain::HostVersion;

    fn with_value(value: Option<&'static str>) -> EnvironmentOverride {
        EnvironmentOverride::with_lookup("HB_TEST", "HostApp", Arc::new(move |_| value.map(str::to_owned)))
    }

    #[test]
    fn forced_version_wins() {
        let info = with_value(Some("2023")).probe().unwrap().unwrap();
        assert_eq!(info.version, HostVersion::V2023);
        assert_eq!(info.source, DetectionSource::Environment);
    }

    #[test]
    fn unset_or_blank_is_nothing() {
        assert!(with_value(None).probe().unwrap().is_none());
        assert!(with_value(Some("  ")).probe().unwrap().is_none());
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(with_value(Some("banana")).probe().is_err());
    }
}
