use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_OVERRIDE_VARIABLE: &str = "HOSTBRIDGE_HOST_VERSION";

/// Top-level bridge configuration shared across components.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BridgeConfigInner {
    pub bridge: CallConfig,
    pub detection: DetectionConfig,
    pub features: FeaturesConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into components.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    #[serde(flatten, default)]
    inner: Arc<BridgeConfigInner>,
}

impl Deref for BridgeConfig {
    type Target = BridgeConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for BridgeConfig {
    fn deref_mut(&mut self) -> &mut BridgeConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Limits applied to every call crossing the bridge.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CallConfig {
    pub max_payload_bytes: usize,
    pub default_timeout_ms: u64,
    pub max_timeout_ms: u64,
    /// Upper bound, in characters, on payload excerpts written to logs or error messages.
    pub log_excerpt_chars: usize,
}

/// Where and how to look for a host installation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub product_name: String,
    /// Environment variable that forces a version (e.g. `2024`) and skips probing.
    pub override_variable: String,
    pub install_roots: Vec<PathBuf>,
    /// JSON installation-records file, the portable stand-in for a registry hive.
    pub records_file: Option<PathBuf>,
    pub scan_depth: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    pub allow_deprecated: bool,
    pub allow_experimental: bool,
    pub license_file: Option<PathBuf>,
    /// Base64 Ed25519 public key used to verify `license_file`.
    pub license_public_key: Option<String>,
}

// --- Default ---

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            default_timeout_ms: 30_000,
            max_timeout_ms: 300_000,
            log_excerpt_chars: 128,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            product_name: "HostApp".to_owned(),
            override_variable: DEFAULT_OVERRIDE_VARIABLE.to_owned(),
            install_roots: Vec::new(),
            records_file: None,
            scan_depth: 3,
        }
    }
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            allow_deprecated: true,
            allow_experimental: false,
            license_file: None,
            license_public_key: None,
        }
    }
}

impl FeaturesConfig {
    /// Policy flags from this section. The license grant is resolved separately.
    #[must_use]
    pub fn policy(&self) -> crate::features::FeaturePolicy {
        crate::features::FeaturePolicy {
            allow_deprecated: self.allow_deprecated,
            allow_experimental: self.allow_experimental,
            license: crate::features::LicenseGrant::None,
        }
    }
}
