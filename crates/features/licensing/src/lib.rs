//! # Licensing
//!
//! Verifies Ed25519-signed licenses and turns them into the [`LicenseGrant`] consulted by the
//! feature resolver for license-gated features.
//!
//! ## Architecture
//!
//! 1.  **Validation ([`validator`]):** checks the validity window and the signature over the
//!     postcard encoding of [`LicenseData`].
//! 2.  **Issuance ([`issuer`]):** signs a payload with a private key. Used by vendor tooling and
//!     tests; production hosts only ever hold the public key.
//! 3.  **Resolution ([`resolve_grant`]):** the policy-layer entry point. Any failure degrades to
//!     [`LicenseGrant::None`] with a logged warning, so a broken license never stops the bridge.
//!
//! Licenses are stored as JSON with Base64-encoded signatures.

mod error;
pub mod issuer;
pub mod validator;

pub use crate::error::{LicenseError, LicenseErrorExt};
pub use hb_domain::LicenseGrant;

use base64::{Engine as _, engine::general_purpose};
use hb_domain::config::FeaturesConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// A container for a license payload and its corresponding cryptographic signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedLicense {
    pub data: LicenseData,
    /// The Ed25519 signature of the `data` field, encoded as a Base64 string in JSON.
    #[serde(with = "bytes_as_base64")]
    pub signature: Vec<u8>,
}

impl SignedLicense {
    /// Serializes the signed license into a compact binary format using Postcard.
    pub fn encode_bin(&self) -> Result<Vec<u8>, LicenseError> {
        postcard::to_stdvec(self).map_err(LicenseError::from)
    }

    pub fn decode_bin(bytes: &[u8]) -> Result<Self, LicenseError> {
        postcard::from_bytes(bytes).map_err(LicenseError::from)
    }

    pub fn to_json(&self) -> Result<String, LicenseError> {
        serde_json::to_string_pretty(self).map_err(LicenseError::from)
    }

    pub fn from_json(json: &str) -> Result<Self, LicenseError> {
        serde_json::from_str(json).map_err(LicenseError::from)
    }

    /// Checks the validity window and the signature.
    pub fn validate(&self, key: &[u8; 32]) -> Result<(), LicenseError> {
        validator::validate_license(self, key)
    }

    /// Validates and converts into a grant.
    pub fn grant(&self, key: &[u8; 32]) -> Result<LicenseGrant, LicenseError> {
        self.validate(key)?;
        Ok(self.data.features.to_grant())
    }
}

/// The signed payload of a license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LicenseData {
    pub customer: String,
    pub features: LicensedFeatures,
    /// UNIX timestamp (seconds) when the license was created.
    pub issued: i64,
    /// UNIX timestamp (seconds) after which the license is rejected.
    pub expires: i64,
}

/// Feature scope of a license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LicensedFeatures {
    /// Every license-gated feature, present and future.
    All,
    Only(Vec<String>),
}

impl LicensedFeatures {
    #[must_use]
    pub fn to_grant(&self) -> LicenseGrant {
        match self {
            Self::All => LicenseGrant::All,
            Self::Only(names) => LicenseGrant::Features(names.iter().cloned().collect()),
        }
    }
}

/// Decodes a Base64 (standard alphabet, padding optional) Ed25519 public key.
pub fn decode_public_key(encoded: &str) -> Result<[u8; 32], LicenseError> {
    let trimmed = encoded.trim().trim_end_matches('=');
    let bytes = general_purpose::STANDARD_NO_PAD.decode(trimmed).map_err(|e| {
        LicenseError::InvalidKey { message: e.to_string().into(), context: Some("Base64".into()) }
    })?;
    bytes.try_into().map_err(|bytes: Vec<u8>| LicenseError::InvalidKey {
        message: format!("expected 32 bytes, got {}", bytes.len()).into(),
        context: None,
    })
}

/// Reads and verifies the license at `path`.
pub fn load_license(path: &Path, key: &[u8; 32]) -> Result<LicenseGrant, LicenseError> {
    let raw = std::fs::read_to_string(path)
        .context(format!("Reading license {}", path.display()))?;
    SignedLicense::from_json(&raw)?.grant(key)
}

/// Resolves the license grant configured in `config`.
///
/// Missing configuration means no license. Unreadable, tampered, or expired licenses also
/// yield [`LicenseGrant::None`] and log a warning.
#[must_use]
pub fn resolve_grant(config: &FeaturesConfig) -> LicenseGrant {
    let (Some(path), Some(key)) = (&config.license_file, &config.license_public_key) else {
        debug!("No license configured");
        return LicenseGrant::None;
    };

    match decode_public_key(key).and_then(|key| load_license(path, &key)) {
        Ok(grant) => {
            debug!(path = %path.display(), ?grant, "License accepted");
            grant
        },
        Err(e) => {
            warn!(path = %path.display(), error = %e, "License rejected, license-gated features stay disabled");
            LicenseGrant::None
        },
    }
}

/// Helper module for transparently serializing byte buffers to Base64 strings.
#[allow(clippy::redundant_pub_crate)]
pub mod bytes_as_base64 {
    use base64::{Engine as _, engine::general_purpose};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub(super) fn serialize<S: Serializer>(v: &Vec<u8>, s: S) -> Result<S::Ok, S::Error> {
        let mut buf = String::with_capacity((v.len() * 4).div_ceil(3));
        general_purpose::STANDARD_NO_PAD.encode_string(v, &mut buf);
        String::serialize(&buf, s)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        match general_purpose::STANDARD_NO_PAD.decode(String::deserialize(d)?) {
            Ok(bytes) => Ok(bytes),
            Err(e) => Err(serde::de::Error::custom(format!("Invalid Base64: {e}"))),
        }
    }
}
