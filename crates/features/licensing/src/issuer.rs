//! # License Issuance
//!
//! Signs license payloads. This module handles **private keys**; keep the key material out of
//! host installations and version control.

use crate::error::LicenseError;
use crate::{LicenseData, LicensedFeatures, SignedLicense};
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use std::time::{SystemTime, UNIX_EPOCH};

/// Derives the keypair for a 32-byte seed.
#[must_use]
pub fn keypair_from_seed(seed: &[u8; 32]) -> (SigningKey, VerifyingKey) {
    let signing_key = SigningKey::from_bytes(seed);
    let verifying_key = signing_key.verifying_key();
    (signing_key, verifying_key)
}

/// Signs `data` with `private_key`.
pub fn sign_license(private_key: &[u8; 32], data: LicenseData) -> Result<SignedLicense, LicenseError> {
    let signing_key = SigningKey::from_bytes(private_key);
    let bytes = postcard::to_stdvec(&data)?;
    let signature = signing_key.sign(&bytes).to_bytes().to_vec();
    Ok(SignedLicense { data, signature })
}

/// Issues a license valid from now for `days` days.
pub fn issue_license(
    private_key: &[u8; 32],
    customer: impl Into<String>,
    features: LicensedFeatures,
    days: u64,
) -> Result<SignedLicense, LicenseError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| LicenseError::Internal {
            message: e.to_string().into(),
            context: Some("Failed to calculate current time".into()),
        })?
        .as_secs();
    let expires = now.saturating_add(days.saturating_mul(24 * 3600));

    let data = LicenseData {
        customer: customer.into(),
        features,
        issued: now.cast_signed(),
        expires: expires.cast_signed(),
    };

    sign_license(private_key, data)
}
