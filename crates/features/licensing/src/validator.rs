//! # License Validation
//!
//! Two strict steps:
//! 1. **Temporal Check**: the current time lies in `[issued, expires]`.
//! 2. **Cryptographic Check**: the payload was signed by the key matching the trusted public key.

use crate::error::{LicenseError, LicenseErrorExt};
use crate::SignedLicense;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn validate_license(license: &SignedLicense, key: &[u8; 32]) -> Result<(), LicenseError> {
    check_window(license, unix_now()?)?;
    verify_signature(license, key)
}

fn unix_now() -> Result<i64, LicenseError> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| LicenseError::Internal {
            message: e.to_string().into(),
            context: Some("Failed to get current system time".into()),
        })?
        .as_secs()
        .cast_signed())
}

pub(crate) fn check_window(license: &SignedLicense, now: i64) -> Result<(), LicenseError> {
    if now < license.data.issued {
        return Err(LicenseError::NotYetValid {
            message: format!("License issued at Unix timestamp {}", license.data.issued).into(),
            context: Some("System clock is set before issuance".into()),
        });
    }

    if now > license.data.expires {
        return Err(LicenseError::Expired {
            message: format!("License expired at Unix timestamp {}", license.data.expires).into(),
            context: Some("Expiration Check".into()),
        });
    }

    Ok(())
}

/// Reconstructs the signed bytes from the postcard encoding of the payload and verifies them.
fn verify_signature(license: &SignedLicense, public_key: &[u8; 32]) -> Result<(), LicenseError> {
    let verifying_key = VerifyingKey::from_bytes(public_key)?;
    let signature = Signature::from_slice(&license.signature)?;

    let data_bytes = postcard::to_stdvec(&license.data).context("Binary serialization failed")?;

    verifying_key.verify(&data_bytes, &signature)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LicenseData, LicensedFeatures};

    fn license(issued: i64, expires: i64) -> SignedLicense {
        SignedLicense {
            data: LicenseData {
                customer: "acme".into(),
                features: LicensedFeatures::All,
                issued,
                expires,
            },
            signature: Vec::new(),
        }
    }

    #[test]
    fn window_bounds_are_inclusive() {
        assert!(check_window(&license(10, 20), 10).is_ok());
        assert!(check_window(&license(10, 20), 20).is_ok());
        assert_eq!(check_window(&license(10, 20), 9).unwrap_err().kind(), "NotYetValid");
        assert_eq!(check_window(&license(10, 20), 21).unwrap_err().kind(), "Expired");
    }
}
