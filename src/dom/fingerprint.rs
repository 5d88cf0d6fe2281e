// src/dom/fingerprint.rs

//! Structural fingerprinting.

use sha2::{Digest, Sha256};

use crate::models::StructuralFingerprint;

/// Hash a canonical skeleton into its cluster key.
///
/// SHA-256 over the skeleton bytes; the skeleton length rides along as a
/// secondary discriminator inside the fingerprint (see
/// `StructuralFingerprint`).
pub fn fingerprint(skeleton: &str) -> StructuralFingerprint {
    let digest: [u8; 32] = Sha256::digest(skeleton.as_bytes()).into();
    let len = u32::try_from(skeleton.len()).unwrap_or(u32::MAX);
    StructuralFingerprint::new(digest, len)
}
