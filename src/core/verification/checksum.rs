//! Artifact checksums

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of raw bytes (64 characters)
///
/// # Examples
///
/// ```
/// use strata::core::verification::checksum::calculate_checksum;
///
/// let checksum = calculate_checksum(b"{}");
/// assert_eq!(checksum.len(), 64);
/// ```
pub fn calculate_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
