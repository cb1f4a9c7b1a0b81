//! Checksum validation for migrations
//!
//! Computes SHA256 checksums of migration SQL so an edited migration that was
//! already applied is detected instead of silently skipped

use sha2::{Digest, Sha256};

/// Compute SHA256 checksum of a string
pub fn compute_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_checksum() {
        let checksum = compute_checksum("CREATE TABLE t (x INTEGER)");
        assert_eq!(checksum.len(), 64); // SHA256 is 64 hex chars
        assert!(checksum.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_checksum_sensitive_to_edits() {
        let a = compute_checksum("CREATE TABLE t (x INTEGER)");
        let b = compute_checksum("CREATE TABLE t (x TEXT)");
        assert_ne!(a, b);
        assert_eq!(a, compute_checksum("CREATE TABLE t (x INTEGER)"));
    }
}
