use sha2::{Digest, Sha256};

/// SHA-256 hex digest of a confirmation code; only digests are stored.
pub fn hash_confirmation_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.trim().as_bytes());
    format!("{:x}", hasher.finalize())
}
