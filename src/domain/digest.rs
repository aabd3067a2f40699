//! Legacy credential digest.
//!
//! The platform stores MD5 hex digests of passwords; the scheme predates this
//! crate and is reused as-is so existing rows keep verifying. Digest hashing
//! is deterministic and one-way; plaintext never reaches the store.

use md5::{Digest, Md5};

/// One-way digest of a plaintext password, as a lowercase 32-char hex string.
pub fn md5_hex(plaintext: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(plaintext.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic() {
        assert_eq!(md5_hex("SecurePass1"), md5_hex("SecurePass1"));
        assert_ne!(md5_hex("SecurePass1"), md5_hex("SecurePass2"));
    }

    #[test]
    fn digest_matches_known_vector() {
        // RFC 1321 test suite value
        assert_eq!(md5_hex("abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn digest_is_fixed_length_hex() {
        let digest = md5_hex("anything at all");
        assert_eq!(digest.len(), 32);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
