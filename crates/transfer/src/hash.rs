use sha2::{Digest, Sha256};

/// Algorithm tag prepended to every digest.
pub const DIGEST_PREFIX: &str = "sha256:";

/// Computes SHA-256 of `data` and returns the bare hex-encoded digest.
pub fn checksum_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Returns the tagged digest of `data`: `"sha256:" + lowercase hex`.
pub fn digest(data: &[u8]) -> String {
    format!("{DIGEST_PREFIX}{}", checksum_bytes(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_bytes_deterministic() {
        let c1 = checksum_bytes(b"hello world");
        let c2 = checksum_bytes(b"hello world");
        assert_eq!(c1, c2);
        assert_eq!(c1.len(), 64); // SHA-256 = 64 hex chars.
    }

    #[test]
    fn digest_format() {
        let d = digest(b"abc");
        assert_eq!(
            d,
            "sha256:ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn digest_of_empty_input() {
        assert_eq!(
            digest(b""),
            "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn digest_changes_on_single_byte_mutation() {
        let mut payload = vec![7u8; 4096];
        let before = digest(&payload);
        assert_eq!(before, digest(&payload));

        payload[2048] ^= 0x01;
        assert_ne!(before, digest(&payload));
    }
}
