use mvnforge_util::hash;

/// The sidecar checksum algorithms tried, strongest first, when verifying a
/// downloaded artifact body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumKind {
    Sha256,
    Sha1,
    Md5,
}

impl ChecksumKind {
    pub fn extension(self) -> &'static str {
        match self {
            ChecksumKind::Sha256 => "sha256",
            ChecksumKind::Sha1 => "sha1",
            ChecksumKind::Md5 => "md5",
        }
    }

    /// The order in which sidecar checksums are attempted: `.sha256` first
    /// (strongest, and what most modern repositories publish), falling
    /// back to `.sha1` and finally `.md5` for older repository layouts.
    pub fn fallback_chain() -> [ChecksumKind; 3] {
        [ChecksumKind::Sha256, ChecksumKind::Sha1, ChecksumKind::Md5]
    }

    pub fn digest(self, data: &[u8]) -> String {
        match self {
            ChecksumKind::Sha256 => hash::sha256_bytes(data),
            ChecksumKind::Sha1 => hash::sha1_bytes(data),
            ChecksumKind::Md5 => hash::md5_bytes(data),
        }
    }
}

/// A sidecar checksum file's content is sometimes just the hex digest and
/// sometimes `<digest>  <filename>` (coreutils `sha256sum` format); extract
/// the hex digest either way.
pub fn extract_digest(sidecar_content: &str) -> Option<String> {
    sidecar_content
        .split_whitespace()
        .next()
        .map(|s| s.to_ascii_lowercase())
}

/// Whether `data`'s digest (of the given kind) matches the sidecar content.
pub fn verify(kind: ChecksumKind, data: &[u8], sidecar_content: &str) -> bool {
    match extract_digest(sidecar_content) {
        Some(expected) => kind.digest(data).eq_ignore_ascii_case(&expected),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_bare_digest() {
        assert_eq!(extract_digest("abc123"), Some("abc123".to_string()));
    }

    #[test]
    fn extracts_digest_from_sha256sum_format() {
        assert_eq!(
            extract_digest("abc123  lib-1.0.jar\n"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn verifies_matching_sha256() {
        let digest = hash::sha256_bytes(b"hello");
        assert!(verify(ChecksumKind::Sha256, b"hello", &digest));
    }

    #[test]
    fn rejects_mismatched_digest() {
        assert!(!verify(ChecksumKind::Sha256, b"hello", "not-a-real-digest"));
    }
}
