//! Content digests for change detection.
//!
//! Files are hashed with SHA-256 in bounded chunks so memory use stays flat
//! regardless of file size. Digests render as 64 lowercase hex characters,
//! which is also their persisted form in the tracker.

use crate::error::{Result, SnapError};
use rayon::prelude::*;
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Read buffer size for streaming hashes
const HASH_BUFFER_SIZE: usize = 65536;

/// Length of a hex-encoded digest
pub const DIGEST_HEX_LEN: usize = 64;

/// A SHA-256 content digest (32 bytes)
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Digest([u8; 32]);

impl Digest {
    /// Create a digest from raw bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the digest as a byte slice
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to a lowercase hex string
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({self})")
    }
}

/// Error returned when a string is not a valid hex digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDigestError(String);

impl fmt::Display for ParseDigestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ParseDigestError {}

impl FromStr for Digest {
    type Err = ParseDigestError;

    fn from_str(hex: &str) -> std::result::Result<Self, Self::Err> {
        if hex.len() != DIGEST_HEX_LEN {
            return Err(ParseDigestError(format!(
                "expected {DIGEST_HEX_LEN} hex characters, got {}",
                hex.len()
            )));
        }

        let raw = hex.as_bytes();
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let high = nibble(raw[i * 2])?;
            let low = nibble(raw[i * 2 + 1])?;
            *byte = (high << 4) | low;
        }
        Ok(Self(bytes))
    }
}

fn nibble(c: u8) -> std::result::Result<u8, ParseDigestError> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        _ => Err(ParseDigestError(format!(
            "invalid hex character '{}'",
            char::from(c)
        ))),
    }
}

/// Hash a byte slice
#[must_use]
pub fn hash_bytes(data: &[u8]) -> Digest {
    Digest(Sha256::digest(data).into())
}

/// Stream a file through SHA-256.
///
/// # Errors
///
/// Returns [`SnapError::Io`] if the file cannot be opened or a read fails
/// part way through.
pub fn checksum(path: &Path) -> Result<Digest> {
    let mut file = File::open(path).map_err(|e| SnapError::io(path, e))?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; HASH_BUFFER_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer).map_err(|e| SnapError::io(path, e))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(Digest(hasher.finalize().into()))
}

/// Checksum several files, in input order.
///
/// With `parallel` set the work is spread over the shared rayon pool; the
/// returned digests still line up index-for-index with `paths`.
///
/// # Errors
///
/// Returns the first error encountered while hashing any file.
pub fn checksum_many(paths: &[PathBuf], parallel: bool) -> Result<Vec<Digest>> {
    if parallel {
        super::thread_pool::run_in_pool(|| {
            paths
                .par_iter()
                .map(|path| checksum(path))
                .collect::<Result<Vec<_>>>()
        })
    } else {
        paths.iter().map(|path| checksum(path)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn test_hash_bytes_known_vectors() {
        assert_eq!(hash_bytes(b"").to_hex(), EMPTY_SHA256);
        assert_eq!(hash_bytes(b"abc").to_hex(), ABC_SHA256);
    }

    #[test]
    fn test_checksum_matches_hash_bytes() -> Result<()> {
        let dir = tempdir().map_err(|e| SnapError::io("tempdir", e))?;
        let file_path = dir.path().join("test.txt");
        std::fs::write(&file_path, "abc").map_err(|e| SnapError::io(&file_path, e))?;

        let digest = checksum(&file_path)?;
        assert_eq!(digest, hash_bytes(b"abc"));
        assert_eq!(digest.to_hex().len(), DIGEST_HEX_LEN);
        Ok(())
    }

    #[test]
    fn test_checksum_spans_many_buffers() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("large.bin");

        let chunk = vec![0xAB; 1024 * 1024];
        let mut file = File::create(&file_path)?;
        let mut whole = Vec::new();
        for _ in 0..3 {
            file.write_all(&chunk)?;
            whole.extend_from_slice(&chunk);
        }
        file.write_all(b"tail")?;
        whole.extend_from_slice(b"tail");
        drop(file);

        assert_eq!(checksum(&file_path)?, hash_bytes(&whole));
        Ok(())
    }

    #[test]
    fn test_checksum_missing_file() {
        let dir = tempdir().unwrap();
        let err = checksum(&dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, SnapError::Io { .. }));
    }

    #[test]
    fn test_checksum_directory_fails() {
        let dir = tempdir().unwrap();
        assert!(checksum(dir.path()).is_err());
    }

    #[test]
    fn test_checksum_many_preserves_order() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let mut paths = Vec::new();
        for i in 0..32 {
            let path = dir.path().join(format!("file_{i}.txt"));
            std::fs::write(&path, format!("content {i}"))?;
            paths.push(path);
        }

        let sequential = checksum_many(&paths, false)?;
        let parallel = checksum_many(&paths, true)?;
        assert_eq!(sequential, parallel);
        assert_eq!(sequential[7], hash_bytes(b"content 7"));
        Ok(())
    }

    #[test]
    fn test_digest_hex_round_trip() {
        let digest = hash_bytes(b"round trip");
        let parsed: Digest = digest.to_hex().parse().unwrap();
        assert_eq!(parsed, digest);
    }

    #[test]
    fn test_digest_rejects_bad_hex() {
        assert!("abc".parse::<Digest>().is_err());
        assert!(ABC_SHA256.to_uppercase().parse::<Digest>().is_err());
        let mut bad = ABC_SHA256.to_string();
        bad.replace_range(0..1, "g");
        assert!(bad.parse::<Digest>().is_err());
    }
}
