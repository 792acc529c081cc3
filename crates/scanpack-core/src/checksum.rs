//! SHA-256 checksums of finished archives.

use crate::Result;
use sha2::Digest;
use sha2::Sha256;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Computes the lowercase hex SHA-256 digest of the file at `path`.
///
/// # Errors
///
/// Returns [`crate::PackError::Io`] if the file cannot be read.
///
/// # Examples
///
/// ```no_run
/// use scanpack_core::checksum::sha256_file;
///
/// let digest = sha256_file("sources.zip")?;
/// assert_eq!(digest.len(), 64);
/// # Ok::<(), scanpack_core::PackError>(())
/// ```
pub fn sha256_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let mut reader = BufReader::new(File::open(path.as_ref())?);
    let mut hasher = Sha256::new();
    std::io::copy(&mut reader, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sha256_known_value() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("abc.txt");
        std::fs::write(&path, "abc").unwrap();

        assert_eq!(
            sha256_file(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_sha256_empty_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("empty");
        std::fs::write(&path, "").unwrap();

        assert_eq!(
            sha256_file(&path).unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_sha256_missing_file() {
        let temp = TempDir::new().unwrap();
        assert!(sha256_file(temp.path().join("missing")).is_err());
    }
}
