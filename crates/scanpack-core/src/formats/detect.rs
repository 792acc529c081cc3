//! Archive format detection.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::PackError;
use crate::Result;

/// ZIP local file header signature.
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Gzip member header.
const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// POSIX tar magic, stored at offset 257 of the first header block.
const USTAR_MAGIC: &[u8; 5] = b"ustar";
const USTAR_MAGIC_OFFSET: usize = 257;

/// Supported archive formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// ZIP archive, deflate-compressed entries.
    Zip,
    /// Tar archive (uncompressed).
    Tar,
    /// Gzip-compressed tar archive.
    TarGz,
}

impl ArchiveFormat {
    /// Short lowercase name, as accepted on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::Tar => "tar",
            Self::TarGz => "tar-gz",
        }
    }

    /// Returns `true` for the tar family.
    #[must_use]
    pub const fn is_tar(self) -> bool {
        matches!(self, Self::Tar | Self::TarGz)
    }

    /// Whether the suffix include filter applies. Tar builds only honour
    /// excludes.
    #[must_use]
    pub const fn applies_include_filter(self) -> bool {
        matches!(self, Self::Zip)
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Detects the archive format from a file path extension.
///
/// # Errors
///
/// Returns [`PackError::UnsupportedFormat`] if the extension is unknown.
///
/// # Examples
///
/// ```
/// use scanpack_core::formats::ArchiveFormat;
/// use scanpack_core::formats::detect_format;
/// use std::path::Path;
///
/// assert_eq!(detect_format(Path::new("out.zip"))?, ArchiveFormat::Zip);
/// assert_eq!(detect_format(Path::new("out.TGZ"))?, ArchiveFormat::TarGz);
/// assert!(detect_format(Path::new("out.rar")).is_err());
/// # Ok::<(), scanpack_core::PackError>(())
/// ```
pub fn detect_format(path: &Path) -> Result<ArchiveFormat> {
    let unsupported = || PackError::UnsupportedFormat {
        path: path.to_path_buf(),
    };

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(unsupported)?;

    match extension.to_ascii_lowercase().as_str() {
        "zip" => Ok(ArchiveFormat::Zip),
        "tar" => Ok(ArchiveFormat::Tar),
        "tgz" => Ok(ArchiveFormat::TarGz),
        "gz" => {
            if let Some(stem) = path.file_stem()
                && stem.to_string_lossy().to_ascii_lowercase().ends_with(".tar")
            {
                return Ok(ArchiveFormat::TarGz);
            }
            Err(unsupported())
        }
        _ => Err(unsupported()),
    }
}

/// Detects the format of an existing archive, falling back to its magic bytes
/// when the extension says nothing.
///
/// # Errors
///
/// Returns [`PackError::Io`] if the file cannot be read, or
/// [`PackError::UnsupportedFormat`] if neither the extension nor the content
/// identify a supported format.
pub fn detect_existing_format(path: &Path) -> Result<ArchiveFormat> {
    if let Ok(format) = detect_format(path) {
        return Ok(format);
    }

    let mut head = Vec::with_capacity(USTAR_MAGIC_OFFSET + USTAR_MAGIC.len());
    File::open(path)?
        .take((USTAR_MAGIC_OFFSET + USTAR_MAGIC.len()) as u64)
        .read_to_end(&mut head)?;

    sniff(&head).ok_or_else(|| PackError::UnsupportedFormat {
        path: path.to_path_buf(),
    })
}

fn sniff(head: &[u8]) -> Option<ArchiveFormat> {
    if head.starts_with(&ZIP_MAGIC) {
        Some(ArchiveFormat::Zip)
    } else if head.starts_with(&GZIP_MAGIC) {
        Some(ArchiveFormat::TarGz)
    } else if head.get(USTAR_MAGIC_OFFSET..USTAR_MAGIC_OFFSET + USTAR_MAGIC.len())
        == Some(USTAR_MAGIC.as_slice())
    {
        Some(ArchiveFormat::Tar)
    } else {
        None
    }
}
