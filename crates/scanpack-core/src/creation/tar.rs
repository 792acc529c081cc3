//! TAR archive writing, plain or gzip-compressed.

use crate::Result;
use crate::formats::ArchiveFormat;
use crate::formats::EntrySink;
use flate2::write::GzEncoder;
use std::fs::File;
use std::fs::Metadata;
use std::io::BufWriter;
use std::io::Write;
use tar::Builder;
use tar::Header;

/// A stream that needs an explicit final step once the tar trailer is
/// written.
pub trait FinishStream: Write {
    /// Flushes buffers and writes any trailing structures.
    ///
    /// # Errors
    ///
    /// Returns an error if the final write fails.
    fn finish_stream(self) -> std::io::Result<()>;
}

impl<W: Write> FinishStream for BufWriter<W> {
    fn finish_stream(mut self) -> std::io::Result<()> {
        self.flush()
    }
}

impl FinishStream for File {
    fn finish_stream(mut self) -> std::io::Result<()> {
        self.flush()
    }
}

impl FinishStream for Vec<u8> {
    fn finish_stream(self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<W: FinishStream> FinishStream for GzEncoder<W> {
    fn finish_stream(self) -> std::io::Result<()> {
        self.finish()?.finish_stream()
    }
}

/// Writes regular files into a tar stream.
pub struct TarSink<W: FinishStream> {
    builder: Builder<W>,
    format: ArchiveFormat,
}

impl<W: FinishStream> TarSink<W> {
    /// Creates an uncompressed tar sink.
    pub fn new(writer: W) -> Self {
        Self {
            builder: Builder::new(writer),
            format: ArchiveFormat::Tar,
        }
    }
}

impl<W: FinishStream> TarSink<GzEncoder<W>> {
    /// Creates a gzip-compressed tar sink.
    pub fn gzip(writer: W, compression_level: Option<u8>) -> Self {
        let encoder = GzEncoder::new(writer, compression_level_to_flate2(compression_level));
        Self {
            builder: Builder::new(encoder),
            format: ArchiveFormat::TarGz,
        }
    }
}

impl<W: FinishStream> EntrySink for TarSink<W> {
    fn append_file(&mut self, name: &str, file: &mut File, metadata: &Metadata) -> Result<u64> {
        let size = metadata.len();
        let mut header = Header::new_gnu();
        header.set_size(size);
        set_permissions(&mut header, metadata);

        self.builder.append_data(&mut header, name, file)?;
        Ok(size)
    }

    fn finish(self: Box<Self>) -> Result<()> {
        let inner = self.builder.into_inner()?;
        inner.finish_stream()?;
        Ok(())
    }

    fn format(&self) -> ArchiveFormat {
        self.format
    }
}

/// Sets mode, owner and modification time from file metadata.
#[cfg(unix)]
fn set_permissions(header: &mut Header, metadata: &Metadata) {
    use std::os::unix::fs::MetadataExt;
    header.set_mode(metadata.mode());
    header.set_uid(u64::from(metadata.uid()));
    header.set_gid(u64::from(metadata.gid()));
    // mtime can be negative for dates before epoch
    #[allow(clippy::cast_sign_loss)]
    let mtime = metadata.mtime().max(0) as u64;
    header.set_mtime(mtime);
}

#[cfg(not(unix))]
fn set_permissions(header: &mut Header, metadata: &Metadata) {
    let mode = if metadata.permissions().readonly() {
        0o444
    } else {
        0o644
    };
    header.set_mode(mode);

    if let Ok(modified) = metadata.modified()
        && let Ok(duration) = modified.duration_since(std::time::UNIX_EPOCH)
    {
        header.set_mtime(duration.as_secs());
    }
}

/// Converts a 0-9 level to a flate2 compression level.
fn compression_level_to_flate2(level: Option<u8>) -> flate2::Compression {
    match level {
        None | Some(6) => flate2::Compression::default(),
        Some(n) => flate2::Compression::new(u32::from(n.min(9))),
    }
}
