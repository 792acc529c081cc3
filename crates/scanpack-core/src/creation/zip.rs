//! ZIP archive writing.
//!
//! Entries are deflate-compressed and carry a fixed DOS timestamp, so two
//! builds over the same files produce entries with identical bytes.

use crate::Result;
use crate::formats::ArchiveFormat;
use crate::formats::EntrySink;
use std::fs::File;
use std::fs::Metadata;
use std::io::Seek;
use std::io::Write;
use zip::CompressionMethod;
use zip::DateTime;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Default deflate level.
const DEFAULT_LEVEL: u8 = 6;

/// Writes regular files into a ZIP stream.
pub struct ZipSink<W: Write + Seek> {
    writer: ZipWriter<W>,
    options: SimpleFileOptions,
}

impl<W: Write + Seek> ZipSink<W> {
    /// Creates a sink writing to `writer`.
    ///
    /// Level `0` stores entries uncompressed.
    pub fn new(writer: W, compression_level: Option<u8>) -> Self {
        let options = SimpleFileOptions::default().last_modified_time(DateTime::default());
        let options = if compression_level == Some(0) {
            options.compression_method(CompressionMethod::Stored)
        } else {
            let level = compression_level.unwrap_or(DEFAULT_LEVEL);
            options
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(i64::from(level)))
        };

        Self {
            writer: ZipWriter::new(writer),
            options,
        }
    }

    fn file_options(&self, metadata: &Metadata) -> SimpleFileOptions {
        let options = self
            .options
            .large_file(metadata.len() >= u64::from(u32::MAX));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            options.unix_permissions(metadata.permissions().mode())
        }
        #[cfg(not(unix))]
        {
            options
        }
    }
}

impl<W: Write + Seek> EntrySink for ZipSink<W> {
    fn append_file(&mut self, name: &str, file: &mut File, metadata: &Metadata) -> Result<u64> {
        let options = self.file_options(metadata);
        self.writer.start_file(name, options)?;
        let copied = std::io::copy(file, &mut self.writer)?;
        Ok(copied)
    }

    fn finish(self: Box<Self>) -> Result<()> {
        let mut inner = self.writer.finish()?;
        inner.flush()?;
        Ok(())
    }

    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Zip
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Read;
    use tempfile::TempDir;

    fn write_archive(level: Option<u8>, files: &[(&str, &str)]) -> (TempDir, std::path::PathBuf) {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("out.zip");
        let mut sink: Box<dyn EntrySink> =
            Box::new(ZipSink::new(File::create(&output).unwrap(), level));

        for (name, content) in files {
            let path = temp.path().join(name.replace('/', "_"));
            std::fs::write(&path, content).unwrap();
            let mut file = File::open(&path).unwrap();
            let metadata = file.metadata().unwrap();
            sink.append_file(name, &mut file, &metadata).unwrap();
        }
        sink.finish().unwrap();
        (temp, output)
    }

    #[test]
    fn test_zip_sink_writes_entries() {
        let (_temp, output) = write_archive(None, &[("a.txt", "alpha"), ("dir/b.txt", "beta")]);

        let mut archive = zip::ZipArchive::new(File::open(&output).unwrap()).unwrap();
        assert_eq!(archive.len(), 2);

        let mut entry = archive.by_name("dir/b.txt").unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Deflated);
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        assert_eq!(content, "beta");
    }

    #[test]
    fn test_zip_sink_stored_level_zero() {
        let (_temp, output) = write_archive(Some(0), &[("a.txt", "alpha")]);
        let mut archive = zip::ZipArchive::new(File::open(&output).unwrap()).unwrap();
        assert_eq!(
            archive.by_index(0).unwrap().compression(),
            CompressionMethod::Stored
        );
    }

    #[test]
    fn test_zip_sink_fixed_timestamp() {
        let (_temp, output) = write_archive(None, &[("a.txt", "alpha")]);
        let mut archive = zip::ZipArchive::new(File::open(&output).unwrap()).unwrap();
        let entry = archive.by_index(0).unwrap();
        assert_eq!(entry.last_modified(), Some(DateTime::default()));
    }

    #[test]
    fn test_zip_sink_in_memory() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.txt");
        std::fs::write(&path, "hello").unwrap();

        let mut sink = ZipSink::new(Cursor::new(Vec::new()), None);
        let mut file = File::open(&path).unwrap();
        let metadata = file.metadata().unwrap();
        assert_eq!(sink.append_file("a.txt", &mut file, &metadata).unwrap(), 5);
        assert_eq!(sink.format(), ArchiveFormat::Zip);
        Box::new(sink).finish().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_zip_sink_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("run.sh");
        std::fs::write(&path, "#!/bin/sh").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        let output = temp.path().join("out.zip");
        let mut sink = Box::new(ZipSink::new(File::create(&output).unwrap(), None));
        let mut file = File::open(&path).unwrap();
        let metadata = file.metadata().unwrap();
        sink.append_file("run.sh", &mut file, &metadata).unwrap();
        sink.finish().unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&output).unwrap()).unwrap();
        let mode = archive.by_index(0).unwrap().unix_mode().unwrap();
        assert_eq!(mode & 0o777, 0o755);
    }
}
