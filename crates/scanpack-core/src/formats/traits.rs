//! Common traits for archive writers.

use std::fs::File;
use std::fs::Metadata;

use crate::Result;
use crate::formats::ArchiveFormat;

/// A serialized writer that accepts one regular file at a time.
///
/// Implementations own the output stream. Entries are written in call order
/// and the archive is only valid once [`EntrySink::finish`] returned `Ok`.
pub trait EntrySink {
    /// Streams `file` into the archive under `name`.
    ///
    /// `metadata` describes the file being read and is used to fill in the
    /// format-native header. Returns the number of bytes copied.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the file or writing the archive fails.
    fn append_file(&mut self, name: &str, file: &mut File, metadata: &Metadata) -> Result<u64>;

    /// Writes trailing structures and flushes the underlying stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive cannot be completed.
    fn finish(self: Box<Self>) -> Result<()>;

    /// Returns the archive format produced by this sink.
    fn format(&self) -> ArchiveFormat;
}
