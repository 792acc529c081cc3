//! Archive listing implementation.

use std::fs::File;
use std::io::BufReader;
use std::io::ErrorKind;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;

use crate::PackError;
use crate::Result;
use crate::formats::ArchiveFormat;
use crate::formats::detect_existing_format;

/// Lists the entry names of a finished archive, directories excluded.
///
/// The format is taken from the extension, or from the leading magic bytes
/// if the extension is not recognized. Nothing is written to disk.
///
/// # Errors
///
/// Returns an error if:
/// - the archive cannot be opened
/// - the format is unsupported
/// - the archive is corrupted
///
/// # Examples
///
/// ```no_run
/// use scanpack_core::list_entries;
///
/// for name in list_entries("sources.zip")? {
///     println!("{name}");
/// }
/// # Ok::<(), scanpack_core::PackError>(())
/// ```
pub fn list_entries<P: AsRef<Path>>(archive_path: P) -> Result<Vec<String>> {
    let archive_path = archive_path.as_ref();
    let format = detect_existing_format(archive_path)?;
    list_entries_as(archive_path, format)
}

/// Lists the entry names of an archive of a known format.
///
/// # Errors
///
/// Same as [`list_entries`], minus format detection.
pub fn list_entries_as(archive_path: &Path, format: ArchiveFormat) -> Result<Vec<String>> {
    let file = File::open(archive_path)?;
    match format {
        ArchiveFormat::Zip => list_zip(file),
        ArchiveFormat::Tar => list_tar(BufReader::new(file)),
        ArchiveFormat::TarGz => list_tar(GzDecoder::new(BufReader::new(file))),
    }
}

fn list_zip(file: File) -> Result<Vec<String>> {
    let mut archive = zip::ZipArchive::new(BufReader::new(file))?;
    let mut names = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let entry = archive.by_index_raw(index)?;
        if !entry.is_dir() {
            names.push(entry.name().to_string());
        }
    }
    Ok(names)
}

fn list_tar<R: Read>(reader: R) -> Result<Vec<String>> {
    let mut archive = tar::Archive::new(reader);
    let mut names = Vec::new();

    for entry in archive.entries().map_err(corrupt)? {
        let entry = entry.map_err(corrupt)?;
        if entry.header().entry_type().is_dir() {
            continue;
        }
        let path = entry.path().map_err(corrupt)?;
        names.push(path.to_string_lossy().into_owned());
    }
    Ok(names)
}

/// Decoding failures mean a damaged archive, not a filesystem problem.
fn corrupt(err: std::io::Error) -> PackError {
    match err.kind() {
        ErrorKind::InvalidData | ErrorKind::InvalidInput | ErrorKind::UnexpectedEof => {
            PackError::InvalidArchive(err.to_string())
        }
        _ => PackError::Io(err),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path) {
        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        let options = SimpleFileOptions::default();
        zip.add_directory("dir/", options).unwrap();
        zip.start_file("dir/b.txt", options).unwrap();
        zip.write_all(b"b").unwrap();
        zip.start_file("a.txt", options).unwrap();
        zip.write_all(b"a").unwrap();
        zip.finish().unwrap();
    }

    fn write_tar<W: Write>(writer: W) -> W {
        let mut builder = tar::Builder::new(writer);

        let mut dir = tar::Header::new_gnu();
        dir.set_entry_type(tar::EntryType::Directory);
        dir.set_size(0);
        builder
            .append_data(&mut dir, "dir/", std::io::empty())
            .unwrap();

        let mut file = tar::Header::new_gnu();
        file.set_size(3);
        builder
            .append_data(&mut file, "dir/c.txt", &b"abc"[..])
            .unwrap();
        builder.into_inner().unwrap()
    }

    #[test]
    fn test_list_zip_skips_directories_and_keeps_order() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.zip");
        write_zip(&path);

        assert_eq!(list_entries(&path).unwrap(), vec!["dir/b.txt", "a.txt"]);
    }

    #[test]
    fn test_list_tar() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.tar");
        write_tar(File::create(&path).unwrap());

        assert_eq!(list_entries(&path).unwrap(), vec!["dir/c.txt"]);
    }

    #[test]
    fn test_list_tar_gz() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.tgz");
        let encoder = flate2::write::GzEncoder::new(
            File::create(&path).unwrap(),
            flate2::Compression::default(),
        );
        write_tar(encoder).finish().unwrap();

        assert_eq!(list_entries(&path).unwrap(), vec!["dir/c.txt"]);
    }

    #[test]
    fn test_list_detects_format_by_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("upload.bin");
        write_zip(&path);

        assert_eq!(list_entries(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_list_corrupt_zip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.zip");
        std::fs::write(&path, b"PK\x03\x04 definitely not a zip").unwrap();

        assert!(matches!(
            list_entries(&path),
            Err(PackError::InvalidArchive(_))
        ));
    }

    #[test]
    fn test_list_missing_archive() {
        let temp = TempDir::new().unwrap();
        let result = list_entries_as(&temp.path().join("nope.zip"), ArchiveFormat::Zip);
        assert!(matches!(result, Err(PackError::Io(_))));
    }
}
