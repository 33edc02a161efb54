//! Scoped zip archive access.
//!
//! [`ArchiveWriter`] and [`ArchiveReader`] own the file handle for the
//! duration of one operation; dropping them releases it on every exit path.
//! A writer dropped before [`ArchiveWriter::finish`] leaves a partial
//! archive on disk.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::util::{Error, Result};

/// Upper bound on the buffer reserved up front for one entry. The declared
/// size comes from the archive header and is not trusted beyond this.
const MAX_ENTRY_PREALLOC: u64 = 1 << 20;

/// Join an archive directory and an entry name.
pub fn entry_path(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Write side of a zip archive (DEFLATE entries).
pub struct ArchiveWriter {
    inner: ZipWriter<BufWriter<File>>,
    options: SimpleFileOptions,
    path: PathBuf,
    entries: usize,
}

impl ArchiveWriter {
    /// Create (or truncate) the archive at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)?;
        Ok(Self {
            inner: ZipWriter::new(BufWriter::new(file)),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
            path: path.to_path_buf(),
            entries: 0,
        })
    }

    /// Write a binary entry.
    pub fn write_entry(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        self.inner.start_file(name, self.options)?;
        self.inner.write_all(bytes)?;
        self.entries += 1;
        tracing::trace!("Wrote entry {} ({} bytes)", name, bytes.len());
        Ok(())
    }

    /// Write a pretty-printed JSON entry.
    pub fn write_json<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) -> Result<()> {
        let json = serde_json::to_vec_pretty(value)?;
        self.write_entry(name, &json)
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the central directory and flush the file.
    pub fn finish(self) -> Result<()> {
        let mut out = self.inner.finish()?;
        out.flush()?;
        tracing::debug!("Finished {} ({} entries)", self.path.display(), self.entries);
        Ok(())
    }
}

/// Read side of a zip archive.
pub struct ArchiveReader {
    inner: ZipArchive<BufReader<File>>,
    path: PathBuf,
}

impl ArchiveReader {
    /// Open the archive at `path`.
    ///
    /// A missing file is [`Error::NotFound`]; a file that is not a zip
    /// container is [`Error::Validation`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::not_found(path.display().to_string())
            } else {
                Error::Io(e)
            }
        })?;
        let inner = ZipArchive::new(BufReader::new(file)).map_err(|e| match Error::from(e) {
            Error::Validation(msg) => Error::validation(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;
        tracing::debug!("Opened {} ({} entries)", path.display(), inner.len());
        Ok(Self { inner, path: path.to_path_buf() })
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entry names in archive order.
    pub fn entry_names(&self) -> Vec<String> {
        self.inner.file_names().map(str::to_string).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.file_names().any(|n| n == name)
    }

    /// Read a required entry; a missing entry is [`Error::NotFound`].
    pub fn read_entry(&mut self, name: &str) -> Result<Vec<u8>> {
        self.read_optional(name)?
            .ok_or_else(|| Error::not_found(format!("{} in {}", name, self.path.display())))
    }

    /// Read an entry that may be absent.
    pub fn read_optional(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        if !self.contains(name) {
            return Ok(None);
        }
        let mut entry = self.inner.by_name(name)?;
        let mut bytes = Vec::with_capacity(entry.size().min(MAX_ENTRY_PREALLOC) as usize);
        // Decompression and checksum failures surface as I/O errors. Depending
        // on the zip version a checksum mismatch is InvalidData or Other.
        entry.read_to_end(&mut bytes).map_err(|e| match e.kind() {
            ErrorKind::InvalidData | ErrorKind::InvalidInput | ErrorKind::UnexpectedEof | ErrorKind::Other => {
                Error::validation(format!("corrupt entry {}: {}", name, e))
            }
            _ => Error::Io(e),
        })?;
        tracing::trace!("Read entry {} ({} bytes)", name, bytes.len());
        Ok(Some(bytes))
    }

    /// Read and parse a required JSON entry.
    pub fn read_json<T: DeserializeOwned>(&mut self, name: &str) -> Result<T> {
        let bytes = self.read_entry(name)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Read and parse a JSON entry that may be absent.
    pub fn read_optional_json<T: DeserializeOwned>(&mut self, name: &str) -> Result<Option<T>> {
        match self.read_optional(name)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}
