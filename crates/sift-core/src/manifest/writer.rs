use super::models::FileRecord;
use super::{path_to_bytes, HEADER};
use crate::error::Error;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Appends records to a manifest. Owned by exactly one writer at a time.
pub struct ManifestWriter<W: Write> {
    inner: csv::Writer<W>,
}

impl ManifestWriter<BufWriter<File>> {
    /// Create (or truncate) the manifest at `path` and write its header.
    pub fn create(path: &Path) -> Result<Self, Error> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> ManifestWriter<W> {
    pub fn new(writer: W) -> Result<Self, Error> {
        let mut inner = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        // Written explicitly so an empty scan still yields a valid manifest.
        inner.write_record(HEADER)?;
        Ok(Self { inner })
    }

    /// Append one row. The path is written byte for byte; a path this
    /// platform cannot store is an `InvalidData` I/O error.
    pub fn append(&mut self, record: &FileRecord) -> Result<(), Error> {
        let full_path = path_to_bytes(&record.path).ok_or_else(|| {
            Error::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("path is not valid UTF-8: {}", record.path.display()),
            ))
        })?;
        let size = record.size.to_string();
        let fingerprint = record.fingerprint.to_string();
        self.inner.write_record([
            full_path.as_ref(),
            size.as_bytes(),
            record.created.as_bytes(),
            record.modified.as_bytes(),
            fingerprint.as_bytes(),
        ])?;
        Ok(())
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(self) -> Result<W, Error> {
        self.inner
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))
    }
}
