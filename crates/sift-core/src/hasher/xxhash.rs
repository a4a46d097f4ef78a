use crate::error::Error;
use crate::manifest::models::{FileRecord, Fingerprint};
use crate::manifest::path_to_bytes;
use chrono::{DateTime, Local};
use std::fs::File;
use std::hash::Hasher as _;
use std::io::{self, Read};
use std::path::Path;
use std::time::SystemTime;
use twox_hash::XxHash64;

pub const CHUNK_SIZE: usize = 4096;
pub const SEED: u64 = 0;

/// ctime(3)-style rendering, e.g. `Thu Oct 15 09:12:03 2026`.
const TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Open `path`, stream it through XxHash64 in `CHUNK_SIZE` reads and
/// capture its size and timestamps.
pub fn fingerprint_file(path: &Path) -> Result<FileRecord, Error> {
    let hash_error = |source: io::Error| Error::Hash {
        path: path.to_path_buf(),
        source,
    };

    // Rows the manifest cannot store are dropped here, not rewritten.
    if path_to_bytes(path).is_none() {
        return Err(hash_error(io::Error::new(
            io::ErrorKind::InvalidData,
            "path cannot be stored in the manifest",
        )));
    }

    let mut file = File::open(path).map_err(hash_error)?;
    let metadata = file.metadata().map_err(hash_error)?;
    let modified = metadata.modified().map_err(hash_error)?;
    // Not every filesystem records a birth time.
    let created = metadata.created().unwrap_or(modified);

    let fingerprint = hash_reader(&mut file).map_err(hash_error)?;

    Ok(FileRecord {
        path: path.to_path_buf(),
        size: metadata.len(),
        created: render_timestamp(created),
        modified: render_timestamp(modified),
        fingerprint,
    })
}

fn hash_reader<R: Read>(reader: &mut R) -> io::Result<Fingerprint> {
    let mut hasher = XxHash64::with_seed(SEED);
    let mut buffer = [0u8; CHUNK_SIZE];
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.write(&buffer[..read]);
    }
    Ok(Fingerprint(hasher.finish()))
}

pub fn hash_data(data: &[u8]) -> Fingerprint {
    let mut hasher = XxHash64::with_seed(SEED);
    hasher.write(data);
    Fingerprint(hasher.finish())
}

fn render_timestamp(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}
