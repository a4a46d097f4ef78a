use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The scan root itself could not be enumerated. Fatal before any work starts.
    #[error("cannot scan '{}': {source}", .root.display())]
    Scan {
        root: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A single file could not be opened or read while fingerprinting.
    #[error("cannot fingerprint '{}': {source}", .path.display())]
    Hash {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The manifest is malformed. Fatal to the resolution run.
    #[error("malformed manifest '{}' at line {line}: {reason}", .path.display())]
    Manifest {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    /// A manifest-listed path no longer exists.
    #[error("file no longer exists: '{}'", .path.display())]
    MissingFile { path: PathBuf },

    /// Relocation failed and the source was left in place.
    #[error("cannot move '{}' to '{}': {source}", .path.display(), .dest.display())]
    Move {
        path: PathBuf,
        dest: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Worker pool error: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}
