pub mod models;
pub mod reader;
pub mod writer;

pub use models::{FileRecord, Fingerprint};
pub use reader::{read_manifest, read_manifest_from};
pub use writer::ManifestWriter;

use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Column order of every manifest.
pub const HEADER: [&str; 5] = [
    "full_path",
    "size",
    "creation_time",
    "modification_time",
    "fingerprint",
];

/// Column name used for the fingerprint by manifests from the older tool.
pub const LEGACY_FINGERPRINT_COLUMN: &str = "xxhash";

/// Bytes stored in the `full_path` column. On unix this is the raw file
/// name, so names that are not UTF-8 survive unchanged. Elsewhere only
/// UTF-8 paths can be stored and `None` is returned for the rest.
#[cfg(unix)]
pub fn path_to_bytes(path: &Path) -> Option<Cow<'_, [u8]>> {
    use std::os::unix::ffi::OsStrExt;
    Some(Cow::Borrowed(path.as_os_str().as_bytes()))
}

#[cfg(not(unix))]
pub fn path_to_bytes(path: &Path) -> Option<Cow<'_, [u8]>> {
    path.to_str().map(|s| Cow::Borrowed(s.as_bytes()))
}

#[cfg(unix)]
pub fn path_from_bytes(bytes: &[u8]) -> Option<PathBuf> {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;
    Some(PathBuf::from(OsStr::from_bytes(bytes)))
}

#[cfg(not(unix))]
pub fn path_from_bytes(bytes: &[u8]) -> Option<PathBuf> {
    std::str::from_utf8(bytes).ok().map(PathBuf::from)
}
