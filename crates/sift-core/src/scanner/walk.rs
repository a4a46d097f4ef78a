use crate::error::Error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    pub follow_symlinks: bool,
    /// Skip regular files sitting directly in the root.
    pub nested_only: bool,
}

/// Every regular file found under a root, plus the entries that could not be read.
#[derive(Debug, Default)]
pub struct FileListing {
    pub root: PathBuf,
    pub files: Vec<PathBuf>,
    pub skipped: Vec<Error>,
}

impl FileListing {
    pub fn total(&self) -> usize {
        self.files.len()
    }
}

/// Recursively list every regular file under `root` as absolute paths.
///
/// Fails only if `root` itself cannot be resolved or opened. Unreadable
/// subtrees are collected in `skipped` and the walk moves on.
pub fn list_files(root: &Path, options: ScanOptions) -> Result<FileListing, Error> {
    let root = open_root(root)?;
    let min_depth = if options.nested_only { 2 } else { 1 };

    let mut listing = FileListing {
        root: root.clone(),
        ..Default::default()
    };

    let walker = WalkDir::new(&root)
        .min_depth(min_depth)
        .follow_links(options.follow_symlinks);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.clone());
                debug!("Skipping '{}': {}", path.display(), err);
                listing.skipped.push(Error::Scan {
                    root: path,
                    source: io::Error::from(err),
                });
                continue;
            }
        };

        if entry.file_type().is_file() {
            listing.files.push(entry.into_path());
        }
    }

    debug!(
        "Found {} files under '{}' ({} skipped)",
        listing.files.len(),
        root.display(),
        listing.skipped.len()
    );
    Ok(listing)
}

/// Files strictly below the first level of `root`; the ones a flatten relocates.
pub fn list_nested_files(root: &Path, follow_symlinks: bool) -> Result<FileListing, Error> {
    list_files(
        root,
        ScanOptions {
            follow_symlinks,
            nested_only: true,
        },
    )
}

fn open_root(root: &Path) -> Result<PathBuf, Error> {
    let scan_error = |source: io::Error| Error::Scan {
        root: root.to_path_buf(),
        source,
    };

    let canonical = fs::canonicalize(root).map_err(scan_error)?;
    if !canonical.is_dir() {
        return Err(scan_error(io::Error::new(
            io::ErrorKind::NotADirectory,
            "not a directory",
        )));
    }
    // Probe readability so an unreadable root fails before workers start.
    fs::read_dir(&canonical).map_err(scan_error)?;
    Ok(canonical)
}
