use crate::error::Error;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// How a file reached its destination.
#[derive(Debug)]
pub enum MoveOutcome {
    Renamed(PathBuf),
    /// Rename refused; copied then the source removed.
    Copied(PathBuf),
    /// Copied, but the source is still in place.
    PartialCopy { dest: PathBuf, cause: io::Error },
}

impl MoveOutcome {
    pub fn dest(&self) -> &Path {
        match self {
            MoveOutcome::Renamed(dest) | MoveOutcome::Copied(dest) => dest,
            MoveOutcome::PartialCopy { dest, .. } => dest,
        }
    }
}

/// First free name for `file_name` inside `dir`: `name.ext`, then
/// `name_1.ext`, `name_2.ext`, ...
///
/// Not safe against concurrent claims on the same directory; callers
/// relocate sequentially.
pub fn unique_destination(dir: &Path, file_name: &OsStr) -> PathBuf {
    let candidate = dir.join(file_name);
    if !occupied(&candidate) {
        return candidate;
    }

    let as_path = Path::new(file_name);
    let stem = as_path.file_stem().unwrap_or(file_name);
    let extension = as_path.extension();

    let mut counter: u64 = 1;
    loop {
        let mut name = OsString::from(stem);
        name.push(format!("_{}", counter));
        if let Some(ext) = extension {
            name.push(".");
            name.push(ext);
        }
        let candidate = dir.join(&name);
        if !occupied(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

// Any entry counts, including dangling symlinks and directories.
fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Move `src` into `dest_dir` under a name no existing entry uses.
///
/// Tries a rename first. If that is refused for permissions (or crosses
/// filesystems) the file is copied and the source removed; a source that
/// cannot be removed yields [`MoveOutcome::PartialCopy`]. Anything else is
/// [`Error::Move`] with the source untouched.
pub fn move_into(src: &Path, dest_dir: &Path) -> Result<MoveOutcome, Error> {
    move_into_with(
        src,
        dest_dir,
        |from, to| fs::rename(from, to),
        |path| fs::remove_file(path),
    )
}

/// [`move_into`] with the rename and source-removal steps supplied by the caller.
pub fn move_into_with<R, D>(
    src: &Path,
    dest_dir: &Path,
    rename: R,
    remove: D,
) -> Result<MoveOutcome, Error>
where
    R: Fn(&Path, &Path) -> io::Result<()>,
    D: Fn(&Path) -> io::Result<()>,
{
    let file_name = src.file_name().ok_or_else(|| Error::Move {
        path: src.to_path_buf(),
        dest: dest_dir.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
    })?;
    let dest = unique_destination(dest_dir, file_name);

    match rename(src, &dest) {
        Ok(()) => {
            debug!("Moved {} -> {}", src.display(), dest.display());
            Ok(MoveOutcome::Renamed(dest))
        }
        Err(err) if needs_copy_fallback(&err) => {
            debug!(
                "Rename of {} refused ({}), copying instead",
                src.display(),
                err
            );
            copy_then_remove(src, dest, remove)
        }
        Err(err) => Err(Error::Move {
            path: src.to_path_buf(),
            dest,
            source: err,
        }),
    }
}

fn needs_copy_fallback(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::PermissionDenied | io::ErrorKind::CrossesDevices
    )
}

fn copy_then_remove<D>(src: &Path, dest: PathBuf, remove: D) -> Result<MoveOutcome, Error>
where
    D: Fn(&Path) -> io::Result<()>,
{
    if let Err(err) = fs::copy(src, &dest) {
        // Never leave a half-written copy behind.
        let _ = fs::remove_file(&dest);
        return Err(Error::Move {
            path: src.to_path_buf(),
            dest,
            source: err,
        });
    }

    match remove(src) {
        Ok(()) => Ok(MoveOutcome::Copied(dest)),
        Err(cause) => {
            debug!(
                "Copied {} to {} but could not remove the original: {}",
                src.display(),
                dest.display(),
                cause
            );
            Ok(MoveOutcome::PartialCopy { dest, cause })
        }
    }
}
