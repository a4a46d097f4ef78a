use super::mover::{move_into, MoveOutcome};
use crate::error::Error;
use crate::progress::{FlattenResult, ItemEvent, Phase, Reporter, Summary};
use crate::scanner;
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Move every file below the first level of `root` up into `root`, then
/// remove the subdirectories left empty.
///
/// Only an unreadable `root` is an error; per-file failures are reported
/// and counted, and directories that cannot be removed are left alone.
pub fn flatten_directory(
    root: &Path,
    follow_symlinks: bool,
    reporter: &dyn Reporter,
) -> Result<FlattenResult, Error> {
    let listing = scanner::list_nested_files(root, follow_symlinks)?;
    let root = listing.root.as_path();
    info!("Flattening directory: {}", root.display());

    let mut result = FlattenResult {
        total: listing.total(),
        skipped: listing.skipped.len(),
        ..Default::default()
    };
    for err in &listing.skipped {
        if let Error::Scan { root: path, .. } = err {
            reporter.on_item(path, &ItemEvent::Skipped(err));
        }
    }

    reporter.on_start(Phase::Flatten, result.total);
    for (i, path) in listing.files.iter().enumerate() {
        match move_into(path, root) {
            Ok(outcome) => {
                result.moved += 1;
                match &outcome {
                    MoveOutcome::Renamed(dest) => {
                        reporter.on_item(path, &ItemEvent::Moved { dest })
                    }
                    MoveOutcome::Copied(dest) => {
                        result.copied += 1;
                        reporter.on_item(path, &ItemEvent::CopiedFallback { dest })
                    }
                    MoveOutcome::PartialCopy { dest, cause } => {
                        result.partial += 1;
                        reporter.on_item(path, &ItemEvent::PartialCopy { dest, cause })
                    }
                }
            }
            Err(err) => {
                debug!("{}", err);
                result.failed += 1;
                reporter.on_item(path, &ItemEvent::MoveFailed(&err));
            }
        }
        reporter.on_progress(i + 1, result.total);
    }
    info!("Total files moved: {}", result.moved);

    result.dirs_removed = remove_empty_dirs(root);
    debug!("Removed {} empty directories", result.dirs_removed);

    reporter.on_summary(&Summary::Flatten(result.clone()));
    Ok(result)
}

/// Bottom-up removal of empty directories strictly below `root`.
/// Returns how many were removed; failures are logged and ignored.
pub fn remove_empty_dirs(root: &Path) -> usize {
    let mut removed = 0;
    let walker = WalkDir::new(root)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_dir());

    for entry in walker {
        match fs::remove_dir(entry.path()) {
            Ok(()) => {
                debug!("Removed empty directory: {}", entry.path().display());
                removed += 1;
            }
            Err(err) => debug!("Keeping directory {}: {}", entry.path().display(), err),
        }
    }
    removed
}
