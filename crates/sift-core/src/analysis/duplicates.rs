use crate::error::Error;
use crate::manifest::{self, FileRecord, Fingerprint};
use crate::progress::{ItemEvent, Phase, Reporter, ResolveResult, Summary};
use crate::relocate::{move_into, MoveOutcome};
use ahash::AHashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Paths sharing one fingerprint, in manifest order. The first is the keeper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashGroup {
    pub fingerprint: Fingerprint,
    pub paths: Vec<PathBuf>,
}

impl HashGroup {
    pub fn keeper(&self) -> &Path {
        &self.paths[0]
    }

    pub fn duplicates(&self) -> &[PathBuf] {
        &self.paths[1..]
    }
}

/// Group records by fingerprint in one pass. Groups come out in order of
/// their first appearance, members in manifest order.
pub fn build_hash_groups(records: &[FileRecord]) -> Vec<HashGroup> {
    let mut index: AHashMap<Fingerprint, usize> = AHashMap::new();
    let mut groups: Vec<HashGroup> = Vec::new();

    for record in records {
        let slot = *index.entry(record.fingerprint).or_insert_with(|| {
            groups.push(HashGroup {
                fingerprint: record.fingerprint,
                paths: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].paths.push(record.path.clone());
    }

    groups
}

/// Read the manifest at `manifest_path` and move every duplicate into `dest_dir`.
///
/// A malformed manifest or an uncreatable `dest_dir` aborts before any file
/// moves. Missing files and failed moves are reported and counted.
pub fn move_duplicates(
    manifest_path: &Path,
    dest_dir: &Path,
    reporter: &dyn Reporter,
) -> Result<ResolveResult, Error> {
    let records = manifest::read_manifest(manifest_path)?;
    info!(
        "Loaded {} records from {}",
        records.len(),
        manifest_path.display()
    );
    resolve_records(&records, dest_dir, reporter)
}

/// Keep the first member of every hash group and relocate the rest.
pub fn resolve_records(
    records: &[FileRecord],
    dest_dir: &Path,
    reporter: &dyn Reporter,
) -> Result<ResolveResult, Error> {
    fs::create_dir_all(dest_dir)?;

    let groups = build_hash_groups(records);
    let mut result = ResolveResult {
        records: records.len(),
        groups: groups.len(),
        ..Default::default()
    };

    let to_move: usize = groups.iter().map(|g| g.duplicates().len()).sum();
    reporter.on_start(Phase::ResolveDuplicates, to_move);
    let mut completed = 0;

    for group in groups.iter().filter(|g| g.paths.len() > 1) {
        result.duplicate_groups += 1;
        debug!(
            "Group {} has {} members, keeping {}",
            group.fingerprint,
            group.paths.len(),
            group.keeper().display()
        );

        match check_exists(group.keeper()) {
            Ok(()) => {
                result.kept += 1;
                reporter.on_item(group.keeper(), &ItemEvent::Kept);
            }
            Err(err) => {
                debug!("{}", err);
                result.missing += 1;
                reporter.on_item(group.keeper(), &ItemEvent::Missing(&err));
            }
        }

        for path in group.duplicates() {
            resolve_one(path, dest_dir, reporter, &mut result);
            completed += 1;
            reporter.on_progress(completed, to_move);
        }
    }

    info!(
        "Moved {} duplicates ({} missing, {} failed)",
        result.moved, result.missing, result.failed
    );
    reporter.on_summary(&Summary::Resolve(result.clone()));
    Ok(result)
}

fn resolve_one(path: &Path, dest_dir: &Path, reporter: &dyn Reporter, result: &mut ResolveResult) {
    if let Err(err) = check_exists(path) {
        debug!("{}", err);
        result.missing += 1;
        reporter.on_item(path, &ItemEvent::Missing(&err));
        return;
    }

    match move_into(path, dest_dir) {
        Ok(outcome) => {
            result.moved += 1;
            match &outcome {
                MoveOutcome::Renamed(dest) => reporter.on_item(path, &ItemEvent::Moved { dest }),
                MoveOutcome::Copied(dest) => {
                    result.copied += 1;
                    reporter.on_item(path, &ItemEvent::CopiedFallback { dest });
                }
                MoveOutcome::PartialCopy { dest, cause } => {
                    result.partial += 1;
                    reporter.on_item(path, &ItemEvent::PartialCopy { dest, cause });
                }
            }
        }
        Err(err) => {
            debug!("{}", err);
            result.failed += 1;
            reporter.on_item(path, &ItemEvent::MoveFailed(&err));
        }
    }
}

fn check_exists(path: &Path) -> Result<(), Error> {
    match fs::symlink_metadata(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::MissingFile {
            path: path.to_path_buf(),
        }),
        // Anything else is left for the move itself to report.
        _ => Ok(()),
    }
}
