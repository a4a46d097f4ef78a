use crate::error::Error;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The phase a reporter is being driven by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Fingerprint,
    ResolveDuplicates,
    Flatten,
}

/// What happened to one file.
#[derive(Debug)]
pub enum ItemEvent<'a> {
    /// Fingerprinted and appended to the manifest.
    Hashed,
    HashFailed(&'a Error),
    /// The scanner could not enter or stat this entry.
    Skipped(&'a Error),
    /// First member of a hash group, left in place.
    Kept,
    Moved { dest: &'a Path },
    /// Rename was refused; the file was copied and the source removed.
    CopiedFallback { dest: &'a Path },
    /// Copied to `dest`, but the source could not be removed.
    PartialCopy { dest: &'a Path, cause: &'a io::Error },
    Missing(&'a Error),
    MoveFailed(&'a Error),
}

#[derive(Debug, Clone, Default)]
pub struct CollectResult {
    pub manifest: PathBuf,
    pub total: usize,
    pub recorded: usize,
    pub failed: usize,
    /// Entries the scanner reported and skipped; not part of `total`.
    pub skipped: usize,
    pub duration: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct ResolveResult {
    pub records: usize,
    pub groups: usize,
    pub duplicate_groups: usize,
    pub kept: usize,
    /// Every duplicate that now exists at the destination.
    pub moved: usize,
    /// Subset of `moved` that went through copy-then-delete.
    pub copied: usize,
    /// Subset of `moved` whose source could not be removed after copying.
    pub partial: usize,
    pub missing: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Default)]
pub struct FlattenResult {
    pub total: usize,
    pub moved: usize,
    pub copied: usize,
    pub partial: usize,
    pub failed: usize,
    pub skipped: usize,
    pub dirs_removed: usize,
}

#[derive(Debug, Clone)]
pub enum Summary {
    Collect(CollectResult),
    Resolve(ResolveResult),
    Flatten(FlattenResult),
}

/// Receives progress and per-item outcomes from the core.
///
/// The CLI implements this with indicatif and tracing; library callers and
/// tests use [`SilentReporter`]. All methods default to no-ops.
pub trait Reporter: Send + Sync {
    fn on_start(&self, _phase: Phase, _total: usize) {}
    fn on_progress(&self, _completed: usize, _total: usize) {}
    fn on_item(&self, _path: &Path, _event: &ItemEvent<'_>) {}
    fn on_summary(&self, _summary: &Summary) {}
}

/// No-op reporter for silent operation.
pub struct SilentReporter;

impl Reporter for SilentReporter {}
