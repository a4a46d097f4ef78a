use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use sift_core::{ItemEvent, Phase, Reporter, Summary};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// CLI reporter: one indicatif bar per phase, per-item lines through tracing.
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(old) = guard.take() {
            old.finish_and_clear();
        }
        *guard = Some(pb);
    }

    fn finish_bar(&self) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.take() {
            pb.finish_and_clear();
        }
    }

    /// Run `f` with the bar hidden so log lines don't tear it.
    fn suspend<F: FnOnce()>(&self, f: F) {
        let guard = self.bar.lock().unwrap();
        match guard.as_ref() {
            Some(pb) => pb.suspend(f),
            None => f(),
        }
    }
}

impl Reporter for CliReporter {
    fn on_start(&self, phase: Phase, total: usize) {
        let label = match phase {
            Phase::Fingerprint => "Processing files",
            Phase::ResolveDuplicates => "Moving duplicates",
            Phase::Flatten => "Flattening",
        };
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "  {spinner:.cyan} {msg} [{bar:30.cyan/dim}] {pos}/{len} files ({eta} remaining)",
            )
            .unwrap()
            .progress_chars("━╸─")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.set_message(label);
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_progress(&self, completed: usize, _total: usize) {
        let guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.as_ref() {
            pb.set_position(completed as u64);
        }
    }

    fn on_item(&self, path: &Path, event: &ItemEvent<'_>) {
        let path = path.display();
        self.suspend(|| match event {
            ItemEvent::Hashed => debug!("Processed file: {}", path),
            ItemEvent::Kept => debug!("Keeping: {}", path),
            ItemEvent::Moved { dest } => info!("Moved: {} -> {}", path, dest.display()),
            ItemEvent::CopiedFallback { dest } => {
                info!("Copied (rename refused): {} -> {}", path, dest.display())
            }
            ItemEvent::PartialCopy { dest, cause } => warn!(
                "Copied {} -> {} but the original remains: {}",
                path,
                dest.display(),
                cause
            ),
            ItemEvent::HashFailed(err)
            | ItemEvent::Skipped(err)
            | ItemEvent::Missing(err)
            | ItemEvent::MoveFailed(err) => warn!("{}", err),
        });
    }

    fn on_summary(&self, summary: &Summary) {
        self.finish_bar();
        match summary {
            Summary::Collect(r) => {
                info!(
                    "{} files fingerprinted, {} failed, {} skipped in {}",
                    format!("{}", r.recorded).green(),
                    format!("{}", r.failed).red(),
                    format!("{}", r.skipped).yellow(),
                    format!("{:.2}s", r.duration.as_secs_f64()).green(),
                );
                info!("File list saved to: {}", r.manifest.display());
            }
            Summary::Resolve(r) => {
                info!(
                    "{} duplicate groups in {} records, {} kept",
                    format!("{}", r.duplicate_groups).cyan(),
                    r.records,
                    r.kept,
                );
                info!(
                    "{} duplicates moved ({} by copy, {} left at source), {} missing, {} failed",
                    format!("{}", r.moved).green(),
                    r.copied,
                    format!("{}", r.partial).yellow(),
                    format!("{}", r.missing).yellow(),
                    format!("{}", r.failed).red(),
                );
            }
            Summary::Flatten(r) => {
                info!(
                    "Total files moved: {} of {} ({} by copy, {} left at source), {} failed",
                    format!("{}", r.moved).green(),
                    r.total,
                    r.copied,
                    format!("{}", r.partial).yellow(),
                    format!("{}", r.failed).red(),
                );
                info!("Removed {} empty directories", r.dirs_removed);
            }
        }
    }
}
