use crate::config::AppConfig;
use crate::error::Error;
use crate::manifest::ManifestWriter;
use crate::pool;
use crate::progress::{CollectResult, ItemEvent, Phase, Reporter, Summary};
use crate::scanner::{self, ScanOptions};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Drives the collection phase: scan, fingerprint, write the manifest.
pub struct ScanEngine {
    config: AppConfig,
}

impl ScanEngine {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Fingerprint every file under `root` and write a fresh manifest to `output`.
    ///
    /// Fails only on setup problems (unreadable root, uncreatable manifest)
    /// or when the manifest itself cannot be written. Per-file hash failures
    /// are reported and counted.
    pub fn create_file_list(
        &self,
        root: &Path,
        output: &Path,
        reporter: &dyn Reporter,
    ) -> Result<CollectResult, Error> {
        let start = Instant::now();

        info!("Scanning directory: {}", root.display());
        let listing = scanner::list_files(
            root,
            ScanOptions {
                follow_symlinks: self.config.follow_symlinks,
                nested_only: false,
            },
        )?;
        for err in &listing.skipped {
            if let Error::Scan { root: path, .. } = err {
                reporter.on_item(path, &ItemEvent::Skipped(err));
            }
        }

        let total = listing.total();
        info!("Total files to process: {}", total);

        let mut writer = ManifestWriter::create(output)?;
        reporter.on_start(Phase::Fingerprint, total);

        let stats = pool::fingerprint_all(
            &listing.files,
            self.config.workers,
            |path, outcome, completed| {
                match outcome {
                    Ok(record) => {
                        writer.append(&record)?;
                        debug!("Processed file: {}", path.display());
                        reporter.on_item(path, &ItemEvent::Hashed);
                    }
                    Err(err) => {
                        debug!("{}", err);
                        reporter.on_item(path, &ItemEvent::HashFailed(&err));
                    }
                }
                reporter.on_progress(completed, total);
                Ok(())
            },
        )?;
        writer.finish()?;

        let result = CollectResult {
            manifest: output.to_path_buf(),
            total,
            recorded: stats.recorded,
            failed: stats.failed,
            skipped: listing.skipped.len(),
            duration: start.elapsed(),
        };
        info!("File list saved to: {}", output.display());
        reporter.on_summary(&Summary::Collect(result.clone()));
        Ok(result)
    }
}
