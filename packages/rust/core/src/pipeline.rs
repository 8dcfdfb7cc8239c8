//! Batch ingestion: files → session, one at a time, with progress reporting.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{info, instrument};

use crate::session::Session;

/// Per-file result reported while ingesting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Ingested { sections: usize },
    Skipped { reason: String },
}

/// Result of [`ingest_files`].
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Files that produced a document, in input order.
    pub ingested: Vec<PathBuf>,
    /// Files that were skipped, with the diagnostic message.
    pub skipped: Vec<(PathBuf, String)>,
    pub elapsed: Duration,
}

impl IngestReport {
    pub fn total(&self) -> usize {
        self.ingested.len() + self.skipped.len()
    }
}

/// Progress callback for reporting ingestion status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before a file is extracted.
    fn file_started(&self, path: &Path, current: usize, total: usize);
    /// Called after a file is extracted or skipped.
    fn file_finished(&self, path: &Path, outcome: &FileOutcome);
    /// Called when the batch completes.
    fn done(&self, report: &IngestReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn file_started(&self, _path: &Path, _current: usize, _total: usize) {}
    fn file_finished(&self, _path: &Path, _outcome: &FileOutcome) {}
    fn done(&self, _report: &IngestReport) {}
}

/// Ingest `paths` into `session` sequentially.
///
/// A file that cannot be extracted is recorded in the report and never
/// stops the batch.
#[instrument(skip_all, fields(file_count = paths.len()))]
pub fn ingest_files(
    session: &mut Session,
    paths: &[PathBuf],
    progress: &dyn ProgressReporter,
) -> IngestReport {
    let start = Instant::now();
    let mut report = IngestReport::default();
    let total = paths.len();

    progress.phase("Extracting documents");
    for (i, path) in paths.iter().enumerate() {
        progress.file_started(path, i + 1, total);

        let outcome = match session.ingest(path) {
            Ok(document) => FileOutcome::Ingested {
                sections: document.sections.len(),
            },
            Err(e) => FileOutcome::Skipped {
                reason: e.to_string(),
            },
        };

        match &outcome {
            FileOutcome::Ingested { .. } => report.ingested.push(path.clone()),
            FileOutcome::Skipped { reason } => report.skipped.push((path.clone(), reason.clone())),
        }
        progress.file_finished(path, &outcome);
    }

    report.elapsed = start.elapsed();
    progress.done(&report);

    info!(
        ingested = report.ingested.len(),
        skipped = report.skipped.len(),
        elapsed_ms = report.elapsed.as_millis(),
        "ingestion complete"
    );

    report
}
